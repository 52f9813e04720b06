/// Name of the resource group whose tags hold the reclaim registry.
pub const DEFAULT_RECORDER_NAME: &str = "residualrgrecorder";

/// Maximum number of live entries in the registry.
pub const DEFAULT_REGISTRY_CAPACITY: usize = 50;

/// Prefix of infrastructure-managed resource groups (managed cluster node groups).
pub const RESERVED_SYSTEM_PREFIX: &str = "MC_";

/// Tag key that exempts a resource group from reclamation. The value is ignored.
pub const DO_NOT_DELETE_TAG: &str = "do_not_delete";

/// Runner names are fixed-length 15 character tokens.
pub const DEFAULT_RUNNER_NAME_PATTERN: &str = "^[a-z0-9_]{15}$";
