mod domain;
pub use domain::{DEFAULT_RECORDER_NAME, DEFAULT_REGISTRY_CAPACITY, DEFAULT_RUNNER_NAME_PATTERN};
pub use domain::{DO_NOT_DELETE_TAG, RESERVED_SYSTEM_PREFIX};
pub use domain::{PoolTags, RunnerNamePattern, TagSet};

mod error;
pub use error::{ModelError, ModelResult};

mod resource;
pub use resource::{Pool, ResourceGroup, Runner, RunnerStatus};

mod protect;
pub use protect::{Protection, ProtectionFilter, name_hash};
