use thiserror::Error;

use reclaim_model::ModelError;

use crate::cloud::CloudError;

/// Failure that ends a whole pass.
///
/// Per-item failures (a single purge, delete or runner listing) never surface here;
/// they are logged and retried on the next pass.
#[derive(Debug, Error)]
pub enum ReclaimError {
    #[error("cannot list pools: {0}")]
    ListPools(CloudError),

    #[error("cannot list resource groups: {0}")]
    ListResourceGroups(CloudError),

    #[error("registry unavailable: {0}")]
    RegistryUnavailable(CloudError),

    #[error("cannot write registry: {0}")]
    WriteRegistry(CloudError),

    #[error("pass canceled")]
    Canceled,

    #[error("invalid configuration: {0}")]
    Config(#[from] ModelError),
}
