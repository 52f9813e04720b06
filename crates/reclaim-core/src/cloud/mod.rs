//! Capabilities the reclaimer consumes from the cloud control plane.
//!
//! Transport, authentication and per-call timeouts belong to the implementations.
//! The reclaimer only needs the operations below.
mod error;
pub use error::{CloudError, CloudResult};

pub mod memory;
pub use memory::{CloudSnapshot, InMemoryCloud, PoolSnapshot};

use async_trait::async_trait;

use reclaim_model::{Pool, PoolTags, ResourceGroup, Runner, TagSet};

/// Resource-group operations.
#[async_trait]
pub trait ResourceGroupApi: Send + Sync + 'static {
    /// Every resource group in the subscription.
    async fn list_resource_groups(&self) -> CloudResult<Vec<ResourceGroup>>;

    /// Read one group. Must return [`CloudError::NotFound`] if it does not exist.
    async fn get_resource_group(&self, name: &str) -> CloudResult<ResourceGroup>;

    /// Create an empty group.
    async fn create_resource_group(&self, name: &str) -> CloudResult<ResourceGroup>;

    /// Replace the group's whole tag set.
    async fn replace_resource_group_tags(&self, name: &str, tags: &TagSet<String>)
    -> CloudResult<()>;

    async fn delete_resource_group(&self, name: &str) -> CloudResult<()>;
}

/// Runner pool operations.
#[async_trait]
pub trait PoolApi: Send + Sync + 'static {
    async fn list_pools(&self) -> CloudResult<Vec<Pool>>;

    /// Current runner registrations of a pool.
    async fn list_runners(&self, pool: &Pool) -> CloudResult<Vec<Runner>>;

    /// Remove a runner registration from its pool.
    async fn purge_runner(&self, pool: &Pool, runner_id: &str) -> CloudResult<()>;

    /// Replace the pool's whole tag set.
    async fn replace_pool_tags(&self, pool: &Pool, tags: &PoolTags) -> CloudResult<()>;
}
