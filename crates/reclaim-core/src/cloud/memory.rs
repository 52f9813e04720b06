//! In-process cloud backed by plain maps.
//!
//! Used by the test suite and by the daemon's rehearsal mode, where a JSON snapshot
//! stands in for the control plane. Faults can be injected per operation and every
//! mutating call is journaled.
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use reclaim_model::{Pool, PoolTags, ResourceGroup, Runner, TagSet};

use crate::cloud::{CloudError, CloudResult, PoolApi, ResourceGroupApi};

/// Serialisable view of the whole in-memory cloud.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudSnapshot {
    pub resource_groups: Vec<ResourceGroup>,
    pub pools: Vec<PoolSnapshot>,
}

/// A pool together with its runner registrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    #[serde(flatten)]
    pub pool: Pool,
    #[serde(default)]
    pub runners: Vec<Runner>,
}

/// Journal of mutating calls, in call order.
#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub created: Vec<String>,
    pub delete_attempts: Vec<String>,
    pub deleted: Vec<String>,
    /// `(pool, runner id)` pairs.
    pub purge_attempts: Vec<(String, String)>,
    pub purged: Vec<(String, String)>,
    /// Targets of successful tag writes: group name or `group/pool`.
    pub tag_writes: Vec<String>,
}

#[derive(Debug, Default)]
struct Faults {
    list_groups: bool,
    list_pools: bool,
    read_groups: bool,
    tag_writes: BTreeSet<String>,
    runner_listing: BTreeSet<String>,
    purges: BTreeSet<String>,
    deletes: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct State {
    groups: BTreeMap<String, ResourceGroup>,
    pools: BTreeMap<String, PoolSnapshot>,
    faults: Faults,
    calls: Calls,
    delete_latency: Duration,
}

#[derive(Debug, Default)]
pub struct InMemoryCloud {
    state: Mutex<State>,
}

impl InMemoryCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: CloudSnapshot) -> Self {
        let cloud = Self::new();
        for rg in snapshot.resource_groups {
            cloud.add_group(rg);
        }
        for p in snapshot.pools {
            cloud.add_pool(p.pool, p.runners);
        }
        cloud
    }

    /// Current contents, groups and pools in name order.
    pub fn snapshot(&self) -> CloudSnapshot {
        let st = self.state();
        CloudSnapshot {
            resource_groups: st.groups.values().cloned().collect(),
            pools: st.pools.values().cloned().collect(),
        }
    }

    /// Insert or replace a resource group.
    pub fn add_group(&self, rg: ResourceGroup) {
        self.state().groups.insert(rg.name.clone(), rg);
    }

    /// Insert or replace a pool and its runners.
    pub fn add_pool(&self, pool: Pool, runners: Vec<Runner>) {
        self.state()
            .pools
            .insert(pool.to_string(), PoolSnapshot { pool, runners });
    }

    /// Replace the runners of an existing pool. Returns `false` if the pool is unknown.
    pub fn set_runners(&self, pool: &Pool, runners: Vec<Runner>) -> bool {
        match self.state().pools.get_mut(&pool.to_string()) {
            Some(p) => {
                p.runners = runners;
                true
            }
            None => false,
        }
    }

    pub fn group(&self, name: &str) -> Option<ResourceGroup> {
        self.state().groups.get(name).cloned()
    }

    /// Stored pool, with its current tags.
    pub fn pool(&self, resource_group: &str, name: &str) -> Option<Pool> {
        self.state()
            .pools
            .get(&format!("{resource_group}/{name}"))
            .map(|p| p.pool.clone())
    }

    pub fn calls(&self) -> Calls {
        self.state().calls.clone()
    }

    pub fn fail_list_groups(&self, fail: bool) {
        self.state().faults.list_groups = fail;
    }

    pub fn fail_list_pools(&self, fail: bool) {
        self.state().faults.list_pools = fail;
    }

    /// Make every single-group read fail with a request error.
    pub fn fail_group_reads(&self, fail: bool) {
        self.state().faults.read_groups = fail;
    }

    /// Fail tag writes to a group name or a `group/pool` target.
    pub fn fail_tag_write(&self, target: impl Into<String>) {
        self.state().faults.tag_writes.insert(target.into());
    }

    pub fn fail_runner_listing(&self, pool: &Pool) {
        self.state().faults.runner_listing.insert(pool.to_string());
    }

    pub fn fail_purge(&self, runner_id: impl Into<String>) {
        self.state().faults.purges.insert(runner_id.into());
    }

    pub fn fail_delete(&self, group: impl Into<String>) {
        self.state().faults.deletes.insert(group.into());
    }

    pub fn clear_faults(&self) {
        self.state().faults = Faults::default();
    }

    /// Delay applied to every group deletion before it takes effect.
    pub fn set_delete_latency(&self, latency: Duration) {
        self.state().delete_latency = latency;
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ResourceGroupApi for InMemoryCloud {
    async fn list_resource_groups(&self) -> CloudResult<Vec<ResourceGroup>> {
        let st = self.state();
        if st.faults.list_groups {
            return Err(CloudError::request("list", "resource groups", "injected fault"));
        }
        Ok(st.groups.values().cloned().collect())
    }

    async fn get_resource_group(&self, name: &str) -> CloudResult<ResourceGroup> {
        let st = self.state();
        if st.faults.read_groups {
            return Err(CloudError::request("get", name, "injected fault"));
        }
        st.groups
            .get(name)
            .cloned()
            .ok_or_else(|| CloudError::not_found("resource group", name))
    }

    async fn create_resource_group(&self, name: &str) -> CloudResult<ResourceGroup> {
        let mut st = self.state();
        st.calls.created.push(name.to_string());
        let rg = st
            .groups
            .entry(name.to_string())
            .or_insert_with(|| ResourceGroup::new(name));
        Ok(rg.clone())
    }

    async fn replace_resource_group_tags(
        &self,
        name: &str,
        tags: &TagSet<String>,
    ) -> CloudResult<()> {
        let mut st = self.state();
        if st.faults.tag_writes.contains(name) {
            return Err(CloudError::request("update tags", name, "injected fault"));
        }
        let rg = st
            .groups
            .get_mut(name)
            .ok_or_else(|| CloudError::not_found("resource group", name))?;
        rg.tags = tags.clone();
        st.calls.tag_writes.push(name.to_string());
        Ok(())
    }

    async fn delete_resource_group(&self, name: &str) -> CloudResult<()> {
        let latency = {
            let mut st = self.state();
            st.calls.delete_attempts.push(name.to_string());
            st.delete_latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut st = self.state();
        if st.faults.deletes.contains(name) {
            return Err(CloudError::request("delete", name, "injected fault"));
        }
        if st.groups.remove(name).is_none() {
            return Err(CloudError::not_found("resource group", name));
        }
        st.calls.deleted.push(name.to_string());
        trace!(group = name, "in-memory group deleted");
        Ok(())
    }
}

#[async_trait]
impl PoolApi for InMemoryCloud {
    async fn list_pools(&self) -> CloudResult<Vec<Pool>> {
        let st = self.state();
        if st.faults.list_pools {
            return Err(CloudError::request("list", "pools", "injected fault"));
        }
        Ok(st.pools.values().map(|p| p.pool.clone()).collect())
    }

    async fn list_runners(&self, pool: &Pool) -> CloudResult<Vec<Runner>> {
        let key = pool.to_string();
        let st = self.state();
        if st.faults.runner_listing.contains(&key) {
            return Err(CloudError::request("list runners", key, "injected fault"));
        }
        st.pools
            .get(&key)
            .map(|p| p.runners.clone())
            .ok_or_else(|| CloudError::not_found("pool", key))
    }

    async fn purge_runner(&self, pool: &Pool, runner_id: &str) -> CloudResult<()> {
        let key = pool.to_string();
        let mut st = self.state();
        st.calls
            .purge_attempts
            .push((key.clone(), runner_id.to_string()));
        if st.faults.purges.contains(runner_id) {
            return Err(CloudError::request("purge runner", runner_id, "injected fault"));
        }
        let entry = st
            .pools
            .get_mut(&key)
            .ok_or_else(|| CloudError::not_found("pool", key.clone()))?;
        let before = entry.runners.len();
        entry.runners.retain(|r| r.id != runner_id);
        if entry.runners.len() == before {
            return Err(CloudError::not_found("runner", runner_id));
        }
        st.calls.purged.push((key, runner_id.to_string()));
        Ok(())
    }

    async fn replace_pool_tags(&self, pool: &Pool, tags: &PoolTags) -> CloudResult<()> {
        let key = pool.to_string();
        let mut st = self.state();
        if st.faults.tag_writes.contains(&key) {
            return Err(CloudError::request("update tags", key, "injected fault"));
        }
        let entry = st
            .pools
            .get_mut(&key)
            .ok_or_else(|| CloudError::not_found("pool", key.clone()))?;
        entry.pool.tags = tags.clone();
        st.calls.tag_writes.push(key);
        Ok(())
    }
}
