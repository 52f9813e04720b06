//! Resource-group reclamation.
//!
//! The tags of one recorder group serve as the registry. A pass prunes entries for
//! groups that no longer exist, registers unprotected groups on first sighting and
//! deletes them when they are found registered on a later pass. Deletions run
//! concurrently; the registry is written once after all decisions, and the pass
//! only returns after every deletion task has finished.
mod plan;
pub use plan::{SweepPlan, plan_sweep};

mod provision;
pub use provision::ensure_recorder;

mod report;
pub use report::GroupPassReport;

use std::{sync::Arc, time::Instant};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, instrument, warn};

use reclaim_model::{DEFAULT_REGISTRY_CAPACITY, ProtectionFilter};

use crate::{
    clock::{Clock, SystemClock, epoch_stamp},
    cloud::ResourceGroupApi,
    error::ReclaimError,
    metrics::{MetricsHandle, ReclaimOutcome, ReclaimTarget, noop_metrics},
    registry::Registry,
};

/// How a single deletion task ended.
#[derive(Debug)]
enum Deletion {
    Done,
    Failed,
    Canceled,
}

pub struct GroupReclaimer {
    api: Arc<dyn ResourceGroupApi>,
    filter: ProtectionFilter,
    capacity: usize,
    clock: Arc<dyn Clock>,
    metrics: MetricsHandle,
}

impl GroupReclaimer {
    /// Reclaimer with the default registry capacity, wall clock and no metrics.
    ///
    /// The recorder group is the one named by `filter`.
    pub fn new(api: Arc<dyn ResourceGroupApi>, filter: ProtectionFilter) -> Self {
        Self {
            api,
            filter,
            capacity: DEFAULT_REGISTRY_CAPACITY,
            clock: Arc::new(SystemClock),
            metrics: noop_metrics(),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn recorder_name(&self) -> &str {
        self.filter.recorder_name()
    }

    /// Run one mark-and-sweep pass.
    ///
    /// Fails if the recorder cannot be read or created, if groups cannot be listed,
    /// or if the registry cannot be written back. Individual deletion failures are
    /// only logged: the group is no longer registered and will be marked again from
    /// scratch on a later pass.
    #[instrument(name = "group_pass", level = "info", skip_all, fields(recorder = %self.recorder_name()))]
    pub async fn run(&self, cancel: &CancellationToken) -> Result<GroupPassReport, ReclaimError> {
        let started = Instant::now();
        let result = self.run_inner(cancel).await;

        let outcome = match &result {
            Ok(r) if r.delete_canceled > 0 => ReclaimOutcome::Canceled,
            Ok(_) => ReclaimOutcome::Success,
            Err(ReclaimError::Canceled) => ReclaimOutcome::Canceled,
            Err(_) => ReclaimOutcome::Failure,
        };
        self.metrics.record_pass(
            ReclaimTarget::ResourceGroup,
            outcome,
            started.elapsed().as_millis() as u64,
        );
        result
    }

    async fn run_inner(&self, cancel: &CancellationToken) -> Result<GroupPassReport, ReclaimError> {
        if cancel.is_cancelled() {
            return Err(ReclaimError::Canceled);
        }
        let recorder = ensure_recorder(self.api.as_ref(), self.recorder_name()).await?;
        let groups = self
            .api
            .list_resource_groups()
            .await
            .map_err(ReclaimError::ListResourceGroups)?;
        info!(count = groups.len(), registered = recorder.tags.len(), "listed resource groups");

        let mut registry = Registry::new(recorder.tags, self.capacity);
        let pruned = registry.prune(groups.iter().map(|g| g.name.as_str()));
        for name in &pruned {
            debug!(group = %name, "pruned registry entry for missing group");
        }
        self.metrics.record_pruned(pruned.len() as u64);

        let stamp = epoch_stamp(self.clock.now());
        let plan = plan_sweep(&mut registry, &groups, &self.filter, &stamp);
        for (name, reason) in &plan.protected {
            debug!(group = %name, %reason, "protected; skipped");
        }
        for name in &plan.marked {
            debug!(group = %name, "registered on first sighting");
            self.metrics.record_marked(ReclaimTarget::ResourceGroup);
        }
        if !plan.deferred.is_empty() {
            warn!(
                deferred = plan.deferred.len(),
                capacity = self.capacity,
                "registry full; new groups deferred to a later pass"
            );
        }
        for name in &plan.evicted {
            warn!(group = %name, "evicted from oversized registry");
        }

        let mut tasks = self.spawn_deletions(&plan.deletions, cancel);

        debug!(entries = registry.len(), "writing registry");
        let written = self
            .api
            .replace_resource_group_tags(self.recorder_name(), registry.tags())
            .await;
        if let Err(e) = &written {
            error!(error = %e, "cannot write registry");
        }

        let mut report = GroupPassReport {
            groups: groups.len(),
            pruned: pruned.len(),
            marked: plan.marked.len(),
            protected: plan.protected.len(),
            deferred: plan.deferred.len(),
            evicted: plan.evicted.len(),
            registry_len: registry.len(),
            ..Default::default()
        };
        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(Deletion::Done) => {
                    report.deleted += 1;
                    ReclaimOutcome::Success
                }
                Ok(Deletion::Failed) => {
                    report.delete_failures += 1;
                    ReclaimOutcome::Failure
                }
                Ok(Deletion::Canceled) => {
                    report.delete_canceled += 1;
                    ReclaimOutcome::Canceled
                }
                Err(e) => {
                    error!(error = %e, "deletion task aborted");
                    report.delete_failures += 1;
                    ReclaimOutcome::Failure
                }
            };
            self.metrics
                .record_reclaimed(ReclaimTarget::ResourceGroup, outcome);
        }

        written.map_err(ReclaimError::WriteRegistry)?;
        info!(
            pruned = report.pruned,
            marked = report.marked,
            deleted = report.deleted,
            delete_failures = report.delete_failures,
            deferred = report.deferred,
            "resource group pass finished"
        );
        Ok(report)
    }

    /// Start one task per deletion. Each task races its delete call against the
    /// pass cancellation token.
    fn spawn_deletions(&self, names: &[String], cancel: &CancellationToken) -> JoinSet<Deletion> {
        let mut tasks = JoinSet::new();
        for name in names {
            let api = Arc::clone(&self.api);
            let token = cancel.child_token();
            let name = name.clone();

            tasks.spawn(async move {
                info!(group = %name, "deleting resource group");
                tokio::select! {
                    res = api.delete_resource_group(&name) => match res {
                        Ok(()) => {
                            info!(group = %name, "resource group deleted");
                            Deletion::Done
                        }
                        Err(e) => {
                            warn!(group = %name, error = %e, "cannot delete resource group");
                            Deletion::Failed
                        }
                    },
                    _ = token.cancelled() => {
                        warn!(group = %name, "deletion canceled");
                        Deletion::Canceled
                    }
                }
            }
            .in_current_span());
        }
        tasks
    }
}
