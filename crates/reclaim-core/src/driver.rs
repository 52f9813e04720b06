//! Runs the pool pass and then the resource-group pass.
//!
//! A cycle can be run directly with [`Driver::run_once`] or handed to a taskvisor
//! supervisor as a periodic task:
//! - [`Driver::into_task`] wraps the cycle in a [`TaskRef`];
//! - [`cycle_spec`] restarts it after every run with a fixed delay, and bounds each
//!   run with a timeout that cancels in-flight deletions.
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use taskvisor::{BackoffPolicy, JitterPolicy, RestartPolicy, TaskError, TaskFn, TaskRef, TaskSpec};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span};

use crate::{
    clock::Clock,
    cloud::{PoolApi, ResourceGroupApi},
    config::ReclaimConfig,
    error::ReclaimError,
    group::{GroupPassReport, GroupReclaimer},
    metrics::MetricsHandle,
    pool::{PoolPassReport, PoolReclaimer},
};

/// Name of the supervised reclaim task.
pub const CYCLE_TASK_NAME: &str = "reclaim-cycle";

/// Results of both passes of one cycle. A failed pass does not prevent the other.
#[derive(Debug)]
pub struct CycleReport {
    pub cycle: u64,
    pub pools: Result<PoolPassReport, ReclaimError>,
    pub groups: Result<GroupPassReport, ReclaimError>,
}

impl CycleReport {
    /// Returns `true` if both passes completed.
    pub fn is_clean(&self) -> bool {
        self.pools.is_ok() && self.groups.is_ok()
    }
}

/// Runs reclamation cycles: the pool pass first, then the resource-group pass.
///
/// The two passes share nothing but the cancellation token. A failed pool pass is
/// logged and reported, and the group pass still runs; neither pass is retried
/// within the cycle. The cycle counter is only used for logs and reports.
pub struct Driver {
    pools: PoolReclaimer,
    groups: GroupReclaimer,
    cycles: AtomicU64,
}

impl Driver {
    pub fn new(pools: PoolReclaimer, groups: GroupReclaimer) -> Self {
        Self {
            pools,
            groups,
            cycles: AtomicU64::new(0),
        }
    }

    /// Build both reclaimers over one cloud backend from a validated configuration.
    pub fn from_config<C>(
        cfg: &ReclaimConfig,
        cloud: Arc<C>,
        clock: Arc<dyn Clock>,
        metrics: MetricsHandle,
    ) -> Result<Self, ReclaimError>
    where
        C: PoolApi + ResourceGroupApi + 'static,
    {
        cfg.validate()?;
        let pools_api: Arc<dyn PoolApi> = cloud.clone();
        let groups_api: Arc<dyn ResourceGroupApi> = cloud;

        let pools = PoolReclaimer::new(pools_api)
            .with_pattern(cfg.runner_name_pattern()?)
            .with_clock(Arc::clone(&clock))
            .with_metrics(Arc::clone(&metrics));
        let groups = GroupReclaimer::new(groups_api, cfg.protection_filter()?)
            .with_capacity(cfg.registry_capacity)
            .with_clock(clock)
            .with_metrics(metrics);
        Ok(Self::new(pools, groups))
    }

    /// Run the pool pass, then the resource-group pass.
    pub async fn run_once(&self, cancel: &CancellationToken) -> CycleReport {
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        let span = info_span!("cycle", cycle);

        async move {
            let pools = self.pools.run(cancel).await;
            if let Err(e) = &pools {
                error!(error = %e, "pool pass failed");
            }
            let groups = self.groups.run(cancel).await;
            if let Err(e) = &groups {
                error!(error = %e, "resource group pass failed");
            }
            CycleReport {
                cycle,
                pools,
                groups,
            }
        }
        .instrument(span)
        .await
    }

    /// Run one cycle as a supervised task body.
    ///
    /// Fails with [`TaskError::Fail`] when either pass failed, so the supervisor
    /// records the attempt as failed; the next attempt still runs both passes.
    pub async fn cycle(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        if ctx.is_cancelled() {
            return Err(TaskError::Canceled);
        }
        let report = self.run_once(&ctx).await;
        info!(cycle = report.cycle, clean = report.is_clean(), "cycle finished");

        if ctx.is_cancelled() {
            return Err(TaskError::Canceled);
        }
        let failed: Vec<String> = [
            report.pools.as_ref().err().map(|e| format!("pool pass: {e}")),
            report.groups.as_ref().err().map(|e| format!("resource group pass: {e}")),
        ]
        .into_iter()
        .flatten()
        .collect();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(TaskError::Fail {
                reason: failed.join("; "),
            })
        }
    }

    /// Wrap [`Driver::cycle`] into a taskvisor task.
    pub fn into_task(self: Arc<Self>) -> TaskRef {
        TaskFn::arc(CYCLE_TASK_NAME, move |ctx: CancellationToken| {
            let driver = Arc::clone(&self);
            async move {
                debug!("reclaim cycle started");
                driver.cycle(ctx).await
            }
        })
    }
}

/// Task spec that reruns `task` forever, `interval` after each run.
///
/// Failed runs are retried after the same fixed delay: a pass that failed is
/// simply repeated by the next cycle. `timeout` bounds one run.
pub fn cycle_spec(task: TaskRef, interval: Duration, timeout: Option<Duration>) -> TaskSpec {
    let backoff = BackoffPolicy {
        success_delay: Some(interval),
        jitter: JitterPolicy::None,
        factor: 1.0,

        first: interval,
        max: interval,
    };
    TaskSpec::new(task, RestartPolicy::Always, backoff, timeout)
}
