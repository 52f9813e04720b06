//! Runner pool reclamation.
//!
//! A runner seen `Allocated` is recorded under its name in the pool's tags. If it is
//! still allocated on a later pass, its registration is purged. Runners that come and
//! go within one polling interval are therefore never touched.
mod report;
pub use report::PoolPassReport;
use report::PoolOutcome;

mod tags;
pub use tags::rebuild_pool_tags;

use std::{sync::Arc, time::Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use reclaim_model::{Pool, RunnerNamePattern};

use crate::{
    clock::{Clock, SystemClock, rfc3339_stamp},
    cloud::PoolApi,
    error::ReclaimError,
    metrics::{MetricsHandle, ReclaimOutcome, ReclaimTarget, noop_metrics},
};

pub struct PoolReclaimer {
    api: Arc<dyn PoolApi>,
    pattern: RunnerNamePattern,
    clock: Arc<dyn Clock>,
    metrics: MetricsHandle,
}

impl PoolReclaimer {
    /// Reclaimer with the default runner name pattern, wall clock and no metrics.
    pub fn new(api: Arc<dyn PoolApi>) -> Self {
        Self {
            api,
            pattern: RunnerNamePattern::default(),
            clock: Arc::new(SystemClock),
            metrics: noop_metrics(),
        }
    }

    pub fn with_pattern(mut self, pattern: RunnerNamePattern) -> Self {
        self.pattern = pattern;
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

    /// Run one pass over every pool.
    ///
    /// Only a failure to list pools fails the pass. Each pool is handled on its own:
    /// a pool whose runners cannot be listed is left untouched, and purge or tag
    /// write failures are logged and retried on the next pass. Cancellation is
    /// checked between pools.
    #[instrument(name = "pool_pass", level = "info", skip_all)]
    pub async fn run(&self, cancel: &CancellationToken) -> Result<PoolPassReport, ReclaimError> {
        let started = Instant::now();
        let result = self.run_inner(cancel).await;

        let outcome = match &result {
            Ok(r) if r.canceled => ReclaimOutcome::Canceled,
            Ok(_) => ReclaimOutcome::Success,
            Err(ReclaimError::Canceled) => ReclaimOutcome::Canceled,
            Err(_) => ReclaimOutcome::Failure,
        };
        self.metrics.record_pass(
            ReclaimTarget::Runner,
            outcome,
            started.elapsed().as_millis() as u64,
        );
        result
    }

    async fn run_inner(&self, cancel: &CancellationToken) -> Result<PoolPassReport, ReclaimError> {
        if cancel.is_cancelled() {
            return Err(ReclaimError::Canceled);
        }
        let pools = self.api.list_pools().await.map_err(ReclaimError::ListPools)?;
        info!(count = pools.len(), "listed pools");

        let mut report = PoolPassReport {
            pools: pools.len(),
            ..Default::default()
        };
        for pool in &pools {
            if cancel.is_cancelled() {
                warn!("pool pass canceled; remaining pools left for the next pass");
                report.canceled = true;
                break;
            }
            report.absorb(self.reconcile(pool).await);
        }
        info!(
            reconciled = report.reconciled,
            skipped = report.skipped,
            marked = report.marked,
            purged = report.purged,
            purge_failures = report.purge_failures,
            "pool pass finished"
        );
        Ok(report)
    }

    /// Reconcile a single pool: purge runners seen on a previous pass, record new
    /// ones, and replace the pool's tags.
    #[instrument(level = "debug", skip_all, fields(pool = %pool))]
    async fn reconcile(&self, pool: &Pool) -> PoolOutcome {
        let mut outcome = PoolOutcome::default();

        let runners = match self.api.list_runners(pool).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "cannot list runners; pool skipped");
                outcome.skipped = true;
                return outcome;
            }
        };
        debug!(count = runners.len(), "listed runners");

        let mut pending = Vec::new();
        for runner in runners.iter().filter(|r| r.status.is_allocated()) {
            if !self.pattern.is_runner_key(&runner.name) {
                trace!(runner = %runner.name, "name outside runner pattern; tracked by name");
            }
            if !pool.tags.contains(&runner.name) {
                debug!(runner = %runner.name, "allocated runner seen for the first time");
                self.metrics.record_marked(ReclaimTarget::Runner);
                outcome.marked += 1;
                pending.push(runner.name.clone());
                continue;
            }

            info!(runner = %runner.name, id = %runner.id, "purging runner");
            match self.api.purge_runner(pool, &runner.id).await {
                Ok(()) => {
                    self.metrics
                        .record_reclaimed(ReclaimTarget::Runner, ReclaimOutcome::Success);
                    outcome.purged += 1;
                }
                Err(e) => {
                    warn!(runner = %runner.name, error = %e, "cannot purge runner; retrying next pass");
                    self.metrics
                        .record_reclaimed(ReclaimTarget::Runner, ReclaimOutcome::Failure);
                    outcome.purge_failures += 1;
                    pending.push(runner.name.clone());
                }
            }
        }

        let stamp = rfc3339_stamp(self.clock.now());
        let observed: Vec<&str> = runners.iter().map(|r| r.name.as_str()).collect();
        let tags = rebuild_pool_tags(&pool.tags, &observed, &pending, &self.pattern, &stamp);
        debug!(pending = pending.len(), "updating pool tags");
        if let Err(e) = self.api.replace_pool_tags(pool, &tags).await {
            error!(error = %e, "cannot update pool tags");
            outcome.tag_write_failed = true;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{CloudResult, InMemoryCloud};
    use crate::testing::{RecordingMetrics, fixed_clock};
    use async_trait::async_trait;
    use reclaim_model::{PoolTags, Runner};
    use serde_json::json;

    const R1: &str = "abc123def456789";
    const R2: &str = "zzz000yyy111xxx";

    fn setup(runners: Vec<Runner>) -> (Arc<InMemoryCloud>, Pool, PoolReclaimer) {
        let cloud = Arc::new(InMemoryCloud::new());
        let mut tags = PoolTags::new();
        tags.insert("team", json!("infra"));
        let pool = Pool::new("rg-runners", "gh-pool").with_tags(tags);
        cloud.add_pool(pool.clone(), runners);

        let reclaimer = PoolReclaimer::new(cloud.clone()).with_clock(fixed_clock(1_700_000_000));
        (cloud, pool, reclaimer)
    }

    fn tags_of(cloud: &InMemoryCloud, pool: &Pool) -> PoolTags {
        cloud.pool(&pool.resource_group, &pool.name).unwrap().tags
    }

    #[tokio::test]
    async fn first_sighting_marks_without_purge() {
        let (cloud, pool, reclaimer) = setup(vec![Runner::new("id-1", R1, "Allocated")]);

        let report = reclaimer.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.marked, 1);
        assert_eq!(report.purged, 0);
        assert!(cloud.calls().purge_attempts.is_empty());
        let tags = tags_of(&cloud, &pool);
        assert_eq!(tags.get(R1), Some(&json!("2023-11-14T22:13:20Z")));
        assert_eq!(tags.get("team"), Some(&json!("infra")));
    }

    #[tokio::test]
    async fn second_sighting_purges_and_drops_tag() {
        let (cloud, pool, reclaimer) = setup(vec![Runner::new("id-1", R1, "Allocated")]);
        let cancel = CancellationToken::new();

        reclaimer.run(&cancel).await.unwrap();
        let report = reclaimer.run(&cancel).await.unwrap();

        assert_eq!(report.purged, 1);
        assert_eq!(
            cloud.calls().purged,
            vec![("rg-runners/gh-pool".to_string(), "id-1".to_string())]
        );
        let tags = tags_of(&cloud, &pool);
        assert!(!tags.contains(R1));
        assert!(tags.contains("team"));
    }

    #[tokio::test]
    async fn failed_purge_keeps_runner_tracked() {
        let (cloud, pool, reclaimer) = setup(vec![Runner::new("id-1", R1, "Allocated")]);
        let cancel = CancellationToken::new();
        reclaimer.run(&cancel).await.unwrap();

        cloud.fail_purge("id-1");
        let later = PoolReclaimer::new(cloud.clone()).with_clock(fixed_clock(1_700_003_600));
        let report = later.run(&cancel).await.unwrap();

        assert_eq!(report.purge_failures, 1);
        assert_eq!(
            tags_of(&cloud, &pool).get(R1),
            Some(&json!("2023-11-14T23:13:20Z")),
            "re-added with a fresh timestamp"
        );

        cloud.clear_faults();
        let report = later.run(&cancel).await.unwrap();
        assert_eq!(report.purged, 1);
        assert!(!tags_of(&cloud, &pool).contains(R1));
    }

    #[tokio::test]
    async fn released_runner_marker_is_dropped() {
        let (cloud, pool, reclaimer) = setup(vec![
            Runner::new("id-1", R1, "Allocated"),
            Runner::new("id-2", R2, "Allocated"),
        ]);
        let cancel = CancellationToken::new();
        reclaimer.run(&cancel).await.unwrap();

        cloud.set_runners(&pool, vec![Runner::new("id-2", R2, "Ready")]);
        let report = reclaimer.run(&cancel).await.unwrap();

        assert_eq!(report.purged, 0);
        assert!(cloud.calls().purge_attempts.is_empty());
        let tags = tags_of(&cloud, &pool);
        assert!(!tags.contains(R1));
        assert!(!tags.contains(R2));
        assert!(tags.contains("team"));
    }

    #[tokio::test]
    async fn non_allocated_runners_are_ignored() {
        let (cloud, pool, reclaimer) = setup(vec![
            Runner::new("id-1", R1, "Ready"),
            Runner::new("id-2", R2, "Provisioning"),
        ]);
        let cancel = CancellationToken::new();

        reclaimer.run(&cancel).await.unwrap();
        reclaimer.run(&cancel).await.unwrap();

        assert!(cloud.calls().purge_attempts.is_empty());
        assert_eq!(tags_of(&cloud, &pool).keys().collect::<Vec<_>>(), vec!["team"]);
    }

    #[tokio::test]
    async fn runner_outside_name_pattern_is_still_reclaimed() {
        const ODD: &str = "Runner-ABC-0001";
        let (cloud, pool, reclaimer) = setup(vec![Runner::new("id-7", ODD, "Allocated")]);
        let cancel = CancellationToken::new();

        let first = reclaimer.run(&cancel).await.unwrap();
        assert_eq!(first.marked, 1);
        assert!(cloud.calls().purge_attempts.is_empty());
        assert!(tags_of(&cloud, &pool).contains(ODD));

        let second = reclaimer.run(&cancel).await.unwrap();
        assert_eq!(second.purged, 1);
        assert_eq!(
            cloud.calls().purged,
            vec![("rg-runners/gh-pool".to_string(), "id-7".to_string())]
        );
        assert_eq!(tags_of(&cloud, &pool).keys().collect::<Vec<_>>(), vec!["team"]);
    }

    #[tokio::test]
    async fn released_runner_outside_name_pattern_loses_its_marker() {
        const ODD: &str = "Runner-ABC-0001";
        let (cloud, pool, reclaimer) = setup(vec![Runner::new("id-7", ODD, "Allocated")]);
        let cancel = CancellationToken::new();
        reclaimer.run(&cancel).await.unwrap();

        cloud.set_runners(&pool, vec![Runner::new("id-7", ODD, "Ready")]);
        reclaimer.run(&cancel).await.unwrap();

        assert!(cloud.calls().purge_attempts.is_empty());
        assert!(!tags_of(&cloud, &pool).contains(ODD));
    }

    #[tokio::test]
    async fn runner_listing_failure_skips_only_that_pool() {
        let (cloud, pool, reclaimer) = setup(vec![Runner::new("id-1", R1, "Allocated")]);
        let other = Pool::new("rg-runners", "other");
        cloud.add_pool(other.clone(), vec![Runner::new("id-9", R2, "Allocated")]);
        cloud.fail_runner_listing(&pool);

        let report = reclaimer.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.pools, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.reconciled, 1);
        assert_eq!(cloud.calls().tag_writes, vec!["rg-runners/other"]);
        assert!(!tags_of(&cloud, &pool).contains(R1));
        assert!(tags_of(&cloud, &other).contains(R2));
    }

    #[tokio::test]
    async fn tag_write_failure_is_reported_not_fatal() {
        let (cloud, pool, reclaimer) = setup(vec![Runner::new("id-1", R1, "Allocated")]);
        cloud.fail_tag_write(pool.to_string());

        let report = reclaimer.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.tag_write_failures, 1);
        assert_eq!(report.reconciled, 0);
    }

    #[tokio::test]
    async fn pool_listing_failure_fails_the_pass() {
        let (cloud, _pool, reclaimer) = setup(vec![]);
        cloud.fail_list_pools(true);

        let err = reclaimer.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ReclaimError::ListPools(_)));
    }

    #[tokio::test]
    async fn canceled_before_start_touches_nothing() {
        let (cloud, _pool, reclaimer) = setup(vec![Runner::new("id-1", R1, "Allocated")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = reclaimer.run(&cancel).await.unwrap_err();
        assert!(matches!(err, ReclaimError::Canceled));
        assert!(cloud.calls().tag_writes.is_empty());
    }

    #[tokio::test]
    async fn converges_after_two_passes() {
        let (cloud, pool, reclaimer) = setup(vec![Runner::new("id-1", R1, "Allocated")]);
        let cancel = CancellationToken::new();

        for _ in 0..4 {
            reclaimer.run(&cancel).await.unwrap();
        }
        assert_eq!(cloud.calls().purge_attempts.len(), 1);
        assert_eq!(tags_of(&cloud, &pool).keys().collect::<Vec<_>>(), vec!["team"]);
    }

    #[tokio::test]
    async fn metrics_see_marks_and_purges() {
        let (cloud, _pool, reclaimer) = setup(vec![Runner::new("id-1", R1, "Allocated")]);
        let metrics = Arc::new(RecordingMetrics::default());
        let reclaimer = reclaimer.with_metrics(metrics.clone());
        let cancel = CancellationToken::new();

        reclaimer.run(&cancel).await.unwrap();
        reclaimer.run(&cancel).await.unwrap();

        let seen = metrics.snapshot();
        assert_eq!(seen.marked, 1);
        assert_eq!(seen.reclaimed_ok, 1);
        assert_eq!(seen.passes, 2);
        assert!(cloud.calls().purged.len() == 1);
    }

    /// Cancels the pass right after the first pool's tags are written.
    struct CancelAfterFirstWrite {
        inner: Arc<InMemoryCloud>,
        cancel: CancellationToken,
    }

    #[async_trait]
    impl PoolApi for CancelAfterFirstWrite {
        async fn list_pools(&self) -> CloudResult<Vec<Pool>> {
            self.inner.list_pools().await
        }

        async fn list_runners(&self, pool: &Pool) -> CloudResult<Vec<Runner>> {
            self.inner.list_runners(pool).await
        }

        async fn purge_runner(&self, pool: &Pool, runner_id: &str) -> CloudResult<()> {
            self.inner.purge_runner(pool, runner_id).await
        }

        async fn replace_pool_tags(&self, pool: &Pool, tags: &PoolTags) -> CloudResult<()> {
            let res = self.inner.replace_pool_tags(pool, tags).await;
            self.cancel.cancel();
            res
        }
    }

    #[tokio::test]
    async fn cancel_between_pools_keeps_finished_pools() {
        let (cloud, first, _) = setup(vec![Runner::new("id-1", R1, "Allocated")]);
        let second = Pool::new("rg-runners", "zz-pool");
        cloud.add_pool(second.clone(), vec![Runner::new("id-2", R2, "Allocated")]);

        let cancel = CancellationToken::new();
        let api = Arc::new(CancelAfterFirstWrite {
            inner: cloud.clone(),
            cancel: cancel.clone(),
        });
        let reclaimer = PoolReclaimer::new(api).with_clock(fixed_clock(1_700_000_000));

        let report = reclaimer.run(&cancel).await.unwrap();

        assert!(report.canceled);
        assert_eq!(report.pools, 2);
        assert_eq!(report.reconciled, 1);
        assert_eq!(cloud.calls().tag_writes, vec!["rg-runners/gh-pool"]);
        assert!(tags_of(&cloud, &first).contains(R1));
        assert!(!tags_of(&cloud, &second).contains(R2));
    }
}
