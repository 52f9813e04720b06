use std::sync::Arc;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, IntCounter, Opts, Registry, proto::MetricFamily};

use reclaim_core::{MetricsBackend, ReclaimOutcome, ReclaimTarget};

const NAMESPACE: &str = "reclaim";

/// Prometheus metrics backend.
///
/// Labels are bounded: `target` is `runner` or `resource_group`, `outcome` is
/// `success`, `failure` or `canceled`. Resource names never become labels.
#[derive(Clone)]
pub struct PrometheusMetrics {
    marked: CounterVec,
    reclaimed: CounterVec,
    pruned: IntCounter,
    pass_duration: HistogramVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register all collectors on `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let marked = CounterVec::new(
            Opts::new("marked_total", "Resources registered on first sighting").namespace(NAMESPACE),
            &["target"],
        )?;
        registry.register(Box::new(marked.clone()))?;

        let reclaimed = CounterVec::new(
            Opts::new("reclaimed_total", "Purge and delete attempts by outcome").namespace(NAMESPACE),
            &["target", "outcome"],
        )?;
        registry.register(Box::new(reclaimed.clone()))?;

        let pruned = IntCounter::with_opts(
            Opts::new("pruned_total", "Stale registry entries removed").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(pruned.clone()))?;

        let pass_duration = HistogramVec::new(
            HistogramOpts::new("pass_duration_seconds", "Duration of a reclaim pass in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0]),
            &["target", "outcome"],
        )?;
        registry.register(Box::new(pass_duration.clone()))?;

        Ok(Self {
            marked,
            reclaimed,
            pruned,
            pass_duration,
            registry,
        })
    }

    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metric families for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_marked(&self, target: ReclaimTarget) {
        self.marked.with_label_values(&[target.as_label()]).inc();
    }

    fn record_reclaimed(&self, target: ReclaimTarget, outcome: ReclaimOutcome) {
        self.reclaimed
            .with_label_values(&[target.as_label(), outcome.as_label()])
            .inc();
    }

    fn record_pruned(&self, count: u64) {
        self.pruned.inc_by(count);
    }

    fn record_pass(&self, target: ReclaimTarget, outcome: ReclaimOutcome, duration_ms: u64) {
        self.pass_duration
            .with_label_values(&[target.as_label(), outcome.as_label()])
            .observe(duration_ms as f64 / 1000.0);
    }
}
