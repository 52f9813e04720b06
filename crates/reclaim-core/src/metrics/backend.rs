use std::sync::Arc;

/// Kind of resource a metric refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclaimTarget {
    /// Runner registration within a pool.
    Runner,
    /// Resource group.
    ResourceGroup,
}

impl ReclaimTarget {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ReclaimTarget::Runner => "runner",
            ReclaimTarget::ResourceGroup => "resource_group",
        }
    }
}

/// Outcome of a reclaim call or of a whole pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclaimOutcome {
    Success,
    Failure,
    Canceled,
}

impl ReclaimOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ReclaimOutcome::Success => "success",
            ReclaimOutcome::Failure => "failure",
            ReclaimOutcome::Canceled => "canceled",
        }
    }
}

/// Backend metrics collection interface.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record a first sighting that was registered for reclamation.
    fn record_marked(&self, target: ReclaimTarget);

    /// Record a purge or delete attempt and how it ended.
    fn record_reclaimed(&self, target: ReclaimTarget, outcome: ReclaimOutcome);

    /// Record stale registry entries removed by a pass.
    fn record_pruned(&self, count: u64);

    /// Record a finished pass with its outcome and duration.
    fn record_pass(&self, target: ReclaimTarget, outcome: ReclaimOutcome, duration_ms: u64);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
