use crate::metrics::backend::{MetricsBackend, ReclaimOutcome, ReclaimTarget};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_marked(&self, _: ReclaimTarget) {}

    #[inline(always)]
    fn record_reclaimed(&self, _: ReclaimTarget, _: ReclaimOutcome) {}

    #[inline(always)]
    fn record_pruned(&self, _: u64) {}

    #[inline(always)]
    fn record_pass(&self, _: ReclaimTarget, _: ReclaimOutcome, _: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_metrics_is_zero_size() {
        assert_eq!(std::mem::size_of::<NoOpMetrics>(), 0);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(ReclaimTarget::Runner.as_label(), "runner");
        assert_eq!(ReclaimTarget::ResourceGroup.as_label(), "resource_group");
        assert_eq!(ReclaimOutcome::Canceled.as_label(), "canceled");
    }

    #[test]
    fn noop_can_be_called_repeatedly() {
        let metrics = NoOpMetrics;
        for _ in 0..1000 {
            metrics.record_marked(ReclaimTarget::Runner);
            metrics.record_reclaimed(ReclaimTarget::ResourceGroup, ReclaimOutcome::Failure);
            metrics.record_pruned(3);
            metrics.record_pass(ReclaimTarget::Runner, ReclaimOutcome::Success, 10);
        }
    }
}
