//! Metrics collection abstraction for reclaim passes.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are handed to
//! the reclaimers as a [`MetricsHandle`].
mod backend;
pub use backend::{MetricsBackend, MetricsHandle, ReclaimOutcome, ReclaimTarget};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
