//! Prometheus implementation of [`reclaim_core::MetricsBackend`].
//!
//! ## Metrics
//! - `reclaim_marked_total{target}` - first sightings registered
//! - `reclaim_reclaimed_total{target, outcome}` - purge/delete attempts
//! - `reclaim_pruned_total` - stale registry entries removed
//! - `reclaim_pass_duration_seconds{target, outcome}` - pass latency
//!
//! Exposition over HTTP is left to the embedding application:
//!
//! ```rust,ignore
//! let families = metrics.gather();
//! let mut buffer = Vec::new();
//! TextEncoder::new().encode(&families, &mut buffer)?;
//! ```
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
