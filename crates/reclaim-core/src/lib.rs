//! Tag-based mark-and-sweep reclamation of runner registrations and resource groups.
//!
//! The reclaimer keeps no state of its own: every pass reads the tags of the cloud
//! resources it manages, decides in memory, and writes the tags back in one update.
//! A candidate is only ever deleted on the second pass that observes it.
pub mod clock;
pub mod cloud;
pub mod config;
pub mod driver;
pub mod error;
pub mod group;
pub mod metrics;
pub mod pool;
pub mod registry;

#[cfg(test)]
mod testing;

pub use clock::{Clock, FixedClock, SystemClock};
pub use cloud::{CloudError, CloudResult, PoolApi, ResourceGroupApi};
pub use config::ReclaimConfig;
pub use driver::{CYCLE_TASK_NAME, CycleReport, Driver, cycle_spec};
pub use error::ReclaimError;
pub use group::{GroupPassReport, GroupReclaimer, SweepPlan, ensure_recorder, plan_sweep};
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, ReclaimOutcome, ReclaimTarget, noop_metrics};
pub use pool::{PoolPassReport, PoolReclaimer, rebuild_pool_tags};
pub use registry::Registry;

pub mod prelude {
    pub use crate::cloud::{CloudError, PoolApi, ResourceGroupApi};
    pub use crate::driver::Driver;
    pub use crate::error::ReclaimError;
    pub use crate::group::GroupReclaimer;
    pub use crate::pool::PoolReclaimer;
}
