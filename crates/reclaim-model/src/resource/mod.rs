mod group;
pub use group::ResourceGroup;

mod pool;
pub use pool::{Pool, Runner, RunnerStatus};
