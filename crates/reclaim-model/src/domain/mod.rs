mod constants;
pub use constants::{DEFAULT_RECORDER_NAME, DEFAULT_REGISTRY_CAPACITY, DEFAULT_RUNNER_NAME_PATTERN};
pub use constants::{DO_NOT_DELETE_TAG, RESERVED_SYSTEM_PREFIX};

mod tags;
pub use tags::{PoolTags, TagSet};

mod pattern;
pub use pattern::RunnerNamePattern;
