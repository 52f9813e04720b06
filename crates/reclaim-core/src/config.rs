use std::time::Duration;

use serde::{Deserialize, Serialize};

use reclaim_model::{
    DEFAULT_RECORDER_NAME, DEFAULT_REGISTRY_CAPACITY, DEFAULT_RUNNER_NAME_PATTERN,
    DO_NOT_DELETE_TAG, ModelError, ModelResult, ProtectionFilter, RESERVED_SYSTEM_PREFIX,
    RunnerNamePattern,
};

/// One hour between passes.
pub const DEFAULT_INTERVAL_SECS: u64 = 3_600;

/// Upper bound for one supervised cycle.
pub const DEFAULT_CYCLE_TIMEOUT_SECS: u64 = 1_800;

/// Reclaimer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReclaimConfig {
    /// Resource group whose tags hold the registry. Created if missing.
    pub recorder_name: String,
    /// Maximum number of registry entries.
    pub registry_capacity: usize,
    /// Name prefixes of infrastructure-managed groups.
    pub reserved_prefixes: Vec<String>,
    /// Extra protected names. Only their hashes are kept in memory.
    pub protected_names: Vec<String>,
    /// Extra protected names as hex MD5.
    pub protected_name_hashes: Vec<String>,
    /// Tag key that exempts a group from reclamation.
    pub do_not_delete_key: String,
    /// Pattern of pool tag keys owned by the reclaimer.
    pub runner_name_pattern: String,
    /// Delay between passes when running periodically.
    pub interval_secs: u64,
    /// Time limit of one supervised cycle; `0` disables it.
    pub cycle_timeout_secs: u64,
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            recorder_name: DEFAULT_RECORDER_NAME.to_string(),
            registry_capacity: DEFAULT_REGISTRY_CAPACITY,
            reserved_prefixes: vec![RESERVED_SYSTEM_PREFIX.to_string()],
            protected_names: Vec::new(),
            protected_name_hashes: Vec::new(),
            do_not_delete_key: DO_NOT_DELETE_TAG.to_string(),
            runner_name_pattern: DEFAULT_RUNNER_NAME_PATTERN.to_string(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            cycle_timeout_secs: DEFAULT_CYCLE_TIMEOUT_SECS,
        }
    }
}

impl ReclaimConfig {
    /// Check every field, building the filter and pattern along the way.
    pub fn validate(&self) -> ModelResult<()> {
        if self.registry_capacity == 0 {
            return Err(ModelError::Invalid("registry_capacity must be at least 1".into()));
        }
        if self.interval_secs == 0 {
            return Err(ModelError::Invalid("interval_secs must be at least 1".into()));
        }
        self.protection_filter()?;
        self.runner_name_pattern()?;
        Ok(())
    }

    /// Build the protection filter used by the group pass.
    ///
    /// Starts from the built-in rules (recorder name, reserved prefixes, platform
    /// denylist and the `do_not_delete` marker) and adds every configured name and
    /// hash. Plain names are hashed on the way in.
    ///
    /// # Examples
    /// ```
    /// use reclaim_core::ReclaimConfig;
    /// use reclaim_model::TagSet;
    ///
    /// let cfg = ReclaimConfig {
    ///     protected_names: vec!["shared-dns".into()],
    ///     ..Default::default()
    /// };
    /// let filter = cfg.protection_filter().unwrap();
    /// let none: TagSet = TagSet::new();
    ///
    /// assert!(filter.is_protected("shared-dns", &none));
    /// assert!(filter.is_protected("MC_cluster", &none));
    /// assert!(!filter.is_protected("scratch", &none));
    /// ```
    pub fn protection_filter(&self) -> ModelResult<ProtectionFilter> {
        if self.recorder_name.trim().is_empty() {
            return Err(ModelError::Invalid("recorder_name must not be empty".into()));
        }
        if self.do_not_delete_key.is_empty() {
            return Err(ModelError::Invalid("do_not_delete_key must not be empty".into()));
        }
        let mut filter = ProtectionFilter::new(self.recorder_name.clone())
            .with_reserved_prefixes(self.reserved_prefixes.iter().cloned())
            .with_marker_key(self.do_not_delete_key.clone());
        for name in &self.protected_names {
            filter.deny_name(name);
        }
        for hash in &self.protected_name_hashes {
            filter.deny_hash(hash)?;
        }
        Ok(filter)
    }

    pub fn runner_name_pattern(&self) -> ModelResult<RunnerNamePattern> {
        RunnerNamePattern::new(&self.runner_name_pattern)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn cycle_timeout(&self) -> Option<Duration> {
        (self.cycle_timeout_secs > 0).then(|| Duration::from_secs(self.cycle_timeout_secs))
    }
}
