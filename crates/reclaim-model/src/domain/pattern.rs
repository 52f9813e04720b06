use std::fmt;

use regex::Regex;

use crate::{DEFAULT_RUNNER_NAME_PATTERN, ModelError, ModelResult};

/// Lexical pattern that marks a pool tag key as reclaimer-owned.
///
/// Keys matching the pattern are runner names recorded by a previous pass; all other
/// keys belong to someone else and must be carried over untouched. The match is a
/// namespacing convention only, not an identity check.
///
/// # Examples
/// ```
/// use reclaim_model::RunnerNamePattern;
///
/// let pattern = RunnerNamePattern::default();
/// assert!(pattern.is_runner_key("abc123def456789"));
/// assert!(!pattern.is_runner_key("owner"));
/// assert!(!pattern.is_runner_key("xabc123def456789"));
/// ```
#[derive(Clone)]
pub struct RunnerNamePattern(Regex);

impl RunnerNamePattern {
    /// Compile a pattern. It should be anchored, otherwise any key that merely
    /// contains a matching run is claimed.
    pub fn new(pattern: &str) -> ModelResult<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| ModelError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Returns `true` if the key is a runner name owned by the reclaimer.
    #[inline]
    pub fn is_runner_key(&self, key: &str) -> bool {
        self.0.is_match(key)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for RunnerNamePattern {
    fn default() -> Self {
        Self::new(DEFAULT_RUNNER_NAME_PATTERN).expect("default runner name pattern must compile")
    }
}

impl fmt::Debug for RunnerNamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RunnerNamePattern").field(&self.as_str()).finish()
    }
}
