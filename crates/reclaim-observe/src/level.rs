use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::LoggerError;

/// A validated `EnvFilter` directive string.
///
/// Used at the configuration layer:
/// - it keeps the raw directives (e.g. `"info"`, `"reclaim_core=debug,warn"`);
/// - it rejects strings `EnvFilter::try_new` cannot parse when read from config or env;
/// - it is turned into a live `EnvFilter` only when the logger is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    /// Validate `directives` and wrap them.
    ///
    /// # Examples
    /// ```
    /// use reclaim_observe::LoggerLevel;
    ///
    /// let lvl = LoggerLevel::new("reclaim_core=debug,info").unwrap();
    /// assert_eq!(lvl.as_str(), "reclaim_core=debug,info");
    ///
    /// assert!(LoggerLevel::new("reclaim_core=loud").is_err());
    /// ```
    pub fn new(directives: impl Into<String>) -> Result<Self, LoggerError> {
        Self::try_from(directives.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the filter. The string was checked on construction, so a failure here
    /// only happens if the directives stop parsing between calls; the filter then
    /// falls back to `info`.
    pub fn to_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.0).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;

    fn try_from(directives: String) -> Result<Self, Self::Error> {
        if directives.trim().is_empty() {
            return Err(LoggerError::InvalidLevel {
                input: directives,
                reason: "empty filter".into(),
            });
        }
        match EnvFilter::try_new(&directives) {
            Ok(_) => Ok(Self(directives)),
            Err(e) => Err(LoggerError::InvalidLevel {
                input: directives,
                reason: e.to_string(),
            }),
        }
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl From<LoggerLevel> for String {
    fn from(level: LoggerLevel) -> Self {
        level.0
    }
}
