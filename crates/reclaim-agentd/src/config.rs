use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use reclaim_core::ReclaimConfig;
use reclaim_observe::{LoggerConfig, LoggerError};

pub const CONFIG_ENV: &str = "RECLAIM_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error(transparent)]
    Logger(#[from] LoggerError),
}

/// Daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub logger: LoggerConfig,
    pub reclaim: ReclaimConfig,
    /// JSON cloud snapshot to rehearse against. Empty cloud when unset.
    pub snapshot: Option<PathBuf>,
    /// Where to write the cloud state on exit.
    pub snapshot_out: Option<PathBuf>,
    /// Run a single cycle and exit.
    pub once: bool,
    /// Print the Prometheus exposition on exit.
    pub print_metrics: bool,
}

impl AgentConfig {
    /// Read the file named by `RECLAIM_CONFIG` (defaults if unset), then apply
    /// `RECLAIM_*` overrides from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        cfg.apply_env(|var| std::env::var(var).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = var("RECLAIM_LOG_LEVEL") {
            self.logger.level = level.parse()?;
        }
        if let Some(format) = var("RECLAIM_LOG_FORMAT") {
            self.logger.format = format.parse()?;
        }
        if let Some(secs) = var("RECLAIM_INTERVAL_SECS") {
            self.reclaim.interval_secs = secs.trim().parse().map_err(|e| ConfigError::Env {
                var: "RECLAIM_INTERVAL_SECS",
                reason: format!("{e}"),
            })?;
        }
        if let Some(path) = var("RECLAIM_SNAPSHOT") {
            self.snapshot = Some(PathBuf::from(path));
        }
        if let Some(once) = var("RECLAIM_ONCE") {
            self.once = parse_flag(&once).ok_or_else(|| ConfigError::Env {
                var: "RECLAIM_ONCE",
                reason: format!("expected a boolean, got {once:?}"),
            })?;
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use reclaim_observe::LoggerFormat;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_run_periodically_on_empty_cloud() {
        let cfg = AgentConfig::default();

        assert!(!cfg.once);
        assert!(cfg.snapshot.is_none());
        assert_eq!(cfg.reclaim.interval_secs, 3600);
    }

    #[test]
    fn nested_sections_deserialize() {
        let cfg: AgentConfig = serde_json::from_str(
            r#"{"logger": {"format": "json"}, "reclaim": {"registry_capacity": 5}, "once": true}"#,
        )
        .unwrap();

        assert_eq!(cfg.logger.format, LoggerFormat::Json);
        assert_eq!(cfg.reclaim.registry_capacity, 5);
        assert_eq!(cfg.reclaim.recorder_name, "residualrgrecorder");
        assert!(cfg.once);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = AgentConfig::default();
        cfg.apply_env(env(&[
            ("RECLAIM_LOG_LEVEL", "reclaim_core=debug,info"),
            ("RECLAIM_LOG_FORMAT", "json"),
            ("RECLAIM_INTERVAL_SECS", " 600 "),
            ("RECLAIM_SNAPSHOT", "/tmp/cloud.json"),
            ("RECLAIM_ONCE", "yes"),
        ]))
        .unwrap();

        assert_eq!(cfg.logger.level.as_str(), "reclaim_core=debug,info");
        assert_eq!(cfg.logger.format, LoggerFormat::Json);
        assert_eq!(cfg.reclaim.interval_secs, 600);
        assert_eq!(cfg.snapshot, Some(PathBuf::from("/tmp/cloud.json")));
        assert!(cfg.once);
    }

    #[test]
    fn bad_env_values_are_reported() {
        let cases = [
            ("RECLAIM_INTERVAL_SECS", "hourly"),
            ("RECLAIM_ONCE", "maybe"),
            ("RECLAIM_LOG_FORMAT", "xml"),
            ("RECLAIM_LOG_LEVEL", "core=shout"),
        ];
        for (var, value) in cases {
            let mut cfg = AgentConfig::default();
            assert!(cfg.apply_env(env(&[(var, value)])).is_err(), "{var}={value} accepted");
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AgentConfig::from_file(Path::new("/nonexistent/reclaim.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
