//! Logging setup for the reclaimer: one global `tracing` subscriber writing text,
//! JSON or journald records with RFC3339 timestamps.
mod config;
mod error;
mod format;
mod install;
mod level;
mod timer;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;
pub use timer::{LoggerTimeZone, LoggerTimer, init_local_offset};

/// Installs the global subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInitialized`] if a global subscriber is
/// already set. With [`LoggerTimeZone::Local`], call [`init_local_offset`] before
/// the runtime starts its worker threads.
///
/// # Examples
/// ```rust
/// use reclaim_observe::{LoggerConfig, LoggerFormat, init_logger};
///
/// let cfg = LoggerConfig {
///     format: LoggerFormat::Json,
///     ..Default::default()
/// };
/// init_logger(&cfg).expect("logger installed once");
///
/// tracing::info!(pass = "pools", "logger ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => install::text(cfg),
        LoggerFormat::Json => install::json(cfg),
        LoggerFormat::Journald => install::journald(cfg),
    }
}
