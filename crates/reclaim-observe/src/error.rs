use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?} (expected text, json or journald)")]
    InvalidFormat(String),

    #[error("invalid log filter {input:?}: {reason}")]
    InvalidLevel { input: String, reason: String },

    #[error("unknown time zone {0:?} (expected utc or local)")]
    InvalidTimeZone(String),

    #[error("journald output is only available on Linux")]
    JournaldNotSupported,

    #[error("cannot connect to journald: {0}")]
    JournaldInitFailed(String),

    #[error("a global logger is already installed")]
    AlreadyInitialized,
}

pub type LoggerResult<T> = Result<T, LoggerError>;
