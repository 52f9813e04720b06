use std::{
    fmt,
    str::FromStr,
    sync::{OnceLock, RwLock},
};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use crate::error::LoggerError;

static LOCAL_OFFSET: RwLock<UtcOffset> = RwLock::new(UtcOffset::UTC);
static DETECTED: OnceLock<()> = OnceLock::new();

/// Time zone of log timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerTimeZone {
    #[default]
    Utc,
    Local,
}

impl FromStr for LoggerTimeZone {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" | "z" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Utc => "utc",
            Self::Local => "local",
        })
    }
}

/// Detect and cache the local UTC offset.
///
/// Offset detection is unsound once other threads exist on most Unix targets, so
/// call this from `main` before building the tokio runtime. Falls back to UTC.
pub fn init_local_offset() {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    if let Ok(mut cached) = LOCAL_OFFSET.write() {
        *cached = offset;
    }
    let _ = DETECTED.set(());
}

fn local_offset() -> UtcOffset {
    DETECTED.get_or_init(|| {
        if let Ok(offset) = UtcOffset::current_local_offset() {
            if let Ok(mut cached) = LOCAL_OFFSET.write() {
                *cached = offset;
            }
        }
    });
    LOCAL_OFFSET.read().map(|o| *o).unwrap_or(UtcOffset::UTC)
}

/// RFC3339 timestamps in the configured zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerTimer {
    tz: LoggerTimeZone,
}

impl LoggerTimer {
    pub fn new(tz: LoggerTimeZone) -> Self {
        Self { tz }
    }

    fn stamp(&self, at: OffsetDateTime) -> String {
        let at = match self.tz {
            LoggerTimeZone::Utc => at.to_offset(UtcOffset::UTC),
            LoggerTimeZone::Local => at.to_offset(local_offset()),
        };
        at.format(&Rfc3339)
            .unwrap_or_else(|_| at.unix_timestamp().to_string())
    }
}

impl FormatTime for LoggerTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{} ", self.stamp(OffsetDateTime::now_utc()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_time_zone_names() {
        assert_eq!("UTC".parse::<LoggerTimeZone>().unwrap(), LoggerTimeZone::Utc);
        assert_eq!("z".parse::<LoggerTimeZone>().unwrap(), LoggerTimeZone::Utc);
        assert_eq!(" Local ".parse::<LoggerTimeZone>().unwrap(), LoggerTimeZone::Local);
        assert!("pst".parse::<LoggerTimeZone>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&LoggerTimeZone::Local).unwrap(), r#""local""#);
        let tz: LoggerTimeZone = serde_json::from_str(r#""utc""#).unwrap();
        assert_eq!(tz, LoggerTimeZone::Utc);
    }

    #[test]
    fn utc_stamp_is_rfc3339() {
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(LoggerTimer::new(LoggerTimeZone::Utc).stamp(at), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn local_stamp_keeps_the_instant() {
        init_local_offset();
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let stamp = LoggerTimer::new(LoggerTimeZone::Local).stamp(at);
        let parsed = OffsetDateTime::parse(&stamp, &Rfc3339).unwrap();
        assert_eq!(parsed.unix_timestamp(), 1_700_000_000);
    }
}
