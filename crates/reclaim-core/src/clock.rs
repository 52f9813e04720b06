use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Source of the current time for registry and pool timestamps.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Registry value: epoch seconds as a decimal string.
pub(crate) fn epoch_stamp(at: OffsetDateTime) -> String {
    at.unix_timestamp().to_string()
}

/// Pool tag value: RFC3339 in UTC, epoch seconds if formatting fails.
pub(crate) fn rfc3339_stamp(at: OffsetDateTime) -> String {
    at.to_offset(time::UtcOffset::UTC)
        .format(&Rfc3339)
        .unwrap_or_else(|_| epoch_stamp(at))
}
