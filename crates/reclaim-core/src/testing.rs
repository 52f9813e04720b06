//! Shared helpers for unit tests.
use std::sync::{Arc, Mutex};

use time::OffsetDateTime;

use crate::{
    clock::{Clock, FixedClock},
    metrics::{MetricsBackend, ReclaimOutcome, ReclaimTarget},
};

pub(crate) fn fixed_clock(epoch_secs: i64) -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        OffsetDateTime::from_unix_timestamp(epoch_secs).unwrap(),
    ))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Seen {
    pub marked: u64,
    pub reclaimed_ok: u64,
    pub reclaimed_failed: u64,
    pub reclaimed_canceled: u64,
    pub pruned: u64,
    pub passes: u64,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingMetrics(Mutex<Seen>);

impl RecordingMetrics {
    pub fn snapshot(&self) -> Seen {
        self.0.lock().unwrap().clone()
    }
}

impl MetricsBackend for RecordingMetrics {
    fn record_marked(&self, _: ReclaimTarget) {
        self.0.lock().unwrap().marked += 1;
    }

    fn record_reclaimed(&self, _: ReclaimTarget, outcome: ReclaimOutcome) {
        let mut s = self.0.lock().unwrap();
        match outcome {
            ReclaimOutcome::Success => s.reclaimed_ok += 1,
            ReclaimOutcome::Failure => s.reclaimed_failed += 1,
            ReclaimOutcome::Canceled => s.reclaimed_canceled += 1,
        }
    }

    fn record_pruned(&self, count: u64) {
        self.0.lock().unwrap().pruned += count;
    }

    fn record_pass(&self, _: ReclaimTarget, _: ReclaimOutcome, _: u64) {
        self.0.lock().unwrap().passes += 1;
    }
}
