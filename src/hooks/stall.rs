use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::clock::saturating_nanos;

/// Sentinel for "no stall in progress".
const NOT_STALLED: u64 = 0;

/// Lock-free record of the current write stall's start time.
///
/// The start is stored as nanoseconds since `origin`, offset by one so that
/// zero can mean "not stalled".
#[derive(Debug)]
pub struct StallTracker {
    origin: Instant,
    started_at: AtomicU64,
}

impl StallTracker {
    pub fn new(origin: Instant) -> Self {
        Self {
            origin,
            started_at: AtomicU64::new(NOT_STALLED),
        }
    }

    /// Marks a stall as started at `now`.
    ///
    /// Returns true if a stall was already in progress; its start is replaced.
    #[inline]
    pub fn begin(&self, now: Instant) -> bool {
        self.started_at.swap(self.mark(now), Ordering::AcqRel) != NOT_STALLED
    }

    /// Ends the current stall and returns how long it lasted.
    ///
    /// Returns `None` if no stall was in progress.
    #[inline]
    pub fn end(&self, now: Instant) -> Option<Duration> {
        match self.started_at.swap(NOT_STALLED, Ordering::AcqRel) {
            NOT_STALLED => None,
            start => Some(Duration::from_nanos(self.mark(now).saturating_sub(start))),
        }
    }

    pub fn is_stalled(&self) -> bool {
        self.started_at.load(Ordering::Acquire) != NOT_STALLED
    }

    #[inline]
    fn mark(&self, at: Instant) -> u64 {
        saturating_nanos(at.saturating_duration_since(self.origin)).saturating_add(1)
    }
}
