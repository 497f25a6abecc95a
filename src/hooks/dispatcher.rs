//! Translates storage-engine callbacks into registry updates.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::StallTracker;
use crate::clock::{Clock, SystemClock};
use crate::contracts::{
    CompactionInfo, EventListener, MalformedEvent, WriteStallBeginInfo, BASE_LEVEL,
};
use crate::metrics::{names, Averager, AveragerSnapshot, Counter, Gauge, MetricsRegistry};

/// Typed read of the engine metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineMetricsSnapshot {
    /// Decayed write stall duration in seconds
    pub write_stall: AveragerSnapshot,
    /// Decayed point read latency in seconds
    pub read_latency: AveragerSnapshot,
    pub l0_compactions: u64,
    pub other_compactions: u64,
    pub active_compactions: i64,
    pub malformed_events: u64,
}

/// Engine event hooks backed by a [`MetricsRegistry`].
///
/// Metric handles are resolved once at construction, so every callback is
/// a handful of atomic operations (plus one short lock for averagers) with
/// no lookups or allocation.
pub struct EventHookDispatcher<C: Clock = SystemClock> {
    registry: Arc<MetricsRegistry>,
    clock: C,
    stall: StallTracker,
    write_stall: Arc<Averager>,
    read_latency: Arc<Averager>,
    l0_compactions: Arc<Counter>,
    other_compactions: Arc<Counter>,
    active_compactions: Arc<Gauge>,
    malformed_events: Arc<Counter>,
}

impl EventHookDispatcher<SystemClock> {
    /// Creates a dispatcher timed by the system clock.
    ///
    /// # Panics
    /// If `registry` lacks any metric in [`names::STANDARD`].
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self::with_clock(registry, SystemClock)
    }
}

impl<C: Clock> EventHookDispatcher<C> {
    /// Creates a dispatcher timed by `clock`.
    ///
    /// # Panics
    /// If `registry` lacks any metric in [`names::STANDARD`].
    pub fn with_clock(registry: Arc<MetricsRegistry>, clock: C) -> Self {
        let stall = StallTracker::new(clock.now());
        Self {
            write_stall: registry.averager(names::WRITE_STALL),
            read_latency: registry.averager(names::READ_LATENCY),
            l0_compactions: registry.counter(names::L0_COMPACTIONS),
            other_compactions: registry.counter(names::OTHER_COMPACTIONS),
            active_compactions: registry.gauge(names::ACTIVE_COMPACTIONS),
            malformed_events: registry.counter(names::MALFORMED_EVENTS),
            registry,
            clock,
            stall,
        }
    }

    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    /// Returns true between a stall begin and its end.
    pub fn is_write_stalled(&self) -> bool {
        self.stall.is_stalled()
    }

    /// Starts timing a point read. The latency is recorded when the
    /// returned guard drops.
    pub fn start_get(&self) -> GetTimer<'_, C> {
        GetTimer {
            dispatcher: self,
            started: self.clock.now(),
        }
    }

    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            write_stall: self.write_stall.snapshot(),
            read_latency: self.read_latency.snapshot(),
            l0_compactions: self.l0_compactions.value(),
            other_compactions: self.other_compactions.value(),
            active_compactions: self.active_compactions.value(),
            malformed_events: self.malformed_events.value(),
        }
    }

    #[cold]
    fn absorb(&self, err: MalformedEvent) {
        self.malformed_events.increment();
        tracing::warn!(error = %err, "Skipping compaction classification");
    }
}

impl<C: Clock> EventListener for EventHookDispatcher<C> {
    #[inline]
    fn on_compaction_begin(&self, info: &CompactionInfo) {
        self.active_compactions.increment();
        match info.lowest_input_level() {
            Ok(BASE_LEVEL) => self.l0_compactions.increment(),
            Ok(_) => self.other_compactions.increment(),
            Err(err) => self.absorb(err),
        }
    }

    #[inline]
    fn on_compaction_end(&self, info: &CompactionInfo) {
        if !self.active_compactions.decrement_floor(0) {
            tracing::debug!(
                job_id = info.job_id,
                "Compaction ended without a matching begin"
            );
        }
    }

    fn on_write_stall_begin(&self, info: &WriteStallBeginInfo) {
        if self.stall.begin(self.clock.now()) {
            tracing::debug!("Write stall began while already stalled, restarting span");
        }
        tracing::debug!(reason = %info.reason, "Write stall began");
    }

    fn on_write_stall_end(&self) {
        let now = self.clock.now();
        let elapsed = self.stall.end(now).unwrap_or_else(|| {
            tracing::debug!("Write stall ended without a matching begin");
            Duration::ZERO
        });
        self.write_stall.observe_duration(elapsed, now);
    }

    #[inline]
    fn observe_get(&self, duration: Duration) {
        self.read_latency.observe_duration(duration, self.clock.now());
    }
}

/// Guard returned by [`EventHookDispatcher::start_get`].
#[must_use = "the read latency is recorded when the timer drops"]
pub struct GetTimer<'a, C: Clock> {
    dispatcher: &'a EventHookDispatcher<C>,
    started: Instant,
}

impl<C: Clock> GetTimer<'_, C> {
    /// Time elapsed since the timer started.
    pub fn elapsed(&self) -> Duration {
        self.dispatcher
            .clock
            .now()
            .saturating_duration_since(self.started)
    }
}

impl<C: Clock> Drop for GetTimer<'_, C> {
    fn drop(&mut self) {
        self.dispatcher.observe_get(self.elapsed());
    }
}
