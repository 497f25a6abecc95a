//! Time-decayed running average for latency-style observations.
//!
//! Older samples lose weight exponentially with the time elapsed between
//! observations, so one historical spike cannot skew the reported figure
//! forever. Decay happens only when a new sample arrives: an idle averager
//! keeps reporting the same value.

use std::f64::consts::LN_2;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_HALF_LIFE;

/// Point-in-time read of an [`Averager`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AveragerSnapshot {
    /// Decayed average of accepted samples
    pub average: f64,
    /// Number of accepted samples since creation
    pub count: u64,
    /// Undecayed sum of accepted samples since creation
    pub sum: f64,
}

#[derive(Debug, Default)]
struct DecayState {
    weighted_sum: f64,
    weight: f64,
    last_at: Option<Instant>,
    count: u64,
    sum: f64,
}

impl DecayState {
    /// Ages the accumulators to `at`. Timestamps at or before the last
    /// observation apply no decay.
    #[inline]
    fn decay_to(&mut self, at: Instant, half_life_secs: f64) {
        match self.last_at {
            Some(last) if at > last => {
                let elapsed = at.duration_since(last).as_secs_f64();
                let factor = (-LN_2 * elapsed / half_life_secs).exp();
                self.weighted_sum *= factor;
                self.weight *= factor;
                // Fully decayed history carries no information.
                if self.weight == 0.0 {
                    self.weighted_sum = 0.0;
                }
                self.last_at = Some(at);
            }
            Some(_) => {}
            None => self.last_at = Some(at),
        }
    }

    #[inline]
    fn average(&self) -> f64 {
        if self.weight > 0.0 {
            (self.weighted_sum / self.weight).max(0.0)
        } else {
            0.0
        }
    }
}

/// Thread-safe, exponentially time-decayed average.
///
/// Each instance serializes its own state behind a short critical section;
/// no allocation happens on [`observe`](Averager::observe).
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use lsm_metrics::metrics::Averager;
///
/// let averager = Averager::new(Duration::from_secs(10));
/// assert_eq!(averager.value(), 0.0);
///
/// let now = Instant::now();
/// averager.observe(0.5, now);
/// averager.observe(0.5, now);
/// assert_eq!(averager.value(), 0.5);
/// ```
#[derive(Debug)]
pub struct Averager {
    half_life_secs: f64,
    state: Mutex<DecayState>,
}

impl Default for Averager {
    fn default() -> Self {
        Self::new(DEFAULT_HALF_LIFE)
    }
}

impl Averager {
    /// Creates an empty averager. A zero half-life is replaced with the
    /// default.
    pub fn new(half_life: Duration) -> Self {
        let half_life = if half_life.is_zero() {
            DEFAULT_HALF_LIFE
        } else {
            half_life
        };
        Self {
            half_life_secs: half_life.as_secs_f64(),
            state: Mutex::new(DecayState::default()),
        }
    }

    /// Records one sample observed at `at`.
    ///
    /// Negative samples are clamped to zero. NaN and infinite samples, and
    /// samples that would overflow the decayed sum, are dropped without
    /// touching the averaged state. The lifetime sum saturates at
    /// `f64::MAX`.
    #[inline]
    pub fn observe(&self, value: f64, at: Instant) {
        if !value.is_finite() {
            tracing::warn!(value, "Ignoring non-finite averager sample");
            return;
        }
        let value = if value < 0.0 {
            tracing::debug!(value, "Clamping negative averager sample to zero");
            0.0
        } else {
            value
        };

        let mut state = self.lock();
        state.decay_to(at, self.half_life_secs);
        let weighted_sum = state.weighted_sum + value;
        if !weighted_sum.is_finite() {
            tracing::warn!(value, "Dropping averager sample that overflows the running sum");
            return;
        }
        state.weighted_sum = weighted_sum;
        state.weight += 1.0;
        state.count += 1;
        state.sum = (state.sum + value).min(f64::MAX);
    }

    /// Records a duration sample in seconds.
    #[inline]
    pub fn observe_duration(&self, duration: Duration, at: Instant) {
        self.observe(duration.as_secs_f64(), at);
    }

    /// Returns the current decayed average, or 0.0 before any sample.
    pub fn value(&self) -> f64 {
        self.lock().average()
    }

    /// Returns the number of accepted samples.
    pub fn count(&self) -> u64 {
        self.lock().count
    }

    /// Returns the undecayed sum of accepted samples.
    pub fn sum(&self) -> f64 {
        self.lock().sum
    }

    /// Returns average, count and sum read under one lock.
    pub fn snapshot(&self) -> AveragerSnapshot {
        let state = self.lock();
        AveragerSnapshot {
            average: state.average(),
            count: state.count,
            sum: state.sum,
        }
    }

    // The state is plain numbers updated after all checks, so a panic in
    // another holder cannot leave it half-written.
    #[inline]
    fn lock(&self) -> std::sync::MutexGuard<'_, DecayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
