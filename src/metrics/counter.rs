//! Lock-free counter and gauge.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Monotonically increasing count.
///
/// Uses `Ordering::Relaxed`: each counter is independent and atomic RMW
/// operations on one location are already linearizable.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_by(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Integer that moves up and down.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn decrement(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    /// Decrements unless the value is already at or below `floor`.
    ///
    /// Returns false when the decrement was refused.
    #[inline]
    pub fn decrement_floor(&self, floor: i64) -> bool {
        self.value
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                (v > floor).then(|| v - 1)
            })
            .is_ok()
    }

    #[inline]
    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_increments() {
        let c = Counter::new();
        assert_eq!(c.value(), 0);
        c.increment();
        c.increment();
        c.increment_by(5);
        assert_eq!(c.value(), 7);
    }

    #[test]
    fn test_gauge_up_and_down() {
        let g = Gauge::new();
        g.increment();
        g.increment();
        g.decrement();
        assert_eq!(g.value(), 1);

        g.decrement();
        g.decrement();
        assert_eq!(g.value(), -1);
    }

    #[test]
    fn test_gauge_decrement_floor() {
        let g = Gauge::new();
        assert!(!g.decrement_floor(0));
        assert_eq!(g.value(), 0);

        g.increment();
        assert!(g.decrement_floor(0));
        assert_eq!(g.value(), 0);
        assert!(!g.decrement_floor(0));
        assert_eq!(g.value(), 0);
    }

    #[test]
    fn test_counter_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let c = Arc::new(Counter::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let c = Arc::clone(&c);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        c.increment();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(c.value(), 10_000);
    }
}
