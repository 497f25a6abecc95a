//! Concurrency tests for the metrics core.
//!
//! Engine callbacks arrive from many background threads at once; these
//! tests hammer each metric and the dispatcher and check the totals.
//! Run with: cargo test --test concurrency_tests

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use lsm_metrics::config::MetricsConfig;
use lsm_metrics::contracts::{CompactionInfo, EventListener, LevelInfo, WriteStallBeginInfo};
use lsm_metrics::hooks::EventHookDispatcher;
use lsm_metrics::metrics::{Averager, Counter, Gauge, MetricsRegistry};

fn create_dispatcher() -> Arc<EventHookDispatcher> {
    let registry = MetricsRegistry::standard(&MetricsConfig::default()).unwrap();
    Arc::new(EventHookDispatcher::new(Arc::new(registry)))
}

fn compaction(job_id: u64, levels: &[u8]) -> CompactionInfo {
    CompactionInfo {
        job_id,
        inputs: levels.iter().map(|&l| LevelInfo::new(l, vec![])).collect(),
        output: LevelInfo::default(),
    }
}

// =============================================================================
// Primitive Tests
// =============================================================================

/// N increments from any number of threads sum to N.
#[test]
fn parallel_counter_increments_are_not_lost() {
    let counter = Arc::new(Counter::new());
    let num_threads = 16;
    let per_thread = 5_000;

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let c = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..per_thread {
                    c.increment();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(counter.value(), (num_threads * per_thread) as u64);
}

/// Balanced increments/decrements return the gauge to zero, and a gauge
/// whose decrements always follow their increments never dips below zero.
#[test]
fn balanced_gauge_never_negative() {
    let gauge = Arc::new(Gauge::new());
    let num_threads = 8;

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let g = Arc::clone(&gauge);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    g.increment();
                    assert!(g.value() >= 0, "gauge went negative");
                    g.decrement();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(gauge.value(), 0);
}

/// Concurrent observations never produce a negative average or lose samples.
#[test]
fn parallel_averager_observations() {
    let averager = Arc::new(Averager::new(Duration::from_millis(50)));
    let num_threads = 8;
    let per_thread = 2_000;

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let a = Arc::clone(&averager);
            thread::spawn(move || {
                for i in 0..per_thread {
                    // Mix in negative and non-finite samples.
                    let value = match i % 7 {
                        0 => -1.0,
                        1 if t == 0 => f64::NAN,
                        _ => (i % 100) as f64 / 1000.0,
                    };
                    a.observe(value, Instant::now());
                    assert!(a.value() >= 0.0);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let nan_samples = (0..per_thread).filter(|i| i % 7 == 1).count() as u64;
    let snap = averager.snapshot();
    assert_eq!(
        snap.count,
        (num_threads * per_thread) as u64 - nan_samples
    );
    assert!(snap.average >= 0.0 && snap.average <= 0.099);
}

// =============================================================================
// Dispatcher Tests
// =============================================================================

/// Interleaved compactions from many threads: every begin is classified
/// exactly once and active_compactions returns to zero.
#[test]
fn parallel_compactions_balance() {
    let dispatcher = create_dispatcher();
    let num_threads = 8;
    let per_thread = 1_000u64;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let d = Arc::clone(&dispatcher);
            let b = Arc::clone(&barrier);
            thread::spawn(move || {
                b.wait();
                for i in 0..per_thread {
                    let levels: &[u8] = match i % 3 {
                        0 => &[0, 1],
                        1 => &[2, 3],
                        _ => &[],
                    };
                    let info = compaction(t as u64 * per_thread + i, levels);
                    d.on_compaction_begin(&info);
                    assert!(d.snapshot().active_compactions >= 1);
                    d.on_compaction_end(&info);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let total = num_threads as u64 * per_thread;
    let snap = dispatcher.snapshot();
    assert_eq!(snap.active_compactions, 0);
    assert_eq!(
        snap.l0_compactions + snap.other_compactions + snap.malformed_events,
        total
    );
    assert_eq!(
        snap.l0_compactions,
        num_threads as u64 * (0..per_thread).filter(|i| i % 3 == 0).count() as u64
    );
}

/// Reads race with compactions, stalls and snapshots; nothing panics and
/// read latency stays non-negative.
#[test]
fn mixed_callbacks_with_concurrent_reader() {
    let dispatcher = create_dispatcher();
    let num_writers = 6;
    let per_writer = 2_000;

    let reader = {
        let d = Arc::clone(&dispatcher);
        thread::spawn(move || {
            for _ in 0..500 {
                let snap = d.snapshot();
                assert!(snap.read_latency.average >= 0.0);
                assert!(snap.write_stall.average >= 0.0);
                assert!(snap.active_compactions >= 0);
                let _ = d.registry().snapshot();
            }
        })
    };

    let writers: Vec<_> = (0..num_writers)
        .map(|t| {
            let d = Arc::clone(&dispatcher);
            thread::spawn(move || {
                for i in 0..per_writer {
                    match (t + i) % 4 {
                        0 => d.observe_get(Duration::from_micros(i as u64 % 500)),
                        1 => {
                            let info = compaction(i as u64, &[(i % 5) as u8]);
                            d.on_compaction_begin(&info);
                            d.on_compaction_end(&info);
                        }
                        2 => d.on_write_stall_begin(&WriteStallBeginInfo::default()),
                        _ => d.on_write_stall_end(),
                    }
                }
            })
        })
        .collect();

    for h in writers {
        h.join().unwrap();
    }
    reader.join().unwrap();

    let snap = dispatcher.snapshot();
    assert_eq!(snap.active_compactions, 0);
    assert!(snap.read_latency.count > 0);
    assert!(snap.read_latency.average >= 0.0);
    assert!(snap.read_latency.average < 0.0005);
}
