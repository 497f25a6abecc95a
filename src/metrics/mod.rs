//! Metric primitives and the registry that owns them.
//!
//! Counters and gauges are lock-free atomics; averagers hold a short
//! per-instance lock. Nothing here allocates on the update path.

pub mod averager;
pub mod counter;
pub mod names;
pub mod registry;

pub use averager::{Averager, AveragerSnapshot};
pub use counter::{Counter, Gauge};
pub use registry::{
    Metric, MetricKind, MetricSample, MetricSpec, MetricsRegistry, RegistrySnapshot, SampleValue,
};
