//! Engine metric names and descriptions.

use super::registry::MetricSpec;

/// Time-decayed write stall duration in seconds.
pub const WRITE_STALL: &str = "write_stall";
/// Time-decayed point read latency in seconds.
pub const READ_LATENCY: &str = "read_latency";
/// Number of compactions starting at L0.
pub const L0_COMPACTIONS: &str = "l0_compactions";
/// Number of compactions starting at L1 or deeper.
pub const OTHER_COMPACTIONS: &str = "other_compactions";
/// Number of compactions currently running.
pub const ACTIVE_COMPACTIONS: &str = "active_compactions";
/// Number of engine events that could not be interpreted.
pub const MALFORMED_EVENTS: &str = "malformed_events";

/// The metric set the event dispatcher updates.
pub const STANDARD: [MetricSpec<'static>; 6] = [
    MetricSpec::averager(WRITE_STALL, "time spent waiting for disk write"),
    MetricSpec::averager(READ_LATENCY, "time spent waiting for db get"),
    MetricSpec::counter(L0_COMPACTIONS, "number of l0 compactions"),
    MetricSpec::counter(OTHER_COMPACTIONS, "number of l1+ compactions"),
    MetricSpec::gauge(ACTIVE_COMPACTIONS, "number of active compactions"),
    MetricSpec::counter(
        MALFORMED_EVENTS,
        "number of engine events that could not be classified",
    ),
];
