use std::sync::Arc;
use std::time::Duration;

use crate::contracts::events::{CompactionInfo, WriteStallBeginInfo};

/// Callbacks a storage engine invokes at its lifecycle points.
///
/// # Behavior
/// - Called inline on engine-internal threads, concurrently and unordered
/// - Implementations must not block, allocate on the hot path, or panic
/// - Stall begin/end alternate per engine contract; implementations still
///   tolerate an end without a begin
pub trait EventListener: Send + Sync {
    /// A compaction job is starting.
    fn on_compaction_begin(&self, info: &CompactionInfo);

    /// A compaction job finished (successfully or not).
    fn on_compaction_end(&self, info: &CompactionInfo);

    /// The engine started blocking incoming writes.
    fn on_write_stall_begin(&self, info: &WriteStallBeginInfo);

    /// The engine resumed accepting writes.
    fn on_write_stall_end(&self);

    /// A point read completed after `duration`.
    fn observe_get(&self, duration: Duration);
}

impl<T: EventListener + ?Sized> EventListener for Arc<T> {
    #[inline]
    fn on_compaction_begin(&self, info: &CompactionInfo) {
        (**self).on_compaction_begin(info)
    }

    #[inline]
    fn on_compaction_end(&self, info: &CompactionInfo) {
        (**self).on_compaction_end(info)
    }

    #[inline]
    fn on_write_stall_begin(&self, info: &WriteStallBeginInfo) {
        (**self).on_write_stall_begin(info)
    }

    #[inline]
    fn on_write_stall_end(&self) {
        (**self).on_write_stall_end()
    }

    #[inline]
    fn observe_get(&self, duration: Duration) {
        (**self).observe_get(duration)
    }
}

/// Listener that ignores every event. Used when metrics are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventListener;

impl EventListener for NoopEventListener {
    fn on_compaction_begin(&self, _info: &CompactionInfo) {}

    fn on_compaction_end(&self, _info: &CompactionInfo) {}

    fn on_write_stall_begin(&self, _info: &WriteStallBeginInfo) {}

    fn on_write_stall_end(&self) {}

    fn observe_get(&self, _duration: Duration) {}
}
