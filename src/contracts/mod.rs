pub mod error;
pub mod events;
pub mod listener;

pub use error::{MalformedEvent, MetricError, RegistryError};
pub use events::{CompactionInfo, LevelInfo, TableInfo, WriteStallBeginInfo, BASE_LEVEL};
pub use listener::{EventListener, NoopEventListener};
