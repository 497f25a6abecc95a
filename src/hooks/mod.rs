//! Storage engine event hooks.
//!
//! The engine calls into [`EventHookDispatcher`] from its own background
//! threads through the [`EventListener`](crate::contracts::EventListener)
//! trait. Every handler is synchronous, non-blocking and never panics.

pub mod dispatcher;
pub mod stall;

pub use dispatcher::{EngineMetricsSnapshot, EventHookDispatcher, GetTimer};
pub use stall::StallTracker;
