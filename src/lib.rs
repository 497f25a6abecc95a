pub mod clock;
pub mod config;
pub mod contracts;
pub mod hooks;
pub mod metrics;
