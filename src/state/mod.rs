//! State caches written by inbound dispatch and read by the control tick.
//!
//! Both caches are lock-protected, so they stay sound even when a bridge
//! delivers messages from another thread. Neither records *when* a value
//! arrived: a value that is never refreshed is used indefinitely.

mod telemetry;
mod trigger;

pub use telemetry::TelemetryMirror;
pub use trigger::ModeTriggerLatch;
