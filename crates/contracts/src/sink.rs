//! EventSink trait - sensor output interface
//!
//! Defines the abstract interface for event consumers.

use std::sync::Arc;

use crate::Event;

/// Event consumer
///
/// Called from sensor worker threads and from control-surface calls, so
/// implementations must be thread-safe and must not block indefinitely.
/// Implementations must not call back into the delivering sensor.
pub trait EventSink: Send + Sync {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver a batch of events
    ///
    /// Order within one batch is preserved. `wake_up` is set when the
    /// producing sensor is a wake-up sensor. No acknowledgment is returned.
    fn deliver(&self, events: Vec<Event>, wake_up: bool);
}

/// Sink shared between a sensor's worker and its control surface
pub type SharedSink = Arc<dyn EventSink>;
