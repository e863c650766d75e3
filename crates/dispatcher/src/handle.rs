//! SinkHandle - isolates one sink from the others

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use contracts::{Event, SharedSink};
use tracing::error;

use crate::metrics::SinkMetrics;

/// Handle to one sink inside a dispatcher
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Wrapped sink
    sink: SharedSink,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
}

impl SinkHandle {
    /// Wrap a sink; `metrics` should be the instance the sink updates, if any
    pub fn new(sink: SharedSink, metrics: Arc<SinkMetrics>) -> Self {
        Self {
            name: sink.name().to_string(),
            sink,
            metrics,
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Deliver to the sink
    ///
    /// A panicking sink is counted as a failure and does not propagate to
    /// the producing sensor.
    pub fn deliver(&self, events: Vec<Event>, wake_up: bool) {
        let count = events.len();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.sink.deliver(events, wake_up)));
        if result.is_err() {
            self.metrics.add_failure_count(count);
            error!(sink = %self.name, count, "sink panicked during delivery");
        }
    }
}
