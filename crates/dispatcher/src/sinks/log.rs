//! LogSink - logs event summaries via tracing

use std::sync::Arc;

use contracts::{Event, EventPayload, EventSink};
use tracing::{debug, info};

use crate::metrics::SinkMetrics;

/// Sink that logs events for debugging
pub struct LogSink {
    name: String,
    metrics: Arc<SinkMetrics>,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_metrics(name, Arc::new(SinkMetrics::new()))
    }

    pub fn with_metrics(name: impl Into<String>, metrics: Arc<SinkMetrics>) -> Self {
        Self {
            name: name.into(),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    fn log_event(&self, event: &Event, wake_up: bool) {
        if event.is_flush_complete() {
            info!(sink = %self.name, handle = event.sensor_handle, "flush complete");
            return;
        }

        match &event.payload {
            EventPayload::Vector(v) => debug!(
                sink = %self.name,
                handle = event.sensor_handle,
                timestamp = event.timestamp,
                wake_up,
                x = v.x,
                y = v.y,
                z = v.z,
                status = ?v.status,
                "vector event"
            ),
            EventPayload::Scalar(value) => debug!(
                sink = %self.name,
                handle = event.sensor_handle,
                timestamp = event.timestamp,
                wake_up,
                value,
                "scalar event"
            ),
            EventPayload::Data(_) | EventPayload::Meta(_) => debug!(
                sink = %self.name,
                handle = event.sensor_handle,
                sensor_type = ?event.sensor_type,
                timestamp = event.timestamp,
                wake_up,
                "event"
            ),
        }
    }
}

impl EventSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, events: Vec<Event>, wake_up: bool) {
        for event in &events {
            self.log_event(event, wake_up);
        }
        self.metrics.add_write_count(events.len());
        observability::record_sink_delivery(&self.name, events.len(), true);
    }
}
