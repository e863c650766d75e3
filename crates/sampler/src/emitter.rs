//! Delivery of events to the sensor's sink

use std::sync::Arc;

use contracts::{Event, SensorDescriptor, SharedSink};
use tracing::trace;

use crate::clock;
use crate::payload::PayloadSource;

/// Sink handle bound to one sensor's descriptor
#[derive(Clone)]
pub(crate) struct Emitter {
    descriptor: Arc<SensorDescriptor>,
    sink: SharedSink,
}

impl Emitter {
    pub fn new(descriptor: Arc<SensorDescriptor>, sink: SharedSink) -> Self {
        Self { descriptor, sink }
    }

    pub fn descriptor(&self) -> &SensorDescriptor {
        &self.descriptor
    }

    /// Generate one sample and deliver it
    pub fn emit_sample(&self, payload: &mut dyn PayloadSource) {
        let event = Event::new(
            self.descriptor.handle,
            self.descriptor.sensor_type,
            clock::elapsed_nanos(),
            payload.read(&self.descriptor),
        );
        self.deliver(vec![event]);
    }

    /// Deliver events, flagged as wake-up iff the sensor is a wake-up sensor
    pub fn deliver(&self, events: Vec<Event>) {
        let wake_up = self.descriptor.is_wake_up();
        trace!(
            handle = self.descriptor.handle,
            sink = %self.sink.name(),
            count = events.len(),
            wake_up,
            "delivering events"
        );
        observability::record_events_delivered(self.descriptor.handle, events.len(), wake_up);
        self.sink.deliver(events, wake_up);
    }
}
