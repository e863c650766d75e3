//! Event - sensor output value
//!
//! Created by a sensor worker or by `flush`, consumed once by the sink.

use crate::{SensorHandle, SensorType};

/// Number of values carried by an opaque data payload
pub const DATA_LEN: usize = 16;

/// Sensor event
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Producing sensor handle
    pub sensor_handle: SensorHandle,

    /// Sensor type (`MetaData` for meta events)
    pub sensor_type: SensorType,

    /// Monotonic timestamp in nanoseconds
    pub timestamp: i64,

    /// Payload, shape depends on the sensor type
    pub payload: EventPayload,
}

impl Event {
    /// Create an event
    pub fn new(
        sensor_handle: SensorHandle,
        sensor_type: SensorType,
        timestamp: i64,
        payload: EventPayload,
    ) -> Self {
        Self {
            sensor_handle,
            sensor_type,
            timestamp,
            payload,
        }
    }

    /// Flush-completion marker for the given sensor
    pub fn flush_complete(sensor_handle: SensorHandle) -> Self {
        Self {
            sensor_handle,
            sensor_type: SensorType::MetaData,
            timestamp: 0,
            payload: EventPayload::Meta(MetaDataEvent::FlushComplete),
        }
    }

    /// Whether this is a flush-completion marker
    pub fn is_flush_complete(&self) -> bool {
        matches!(self.payload, EventPayload::Meta(MetaDataEvent::FlushComplete))
    }
}

/// Event payload
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// 3-axis reading
    Vector(VectorReading),

    /// Single value
    Scalar(f32),

    /// Opaque values (gesture/vendor sensors)
    Data([f32; DATA_LEN]),

    /// Meta event
    Meta(MetaDataEvent),
}

/// 3-axis reading with accuracy
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VectorReading {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub status: SensorStatus,
}

/// Reading accuracy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SensorStatus {
    NoContact,
    #[default]
    Unreliable,
    AccuracyLow,
    AccuracyMedium,
    AccuracyHigh,
}

/// Meta event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaDataEvent {
    /// All events buffered before the flush request have been delivered
    FlushComplete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_complete_marker() {
        let ev = Event::flush_complete(7);
        assert_eq!(ev.sensor_handle, 7);
        assert_eq!(ev.sensor_type, SensorType::MetaData);
        assert!(ev.is_flush_complete());
    }

    #[test]
    fn test_sample_is_not_flush_marker() {
        let ev = Event::new(1, SensorType::Light, 42, EventPayload::Scalar(120.0));
        assert!(!ev.is_flush_complete());
    }
}
