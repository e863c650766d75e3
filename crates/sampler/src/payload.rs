//! Payload generation
//!
//! A worker asks its [`PayloadSource`] for the payload of every sample it
//! generates. Raw-value acquisition lives behind this trait.

use contracts::{EventPayload, SensorDescriptor, SensorStatus, VectorReading, DATA_LEN};

/// Produces the payload of a generated sample
///
/// Called on the sensor's worker thread with the state lock held, so it
/// must return promptly.
pub trait PayloadSource: Send + 'static {
    fn read(&mut self, descriptor: &SensorDescriptor) -> EventPayload;
}

impl<F> PayloadSource for F
where
    F: FnMut(&SensorDescriptor) -> EventPayload + Send + 'static,
{
    fn read(&mut self, descriptor: &SensorDescriptor) -> EventPayload {
        self(descriptor)
    }
}

/// Zero 3-axis reading reported with high accuracy (timed default)
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroVector;

impl PayloadSource for ZeroVector {
    fn read(&mut self, _descriptor: &SensorDescriptor) -> EventPayload {
        EventPayload::Vector(VectorReading {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            status: SensorStatus::AccuracyHigh,
        })
    }
}

/// Zeroed opaque data (one-shot default; the event itself is the signal)
#[derive(Debug, Clone, Copy, Default)]
pub struct LatchedData;

impl PayloadSource for LatchedData {
    fn read(&mut self, _descriptor: &SensorDescriptor) -> EventPayload {
        EventPayload::Data([0.0; DATA_LEN])
    }
}
