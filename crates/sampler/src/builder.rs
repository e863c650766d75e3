//! Two-phase sensor construction
//!
//! `build` never fails: when a resource cannot be acquired the sensor is
//! still returned, permanently stopped, together with the cause.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use contracts::{SensorDescriptor, SensorHandle, SharedSink};
use tracing::{debug, warn};

use crate::emitter::Emitter;
use crate::error::{Result, SamplerError};
use crate::hardware::{ArmAttribute, LatchedInput};
use crate::payload::{LatchedData, PayloadSource, ZeroVector};
use crate::sensor::{Sensor, SignalControl};
use crate::state::{SensorState, Shared};
use crate::wake::SignalWait;
use crate::worker::{self, SignalStrategy, Strategy};

/// Result of [`SensorBuilder::build`]
#[derive(Debug)]
pub enum BuildOutcome {
    /// Worker running
    Ready(Sensor),
    /// Construction failed; control calls are accepted but nothing is sampled
    Degraded { sensor: Sensor, cause: SamplerError },
}

impl BuildOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn sensor(&self) -> &Sensor {
        match self {
            Self::Ready(sensor) | Self::Degraded { sensor, .. } => sensor,
        }
    }

    pub fn cause(&self) -> Option<&SamplerError> {
        match self {
            Self::Ready(_) => None,
            Self::Degraded { cause, .. } => Some(cause),
        }
    }

    /// Take the sensor, discarding the failure cause
    pub fn into_sensor(self) -> Sensor {
        match self {
            Self::Ready(sensor) | Self::Degraded { sensor, .. } => sensor,
        }
    }
}

enum Kind {
    Timed,
    OneShot {
        input: InputSource,
        arm: Option<ArmAttribute>,
    },
}

enum InputSource {
    Attribute(PathBuf),
    Opened(LatchedInput),
}

impl InputSource {
    fn open(self, handle: SensorHandle) -> Result<LatchedInput> {
        match self {
            Self::Attribute(path) => LatchedInput::open_attribute(&path)
                .map_err(|source| SamplerError::OpenDescriptor { handle, path, source }),
            Self::Opened(input) => Ok(input),
        }
    }
}

/// Shortest sampling period of a timed sensor
pub const MIN_TIMED_PERIOD: Duration = Duration::from_micros(100);

/// Sensor builder
pub struct SensorBuilder {
    descriptor: SensorDescriptor,
    kind: Kind,
    payload: Option<Box<dyn PayloadSource>>,
    sampling_period: Option<Duration>,
}

impl SensorBuilder {
    /// Continuous sensor sampled every `sampling_period`
    pub fn timed(descriptor: SensorDescriptor) -> Self {
        Self {
            descriptor,
            kind: Kind::Timed,
            payload: None,
            sampling_period: None,
        }
    }

    /// One-shot wake-up sensor fired by an attribute file
    pub fn one_shot_attribute(descriptor: SensorDescriptor, poll_path: impl Into<PathBuf>) -> Self {
        Self::one_shot(descriptor, InputSource::Attribute(poll_path.into()))
    }

    /// One-shot wake-up sensor fired by an already open input
    pub fn one_shot_input(descriptor: SensorDescriptor, input: LatchedInput) -> Self {
        Self::one_shot(descriptor, InputSource::Opened(input))
    }

    fn one_shot(mut descriptor: SensorDescriptor, input: InputSource) -> Self {
        descriptor.flags.one_shot = true;
        descriptor.flags.wake_up = true;
        descriptor.min_delay = Duration::ZERO;
        descriptor.max_delay = Duration::ZERO;

        Self {
            descriptor,
            kind: Kind::OneShot { input, arm: None },
            payload: None,
            sampling_period: None,
        }
    }

    /// Hardware enable attribute (one-shot sensors only)
    pub fn arm_attribute(mut self, attribute: ArmAttribute) -> Self {
        if let Kind::OneShot { arm, .. } = &mut self.kind {
            *arm = Some(attribute);
        }
        self
    }

    pub fn payload(mut self, source: impl PayloadSource) -> Self {
        self.payload = Some(Box::new(source));
        self
    }

    /// Initial sampling period (clamped); defaults to `max_delay`
    pub fn sampling_period(mut self, period: Duration) -> Self {
        self.sampling_period = Some(period);
        self
    }

    pub fn build(self, sink: SharedSink) -> BuildOutcome {
        let mut descriptor = self.descriptor;
        if matches!(self.kind, Kind::Timed) && descriptor.min_delay < MIN_TIMED_PERIOD {
            debug!(
                handle = descriptor.handle,
                min_delay_us = descriptor.min_delay.as_micros() as u64,
                "raising min_delay of timed sensor"
            );
            descriptor.min_delay = MIN_TIMED_PERIOD;
            descriptor.max_delay = descriptor.max_delay.max(MIN_TIMED_PERIOD);
        }
        let descriptor = Arc::new(descriptor);
        let handle = descriptor.handle;

        let period = descriptor.clamp_period(self.sampling_period.unwrap_or(descriptor.max_delay));
        let shared = Arc::new(Shared::new(SensorState::new(period)));
        let emitter = Emitter::new(Arc::clone(&descriptor), sink);

        let (payload, strategy, signal): (Box<dyn PayloadSource>, _, _) = match self.kind {
            Kind::Timed => (
                self.payload
                    .unwrap_or_else(|| Box::new(ZeroVector) as Box<dyn PayloadSource>),
                Ok(Strategy::Timed),
                None,
            ),
            Kind::OneShot { input, arm } => {
                let prepared = input
                    .open(handle)
                    .and_then(|input| SignalWait::new(handle, input));
                let (strategy, wake) = match prepared {
                    Ok((wait, wake)) => (
                        Ok(Strategy::ExternalSignal(SignalStrategy {
                            wait,
                            arm: arm.clone(),
                        })),
                        Some(wake),
                    ),
                    Err(cause) => (Err(cause), None),
                };
                (
                    self.payload
                        .unwrap_or_else(|| Box::new(LatchedData) as Box<dyn PayloadSource>),
                    strategy,
                    Some(SignalControl { wake, arm }),
                )
            }
        };

        let spawned = strategy.and_then(|strategy| {
            worker::spawn(Arc::clone(&shared), emitter.clone(), payload, strategy)
        });

        match spawned {
            Ok(worker) => {
                debug!(handle, sensor = %descriptor.name, "sensor ready");
                BuildOutcome::Ready(Sensor::from_parts(
                    descriptor,
                    shared,
                    emitter,
                    signal,
                    Some(worker),
                ))
            }
            Err(cause) => {
                warn!(handle, sensor = %descriptor.name, error = %cause, "sensor degraded");
                observability::record_sensor_degraded(handle);
                shared.lock().stop_requested = true;
                BuildOutcome::Degraded {
                    sensor: Sensor::from_parts(descriptor, shared, emitter, signal, None),
                    cause,
                }
            }
        }
    }
}
