//! # Sampler
//!
//! Sensor sampling engine.
//!
//! Responsibilities:
//! - Own one worker thread per sensor, created at construction and joined on drop
//! - Timed strategy: sample every `sampling_period`, measured from the last sample
//! - External-signal strategy: block on a hardware readiness descriptor,
//!   fire once and auto-disable (one-shot sensors)
//! - Control surface: enable/disable, sampling period, operation mode,
//!   flush and event injection, safe to call from any thread
//! - Build sensors and registries from a `SamplerBlueprint`
//!
//! ## Synchronization
//!
//! Every sensor keeps its runtime state behind one mutex paired with one
//! condition variable. Control calls mutate and notify under that lock; the
//! worker re-checks the state after every wait. External-signal workers wait
//! without the lock and are interrupted through a [`WakeChannel`].

pub mod builder;
pub mod clock;
pub mod deadline;
mod emitter;
pub mod error;
pub mod factory;
pub mod hardware;
pub mod payload;
pub mod sensor;
mod state;
pub mod wake;
mod worker;

pub use builder::{BuildOutcome, SensorBuilder, MIN_TIMED_PERIOD};
pub use contracts::{ControlError, ControlResult, OperationMode, SensorDescriptor};
pub use error::{Result, SamplerError};
pub use factory::{SensorFactory, SensorRegistry};
pub use hardware::{ArmAttribute, LatchedInput};
pub use payload::{LatchedData, PayloadSource, ZeroVector};
pub use sensor::{Sensor, SensorHealth, SensorSnapshot};
pub use wake::WakeChannel;
