//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace:
//! sensor descriptors, events, operation modes, the sink trait, errors
//! and the configuration blueprint.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Event timestamps are nanoseconds on a monotonic clock (`i64`)
//! - Sampling periods and delay bounds are `std::time::Duration`

mod blueprint;
mod error;
mod event;
mod mode;
mod sensor;
mod sink;

pub use blueprint::*;
pub use error::*;
pub use event::*;
pub use mode::OperationMode;
pub use sensor::*;
pub use sink::{EventSink, SharedSink};
