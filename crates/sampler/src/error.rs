//! Sampler error types

use std::path::PathBuf;

use contracts::{ContractError, SensorHandle};
use thiserror::Error;

/// Sensor construction error
///
/// Construction failures never abort the build: the sensor is returned in a
/// degraded state together with one of these as the cause.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// Wake channel / poll instance could not be created
    #[error("failed to open wake channel for sensor {handle}: {source}")]
    WakeChannel {
        handle: SensorHandle,
        #[source]
        source: std::io::Error,
    },

    /// Hardware readiness descriptor could not be opened
    #[error("failed to open poll descriptor '{}' for sensor {handle}: {source}", .path.display())]
    OpenDescriptor {
        handle: SensorHandle,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Descriptor could not be added to the readiness wait
    #[error("failed to register poll descriptor for sensor {handle}: {source}")]
    Register {
        handle: SensorHandle,
        #[source]
        source: std::io::Error,
    },

    /// Worker thread could not be spawned
    #[error("failed to spawn worker for sensor {handle}: {source}")]
    Spawn {
        handle: SensorHandle,
        #[source]
        source: std::io::Error,
    },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl SamplerError {
    /// Handle of the sensor the error belongs to, if any
    pub fn handle(&self) -> Option<SensorHandle> {
        match self {
            Self::WakeChannel { handle, .. }
            | Self::OpenDescriptor { handle, .. }
            | Self::Register { handle, .. }
            | Self::Spawn { handle, .. } => Some(*handle),
            Self::Contract(_) => None,
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, SamplerError>;
