//! Sensor operation mode

use serde::{Deserialize, Serialize};

/// Operation mode of a sensor
///
/// In `DataInjection` mode autonomous sampling is suspended and the sensor
/// only forwards events handed to it through `inject_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    #[default]
    Normal,
    DataInjection,
}
