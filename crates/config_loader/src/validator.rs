//! 配置校验模块
//!
//! 校验规则：
//! - handle / name 唯一，name 非空
//! - min_delay_us <= max_delay_us
//! - 定时传感器 min_delay_us > 0 且不能为单次触发
//! - 外部信号传感器必须为单次触发
//! - 初始采样周期位于 [min_delay_us, max_delay_us]
//! - 初始为注入模式时必须支持数据注入
//! - sink 名称非空且唯一，channel 容量 > 0

use std::collections::HashSet;

use contracts::{
    ContractError, OperationMode, SamplerBlueprint, SensorConfig, SinkType, StrategyConfig,
};

/// 校验 SamplerBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &SamplerBlueprint) -> Result<(), ContractError> {
    validate_identities(blueprint)?;
    for sensor in &blueprint.sensors {
        validate_delays(sensor)?;
        validate_strategy(sensor)?;
        validate_initial_state(sensor)?;
    }
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验 handle / name 唯一性
fn validate_identities(blueprint: &SamplerBlueprint) -> Result<(), ContractError> {
    let mut handles = HashSet::new();
    let mut names = HashSet::new();
    for (idx, sensor) in blueprint.sensors.iter().enumerate() {
        if sensor.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sensors[{idx}].name"),
                "sensor name cannot be empty",
            ));
        }
        if !handles.insert(sensor.handle) {
            return Err(ContractError::config_validation(
                format!("sensors[handle={}]", sensor.handle),
                "duplicate sensor handle",
            ));
        }
        if !names.insert(sensor.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sensors[name={}]", sensor.name),
                "duplicate sensor name",
            ));
        }
    }
    Ok(())
}

/// 校验采样间隔范围
fn validate_delays(sensor: &SensorConfig) -> Result<(), ContractError> {
    if sensor.min_delay_us > sensor.max_delay_us {
        return Err(ContractError::config_validation(
            format!("sensors[{}].min_delay_us", sensor.name),
            format!(
                "min_delay_us ({}) must be <= max_delay_us ({})",
                sensor.min_delay_us, sensor.max_delay_us
            ),
        ));
    }
    Ok(())
}

/// 校验策略与标志的一致性
fn validate_strategy(sensor: &SensorConfig) -> Result<(), ContractError> {
    match &sensor.strategy {
        StrategyConfig::Timed => {
            if sensor.flags.one_shot {
                return Err(ContractError::config_validation(
                    format!("sensors[{}].strategy", sensor.name),
                    "one-shot sensors must use the external_signal strategy",
                ));
            }
            if sensor.min_delay_us == 0 {
                return Err(ContractError::config_validation(
                    format!("sensors[{}].min_delay_us", sensor.name),
                    "timed sensors require min_delay_us > 0",
                ));
            }
        }
        StrategyConfig::ExternalSignal { poll_path, arm } => {
            if !sensor.flags.one_shot {
                return Err(ContractError::config_validation(
                    format!("sensors[{}].flags.one_shot", sensor.name),
                    "external_signal sensors must be one-shot",
                ));
            }
            if poll_path.as_os_str().is_empty() {
                return Err(ContractError::config_validation(
                    format!("sensors[{}].strategy.poll_path", sensor.name),
                    "poll_path cannot be empty",
                ));
            }
            if let Some(arm) = arm {
                if arm.armed_value == arm.quiescent_value {
                    return Err(ContractError::config_validation(
                        format!("sensors[{}].strategy.arm", sensor.name),
                        "armed_value and quiescent_value must differ",
                    ));
                }
            }
        }
    }
    Ok(())
}

/// 校验初始状态
fn validate_initial_state(sensor: &SensorConfig) -> Result<(), ContractError> {
    if let Some(period) = sensor.sampling_period_us {
        if sensor.strategy == StrategyConfig::Timed
            && !(sensor.min_delay_us..=sensor.max_delay_us).contains(&period)
        {
            return Err(ContractError::config_validation(
                format!("sensors[{}].sampling_period_us", sensor.name),
                format!(
                    "sampling_period_us ({period}) must be within [{}, {}]",
                    sensor.min_delay_us, sensor.max_delay_us
                ),
            ));
        }
    }
    if sensor.mode == OperationMode::DataInjection && !sensor.flags.data_injection {
        return Err(ContractError::config_validation(
            format!("sensors[{}].mode", sensor.name),
            "data_injection mode requires flags.data_injection",
        ));
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &SamplerBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.sink_type == SinkType::Channel && sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}
