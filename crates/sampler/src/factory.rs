//! SensorFactory 核心实现
//!
//! 从 SamplerBlueprint 构造传感器，应用初始状态，并集中持有。

use std::time::Duration;

use contracts::{
    OperationMode, SamplerBlueprint, SensorConfig, SensorDescriptor, SensorHandle, SharedSink,
    StrategyConfig,
};
use tracing::{info, instrument, warn};

use crate::builder::{BuildOutcome, SensorBuilder};
use crate::error::SamplerError;
use crate::hardware::ArmAttribute;
use crate::sensor::Sensor;

/// Sensor Factory
///
/// 负责将配置转换为描述与构建器。
pub struct SensorFactory;

impl SensorFactory {
    /// 由配置生成传感器描述
    pub fn descriptor(config: &SensorConfig) -> SensorDescriptor {
        SensorDescriptor {
            handle: config.handle,
            name: config.name.clone(),
            vendor: config.vendor.clone(),
            version: config.version,
            sensor_type: config.sensor_type,
            type_as_string: config.type_as_string.clone().unwrap_or_default(),
            max_range: config.max_range,
            resolution: config.resolution,
            power: config.power,
            min_delay: Duration::from_micros(config.min_delay_us),
            max_delay: Duration::from_micros(config.max_delay_us),
            fifo_reserved_event_count: 0,
            fifo_max_event_count: 0,
            required_permission: config.required_permission.clone(),
            flags: config.flags,
        }
    }

    /// 由配置生成构建器
    pub fn builder(config: &SensorConfig) -> SensorBuilder {
        let descriptor = Self::descriptor(config);
        let builder = match &config.strategy {
            StrategyConfig::Timed => SensorBuilder::timed(descriptor),
            StrategyConfig::ExternalSignal { poll_path, arm } => {
                let builder = SensorBuilder::one_shot_attribute(descriptor, poll_path.clone());
                match arm {
                    Some(arm) => builder.arm_attribute(ArmAttribute::from_config(arm)),
                    None => builder,
                }
            }
        };

        match config.sampling_period_us {
            Some(us) => builder.sampling_period(Duration::from_micros(us)),
            None => builder,
        }
    }

    /// 构建传感器并应用初始模式与使能状态
    #[instrument(
        name = "sensor_factory_build",
        skip(config, sink),
        fields(handle = config.handle, sensor = %config.name)
    )]
    pub fn build(config: &SensorConfig, sink: SharedSink) -> BuildOutcome {
        let outcome = Self::builder(config).build(sink);

        let sensor = outcome.sensor();
        if config.mode != OperationMode::Normal {
            sensor.set_operation_mode(config.mode);
        }
        if config.enabled {
            sensor.set_enabled(true);
        }

        outcome
    }
}

/// 传感器注册表
///
/// 按配置顺序持有所有传感器。降级的传感器同样保留，其原因单独记录。
/// Drop 时依次停止并 join 每个 worker。
#[derive(Debug, Default)]
pub struct SensorRegistry {
    sensors: Vec<Sensor>,
    degraded: Vec<(SensorHandle, SamplerError)>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从蓝图构建所有传感器，共用同一个 sink
    ///
    /// 单个传感器构建失败不影响其他传感器。
    #[instrument(
        name = "sensor_registry_from_blueprint",
        skip(blueprint, sink),
        fields(sensor_count = blueprint.sensors.len())
    )]
    pub fn from_blueprint(blueprint: &SamplerBlueprint, sink: SharedSink) -> Self {
        let mut registry = Self::new();
        for config in &blueprint.sensors {
            registry.insert(SensorFactory::build(config, sink.clone()));
        }

        info!(
            sensors = registry.len(),
            degraded = registry.degraded_count(),
            "sensor registry built"
        );
        registry
    }

    /// 加入一个构建结果
    pub fn insert(&mut self, outcome: BuildOutcome) {
        match outcome {
            BuildOutcome::Ready(sensor) => self.sensors.push(sensor),
            BuildOutcome::Degraded { sensor, cause } => {
                warn!(handle = sensor.handle(), error = %cause, "registering degraded sensor");
                self.degraded.push((sensor.handle(), cause));
                self.sensors.push(sensor);
            }
        }
    }

    pub fn get(&self, handle: SensorHandle) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.handle() == handle)
    }

    pub fn by_name(&self, name: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.descriptor().name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.iter()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// 降级传感器及其原因
    pub fn degraded(&self) -> &[(SensorHandle, SamplerError)] {
        &self.degraded
    }

    pub fn degraded_count(&self) -> usize {
        self.degraded.len()
    }

    /// 关闭所有传感器
    pub fn disable_all(&self) {
        for sensor in &self.sensors {
            sensor.set_enabled(false);
        }
    }
}
