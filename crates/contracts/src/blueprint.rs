//! SamplerBlueprint - Config Loader 输出
//!
//! 描述完整的采样配置：传感器定义、采样策略、初始状态、输出路由。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{OperationMode, SensorFlags, SensorHandle, SensorType};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的采样配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 传感器定义列表
    pub sensors: Vec<SensorConfig>,

    /// 输出路由配置
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// 传感器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// 句柄，全局唯一
    pub handle: SensorHandle,

    /// 名称，全局唯一
    pub name: String,

    /// 传感器类型
    pub sensor_type: SensorType,

    /// 类型字符串 (可选)
    #[serde(default)]
    pub type_as_string: Option<String>,

    /// 厂商
    #[serde(default = "default_vendor")]
    pub vendor: String,

    /// 驱动版本
    #[serde(default = "default_version")]
    pub version: i32,

    /// 最小采样间隔 (微秒)
    #[serde(default)]
    pub min_delay_us: u64,

    /// 最大采样间隔 (微秒)
    #[serde(default = "default_max_delay_us")]
    pub max_delay_us: u64,

    /// 能力标志
    #[serde(default)]
    pub flags: SensorFlags,

    /// 最大量程
    #[serde(default)]
    pub max_range: f32,

    /// 分辨率
    #[serde(default)]
    pub resolution: f32,

    /// 功耗 (mA)
    #[serde(default)]
    pub power: f32,

    /// 访问所需权限
    #[serde(default)]
    pub required_permission: String,

    /// 初始采样周期 (微秒)，缺省为 max_delay_us
    #[serde(default)]
    pub sampling_period_us: Option<u64>,

    /// 启动后是否立即使能
    #[serde(default)]
    pub enabled: bool,

    /// 初始工作模式
    #[serde(default)]
    pub mode: OperationMode,

    /// 采样策略
    #[serde(default)]
    pub strategy: StrategyConfig,
}

fn default_vendor() -> String {
    "sensor-sampler".to_string()
}

fn default_version() -> i32 {
    1
}

fn default_max_delay_us() -> u64 {
    1_000_000
}

/// 采样策略配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// 定时轮询
    #[default]
    Timed,

    /// 等待外部硬件信号 (单次触发)
    ExternalSignal {
        /// 就绪描述符路径 (如 sysfs 属性)
        poll_path: PathBuf,

        /// 硬件使能属性 (可选)
        #[serde(default)]
        arm: Option<ArmConfig>,
    },
}

/// 硬件使能属性配置
///
/// 传感器使能时写入 `armed_value`，关闭或触发后恢复 `quiescent_value`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    /// 属性文件路径
    pub path: PathBuf,

    /// 使能时写入的值
    #[serde(default = "default_armed_value")]
    pub armed_value: String,

    /// 静默时写入的值
    #[serde(default = "default_quiescent_value")]
    pub quiescent_value: String,
}

fn default_armed_value() -> String {
    "0".to_string()
}

fn default_quiescent_value() -> String {
    "1".to_string()
}

/// Sink 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// 名称
    pub name: String,

    /// 类型
    pub sink_type: SinkType,

    /// 队列容量 (仅 channel 类型)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 通过 tracing 输出事件摘要
    Log,
    /// 转发到异步通道
    Channel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_config_defaults() {
        let json = r#"{ "handle": 1, "name": "accel", "sensor_type": "accelerometer" }"#;
        let cfg: SensorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.max_delay_us, 1_000_000);
        assert_eq!(cfg.min_delay_us, 0);
        assert_eq!(cfg.strategy, StrategyConfig::Timed);
        assert_eq!(cfg.mode, OperationMode::Normal);
        assert!(!cfg.enabled);
        assert!(!cfg.flags.wake_up);
    }

    #[test]
    fn test_external_signal_strategy() {
        let json = r#"{
            "kind": "external_signal",
            "poll_path": "/sys/devices/virtual/sec/tsp/double_tap",
            "arm": { "path": "/sys/class/sec/tsp/input/enabled" }
        }"#;
        let strategy: StrategyConfig = serde_json::from_str(json).unwrap();
        match strategy {
            StrategyConfig::ExternalSignal { poll_path, arm } => {
                assert!(poll_path.ends_with("double_tap"));
                let arm = arm.unwrap();
                assert_eq!(arm.armed_value, "0");
                assert_eq!(arm.quiescent_value, "1");
            }
            other => panic!("unexpected strategy: {other:?}"),
        }
    }
}
