//! SensorDescriptor - 传感器身份与能力描述
//!
//! 构造后不可变，由传感器实例持有，worker 与控制接口只读。

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 传感器句柄
pub type SensorHandle = i32;

/// 传感器描述
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDescriptor {
    /// 句柄 (在注册表中唯一)
    pub handle: SensorHandle,

    /// 名称
    pub name: String,

    /// 厂商
    pub vendor: String,

    /// 驱动版本
    pub version: i32,

    /// 传感器类型
    pub sensor_type: SensorType,

    /// 类型字符串 (厂商私有类型使用)
    pub type_as_string: String,

    /// 最大量程
    pub max_range: f32,

    /// 分辨率
    pub resolution: f32,

    /// 功耗 (mA)
    pub power: f32,

    /// 最小采样间隔
    pub min_delay: Duration,

    /// 最大采样间隔
    pub max_delay: Duration,

    /// FIFO 预留事件数
    pub fifo_reserved_event_count: u32,

    /// FIFO 最大事件数
    pub fifo_max_event_count: u32,

    /// 访问所需权限 (空 = 无)
    pub required_permission: String,

    /// 能力标志
    pub flags: SensorFlags,
}

impl SensorDescriptor {
    /// 是否为唤醒型传感器
    pub fn is_wake_up(&self) -> bool {
        self.flags.wake_up
    }

    /// 是否支持数据注入
    pub fn supports_data_injection(&self) -> bool {
        self.flags.data_injection
    }

    /// 上报模式
    pub fn reporting_mode(&self) -> ReportingMode {
        if self.flags.one_shot {
            ReportingMode::OneShot
        } else {
            ReportingMode::Continuous
        }
    }

    /// 将采样周期限制在 `[min_delay, max_delay]` 之内
    pub fn clamp_period(&self, period: Duration) -> Duration {
        period.clamp(self.min_delay, self.max_delay.max(self.min_delay))
    }
}

/// 能力标志
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorFlags {
    /// 唤醒型：事件投递时需持有唤醒
    #[serde(default)]
    pub wake_up: bool,

    /// 支持数据注入模式
    #[serde(default)]
    pub data_injection: bool,

    /// 单次触发：触发一次后自动关闭
    #[serde(default)]
    pub one_shot: bool,
}

/// 上报模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingMode {
    /// 按采样周期连续上报
    Continuous,
    /// 每次使能只上报一次
    OneShot,
}

/// 传感器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Accelerometer,
    MagneticField,
    Gyroscope,
    Light,
    Pressure,
    Proximity,
    AmbientTemperature,
    SignificantMotion,
    WakeGesture,
    PickUpGesture,
    /// 附加信息 (由宿主推送的运行环境数据)
    AdditionalInfo,
    /// 元数据事件 (flush 完成等)
    MetaData,
    /// 厂商私有类型
    DevicePrivate(u32),
}
