//! 采样指标收集模块
//!
//! 记录传感器投递、flush、注入、单次触发与 worker 退出等运行指标，
//! 并提供内存聚合器用于输出摘要。

use std::collections::HashMap;

use contracts::{Event, EventPayload, SensorHandle};
use metrics::{counter, gauge};

/// 记录事件投递
///
/// 每次传感器向 sink 投递一批事件时调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_events_delivered;
///
/// record_events_delivered(descriptor.handle, events.len(), descriptor.is_wake_up());
/// sink.deliver(events, descriptor.is_wake_up());
/// ```
pub fn record_events_delivered(handle: SensorHandle, count: usize, wake_up: bool) {
    counter!(
        "sensor_sampler_events_delivered_total",
        "handle" => handle.to_string(),
        "wake_up" => wake_up.to_string()
    )
    .increment(count as u64);
}

/// 记录 flush 完成
pub fn record_flush_complete(handle: SensorHandle) {
    counter!(
        "sensor_sampler_flush_complete_total",
        "handle" => handle.to_string()
    )
    .increment(1);
}

/// 记录注入事件
pub fn record_event_injected(handle: SensorHandle) {
    counter!(
        "sensor_sampler_events_injected_total",
        "handle" => handle.to_string()
    )
    .increment(1);
}

/// 记录单次触发传感器触发
pub fn record_one_shot_fired(handle: SensorHandle) {
    counter!(
        "sensor_sampler_one_shot_fired_total",
        "handle" => handle.to_string()
    )
    .increment(1);
}

/// 记录 worker 退出
pub fn record_worker_exit(handle: SensorHandle, reason: &str) {
    counter!(
        "sensor_sampler_worker_exit_total",
        "handle" => handle.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// 记录降级构建的传感器数量
pub fn record_sensor_degraded(handle: SensorHandle) {
    counter!(
        "sensor_sampler_sensors_degraded_total",
        "handle" => handle.to_string()
    )
    .increment(1);
}

/// 记录传感器使能状态
pub fn record_sensor_enabled(handle: SensorHandle, enabled: bool) {
    gauge!(
        "sensor_sampler_sensor_enabled",
        "handle" => handle.to_string()
    )
    .set(if enabled { 1.0 } else { 0.0 });
}

/// 记录 sink 投递结果
pub fn record_sink_delivery(sink_name: &str, count: usize, accepted: bool) {
    let status = if accepted { "accepted" } else { "dropped" };
    counter!(
        "sensor_sampler_sink_events_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(count as u64);
}

/// 投递指标聚合器
///
/// 在内存中聚合事件，统计每个传感器的样本数与样本间隔。
#[derive(Debug, Clone, Default)]
pub struct DeliveryAggregator {
    /// 总事件数
    pub total_events: u64,

    /// flush 完成标记数
    pub flush_markers: u64,

    /// 唤醒型投递的事件数
    pub wake_up_events: u64,

    /// 各传感器样本数
    pub sample_counts: HashMap<SensorHandle, u64>,

    /// 各传感器样本间隔统计 (毫秒)
    pub interval_stats: HashMap<SensorHandle, RunningStats>,

    last_timestamps: HashMap<SensorHandle, i64>,
}

impl DeliveryAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, event: &Event, wake_up: bool) {
        self.total_events += 1;
        if wake_up {
            self.wake_up_events += 1;
        }

        if let EventPayload::Meta(_) = event.payload {
            self.flush_markers += 1;
            return;
        }

        let handle = event.sensor_handle;
        *self.sample_counts.entry(handle).or_insert(0) += 1;

        if let Some(previous) = self.last_timestamps.insert(handle, event.timestamp) {
            let interval_ms = (event.timestamp - previous) as f64 / 1_000_000.0;
            self.interval_stats
                .entry(handle)
                .or_default()
                .push(interval_ms);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> DeliverySummary {
        DeliverySummary {
            total_events: self.total_events,
            flush_markers: self.flush_markers,
            wake_up_events: self.wake_up_events,
            sample_counts: self.sample_counts.clone(),
            intervals_ms: self
                .interval_stats
                .iter()
                .map(|(handle, stats)| (*handle, StatsSummary::from(stats)))
                .collect(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 投递摘要
#[derive(Debug, Clone, Default)]
pub struct DeliverySummary {
    pub total_events: u64,
    pub flush_markers: u64,
    pub wake_up_events: u64,
    pub sample_counts: HashMap<SensorHandle, u64>,
    pub intervals_ms: HashMap<SensorHandle, StatsSummary>,
}

impl std::fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Delivery Summary ===")?;
        writeln!(f, "Total events: {}", self.total_events)?;
        writeln!(f, "Flush markers: {}", self.flush_markers)?;
        writeln!(f, "Wake-up events: {}", self.wake_up_events)?;

        let mut handles: Vec<_> = self.sample_counts.keys().copied().collect();
        handles.sort_unstable();
        for handle in handles {
            let count = self.sample_counts.get(&handle).copied().unwrap_or(0);
            let interval = self
                .intervals_ms
                .get(&handle)
                .cloned()
                .unwrap_or_default();
            writeln!(f, "  sensor {handle}: {count} samples, interval (ms): {interval}")?;
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SensorType, VectorReading};

    fn sample(handle: SensorHandle, timestamp: i64) -> Event {
        Event::new(
            handle,
            SensorType::Accelerometer,
            timestamp,
            EventPayload::Vector(VectorReading::default()),
        )
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_intervals() {
        let mut aggregator = DeliveryAggregator::new();

        aggregator.update(&sample(1, 0), false);
        aggregator.update(&sample(1, 20_000_000), false);
        aggregator.update(&sample(1, 40_000_000), false);
        aggregator.update(&Event::flush_complete(1), false);

        assert_eq!(aggregator.total_events, 4);
        assert_eq!(aggregator.flush_markers, 1);
        assert_eq!(aggregator.sample_counts.get(&1), Some(&3));
        let stats = &aggregator.interval_stats[&1];
        assert_eq!(stats.count(), 2);
        assert!((stats.mean() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregator_wake_up_count() {
        let mut aggregator = DeliveryAggregator::new();
        aggregator.update(&sample(2, 5), true);
        aggregator.update(&sample(3, 5), false);
        assert_eq!(aggregator.wake_up_events, 1);
        assert!(aggregator.interval_stats.is_empty());
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = DeliveryAggregator::new();
        aggregator.update(&sample(1, 0), false);
        aggregator.update(&sample(1, 10_000_000), false);

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Total events: 2"));
        assert!(output.contains("sensor 1: 2 samples"));
        assert!(output.contains("mean=10.000"));
    }
}
