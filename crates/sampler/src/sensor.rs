//! Sensor - 传感器实例与控制接口
//!
//! 每个 `Sensor` 拥有一个 worker 线程，构造时创建，drop 时停止并 join。
//! 所有控制接口都可以从任意线程调用，且不会等待 worker。

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use contracts::{
    ControlError, ControlResult, Event, OperationMode, SensorDescriptor, SensorHandle, SensorType,
};
use tracing::{debug, error, info, instrument, warn};

use crate::emitter::Emitter;
use crate::hardware::ArmAttribute;
use crate::state::Shared;
use crate::wake::WakeChannel;

/// 传感器运行状况
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorHealth {
    /// worker 正常运行
    Running,
    /// 构造阶段资源获取失败，从未启动 worker
    Degraded,
    /// worker 因运行期错误退出
    Stopped,
}

/// 传感器状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorSnapshot {
    pub handle: SensorHandle,
    pub enabled: bool,
    pub sampling_period: Duration,
    pub mode: OperationMode,
    pub health: SensorHealth,
}

/// 外部信号传感器的控制端
pub(crate) struct SignalControl {
    /// 构造失败时为 None
    pub wake: Option<WakeChannel>,
    pub arm: Option<ArmAttribute>,
}

/// 传感器
pub struct Sensor {
    descriptor: Arc<SensorDescriptor>,
    shared: Arc<Shared>,
    emitter: Emitter,
    signal: Option<SignalControl>,
    worker: Option<JoinHandle<()>>,
}

impl Sensor {
    pub(crate) fn from_parts(
        descriptor: Arc<SensorDescriptor>,
        shared: Arc<Shared>,
        emitter: Emitter,
        signal: Option<SignalControl>,
        worker: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            descriptor,
            shared,
            emitter,
            signal,
            worker,
        }
    }

    /// 传感器描述
    pub fn descriptor(&self) -> &SensorDescriptor {
        &self.descriptor
    }

    pub fn handle(&self) -> SensorHandle {
        self.descriptor.handle
    }

    /// 使能/关闭
    ///
    /// 状态未变化时不通知 worker。外部信号传感器在加锁前写入静默值，
    /// 解锁后写入使能值。
    #[instrument(name = "sensor_set_enabled", skip(self), fields(handle = self.descriptor.handle))]
    pub fn set_enabled(&self, enabled: bool) {
        if !enabled {
            self.with_arm(|arm| arm.quiesce());
        }

        let changed = {
            let mut state = self.shared.lock();
            let changed = state.enabled != enabled;
            if changed {
                state.enabled = enabled;
                self.shared.notify();
                self.wake();
            }
            changed
        };

        if changed {
            info!(sensor = %self.descriptor.name, enabled, "sensor activation changed");
            observability::record_sensor_enabled(self.descriptor.handle, enabled);
        }

        if enabled {
            self.with_arm(|arm| arm.arm());
        }
    }

    /// 设置采样周期，限制在 `[min_delay, max_delay]` 之内
    pub fn set_sampling_period(&self, period: Duration) {
        let clamped = self.descriptor.clamp_period(period);

        let mut state = self.shared.lock();
        if state.sampling_period != clamped {
            debug!(
                handle = self.descriptor.handle,
                requested_us = period.as_micros() as u64,
                period_us = clamped.as_micros() as u64,
                "sampling period changed"
            );
            state.sampling_period = clamped;
            self.shared.notify();
        }
    }

    /// 切换工作模式
    ///
    /// `DataInjection` 模式下 worker 挂起，不再产生样本。
    #[instrument(name = "sensor_set_operation_mode", skip(self), fields(handle = self.descriptor.handle))]
    pub fn set_operation_mode(&self, mode: OperationMode) {
        let mut state = self.shared.lock();
        if state.mode != mode {
            info!(sensor = %self.descriptor.name, ?mode, "operation mode changed");
            state.mode = mode;
            self.shared.notify();
            self.wake();
        }
    }

    /// 同步投递一个 flush 完成事件
    ///
    /// 未使能时返回 `BadValue`。
    pub fn flush(&self) -> ControlResult {
        let state = self.shared.lock();
        if !state.enabled {
            return Err(ControlError::BadValue);
        }

        self.emitter
            .deliver(vec![Event::flush_complete(self.descriptor.handle)]);
        observability::record_flush_complete(self.descriptor.handle);
        Ok(())
    }

    /// 注入事件
    ///
    /// - 附加信息事件：接受但不投递
    /// - 不支持注入：`InvalidOperation`
    /// - `DataInjection` 模式：原样投递
    /// - 其他模式：`BadValue`
    pub fn inject_event(&self, event: Event) -> ControlResult {
        if event.sensor_type == SensorType::AdditionalInfo {
            return Ok(());
        }

        if !self.descriptor.supports_data_injection() {
            return Err(ControlError::InvalidOperation);
        }

        let state = self.shared.lock();
        if state.mode != OperationMode::DataInjection {
            return Err(ControlError::BadValue);
        }

        self.emitter.deliver(vec![event]);
        observability::record_event_injected(self.descriptor.handle);
        Ok(())
    }

    pub fn health(&self) -> SensorHealth {
        let stop_requested = self.shared.lock().stop_requested;
        self.health_with(stop_requested)
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        let state = self.shared.lock();
        SensorSnapshot {
            handle: self.descriptor.handle,
            enabled: state.enabled,
            sampling_period: state.sampling_period,
            mode: state.mode,
            health: self.health_with(state.stop_requested),
        }
    }

    fn health_with(&self, stop_requested: bool) -> SensorHealth {
        match &self.worker {
            None => SensorHealth::Degraded,
            Some(worker) if stop_requested || worker.is_finished() => SensorHealth::Stopped,
            Some(_) => SensorHealth::Running,
        }
    }

    /// 唤醒阻塞在就绪等待上的 worker (需持锁调用)
    fn wake(&self) {
        if let Some(wake) = self.signal.as_ref().and_then(|s| s.wake.as_ref()) {
            wake.wake();
        }
    }

    fn with_arm(&self, op: impl FnOnce(&ArmAttribute) -> std::io::Result<bool>) {
        let Some(arm) = self.signal.as_ref().and_then(|s| s.arm.as_ref()) else {
            return;
        };
        if let Err(e) = op(arm) {
            warn!(
                handle = self.descriptor.handle,
                path = %arm.path().display(),
                error = %e,
                "failed to write arm attribute"
            );
        }
    }
}

impl std::fmt::Debug for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sensor")
            .field("handle", &self.descriptor.handle)
            .field("name", &self.descriptor.name)
            .field("health", &self.health())
            .finish()
    }
}

impl Drop for Sensor {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.stop_requested = true;
            state.enabled = false;
            self.shared.notify();
            self.wake();
        }

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(handle = self.descriptor.handle, "sensor worker panicked");
            }
        }
    }
}
