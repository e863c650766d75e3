//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 定时采样的时序性质 (首样本、间隔、周期变更、关闭延迟)
//! - 控制接口语义 (flush、注入)
//! - 单次触发传感器的触发、自动关闭与重新使能
//! - 配置 -> 传感器 -> 通道 sink 的端到端数据流

#[cfg(test)]
mod support {
    use std::sync::{Arc, Condvar, Mutex};
    use std::time::{Duration, Instant};

    use contracts::{
        Event, EventSink, SensorDescriptor, SensorFlags, SensorType, SharedSink,
    };

    /// Event together with the instant it reached the sink
    #[derive(Debug, Clone)]
    pub struct Received {
        pub event: Event,
        pub wake_up: bool,
        pub at: Instant,
    }

    /// Sink that records deliveries and lets tests wait for them
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<Received>>,
        arrived: Condvar,
    }

    impl RecordingSink {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn shared(self: &Arc<Self>) -> SharedSink {
            self.clone()
        }

        pub fn received(&self) -> Vec<Received> {
            self.events.lock().unwrap().clone()
        }

        pub fn samples(&self) -> Vec<Received> {
            self.received()
                .into_iter()
                .filter(|r| !r.event.is_flush_complete())
                .collect()
        }

        pub fn len(&self) -> usize {
            self.events.lock().unwrap().len()
        }

        /// Wait until at least `n` events arrived; false on timeout
        pub fn wait_for(&self, n: usize, timeout: Duration) -> bool {
            let guard = self.events.lock().unwrap();
            let (guard, _) = self
                .arrived
                .wait_timeout_while(guard, timeout, |events| events.len() < n)
                .unwrap();
            guard.len() >= n
        }
    }

    impl EventSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        fn deliver(&self, events: Vec<Event>, wake_up: bool) {
            let at = Instant::now();
            let mut guard = self.events.lock().unwrap();
            guard.extend(events.into_iter().map(|event| Received { event, wake_up, at }));
            self.arrived.notify_all();
        }
    }

    pub fn descriptor(handle: i32, min: Duration, max: Duration) -> SensorDescriptor {
        SensorDescriptor {
            handle,
            name: format!("sensor-{handle}"),
            vendor: "integration".into(),
            version: 1,
            sensor_type: SensorType::Accelerometer,
            type_as_string: String::new(),
            max_range: 0.0,
            resolution: 0.0,
            power: 0.0,
            min_delay: min,
            max_delay: max,
            fifo_reserved_event_count: 0,
            fifo_max_event_count: 0,
            required_permission: String::new(),
            flags: SensorFlags::default(),
        }
    }
}

#[cfg(test)]
mod timed_tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use contracts::{ControlError, Event, EventPayload, OperationMode, SensorType};
    use sampler::{Sensor, SensorBuilder};

    use crate::support::{descriptor, RecordingSink};

    const MIN: Duration = Duration::from_millis(5);
    const MAX: Duration = Duration::from_secs(2);

    fn timed(period: Duration, sink: &std::sync::Arc<RecordingSink>) -> Sensor {
        let mut d = descriptor(1, MIN, MAX);
        d.flags.data_injection = true;
        SensorBuilder::timed(d)
            .sampling_period(period)
            .build(sink.shared())
            .into_sensor()
    }

    #[test]
    fn test_first_sample_within_one_period() {
        let sink = RecordingSink::new();
        let period = Duration::from_millis(100);
        let sensor = timed(period, &sink);

        let t0 = Instant::now();
        sensor.set_enabled(true);
        assert!(sink.wait_for(1, Duration::from_secs(1)));

        let first = &sink.samples()[0];
        assert!(first.at >= t0);
        assert!(first.at - t0 <= period + Duration::from_millis(20));
    }

    #[test]
    fn test_samples_spaced_by_period() {
        let sink = RecordingSink::new();
        let period = Duration::from_millis(20);
        let sensor = timed(period, &sink);

        sensor.set_enabled(true);
        assert!(sink.wait_for(8, Duration::from_secs(2)));
        sensor.set_enabled(false);

        let stamps: Vec<i64> = sink.samples().iter().map(|r| r.event.timestamp).collect();
        let period_ns = period.as_nanos() as i64;
        for pair in stamps.windows(2) {
            let interval = pair[1] - pair[0];
            assert!(interval >= period_ns - 1_000_000, "interval {interval}ns too short");
        }

        // no accumulation beyond scheduler latency
        let span = stamps[7] - stamps[0];
        assert!(span < 7 * (period_ns + 5_000_000), "span {span}ns drifted");
    }

    #[test]
    fn test_disable_mid_wait_stops_deliveries() {
        let sink = RecordingSink::new();
        let sensor = timed(Duration::from_millis(300), &sink);

        sensor.set_enabled(true);
        assert!(sink.wait_for(1, Duration::from_secs(1)));
        thread::sleep(Duration::from_millis(50));
        sensor.set_enabled(false);

        thread::sleep(Duration::from_millis(400));
        assert_eq!(sink.samples().len(), 1);
    }

    #[test]
    fn test_shortened_period_applies_on_next_cycle() {
        let sink = RecordingSink::new();
        let sensor = timed(MAX, &sink);

        sensor.set_enabled(true);
        assert!(sink.wait_for(1, Duration::from_secs(1)));

        let changed_at = Instant::now();
        sensor.set_sampling_period(Duration::from_millis(20));
        assert!(sink.wait_for(2, Duration::from_millis(500)));
        assert!(sink.samples()[1].at - changed_at < Duration::from_millis(200));
    }

    #[test]
    fn test_lengthened_period_applies_on_next_cycle() {
        let sink = RecordingSink::new();
        let sensor = timed(Duration::from_millis(20), &sink);

        sensor.set_enabled(true);
        assert!(sink.wait_for(1, Duration::from_secs(1)));
        sensor.set_sampling_period(Duration::from_millis(400));
        let count = sink.samples().len();

        thread::sleep(Duration::from_millis(200));
        // at most one sample that was already due when the period changed
        assert!(sink.samples().len() <= count + 1);
    }

    #[test]
    fn test_flush_semantics() {
        let sink = RecordingSink::new();
        let sensor = timed(MAX, &sink);

        assert_eq!(sensor.flush(), Err(ControlError::BadValue));
        assert_eq!(sink.len(), 0);

        sensor.set_enabled(true);
        assert!(sink.wait_for(1, Duration::from_secs(1)));
        assert_eq!(sensor.flush(), Ok(()));

        let markers: Vec<_> = sink
            .received()
            .into_iter()
            .filter(|r| r.event.is_flush_complete())
            .collect();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].event.sensor_handle, 1);
        assert_eq!(markers[0].event.sensor_type, SensorType::MetaData);
    }

    #[test]
    fn test_injection_semantics() {
        let sink = RecordingSink::new();
        let sensor = timed(MAX, &sink);
        let event = Event::new(1, SensorType::Accelerometer, 99, EventPayload::Scalar(9.8));

        assert_eq!(sensor.inject_event(event.clone()), Err(ControlError::BadValue));

        sensor.set_operation_mode(OperationMode::DataInjection);
        assert_eq!(sensor.inject_event(event.clone()), Ok(()));
        assert_eq!(sink.received()[0].event, event);

        let plain = SensorBuilder::timed(descriptor(2, MIN, MAX))
            .build(sink.shared())
            .into_sensor();
        plain.set_operation_mode(OperationMode::DataInjection);
        assert_eq!(plain.inject_event(event), Err(ControlError::InvalidOperation));
    }

    #[test]
    fn test_injection_mode_suspends_and_resumes_sampling() {
        let sink = RecordingSink::new();
        let sensor = timed(Duration::from_millis(10), &sink);

        sensor.set_enabled(true);
        assert!(sink.wait_for(1, Duration::from_secs(1)));
        sensor.set_operation_mode(OperationMode::DataInjection);
        thread::sleep(Duration::from_millis(20));
        let suspended = sink.samples().len();

        thread::sleep(Duration::from_millis(60));
        assert_eq!(sink.samples().len(), suspended);

        sensor.set_operation_mode(OperationMode::Normal);
        assert!(sink.wait_for(suspended + 2, Duration::from_secs(1)));
    }

    #[test]
    fn test_drop_during_timed_wait_is_bounded() {
        let sink = RecordingSink::new();
        let sensor = timed(MAX, &sink);
        sensor.set_enabled(true);
        assert!(sink.wait_for(1, Duration::from_secs(1)));

        let start = Instant::now();
        drop(sensor);
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}

#[cfg(test)]
mod one_shot_tests {
    use std::fs;
    use std::io::Write;
    use std::os::fd::OwnedFd;
    use std::os::unix::net::UnixStream;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use contracts::{OperationMode, SensorType};
    use sampler::{ArmAttribute, LatchedInput, Sensor, SensorBuilder};
    use tempfile::TempDir;

    use crate::support::{descriptor, RecordingSink};

    struct Rig {
        sensor: Sensor,
        sink: Arc<RecordingSink>,
        trigger: UnixStream,
        arm_path: PathBuf,
        _dir: TempDir,
    }

    fn rig() -> Rig {
        let dir = TempDir::new().unwrap();
        let arm_path = dir.path().join("enabled");
        fs::write(&arm_path, "1").unwrap();

        let (trigger, rx) = UnixStream::pair().unwrap();
        rx.set_nonblocking(true).unwrap();

        let mut d = descriptor(7, Duration::ZERO, Duration::ZERO);
        d.sensor_type = SensorType::WakeGesture;

        let sink = RecordingSink::new();
        let outcome = SensorBuilder::one_shot_input(d, LatchedInput::readable(OwnedFd::from(rx)))
            .arm_attribute(ArmAttribute::new(&arm_path, "0", "1"))
            .build(sink.shared());
        assert!(!outcome.is_degraded());

        Rig {
            sensor: outcome.into_sensor(),
            sink,
            trigger,
            arm_path,
            _dir: dir,
        }
    }

    fn attr(rig: &Rig) -> String {
        fs::read_to_string(&rig.arm_path).unwrap()
    }

    #[test]
    fn test_fires_once_and_auto_disarms() {
        let mut rig = rig();

        rig.sensor.set_enabled(true);
        assert_eq!(attr(&rig), "0");

        rig.trigger.write_all(b"1").unwrap();
        assert!(rig.sink.wait_for(1, Duration::from_secs(1)));

        // auto-disable happens under the lock before delivery
        assert!(!rig.sensor.snapshot().enabled);
        assert_eq!(attr(&rig), "1");

        let received = rig.sink.received();
        assert_eq!(received.len(), 1);
        assert!(received[0].wake_up);
        assert_eq!(received[0].event.sensor_type, SensorType::WakeGesture);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(rig.sink.len(), 1);
    }

    #[test]
    fn test_rearm_after_firing() {
        let mut rig = rig();

        rig.sensor.set_enabled(true);
        rig.trigger.write_all(b"1").unwrap();
        assert!(rig.sink.wait_for(1, Duration::from_secs(1)));
        assert_eq!(attr(&rig), "1");

        rig.sensor.set_enabled(true);
        assert_eq!(attr(&rig), "0");

        rig.trigger.write_all(b"1").unwrap();
        assert!(rig.sink.wait_for(2, Duration::from_secs(1)));
        assert!(!rig.sensor.snapshot().enabled);
    }

    #[test]
    fn test_false_latch_does_not_fire() {
        let mut rig = rig();

        rig.sensor.set_enabled(true);
        rig.trigger.write_all(b"0").unwrap();
        thread::sleep(Duration::from_millis(100));

        assert_eq!(rig.sink.len(), 0);
        assert!(rig.sensor.snapshot().enabled);
    }

    #[test]
    fn test_disable_quiesces_hardware() {
        let rig = rig();

        rig.sensor.set_enabled(true);
        assert_eq!(attr(&rig), "0");
        rig.sensor.set_enabled(false);
        assert_eq!(attr(&rig), "1");
        assert!(!rig.sensor.snapshot().enabled);
    }

    #[test]
    fn test_mode_change_preempts_blocked_wait() {
        let rig = rig();

        rig.sensor.set_enabled(true);
        thread::sleep(Duration::from_millis(20));
        rig.sensor.set_operation_mode(OperationMode::DataInjection);
        rig.sensor.set_operation_mode(OperationMode::Normal);
        assert!(rig.sensor.snapshot().enabled);
        assert_eq!(rig.sink.len(), 0);
    }

    #[test]
    fn test_drop_while_blocked_is_bounded() {
        let rig = rig();
        rig.sensor.set_enabled(true);
        thread::sleep(Duration::from_millis(20));

        let start = Instant::now();
        drop(rig.sensor);
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{EventPayload, SensorStatus};
    use dispatcher::create_dispatcher;
    use sampler::{SensorHealth, SensorRegistry};

    const CONFIG: &str = r#"
version = "V1"

[[sensors]]
handle = 1
name = "accel"
sensor_type = "accelerometer"
min_delay_us = 5000
max_delay_us = 1000000
sampling_period_us = 10000
enabled = true

[[sensors]]
handle = 2
name = "light"
sensor_type = "light"
min_delay_us = 5000
max_delay_us = 1000000

[[sinks]]
name = "events"
sink_type = "channel"
queue_capacity = 256

[[sinks]]
name = "debug"
sink_type = "log"
"#;

    /// End-to-end test: config -> SensorRegistry -> Dispatcher -> channel
    #[tokio::test]
    async fn test_e2e_config_to_channel() {
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let (dispatcher, outputs) = create_dispatcher(blueprint.sinks.clone()).unwrap();
        let dispatcher = Arc::new(dispatcher);
        assert_eq!(outputs.len(), 1);

        let registry = SensorRegistry::from_blueprint(&blueprint, dispatcher.clone());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.degraded_count(), 0);
        assert_eq!(registry.get(1).unwrap().health(), SensorHealth::Running);

        let rx = &outputs[0].receiver;
        let mut received = 0;
        while received < 5 {
            let delivery = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("timed out waiting for events")
                .unwrap();
            for event in &delivery.events {
                // only the enabled sensor produces samples
                assert_eq!(event.sensor_handle, 1);
                match &event.payload {
                    EventPayload::Vector(v) => assert_eq!(v.status, SensorStatus::AccuracyHigh),
                    other => panic!("unexpected payload {other:?}"),
                }
            }
            received += delivery.events.len();
        }

        // drop joins every worker
        tokio::task::spawn_blocking(move || drop(registry)).await.unwrap();

        let metrics = dispatcher.metrics();
        let events = metrics.iter().find(|(name, _)| name == "events").unwrap();
        assert!(events.1.write_count >= 5);
    }
}
