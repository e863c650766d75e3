//! # Dispatcher
//!
//! 事件分发模块。
//!
//! 负责：
//! - 接收传感器 worker 投递的事件批次
//! - Fan-out 到多个 sinks
//! - 隔离慢消费者：通道满时丢弃并计数，不阻塞 worker

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{Event, EventSink, SharedSink};
pub use dispatcher::{create_dispatcher, ChannelOutput, Dispatcher, DispatcherBuilder};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{ChannelSink, Delivery, LogSink};
