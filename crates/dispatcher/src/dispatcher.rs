//! Dispatcher - fan-out of sensor events to sinks

use std::collections::HashSet;
use std::sync::Arc;

use async_channel::Receiver;
use contracts::{Event, EventSink, SharedSink, SinkConfig, SinkType};
use tracing::{debug, info, instrument};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sinks::{ChannelSink, Delivery, LogSink};

/// Receiving end of a configured channel sink
#[derive(Debug)]
pub struct ChannelOutput {
    pub name: String,
    pub receiver: Receiver<Delivery>,
}

/// Builder for creating a Dispatcher
#[derive(Default)]
pub struct DispatcherBuilder {
    configs: Vec<SinkConfig>,
    extra: Vec<SharedSink>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(configs: Vec<SinkConfig>) -> Self {
        Self {
            configs,
            extra: Vec::new(),
        }
    }

    /// Add an already constructed sink
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.extra.push(sink);
        self
    }

    /// Build the dispatcher
    ///
    /// Returns the receivers of every configured channel sink, in
    /// configuration order.
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(sink_count = self.configs.len() + self.extra.len())
    )]
    pub fn build(self) -> Result<(Dispatcher, Vec<ChannelOutput>), DispatcherError> {
        let mut names = HashSet::new();
        let mut handles = Vec::with_capacity(self.configs.len() + self.extra.len());
        let mut outputs = Vec::new();

        for config in &self.configs {
            if !names.insert(config.name.clone()) {
                return Err(DispatcherError::sink_creation(&config.name, "duplicate sink name"));
            }
            let (handle, output) = create_sink_handle(config)?;
            handles.push(handle);
            outputs.extend(output);
        }

        for sink in self.extra {
            if !names.insert(sink.name().to_string()) {
                return Err(DispatcherError::sink_creation(sink.name(), "duplicate sink name"));
            }
            handles.push(SinkHandle::new(sink, Arc::new(SinkMetrics::new())));
        }

        info!(sinks = handles.len(), "dispatcher built");
        Ok((Dispatcher::with_handles(handles), outputs))
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(
    config: &SinkConfig,
) -> Result<(SinkHandle, Option<ChannelOutput>), DispatcherError> {
    let metrics = Arc::new(SinkMetrics::new());
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::with_metrics(&config.name, Arc::clone(&metrics));
            Ok((SinkHandle::new(Arc::new(sink), metrics), None))
        }
        SinkType::Channel => {
            if config.queue_capacity == 0 {
                return Err(DispatcherError::sink_creation(
                    &config.name,
                    "queue_capacity must be positive",
                ));
            }
            let (sink, receiver) =
                ChannelSink::with_metrics(&config.name, config.queue_capacity, Arc::clone(&metrics));
            debug!(capacity = config.queue_capacity, "channel sink created");
            let output = ChannelOutput {
                name: config.name.clone(),
                receiver,
            };
            Ok((SinkHandle::new(Arc::new(sink), metrics), Some(output)))
        }
    }
}

/// Sink that fans every delivery out to several sinks
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self { handles }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl EventSink for Dispatcher {
    fn name(&self) -> &str {
        "dispatcher"
    }

    fn deliver(&self, events: Vec<Event>, wake_up: bool) {
        let Some((last, rest)) = self.handles.split_last() else {
            return;
        };
        for handle in rest {
            handle.deliver(events.clone(), wake_up);
        }
        last.deliver(events, wake_up);
    }
}

/// Convenience function to create a dispatcher from sink configs
pub fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
) -> Result<(Dispatcher, Vec<ChannelOutput>), DispatcherError> {
    DispatcherBuilder::new(sink_configs).build()
}
