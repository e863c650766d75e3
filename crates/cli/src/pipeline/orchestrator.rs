//! Pipeline orchestrator - builds sensors and sinks, streams until stopped.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{SamplerBlueprint, SharedSink};
use dispatcher::{ChannelOutput, ChannelSink, DispatcherBuilder};
use sampler::SensorRegistry;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// Name of the internal sink feeding the run statistics
const STATS_SINK: &str = "cli-stats";

/// How long to wait for configured channel consumers after shutdown
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The sampler blueprint
    pub blueprint: SamplerBlueprint,

    /// Maximum number of events to receive (None = unlimited)
    pub max_events: Option<u64>,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Statistics channel capacity
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Enable every sensor after construction
    pub enable_all: bool,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves, the timeout expires, or the event
    /// limit is reached
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Setup sinks
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - events only feed the run statistics");
        }

        let (stats_sink, stats_rx) =
            ChannelSink::bounded(STATS_SINK, self.config.buffer_size.max(1));
        let (dispatcher, outputs) = DispatcherBuilder::new(blueprint.sinks.clone())
            .with_sink(Arc::new(stats_sink))
            .build()
            .context("Failed to create dispatcher")?;
        let dispatcher = Arc::new(dispatcher);

        let drains: Vec<_> = outputs.into_iter().map(spawn_drain).collect();
        info!(sinks = dispatcher.len(), "Dispatcher ready");

        // Build sensors
        let sink: SharedSink = dispatcher.clone();
        let registry = SensorRegistry::from_blueprint(blueprint, sink);
        if !registry.is_empty() && registry.degraded_count() == registry.len() {
            return Err(CliError::AllSensorsDegraded {
                count: registry.len(),
            }
            .into());
        }

        if self.config.enable_all {
            for sensor in registry.iter() {
                sensor.set_enabled(true);
            }
        }

        let mut stats = PipelineStats {
            active_sensors: registry.len() - registry.degraded_count(),
            degraded_sensors: registry.degraded_count(),
            ..Default::default()
        };

        info!(
            sensors = registry.len(),
            degraded = stats.degraded_sensors,
            max_events = ?self.config.max_events,
            "Sampling started"
        );

        // Stream
        let timeout = self.config.timeout;
        let expired = async move {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expired);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping sensors...");
                    break;
                }
                _ = &mut expired => {
                    info!(timeout_secs = timeout.map(|t| t.as_secs()), "Run timeout reached");
                    break;
                }
                delivery = stats_rx.recv() => {
                    let Ok(delivery) = delivery else {
                        warn!("Statistics channel closed");
                        break;
                    };
                    for event in &delivery.events {
                        stats.delivery.update(event, delivery.wake_up);
                    }
                    stats.events_received += delivery.events.len() as u64;

                    if let Some(max) = self.config.max_events {
                        if stats.events_received >= max {
                            info!(events = stats.events_received, "Reached max events limit");
                            break;
                        }
                    }
                }
            }
        }

        // Shutdown: sensors join their workers on drop
        info!("Shutting down sensors...");
        let snapshots: Vec<_> = registry.iter().map(|s| s.snapshot()).collect();
        tokio::task::spawn_blocking(move || {
            // quiesce arm attributes before the workers are joined
            registry.disable_all();
            drop(registry)
        })
        .await
        .map_err(|e| CliError::shutdown(e.to_string()))?;

        for snapshot in &snapshots {
            debug!(
                handle = snapshot.handle,
                enabled = snapshot.enabled,
                health = ?snapshot.health,
                "Sensor stopped"
            );
        }

        stats.sink_metrics = dispatcher.metrics();
        drop(dispatcher);

        for drain in drains {
            match tokio::time::timeout(DRAIN_TIMEOUT, drain).await {
                Ok(Ok(drained)) => stats.drained.push(drained),
                Ok(Err(e)) => warn!(error = %e, "Drain task failed"),
                Err(_) => warn!("Timed out waiting for channel consumer"),
            }
        }

        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            events = stats.events_received,
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

/// Consume a configured channel sink until every producer is gone
fn spawn_drain(output: ChannelOutput) -> JoinHandle<(String, u64)> {
    tokio::spawn(async move {
        let mut count = 0u64;
        while let Ok(delivery) = output.receiver.recv().await {
            count += delivery.events.len() as u64;
            debug!(sink = %output.name, events = delivery.events.len(), "Channel delivery");
        }
        (output.name, count)
    })
}
