//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{SamplerBlueprint, StrategyConfig};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::ensure_config_exists;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_sampler(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    ensure_config_exists(&args.config)?;

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        sensors = blueprint.sensors.len(),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        max_events: (args.max_events != 0).then_some(args.max_events),
        timeout: (args.timeout != 0).then(|| Duration::from_secs(args.timeout)),
        buffer_size: args.buffer_size,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
        enable_all: args.enable_all,
    };

    let pipeline = Pipeline::new(pipeline_config);

    info!("Starting sensors...");
    let stats = pipeline
        .run(shutdown_signal())
        .await
        .context("Sampling run failed")?;

    info!(
        events = stats.events_received,
        duration_secs = stats.duration.as_secs_f64(),
        events_per_sec = format!("{:.2}", stats.events_per_sec()),
        "Sampling completed"
    );
    stats.print_summary();

    info!("Sensor Sampler finished");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
///
/// If a handler cannot be installed the corresponding branch never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &SamplerBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Sensors ({}):", blueprint.sensors.len());
    for sensor in &blueprint.sensors {
        let strategy = match &sensor.strategy {
            StrategyConfig::Timed => "timed".to_string(),
            StrategyConfig::ExternalSignal { poll_path, .. } => {
                format!("external signal on {}", poll_path.display())
            }
        };
        println!(
            "  - [{}] {} ({:?}, {}){}",
            sensor.handle,
            sensor.name,
            sensor.sensor_type,
            strategy,
            if sensor.enabled { " enabled" } else { "" }
        );
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
