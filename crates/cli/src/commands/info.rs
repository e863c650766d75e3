//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{SamplerBlueprint, SensorConfig, StrategyConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::ensure_config_exists;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    sensor_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sensors: Vec<SensorInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct SensorInfo {
    handle: i32,
    name: String,
    sensor_type: String,
    vendor: String,
    strategy: String,
    min_delay_us: u64,
    max_delay_us: u64,
    sampling_period_us: u64,
    wake_up: bool,
    one_shot: bool,
    data_injection: bool,
    enabled: bool,
    mode: String,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    ensure_config_exists(&args.config)?;

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn strategy_label(sensor: &SensorConfig) -> String {
    match &sensor.strategy {
        StrategyConfig::Timed => "timed".to_string(),
        StrategyConfig::ExternalSignal { poll_path, .. } => {
            format!("external_signal({})", poll_path.display())
        }
    }
}

/// Initial period as the sensor will apply it
fn effective_period_us(sensor: &SensorConfig) -> u64 {
    if sensor.flags.one_shot {
        return 0;
    }
    sensor
        .sampling_period_us
        .unwrap_or(sensor.max_delay_us)
        .clamp(sensor.min_delay_us, sensor.max_delay_us.max(sensor.min_delay_us))
}

fn build_config_info(blueprint: &SamplerBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sensors = if args.sensors {
        blueprint
            .sensors
            .iter()
            .map(|s| SensorInfo {
                handle: s.handle,
                name: s.name.clone(),
                sensor_type: format!("{:?}", s.sensor_type),
                vendor: s.vendor.clone(),
                strategy: strategy_label(s),
                min_delay_us: s.min_delay_us,
                max_delay_us: s.max_delay_us,
                sampling_period_us: effective_period_us(s),
                wake_up: s.flags.wake_up || s.flags.one_shot,
                one_shot: s.flags.one_shot,
                data_injection: s.flags.data_injection,
                enabled: s.enabled,
                mode: format!("{:?}", s.mode),
            })
            .collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        sensor_count: blueprint.sensors.len(),
        sensors,
        sinks,
    }
}

fn print_config_info(blueprint: &SamplerBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Sensor Sampler Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📍 Config");
    println!("   └─ Version: {:?}", blueprint.version);

    println!("\n📡 Sensors ({})", blueprint.sensors.len());
    for (i, sensor) in blueprint.sensors.iter().enumerate() {
        let is_last = i == blueprint.sensors.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!(
            "   {} [{}] {} ({:?})",
            prefix, sensor.handle, sensor.name, sensor.sensor_type
        );

        if args.sensors {
            println!("   {}  ├─ Strategy: {}", child_prefix, strategy_label(sensor));
            println!(
                "   {}  ├─ Delay: {}..={} us, period {} us",
                child_prefix,
                sensor.min_delay_us,
                sensor.max_delay_us,
                effective_period_us(sensor)
            );
            println!(
                "   {}  ├─ Flags: wake_up={}, one_shot={}, data_injection={}",
                child_prefix,
                sensor.flags.wake_up || sensor.flags.one_shot,
                sensor.flags.one_shot,
                sensor.flags.data_injection
            );
            println!(
                "   {}  └─ Initial: enabled={}, mode={:?}",
                child_prefix, sensor.enabled, sensor.mode
            );
        }
    }

    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            if args.sinks {
                println!(
                    "   {} {} ({:?}, capacity {})",
                    prefix, sink.name, sink.sink_type, sink.queue_capacity
                );
            } else {
                println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);
            }
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint() -> SamplerBlueprint {
        config_loader::ConfigLoader::load_from_str(
            r#"
[[sensors]]
handle = 1
name = "accel"
sensor_type = "accelerometer"
min_delay_us = 10000
max_delay_us = 200000
sampling_period_us = 20000

[[sinks]]
name = "events"
sink_type = "channel"
"#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap()
    }

    #[test]
    fn test_effective_period_is_clamped() {
        let mut sensor = blueprint().sensors.remove(0);
        assert_eq!(effective_period_us(&sensor), 20_000);

        sensor.sampling_period_us = Some(500);
        assert_eq!(effective_period_us(&sensor), 10_000);
        sensor.sampling_period_us = None;
        assert_eq!(effective_period_us(&sensor), 200_000);
    }

    #[test]
    fn test_info_sections_follow_flags() {
        let bp = blueprint();
        let args = InfoArgs {
            config: "sensors.toml".into(),
            json: true,
            sensors: true,
            sinks: false,
        };
        let info = build_config_info(&bp, &args);
        assert_eq!(info.sensors.len(), 1);
        assert_eq!(info.sensors[0].strategy, "timed");
        assert!(info.sinks.is_empty());
    }
}
