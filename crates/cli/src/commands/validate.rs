//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{SamplerBlueprint, StrategyConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    sensor_count: usize,
    timed_count: usize,
    one_shot_count: usize,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let one_shot_count = blueprint
                .sensors
                .iter()
                .filter(|s| s.flags.one_shot)
                .count();

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    sensor_count: blueprint.sensors.len(),
                    timed_count: blueprint.sensors.len() - one_shot_count,
                    one_shot_count,
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &SamplerBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - events are only counted".to_string());
    }

    if blueprint.sensors.iter().all(|s| !s.enabled) {
        warnings.push("No sensor is enabled at startup".to_string());
    }

    for sensor in &blueprint.sensors {
        if let StrategyConfig::ExternalSignal { poll_path, arm } = &sensor.strategy {
            if !poll_path.exists() {
                warnings.push(format!(
                    "Sensor '{}': poll path {} does not exist - sensor will be degraded",
                    sensor.name,
                    poll_path.display()
                ));
            }
            if arm.is_none() {
                warnings.push(format!(
                    "Sensor '{}': no arm attribute - hardware stays in its current state",
                    sensor.name
                ));
            }
        }

        if sensor.flags.wake_up && !sensor.flags.one_shot {
            warnings.push(format!(
                "Sensor '{}': continuous wake-up sensor delivers every sample as wake-up",
                sensor.name
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!(
                "  Sensors: {} ({} timed, {} one-shot)",
                summary.sensor_count, summary.timed_count, summary.one_shot_count
            );
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_config_with_warnings() {
        let file = write_config(
            r#"
[[sensors]]
handle = 1
name = "accel"
sensor_type = "accelerometer"
min_delay_us = 10000
"#,
        );
        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        });

        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("No sinks")));
        assert!(warnings.iter().any(|w| w.contains("No sensor is enabled")));
        assert_eq!(result.summary.unwrap().timed_count, 1);
    }

    #[test]
    fn test_invalid_config_reports_error() {
        let file = write_config(
            r#"
[[sensors]]
handle = 1
name = "accel"
sensor_type = "accelerometer"
min_delay_us = 0
"#,
        );
        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        });

        assert!(!result.valid);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = validate_config(&ValidateArgs {
            config: dir.path().join("missing.toml"),
            json: false,
        });
        assert!(!result.valid);
    }
}
