//! Run statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use observability::DeliveryAggregator;

/// Statistics from a sampling run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total events received on the statistics channel
    pub events_received: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Sensors with a running worker
    pub active_sensors: usize,

    /// Sensors that failed to acquire their resources
    pub degraded_sensors: usize,

    /// Per-sink metrics at shutdown
    pub sink_metrics: Vec<(String, MetricsSnapshot)>,

    /// Events consumed from each configured channel sink
    pub drained: Vec<(String, u64)>,

    /// Per-sensor delivery statistics
    pub delivery: DeliveryAggregator,
}

impl PipelineStats {
    /// Events per second throughput
    pub fn events_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.events_received as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Sampling Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Events received: {}", self.events_received);
        println!("   ├─ Events/s: {:.2}", self.events_per_sec());
        println!("   ├─ Active sensors: {}", self.active_sensors);
        println!("   └─ Degraded sensors: {}", self.degraded_sensors);

        println!("\n📈 Deliveries");
        print!("{}", self.delivery.summary());

        if !self.sink_metrics.is_empty() {
            println!("\n📤 Sinks");
            for (i, (name, m)) in self.sink_metrics.iter().enumerate() {
                let prefix = if i == self.sink_metrics.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: written={}, dropped={}, failed={}",
                    prefix, name, m.write_count, m.dropped_count, m.failure_count
                );
            }
        }

        if !self.drained.is_empty() {
            println!("\n📥 Channel consumers");
            for (name, count) in &self.drained {
                println!("   ├─ {}: {} events", name, count);
            }
        }

        println!();
    }
}
