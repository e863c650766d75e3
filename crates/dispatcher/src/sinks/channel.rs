//! ChannelSink - forwards event batches to an async consumer
//!
//! Workers run on plain threads, so delivery uses `try_send` and never
//! waits on the consumer. A full queue drops the batch.

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender, TrySendError};
use contracts::{Event, EventSink};
use tracing::{error, warn};

use crate::metrics::SinkMetrics;

/// One `deliver` call as seen by the consumer
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub events: Vec<Event>,
    pub wake_up: bool,
}

/// Sink backed by a bounded async channel
pub struct ChannelSink {
    name: String,
    tx: Sender<Delivery>,
    metrics: Arc<SinkMetrics>,
}

impl ChannelSink {
    /// Create a sink and the receiving end of its queue
    ///
    /// `capacity` counts batches and must be non-zero.
    pub fn bounded(name: impl Into<String>, capacity: usize) -> (Self, Receiver<Delivery>) {
        Self::with_metrics(name, capacity, Arc::new(SinkMetrics::new()))
    }

    pub fn with_metrics(
        name: impl Into<String>,
        capacity: usize,
        metrics: Arc<SinkMetrics>,
    ) -> (Self, Receiver<Delivery>) {
        let (tx, rx) = bounded(capacity);
        let sink = Self {
            name: name.into(),
            tx,
            metrics,
        };
        (sink, rx)
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }
}

impl EventSink for ChannelSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, events: Vec<Event>, wake_up: bool) {
        let count = events.len();
        match self.tx.try_send(Delivery { events, wake_up }) {
            Ok(()) => {
                self.metrics.add_write_count(count);
                self.metrics.set_queue_len(self.tx.len());
                observability::record_sink_delivery(&self.name, count, true);
            }
            Err(TrySendError::Full(_)) => {
                self.metrics.add_dropped_count(count);
                observability::record_sink_delivery(&self.name, count, false);
                warn!(sink = %self.name, count, "queue full, events dropped");
            }
            Err(TrySendError::Closed(_)) => {
                self.metrics.add_failure_count(count);
                observability::record_sink_delivery(&self.name, count, false);
                error!(sink = %self.name, count, "consumer closed, events lost");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{EventPayload, SensorType};

    fn sample(ts: i64) -> Event {
        Event::new(4, SensorType::Pressure, ts, EventPayload::Scalar(1013.0))
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_batches() {
        let (sink, rx) = ChannelSink::bounded("events", 4);
        sink.deliver(vec![sample(1), sample(2)], true);

        let delivery = rx.recv().await.unwrap();
        assert!(delivery.wake_up);
        assert_eq!(delivery.events, vec![sample(1), sample(2)]);
        assert_eq!(sink.metrics().write_count(), 2);
    }

    #[tokio::test]
    async fn test_channel_sink_drops_when_full() {
        let (sink, rx) = ChannelSink::bounded("small", 2);
        for ts in 0..5 {
            sink.deliver(vec![sample(ts)], false);
        }

        let snapshot = sink.metrics().snapshot();
        assert_eq!(snapshot.write_count, 2);
        assert_eq!(snapshot.dropped_count, 3);
        assert_eq!(snapshot.queue_len, 2);

        // oldest batches survive
        assert_eq!(rx.recv().await.unwrap().events, vec![sample(0)]);
        assert_eq!(rx.recv().await.unwrap().events, vec![sample(1)]);
    }

    #[tokio::test]
    async fn test_channel_sink_closed_consumer() {
        let (sink, rx) = ChannelSink::bounded("gone", 2);
        drop(rx);
        sink.deliver(vec![sample(0), sample(1)], false);
        assert_eq!(sink.metrics().failure_count(), 2);
    }
}
