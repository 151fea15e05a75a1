use anyhow::{anyhow, Result};
use flashmm_core::OrderSnapshot;
use flashmm_data::SnapshotSink;
use futures::StreamExt;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Configuration for the snapshot publisher
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Minimum spacing between accepted snapshots
    pub min_interval: Duration,

    /// Snapshots waiting for the worker before offers are dropped
    pub queue_capacity: usize,

    /// Concurrent deliveries in flight
    pub max_in_flight: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(1000),
            queue_capacity: 16,
            max_in_flight: 4,
        }
    }
}

/// What happened to an offered snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Accepted for delivery
    Queued,
    /// Rejected by the rate limiter
    Throttled,
    /// Rate limiter allowed it but the queue was full or closed
    Dropped,
}

#[derive(Debug, Default)]
struct PublishStats {
    queued: AtomicU64,
    throttled: AtomicU64,
    dropped: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl PublishStats {
    fn counts(&self) -> PublishCounts {
        PublishCounts {
            queued: self.queued.load(Ordering::Relaxed),
            throttled: self.throttled.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the publisher counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishCounts {
    pub queued: u64,
    pub throttled: u64,
    pub dropped: u64,
    pub delivered: u64,
    pub failed: u64,
}

/// Rate-limited, queue-backed snapshot publisher.
///
/// `offer` never blocks: it checks the limiter and tries to enqueue. A
/// background worker drains the queue into the sink with bounded
/// concurrency. Failed deliveries are counted and dropped.
pub struct SnapshotPublisher {
    limiter: DefaultDirectRateLimiter,
    tx: mpsc::Sender<OrderSnapshot>,
    stats: Arc<PublishStats>,
    sink_name: String,
    worker: JoinHandle<()>,
}

impl SnapshotPublisher {
    /// Start the delivery worker for `sink`. Must be called inside a Tokio runtime.
    pub fn spawn(sink: Arc<dyn SnapshotSink>, config: PublisherConfig) -> Result<Self> {
        let quota = Quota::with_period(config.min_interval)
            .ok_or_else(|| anyhow!("Publish interval must be non-zero"))?;
        let limiter = RateLimiter::direct(quota);

        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let stats = Arc::new(PublishStats::default());
        let sink_name = sink.name().to_string();

        let worker = tokio::spawn(drain(
            rx,
            sink,
            config.max_in_flight.max(1),
            stats.clone(),
        ));

        tracing::info!(
            "Snapshot publisher started: sink={}, interval={:?}, queue={}, in_flight={}",
            sink_name,
            config.min_interval,
            config.queue_capacity,
            config.max_in_flight
        );

        Ok(Self {
            limiter,
            tx,
            stats,
            sink_name,
            worker,
        })
    }

    pub fn offer(&self, snapshot: OrderSnapshot) -> PublishOutcome {
        if self.limiter.check().is_err() {
            self.stats.throttled.fetch_add(1, Ordering::Relaxed);
            return PublishOutcome::Throttled;
        }

        match self.tx.try_send(snapshot) {
            Ok(()) => {
                self.stats.queued.fetch_add(1, Ordering::Relaxed);
                PublishOutcome::Queued
            }
            Err(e) => {
                tracing::debug!("Dropping snapshot for {}: {}", self.sink_name, e);
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                PublishOutcome::Dropped
            }
        }
    }

    pub fn counts(&self) -> PublishCounts {
        self.stats.counts()
    }

    pub fn sink_name(&self) -> &str {
        &self.sink_name
    }

    /// Close the queue and wait for queued snapshots to finish delivering
    pub async fn shutdown(self) -> PublishCounts {
        let Self {
            tx, worker, stats, ..
        } = self;
        drop(tx);
        if let Err(e) = worker.await {
            tracing::warn!("Publisher worker ended abnormally: {}", e);
        }
        stats.counts()
    }
}

async fn drain(
    rx: mpsc::Receiver<OrderSnapshot>,
    sink: Arc<dyn SnapshotSink>,
    max_in_flight: usize,
    stats: Arc<PublishStats>,
) {
    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|snapshot| (snapshot, rx))
    })
    .for_each_concurrent(max_in_flight, |snapshot| {
        let sink = sink.clone();
        let stats = stats.clone();
        async move {
            match sink.publish(snapshot).await {
                Ok(()) => {
                    stats.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("Publish to {} failed: {:#}", sink.name(), e);
                }
            }
        }
    })
    .await;

    tracing::debug!("Publisher queue closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashmm_core::PartialOrderSnapshot;
    use flashmm_data::SnapshotBuffer;
    use futures::future::BoxFuture;

    struct FailingSink;

    impl SnapshotSink for FailingSink {
        fn publish(&self, _snapshot: OrderSnapshot) -> BoxFuture<'_, Result<()>> {
            Box::pin(async { Err(anyhow!("router unavailable")) })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn snapshot(ts: u64) -> OrderSnapshot {
        PartialOrderSnapshot::default().into_snapshot(ts)
    }

    #[tokio::test]
    async fn test_second_offer_within_interval_is_throttled() {
        let buffer = Arc::new(SnapshotBuffer::new());
        let publisher = SnapshotPublisher::spawn(buffer.clone(), PublisherConfig::default()).unwrap();

        assert_eq!(publisher.offer(snapshot(1)), PublishOutcome::Queued);
        assert_eq!(publisher.offer(snapshot(2)), PublishOutcome::Throttled);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(publisher.offer(snapshot(3)), PublishOutcome::Queued);

        let counts = publisher.shutdown().await;
        assert_eq!(counts.queued, 2);
        assert_eq!(counts.throttled, 1);
        assert_eq!(counts.delivered, 2);
        assert_eq!(buffer.len().await, 2);
    }

    #[tokio::test]
    async fn test_failed_publish_is_counted_and_dropped() {
        let config = PublisherConfig {
            min_interval: Duration::from_millis(1),
            ..Default::default()
        };
        let publisher = SnapshotPublisher::spawn(Arc::new(FailingSink), config).unwrap();
        assert_eq!(publisher.sink_name(), "failing");

        assert_eq!(publisher.offer(snapshot(1)), PublishOutcome::Queued);

        let counts = publisher.shutdown().await;
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.delivered, 0);
    }

    #[tokio::test]
    async fn test_zero_interval_is_rejected() {
        let config = PublisherConfig {
            min_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(SnapshotPublisher::spawn(Arc::new(SnapshotBuffer::new()), config).is_err());
    }
}
