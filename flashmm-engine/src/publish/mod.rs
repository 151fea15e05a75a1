/// Throttled, queue-backed delivery of order snapshots
pub mod publisher;

pub use publisher::{PublishCounts, PublishOutcome, PublisherConfig, SnapshotPublisher};
