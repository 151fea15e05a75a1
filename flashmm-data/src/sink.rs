use anyhow::Result;
use flashmm_core::OrderSnapshot;
use futures::future::BoxFuture;

use crate::buffer::SnapshotBuffer;

/// Destination for published quote snapshots
pub trait SnapshotSink: Send + Sync {
    /// Deliver one snapshot. Callers treat errors as a dropped publish.
    fn publish(&self, snapshot: OrderSnapshot) -> BoxFuture<'_, Result<()>>;

    /// Short label used in logs
    fn name(&self) -> &str;
}

impl SnapshotSink for SnapshotBuffer {
    fn publish(&self, snapshot: OrderSnapshot) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.push(snapshot).await;
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "buffer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashmm_core::PartialOrderSnapshot;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_buffer_as_sink() {
        let buffer = Arc::new(SnapshotBuffer::new());
        let sink: Arc<dyn SnapshotSink> = buffer.clone();

        sink.publish(PartialOrderSnapshot::default().into_snapshot(9))
            .await
            .unwrap();

        assert_eq!(buffer.len().await, 1);
        assert_eq!(sink.name(), "buffer");
    }
}
