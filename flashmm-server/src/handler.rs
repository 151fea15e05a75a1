use flashmm_core::{now_ms, PartialOrderSnapshot};
use flashmm_data::SnapshotBuffer;
use std::sync::Arc;

use crate::error::ApiError;
use crate::protocol::*;

/// Handler for order snapshot and health requests
pub struct OrdersHandler {
    buffer: Arc<SnapshotBuffer>,
    recent_limit: usize,
    network_name: String,
}

impl OrdersHandler {
    pub fn new(buffer: Arc<SnapshotBuffer>, recent_limit: usize, network_name: String) -> Self {
        Self {
            buffer,
            recent_limit,
            network_name,
        }
    }

    pub fn buffer(&self) -> &Arc<SnapshotBuffer> {
        &self.buffer
    }

    /// Most recent snapshots, newest first
    pub async fn list(&self) -> OrdersResponse {
        let data = self.buffer.recent(self.recent_limit).await;
        OrdersResponse {
            ok: true,
            count: data.len(),
            data,
        }
    }

    /// Parse a partial snapshot, stamp it and append it to the buffer.
    /// The buffer is untouched when the body does not parse.
    pub async fn ingest(&self, body: &[u8]) -> Result<AckResponse, ApiError> {
        let partial =
            PartialOrderSnapshot::from_json(body).map_err(|e| ApiError::BadJson(e.to_string()))?;

        let item = partial.into_snapshot(now_ms());
        let len = self.buffer.push(item.clone()).await;

        tracing::debug!(
            "Snapshot stored: market={}, mid={}, buffered={}",
            item.market,
            item.mid,
            len
        );

        Ok(AckResponse { ok: true, ack: item })
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            name: SERVICE_NAME,
            status: "ok",
            network: self.network_name.clone(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}
