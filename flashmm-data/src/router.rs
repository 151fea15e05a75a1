use anyhow::{anyhow, Context, Result};
use flashmm_core::OrderSnapshot;
use futures::future::BoxFuture;
use serde::Deserialize;
use std::time::Duration;

use crate::sink::SnapshotSink;

/// Body returned by `GET /api/orders`
#[derive(Debug, Deserialize)]
pub struct OrdersPage {
    pub ok: bool,
    pub count: usize,
    pub data: Vec<OrderSnapshot>,
}

/// HTTP client for the order router endpoint
pub struct RouterClient {
    client: reqwest::Client,
    url: String,
}

impl RouterClient {
    /// Create a client for `url` (e.g. `http://127.0.0.1:7880/api/orders`)
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build router HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST one snapshot to the router
    pub async fn post_snapshot(&self, snapshot: &OrderSnapshot) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(snapshot)
            .send()
            .await
            .with_context(|| format!("Router POST to {} failed", self.url))?;

        if !response.status().is_success() {
            return Err(anyhow!("Router rejected snapshot: HTTP {}", response.status()));
        }

        Ok(())
    }

    /// Fetch the most recent snapshots, newest first
    pub async fn recent(&self) -> Result<Vec<OrderSnapshot>> {
        let page: OrdersPage = self
            .client
            .get(&self.url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .with_context(|| format!("Router GET from {} failed", self.url))?
            .error_for_status()?
            .json()
            .await
            .context("Router returned a malformed page")?;

        if !page.ok {
            return Err(anyhow!("Router reported ok=false"));
        }

        tracing::trace!("Router page: count={}", page.count);
        Ok(page.data)
    }

    /// Like [`recent`](Self::recent) but failures only log; callers keep
    /// whatever they displayed before.
    pub async fn poll_recent(&self) -> Option<Vec<OrderSnapshot>> {
        match self.recent().await {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::debug!("Router poll failed: {:#}", e);
                None
            }
        }
    }
}

impl SnapshotSink for RouterClient {
    fn publish(&self, snapshot: OrderSnapshot) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.post_snapshot(&snapshot).await })
    }

    fn name(&self) -> &str {
        "router"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_orders_page() {
        let json = r#"{
            "ok": true,
            "count": 1,
            "data": [{
                "ts": 1730811225000,
                "market": "SEI/USDC",
                "mid": 0.04,
                "predictedDelta": 0.00001,
                "confidence": 0.57,
                "bestBid": {"price": 0.0399, "size": 450},
                "bestAsk": null
            }]
        }"#;

        let page: OrdersPage = serde_json::from_str(json).unwrap();
        assert!(page.ok);
        assert_eq!(page.count, 1);
        assert_eq!(page.data[0].market, "SEI/USDC");
        assert!(page.data[0].best_ask.is_none());
    }

    #[tokio::test]
    async fn test_poll_unreachable_router_is_none() {
        // Port 9 (discard) is closed on test hosts
        let client = RouterClient::new("http://127.0.0.1:9/api/orders", Duration::from_millis(300))
            .unwrap();
        assert!(client.poll_recent().await.is_none());
        assert!(client
            .publish(flashmm_core::PartialOrderSnapshot::default().into_snapshot(1))
            .await
            .is_err());
    }
}
