use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Bank module balance entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

/// Best-effort chain REST reader. Every call returns `None` on failure.
pub struct ChainClient {
    client: reqwest::Client,
    rest_url: String,
}

impl ChainClient {
    pub fn new(rest_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build chain REST client")?;

        Ok(Self {
            client,
            rest_url: rest_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn latest_block_height(&self) -> Option<u64> {
        let url = format!("{}/blocks/latest", self.rest_url);
        let json = self.get_json(&url).await?;
        parse_block_height(&json)
    }

    pub async fn balances(&self, address: &str) -> Option<Vec<Coin>> {
        let url = format!("{}/cosmos/bank/v1beta1/balances/{}", self.rest_url, address);
        let json = self.get_json(&url).await?;
        Some(parse_balances(&json))
    }

    async fn get_json(&self, url: &str) -> Option<Value> {
        let response = match self
            .client
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::debug!("Chain REST {} returned HTTP {}", url, r.status());
                return None;
            }
            Err(e) => {
                tracing::debug!("Chain REST {} failed: {}", url, e);
                return None;
            }
        };

        response.json::<Value>().await.ok()
    }
}

/// Height from a `/blocks/latest` body; the node may encode it as string or number
pub fn parse_block_height(json: &Value) -> Option<u64> {
    let height = &json["block"]["header"]["height"];
    match height {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Coins from a bank balances body; a missing or malformed list is empty
pub fn parse_balances(json: &Value) -> Vec<Coin> {
    json.get("balances")
        .and_then(|b| serde_json::from_value::<Vec<Coin>>(b.clone()).ok())
        .unwrap_or_default()
}

/// Human amount of `minimal_denom` with two decimals, "0" when absent
pub fn format_amount(coins: Option<&[Coin]>, minimal_denom: &str, decimals: u32) -> String {
    let Some(coins) = coins else {
        return "0".to_string();
    };
    let Some(coin) = coins.iter().find(|c| c.denom == minimal_denom) else {
        return "0".to_string();
    };
    let raw: f64 = coin.amount.parse().unwrap_or(0.0);
    format!("{:.2}", raw / 10f64.powi(decimals as i32))
}
