use flashmm_core::{Market, OrderBookSnapshot, Trade};
use serde::Serialize;
use std::fmt;

use super::workflow::Stage;

/// Consistent read-only copy of the engine state for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub market: Market,
    pub stage: Stage,
    pub paused: bool,
    pub mid: f64,
    pub predicted_delta: f64,
    pub confidence: f64,
    pub z_score: f64,
    pub auto_widening: bool,
    /// Simulated engine latency of the last processed tick
    pub latency_ms: u64,
    pub position: f64,
    pub cash: f64,
    /// Cash plus position marked at mid
    pub pnl: f64,
    /// Top-of-book spread in bps, 0 with an empty book
    pub spread_bps: f64,
    pub book: OrderBookSnapshot,
    /// Newest first
    pub trades: Vec<Trade>,
    pub kill_reason: Option<String>,
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = self.market.display_precision();
        write!(
            f,
            "{} [{}{}] mid={:.*} pred={:+.6} conf={:.2} z={:+.2} spread={:.1}bps pos={:.0} pnl={:+.4} trades={} latency={}ms",
            self.market,
            self.stage,
            if self.paused { ", paused" } else { "" },
            precision,
            self.mid,
            self.predicted_delta,
            self.confidence,
            self.z_score,
            self.spread_bps,
            self.position,
            self.pnl,
            self.trades.len(),
            self.latency_ms,
        )?;
        if self.auto_widening {
            write!(f, " widening")?;
        }
        Ok(())
    }
}
