use serde::{Deserialize, Serialize};

use crate::types::TimestampMS;

/// Book side of a quote or fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Bid,
    Ask,
}

/// A single priced and sized quote level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteLevel {
    pub price: f64,
    pub size: f64,
}

/// Both sides of the quoted book, best level first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub bids: Vec<QuoteLevel>,
    pub asks: Vec<QuoteLevel>,
}

impl OrderBookSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn best_bid(&self) -> Option<&QuoteLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&QuoteLevel> {
        self.asks.first()
    }

    /// Top-of-book spread as a fraction of `mid`, 0.0 unless both sides are priced
    pub fn spread_fraction(&self, mid: f64) -> f64 {
        let bid = self.best_bid().map(|l| l.price).unwrap_or(0.0);
        let ask = self.best_ask().map(|l| l.price).unwrap_or(0.0);
        if bid > 0.0 && ask > 0.0 && mid > 0.0 {
            (ask - bid) / mid
        } else {
            0.0
        }
    }
}

/// A simulated fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(rename = "ts")]
    pub timestamp: TimestampMS,
    pub side: Side,
    pub price: f64,
    pub size: f64,
}
