use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::math::round_to_step;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("Unknown market symbol: {0}")]
    UnknownSymbol(String),
}

/// Supported trading pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Market {
    #[default]
    #[serde(rename = "SEI/USDC")]
    SeiUsdc,
    #[serde(rename = "wETH/USDC")]
    WethUsdc,
}

/// Per-market simulation and display constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketProfile {
    /// Mid-price the walk restarts from when the market is selected
    pub seed_mid: f64,
    /// Standard deviation of the multiplicative per-tick noise
    pub volatility: f64,
    /// Width of the symmetric range the synthetic predicted delta is drawn from
    pub delta_range: f64,
    /// Price rounding step
    pub price_step: f64,
    /// Decimal places shown for prices
    pub display_precision: usize,
}

const SEI_USDC_PROFILE: MarketProfile = MarketProfile {
    seed_mid: 0.04,
    volatility: 0.00015,
    delta_range: 0.0002,
    price_step: 0.0001,
    display_precision: 4,
};

const WETH_USDC_PROFILE: MarketProfile = MarketProfile {
    seed_mid: 3200.0,
    volatility: 0.75,
    delta_range: 1.0,
    price_step: 0.1,
    display_precision: 1,
};

impl Market {
    pub const ALL: [Market; 2] = [Market::SeiUsdc, Market::WethUsdc];

    pub fn symbol(&self) -> &'static str {
        match self {
            Market::SeiUsdc => "SEI/USDC",
            Market::WethUsdc => "wETH/USDC",
        }
    }

    pub fn profile(&self) -> &'static MarketProfile {
        match self {
            Market::SeiUsdc => &SEI_USDC_PROFILE,
            Market::WethUsdc => &WETH_USDC_PROFILE,
        }
    }

    pub fn price_step(&self) -> f64 {
        self.profile().price_step
    }

    pub fn display_precision(&self) -> usize {
        self.profile().display_precision
    }

    /// Round a price to the nearest multiple of the market's step
    pub fn round_price(&self, price: f64) -> f64 {
        round_to_step(price, self.price_step())
    }

    /// Format a price with the market's display precision
    pub fn format_price(&self, price: f64) -> String {
        format!("{:.*}", self.display_precision(), price)
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Market {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Market::ALL
            .into_iter()
            .find(|m| m.symbol().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MarketError::UnknownSymbol(wanted.to_string()))
    }
}
