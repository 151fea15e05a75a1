use crate::sim::{QuoteConfig, RiskLimits};

/// Configuration for the market-making engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tick period (milliseconds)
    pub tick_ms: u64,

    /// Quote levels per side
    pub levels: usize,

    /// Level-0 spread before prediction and risk adjustments
    pub base_spread_bps: f64,

    /// Inventory notional cap (USDC)
    pub notional_cap: f64,

    /// Fraction of the notional cap that triggers quote widening
    pub inventory_band_pct: f64,

    /// Largest size quoted on one level
    pub max_size_per_level: f64,

    /// Smallest size quoted on one level
    pub min_size_per_level: f64,

    /// |z| of the latest return above which quotes widen and, when armed,
    /// the kill switch latches
    pub z_threshold: f64,

    /// Most recent trades kept for display
    pub trade_history: usize,

    /// Seed for the simulation RNG; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_ms: 200,
            levels: 3,
            base_spread_bps: 10.0,
            notional_cap: 2000.0,
            inventory_band_pct: 0.02,
            max_size_per_level: 500.0,
            min_size_per_level: 50.0,
            z_threshold: 5.0,
            trade_history: 24,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn quote_config(&self) -> QuoteConfig {
        QuoteConfig {
            levels: self.levels,
            base_spread_bps: self.base_spread_bps,
            max_size_per_level: self.max_size_per_level,
            min_size_per_level: self.min_size_per_level,
            notional_cap: self.notional_cap,
        }
    }

    pub fn risk_limits(&self) -> RiskLimits {
        RiskLimits {
            notional_cap: self.notional_cap,
            band_pct: self.inventory_band_pct,
            z_threshold: self.z_threshold,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_feed_components() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_ms, 200);

        let quotes = config.quote_config();
        assert_eq!(quotes.levels, 3);
        assert_eq!(quotes.notional_cap, 2000.0);

        let limits = config.risk_limits();
        assert!((limits.band_notional() - 40.0).abs() < 1e-9);
        assert_eq!(limits.z_threshold, 5.0);

        assert_eq!(config.with_seed(7).seed, Some(7));
    }
}
