use flashmm_core::math::clamp;
use flashmm_core::{Market, OrderBookSnapshot, QuoteLevel};

/// Cap on the prediction-driven spread add-on
pub const MAX_DYNAMIC_ADJ_BPS: f64 = 20.0;

/// Extra spread applied while the risk governor asks to widen
pub const WIDEN_BPS: f64 = 20.0;

/// Largest fractional shift of the quoting mid due to inventory
pub const MAX_SKEW: f64 = 0.02;

/// Each deeper level's offset grows by this fraction of the level-0 spread
const LEVEL_SPREAD_STEP: f64 = 0.6;

/// Each deeper level quotes this fraction less size
const LEVEL_SIZE_DECAY: f64 = 0.2;

/// Ladder shape
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    /// Price levels per side
    pub levels: usize,

    /// Spread at level 0 before adjustments
    pub base_spread_bps: f64,

    /// Size cap for a single level
    pub max_size_per_level: f64,

    /// Size floor for a single level
    pub min_size_per_level: f64,

    /// Notional the inventory skew is measured against
    pub notional_cap: f64,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            levels: 3,
            base_spread_bps: 10.0,
            max_size_per_level: 500.0,
            min_size_per_level: 50.0,
            notional_cap: 2000.0,
        }
    }
}

/// Per-tick inputs to the ladder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteInputs {
    pub mid: f64,
    pub predicted_delta: f64,
    pub confidence: f64,
    pub position: f64,
    pub widen: bool,
}

/// Builds the symmetric multi-level ladder around a skewed mid
#[derive(Debug, Clone, Default)]
pub struct QuoteBuilder {
    config: QuoteConfig,
}

impl QuoteBuilder {
    pub fn new(config: QuoteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    /// Level-0 spread in bps: base plus prediction add-on plus widening
    pub fn spread_bps(&self, mid: f64, predicted_delta: f64, widen: bool) -> f64 {
        let dynamic_adj = if mid > 0.0 {
            clamp(predicted_delta.abs() / mid * 10_000.0, 0.0, MAX_DYNAMIC_ADJ_BPS)
        } else {
            0.0
        };
        let widen_bps = if widen { WIDEN_BPS } else { 0.0 };
        self.config.base_spread_bps + dynamic_adj + widen_bps
    }

    /// Fractional shift of the quoting mid; long inventory quotes lower
    pub fn skew(&self, position: f64, mid: f64) -> f64 {
        clamp(
            position * mid / self.config.notional_cap,
            -MAX_SKEW,
            MAX_SKEW,
        )
    }

    /// Full-spread offset of `level` in bps
    pub fn level_offset_bps(spread_bps: f64, level: usize) -> f64 {
        spread_bps * (1.0 + level as f64 * LEVEL_SPREAD_STEP)
    }

    /// Bid and ask sizes for `level`.
    ///
    /// The side the prediction favours to be hit gets more size, the other
    /// side less. With a flat prediction both sides take the smaller branch.
    pub fn level_sizes(&self, level: usize, predicted_delta: f64, confidence: f64) -> (f64, f64) {
        let size_bias = ((confidence - 0.5) * 2.0).abs();
        let base_size = self.config.max_size_per_level * (1.0 - level as f64 * LEVEL_SIZE_DECAY);

        let bid = if predicted_delta < 0.0 {
            base_size * (1.0 + size_bias)
        } else {
            base_size * (1.0 - size_bias)
        };
        let ask = if predicted_delta > 0.0 {
            base_size * (1.0 + size_bias)
        } else {
            base_size * (1.0 - size_bias)
        };

        (self.clamp_size(bid), self.clamp_size(ask))
    }

    fn clamp_size(&self, size: f64) -> f64 {
        clamp(
            size,
            self.config.min_size_per_level,
            self.config.max_size_per_level,
        )
        .round()
    }

    pub fn build(&self, market: Market, inputs: &QuoteInputs) -> OrderBookSnapshot {
        let spread_bps = self.spread_bps(inputs.mid, inputs.predicted_delta, inputs.widen);
        let skewed_mid = inputs.mid * (1.0 - self.skew(inputs.position, inputs.mid));

        let mut book = OrderBookSnapshot {
            bids: Vec::with_capacity(self.config.levels),
            asks: Vec::with_capacity(self.config.levels),
        };

        for level in 0..self.config.levels {
            let half_offset = Self::level_offset_bps(spread_bps, level) / 20_000.0;
            let (bid_size, ask_size) =
                self.level_sizes(level, inputs.predicted_delta, inputs.confidence);

            book.bids.push(QuoteLevel {
                price: market.round_price(skewed_mid * (1.0 - half_offset)),
                size: bid_size,
            });
            book.asks.push(QuoteLevel {
                price: market.round_price(skewed_mid * (1.0 + half_offset)),
                size: ask_size,
            });
        }

        book
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_inputs(mid: f64) -> QuoteInputs {
        QuoteInputs {
            mid,
            predicted_delta: 0.0,
            confidence: 0.55,
            position: 0.0,
            widen: false,
        }
    }

    #[test]
    fn test_sei_flat_scenario() {
        let builder = QuoteBuilder::default();
        let inputs = flat_inputs(0.04);

        assert!((builder.spread_bps(0.04, 0.0, false) - 10.0).abs() < 1e-12);
        assert_eq!(builder.skew(0.0, 0.04), 0.0);

        let book = builder.build(Market::SeiUsdc, &inputs);
        assert_eq!(book.bids.len(), 3);
        assert_eq!(book.asks.len(), 3);

        // ±5 bps of 0.04 rounds back onto the 0.0001 grid at 0.0400
        let bid = book.best_bid().unwrap();
        let ask = book.best_ask().unwrap();
        assert!((bid.price - 0.04).abs() < 1e-12);
        assert!((ask.price - 0.04).abs() < 1e-12);
        assert_eq!(bid.size, 450.0);
        assert_eq!(ask.size, 450.0);
    }

    #[test]
    fn test_weth_flat_scenario() {
        let builder = QuoteBuilder::default();
        let book = builder.build(Market::WethUsdc, &flat_inputs(3200.0));

        assert!((book.bids[0].price - 3198.4).abs() < 1e-9);
        assert!((book.asks[0].price - 3201.6).abs() < 1e-9);
        // Level 1: 16 bps full spread
        assert!((book.bids[1].price - 3197.4).abs() < 1e-9);
        assert!((book.asks[1].price - 3202.6).abs() < 1e-9);
    }

    #[test]
    fn test_levels_widen_monotonically() {
        let builder = QuoteBuilder::default();
        let book = builder.build(Market::WethUsdc, &flat_inputs(3200.0));
        for pair in book.bids.windows(2) {
            assert!(pair[1].price < pair[0].price);
        }
        for pair in book.asks.windows(2) {
            assert!(pair[1].price > pair[0].price);
        }
        for (bid, ask) in book.bids.iter().zip(&book.asks) {
            assert!(bid.price < ask.price);
        }
    }

    #[test]
    fn test_spread_components() {
        let builder = QuoteBuilder::default();
        // 1 bp predicted move
        assert!((builder.spread_bps(3200.0, 0.32, false) - 11.0).abs() < 1e-9);
        // Add-on is capped at 20 bps
        assert!((builder.spread_bps(3200.0, 500.0, false) - 30.0).abs() < 1e-9);
        assert!((builder.spread_bps(3200.0, 500.0, true) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_widen_never_narrows() {
        let builder = QuoteBuilder::default();
        for &delta in &[-0.5, -0.01, 0.0, 0.2, 0.5] {
            let mut inputs = flat_inputs(3200.0);
            inputs.predicted_delta = delta;
            let normal = builder.build(Market::WethUsdc, &inputs);
            inputs.widen = true;
            let wide = builder.build(Market::WethUsdc, &inputs);

            for (n, w) in normal.bids.iter().zip(&wide.bids) {
                assert!(w.price <= n.price);
            }
            for (n, w) in normal.asks.iter().zip(&wide.asks) {
                assert!(w.price >= n.price);
            }
        }
    }

    #[test]
    fn test_skew_is_bounded() {
        let builder = QuoteBuilder::default();
        assert_eq!(builder.skew(1_000_000.0, 3200.0), MAX_SKEW);
        assert_eq!(builder.skew(-1_000_000.0, 3200.0), -MAX_SKEW);
        assert_eq!(builder.skew(0.5, 3200.0), MAX_SKEW);
        assert!((builder.skew(0.01, 3200.0) - 0.016).abs() < 1e-12);

        // Long inventory shifts the whole ladder down
        let flat = builder.build(Market::WethUsdc, &flat_inputs(3200.0));
        let mut long = flat_inputs(3200.0);
        long.position = 10.0;
        let long_book = builder.build(Market::WethUsdc, &long);
        assert!(long_book.bids[0].price < flat.bids[0].price);
        assert!(long_book.asks[0].price < flat.asks[0].price);
    }

    #[test]
    fn test_sizes_are_bounded_integers() {
        let builder = QuoteBuilder::default();
        for &confidence in &[0.0, 0.52, 0.6, 0.64, 1.0] {
            for &delta in &[-1.0, 0.0, 1.0] {
                for level in 0..3 {
                    let (bid, ask) = builder.level_sizes(level, delta, confidence);
                    for size in [bid, ask] {
                        assert!((50.0..=500.0).contains(&size));
                        assert_eq!(size.fract(), 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_prediction_favours_side() {
        let builder = QuoteBuilder::default();
        // Down move expected: buy more at the bid
        let (bid, ask) = builder.level_sizes(1, -0.3, 0.6);
        assert_eq!(bid, 480.0);
        assert_eq!(ask, 320.0);

        let (bid, ask) = builder.level_sizes(1, 0.3, 0.6);
        assert_eq!(bid, 320.0);
        assert_eq!(ask, 480.0);
    }
}
