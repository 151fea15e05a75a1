use flashmm_core::math::clamp;
use flashmm_core::{QuoteLevel, Side, TimestampMS, Trade};
use rand::Rng;

const BASE_HIT_PROBABILITY: f64 = 0.15;
const HIT_BIAS_SLOPE: f64 = 0.05;
const MAX_HIT_PROBABILITY: f64 = 0.5;
const MAX_HIT_BIAS: f64 = 2.5;

/// Filled fraction of the quoted size is uniform in `[FILL_FRACTION_MIN, FILL_FRACTION_MIN + FILL_FRACTION_SPAN)`
const FILL_FRACTION_MIN: f64 = 0.25;
const FILL_FRACTION_SPAN: f64 = 0.5;

/// Inventory change produced by one tick of simulated fills
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillOutcome {
    pub position_delta: f64,
    pub cash_delta: f64,
    /// Bid fill first when both sides trade
    pub trades: Vec<Trade>,
}

impl FillOutcome {
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn count(&self, side: Side) -> usize {
        self.trades.iter().filter(|t| t.side == side).count()
    }

    pub fn volume(&self) -> f64 {
        self.trades.iter().map(|t| t.size).sum()
    }
}

/// Probabilistic top-of-book fill model.
///
/// Each side gets one Bernoulli trial per tick. The base hit probability is
/// raised on the side the predicted move runs towards: a predicted drop makes
/// the bid likelier to be hit, a predicted rise the ask.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillSimulator;

impl FillSimulator {
    pub fn new() -> Self {
        Self
    }

    /// `(p_bid_hit, p_ask_hit)` for a predicted move at `mid`
    pub fn hit_probabilities(predicted_delta: f64, mid: f64) -> (f64, f64) {
        let hit_bias = if mid > 0.0 {
            clamp(predicted_delta / mid * 100.0, -MAX_HIT_BIAS, MAX_HIT_BIAS)
        } else {
            0.0
        };

        let bid_boost = if hit_bias < 0.0 { hit_bias.abs() * HIT_BIAS_SLOPE } else { 0.0 };
        let ask_boost = if hit_bias > 0.0 { hit_bias.abs() * HIT_BIAS_SLOPE } else { 0.0 };

        (
            clamp(BASE_HIT_PROBABILITY + bid_boost, 0.0, MAX_HIT_PROBABILITY),
            clamp(BASE_HIT_PROBABILITY + ask_boost, 0.0, MAX_HIT_PROBABILITY),
        )
    }

    pub fn simulate<R: Rng + ?Sized>(
        &self,
        predicted_delta: f64,
        mid: f64,
        best_bid: Option<&QuoteLevel>,
        best_ask: Option<&QuoteLevel>,
        now: TimestampMS,
        rng: &mut R,
    ) -> FillOutcome {
        let (p_bid, p_ask) = Self::hit_probabilities(predicted_delta, mid);
        let mut outcome = FillOutcome::default();

        if let Some(bid) = best_bid {
            if rng.gen::<f64>() < p_bid {
                let size = fill_size(bid.size, rng);
                outcome.position_delta += size;
                outcome.cash_delta -= size * bid.price;
                outcome.trades.push(Trade {
                    timestamp: now,
                    side: Side::Bid,
                    price: bid.price,
                    size,
                });
            }
        }

        if let Some(ask) = best_ask {
            if rng.gen::<f64>() < p_ask {
                let size = fill_size(ask.size, rng);
                outcome.position_delta -= size;
                outcome.cash_delta += size * ask.price;
                outcome.trades.push(Trade {
                    timestamp: now,
                    side: Side::Ask,
                    price: ask.price,
                    size,
                });
            }
        }

        outcome
    }
}

fn fill_size<R: Rng + ?Sized>(quoted: f64, rng: &mut R) -> f64 {
    let fraction = FILL_FRACTION_MIN + rng.gen::<f64>() * FILL_FRACTION_SPAN;
    (quoted * fraction).round()
}
