use flashmm_core::math::{mean, population_stddev};
use flashmm_core::Market;
use rand::Rng;
use std::collections::VecDeque;

/// Number of recent returns kept for the z-score
pub const RETURN_WINDOW: usize = 10;

/// Lower bound applied to the return stddev
pub const STDDEV_EPSILON: f64 = 1e-9;

/// Confidence is drawn from `[CONFIDENCE_FLOOR, CONFIDENCE_FLOOR + CONFIDENCE_SPAN)`
pub const CONFIDENCE_FLOOR: f64 = 0.52;
pub const CONFIDENCE_SPAN: f64 = 0.12;

/// Sliding window of the most recent fractional returns
#[derive(Debug, Clone)]
pub struct ReturnWindow {
    returns: VecDeque<f64>,
    capacity: usize,
}

impl ReturnWindow {
    pub fn new() -> Self {
        Self::with_capacity(RETURN_WINDOW)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            returns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a return, evicting the oldest once full
    pub fn push(&mut self, ret: f64) {
        if self.returns.len() == self.capacity {
            self.returns.pop_front();
        }
        self.returns.push_back(ret);
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    pub fn clear(&mut self) {
        self.returns.clear();
    }

    /// Oldest first
    pub fn to_vec(&self) -> Vec<f64> {
        self.returns.iter().copied().collect()
    }

    /// Standard score of `latest` against the window's population stats.
    /// Zero while the window is empty.
    pub fn z_score(&self, latest: f64) -> f64 {
        if self.returns.is_empty() {
            return 0.0;
        }
        let values = self.to_vec();
        let mu = mean(&values);
        let sd = population_stddev(&values, mu).max(STDDEV_EPSILON);
        (latest - mu) / sd
    }
}

impl Default for ReturnWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of one signal step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    /// Mock expected next-tick price change
    pub predicted_delta: f64,
    /// Mock model confidence
    pub confidence: f64,
    /// Fractional move from the previous mid
    pub realized_return: f64,
    /// Standard score of `realized_return` over the window
    pub z_score: f64,
}

/// Produces the mock prediction and tracks realized-return volatility
#[derive(Debug, Clone, Default)]
pub struct SignalEstimator {
    window: ReturnWindow,
}

impl SignalEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a prediction for `market` and fold the realized return from
    /// `previous_mid` to `mid` into the window.
    pub fn estimate<R: Rng + ?Sized>(
        &mut self,
        mid: f64,
        previous_mid: f64,
        market: Market,
        rng: &mut R,
    ) -> Signal {
        let (predicted_delta, confidence) = draw_prediction(market, rng);

        let realized_return = if previous_mid > 0.0 {
            (mid - previous_mid) / previous_mid
        } else {
            0.0
        };
        self.window.push(realized_return);
        let z_score = self.window.z_score(realized_return);

        Signal {
            predicted_delta,
            confidence,
            realized_return,
            z_score,
        }
    }

    pub fn window(&self) -> &ReturnWindow {
        &self.window
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

/// Uniform prediction in `±delta_range / 2` and confidence in `[0.52, 0.64)`
pub fn draw_prediction<R: Rng + ?Sized>(market: Market, rng: &mut R) -> (f64, f64) {
    let u: f64 = rng.gen();
    let predicted_delta = (u - 0.5) * market.profile().delta_range;
    let confidence = CONFIDENCE_FLOOR + rng.gen::<f64>() * CONFIDENCE_SPAN;
    (predicted_delta, confidence)
}
