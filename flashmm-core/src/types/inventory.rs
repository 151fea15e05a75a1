use serde::{Deserialize, Serialize};

/// Signed base-asset position and quote-asset cash accumulated from fills
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryState {
    pub position: f64,
    pub cash: f64,
}

impl InventoryState {
    pub fn apply(&mut self, position_delta: f64, cash_delta: f64) {
        self.position += position_delta;
        self.cash += cash_delta;
    }

    /// Absolute value of the position at `mid`
    pub fn notional(&self, mid: f64) -> f64 {
        (self.position * mid).abs()
    }

    /// Cash plus position marked at `mid`
    pub fn mark_to_market(&self, mid: f64) -> f64 {
        self.cash + self.position * mid
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_and_mark() {
        let mut inv = InventoryState::default();
        inv.apply(300.0, -300.0 * 0.0399);
        inv.apply(-100.0, 100.0 * 0.0401);

        assert_eq!(inv.position, 200.0);
        assert!((inv.mark_to_market(0.04) - (-11.97 + 4.01 + 8.0)).abs() < 1e-9);
        assert!((inv.notional(0.04) - 8.0).abs() < 1e-12);

        inv.reset();
        assert_eq!(inv, InventoryState::default());
    }
}
