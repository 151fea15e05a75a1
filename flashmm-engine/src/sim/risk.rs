use std::fmt;

/// Inventory and volatility limits
#[derive(Debug, Clone)]
pub struct RiskLimits {
    /// Notional cap in quote currency (USDC)
    pub notional_cap: f64,

    /// Fraction of the cap inventory may reach before quotes widen
    pub band_pct: f64,

    /// Absolute return z-score above which the tick is treated as anomalous
    pub z_threshold: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            notional_cap: 2000.0,
            band_pct: 0.02,
            z_threshold: 5.0,
        }
    }
}

impl RiskLimits {
    /// Inventory notional above which the band is breached
    pub fn band_notional(&self) -> f64 {
        self.notional_cap * self.band_pct
    }
}

/// Result of one risk evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskVerdict {
    pub band_breached: bool,
    pub high_z: bool,
    /// Add the extra widening to this tick's spread
    pub widen: bool,
    /// Latch the kill switch
    pub should_pause: bool,
}

/// Why the kill switch fired
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KillReason {
    ExtremeVolatility { z_score: f64, threshold: f64 },
}

impl fmt::Display for KillReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KillReason::ExtremeVolatility { z_score, threshold } => write!(
                f,
                "extreme volatility: |z|={:.2} > {:.2}",
                z_score.abs(),
                threshold
            ),
        }
    }
}

/// Stateless limit checks; the latch itself lives in the engine
#[derive(Debug, Clone, Default)]
pub struct RiskGovernor {
    limits: RiskLimits,
}

impl RiskGovernor {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    pub fn evaluate(
        &self,
        position: f64,
        mid: f64,
        z_score: f64,
        failsafe_armed: bool,
    ) -> RiskVerdict {
        let inventory_notional = (position * mid).abs();
        let band_breached = inventory_notional > self.limits.band_notional();
        let high_z = z_score.abs() > self.limits.z_threshold;

        RiskVerdict {
            band_breached,
            high_z,
            widen: band_breached || high_z,
            should_pause: high_z && failsafe_armed,
        }
    }

    /// Reason to report when `verdict` latches the kill switch
    pub fn kill_reason(&self, verdict: &RiskVerdict, z_score: f64) -> Option<KillReason> {
        verdict.should_pause.then(|| KillReason::ExtremeVolatility {
            z_score,
            threshold: self.limits.z_threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_inventory_is_quiet() {
        let governor = RiskGovernor::default();
        let verdict = governor.evaluate(0.0, 0.04, 0.3, true);
        assert_eq!(verdict, RiskVerdict::default());
    }

    #[test]
    fn test_band_breach_widens_without_pause() {
        let governor = RiskGovernor::default();
        // 40 USDC band; 1001 * 0.04 = 40.04
        let verdict = governor.evaluate(1001.0, 0.04, 0.0, true);
        assert!(verdict.band_breached);
        assert!(verdict.widen);
        assert!(!verdict.should_pause);

        let short = governor.evaluate(-1001.0, 0.04, 0.0, true);
        assert!(short.band_breached);

        let under_band = governor.evaluate(999.0, 0.04, 0.0, true);
        assert!(!under_band.band_breached);
    }

    #[test]
    fn test_high_z_pauses_only_when_armed() {
        let governor = RiskGovernor::default();

        let armed = governor.evaluate(0.0, 0.04, -6.0, true);
        assert!(armed.high_z && armed.widen && armed.should_pause);
        assert!(matches!(
            governor.kill_reason(&armed, -6.0),
            Some(KillReason::ExtremeVolatility { .. })
        ));

        let unarmed = governor.evaluate(0.0, 0.04, -6.0, false);
        assert!(unarmed.widen);
        assert!(!unarmed.should_pause);
        assert!(governor.kill_reason(&unarmed, -6.0).is_none());
    }

    #[test]
    fn test_kill_reason_display() {
        let reason = KillReason::ExtremeVolatility {
            z_score: -5.5,
            threshold: 5.0,
        };
        assert_eq!(reason.to_string(), "extreme volatility: |z|=5.50 > 5.00");
    }
}
