use flashmm_core::Market;
use rand::Rng;

/// Lowest mid-price the walk can produce
pub const PRICE_FLOOR: f64 = 0.0001;

/// Uniform sample in (0, 1); zero is redrawn so the log stays finite
fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let u: f64 = rng.gen();
        if u > 0.0 {
            return u;
        }
    }
}

/// Standard normal sample via the Box-Muller transform
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u = open_unit(rng);
    let v = open_unit(rng);
    (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
}

/// Apply multiplicative noise to the previous mid, floored at [`PRICE_FLOOR`]
pub fn apply_noise(previous_mid: f64, noise: f64) -> f64 {
    (previous_mid * (1.0 + noise)).max(PRICE_FLOOR)
}

/// Next mid of a zero-drift multiplicative random walk
pub fn next_mid<R: Rng + ?Sized>(previous_mid: f64, market: Market, rng: &mut R) -> f64 {
    let noise = standard_normal(rng) * market.profile().volatility;
    apply_noise(previous_mid, noise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_floor_never_violated() {
        for &mid in &[PRICE_FLOOR, 0.04, 3200.0] {
            for &noise in &[-5.0, -1.0, -0.999_999, 0.0, 0.5] {
                assert!(apply_noise(mid, noise) >= PRICE_FLOOR);
            }
        }

        // wETH volatility is large enough to hit the floor regularly
        let mut rng = StdRng::seed_from_u64(7);
        let mut mid = Market::WethUsdc.profile().seed_mid;
        for _ in 0..2_000 {
            mid = next_mid(mid, Market::WethUsdc, &mut rng);
            assert!(mid >= PRICE_FLOOR);
        }
    }

    #[test]
    fn test_zero_noise_keeps_mid() {
        assert_eq!(apply_noise(0.04, 0.0), 0.04);
    }

    #[test]
    fn test_standard_normal_moments() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;

        assert!(mean.abs() < 0.05, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.05, "variance {}", var);
        assert!(samples.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_sei_walk_stays_near_seed() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut mid = Market::SeiUsdc.profile().seed_mid;
        for _ in 0..100 {
            mid = next_mid(mid, Market::SeiUsdc, &mut rng);
        }
        // 100 steps of 1.5 bps noise cannot move the price by 5%
        assert!((mid / 0.04 - 1.0).abs() < 0.05);
    }
}
