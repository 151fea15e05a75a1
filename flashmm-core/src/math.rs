//! Small numeric helpers shared by the simulation components.

/// Clamp `x` into `[lo, hi]`
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(x))
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around `mu`, 0.0 for fewer than two samples
pub fn population_stddev(values: &[f64], mu: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|x| (x - mu) * (x - mu)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Round to the nearest multiple of `step`
pub fn round_to_step(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}
