//! Small statistics helpers shared by the analytics crates.
//!
//! Conventions: standard deviation and variance are sample estimates
//! (divisor n - 1) unless the name says otherwise, and degenerate inputs
//! produce 0.0 instead of NaN so callers can apply their own sentinel policy.

use statrs::statistics::Statistics;

/// Mean of a data slice, 0.0 when empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().mean()
}

/// Sample variance. Returns 0.0 for fewer than 2 observations.
pub fn variance(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    data.iter().variance()
}

/// Sample standard deviation. Returns 0.0 for fewer than 2 observations.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    data.iter().std_dev()
}

/// Population standard deviation (divisor n), used for feature scaling.
pub fn population_std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().population_std_dev()
}

/// Sample covariance of two equally long slices.
/// Returns 0.0 when the lengths differ or fewer than 2 pairs exist.
pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }
    x.iter().covariance(y.iter())
}

/// True when `dispersion` is indistinguishable from zero next to `level`.
///
/// Constant-growth inputs leave a few ulps of rounding residue in a computed
/// standard deviation, so an exact `== 0.0` test misses them.
pub fn is_negligible(dispersion: f64, level: f64) -> bool {
    dispersion.abs() <= 1e-12 * level.abs().max(1e-12)
}

/// Percentile (0-100 scale) with linear interpolation between the closest ranks.
pub fn percentile(data: &[f64], pct: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}
