//! Order statistics and moments over latency slices

/// Sort a copy of `values` ascending (total order, NaN last)
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Percentile `p` in [0, 1] of an ascending slice
///
/// Linear interpolation between the two order statistics bracketing rank
/// `p * (n - 1)` (0-indexed). `None` for an empty slice.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = p.clamp(0.0, 1.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let (lo, hi) = (sorted[lower], sorted[upper]);
    Some(lo + (rank - lower as f64) * (hi - lo))
}

#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation around `mean`
#[must_use]
pub fn population_std_dev(values: &[f64], mean: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Median of absolute deviations from `median`
#[must_use]
pub fn median_absolute_deviation(values: &[f64], median: f64) -> Option<f64> {
    let deviations: Vec<f64> = values.iter().map(|x| (x - median).abs()).collect();
    percentile(&sorted(&deviations), 0.5)
}

/// Mean after dropping `floor(n * fraction)` values from each end of an ascending slice
#[must_use]
pub fn trimmed_mean(sorted: &[f64], fraction: f64) -> Option<f64> {
    let cut = (sorted.len() as f64 * fraction).floor() as usize;
    if cut * 2 >= sorted.len() {
        return mean(sorted);
    }
    mean(&sorted[cut..sorted.len() - cut])
}
