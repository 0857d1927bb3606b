//! Small numeric helpers shared by the ranking and award code.

use std::cmp::Ordering;

/// Position of the first value `>= value` in the ascending sort, scaled to
/// 0..=1. A value above every sample maps to the last position.
pub fn percentile(value: f64, values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let position = sorted
        .iter()
        .position(|v| *v >= value)
        .unwrap_or(sorted.len() - 1);
    let denom = (sorted.len() - 1).max(1);
    position as f64 / denom as f64
}

/// Even-length inputs average the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// `(n - rank + 1) / n` for a 1-based rank; 1.0 is best.
pub fn rank_fraction(rank: usize, n: usize) -> f64 {
    if n == 0 || rank == 0 {
        return 0.0;
    }
    (n + 1 - rank.min(n)) as f64 / n as f64
}

pub fn ratio(num: f64, denom: f64) -> f64 {
    if denom > 0.0 { num / denom } else { 0.0 }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Descending comparison for scores; NaN sorts last.
pub fn desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
