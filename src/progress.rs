// Weighted completion across difficulty tiers.

use crate::luogu::{TIER_COUNT, TierCounts};

/// Divisor that maps the weight sum onto 100%.
pub const WEIGHT_NORMALIZER: f64 = 150.0;

/// Weight of each tier: 10 for unrated problems, `i^2` otherwise.
pub fn tier_weights() -> [f64; TIER_COUNT] {
    let mut weights = [0.0; TIER_COUNT];
    for (i, w) in weights.iter_mut().enumerate() {
        *w = if i == 0 { 10.0 } else { (i * i) as f64 };
    }
    weights
}

/// Weighted share of all problems passed, as a percentage.
///
/// Tiers with no known problems contribute nothing.
pub fn weighted_percentage(passed: &TierCounts, totals: &TierCounts) -> f64 {
    let weighted: f64 = tier_weights()
        .iter()
        .zip(passed.iter().zip(totals))
        .filter(|(_, (_, total))| **total > 0)
        .map(|(weight, (passed, total))| f64::from(*passed) / f64::from(*total) * weight)
        .sum();

    weighted / WEIGHT_NORMALIZER * 100.0
}
