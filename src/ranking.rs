//! Top-performer tables and the low-performer watch list.

use std::cmp::Ordering;

use crate::metrics::EnrichedWorker;

pub const DEFAULT_TOP_N: usize = 10;

/// Quantile below which a worker's tonnage improvement counts as low.
pub const LOW_PERFORMER_QUANTILE: f64 = 0.25;

/// The `n` workers with the largest value of `key`, largest first.
///
/// Rows where `key` is `None` or NaN are skipped. Ties keep input order.
pub fn top_by<F>(workers: &[EnrichedWorker], n: usize, key: F) -> Vec<&EnrichedWorker>
where
    F: Fn(&EnrichedWorker) -> Option<f64>,
{
    let mut ranked: Vec<(f64, &EnrichedWorker)> = workers
        .iter()
        .filter_map(|w| key(w).filter(|v| !v.is_nan()).map(|v| (v, w)))
        .collect();
    // Stable sort keeps the earlier row first among equal values.
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    ranked.into_iter().take(n).map(|(_, w)| w).collect()
}

pub fn top_by_tonnage_improvement(workers: &[EnrichedWorker], n: usize) -> Vec<&EnrichedWorker> {
    top_by(workers, n, |w| w.metrics.tonnage_improvement_pct)
}

pub fn top_by_quality(workers: &[EnrichedWorker], n: usize) -> Vec<&EnrichedWorker> {
    top_by(workers, n, |w| Some(w.metrics.quality_score_after))
}

/// Linear-interpolation quantile of `values`, ignoring NaN. `None` when no
/// values remain.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Workers whose tonnage improvement is strictly below the first quartile.
pub fn low_performers(workers: &[EnrichedWorker]) -> Vec<&EnrichedWorker> {
    let improvements: Vec<f64> = workers
        .iter()
        .filter_map(|w| w.metrics.tonnage_improvement_pct)
        .collect();
    let Some(cutoff) = quantile(&improvements, LOW_PERFORMER_QUANTILE) else {
        return Vec::new();
    };
    workers
        .iter()
        .filter(|w| {
            w.metrics
                .tonnage_improvement_pct
                .is_some_and(|pct| pct < cutoff)
        })
        .collect()
}
