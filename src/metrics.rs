//! Row-wise derived metrics.
//!
//! Every derived value is a pure function of a single worker's raw fields;
//! no metric looks at any other row.

use crate::record::{Compensation, Measurements, WorkerRecord, WorkerTable};

/// Defect weights of the quality score: loose-fruit loss, unripe, rotten,
/// long stalk.
pub const DEFECT_WEIGHTS: [f64; 4] = [3.0, 4.0, 5.0, 2.0];

/// Improvement and quality figures computed for one worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    /// Relative tonnage change in percent. `None` when tonnage before is zero.
    pub tonnage_improvement_pct: Option<f64>,
    pub tree_improvement: i64,
    /// Loose-fruit loss reduction in percentage points.
    pub loss_reduction_pct: f64,
    pub quality_score_before: f64,
    pub quality_score_after: f64,
    pub income_before: f64,
    pub income_after: f64,
    pub income_improvement: f64,
}

/// A worker row together with its derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedWorker {
    pub record: WorkerRecord,
    pub metrics: DerivedMetrics,
}

impl EnrichedWorker {
    pub fn new(record: WorkerRecord) -> Self {
        let metrics = derive_metrics(&record);
        Self { record, metrics }
    }
}

/// Round to `decimals` places, ties to even (numpy-compatible).
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// `(after - before) / before * 100`, undefined for a zero baseline.
pub fn tonnage_improvement_pct(before_kg: f64, after_kg: f64) -> Option<f64> {
    if before_kg == 0.0 {
        return None;
    }
    Some((after_kg - before_kg) / before_kg * 100.0)
}

/// `100 - weighted defect sum`. Not clamped; extreme defect rates may push
/// the score below zero.
pub fn quality_score(m: &Measurements) -> f64 {
    let penalty: f64 = m
        .defect_rates()
        .iter()
        .zip(DEFECT_WEIGHTS)
        .map(|(pct, weight)| pct * weight)
        .sum();
    100.0 - penalty
}

/// Base wage plus tonnage premium over the days worked.
pub fn earned_income(m: &Measurements, pay: &Compensation) -> f64 {
    let days = f64::from(m.days_worked);
    f64::from(pay.base_wage) * days + m.tonnage_kg * f64::from(pay.premium_per_kg) * days
}

/// Compute all derived fields of one row.
pub fn derive_metrics(record: &WorkerRecord) -> DerivedMetrics {
    let before = &record.before;
    let after = &record.after;

    let income_before = round_half_even(earned_income(before, &record.compensation), 0);
    let income_after = round_half_even(earned_income(after, &record.compensation), 0);

    DerivedMetrics {
        tonnage_improvement_pct: tonnage_improvement_pct(before.tonnage_kg, after.tonnage_kg)
            .map(|pct| round_half_even(pct, 2)),
        tree_improvement: i64::from(after.trees) - i64::from(before.trees),
        loss_reduction_pct: round_half_even(before.loose_loss_pct - after.loose_loss_pct, 2),
        quality_score_before: round_half_even(quality_score(before), 1),
        quality_score_after: round_half_even(quality_score(after), 1),
        income_before,
        income_after,
        income_improvement: round_half_even(income_after - income_before, 0),
    }
}

/// Attach derived metrics to every row of `table`, preserving order.
pub fn enrich(table: &WorkerTable) -> Vec<EnrichedWorker> {
    let enriched: Vec<EnrichedWorker> = table.iter().cloned().map(EnrichedWorker::new).collect();

    let undefined = enriched
        .iter()
        .filter(|w| w.metrics.tonnage_improvement_pct.is_none())
        .count();
    if undefined > 0 {
        tracing::warn!(
            rows = undefined,
            "tonnage before is zero; tonnage improvement left undefined"
        );
    }
    tracing::debug!(rows = enriched.len(), "enriched worker table");
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_record;

    #[test]
    fn quality_score_matches_weighted_formula() {
        let record = sample_record("HRV0001", "X");
        // 100 - (4.2*3 + 2.8*4 + 1.5*5 + 5.2*2) = 58.3
        assert_eq!(round_half_even(quality_score(&record.after), 1), 58.3);
    }

    #[test]
    fn quality_score_is_not_clamped() {
        let mut record = sample_record("HRV0001", "X");
        record.before.long_stalk_pct = 60.0;
        assert!(quality_score(&record.before) < 0.0);
    }

    #[test]
    fn income_combines_wage_and_premium() {
        let record = sample_record("HRV0001", "X");
        assert_eq!(
            earned_income(&record.after, &record.compensation),
            6_843_750.0
        );
    }

    #[test]
    fn derived_fields_for_sample_row() {
        let metrics = derive_metrics(&sample_record("HRV0001", "X"));
        assert_eq!(metrics.tonnage_improvement_pct, Some(5.0));
        assert_eq!(metrics.tree_improvement, 15);
        assert_eq!(metrics.loss_reduction_pct, 4.3);
        assert_eq!(metrics.income_before, 6_625_000.0);
        assert_eq!(metrics.income_improvement, 218_750.0);
    }

    #[test]
    fn tree_improvement_may_be_negative() {
        let mut record = sample_record("HRV0001", "X");
        record.after.trees = 40;
        assert_eq!(derive_metrics(&record).tree_improvement, -10);
    }

    #[test]
    fn zero_baseline_leaves_improvement_undefined() {
        let mut record = sample_record("HRV0001", "X");
        record.before.tonnage_kg = 0.0;
        let enriched = enrich(&WorkerTable::new(vec![record]));
        assert_eq!(enriched[0].metrics.tonnage_improvement_pct, None);
        assert!(enriched[0].metrics.income_before.is_finite());
    }

    #[test]
    fn rounding_ties_go_to_even() {
        assert_eq!(round_half_even(2.5, 0), 2.0);
        assert_eq!(round_half_even(3.5, 0), 4.0);
        assert_eq!(round_half_even(-1.25, 1), -1.2);
    }

    #[test]
    fn enrich_preserves_row_order() {
        let table = WorkerTable::new(vec![
            sample_record("B", "X"),
            sample_record("A", "Y"),
        ]);
        let ids: Vec<_> = enrich(&table)
            .into_iter()
            .map(|w| w.record.worker_id)
            .collect();
        assert_eq!(ids, ["B", "A"]);
    }
}
