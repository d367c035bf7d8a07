use std::collections::{BTreeMap, HashMap};

use crate::metrics::EnrichedWorker;
use crate::record::{CertificationLevel, Measurements};

/// FFB farm-gate price used for revenue impact, currency units per kg.
pub const FFB_PRICE_PER_KG: f64 = 2800.0;

const KG_PER_TON: f64 = 1000.0;
const MILLION: f64 = 1_000_000.0;

/// Production and quality totals for one estate.
#[derive(Debug, Clone, PartialEq)]
pub struct EstateAggregate {
    pub estate: String,
    pub worker_count: usize,
    pub production_before_ton: f64,
    pub production_after_ton: f64,
    pub production_delta_ton: f64,
    /// Production delta valued at [`FFB_PRICE_PER_KG`], in millions.
    pub revenue_impact_million: f64,
    pub avg_quality_before: f64,
    pub avg_quality_after: f64,
}

#[derive(Default)]
struct EstateAccumulator {
    workers: usize,
    production_before_kg: f64,
    production_after_kg: f64,
    quality_before: f64,
    quality_after: f64,
}

impl EstateAccumulator {
    fn push(&mut self, w: &EnrichedWorker) {
        self.workers += 1;
        self.production_before_kg += w.record.before.production_kg();
        self.production_after_kg += w.record.after.production_kg();
        self.quality_before += w.metrics.quality_score_before;
        self.quality_after += w.metrics.quality_score_after;
    }

    fn finish(self, estate: String) -> EstateAggregate {
        // Groups are only created on their first row, so `workers` >= 1.
        let n = self.workers as f64;
        let delta_kg = self.production_after_kg - self.production_before_kg;
        EstateAggregate {
            estate,
            worker_count: self.workers,
            production_before_ton: self.production_before_kg / KG_PER_TON,
            production_after_ton: self.production_after_kg / KG_PER_TON,
            production_delta_ton: delta_kg / KG_PER_TON,
            revenue_impact_million: delta_kg * FFB_PRICE_PER_KG / MILLION,
            avg_quality_before: self.quality_before / n,
            avg_quality_after: self.quality_after / n,
        }
    }
}

/// Group workers by estate.
///
/// Output rows follow the order in which each estate first appears in
/// `workers`. Estates without rows are absent; empty input gives an empty
/// result.
pub fn aggregate_by_estate(workers: &[EnrichedWorker]) -> Vec<EstateAggregate> {
    let mut order: Vec<(String, EstateAccumulator)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for w in workers {
        let slot = *index.entry(w.record.estate.as_str()).or_insert_with(|| {
            order.push((w.record.estate.clone(), EstateAccumulator::default()));
            order.len() - 1
        });
        order[slot].1.push(w);
    }

    let result: Vec<EstateAggregate> = order
        .into_iter()
        .map(|(estate, acc)| acc.finish(estate))
        .collect();
    tracing::debug!(
        workers = workers.len(),
        estates = result.len(),
        "aggregated by estate"
    );
    result
}

/// Estate with the highest revenue impact; the first one wins a tie.
pub fn best_estate(estates: &[EstateAggregate]) -> Option<&EstateAggregate> {
    estates.iter().fold(None, |best, e| match best {
        Some(b) if b.revenue_impact_million >= e.revenue_impact_million => Some(b),
        _ => Some(e),
    })
}

// ── Dashboard summary ───────────────────────────────────────────────────────

/// Headline figures for the summary cards. Means are `None` for an empty
/// selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub worker_count: usize,
    pub avg_tonnage_before: Option<f64>,
    pub avg_tonnage_after: Option<f64>,
    /// Relative change between the two tonnage means, in percent.
    pub avg_tonnage_change_pct: Option<f64>,
    pub avg_quality_before: Option<f64>,
    pub avg_quality_after: Option<f64>,
    pub avg_quality_change: Option<f64>,
    pub total_revenue_impact_million: f64,
    pub avg_income_before: Option<f64>,
    pub avg_income_after: Option<f64>,
    pub avg_income_change: Option<f64>,
    /// Mean of the per-worker tonnage improvements that are defined.
    pub avg_tonnage_improvement_pct: Option<f64>,
    /// Drop of the mean loose-fruit loss, in percentage points.
    pub avg_loss_reduction_pct: Option<f64>,
}

pub fn summarize(workers: &[EnrichedWorker], estates: &[EstateAggregate]) -> DashboardSummary {
    let avg_tonnage_before = mean(workers.iter().map(|w| w.record.before.tonnage_kg));
    let avg_tonnage_after = mean(workers.iter().map(|w| w.record.after.tonnage_kg));
    let avg_quality_before = mean(workers.iter().map(|w| w.metrics.quality_score_before));
    let avg_quality_after = mean(workers.iter().map(|w| w.metrics.quality_score_after));
    let avg_income_before = mean(workers.iter().map(|w| w.metrics.income_before));
    let avg_income_after = mean(workers.iter().map(|w| w.metrics.income_after));
    let avg_loss_before = mean(workers.iter().map(|w| w.record.before.loose_loss_pct));
    let avg_loss_after = mean(workers.iter().map(|w| w.record.after.loose_loss_pct));

    DashboardSummary {
        worker_count: workers.len(),
        avg_tonnage_before,
        avg_tonnage_after,
        avg_tonnage_change_pct: avg_tonnage_before
            .zip(avg_tonnage_after)
            .and_then(|(b, a)| crate::metrics::tonnage_improvement_pct(b, a)),
        avg_quality_before,
        avg_quality_after,
        avg_quality_change: difference(avg_quality_after, avg_quality_before),
        total_revenue_impact_million: estates.iter().map(|e| e.revenue_impact_million).sum(),
        avg_income_before,
        avg_income_after,
        avg_income_change: difference(avg_income_after, avg_income_before),
        avg_tonnage_improvement_pct: mean(
            workers
                .iter()
                .filter_map(|w| w.metrics.tonnage_improvement_pct),
        ),
        avg_loss_reduction_pct: difference(avg_loss_before, avg_loss_after),
    }
}

// ── Defect breakdown ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect {
    LooseFruitLoss,
    Unripe,
    Rotten,
    LongStalk,
}

impl Defect {
    pub const ALL: [Defect; 4] = [
        Self::LooseFruitLoss,
        Self::Unripe,
        Self::Rotten,
        Self::LongStalk,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::LooseFruitLoss => "Brondolan Loss",
            Self::Unripe => "Buah Mentah",
            Self::Rotten => "Buah Busuk",
            Self::LongStalk => "Gagang Panjang",
        }
    }

    pub fn rate(self, m: &Measurements) -> f64 {
        match self {
            Self::LooseFruitLoss => m.loose_loss_pct,
            Self::Unripe => m.unripe_pct,
            Self::Rotten => m.rotten_pct,
            Self::LongStalk => m.long_stalk_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefectComparison {
    pub defect: Defect,
    pub avg_before: f64,
    pub avg_after: f64,
    /// `avg_before - avg_after`, in percentage points.
    pub reduction: f64,
    /// Reduction relative to `avg_before`, percent with one decimal.
    /// NaN when `avg_before` is zero.
    pub reduction_pct: f64,
}

/// Mean defect rates before and after certification. Empty input gives an
/// empty breakdown.
pub fn defect_breakdown(workers: &[EnrichedWorker]) -> Vec<DefectComparison> {
    Defect::ALL
        .into_iter()
        .filter_map(|defect| {
            let avg_before = mean(workers.iter().map(|w| defect.rate(&w.record.before)))?;
            let avg_after = mean(workers.iter().map(|w| defect.rate(&w.record.after)))?;
            let reduction = avg_before - avg_after;
            let reduction_pct = if avg_before == 0.0 {
                f64::NAN
            } else {
                crate::metrics::round_half_even(reduction / avg_before * 100.0, 1)
            };
            Some(DefectComparison {
                defect,
                avg_before,
                avg_after,
                reduction,
                reduction_pct,
            })
        })
        .collect()
}

// ── Financial views ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LevelIncome {
    pub level: CertificationLevel,
    pub workers: usize,
    pub avg_income_improvement: f64,
}

/// Mean income improvement per certification level, ordered by level.
pub fn income_by_certification(workers: &[EnrichedWorker]) -> Vec<LevelIncome> {
    let mut groups: BTreeMap<CertificationLevel, (usize, f64)> = BTreeMap::new();
    for w in workers {
        let entry = groups.entry(w.record.certification_level).or_default();
        entry.0 += 1;
        entry.1 += w.metrics.income_improvement;
    }
    groups
        .into_iter()
        .map(|(level, (count, total))| LevelIncome {
            level,
            workers: count,
            avg_income_improvement: total / count as f64,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinancialBreakdown {
    /// Mean daily base wage times mean days worked after certification.
    pub avg_monthly_base_wage: Option<f64>,
    pub avg_premium_before: Option<f64>,
    pub avg_premium_after: Option<f64>,
    pub total_income_improvement: f64,
}

pub fn financial_breakdown(workers: &[EnrichedWorker]) -> FinancialBreakdown {
    let premium = |m: &Measurements, w: &EnrichedWorker| {
        m.tonnage_kg * f64::from(w.record.compensation.premium_per_kg) * f64::from(m.days_worked)
    };
    let avg_wage = mean(workers.iter().map(|w| f64::from(w.record.compensation.base_wage)));
    let avg_days_after = mean(workers.iter().map(|w| f64::from(w.record.after.days_worked)));

    FinancialBreakdown {
        avg_monthly_base_wage: avg_wage.zip(avg_days_after).map(|(wage, days)| wage * days),
        avg_premium_before: mean(workers.iter().map(|w| premium(&w.record.before, w))),
        avg_premium_after: mean(workers.iter().map(|w| premium(&w.record.after, w))),
        total_income_improvement: workers.iter().map(|w| w.metrics.income_improvement).sum(),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

pub(crate) fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (count, total) = values
        .into_iter()
        .fold((0usize, 0.0), |(n, sum), v| (n + 1, sum + v));
    (count > 0).then(|| total / count as f64)
}

fn difference(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    a.zip(b).map(|(a, b)| a - b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::enrich;
    use crate::record::tests::sample_record;
    use crate::record::WorkerTable;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn production_sums_tonnage_times_days() {
        let a = sample_record("A", "X");
        let mut b = sample_record("B", "X");
        b.before.tonnage_kg = 500.0;
        b.before.days_worked = 20;
        let rows = enrich(&WorkerTable::new(vec![a, b]));

        let estates = aggregate_by_estate(&rows);
        assert_eq!(estates.len(), 1);
        assert_eq!(estates[0].worker_count, 2);
        assert!(approx(estates[0].production_before_ton, 35.0));
        // after: 2 * 1050 * 25 = 52.5 t, delta 17.5 t
        assert!(approx(estates[0].production_delta_ton, 17.5));
        assert!(approx(estates[0].revenue_impact_million, 49.0));
    }

    #[test]
    fn estates_follow_first_appearance() {
        let rows = enrich(&WorkerTable::new(vec![
            sample_record("1", "Estate C"),
            sample_record("2", "Estate A"),
            sample_record("3", "Estate C"),
            sample_record("4", "Estate B"),
        ]));
        let names: Vec<_> = aggregate_by_estate(&rows)
            .into_iter()
            .map(|e| e.estate)
            .collect();
        assert_eq!(names, ["Estate C", "Estate A", "Estate B"]);
    }

    #[test]
    fn quality_is_averaged_per_estate() {
        let a = sample_record("A", "X");
        let mut b = sample_record("B", "X");
        b.after.long_stalk_pct = 10.2; // score 48.3
        let rows = enrich(&WorkerTable::new(vec![a, b]));
        let estates = aggregate_by_estate(&rows);
        assert!(approx(estates[0].avg_quality_after, (58.3 + 48.3) / 2.0));
    }

    #[test]
    fn empty_input_degrades_gracefully() {
        assert!(aggregate_by_estate(&[]).is_empty());
        assert!(best_estate(&[]).is_none());
        assert!(defect_breakdown(&[]).is_empty());
        assert!(income_by_certification(&[]).is_empty());

        let summary = summarize(&[], &[]);
        assert_eq!(summary.worker_count, 0);
        assert_eq!(summary.avg_tonnage_after, None);
        assert_eq!(summary.total_revenue_impact_million, 0.0);

        let finance = financial_breakdown(&[]);
        assert_eq!(finance.avg_monthly_base_wage, None);
        assert_eq!(finance.total_income_improvement, 0.0);
    }

    #[test]
    fn best_estate_prefers_first_on_tie() {
        let rows = enrich(&WorkerTable::new(vec![
            sample_record("1", "P"),
            sample_record("2", "Q"),
        ]));
        let estates = aggregate_by_estate(&rows);
        assert_eq!(best_estate(&estates).unwrap().estate, "P");
    }

    #[test]
    fn summary_of_sample_rows() {
        let rows = enrich(&WorkerTable::new(vec![
            sample_record("1", "P"),
            sample_record("2", "Q"),
        ]));
        let estates = aggregate_by_estate(&rows);
        let summary = summarize(&rows, &estates);
        assert_eq!(summary.worker_count, 2);
        assert_eq!(summary.avg_tonnage_after, Some(1050.0));
        assert!(approx(summary.avg_tonnage_change_pct.unwrap(), 5.0));
        assert!(approx(summary.avg_income_change.unwrap(), 218_750.0));
        assert!(approx(summary.avg_loss_reduction_pct.unwrap(), 4.3));
        assert!(approx(summary.total_revenue_impact_million, 2.0 * 3.5));
    }

    #[test]
    fn defect_breakdown_reports_all_four() {
        let rows = enrich(&WorkerTable::new(vec![sample_record("1", "P")]));
        let breakdown = defect_breakdown(&rows);
        let labels: Vec<_> = breakdown.iter().map(|d| d.defect.label()).collect();
        assert_eq!(
            labels,
            ["Brondolan Loss", "Buah Mentah", "Buah Busuk", "Gagang Panjang"]
        );
        // rotten: 4.2 -> 1.5, reduction 2.7 = 64.3%
        assert_eq!(breakdown[2].reduction_pct, 64.3);
    }

    #[test]
    fn income_grouped_by_level_in_level_order() {
        let mut advanced = sample_record("1", "P");
        advanced.certification_level = CertificationLevel::Advanced;
        let basic = sample_record("2", "P");
        let rows = enrich(&WorkerTable::new(vec![advanced, basic]));
        let levels: Vec<_> = income_by_certification(&rows)
            .into_iter()
            .map(|l| l.level)
            .collect();
        assert_eq!(
            levels,
            [CertificationLevel::Basic, CertificationLevel::Advanced]
        );
    }

    #[test]
    fn financial_breakdown_of_sample_row() {
        let rows = enrich(&WorkerTable::new(vec![sample_record("1", "P")]));
        let finance = financial_breakdown(&rows);
        assert_eq!(finance.avg_monthly_base_wage, Some(2_250_000.0));
        assert_eq!(finance.avg_premium_before, Some(4_375_000.0));
        assert_eq!(finance.avg_premium_after, Some(4_593_750.0));
        assert_eq!(finance.total_income_improvement, 218_750.0);
    }
}
