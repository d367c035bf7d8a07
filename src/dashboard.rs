//! One pass of the dashboard pipeline over an already loaded table:
//! enrich, filter, aggregate, rank.

use crate::aggregation::{
    aggregate_by_estate, defect_breakdown, financial_breakdown, income_by_certification,
    summarize, DashboardSummary, DefectComparison, EstateAggregate, FinancialBreakdown,
    LevelIncome,
};
use crate::filter::{filter_options, FilterOptions, WorkerFilter};
use crate::metrics::{enrich, EnrichedWorker};
use crate::ranking::{low_performers, top_by_quality, top_by_tonnage_improvement};
use crate::record::WorkerTable;

/// Everything the presentation layer renders for one filter selection.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Filter choices computed from the unfiltered table.
    pub options: FilterOptions,
    pub workers: Vec<EnrichedWorker>,
    pub estates: Vec<EstateAggregate>,
    pub summary: DashboardSummary,
    pub defects: Vec<DefectComparison>,
    pub income_by_level: Vec<LevelIncome>,
    pub financial: FinancialBreakdown,
    pub top_productivity: Vec<EnrichedWorker>,
    pub top_quality: Vec<EnrichedWorker>,
    pub low_performer_count: usize,
}

impl DashboardView {
    pub fn build(table: &WorkerTable, filter: &WorkerFilter, top_n: usize) -> Self {
        let all = enrich(table);
        let options = filter_options(&all);
        let workers = filter.apply(&all);
        let estates = aggregate_by_estate(&workers);
        let summary = summarize(&workers, &estates);

        let top_productivity = top_by_tonnage_improvement(&workers, top_n)
            .into_iter()
            .cloned()
            .collect();
        let top_quality = top_by_quality(&workers, top_n)
            .into_iter()
            .cloned()
            .collect();
        let low_performer_count = low_performers(&workers).len();

        Self {
            options,
            defects: defect_breakdown(&workers),
            income_by_level: income_by_certification(&workers),
            financial: financial_breakdown(&workers),
            estates,
            summary,
            top_productivity,
            top_quality,
            low_performer_count,
            workers,
        }
    }

    /// Estate with the largest revenue impact in the current selection.
    pub fn best_estate(&self) -> Option<&EstateAggregate> {
        crate::aggregation::best_estate(&self.estates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_synthetic;

    #[test]
    fn view_over_empty_selection_is_empty_not_an_error() {
        let table = generate_synthetic(20, 42).unwrap();
        let filter = WorkerFilter::new().with_estates(Vec::<String>::new());
        let view = DashboardView::build(&table, &filter, 10);
        assert!(view.workers.is_empty());
        assert!(view.estates.is_empty());
        assert!(view.top_productivity.is_empty());
        assert!(view.best_estate().is_none());
        assert_eq!(view.summary.worker_count, 0);
        // Options still describe the unfiltered table.
        assert!(!view.options.estates.is_empty());
    }

    #[test]
    fn view_counts_are_consistent() {
        let table = generate_synthetic(50, 42).unwrap();
        let view = DashboardView::build(&table, &WorkerFilter::new(), 10);
        assert_eq!(view.workers.len(), 50);
        let per_estate: usize = view.estates.iter().map(|e| e.worker_count).sum();
        assert_eq!(per_estate, 50);
        assert_eq!(view.top_productivity.len(), 10);
        assert!(view.low_performer_count < 50);
    }
}
