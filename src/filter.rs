use std::collections::HashSet;

use crate::metrics::EnrichedWorker;
use crate::record::CertificationLevel;

/// Row selection driven by the dashboard's filter widgets.
///
/// `None` on a dimension means "no restriction". An empty selection matches
/// nothing, the same as clearing every option of a multiselect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerFilter {
    pub estates: Option<HashSet<String>>,
    pub levels: Option<HashSet<CertificationLevel>>,
    /// Inclusive lower bound on tonnage improvement (%). Rows with an
    /// undefined improvement never pass a threshold.
    pub min_improvement_pct: Option<f64>,
}

impl WorkerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_estates<I, S>(mut self, estates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.estates = Some(estates.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_levels<I>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = CertificationLevel>,
    {
        self.levels = Some(levels.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_min_improvement(mut self, pct: f64) -> Self {
        self.min_improvement_pct = Some(pct);
        self
    }

    pub fn matches(&self, worker: &EnrichedWorker) -> bool {
        if let Some(estates) = &self.estates {
            if !estates.contains(&worker.record.estate) {
                return false;
            }
        }
        if let Some(levels) = &self.levels {
            if !levels.contains(&worker.record.certification_level) {
                return false;
            }
        }
        match (self.min_improvement_pct, worker.metrics.tonnage_improvement_pct) {
            (None, _) => true,
            (Some(min), Some(pct)) => pct >= min,
            (Some(_), None) => false,
        }
    }

    /// Keep matching rows in their original order.
    pub fn apply(&self, workers: &[EnrichedWorker]) -> Vec<EnrichedWorker> {
        let kept: Vec<EnrichedWorker> = workers
            .iter()
            .filter(|w| self.matches(w))
            .cloned()
            .collect();
        tracing::debug!(input = workers.len(), kept = kept.len(), "applied worker filter");
        kept
    }
}

/// Choices offered by the filter widgets for a given table.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    /// Distinct estates in first-appearance order.
    pub estates: Vec<String>,
    /// Distinct certification levels in first-appearance order.
    pub levels: Vec<CertificationLevel>,
    /// Smallest and largest defined tonnage improvement, if any.
    pub improvement_range: Option<(f64, f64)>,
}

pub fn filter_options(workers: &[EnrichedWorker]) -> FilterOptions {
    let mut estates: Vec<String> = Vec::new();
    let mut levels: Vec<CertificationLevel> = Vec::new();
    let mut seen_estates = HashSet::new();
    let mut range: Option<(f64, f64)> = None;

    for w in workers {
        if seen_estates.insert(w.record.estate.as_str()) {
            estates.push(w.record.estate.clone());
        }
        if !levels.contains(&w.record.certification_level) {
            levels.push(w.record.certification_level);
        }
        if let Some(pct) = w.metrics.tonnage_improvement_pct {
            range = Some(match range {
                None => (pct, pct),
                Some((lo, hi)) => (lo.min(pct), hi.max(pct)),
            });
        }
    }

    FilterOptions {
        estates,
        levels,
        improvement_range: range,
    }
}
