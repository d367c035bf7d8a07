use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use crate::config::DashboardConfig;
use crate::dashboard::DashboardView;
use crate::error::MetricsError;
use crate::export::{export_filtered, filtered_file_name, today};
use crate::filter::WorkerFilter;
use crate::frame::{
    enriched_to_frame, estates_to_frame, load_csv, load_external, read_csv_bytes, to_csv_string,
    workers_to_frame,
};
use crate::metrics::enrich;
use crate::record::{CertificationLevel, WorkerTable};

/// Dashboard state: the last loaded worker table plus settings.
///
/// Every query recomputes enrichment, filtering and aggregation from the
/// stored raw table.
#[pyclass]
pub struct HarvestDashboard {
    config: DashboardConfig,
    workers: Option<WorkerTable>,
}

#[pymethods]
impl HarvestDashboard {
    #[new]
    #[pyo3(signature = (output_dir=None, top_n=10))]
    fn new(output_dir: Option<String>, top_n: usize) -> Self {
        let mut config = DashboardConfig::default().with_top_n(top_n);
        if let Some(dir) = output_dir {
            config = config.with_output_dir(dir);
        }
        Self {
            config,
            workers: None,
        }
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Replace the table with synthetic workers. Returns the raw table.
    #[pyo3(signature = (count=50, seed=42))]
    fn generate(&mut self, count: usize, seed: u64) -> PyResult<PyDataFrame> {
        self.config = self.config.clone().with_worker_count(count).with_seed(seed);
        let table = self.config.generator().generate()?;
        self.store(table)
    }

    /// Load and validate a worker CSV file.
    fn load_csv(&mut self, path: &str) -> PyResult<PyDataFrame> {
        let table = load_csv(Path::new(path))?;
        self.store(table)
    }

    /// Load and validate an uploaded CSV held in memory.
    fn load_csv_bytes(&mut self, data: Vec<u8>) -> PyResult<PyDataFrame> {
        let table = load_external(&read_csv_bytes(data)?)?;
        self.store(table)
    }

    /// Load and validate a worker table already parsed into a DataFrame.
    fn load_dataframe(&mut self, df: PyDataFrame) -> PyResult<PyDataFrame> {
        let table = load_external(&df.0)?;
        self.store(table)
    }

    // ── Tables ──────────────────────────────────────────────────────────────

    /// Every worker with derived columns, unfiltered.
    fn enriched_df(&self) -> PyResult<PyDataFrame> {
        let df = enriched_to_frame(&enrich(self.table()?))?;
        Ok(PyDataFrame(df))
    }

    /// Filtered enriched workers.
    #[pyo3(signature = (estates=None, levels=None, min_improvement=None))]
    fn filter(
        &self,
        estates: Option<Vec<String>>,
        levels: Option<Vec<String>>,
        min_improvement: Option<f64>,
    ) -> PyResult<PyDataFrame> {
        let view = self.view(estates, levels, min_improvement)?;
        Ok(PyDataFrame(enriched_to_frame(&view.workers)?))
    }

    /// Per-estate production and quality for the filtered workers.
    #[pyo3(signature = (estates=None, levels=None, min_improvement=None))]
    fn estate_metrics(
        &self,
        estates: Option<Vec<String>>,
        levels: Option<Vec<String>>,
        min_improvement: Option<f64>,
    ) -> PyResult<PyDataFrame> {
        let view = self.view(estates, levels, min_improvement)?;
        Ok(PyDataFrame(estates_to_frame(&view.estates)?))
    }

    #[pyo3(signature = (n=None, estates=None, levels=None, min_improvement=None))]
    fn top_productivity(
        &self,
        n: Option<usize>,
        estates: Option<Vec<String>>,
        levels: Option<Vec<String>>,
        min_improvement: Option<f64>,
    ) -> PyResult<PyDataFrame> {
        let filter = parse_filter(estates, levels, min_improvement)?;
        let view = DashboardView::build(self.table()?, &filter, n.unwrap_or(self.config.top_n));
        Ok(PyDataFrame(enriched_to_frame(&view.top_productivity)?))
    }

    #[pyo3(signature = (n=None, estates=None, levels=None, min_improvement=None))]
    fn top_quality(
        &self,
        n: Option<usize>,
        estates: Option<Vec<String>>,
        levels: Option<Vec<String>>,
        min_improvement: Option<f64>,
    ) -> PyResult<PyDataFrame> {
        let filter = parse_filter(estates, levels, min_improvement)?;
        let view = DashboardView::build(self.table()?, &filter, n.unwrap_or(self.config.top_n));
        Ok(PyDataFrame(enriched_to_frame(&view.top_quality)?))
    }

    // ── Widgets and cards ───────────────────────────────────────────────────

    /// `(estates, levels, (min_improvement, max_improvement) | None)` for
    /// the filter widgets.
    fn filter_options(&self) -> PyResult<(Vec<String>, Vec<String>, Option<(f64, f64)>)> {
        let options = crate::filter::filter_options(&enrich(self.table()?));
        let levels = options.levels.iter().map(|l| l.label().to_string()).collect();
        Ok((options.estates, levels, options.improvement_range))
    }

    /// Headline figures as a flat dict; means are None for an empty
    /// selection.
    #[pyo3(signature = (estates=None, levels=None, min_improvement=None))]
    fn summary(
        &self,
        estates: Option<Vec<String>>,
        levels: Option<Vec<String>>,
        min_improvement: Option<f64>,
    ) -> PyResult<HashMap<&'static str, Option<f64>>> {
        let view = self.view(estates, levels, min_improvement)?;
        let s = &view.summary;
        let f = &view.financial;
        Ok(HashMap::from([
            ("worker_count", Some(s.worker_count as f64)),
            ("avg_tonnage_before", s.avg_tonnage_before),
            ("avg_tonnage_after", s.avg_tonnage_after),
            ("avg_tonnage_change_pct", s.avg_tonnage_change_pct),
            ("avg_quality_before", s.avg_quality_before),
            ("avg_quality_after", s.avg_quality_after),
            ("avg_quality_change", s.avg_quality_change),
            ("total_revenue_impact_million", Some(s.total_revenue_impact_million)),
            ("avg_income_before", s.avg_income_before),
            ("avg_income_after", s.avg_income_after),
            ("avg_income_change", s.avg_income_change),
            ("avg_tonnage_improvement_pct", s.avg_tonnage_improvement_pct),
            ("avg_loss_reduction_pct", s.avg_loss_reduction_pct),
            ("avg_monthly_base_wage", f.avg_monthly_base_wage),
            ("avg_premium_before", f.avg_premium_before),
            ("avg_premium_after", f.avg_premium_after),
            ("total_income_improvement", Some(f.total_income_improvement)),
            ("low_performer_count", Some(view.low_performer_count as f64)),
        ]))
    }

    /// `(defect label, avg before, avg after, reduction, reduction %)` rows.
    #[pyo3(signature = (estates=None, levels=None, min_improvement=None))]
    fn defect_breakdown(
        &self,
        estates: Option<Vec<String>>,
        levels: Option<Vec<String>>,
        min_improvement: Option<f64>,
    ) -> PyResult<Vec<(&'static str, f64, f64, f64, f64)>> {
        let view = self.view(estates, levels, min_improvement)?;
        Ok(view
            .defects
            .iter()
            .map(|d| {
                (
                    d.defect.label(),
                    d.avg_before,
                    d.avg_after,
                    d.reduction,
                    d.reduction_pct,
                )
            })
            .collect())
    }

    /// `(level label, mean income improvement)` rows ordered by level.
    #[pyo3(signature = (estates=None, levels=None, min_improvement=None))]
    fn income_by_certification(
        &self,
        estates: Option<Vec<String>>,
        levels: Option<Vec<String>>,
        min_improvement: Option<f64>,
    ) -> PyResult<Vec<(&'static str, f64)>> {
        let view = self.view(estates, levels, min_improvement)?;
        Ok(view
            .income_by_level
            .iter()
            .map(|l| (l.level.label(), l.avg_income_improvement))
            .collect())
    }

    #[pyo3(signature = (estates=None, levels=None, min_improvement=None))]
    fn best_estate(
        &self,
        estates: Option<Vec<String>>,
        levels: Option<Vec<String>>,
        min_improvement: Option<f64>,
    ) -> PyResult<Option<String>> {
        let view = self.view(estates, levels, min_improvement)?;
        Ok(view.best_estate().map(|e| e.estate.clone()))
    }

    // ── Export ──────────────────────────────────────────────────────────────

    /// CSV text of a synthetic table with derived columns, for the template
    /// download button. Uses the configured count and seed, whatever table
    /// is currently loaded.
    fn template_csv(&self) -> PyResult<String> {
        let mut df = template_frame(&self.config)?;
        Ok(to_csv_string(&mut df)?)
    }

    /// `(file name, CSV text)` of the filtered table, named with today's
    /// date.
    #[pyo3(signature = (estates=None, levels=None, min_improvement=None))]
    fn filtered_csv(
        &self,
        estates: Option<Vec<String>>,
        levels: Option<Vec<String>>,
        min_improvement: Option<f64>,
    ) -> PyResult<(String, String)> {
        let view = self.view(estates, levels, min_improvement)?;
        let mut df = enriched_to_frame(&view.workers)?;
        Ok((filtered_file_name(today()), to_csv_string(&mut df)?))
    }

    /// Write the filtered table into `directory` (default: the configured
    /// output directory). Returns the written path.
    #[pyo3(signature = (directory=None, estates=None, levels=None, min_improvement=None))]
    fn export_filtered(
        &self,
        directory: Option<String>,
        estates: Option<Vec<String>>,
        levels: Option<Vec<String>>,
        min_improvement: Option<f64>,
    ) -> PyResult<String> {
        let view = self.view(estates, levels, min_improvement)?;
        let dir = directory
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.output_dir.clone());
        let path = export_filtered(&view.workers, &dir, today())?;
        Ok(path.display().to_string())
    }

    // ── Properties ──────────────────────────────────────────────────────────

    #[getter]
    fn workers_df(&self) -> PyResult<Option<PyDataFrame>> {
        self.workers
            .as_ref()
            .map(|t| Ok(PyDataFrame(workers_to_frame(t)?)))
            .transpose()
    }

    #[getter]
    fn top_n(&self) -> usize {
        self.config.top_n
    }
}

// ── Private helpers ─────────────────────────────────────────────────────────

impl HarvestDashboard {
    fn store(&mut self, table: WorkerTable) -> PyResult<PyDataFrame> {
        let df = workers_to_frame(&table)?;
        self.workers = Some(table);
        Ok(PyDataFrame(df))
    }

    fn table(&self) -> Result<&WorkerTable, MetricsError> {
        self.workers
            .as_ref()
            .ok_or_else(|| MetricsError::NotLoaded("workers".into()))
    }

    fn view(
        &self,
        estates: Option<Vec<String>>,
        levels: Option<Vec<String>>,
        min_improvement: Option<f64>,
    ) -> Result<DashboardView, MetricsError> {
        let filter = parse_filter(estates, levels, min_improvement)?;
        Ok(DashboardView::build(self.table()?, &filter, self.config.top_n))
    }
}

/// Synthetic enriched table offered as the CSV template.
fn template_frame(config: &DashboardConfig) -> Result<polars::prelude::DataFrame, MetricsError> {
    let table = config.generator().generate()?;
    enriched_to_frame(&enrich(&table))
}

/// Build a filter from widget values; level labels go through `FromStr`.
fn parse_filter(
    estates: Option<Vec<String>>,
    levels: Option<Vec<String>>,
    min_improvement: Option<f64>,
) -> Result<WorkerFilter, MetricsError> {
    let mut filter = WorkerFilter::new();
    if let Some(estates) = estates {
        filter = filter.with_estates(estates);
    }
    if let Some(levels) = levels {
        let parsed = levels
            .iter()
            .map(|l| l.parse::<CertificationLevel>())
            .collect::<Result<Vec<_>, _>>()?;
        filter = filter.with_levels(parsed);
    }
    if let Some(min) = min_improvement {
        filter = filter.with_min_improvement(min);
    }
    Ok(filter)
}
