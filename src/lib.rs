//! Before/after certification metrics for oil-palm harvesters.
//!
//! Produces (or validates) a worker table, derives productivity, quality and
//! income improvements per worker, and aggregates them per estate for a
//! dashboard front end.

pub mod aggregation;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod filter;
pub mod frame;
pub mod generator;
pub mod logging;
pub mod metrics;
pub mod ranking;
pub mod record;
pub mod schema;

#[cfg(feature = "python")]
mod python;

pub use aggregation::{aggregate_by_estate, EstateAggregate, FFB_PRICE_PER_KG};
pub use config::DashboardConfig;
pub use dashboard::DashboardView;
pub use error::{MetricsError, Result};
pub use filter::WorkerFilter;
pub use frame::load_external;
pub use generator::generate_synthetic;
pub use metrics::{enrich, EnrichedWorker};
pub use record::{CertificationLevel, WorkerRecord, WorkerTable};

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyModule;

/// Export schema constants as Python submodules
#[cfg(feature = "python")]
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let add_group = |name: &str, columns: &[(&str, &str)]| -> PyResult<()> {
        let group = PyModule::new(m.py(), name)?;
        for (attr, value) in columns {
            group.add(*attr, *value)?;
        }
        m.add_submodule(&group)
    };

    add_group(
        "worker",
        &[
            ("WORKER_ID", schema::worker::WORKER_ID),
            ("NAME", schema::worker::NAME),
            ("ESTATE", schema::worker::ESTATE),
            ("CERTIFICATION_DATE", schema::worker::CERTIFICATION_DATE),
            ("CERTIFICATION_LEVEL", schema::worker::CERTIFICATION_LEVEL),
            ("YEARS_OF_SERVICE", schema::worker::YEARS_OF_SERVICE),
            ("AGE", schema::worker::AGE),
        ],
    )?;

    for (name, tonnage, trees, loose, unripe, rotten, stalk, days) in [
        (
            "before",
            schema::before::TONNAGE_KG,
            schema::before::TREES,
            schema::before::LOOSE_LOSS_PCT,
            schema::before::UNRIPE_PCT,
            schema::before::ROTTEN_PCT,
            schema::before::LONG_STALK_PCT,
            schema::before::DAYS_WORKED,
        ),
        (
            "after",
            schema::after::TONNAGE_KG,
            schema::after::TREES,
            schema::after::LOOSE_LOSS_PCT,
            schema::after::UNRIPE_PCT,
            schema::after::ROTTEN_PCT,
            schema::after::LONG_STALK_PCT,
            schema::after::DAYS_WORKED,
        ),
    ] {
        add_group(
            name,
            &[
                ("TONNAGE_KG", tonnage),
                ("TREES", trees),
                ("LOOSE_LOSS_PCT", loose),
                ("UNRIPE_PCT", unripe),
                ("ROTTEN_PCT", rotten),
                ("LONG_STALK_PCT", stalk),
                ("DAYS_WORKED", days),
            ],
        )?;
    }

    add_group(
        "compensation",
        &[
            ("BASE_WAGE", schema::compensation::BASE_WAGE),
            ("PREMIUM_PER_KG", schema::compensation::PREMIUM_PER_KG),
        ],
    )?;

    add_group(
        "derived",
        &[
            ("TONNAGE_IMPROVEMENT_PCT", schema::derived::TONNAGE_IMPROVEMENT_PCT),
            ("TREE_IMPROVEMENT", schema::derived::TREE_IMPROVEMENT),
            ("LOSS_REDUCTION_PCT", schema::derived::LOSS_REDUCTION_PCT),
            ("QUALITY_SCORE_BEFORE", schema::derived::QUALITY_SCORE_BEFORE),
            ("QUALITY_SCORE_AFTER", schema::derived::QUALITY_SCORE_AFTER),
            ("INCOME_BEFORE", schema::derived::INCOME_BEFORE),
            ("INCOME_AFTER", schema::derived::INCOME_AFTER),
            ("INCOME_IMPROVEMENT", schema::derived::INCOME_IMPROVEMENT),
        ],
    )?;

    add_group(
        "estate",
        &[
            ("ESTATE", schema::estate::ESTATE),
            ("WORKER_COUNT", schema::estate::WORKER_COUNT),
            ("PRODUCTION_BEFORE_TON", schema::estate::PRODUCTION_BEFORE_TON),
            ("PRODUCTION_AFTER_TON", schema::estate::PRODUCTION_AFTER_TON),
            ("PRODUCTION_DELTA_TON", schema::estate::PRODUCTION_DELTA_TON),
            ("REVENUE_IMPACT_MILLION", schema::estate::REVENUE_IMPACT_MILLION),
            ("AVG_QUALITY_BEFORE", schema::estate::AVG_QUALITY_BEFORE),
            ("AVG_QUALITY_AFTER", schema::estate::AVG_QUALITY_AFTER),
        ],
    )?;

    add_group(
        "certification",
        &[
            ("BASIC", schema::certification::BASIC),
            ("INTERMEDIATE", schema::certification::INTERMEDIATE),
            ("ADVANCED", schema::certification::ADVANCED),
        ],
    )?;

    Ok(())
}

#[cfg(feature = "python")]
#[pymodule]
#[pyo3(name = "_core")]
fn python_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::HarvestDashboard>()?;
    m.add("FFB_PRICE_PER_KG", FFB_PRICE_PER_KG)?;
    add_schema_exports(m)?;
    Ok(())
}
