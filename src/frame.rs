//! Polars DataFrame boundary: typed records in, typed records out.
//!
//! Ingestion is fail-fast. Every required column is checked up front and
//! every cell parsed into a [`WorkerRecord`]; the first problem aborts the
//! load naming the column and 1-based data row. Extra columns (for instance
//! derived columns of an earlier export) are ignored and recomputed.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;

use crate::aggregation::EstateAggregate;
use crate::error::{MetricsError, Result};
use crate::metrics::EnrichedWorker;
use crate::record::{CertificationLevel, Compensation, Measurements, WorkerRecord, WorkerTable};
use crate::schema::*;

// ── Records → DataFrame ─────────────────────────────────────────────────────

/// Raw worker table with columns in [`RAW_COLUMNS`] order.
pub fn workers_to_frame(table: &WorkerTable) -> Result<DataFrame> {
    let rows: Vec<&WorkerRecord> = table.iter().collect();
    Ok(DataFrame::new(raw_columns(&rows))?)
}

/// Raw columns followed by the derived columns in [`derived::ALL`] order.
/// An undefined tonnage improvement becomes a null cell.
pub fn enriched_to_frame(workers: &[EnrichedWorker]) -> Result<DataFrame> {
    let rows: Vec<&WorkerRecord> = workers.iter().map(|w| &w.record).collect();
    let mut columns = raw_columns(&rows);
    columns.extend([
        Column::new(
            derived::TONNAGE_IMPROVEMENT_PCT.into(),
            collect(workers, |w| w.metrics.tonnage_improvement_pct),
        ),
        Column::new(
            derived::TREE_IMPROVEMENT.into(),
            collect(workers, |w| w.metrics.tree_improvement),
        ),
        Column::new(
            derived::LOSS_REDUCTION_PCT.into(),
            collect(workers, |w| w.metrics.loss_reduction_pct),
        ),
        Column::new(
            derived::QUALITY_SCORE_BEFORE.into(),
            collect(workers, |w| w.metrics.quality_score_before),
        ),
        Column::new(
            derived::QUALITY_SCORE_AFTER.into(),
            collect(workers, |w| w.metrics.quality_score_after),
        ),
        Column::new(
            derived::INCOME_BEFORE.into(),
            collect(workers, |w| w.metrics.income_before),
        ),
        Column::new(
            derived::INCOME_AFTER.into(),
            collect(workers, |w| w.metrics.income_after),
        ),
        Column::new(
            derived::INCOME_IMPROVEMENT.into(),
            collect(workers, |w| w.metrics.income_improvement),
        ),
    ]);
    Ok(DataFrame::new(columns)?)
}

/// Estate aggregate table with columns in [`estate::ALL`] order.
pub fn estates_to_frame(estates: &[EstateAggregate]) -> Result<DataFrame> {
    let columns = vec![
        Column::new(
            estate::ESTATE.into(),
            collect(estates, |e| e.estate.clone()),
        ),
        Column::new(
            estate::WORKER_COUNT.into(),
            collect(estates, |e| e.worker_count as u64),
        ),
        Column::new(
            estate::PRODUCTION_BEFORE_TON.into(),
            collect(estates, |e| e.production_before_ton),
        ),
        Column::new(
            estate::PRODUCTION_AFTER_TON.into(),
            collect(estates, |e| e.production_after_ton),
        ),
        Column::new(
            estate::PRODUCTION_DELTA_TON.into(),
            collect(estates, |e| e.production_delta_ton),
        ),
        Column::new(
            estate::REVENUE_IMPACT_MILLION.into(),
            collect(estates, |e| e.revenue_impact_million),
        ),
        Column::new(
            estate::AVG_QUALITY_BEFORE.into(),
            collect(estates, |e| e.avg_quality_before),
        ),
        Column::new(
            estate::AVG_QUALITY_AFTER.into(),
            collect(estates, |e| e.avg_quality_after),
        ),
    ];
    Ok(DataFrame::new(columns)?)
}

fn collect<T, V>(rows: &[T], f: impl Fn(&T) -> V) -> Vec<V> {
    rows.iter().map(f).collect()
}

fn raw_columns(rows: &[&WorkerRecord]) -> Vec<Column> {
    let mut columns = vec![
        Column::new(
            worker::WORKER_ID.into(),
            collect(rows, |r| r.worker_id.clone()),
        ),
        Column::new(worker::NAME.into(), collect(rows, |r| r.name.clone())),
        Column::new(worker::ESTATE.into(), collect(rows, |r| r.estate.clone())),
        Column::new(
            worker::CERTIFICATION_DATE.into(),
            collect(rows, |r| r.certification_date.format(DATE_FORMAT).to_string()),
        ),
    ];
    columns.extend(period_columns(rows, PeriodNames::BEFORE, |r| &r.before));
    columns.extend(period_columns(rows, PeriodNames::AFTER, |r| &r.after));
    columns.extend([
        Column::new(
            compensation::BASE_WAGE.into(),
            collect(rows, |r| r.compensation.base_wage),
        ),
        Column::new(
            compensation::PREMIUM_PER_KG.into(),
            collect(rows, |r| r.compensation.premium_per_kg),
        ),
        Column::new(
            worker::YEARS_OF_SERVICE.into(),
            collect(rows, |r| r.years_of_service),
        ),
        Column::new(worker::AGE.into(), collect(rows, |r| r.age)),
        Column::new(
            worker::CERTIFICATION_LEVEL.into(),
            collect(rows, |r| r.certification_level.label().to_string()),
        ),
    ]);
    columns
}

/// Column names of one observation period.
struct PeriodNames {
    tonnage: &'static str,
    trees: &'static str,
    loose_loss: &'static str,
    unripe: &'static str,
    rotten: &'static str,
    long_stalk: &'static str,
    days: &'static str,
}

impl PeriodNames {
    const BEFORE: Self = Self {
        tonnage: before::TONNAGE_KG,
        trees: before::TREES,
        loose_loss: before::LOOSE_LOSS_PCT,
        unripe: before::UNRIPE_PCT,
        rotten: before::ROTTEN_PCT,
        long_stalk: before::LONG_STALK_PCT,
        days: before::DAYS_WORKED,
    };

    const AFTER: Self = Self {
        tonnage: after::TONNAGE_KG,
        trees: after::TREES,
        loose_loss: after::LOOSE_LOSS_PCT,
        unripe: after::UNRIPE_PCT,
        rotten: after::ROTTEN_PCT,
        long_stalk: after::LONG_STALK_PCT,
        days: after::DAYS_WORKED,
    };
}

fn period_columns(
    rows: &[&WorkerRecord],
    names: PeriodNames,
    pick: fn(&WorkerRecord) -> &Measurements,
) -> [Column; 7] {
    [
        Column::new(names.tonnage.into(), collect(rows, |r| pick(r).tonnage_kg)),
        Column::new(names.trees.into(), collect(rows, |r| pick(r).trees)),
        Column::new(
            names.loose_loss.into(),
            collect(rows, |r| pick(r).loose_loss_pct),
        ),
        Column::new(names.unripe.into(), collect(rows, |r| pick(r).unripe_pct)),
        Column::new(names.rotten.into(), collect(rows, |r| pick(r).rotten_pct)),
        Column::new(
            names.long_stalk.into(),
            collect(rows, |r| pick(r).long_stalk_pct),
        ),
        Column::new(names.days.into(), collect(rows, |r| pick(r).days_worked)),
    ]
}

// ── DataFrame → records ─────────────────────────────────────────────────────

/// Validate and convert an externally supplied table (uploaded CSV or a
/// DataFrame from the dashboard) into typed worker records.
pub fn load_external(df: &DataFrame) -> Result<WorkerTable> {
    require_columns(df, &RAW_COLUMNS)?;
    let cells = StringCells::new(df)?;

    let table = (0..df.height())
        .map(|row| {
            let record = cells.record(row)?;
            record.validate()?;
            Ok::<_, MetricsError>(record)
        })
        .collect::<Result<WorkerTable>>()?;
    ensure_unique_ids(&table)?;

    let out_of_range = table
        .iter()
        .filter(|r| r.before.has_out_of_range_defect() || r.after.has_out_of_range_defect())
        .count();
    if out_of_range > 0 {
        tracing::warn!(
            rows = out_of_range,
            "defect percentages outside [0, 100] loaded unclamped"
        );
    }
    tracing::info!(rows = table.len(), "loaded worker table");
    Ok(table)
}

/// Worker IDs identify rows across exports; a repeat is rejected with the
/// 1-based row of its second occurrence.
fn ensure_unique_ids(table: &WorkerTable) -> Result<()> {
    let mut seen = HashSet::with_capacity(table.len());
    for (row, record) in table.iter().enumerate() {
        if !seen.insert(record.worker_id.as_str()) {
            return Err(MetricsError::Validation(format!(
                "Duplicate worker ID {} at row {}",
                record.worker_id,
                row + 1
            )));
        }
    }
    Ok(())
}

fn require_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| df.column(name).is_err())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MetricsError::MissingColumn(missing.join(", ")))
    }
}

/// Every raw column viewed as strings, whatever dtype it arrived with.
struct StringCells {
    columns: HashMap<&'static str, StringChunked>,
}

impl StringCells {
    fn new(df: &DataFrame) -> Result<Self> {
        let mut columns = HashMap::with_capacity(RAW_COLUMNS.len());
        for name in RAW_COLUMNS {
            let as_text = df.column(name)?.cast(&DataType::String)?;
            columns.insert(name, as_text.str()?.clone());
        }
        Ok(Self { columns })
    }

    fn text(&self, column: &'static str, row: usize) -> Result<&str> {
        self.columns
            .get(column)
            .and_then(|ca| ca.get(row))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid(column, row, ""))
    }

    fn float(&self, column: &'static str, row: usize) -> Result<f64> {
        let raw = self.text(column, row)?;
        raw.parse::<f64>().map_err(|_| invalid(column, row, raw))
    }

    /// Non-negative whole number; accepts float notation such as `85000.0`.
    fn whole(&self, column: &'static str, row: usize) -> Result<u32> {
        let raw = self.text(column, row)?;
        if let Ok(v) = raw.parse::<u32>() {
            return Ok(v);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) => Ok(v as u32),
            _ => Err(invalid(column, row, raw)),
        }
    }

    /// ISO date; a trailing time part (`2024-01-15 00:00:00`) is ignored.
    fn date(&self, column: &'static str, row: usize) -> Result<NaiveDate> {
        let raw = self.text(column, row)?;
        let day = raw.split(['T', ' ']).next().unwrap_or(raw);
        NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|_| invalid(column, row, raw))
    }

    fn level(&self, column: &'static str, row: usize) -> Result<CertificationLevel> {
        let raw = self.text(column, row)?;
        raw.parse().map_err(|_| invalid(column, row, raw))
    }

    fn period(&self, names: &PeriodNames, row: usize) -> Result<Measurements> {
        Ok(Measurements {
            tonnage_kg: self.float(names.tonnage, row)?,
            trees: self.whole(names.trees, row)?,
            loose_loss_pct: self.float(names.loose_loss, row)?,
            unripe_pct: self.float(names.unripe, row)?,
            rotten_pct: self.float(names.rotten, row)?,
            long_stalk_pct: self.float(names.long_stalk, row)?,
            days_worked: self.whole(names.days, row)?,
        })
    }

    fn record(&self, row: usize) -> Result<WorkerRecord> {
        Ok(WorkerRecord {
            worker_id: self.text(worker::WORKER_ID, row)?.to_string(),
            name: self.text(worker::NAME, row)?.to_string(),
            estate: self.text(worker::ESTATE, row)?.to_string(),
            certification_date: self.date(worker::CERTIFICATION_DATE, row)?,
            certification_level: self.level(worker::CERTIFICATION_LEVEL, row)?,
            before: self.period(&PeriodNames::BEFORE, row)?,
            after: self.period(&PeriodNames::AFTER, row)?,
            compensation: Compensation {
                base_wage: self.whole(compensation::BASE_WAGE, row)?,
                premium_per_kg: self.whole(compensation::PREMIUM_PER_KG, row)?,
            },
            years_of_service: self.whole(worker::YEARS_OF_SERVICE, row)?,
            age: self.whole(worker::AGE, row)?,
        })
    }
}

fn invalid(column: &str, row: usize, value: &str) -> MetricsError {
    MetricsError::InvalidValue {
        column: column.to_string(),
        row: row + 1,
        value: value.to_string(),
    }
}

// ── CSV I/O ─────────────────────────────────────────────────────────────────

/// Read a CSV file with all columns as String dtype and trimmed headers.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    trim_column_names(df)
}

/// Same as [`read_csv`] for an in-memory upload.
pub fn read_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    trim_column_names(df)
}

/// Read and validate a worker CSV file.
pub fn load_csv(path: &Path) -> Result<WorkerTable> {
    tracing::debug!(path = %path.display(), "reading worker CSV");
    load_external(&read_csv(path)?)
}

fn trim_column_names(mut df: DataFrame) -> Result<DataFrame> {
    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;
    Ok(df)
}

/// Write `df` as comma-separated text with a header row.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    tracing::info!(path = %path.display(), rows = df.height(), "wrote CSV");
    Ok(())
}

/// Render `df` as comma-separated text, for download buttons.
pub fn to_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buffer).include_header(true).finish(df)?;
    String::from_utf8(buffer).map_err(|e| MetricsError::General(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_synthetic;
    use crate::metrics::enrich;
    use crate::record::tests::sample_record;

    #[test]
    fn raw_frame_has_schema_columns_in_order() {
        let df = workers_to_frame(&generate_synthetic(5, 42).unwrap()).unwrap();
        assert_eq!(df.get_column_names_str(), RAW_COLUMNS.to_vec());
        assert_eq!(df.height(), 5);
    }

    #[test]
    fn enriched_frame_appends_derived_columns() {
        let rows = enrich(&generate_synthetic(4, 1).unwrap());
        let df = enriched_to_frame(&rows).unwrap();
        let names = df.get_column_names_str();
        assert_eq!(names.len(), RAW_COLUMNS.len() + derived::ALL.len());
        assert_eq!(&names[RAW_COLUMNS.len()..], derived::ALL.as_slice());
    }

    #[test]
    fn undefined_improvement_becomes_null() {
        let mut record = sample_record("HRV0001", "X");
        record.before.tonnage_kg = 0.0;
        let rows = enrich(&WorkerTable::new(vec![record]));
        let df = enriched_to_frame(&rows).unwrap();
        let col = df.column(derived::TONNAGE_IMPROVEMENT_PCT).unwrap();
        assert_eq!(col.null_count(), 1);
    }

    #[test]
    fn frame_round_trips_into_records() {
        let table = generate_synthetic(12, 9).unwrap();
        let df = workers_to_frame(&table).unwrap();
        assert_eq!(load_external(&df).unwrap(), table);
    }

    #[test]
    fn missing_columns_are_reported_together() {
        let table = generate_synthetic(2, 9).unwrap();
        let kept = RAW_COLUMNS
            .iter()
            .filter(|c| **c != worker::AGE && **c != compensation::PREMIUM_PER_KG);
        let df = workers_to_frame(&table).unwrap().select(kept.copied()).unwrap();
        match load_external(&df) {
            Err(MetricsError::MissingColumn(msg)) => {
                assert!(msg.contains(worker::AGE));
                assert!(msg.contains(compensation::PREMIUM_PER_KG));
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn bad_cell_names_column_and_row() {
        let csv = format!(
            "{}\n{}\n",
            RAW_COLUMNS.join(","),
            "HRV0001,Pekerja 1,Estate A - Riau,2024-01-15,850.5,50,8.5,6.8,4.2,12.5,24,\
             1050.2,65,4.2,2.8,1.5,5.2,25,90000,abc,5,30,Dasar"
        );
        let df = read_csv_bytes(csv.into_bytes()).unwrap();
        match load_external(&df) {
            Err(MetricsError::InvalidValue { column, row, value }) => {
                assert_eq!(column, compensation::PREMIUM_PER_KG);
                assert_eq!(row, 1);
                assert_eq!(value, "abc");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn repeated_worker_id_is_rejected() {
        let row = "HRV0001,Pekerja 1,Estate A - Riau,2024-01-15,850.5,50,8.5,6.8,4.2,12.5,24,\
                   1050.2,65,4.2,2.8,1.5,5.2,25,90000,175,5,30,Dasar";
        let csv = format!("{}\n{row}\n{row}\n", RAW_COLUMNS.join(","));
        let df = read_csv_bytes(csv.into_bytes()).unwrap();
        match load_external(&df) {
            Err(MetricsError::Validation(msg)) => {
                assert!(msg.contains("HRV0001"));
                assert!(msg.contains("row 2"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn pandas_style_cells_are_accepted() {
        let csv = format!(
            "{}\n{}\n",
            RAW_COLUMNS.join(","),
            "HRV0001,Pekerja 1,Estate A - Riau,2024-01-15 00:00:00,850.5,50.0,8.5,6.8,4.2,12.5,24,\
             1050.2,65,4.2,2.8,1.5,5.2,25,90000.0,175,5,30,Advanced"
        );
        let table = load_external(&read_csv_bytes(csv.into_bytes()).unwrap()).unwrap();
        let record = &table.records()[0];
        assert_eq!(record.before.trees, 50);
        assert_eq!(record.compensation.base_wage, 90000);
        assert_eq!(record.certification_level, CertificationLevel::Advanced);
        assert_eq!(
            record.certification_date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn estate_frame_columns() {
        let rows = enrich(&generate_synthetic(10, 4).unwrap());
        let estates = crate::aggregation::aggregate_by_estate(&rows);
        let df = estates_to_frame(&estates).unwrap();
        assert_eq!(df.get_column_names_str(), estate::ALL.to_vec());
        assert_eq!(df.height(), estates.len());
    }

    #[test]
    fn empty_estate_table_still_has_schema() {
        let df = estates_to_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), estate::ALL.len());
    }
}
