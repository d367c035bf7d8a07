use std::fs;

use chrono::NaiveDate;
use harvester_metrics::aggregation::{best_estate, summarize};
use harvester_metrics::export::{export_filtered, export_template, TEMPLATE_FILE_NAME};
use harvester_metrics::frame::{load_csv, read_csv};
use harvester_metrics::schema::{derived, RAW_COLUMNS};
use harvester_metrics::{
    aggregate_by_estate, enrich, generate_synthetic, CertificationLevel, DashboardView,
    MetricsError, WorkerFilter,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn template_export_loads_back_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let table = generate_synthetic(30, 42).unwrap();
    let path = export_template(&enrich(&table), dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), TEMPLATE_FILE_NAME);

    let loaded = load_csv(&path).unwrap();
    assert_eq!(loaded.len(), table.len());
    for (a, b) in loaded.iter().zip(table.iter()) {
        assert_eq!(a.worker_id, b.worker_id);
        assert_eq!(a.estate, b.estate);
        assert_eq!(a.certification_date, b.certification_date);
        assert_eq!(a.certification_level, b.certification_level);
        assert_eq!(a.before.trees, b.before.trees);
        assert_eq!(a.compensation, b.compensation);
        assert!(close(a.before.tonnage_kg, b.before.tonnage_kg));
        assert!(close(a.after.tonnage_kg, b.after.tonnage_kg));
        assert!(close(a.after.long_stalk_pct, b.after.long_stalk_pct));
    }
}

#[test]
fn template_file_carries_raw_and_derived_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = export_template(&enrich(&generate_synthetic(5, 1).unwrap()), dir.path()).unwrap();
    let df = read_csv(&path).unwrap();
    let names = df.get_column_names_str();
    assert_eq!(&names[..RAW_COLUMNS.len()], RAW_COLUMNS.as_slice());
    assert_eq!(&names[RAW_COLUMNS.len()..], derived::ALL.as_slice());
}

#[test]
fn filtered_export_is_date_stamped() {
    let dir = tempfile::tempdir().unwrap();
    let workers = enrich(&generate_synthetic(10, 3).unwrap());
    let date = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
    let path = export_filtered(&workers, dir.path(), date).unwrap();
    assert!(path.ends_with("data_pemanen_tersertifikasi_20251102.csv"));
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 11);
}

#[test]
fn csv_missing_a_column_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.csv");
    let header: Vec<&str> = RAW_COLUMNS.iter().copied().filter(|c| *c != "Usia").collect();
    fs::write(&path, format!("{}\n", header.join(","))).unwrap();
    match load_csv(&path) {
        Err(MetricsError::MissingColumn(column)) => assert_eq!(column, "Usia"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn out_of_range_days_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("days.csv");
    let row = "HRV0001,Pekerja 1,Estate A - Riau,2024-01-15,850.5,50,8.5,6.8,4.2,12.5,40,\
               1050.2,65,4.2,2.8,1.5,5.2,25,90000,175,5,30,Dasar";
    fs::write(&path, format!("{}\n{row}\n", RAW_COLUMNS.join(","))).unwrap();
    assert!(matches!(load_csv(&path), Err(MetricsError::Validation(_))));
}

#[test]
fn dashboard_figures_agree_with_building_blocks() {
    let table = generate_synthetic(50, 42).unwrap();
    let filter = WorkerFilter::new()
        .with_levels([CertificationLevel::Intermediate, CertificationLevel::Advanced])
        .with_min_improvement(0.0);
    let view = DashboardView::build(&table, &filter, 5);

    let expected: Vec<_> = enrich(&table)
        .into_iter()
        .filter(|w| w.record.certification_level != CertificationLevel::Basic)
        .filter(|w| w.metrics.tonnage_improvement_pct.is_some_and(|p| p >= 0.0))
        .collect();
    assert_eq!(view.workers, expected);

    let estates = aggregate_by_estate(&expected);
    assert_eq!(view.estates, estates);
    assert_eq!(view.summary, summarize(&expected, &estates));
    assert_eq!(
        view.best_estate().map(|e| &e.estate),
        best_estate(&estates).map(|e| &e.estate)
    );
    assert!(view.top_productivity.len() <= 5);
}

#[test]
fn estate_totals_follow_the_production_formula() {
    let workers = enrich(&generate_synthetic(40, 8).unwrap());
    for estate in aggregate_by_estate(&workers) {
        let members: Vec<_> = workers
            .iter()
            .filter(|w| w.record.estate == estate.estate)
            .collect();
        let after_kg: f64 = members
            .iter()
            .map(|w| w.record.after.tonnage_kg * f64::from(w.record.after.days_worked))
            .sum();
        assert_eq!(estate.worker_count, members.len());
        assert!((estate.production_after_ton - after_kg / 1000.0).abs() < 1e-6);
    }
}
