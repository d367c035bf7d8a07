//! Terminal rendering of a dashboard view.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use harvester_metrics::metrics::EnrichedWorker;
use harvester_metrics::DashboardView;

pub fn print_view(view: &DashboardView) {
    print_summary(view);
    println!();
    print_estates(view);
    println!();
    print_defects(view);
    println!();
    print_ranking("Top productivity", &view.top_productivity);
    println!();
    print_ranking("Top quality", &view.top_quality);
}

fn print_summary(view: &DashboardView) {
    let s = &view.summary;
    let f = &view.financial;
    let mut table = styled_table(vec!["Metric", "Before", "After", "Change"]);
    table.add_row(vec![
        Cell::new("Workers"),
        Cell::new(""),
        Cell::new(s.worker_count),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Tonnage (kg/day)"),
        number_cell(s.avg_tonnage_before, 1),
        number_cell(s.avg_tonnage_after, 1),
        change_cell(s.avg_tonnage_change_pct, "%"),
    ]);
    table.add_row(vec![
        Cell::new("Quality score"),
        number_cell(s.avg_quality_before, 1),
        number_cell(s.avg_quality_after, 1),
        change_cell(s.avg_quality_change, ""),
    ]);
    table.add_row(vec![
        Cell::new("Income (Rp)"),
        number_cell(s.avg_income_before, 0),
        number_cell(s.avg_income_after, 0),
        change_cell(s.avg_income_change, ""),
    ]);
    table.add_row(vec![
        Cell::new("Premium earnings (Rp)"),
        number_cell(f.avg_premium_before, 0),
        number_cell(f.avg_premium_after, 0),
        Cell::new(""),
    ]);
    align_numeric(&mut table, 1..4);
    println!("{table}");

    println!(
        "Revenue impact: Rp {:.1} juta/month",
        s.total_revenue_impact_million
    );
    if let Some(best) = view.best_estate() {
        println!("Best estate: {}", best.estate);
    }
    println!(
        "Below 25th percentile of improvement: {} workers",
        view.low_performer_count
    );
}

fn print_estates(view: &DashboardView) {
    let mut table = styled_table(vec![
        "Estate",
        "Workers",
        "Before (t)",
        "After (t)",
        "Delta (t)",
        "Revenue (juta)",
        "Quality before",
        "Quality after",
    ]);
    for e in &view.estates {
        table.add_row(vec![
            Cell::new(&e.estate),
            Cell::new(e.worker_count),
            Cell::new(format!("{:.1}", e.production_before_ton)),
            Cell::new(format!("{:.1}", e.production_after_ton)),
            Cell::new(format!("{:+.1}", e.production_delta_ton)),
            Cell::new(format!("{:.1}", e.revenue_impact_million)),
            Cell::new(format!("{:.1}", e.avg_quality_before)),
            Cell::new(format!("{:.1}", e.avg_quality_after)),
        ]);
    }
    align_numeric(&mut table, 1..8);
    println!("{table}");
}

fn print_defects(view: &DashboardView) {
    let mut table = styled_table(vec!["Defect", "Before %", "After %", "Reduction %"]);
    for d in &view.defects {
        table.add_row(vec![
            Cell::new(d.defect.label()),
            Cell::new(format!("{:.2}", d.avg_before)),
            Cell::new(format!("{:.2}", d.avg_after)),
            Cell::new(format!("{:.1}", d.reduction_pct)),
        ]);
    }
    align_numeric(&mut table, 1..4);
    println!("{table}");
}

fn print_ranking(title: &str, workers: &[EnrichedWorker]) {
    println!("{title}");
    let mut table = styled_table(vec![
        "ID",
        "Name",
        "Estate",
        "Level",
        "Tonnage +%",
        "Quality",
    ]);
    for w in workers {
        table.add_row(vec![
            Cell::new(&w.record.worker_id),
            Cell::new(&w.record.name),
            Cell::new(&w.record.estate),
            Cell::new(w.record.certification_level),
            number_cell(w.metrics.tonnage_improvement_pct, 2),
            Cell::new(format!("{:.1}", w.metrics.quality_score_after)),
        ]);
    }
    align_numeric(&mut table, 4..6);
    println!("{table}");
}

fn styled_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

fn align_numeric(table: &mut Table, columns: std::ops::Range<usize>) {
    for index in columns {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn number_cell(value: Option<f64>, decimals: usize) -> Cell {
    match value {
        Some(v) => Cell::new(format!("{v:.decimals$}")),
        None => Cell::new("-").fg(Color::DarkGrey),
    }
}

fn change_cell(value: Option<f64>, suffix: &str) -> Cell {
    match value {
        Some(v) if v >= 0.0 => Cell::new(format!("{v:+.1}{suffix}")).fg(Color::Green),
        Some(v) => Cell::new(format!("{v:+.1}{suffix}")).fg(Color::Red),
        None => Cell::new("-").fg(Color::DarkGrey),
    }
}
