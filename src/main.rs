//! Harvester certification metrics CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use harvester_metrics::export::{export_filtered, export_template, today};
use harvester_metrics::frame::load_csv;
use harvester_metrics::logging::{init_logging, LogConfig};
use harvester_metrics::{enrich, CertificationLevel, DashboardConfig, DashboardView, WorkerFilter};

mod cli;
mod summary;

use crate::cli::{Cli, Command, ReportArgs, TemplateArgs};

fn main() {
    let cli = Cli::parse();
    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format.into())
        .with_ansi(!cli.no_color && io::stderr().is_terminal());
    init_logging(&log_config);

    let result = match cli.command {
        Command::Template(args) => run_template(&args),
        Command::Report(args) => run_report(&args),
    };
    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run_template(args: &TemplateArgs) -> Result<()> {
    let config = DashboardConfig::default()
        .with_worker_count(args.count)
        .with_seed(args.seed)
        .with_output_dir(&args.output_dir);
    let table = config.generator().generate()?;
    let path = export_template(&enrich(&table), &config.output_dir)
        .with_context(|| format!("writing template into {}", config.output_dir.display()))?;
    info!(rows = table.len(), path = %path.display(), "template written");
    println!("{}", path.display());
    Ok(())
}

fn run_report(args: &ReportArgs) -> Result<()> {
    let config = DashboardConfig::default()
        .with_worker_count(args.count)
        .with_seed(args.seed)
        .with_top_n(args.top)
        .with_output_dir(&args.output_dir);

    let table = match &args.input {
        Some(path) => {
            load_csv(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => config.generator().generate()?,
    };

    let view = DashboardView::build(&table, &filter_from_args(args)?, config.top_n);
    summary::print_view(&view);

    if args.export {
        let path = export_filtered(&view.workers, &config.output_dir, today())
            .with_context(|| format!("exporting into {}", config.output_dir.display()))?;
        info!(rows = view.workers.len(), path = %path.display(), "filtered table written");
        println!("\nExported: {}", path.display());
    }
    Ok(())
}

/// Flags left empty mean no restriction on that dimension.
fn filter_from_args(args: &ReportArgs) -> Result<WorkerFilter> {
    let mut filter = WorkerFilter::new();
    if !args.estates.is_empty() {
        filter = filter.with_estates(args.estates.iter().cloned());
    }
    if !args.levels.is_empty() {
        let levels = args
            .levels
            .iter()
            .map(|l| l.parse::<CertificationLevel>())
            .collect::<Result<Vec<_>, _>>()?;
        filter = filter.with_levels(levels);
    }
    if let Some(min) = args.min_improvement {
        filter = filter.with_min_improvement(min);
    }
    Ok(filter)
}
