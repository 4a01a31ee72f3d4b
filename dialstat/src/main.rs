//! dialstat - call disposition summaries from dialer exports
//!
//! Reads a CSV export, applies the configured exclusions and prints one
//! summary table per requested view.

mod render;

use anyhow::{Context, Result};
use clap::Parser;
use dialstat_core::analytics::metrics_registry::list_columns;
use dialstat_core::analytics::{
    columns_for_view, list_views, parse_views, RecordSubset, ReportEngine, SortSpec,
    ViewRunResult,
};
use dialstat_core::ingest::read_csv;
use dialstat_core::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dialstat")]
#[command(about = "Summarize call dispositions into productivity and collections tables")]
#[command(version)]
struct Args {
    /// Dialer export to summarize (CSV with a header row)
    #[arg(required_unless_present_any = ["list_views", "list_columns"])]
    input: Option<PathBuf>,

    /// View to produce; repeat for several (default: views from config)
    #[arg(short, long = "view")]
    views: Vec<String>,

    /// Record subset: all, predictive or manual
    #[arg(long)]
    subset: Option<String>,

    /// Sort rows by a column, e.g. ptp_amount:desc
    #[arg(long)]
    sort: Option<String>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Config file (default: $XDG_CONFIG_HOME/dialstat/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List available views without reading input
    #[arg(long)]
    list_views: bool,

    /// List metric columns without reading input
    #[arg(long)]
    list_columns: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };

    // Initialize logging
    let _log_guard =
        dialstat_core::logging::init(&config.logging).context("failed to initialize logging")?;

    if args.list_views {
        print_views();
        return Ok(());
    }
    if args.list_columns {
        print_columns();
        return Ok(());
    }

    if args.format != "text" && args.format != "json" {
        anyhow::bail!("unknown format '{}' (expected text or json)", args.format);
    }

    let subset: RecordSubset = args
        .subset
        .as_deref()
        .unwrap_or(&config.report.subset)
        .parse()
        .context("invalid subset")?;

    let sort: Option<SortSpec> = args
        .sort
        .as_deref()
        .or(config.report.sort.as_deref())
        .map(str::parse)
        .transpose()
        .context("invalid sort")?;

    let view_names = if args.views.is_empty() {
        config.report.views.clone()
    } else {
        args.views.clone()
    };
    let specs = parse_views(&view_names, subset, sort).context("invalid view list")?;

    let engine = ReportEngine::from_config(&config).context("invalid configuration")?;

    let input = args.input.context("an input file is required")?;
    let table =
        read_csv(&input).with_context(|| format!("failed to read {}", input.display()))?;

    tracing::info!(
        input = %input.display(),
        rows = table.len(),
        views = specs.len(),
        subset = subset.as_str(),
        "Input loaded"
    );

    let results = engine.run_all(&specs, &table);

    for result in results.iter().filter(|r| !r.is_success()) {
        eprintln!("{}", render::failure_line(result));
    }

    if args.format == "json" {
        print_json_results(&results)?;
    } else {
        print_text_results(&results);
    }

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    tracing::info!(succeeded, failed = results.len() - succeeded, "Report finished");
    if succeeded == 0 {
        anyhow::bail!(
            "none of the {} requested view(s) could be produced (log: {})",
            results.len(),
            dialstat_core::logging::log_file_path().display()
        );
    }

    Ok(())
}

fn print_text_results(results: &[ViewRunResult]) {
    let tables: Vec<String> = results
        .iter()
        .filter_map(|r| r.table.as_ref())
        .map(render::text_table)
        .collect();
    println!("{}", tables.join("\n"));
}

fn print_json_results(results: &[ViewRunResult]) -> Result<()> {
    let output = serde_json::json!({
        "views": results
            .iter()
            .filter_map(|r| r.table.as_ref())
            .map(|t| t.to_json())
            .collect::<Vec<_>>(),
        "runs": results.iter().map(|r| {
            serde_json::json!({
                "view": r.view,
                "status": r.status.as_str(),
                "error": r.error_message,
                "rows_produced": r.rows_produced,
                "rows_seen": r.normalize_report.rows_seen,
                "rows_kept": r.filter_report.kept,
                "duration_ms": r.duration_ms,
            })
        }).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_views() {
    println!("Available views:");
    for view in list_views() {
        let dimensions = view
            .default_dimensions()
            .iter()
            .map(|d| d.header())
            .collect::<Vec<_>>()
            .join(" x ");
        println!("  - {:<13} {} [{}]", view.name(), view.description(), dimensions);
        let columns = columns_for_view(view)
            .iter()
            .map(|c| c.slug())
            .collect::<Vec<_>>()
            .join(", ");
        println!("      columns: {}", columns);
    }
}

fn print_columns() {
    println!("Metric columns:");
    for column in list_columns() {
        println!(
            "  - {:<20} {:<8} {} ({})",
            column.slug,
            column.kind.as_str(),
            column.header,
            column.description
        );
    }
}
