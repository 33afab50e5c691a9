// fidelis/src/commands/run.rs
//
// USE CASE: Evaluate every assignment of the working state on one dataset.

use anyhow::Context;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::path::PathBuf;

use fidelis_core::application::{QualityReport, QualityRunner, build_report, save_report};
use fidelis_core::domain::evaluation::{EvaluationOptions, QualityCheckResult};
use fidelis_core::infrastructure::config::load_working_state;

use super::ProjectContext;
use crate::cli::OutputFormat;

/// Failing rows printed per check with `--details`.
const MAX_DETAIL_ROWS: usize = 10;

pub struct RunArgs {
    pub project_dir: PathBuf,
    pub dataset: String,
    pub checks: Option<PathBuf>,
    pub template: Option<String>,
    pub details: bool,
    pub format: OutputFormat,
    pub fail_under: Option<f64>,
}

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let start = std::time::Instant::now();
    let json = args.format == OutputFormat::Json;

    // A. Load the project (config, DuckDB, stores)
    if !json {
        println!("⚙️  Loading configuration...");
    }
    let ctx = ProjectContext::load(&args.project_dir)?;
    if !json {
        println!("   Project: {} (v{})", ctx.config.name, ctx.config.version);
    }
    ctx.ensure_dataset(&args.dataset)?;

    // B. Working state: a template, or the checks file
    let state = match &args.template {
        Some(id) => ctx
            .template_manager()
            .load(id)
            .with_context(|| format!("Failed to load template '{}'", id))?,
        None => {
            let path = args.checks.clone().unwrap_or_else(|| ctx.checks_path());
            load_working_state(&path)
                .with_context(|| format!("Failed to load checks from {:?}", path))?
        }
    };
    if state.is_empty() {
        anyhow::bail!(
            "❌ No column is assigned to a dimension.\n👉 Use 'fidelis config set' or 'fidelis template load' first."
        );
    }

    // C. Evaluate (Application Layer)
    let registry = ctx.config.registry();
    let runner = QualityRunner::new(
        ctx.accessor.clone(),
        ctx.store.clone(),
        ctx.config.reference.clone(),
    )
    .with_options(EvaluationOptions {
        include_row_details: args.details || json,
    })
    .with_registry(registry.clone());
    let run = runner
        .evaluate_all(&args.dataset, &state)
        .await
        .with_context(|| format!("Failed to evaluate dataset '{}'", args.dataset))?;

    // D. Report
    let report = build_report(run, &registry);
    let report_path = save_report(&report, &ctx.target_dir())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("\n{}", render_summary(&report));
        if args.details {
            print_details(&report);
        }
        println!(
            "\n📊 Overall score: {:.1}% (weighted {:.1}%) on {} rows",
            report.overall_score, report.weighted_score, report.total_rows
        );
        println!("📄 Report saved to {}", report_path.display());
    }

    // E. Exit status for CI/CD
    if !report.success() {
        eprintln!(
            "\n❌ FAILURE. {} check(s) could not be evaluated:",
            report.failures.len()
        );
        for failure in &report.failures {
            eprintln!(
                "   ❌ {}:{} → {}",
                failure.dimension, failure.column, failure.error
            );
        }
        std::process::exit(1);
    }
    if let Some(threshold) = args.fail_under
        && report.overall_score < threshold
    {
        eprintln!(
            "\n💥 Overall score {:.1}% is below --fail-under {:.1}%",
            report.overall_score, threshold
        );
        std::process::exit(1);
    }

    if !json {
        println!("\n✨ SUCCESS! Evaluation finished in {:.2?}", start.elapsed());
    }
    Ok(())
}

fn score_cell(score: f64) -> Cell {
    let color = if score >= 95.0 {
        Color::Green
    } else if score >= 80.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{:.1}%", score))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

fn threshold_cell(result: &QualityCheckResult) -> Cell {
    match result.threshold_met() {
        Some(true) => Cell::new("✅").set_alignment(CellAlignment::Center),
        Some(false) => Cell::new("❌").set_alignment(CellAlignment::Center),
        None => Cell::new("-").set_alignment(CellAlignment::Center),
    }
}

/// One row per check, grouped by dimension, with a subtotal row per dimension.
pub fn render_summary(report: &QualityReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Dimension").add_attribute(Attribute::Bold),
            Cell::new("Column").add_attribute(Attribute::Bold),
            Cell::new("Passed").add_attribute(Attribute::Bold),
            Cell::new("Failed").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
            Cell::new("Threshold").add_attribute(Attribute::Bold),
        ]);

    for summary in &report.dimensions {
        for result in &summary.results {
            table.add_row(vec![
                Cell::new(result.dimension()),
                Cell::new(result.column()),
                Cell::new(result.passed()).set_alignment(CellAlignment::Right),
                Cell::new(result.failed()).set_alignment(CellAlignment::Right),
                score_cell(result.score()),
                threshold_cell(result),
            ]);
        }
        if summary.results.len() > 1 {
            table.add_row(vec![
                Cell::new(&summary.dimension).add_attribute(Attribute::Bold),
                Cell::new("(all columns)").add_attribute(Attribute::Dim),
                Cell::new(""),
                Cell::new(""),
                score_cell(summary.score).add_attribute(Attribute::Bold),
                Cell::new(""),
            ]);
        }
    }
    table
}

fn print_details(report: &QualityReport) {
    for result in report.dimensions.iter().flat_map(|d| &d.results) {
        if result.failed() == 0 {
            continue;
        }
        println!("\n🔎 {} ({} failing rows)", result.id(), result.failed());
        for detail in result.failures().take(MAX_DETAIL_ROWS) {
            let reason = detail
                .reason
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            println!(
                "   ➜ row {}: {:?} {}",
                detail.row_index + 1,
                detail.value,
                reason
            );
        }
        if result.failed() > MAX_DETAIL_ROWS {
            println!("   ... {} more", result.failed() - MAX_DETAIL_ROWS);
        }
    }
}
