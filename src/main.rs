// Entry point and high-level pipeline flow.
//
// One fixed run, no flags:
// - load and clean `owid-energy-data.csv`,
// - score every country's completeness over 1965–2023,
// - group qualifying countries by year and write the JSON artifact,
// - print the completeness report and artifact summary to stdout.
// Logs go to stderr so the report stays readable.
mod aggregator;
mod analyzer;
mod config;
mod error;
mod filter;
mod loader;
mod output;
mod reports;
mod taxonomy;
mod types;
mod util;

use crate::aggregator::{AggregationOutput, YearAggregator};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::taxonomy::{KeywordClassifier, DEFAULT_TAXONOMY};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load, process and persist. Nothing is written unless processing succeeds.
fn run(config: &PipelineConfig) -> Result<AggregationOutput> {
    let taxonomy = &*DEFAULT_TAXONOMY;
    let classifier = KeywordClassifier::default();
    for category in taxonomy.categories() {
        debug!(category = %category.name, fuels = category.fuels.len(), "fuel category");
    }

    let (table, load_report) =
        loader::load_table_from_path(&config.input_path, taxonomy).map_err(Error::initialization)?;
    if load_report.parse_errors > 0 || load_report.missing_countries > 0 {
        warn!(
            total_rows = load_report.total_rows,
            parse_errors = load_report.parse_errors,
            missing_countries = load_report.missing_countries,
            "some CSV records are incomplete"
        );
    }

    let out = YearAggregator::new(taxonomy, &classifier)
        .process(&table, config.range, config.min_completeness)
        .map_err(Error::processing)?;

    output::write_json(&config.output_path, &out.years).map_err(Error::processing)?;
    info!(path = %config.output_path.display(), years = out.years.len(), "artifact written");
    Ok(out)
}

fn main() -> ExitCode {
    init_tracing();
    let config = PipelineConfig::default();
    println!("Processing data file: {}\n", config.input_path.display());

    let out = match run(&config) {
        Ok(out) => out,
        Err(e) => {
            error!(error = %e, "pipeline failed");
            eprintln!("Processing failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    output::print_completeness_report(&out.completeness, config.preview_rows);
    if !out.skipped.is_empty() {
        println!("Skipped {} country-year entries:", util::format_int(out.skipped.len()));
        for s in &out.skipped {
            println!("  - {} {}: {}", s.country, s.year, s.reason);
        }
        println!();
    }
    println!("Data saved to: {}\n", config.output_path.display());
    output::print_artifact_summary(&out.years, &DEFAULT_TAXONOMY, config.trend_rows);
    ExitCode::SUCCESS
}
