use crate::error::Result;
use crate::reports::{
    artifact_summary, completeness_distribution, quality_groups, year_coverage, yearly_fuel_totals,
};
use crate::taxonomy::FuelTaxonomy;
use crate::types::{CompletenessRecord, DistributionRow, QualityRow, YearAggregate};
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Pretty-print `value` to `path`, creating parent directories.
///
/// The JSON goes to a sibling temp file first and is renamed into place, so
/// a failed write never leaves a truncated artifact behind.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let s = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, s)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Console report over the full completeness list.
pub fn print_completeness_report(records: &[CompletenessRecord], preview_rows: usize) {
    println!("=== Data Completeness Analysis ===\n");
    println!("Total countries: {}\n", format_int(records.len()));

    println!("Data completeness distribution:\n");
    let rows: Vec<DistributionRow> = completeness_distribution(records)
        .into_iter()
        .map(|b| DistributionRow {
            level: b.label.to_string(),
            countries: format_int(b.count),
            share: format!("{}%", format_number(b.share, 1)),
        })
        .collect();
    preview_table_rows(&rows, rows.len());

    println!("Year coverage:");
    match year_coverage(records) {
        Some(cov) => {
            println!("  First year: {}", cov.first_year);
            println!("  Last year: {}", cov.last_year);
            println!(
                "  Average countries with data per year: {}\n",
                format_number(cov.avg_countries_per_year, 1)
            );
        }
        None => println!("  (no years with data)\n"),
    }

    println!("=== Data Quality Groups ===\n");
    for group in quality_groups(records) {
        println!("{} ({} countries):\n", group.tier.label(), format_int(group.members.len()));
        let rows: Vec<QualityRow> = group
            .members
            .iter()
            .map(|m| QualityRow {
                country: m.name.clone(),
                completeness: format!("{}%", format_number(m.completeness, 1)),
                years: m.years,
                consumption: format_number(m.consumption, 2),
            })
            .collect();
        preview_table_rows(&rows, preview_rows);
    }
}

/// Console summary of the written artifact, including the per-year fuel
/// totals for its last few years.
pub fn print_artifact_summary(years: &[YearAggregate], taxonomy: &FuelTaxonomy, trend_rows: usize) {
    let summary = artifact_summary(years);
    println!("=== Final Data Summary ===\n");
    println!("Countries included: {}", format_int(summary.countries));
    match summary.span {
        Some((first, last)) => println!("Time range: {} - {}", first, last),
        None => println!("Time range: (empty)"),
    }
    println!("Total data points: {}", format_int(summary.data_points));
    println!(
        "Average countries per year: {}\n",
        format_number(summary.avg_countries_per_year, 1)
    );

    let totals = yearly_fuel_totals(years, taxonomy);
    if totals.is_empty() {
        return;
    }
    println!("Consumption by fuel (TWh, most recent years):\n");
    let mut builder = Builder::default();
    builder.push_record(std::iter::once("Year".to_string()).chain(taxonomy.labels().map(str::to_string)));
    let skip = totals.len().saturating_sub(trend_rows);
    for t in totals.iter().skip(skip) {
        builder.push_record(
            std::iter::once(t.year.to_string()).chain(t.totals.0.iter().map(|(_, v)| format_number(*v, 1))),
        );
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
