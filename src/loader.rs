use crate::error::{Error, Result};
use crate::taxonomy::FuelTaxonomy;
use crate::types::{
    Cell, EnergyRow, EnergyTable, COUNTRY_COLUMN, PRIMARY_CONSUMPTION_COLUMN, YEAR_COLUMN,
};
use crate::util::{parse_f64_safe, parse_i32_safe};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
    pub unparsed_years: usize,
    pub missing_countries: usize,
}

pub fn load_table_from_path<P: AsRef<Path>>(
    path: P,
    taxonomy: &FuelTaxonomy,
) -> Result<(EnergyTable, LoadReport)> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading energy table");
    let file = std::fs::File::open(path)?;
    load_table(file, taxonomy)
}

/// Read a headered CSV and clean it in one pass.
///
/// Every taxonomy column present in the header, plus
/// `primary_energy_consumption`, is coerced to a [`Cell`]; anything missing
/// or unparseable becomes `0.0` with `reported = false`. Other columns are
/// dropped after their names are recorded.
pub fn load_table<R: Read>(reader: R, taxonomy: &FuelTaxonomy) -> Result<(EnergyTable, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let index_of = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    };
    let country_idx = index_of(COUNTRY_COLUMN)?;
    let year_idx = index_of(YEAR_COLUMN)?;
    let primary_idx = index_of(PRIMARY_CONSUMPTION_COLUMN)?;

    let mut numeric: Vec<(String, usize)> = vec![(PRIMARY_CONSUMPTION_COLUMN.to_string(), primary_idx)];
    for column in taxonomy.columns() {
        match headers.iter().position(|h| h == column) {
            Some(idx) => numeric.push((column.to_string(), idx)),
            None => warn!(column, "fuel column not found in input"),
        }
    }

    let mut report = LoadReport::default();
    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    loop {
        match rdr.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                report.total_rows += 1;
                report.parse_errors += 1;
                warn!(error = %e, "skipping unreadable CSV record");
                // A bad byte sequence does not stop the reader; an IO error does.
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    return Err(e.into());
                }
                continue;
            }
        }
        report.total_rows += 1;

        let country = record
            .get(country_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if country.is_none() {
            report.missing_countries += 1;
        }
        let year = parse_i32_safe(record.get(year_idx));
        if year.is_none() {
            report.unparsed_years += 1;
        }

        let cells = numeric
            .iter()
            .filter_map(|(name, idx)| {
                record
                    .get(*idx)
                    .map(|raw| (name.clone(), Cell::from_parsed(parse_f64_safe(Some(raw)))))
            })
            .collect();

        rows.push(EnergyRow { country, year, cells });
    }

    info!(
        rows = rows.len(),
        parse_errors = report.parse_errors,
        unparsed_years = report.unparsed_years,
        "energy table loaded"
    );
    Ok((EnergyTable::new(headers, rows), report))
}
