use crate::error::{Error, Result};
use crate::filter::analysis_rows;
use crate::taxonomy::{CountryClassifier, FuelTaxonomy};
use crate::types::{
    CompletenessRecord, EnergyRow, EnergyTable, YearRange, PRIMARY_CONSUMPTION_COLUMN, YEAR_COLUMN,
};
use crate::util::{average, percent};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Scores how completely each country is covered over a year range.
pub struct CompletenessAnalyzer<'a> {
    taxonomy: &'a FuelTaxonomy,
    classifier: &'a dyn CountryClassifier,
}

impl<'a> CompletenessAnalyzer<'a> {
    pub fn new(taxonomy: &'a FuelTaxonomy, classifier: &'a dyn CountryClassifier) -> Self {
        Self { taxonomy, classifier }
    }

    /// One record per surviving country, best covered first.
    ///
    /// `range` defaults to the table's own min/max year. Ranking is by
    /// year completeness, then data completeness, then latest consumption,
    /// all descending; ties keep the order countries first appear in.
    pub fn analyze(&self, table: &EnergyTable, range: Option<YearRange>) -> Result<Vec<CompletenessRecord>> {
        self.check_columns(table)?;

        let Some(range) = range.or_else(|| table.year_span()) else {
            warn!("table has no parsable years; nothing to analyze");
            return Ok(Vec::new());
        };
        if range.is_empty() {
            warn!(start = range.start, end = range.end, "empty year range");
            return Ok(Vec::new());
        }

        let rows = analysis_rows(table, range, self.classifier);
        let mut records: Vec<CompletenessRecord> = group_by_country(&rows)
            .into_iter()
            .map(|(country, rows)| self.score(country, &rows, range))
            .collect();

        records.sort_by(|a, b| {
            cmp_desc(a.year_completeness, b.year_completeness)
                .then_with(|| cmp_desc(a.data_completeness, b.data_completeness))
                .then_with(|| cmp_desc(a.latest_consumption, b.latest_consumption))
        });

        info!(
            start = range.start,
            end = range.end,
            countries = records.len(),
            "completeness analysis done"
        );
        Ok(records)
    }

    fn check_columns(&self, table: &EnergyTable) -> Result<()> {
        let required = std::iter::once(YEAR_COLUMN).chain(self.taxonomy.columns());
        for column in required {
            if !table.has_column(column) {
                return Err(Error::MissingColumn(column.to_string()));
            }
        }
        Ok(())
    }

    fn score(&self, country: &str, rows: &[&EnergyRow], range: YearRange) -> CompletenessRecord {
        let covered: BTreeSet<i32> = rows.iter().filter_map(|r| r.year).collect();
        let missing_years: Vec<i32> = range.years().filter(|y| !covered.contains(y)).collect();

        let field_coverage: Vec<f64> = self
            .taxonomy
            .columns()
            .map(|column| {
                let reported = rows.iter().filter(|r| r.is_reported(column)).count();
                percent(reported, rows.len())
            })
            .collect();

        let latest_consumption = rows
            .iter()
            .find(|r| r.year == Some(range.end))
            .map(|r| r.value(PRIMARY_CONSUMPTION_COLUMN))
            .unwrap_or(0.0);

        let record = CompletenessRecord {
            country: country.to_string(),
            year_completeness: percent(covered.len(), range.len()),
            data_completeness: average(&field_coverage),
            latest_consumption,
            years_covered: covered.into_iter().collect(),
            missing_years,
        };
        debug!(
            country,
            year_completeness = record.year_completeness,
            data_completeness = record.data_completeness,
            "scored country"
        );
        record
    }
}

/// Group rows by country, keeping countries in first-seen order.
fn group_by_country<'r>(rows: &[&'r EnergyRow]) -> Vec<(&'r str, Vec<&'r EnergyRow>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&EnergyRow>)> = Vec::new();
    for &row in rows {
        let Some(country) = row.country.as_deref() else {
            continue;
        };
        let slot = *index.entry(country).or_insert_with(|| {
            groups.push((country, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }
    groups
}

fn cmp_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
