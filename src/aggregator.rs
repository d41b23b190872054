use crate::analyzer::CompletenessAnalyzer;
use crate::error::{EntryError, Result};
use crate::filter::aggregation_rows;
use crate::taxonomy::{CountryClassifier, FuelTaxonomy};
use crate::types::{
    CompletenessRecord, CountryEntry, EnergyBreakdown, EnergyRow, EnergyTable, SkippedEntry,
    YearAggregate, YearRange,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationOutput {
    /// Ascending by year; years without any surviving country are omitted.
    pub years: Vec<YearAggregate>,
    /// The analyzer's full report, not reduced by the threshold.
    pub completeness: Vec<CompletenessRecord>,
    /// Country-years that could not be computed.
    pub skipped: Vec<SkippedEntry>,
}

/// Groups qualifying countries' consumption by year, ranked by total.
pub struct YearAggregator<'a> {
    taxonomy: &'a FuelTaxonomy,
    classifier: &'a dyn CountryClassifier,
}

impl<'a> YearAggregator<'a> {
    pub fn new(taxonomy: &'a FuelTaxonomy, classifier: &'a dyn CountryClassifier) -> Self {
        Self { taxonomy, classifier }
    }

    pub fn process(&self, table: &EnergyTable, range: YearRange, min_completeness: f64) -> Result<AggregationOutput> {
        let completeness =
            CompletenessAnalyzer::new(self.taxonomy, self.classifier).analyze(table, Some(range))?;
        let selected = qualifying_countries(&completeness, min_completeness);
        info!(
            analysed = completeness.len(),
            selected = selected.len(),
            min_completeness,
            "selected countries for aggregation"
        );

        let rows = aggregation_rows(table, range, &selected, self.classifier);
        let mut by_year: BTreeMap<i32, BTreeMap<&str, Vec<&EnergyRow>>> = BTreeMap::new();
        for row in rows {
            if let (Some(year), Some(country)) = (row.year, row.country.as_deref()) {
                by_year.entry(year).or_default().entry(country).or_default().push(row);
            }
        }

        let mut years = Vec::new();
        let mut skipped = Vec::new();
        for (year, countries) in by_year {
            let mut entries = Vec::new();
            for (country, rows) in countries {
                match self.country_entry(country, year, &rows) {
                    Ok(Some(entry)) => entries.push(entry),
                    Ok(None) => debug!(country, year, "dropping zero-consumption entry"),
                    Err(reason) => {
                        warn!(country, year, %reason, "skipping country-year");
                        skipped.push(SkippedEntry {
                            year,
                            country: country.to_string(),
                            reason,
                        });
                    }
                }
            }
            if entries.is_empty() {
                continue;
            }
            entries.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
            years.push(YearAggregate { year, countries: entries });
        }

        info!(
            years = years.len(),
            entries = years.iter().map(|y| y.countries.len()).sum::<usize>(),
            skipped = skipped.len(),
            "aggregation done"
        );
        Ok(AggregationOutput { years, completeness, skipped })
    }

    /// Build one country-year from its rows. The first row wins if the input
    /// repeats a country-year. `Ok(None)` means nothing was consumed.
    fn country_entry(
        &self,
        country: &str,
        year: i32,
        rows: &[&EnergyRow],
    ) -> std::result::Result<Option<CountryEntry>, EntryError> {
        if rows.len() > 1 {
            debug!(country, year, rows = rows.len(), "duplicate rows, using the first");
        }
        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let mut energy = Vec::with_capacity(self.taxonomy.len());
        for fuel in self.taxonomy.fuels() {
            let cell = row
                .cell(&fuel.column)
                .ok_or_else(|| EntryError::MissingField(fuel.column.clone()))?;
            if !cell.value.is_finite() {
                return Err(EntryError::NonFinite {
                    field: fuel.column.clone(),
                    value: cell.value,
                });
            }
            energy.push((fuel.label.clone(), cell.value));
        }

        let energy = EnergyBreakdown(energy);
        let total = energy.total();
        if total <= 0.0 {
            return Ok(None);
        }
        Ok(Some(CountryEntry {
            name: country.to_string(),
            total,
            energy,
        }))
    }
}

/// Countries whose year and data completeness both reach `min_completeness`.
pub fn qualifying_countries(records: &[CompletenessRecord], min_completeness: f64) -> HashSet<String> {
    records
        .iter()
        .filter(|r| r.year_completeness >= min_completeness && r.data_completeness >= min_completeness)
        .map(|r| r.country.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_table;
    use crate::taxonomy::{KeywordClassifier, DEFAULT_TAXONOMY};
    use crate::types::Cell;

    const HEADER: &str = "country,year,primary_energy_consumption,oil_consumption,coal_consumption,gas_consumption,nuclear_consumption,hydro_consumption,wind_consumption,solar_consumption,biofuel_consumption";

    fn table(body: &str) -> EnergyTable {
        let csv = format!("{}\n{}", HEADER, body);
        load_table(csv.as_bytes(), &DEFAULT_TAXONOMY).unwrap().0
    }

    fn process(t: &EnergyTable, range: YearRange, min: f64) -> AggregationOutput {
        let classifier = KeywordClassifier::default();
        YearAggregator::new(&DEFAULT_TAXONOMY, &classifier)
            .process(t, range, min)
            .unwrap()
    }

    fn names(year: &YearAggregate) -> Vec<&str> {
        year.countries.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn single_country_two_years() {
        let t = table(
            "Testland,2000,10,10,0,0,0,0,0,0,0\n\
             Testland,2001,5,5,0,0,0,0,0,0,0\n",
        );
        let out = process(&t, YearRange::new(2000, 2001), 0.0);
        assert_eq!(out.years.len(), 2);
        assert_eq!(out.years[0].year, 2000);
        assert_eq!(out.years[0].countries[0].name, "Testland");
        assert_eq!(out.years[0].countries[0].total, 10.0);
        assert_eq!(out.years[1].countries[0].total, 5.0);
        assert_eq!(out.years[1].countries[0].energy.get("oil"), Some(5.0));
        assert_eq!(out.completeness[0].year_completeness, 100.0);
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn countries_ranked_by_total_and_years_ascending() {
        let t = table(
            "Chile,2001,0,1,1,0,0,0,0,0,0\n\
             Peru,2001,0,5,0,0,0,0,0,0,0\n\
             Chile,2000,0,9,0,0,0,0,0,0,0\n\
             Peru,2000,0,1,0,0,0,0,0,0,0\n\
             Nepal,2000,0,0,0,0,0,3,0,0,0\n",
        );
        let out = process(&t, YearRange::new(2000, 2001), 0.0);
        let years: Vec<i32> = out.years.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2000, 2001]);
        assert_eq!(names(&out.years[0]), vec!["Chile", "Nepal", "Peru"]);
        assert_eq!(names(&out.years[1]), vec!["Peru", "Chile"]);
        assert_eq!(out.years[1].countries[1].total, 2.0);
    }

    #[test]
    fn zero_total_entries_are_dropped_even_when_qualifying() {
        let t = table(
            "Chile,2000,0,0,0,0,0,0,0,0,0\n\
             Chile,2001,0,4,0,0,0,0,0,0,0\n\
             Nepal,2000,0,,,,,,,,\n",
        );
        let out = process(&t, YearRange::new(2000, 2001), 0.0);
        assert_eq!(out.years.len(), 1);
        assert_eq!(out.years[0].year, 2001);
        assert!(out.completeness.iter().any(|r| r.country == "Nepal"));
    }

    #[test]
    fn threshold_applies_to_both_axes() {
        let t = table(
            "Full,2000,0,1,1,1,1,1,1,1,1\n\
             Full,2001,0,1,1,1,1,1,1,1,1\n\
             HalfYears,2000,0,1,1,1,1,1,1,1,1\n\
             HalfData,2000,0,1,1,1,1,,,,\n\
             HalfData,2001,0,1,1,1,1,,,,\n",
        );
        let out = process(&t, YearRange::new(2000, 2001), 60.0);
        let included: Vec<&str> = out.years.iter().flat_map(|y| names(y)).collect();
        assert_eq!(included, vec!["Full", "Full"]);
        assert_eq!(out.completeness.len(), 3);

        let out = process(&t, YearRange::new(2000, 2001), 50.0);
        assert_eq!(names(&out.years[0]), vec!["Full", "HalfYears", "HalfData"]);
    }

    #[test]
    fn aggregate_entities_never_reach_the_output() {
        let t = table(
            "World,2000,0,100,0,0,0,0,0,0,0\n\
             Peru,2000,0,1,0,0,0,0,0,0,0\n",
        );
        let out = process(&t, YearRange::new(2000, 2000), 0.0);
        assert_eq!(names(&out.years[0]), vec!["Peru"]);
        assert!(out.completeness.iter().all(|r| r.country != "World"));
    }

    #[test]
    fn gap_years_are_absent_not_zero_filled() {
        let t = table(
            "Peru,2000,0,1,0,0,0,0,0,0,0\n\
             Peru,2002,0,2,0,0,0,0,0,0,0\n",
        );
        let out = process(&t, YearRange::new(2000, 2002), 0.0);
        let years: Vec<i32> = out.years.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2000, 2002]);
    }

    #[test]
    fn malformed_rows_are_skipped_and_reported() {
        let t = table(
            "Peru,2000,0,1,0,0,0,0,0,0,0\n\
             Chile,2000,0,3,0\n\
             Chile,2001,0,3,0,0,0,0,0,0,0\n",
        );
        let out = process(&t, YearRange::new(2000, 2001), 0.0);
        assert_eq!(names(&out.years[0]), vec!["Peru"]);
        assert_eq!(names(&out.years[1]), vec!["Chile"]);
        assert_eq!(
            out.skipped,
            vec![SkippedEntry {
                year: 2000,
                country: "Chile".to_string(),
                reason: EntryError::MissingField("gas_consumption".to_string()),
            }]
        );
    }

    #[test]
    fn non_finite_values_are_skipped_and_reported() {
        let mut columns: Vec<String> = vec!["country".into(), "year".into()];
        columns.extend(DEFAULT_TAXONOMY.columns().map(str::to_string));
        let row = |country: &str, oil: f64| EnergyRow {
            country: Some(country.to_string()),
            year: Some(2000),
            cells: DEFAULT_TAXONOMY
                .columns()
                .map(|c| {
                    let value = if c == "oil_consumption" { oil } else { 0.0 };
                    (c.to_string(), Cell { value, reported: true })
                })
                .collect(),
        };
        let t = EnergyTable::new(columns, vec![row("Peru", 2.0), row("Chile", f64::INFINITY)]);

        let out = process(&t, YearRange::new(2000, 2000), 0.0);
        assert_eq!(names(&out.years[0]), vec!["Peru"]);
        assert_eq!(out.skipped.len(), 1);
        assert!(matches!(
            out.skipped[0].reason,
            EntryError::NonFinite { ref field, .. } if field == "oil_consumption"
        ));
    }

    #[test]
    fn exponent_notation_values_count_toward_totals() {
        let t = table("Peru,2000,1,1e-05,2.5E+1,0,0,0,0,0,0\n");
        let out = process(&t, YearRange::new(2000, 2000), 0.0);
        assert_eq!(out.years.len(), 1);
        let peru = &out.years[0].countries[0];
        assert_eq!(peru.total, 1e-5 + 25.0);
        assert_eq!(peru.energy.get("coal"), Some(25.0));
        assert_eq!(out.completeness[0].data_completeness, 100.0);
    }

    #[test]
    fn duplicate_country_year_uses_first_row() {
        let t = table(
            "Peru,2000,0,1,0,0,0,0,0,0,0\n\
             Peru,2000,0,7,0,0,0,0,0,0,0\n",
        );
        let out = process(&t, YearRange::new(2000, 2000), 0.0);
        assert_eq!(out.years[0].countries.len(), 1);
        assert_eq!(out.years[0].countries[0].total, 1.0);
    }

    #[test]
    fn nothing_qualifying_is_an_empty_result() {
        let t = table("Peru,1990,0,1,0,0,0,0,0,0,0\n");
        let out = process(&t, YearRange::new(2000, 2001), 0.0);
        assert!(out.years.is_empty());
        assert!(out.completeness.is_empty());
    }

    #[test]
    fn repeated_runs_serialize_identically() {
        let t = table(
            "Chile,2000,0,1.5,2,0,0,0,0,0,0\n\
             Perú,2000,0,3,0,0,0,0,0,0,0\n",
        );
        let a = serde_json::to_string_pretty(&process(&t, YearRange::new(2000, 2000), 0.0).years).unwrap();
        let b = serde_json::to_string_pretty(&process(&t, YearRange::new(2000, 2000), 0.0).years).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("Perú"));
    }

    #[test]
    fn qualifying_requires_both_scores() {
        let record = |country: &str, y: f64, d: f64| CompletenessRecord {
            country: country.to_string(),
            year_completeness: y,
            data_completeness: d,
            latest_consumption: 0.0,
            years_covered: Vec::new(),
            missing_years: Vec::new(),
        };
        let records = vec![record("A", 80.0, 80.0), record("B", 80.0, 40.0), record("C", 50.0, 90.0)];
        let selected = qualifying_countries(&records, 50.0);
        assert!(selected.contains("A"));
        assert!(!selected.contains("B"));
        assert!(selected.contains("C"));
    }
}
