// The two row filters of the pipeline. They are deliberately kept separate:
// the aggregator re-reads the raw table instead of reusing the analyzer's rows.
use crate::taxonomy::CountryClassifier;
use crate::types::{EnergyRow, EnergyTable, YearRange};
use std::collections::HashSet;

fn in_range(row: &EnergyRow, range: YearRange) -> bool {
    row.year.map(|y| range.contains(y)).unwrap_or(false)
}

/// Rows inside `range` whose country is a real country.
pub fn analysis_rows<'a, C>(table: &'a EnergyTable, range: YearRange, classifier: &C) -> Vec<&'a EnergyRow>
where
    C: CountryClassifier + ?Sized,
{
    table
        .rows()
        .iter()
        .filter(|r| in_range(r, range) && classifier.is_country(r.country.as_deref()))
        .collect()
}

/// Rows inside `range` for the selected countries. The classifier is applied
/// again so a selection list can never let an aggregate entity through.
pub fn aggregation_rows<'a, C>(
    table: &'a EnergyTable,
    range: YearRange,
    selected: &HashSet<String>,
    classifier: &C,
) -> Vec<&'a EnergyRow>
where
    C: CountryClassifier + ?Sized,
{
    table
        .rows()
        .iter()
        .filter(|r| in_range(r, range))
        .filter(|r| match r.country.as_deref() {
            Some(name) => selected.contains(name) && !classifier.is_aggregate(name),
            None => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_table;
    use crate::taxonomy::{KeywordClassifier, DEFAULT_TAXONOMY};

    fn table() -> EnergyTable {
        let csv = "country,year,primary_energy_consumption,oil_consumption\n\
                   Japan,1999,1,1\n\
                   Japan,2000,1,1\n\
                   World,2000,9,9\n\
                   ,2000,1,1\n\
                   Peru,,1,1\n\
                   Peru,2001,1,1\n";
        load_table(csv.as_bytes(), &DEFAULT_TAXONOMY).unwrap().0
    }

    fn names(rows: &[&EnergyRow]) -> Vec<(String, i32)> {
        rows.iter()
            .map(|r| (r.country.clone().unwrap_or_default(), r.year.unwrap_or_default()))
            .collect()
    }

    #[test]
    fn analysis_stage_drops_out_of_range_aggregates_and_blank_countries() {
        let t = table();
        let rows = analysis_rows(&t, YearRange::new(2000, 2001), &KeywordClassifier::default());
        assert_eq!(
            names(&rows),
            vec![("Japan".to_string(), 2000), ("Peru".to_string(), 2001)]
        );
    }

    #[test]
    fn aggregation_stage_requires_selection_and_reapplies_classifier() {
        let t = table();
        let selected: HashSet<String> = ["Japan", "World"].iter().map(|s| s.to_string()).collect();
        let rows = aggregation_rows(
            &t,
            YearRange::new(1999, 2001),
            &selected,
            &KeywordClassifier::default(),
        );
        assert_eq!(
            names(&rows),
            vec![("Japan".to_string(), 1999), ("Japan".to_string(), 2000)]
        );
    }
}
