use crate::error::EntryError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use tabled::Tabled;

pub const COUNTRY_COLUMN: &str = "country";
pub const YEAR_COLUMN: &str = "year";
pub const PRIMARY_CONSUMPTION_COLUMN: &str = "primary_energy_consumption";

/// A cleaned numeric cell. Missing or unparseable input becomes `0.0`, but
/// `reported` remembers whether the source actually had a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub value: f64,
    pub reported: bool,
}

impl Cell {
    pub fn from_parsed(parsed: Option<f64>) -> Self {
        match parsed {
            Some(value) => Cell { value, reported: true },
            None => Cell { value: 0.0, reported: false },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnergyRow {
    pub country: Option<String>,
    pub year: Option<i32>,
    /// Keyed by source column name. A column is absent when the CSV record
    /// was shorter than the header.
    pub cells: HashMap<String, Cell>,
}

impl EnergyRow {
    pub fn cell(&self, column: &str) -> Option<Cell> {
        self.cells.get(column).copied()
    }

    pub fn value(&self, column: &str) -> f64 {
        self.cell(column).map(|c| c.value).unwrap_or(0.0)
    }

    pub fn is_reported(&self, column: &str) -> bool {
        self.cell(column).map(|c| c.reported).unwrap_or(false)
    }
}

/// The cleaned, read-only working table.
#[derive(Debug, Clone, Default)]
pub struct EnergyTable {
    columns: Vec<String>,
    rows: Vec<EnergyRow>,
}

impl EnergyTable {
    pub fn new(columns: Vec<String>, rows: Vec<EnergyRow>) -> Self {
        Self { columns, rows }
    }

    pub fn rows(&self) -> &[EnergyRow] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Smallest and largest parsed year, ignoring rows without one.
    pub fn year_span(&self) -> Option<YearRange> {
        let mut years = self.rows.iter().filter_map(|r| r.year);
        let first = years.next()?;
        let (min, max) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
        Some(YearRange::new(min, max))
    }
}

/// Inclusive range of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    /// Number of years in the range; zero when `start > end`.
    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            (self.end as i64 - self.start as i64 + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessRecord {
    pub country: String,
    pub year_completeness: f64,
    pub data_completeness: f64,
    pub latest_consumption: f64,
    pub years_covered: Vec<i32>,
    pub missing_years: Vec<i32>,
}

/// Fuel label to value, serialized as a JSON object in taxonomy order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergyBreakdown(pub Vec<(String, f64)>);

impl EnergyBreakdown {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, v)| *v)
    }

    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, v)| v).sum()
    }
}

impl Serialize for EnergyBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryEntry {
    pub name: String,
    pub total: f64,
    pub energy: EnergyBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearAggregate {
    pub year: i32,
    pub countries: Vec<CountryEntry>,
}

/// A country-year that could not be aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub year: i32,
    pub country: String,
    pub reason: EntryError,
}

#[derive(Debug, Clone, Tabled)]
pub struct DistributionRow {
    #[tabled(rename = "Completeness")]
    pub level: String,
    #[tabled(rename = "Countries")]
    pub countries: String,
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct QualityRow {
    #[tabled(rename = "Country")]
    pub country: String,
    #[tabled(rename = "Completeness")]
    pub completeness: String,
    #[tabled(rename = "YearsWithData")]
    pub years: usize,
    #[tabled(rename = "LatestConsumption (TWh)")]
    pub consumption: String,
}
