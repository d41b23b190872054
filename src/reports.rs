use crate::taxonomy::FuelTaxonomy;
use crate::types::{CompletenessRecord, EnergyBreakdown, YearAggregate};
use crate::util::percent;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct CompletenessBucket {
    pub label: &'static str,
    pub count: usize,
    pub share: f64,
}

/// Data-completeness levels, highest first. Lower bounds are inclusive.
const BUCKETS: [(&str, f64); 5] = [
    ("Complete (90-100%)", 90.0),
    ("Good (70-90%)", 70.0),
    ("Fair (50-70%)", 50.0),
    ("Poor (25-50%)", 25.0),
    ("Incomplete (0-25%)", f64::NEG_INFINITY),
];

pub fn completeness_distribution(records: &[CompletenessRecord]) -> Vec<CompletenessBucket> {
    let mut counts = [0usize; BUCKETS.len()];
    for r in records {
        let idx = BUCKETS
            .iter()
            .position(|(_, floor)| r.data_completeness >= *floor)
            .unwrap_or(BUCKETS.len() - 1);
        counts[idx] += 1;
    }
    BUCKETS
        .iter()
        .zip(counts)
        .map(|((label, _), count)| CompletenessBucket {
            label: *label,
            count,
            share: percent(count, records.len()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearCoverage {
    pub first_year: i32,
    pub last_year: i32,
    pub avg_countries_per_year: f64,
}

/// Span of years with any data and how many countries report per year.
pub fn year_coverage(records: &[CompletenessRecord]) -> Option<YearCoverage> {
    let mut per_year: BTreeMap<i32, usize> = BTreeMap::new();
    for r in records {
        for year in &r.years_covered {
            *per_year.entry(*year).or_default() += 1;
        }
    }
    let (&first_year, _) = per_year.first_key_value()?;
    let (&last_year, _) = per_year.last_key_value()?;
    let total: usize = per_year.values().sum();
    Some(YearCoverage {
        first_year,
        last_year,
        avg_countries_per_year: total as f64 / per_year.len() as f64,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    High,
    Good,
    Fair,
    Low,
}

impl QualityTier {
    pub fn for_completeness(completeness: f64) -> Self {
        if completeness >= 90.0 {
            QualityTier::High
        } else if completeness >= 70.0 {
            QualityTier::Good
        } else if completeness >= 50.0 {
            QualityTier::Fair
        } else {
            QualityTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityTier::High => "High quality",
            QualityTier::Good => "Good",
            QualityTier::Fair => "Fair",
            QualityTier::Low => "Low quality",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityMember {
    pub name: String,
    pub completeness: f64,
    pub years: usize,
    pub consumption: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityGroup {
    pub tier: QualityTier,
    pub members: Vec<QualityMember>,
}

/// All four tiers in order, members sorted by data completeness descending.
pub fn quality_groups(records: &[CompletenessRecord]) -> Vec<QualityGroup> {
    let mut groups: Vec<QualityGroup> = [QualityTier::High, QualityTier::Good, QualityTier::Fair, QualityTier::Low]
        .into_iter()
        .map(|tier| QualityGroup { tier, members: Vec::new() })
        .collect();
    for r in records {
        let tier = QualityTier::for_completeness(r.data_completeness);
        if let Some(group) = groups.iter_mut().find(|g| g.tier == tier) {
            group.members.push(QualityMember {
                name: r.country.clone(),
                completeness: r.data_completeness,
                years: r.years_covered.len(),
                consumption: r.latest_consumption,
            });
        }
    }
    for group in &mut groups {
        group
            .members
            .sort_by(|a, b| b.completeness.partial_cmp(&a.completeness).unwrap_or(Ordering::Equal));
    }
    groups
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSummary {
    pub countries: usize,
    pub span: Option<(i32, i32)>,
    pub data_points: usize,
    pub avg_countries_per_year: f64,
}

pub fn artifact_summary(years: &[YearAggregate]) -> ArtifactSummary {
    let countries: HashSet<&str> = years
        .iter()
        .flat_map(|y| y.countries.iter().map(|c| c.name.as_str()))
        .collect();
    let data_points: usize = years.iter().map(|y| y.countries.len()).sum();
    let span = match (years.first(), years.last()) {
        (Some(first), Some(last)) => Some((first.year, last.year)),
        _ => None,
    };
    let avg_countries_per_year = if years.is_empty() {
        0.0
    } else {
        data_points as f64 / years.len() as f64
    };
    ArtifactSummary {
        countries: countries.len(),
        span,
        data_points,
        avg_countries_per_year,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearFuelTotals {
    pub year: i32,
    pub totals: EnergyBreakdown,
}

/// Sum of each fuel across every country in each year.
pub fn yearly_fuel_totals(years: &[YearAggregate], taxonomy: &FuelTaxonomy) -> Vec<YearFuelTotals> {
    years
        .iter()
        .map(|y| {
            let totals: Vec<(String, f64)> = taxonomy
                .labels()
                .map(|label| {
                    let sum: f64 = y.countries.iter().filter_map(|c| c.energy.get(label)).sum();
                    (label.to_string(), sum)
                })
                .collect();
            YearFuelTotals {
                year: y.year,
                totals: EnergyBreakdown(totals),
            }
        })
        .collect()
}
