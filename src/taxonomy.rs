// Static configuration shared by the analyzer and the aggregator: which fuel
// columns exist and which country names are really aggregates.
use once_cell::sync::Lazy;

/// One fuel type: the label used in output and the CSV column it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuelType {
    pub label: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuelCategory {
    pub name: String,
    pub fuels: Vec<FuelType>,
}

impl FuelCategory {
    /// Build a category from `(label, column)` pairs.
    pub fn new(name: &str, fuels: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            fuels: fuels
                .iter()
                .map(|(label, column)| FuelType {
                    label: label.to_string(),
                    column: column.to_string(),
                })
                .collect(),
        }
    }
}

/// Two-level fuel mapping, category then fuel type, iterated in declaration
/// order everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuelTaxonomy {
    categories: Vec<FuelCategory>,
}

impl FuelTaxonomy {
    pub fn new(categories: Vec<FuelCategory>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[FuelCategory] {
        &self.categories
    }

    pub fn fuels(&self) -> impl Iterator<Item = &FuelType> {
        self.categories.iter().flat_map(|c| c.fuels.iter())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fuels().map(|f| f.column.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fuels().map(|f| f.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.fuels().count()
    }
}

pub static DEFAULT_TAXONOMY: Lazy<FuelTaxonomy> = Lazy::new(|| {
    FuelTaxonomy::new(vec![
        FuelCategory::new(
            "fossil_fuels",
            &[
                ("oil", "oil_consumption"),
                ("coal", "coal_consumption"),
                ("gas", "gas_consumption"),
            ],
        ),
        FuelCategory::new("nuclear", &[("nuclear", "nuclear_consumption")]),
        FuelCategory::new(
            "renewables",
            &[
                ("hydro", "hydro_consumption"),
                ("wind", "wind_consumption"),
                ("solar", "solar_consumption"),
                ("biofuel", "biofuel_consumption"),
            ],
        ),
    ])
});

/// Substrings marking regions, income groups and other non-country rows.
/// Known to be imprecise in both directions: "Reunion" matches "Union" and
/// "American Samoa" matches "America".
///
/// Keywords match as literal text. `(EI)` therefore only matches names that
/// contain the parenthesised marker; a regex alternation over the same list
/// would treat it as a group and also exclude any name containing "ei"
/// (e.g. "Liechtenstein").
pub const DEFAULT_EXCLUDE_KEYWORDS: &[&str] = &[
    "World",
    "OECD",
    "Asia",
    "Europe",
    "America",
    "Africa",
    "income",
    "EU",
    "Union",
    "Region",
    "Statistical",
    "International",
    "CIS",
    "Middle East",
    "(EI)",
    "Bunkers",
    "FSU",
    "USSR",
    "aggregate",
];

/// Decides whether a `country` value names an aggregate entity rather than a
/// country.
pub trait CountryClassifier {
    fn is_aggregate(&self, name: &str) -> bool;

    /// Rows with no country at all are never treated as countries.
    fn is_country(&self, name: Option<&str>) -> bool {
        match name {
            Some(n) => !self.is_aggregate(n),
            None => false,
        }
    }
}

/// Case-insensitive substring match against a keyword list.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDE_KEYWORDS)
    }
}

impl CountryClassifier for KeywordClassifier {
    fn is_aggregate(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.keywords.iter().any(|k| name.contains(k.as_str()))
    }
}
