use crate::types::YearRange;
use std::path::PathBuf;

/// Fixed settings for the single pipeline run. There are no flags or config
/// files; `Default` is the whole configuration surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub range: YearRange,
    /// Shared threshold for year and data completeness, in percent.
    pub min_completeness: f64,
    /// Entries shown per quality group in the console report.
    pub preview_rows: usize,
    /// Most recent years shown in the fuel totals table.
    pub trend_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("owid-energy-data.csv"),
            output_path: PathBuf::from("public/data/energy_data.json"),
            range: YearRange::new(1965, 2023),
            min_completeness: 0.0,
            preview_rows: 5,
            trend_rows: 5,
        }
    }
}
