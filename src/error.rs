//! Error types for the energy report pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A column the pipeline depends on is not in the table header.
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    /// Loading or cleaning the input table failed; the run cannot start.
    #[error("initialization failed: {0}")]
    Initialization(Box<Error>),

    /// Analysis or aggregation failed; nothing is written.
    #[error("data processing failed: {0}")]
    Processing(Box<Error>),
}

impl Error {
    pub fn initialization(err: Error) -> Self {
        Error::Initialization(Box::new(err))
    }

    pub fn processing(err: Error) -> Self {
        Error::Processing(Box::new(err))
    }
}

/// Why a single country-year was left out of the aggregate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntryError {
    #[error("row has no `{0}` field")]
    MissingField(String),

    #[error("`{field}` is not a finite number ({value})")]
    NonFinite { field: String, value: f64 },
}
