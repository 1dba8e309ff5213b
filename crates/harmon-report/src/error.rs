use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },

    #[error("variable {name} is not numeric")]
    NotNumeric { name: String },

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),

    #[error("failed to write CSV {path}: {source}")]
    CsvWrite { path: PathBuf, source: csv::Error },

    #[error("failed to write JSON {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write sav file {path}: {source}")]
    SavWrite {
        path: PathBuf,
        source: harmon_sav::SavError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn unknown_variable(name: impl Into<String>) -> Self {
        Self::UnknownVariable { name: name.into() }
    }

    pub fn not_numeric(name: impl Into<String>) -> Self {
        Self::NotNumeric { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
