use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarmonizeError {
    #[error("invalid crosswalk pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("failed to read crosswalk file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse crosswalk file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("variable {name} is not numeric and cannot be value-harmonized")]
    NotNumeric { name: String },

    #[error("wave {wave} has no source for target variable {target}")]
    MissingPlanEntry { wave: String, target: String },

    #[error("variable {name} has conflicting types across waves")]
    TypeConflict { name: String },

    #[error("no survey with id {id}")]
    UnknownSurvey { id: String },

    #[error(transparent)]
    Model(#[from] harmon_model::HarmonError),
}

pub type Result<T> = std::result::Result<T, HarmonizeError>;
