use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported file extension: {path}")]
    UnsupportedExtension { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    SavRead {
        path: PathBuf,
        source: harmon_sav::SavError,
    },

    #[error("failed to read {path}: {source}")]
    CsvRead { path: PathBuf, source: csv::Error },

    #[error("csv file has no header row: {path}")]
    EmptyCsv { path: PathBuf },

    #[error(transparent)]
    Model(#[from] harmon_model::HarmonError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
