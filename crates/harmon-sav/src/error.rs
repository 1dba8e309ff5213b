//! Error types for sav file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing SPSS system files.
#[derive(Debug, Error)]
pub enum SavError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid sav file structure.
    #[error("invalid sav file: {message}")]
    InvalidFormat { message: String },

    /// Compressed variant this reader does not handle.
    #[error("unsupported sav file: {message}")]
    Unsupported { message: String },

    /// Read past the end of the file.
    #[error("record out of bounds at offset {offset}")]
    RecordOutOfBounds { offset: usize },

    /// Unknown dictionary record type.
    #[error("unknown dictionary record type {record_type} at offset {offset}")]
    UnknownRecord { record_type: i32, offset: usize },

    /// Value-label record references a continuation slot.
    #[error("value labels applied to continuation record at dictionary index {index}")]
    LabelOnContinuation { index: usize },

    /// Dictionary ended without a terminator record.
    #[error("dictionary terminator record missing")]
    MissingTerminator,

    /// Variable name must not be empty.
    #[error("variable name must not be empty")]
    EmptyVariableName,

    /// Duplicate variable name.
    #[error("duplicate variable name: {name}")]
    DuplicateVariable { name: String },

    /// String width the writer cannot represent.
    #[error("string width {width} for variable {name} exceeds 255 bytes")]
    StringWidthTooLarge { name: String, width: usize },

    /// More declared missing values than the dictionary record can hold.
    #[error("variable {name} declares more missing values than sav supports")]
    TooManyMissingValues { name: String },

    /// Row length mismatch.
    #[error("case length mismatch: expected {expected} values, got {actual}")]
    CaseLengthMismatch { expected: usize, actual: usize },

    /// Cell type does not match the variable's storage class.
    #[error("value for variable {name} does not match its type")]
    TypeMismatch { name: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SavError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an Unsupported error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Create a DuplicateVariable error.
    pub fn duplicate_variable(name: impl Into<String>) -> Self {
        Self::DuplicateVariable { name: name.into() }
    }
}

/// Result type alias for sav operations.
pub type Result<T> = std::result::Result<T, SavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SavError::invalid_format("bad magic");
        assert_eq!(format!("{err}"), "invalid sav file: bad magic");

        let err = SavError::unsupported("zlib compression");
        assert_eq!(format!("{err}"), "unsupported sav file: zlib compression");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let sav_err: SavError = io_err.into();
        assert!(matches!(sav_err, SavError::Io(_)));
    }
}
