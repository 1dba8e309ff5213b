use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarmonError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },
    #[error("column length mismatch: expected {expected}, got {actual}")]
    ColumnLength { expected: usize, actual: usize },
    #[error("duplicate variable name: {name}")]
    DuplicateVariable { name: String },
    #[error("{0}")]
    Message(String),
}

impl HarmonError {
    pub fn unknown_variable(name: impl Into<String>) -> Self {
        Self::UnknownVariable { name: name.into() }
    }

    pub fn duplicate_variable(name: impl Into<String>) -> Self {
        Self::DuplicateVariable { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, HarmonError>;
