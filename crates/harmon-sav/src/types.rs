//! Core types for sav file handling.

use std::collections::BTreeMap;

/// System-missing numeric value (`-DBL_MAX` in SPSS terms).
pub const SYSMIS: f64 = -f64::MAX;

/// A single cell of case data.
#[derive(Debug, Clone, PartialEq)]
pub enum SavValue {
    /// Numeric cell; `None` is system missing.
    Number(Option<f64>),
    /// Text cell, trailing padding removed.
    Text(String),
}

impl SavValue {
    pub fn number(value: f64) -> Self {
        Self::Number(Some(value))
    }

    pub fn missing() -> Self {
        Self::Number(None)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => *value,
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Number(_) => None,
        }
    }
}

/// A value that a value label is attached to.
///
/// Numeric variables label `f64` codes; short string variables label raw
/// 8-byte tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelValue {
    Number(f64),
    Text(String),
}

/// Declared missing values of one variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavMissing {
    pub codes: Vec<f64>,
    pub range: Option<(f64, f64)>,
}

impl SavMissing {
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty() && self.range.is_none()
    }
}

/// One dictionary entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SavVariable {
    /// Variable name; the long name when the file carries one.
    pub name: String,
    /// 8-byte short name from the variable record.
    pub short_name: String,
    /// Optional variable label.
    pub label: Option<String>,
    /// String width in bytes; 0 for numeric variables.
    pub width: usize,
    /// Raw print format word from the variable record.
    pub print_format: u32,
    pub missing: SavMissing,
    /// Value labels in file order.
    pub value_labels: Vec<(LabelValue, String)>,
}

impl SavVariable {
    pub fn numeric(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            short_name: name.clone(),
            name,
            label: None,
            width: 0,
            print_format: 0,
            missing: SavMissing::default(),
            value_labels: Vec::new(),
        }
    }

    pub fn text(name: impl Into<String>, width: usize) -> Self {
        let name = name.into();
        Self {
            short_name: name.clone(),
            name,
            label: None,
            width,
            print_format: 0,
            missing: SavMissing::default(),
            value_labels: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_missing(mut self, missing: SavMissing) -> Self {
        self.missing = missing;
        self
    }

    #[must_use]
    pub fn with_value_label(mut self, value: LabelValue, label: impl Into<String>) -> Self {
        self.value_labels.push((value, label.into()));
        self
    }

    pub fn is_numeric(&self) -> bool {
        self.width == 0
    }

    /// Number of 8-byte data elements one case spends on this variable.
    pub fn segment_count(&self) -> usize {
        if self.width == 0 {
            1
        } else {
            self.width.div_ceil(8)
        }
    }
}

/// A parsed sav file: dictionary plus case data.
#[derive(Debug, Clone, Default)]
pub struct SavDataset {
    /// 64-byte file label, trimmed.
    pub file_label: String,
    /// Character encoding from the extension record, when present.
    pub encoding: Option<String>,
    /// Document record lines.
    pub documents: Vec<String>,
    /// Name of the weight variable, when the header declares one.
    pub weight_variable: Option<String>,
    pub variables: Vec<SavVariable>,
    /// Case data; one inner vector per case, one value per variable.
    pub cases: Vec<Vec<SavValue>>,
}

impl SavDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    pub fn variable(&self, name: &str) -> Option<&SavVariable> {
        self.variables.iter().find(|var| var.name == name)
    }

    /// Variables indexed by name.
    pub fn variable_map(&self) -> BTreeMap<&str, &SavVariable> {
        self.variables
            .iter()
            .map(|var| (var.name.as_str(), var))
            .collect()
    }
}

/// Options controlling the reader.
#[derive(Debug, Clone)]
pub struct SavReaderOptions {
    /// Trim trailing spaces from text cells.
    pub trim_strings: bool,
    /// Upper bound on cases to read; `None` reads everything.
    pub max_cases: Option<usize>,
}

impl Default for SavReaderOptions {
    fn default() -> Self {
        Self {
            trim_strings: true,
            max_cases: None,
        }
    }
}

/// Options controlling the writer.
#[derive(Debug, Clone)]
pub struct SavWriterOptions {
    /// Product string stamped into the header.
    pub product: String,
    /// File label (truncated to 64 bytes).
    pub file_label: String,
}

impl Default for SavWriterOptions {
    fn default() -> Self {
        Self {
            product: "@(#) SPSS DATA FILE - survey wave harmonizer".to_string(),
            file_label: String::new(),
        }
    }
}
