//! Variable definitions: storage class, value labels, and declared missing
//! values.

use serde::{Deserialize, Serialize};

/// Storage class of a survey variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    Numeric,
    Text,
}

impl VarType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
        }
    }
}

/// A single code-to-text mapping from a variable's code book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueLabel {
    pub code: f64,
    pub label: String,
}

impl ValueLabel {
    pub fn new(code: f64, label: impl Into<String>) -> Self {
        Self {
            code,
            label: label.into(),
        }
    }
}

/// Declared missing values for a variable.
///
/// SPSS allows up to three discrete codes, a range, or a range plus one
/// discrete code. The model does not enforce those limits; the sav writer
/// does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingRule {
    pub codes: Vec<f64>,
    pub range: Option<(f64, f64)>,
}

impl MissingRule {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn codes(codes: impl Into<Vec<f64>>) -> Self {
        Self {
            codes: codes.into(),
            range: None,
        }
    }

    pub fn range(low: f64, high: f64) -> Self {
        Self {
            codes: Vec::new(),
            range: Some((low, high)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty() && self.range.is_none()
    }

    /// Tests a numeric code against the declared missing values.
    pub fn is_missing(&self, value: f64) -> bool {
        if self.codes.iter().any(|code| *code == value) {
            return true;
        }
        match self.range {
            Some((low, high)) => value >= low && value <= high,
            None => false,
        }
    }
}

/// A survey variable: name, label, storage class, code book, and declared
/// missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name as it appears in the source file.
    pub name: String,
    /// Human-readable variable label, when the source carries one.
    pub label: Option<String>,
    pub var_type: VarType,
    /// Ordered code book. Empty for unlabelled variables.
    pub value_labels: Vec<ValueLabel>,
    pub missing: MissingRule,
    /// Byte width for text variables, 0 for numeric.
    pub width: usize,
}

impl Variable {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            var_type: VarType::Numeric,
            value_labels: Vec::new(),
            missing: MissingRule::none(),
            width: 0,
        }
    }

    pub fn text(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            label: None,
            var_type: VarType::Text,
            value_labels: Vec::new(),
            missing: MissingRule::none(),
            width,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_missing(mut self, missing: MissingRule) -> Self {
        self.missing = missing;
        self
    }

    /// Inserts a value label, replacing any existing label for the same code.
    pub fn insert_value_label(&mut self, code: f64, label: impl Into<String>) {
        let label = label.into();
        if let Some(existing) = self
            .value_labels
            .iter_mut()
            .find(|entry| entry.code == code)
        {
            existing.label = label;
        } else {
            self.value_labels.push(ValueLabel { code, label });
        }
    }

    /// Looks up the label for a numeric code.
    pub fn label_for(&self, code: f64) -> Option<&str> {
        self.value_labels
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.label.as_str())
    }

    pub fn is_labelled(&self) -> bool {
        !self.value_labels.is_empty()
    }
}
