//! The in-memory survey container: one wave of data plus its dictionary.

use serde::{Deserialize, Serialize};

use crate::error::{HarmonError, Result};
use crate::variable::{VarType, Variable};

/// Column storage for one variable. `None` is the system-missing cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values")]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn var_type(&self) -> VarType {
        match self {
            Self::Numeric(_) => VarType::Numeric,
            Self::Text(_) => VarType::Text,
        }
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Self::Numeric(values) => Some(values),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            Self::Text(values) => Some(values),
            Self::Numeric(_) => None,
        }
    }
}

/// One survey wave: an identifier, the source filename, and parallel
/// variable/column vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survey {
    /// Wave identifier, typically derived from the source file stem.
    pub id: String,
    /// Source filename as imported.
    pub filename: String,
    pub variables: Vec<Variable>,
    pub columns: Vec<ColumnData>,
}

impl Survey {
    pub fn new(id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            variables: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, ColumnData::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Appends a variable and its column.
    ///
    /// Fails when the name is already taken or the column length does not
    /// match the existing rows.
    pub fn push_column(&mut self, variable: Variable, column: ColumnData) -> Result<()> {
        if self.variable_index(&variable.name).is_some() {
            return Err(HarmonError::duplicate_variable(&variable.name));
        }
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(HarmonError::ColumnLength {
                expected: self.row_count(),
                actual: column.len(),
            });
        }
        self.variables.push(variable);
        self.columns.push(column);
        Ok(())
    }

    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|var| var.name == name)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variable_index(name).map(|idx| &self.variables[idx])
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.variable_index(name).map(|idx| &self.columns[idx])
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|var| var.name.as_str())
    }

    /// Renames a variable in place.
    pub fn rename_variable(&mut self, from: &str, to: impl Into<String>) -> Result<()> {
        let to = to.into();
        if self.variable_index(&to).is_some() {
            return Err(HarmonError::duplicate_variable(to));
        }
        let Some(idx) = self.variable_index(from) else {
            return Err(HarmonError::unknown_variable(from));
        };
        self.variables[idx].name = to;
        Ok(())
    }

    /// Subsets the survey to the requested variables, in request order.
    pub fn keep_variables(&self, names: &[String]) -> Result<Survey> {
        let mut subset = Survey::new(self.id.clone(), self.filename.clone());
        for name in names {
            let Some(idx) = self.variable_index(name) else {
                return Err(HarmonError::unknown_variable(name));
            };
            subset
                .push_column(self.variables[idx].clone(), self.columns[idx].clone())?;
        }
        Ok(subset)
    }

    /// Replaces the column and dictionary entry for a variable.
    pub fn replace_column(
        &mut self,
        name: &str,
        variable: Variable,
        column: ColumnData,
    ) -> Result<()> {
        let Some(idx) = self.variable_index(name) else {
            return Err(HarmonError::unknown_variable(name));
        };
        if column.len() != self.row_count() {
            return Err(HarmonError::ColumnLength {
                expected: self.row_count(),
                actual: column.len(),
            });
        }
        self.variables[idx] = variable;
        self.columns[idx] = column;
        Ok(())
    }
}
