//! Survey to polars `DataFrame` conversion.

use harmon_model::{ColumnData, Survey};
use polars::prelude::{Column, DataFrame};

use crate::error::Result;

/// How declared missing values are carried into the data frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingHandling {
    /// Keep declared missing codes as ordinary values.
    #[default]
    Keep,
    /// Replace declared missing codes with null cells.
    MaskDeclared,
}

/// Converts a survey into a polars `DataFrame`.
///
/// Numeric columns become `Float64`, text columns `String`. System-missing
/// cells are null; declared missing codes are masked to null as well under
/// [`MissingHandling::MaskDeclared`].
pub fn survey_to_dataframe(survey: &Survey, missing: MissingHandling) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(survey.column_count());
    for (variable, column) in survey.variables.iter().zip(&survey.columns) {
        let name = variable.name.as_str();
        let column = match column {
            ColumnData::Numeric(values) => {
                let cells: Vec<Option<f64>> = values
                    .iter()
                    .map(|cell| match (missing, cell) {
                        (MissingHandling::MaskDeclared, Some(value))
                            if variable.missing.is_missing(*value) =>
                        {
                            None
                        }
                        _ => *cell,
                    })
                    .collect();
                Column::new(name.into(), cells)
            }
            ColumnData::Text(values) => Column::new(name.into(), values.clone()),
        };
        columns.push(column);
    }
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmon_model::{MissingRule, Variable};

    fn survey() -> Survey {
        let mut survey = Survey::new("w1", "w1.sav");
        survey
            .push_column(
                Variable::numeric("trust").with_missing(MissingRule::codes(vec![9.0])),
                ColumnData::Numeric(vec![Some(1.0), Some(9.0), None]),
            )
            .unwrap();
        survey
            .push_column(
                Variable::text("isocntry", 2),
                ColumnData::Text(vec![
                    Some("NL".to_string()),
                    None,
                    Some("BE".to_string()),
                ]),
            )
            .unwrap();
        survey
    }

    #[test]
    fn keeps_declared_missing_by_default() {
        let df = survey_to_dataframe(&survey(), MissingHandling::Keep).unwrap();
        assert_eq!(df.shape(), (3, 2));
        let trust = df.column("trust").unwrap();
        assert_eq!(trust.null_count(), 1);
    }

    #[test]
    fn masks_declared_missing_on_request() {
        let df = survey_to_dataframe(&survey(), MissingHandling::MaskDeclared).unwrap();
        let trust = df.column("trust").unwrap();
        // 9.0 is declared missing, plus one system missing cell.
        assert_eq!(trust.null_count(), 2);
        let country = df.column("isocntry").unwrap();
        assert_eq!(country.null_count(), 1);
    }
}
