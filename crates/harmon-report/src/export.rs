//! Exports: CSV and JSON for data frames, sav for surveys.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use harmon_common::{any_to_f64, any_to_string};
use harmon_model::{ColumnData, Survey, VarType};
use harmon_sav::{LabelValue, SavDataset, SavMissing, SavValue, SavVariable};
use polars::prelude::{AnyValue, DataFrame};
use tracing::info;

use crate::error::{ReportError, Result};

/// Writes a data frame as CSV with a header row.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let map_err = |source| ReportError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(map_err)?;
    let names: Vec<&str> = df.get_column_names_str();
    writer.write_record(&names).map_err(map_err)?;
    for row in 0..df.height() {
        let record: Vec<String> = df
            .get_columns()
            .iter()
            .map(|column| any_to_string(column.get(row).unwrap_or(AnyValue::Null)))
            .collect();
        writer.write_record(&record).map_err(map_err)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = df.height(), "wrote CSV");
    Ok(())
}

/// Writes a data frame as a JSON array of row objects.
///
/// Null cells become JSON null, numeric cells numbers, everything else
/// strings.
pub fn write_json(df: &DataFrame, path: &Path) -> Result<()> {
    let names = df.get_column_names_str();
    let mut rows = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let mut object = serde_json::Map::with_capacity(names.len());
        for (name, column) in names.iter().zip(df.get_columns()) {
            let value = json_value(column.get(row).unwrap_or(AnyValue::Null));
            object.insert((*name).to_string(), value);
        }
        rows.push(serde_json::Value::Object(object));
    }
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, &rows).map_err(|source| ReportError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = df.height(), "wrote JSON");
    Ok(())
}

fn json_value(value: AnyValue<'_>) -> serde_json::Value {
    match value {
        AnyValue::Null => serde_json::Value::Null,
        AnyValue::String(s) => serde_json::Value::String(s.to_string()),
        AnyValue::StringOwned(s) => serde_json::Value::String(s.to_string()),
        AnyValue::Boolean(b) => serde_json::Value::Bool(b),
        other => match any_to_f64(other.clone()) {
            Some(number) => serde_json::Number::from_f64(number)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            None => serde_json::Value::String(any_to_string(other)),
        },
    }
}

/// Writes a survey back out as an SPSS system file, dictionary included.
pub fn write_sav(survey: &Survey, path: &Path) -> Result<()> {
    let dataset = survey_to_sav(survey);
    harmon_sav::write_sav(path, &dataset).map_err(|source| ReportError::SavWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = survey.row_count(), "wrote sav");
    Ok(())
}

fn survey_to_sav(survey: &Survey) -> SavDataset {
    let mut dataset = SavDataset::new();
    dataset.file_label = survey.id.clone();
    for (variable, column) in survey.variables.iter().zip(&survey.columns) {
        let mut sav_variable = match variable.var_type {
            VarType::Numeric => SavVariable::numeric(&variable.name),
            VarType::Text => {
                SavVariable::text(&variable.name, text_width(variable.width, column))
            }
        };
        if let Some(label) = &variable.label {
            sav_variable = sav_variable.with_label(label);
        }
        if !variable.missing.is_empty() {
            sav_variable = sav_variable.with_missing(SavMissing {
                codes: variable.missing.codes.clone(),
                range: variable.missing.range,
            });
        }
        for entry in &variable.value_labels {
            sav_variable =
                sav_variable.with_value_label(LabelValue::Number(entry.code), &entry.label);
        }
        dataset.variables.push(sav_variable);
    }

    for row in 0..survey.row_count() {
        let case: Vec<SavValue> = survey
            .columns
            .iter()
            .map(|column| match column {
                ColumnData::Numeric(values) => match values[row] {
                    Some(value) => SavValue::number(value),
                    None => SavValue::missing(),
                },
                ColumnData::Text(values) => {
                    SavValue::text(values[row].as_deref().unwrap_or(""))
                }
            })
            .collect();
        dataset.cases.push(case);
    }
    dataset
}

fn text_width(declared: usize, column: &ColumnData) -> usize {
    let observed = column
        .as_text()
        .map_or(0, |values| {
            values
                .iter()
                .map(|cell| cell.as_ref().map_or(0, String::len))
                .max()
                .unwrap_or(0)
        });
    declared.max(observed).clamp(1, 255)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmon_model::{MissingRule, Variable};
    use polars::prelude::Column;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("trust".into(), vec![Some(1.0), None]),
            Column::new(
                "isocntry".into(),
                vec![Some("NL".to_string()), Some("BE".to_string())],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&frame(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "trust,isocntry");
        assert_eq!(lines[1], "1,NL");
        assert_eq!(lines[2], ",BE");
    }

    #[test]
    fn json_rows_keep_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&frame(), &path).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["trust"], serde_json::json!(1.0));
        assert_eq!(rows[1]["trust"], serde_json::Value::Null);
        assert_eq!(rows[0]["isocntry"], serde_json::json!("NL"));
    }

    #[test]
    fn sav_roundtrip_keeps_dictionary() {
        let mut survey = Survey::new("ZA5913", "ZA5913.sav");
        let mut trust = Variable::numeric("trust_army")
            .with_label("Trust in the army")
            .with_missing(MissingRule::codes(vec![-1.0]));
        trust.insert_value_label(1.0, "trust");
        trust.insert_value_label(-1.0, "do_not_know");
        survey
            .push_column(trust, ColumnData::Numeric(vec![Some(1.0), None]))
            .unwrap();
        survey
            .push_column(
                Variable::text("isocntry", 2),
                ColumnData::Text(vec![Some("NL".to_string()), None]),
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sav");
        write_sav(&survey, &path).unwrap();

        let dataset = harmon_sav::read_sav(&path).unwrap();
        assert_eq!(dataset.variables.len(), 2);
        assert_eq!(dataset.variables[0].name, "trust_army");
        assert_eq!(
            dataset.variables[0].label.as_deref(),
            Some("Trust in the army")
        );
        assert!(dataset.variables[0].missing.codes.contains(&-1.0));
        assert_eq!(dataset.cases.len(), 2);
        assert_eq!(dataset.cases[1][0], SavValue::missing());
    }
}
