//! Importing wave files into `Survey` values.

use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info};

use harmon_model::{ColumnData, MissingRule, Survey, Variable};
use harmon_sav::{LabelValue, SavDataset, SavValue, read_sav};

use crate::discovery::{WaveFormat, classify_path, discover_wave_files, wave_id_from_path};
use crate::error::{IngestError, Result};

/// Reads one wave file into a `Survey`, dispatching on the extension.
pub fn read_survey(path: &Path) -> Result<Survey> {
    let Some(format) = classify_path(path) else {
        return Err(IngestError::UnsupportedExtension {
            path: path.to_path_buf(),
        });
    };
    let survey = match format {
        WaveFormat::Sav => read_sav_survey(path)?,
        WaveFormat::Csv => read_csv_survey(path)?,
    };
    info!(
        wave = %survey.id,
        rows = survey.row_count(),
        variables = survey.column_count(),
        "imported wave"
    );
    Ok(survey)
}

/// Reads several wave files, preserving the given order.
pub fn read_surveys(paths: &[impl AsRef<Path>]) -> Result<Vec<Survey>> {
    paths.iter().map(|path| read_survey(path.as_ref())).collect()
}

/// Discovers and reads every wave file of a folder.
pub fn read_wave_folder(dir: &Path) -> Result<Vec<Survey>> {
    let files = discover_wave_files(dir)?;
    debug!(count = files.len(), dir = %dir.display(), "discovered wave files");
    files
        .iter()
        .map(|file| read_survey(&file.path))
        .collect()
}

fn read_sav_survey(path: &Path) -> Result<Survey> {
    let dataset = read_sav(path).map_err(|source| IngestError::SavRead {
        path: path.to_path_buf(),
        source,
    })?;
    survey_from_sav(path, &dataset)
}

/// Converts a parsed sav dataset into the survey model.
///
/// Fails when the dictionary carries duplicate variable names or a case's
/// cell count does not match the dictionary.
pub fn survey_from_sav(path: &Path, dataset: &SavDataset) -> Result<Survey> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();
    let mut survey = Survey::new(wave_id_from_path(path), filename);

    for (idx, sav_var) in dataset.variables.iter().enumerate() {
        let (variable, column) = if sav_var.is_numeric() {
            let mut variable = Variable::numeric(&sav_var.name);
            for (value, label) in &sav_var.value_labels {
                if let LabelValue::Number(code) = value {
                    variable.insert_value_label(*code, label.clone());
                }
            }
            variable.missing = MissingRule {
                codes: sav_var.missing.codes.clone(),
                range: sav_var.missing.range,
            };
            let values = dataset
                .cases
                .iter()
                .map(|case| case.get(idx).and_then(SavValue::as_number))
                .collect();
            (variable, ColumnData::Numeric(values))
        } else {
            let variable = Variable::text(&sav_var.name, sav_var.width);
            let values = dataset
                .cases
                .iter()
                .map(|case| {
                    case.get(idx)
                        .and_then(SavValue::as_text)
                        .filter(|text| !text.is_empty())
                        .map(str::to_string)
                })
                .collect();
            (variable, ColumnData::Text(values))
        };
        let variable = match &sav_var.label {
            Some(label) => variable.with_label(label.clone()),
            None => variable,
        };
        survey.push_column(variable, column)?;
    }
    Ok(survey)
}

fn read_csv_survey(path: &Path) -> Result<Survey> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| IngestError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(|header| header.trim().trim_matches('\u{feff}').to_string())
        .collect();
    if headers.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let mut cells: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?;
        let row: Vec<String> = (0..headers.len())
            .map(|idx| record.get(idx).unwrap_or("").trim().to_string())
            .collect();
        cells.push(row);
    }

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();
    let mut survey = Survey::new(wave_id_from_path(path), filename);

    for (col_idx, header) in headers.iter().enumerate() {
        let column_cells: Vec<&str> = cells.iter().map(|row| row[col_idx].as_str()).collect();
        let (variable, column) = build_csv_column(header, &column_cells);
        survey.push_column(variable, column)?;
    }
    Ok(survey)
}

/// Builds one column from csv cells, inferring a numeric column when every
/// non-empty cell parses as a number.
fn build_csv_column(header: &str, cells: &[&str]) -> (Variable, ColumnData) {
    let mut any_non_empty = false;
    let all_numeric = cells.iter().all(|cell| {
        if cell.is_empty() {
            true
        } else {
            any_non_empty = true;
            cell.parse::<f64>().is_ok()
        }
    });

    if all_numeric && any_non_empty {
        let values = cells
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    None
                } else {
                    cell.parse::<f64>().ok()
                }
            })
            .collect();
        (Variable::numeric(header), ColumnData::Numeric(values))
    } else {
        let width = cells.iter().map(|cell| cell.len()).max().unwrap_or(0);
        let values = cells
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    None
                } else {
                    Some((*cell).to_string())
                }
            })
            .collect();
        (Variable::text(header, width), ColumnData::Text(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_numeric_inference() {
        let (variable, column) = build_csv_column("age", &["34", "", "51"]);
        assert_eq!(variable.var_type, harmon_model::VarType::Numeric);
        assert_eq!(
            column.as_numeric().unwrap(),
            &[Some(34.0), None, Some(51.0)]
        );
    }

    #[test]
    fn csv_text_fallback() {
        let (variable, column) = build_csv_column("country", &["NL", "BE", ""]);
        assert_eq!(variable.var_type, harmon_model::VarType::Text);
        let values = column.as_text().unwrap();
        assert_eq!(values[0].as_deref(), Some("NL"));
        assert_eq!(values[2], None);
    }

    #[test]
    fn csv_all_empty_column_is_text() {
        let (variable, _) = build_csv_column("empty", &["", ""]);
        assert_eq!(variable.var_type, harmon_model::VarType::Text);
    }

    #[test]
    fn csv_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wave3.csv");
        std::fs::write(&path, "trust,isocntry\n1,NL\n2,BE\n,DE\n").unwrap();

        let survey = read_survey(&path).unwrap();
        assert_eq!(survey.id, "wave3");
        assert_eq!(survey.row_count(), 3);
        let trust = survey.column("trust").unwrap();
        assert_eq!(trust.as_numeric().unwrap()[2], None);
        let country = survey.column("isocntry").unwrap();
        assert_eq!(country.as_text().unwrap()[0].as_deref(), Some("NL"));
    }

    #[test]
    fn unsupported_extension() {
        let err = read_survey(Path::new("wave.rds")).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedExtension { .. }));
    }

    #[test]
    fn sav_duplicate_variable_names_are_an_error() {
        use harmon_sav::SavVariable;

        let mut dataset = SavDataset::new();
        dataset.variables.push(SavVariable::numeric("trust"));
        dataset.variables.push(SavVariable::numeric("trust"));
        dataset
            .cases
            .push(vec![SavValue::number(1.0), SavValue::number(2.0)]);

        // No column may be dropped silently; the duplicate must surface.
        let err = survey_from_sav(Path::new("dup.sav"), &dataset).unwrap_err();
        assert!(matches!(err, IngestError::Model(_)));
    }
}
