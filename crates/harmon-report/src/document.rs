//! Per-wave documentation rows.

use harmon_model::{ColumnData, Survey};
use serde::Serialize;

/// One documentation row describing a wave.
#[derive(Debug, Clone, Serialize)]
pub struct WaveDocument {
    pub id: String,
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
    /// Number of variables that carry value labels.
    pub labelled_variables: usize,
    /// Estimated in-memory size of the column data, in bytes.
    pub memory_bytes: usize,
}

/// Documents a collection of waves, one row per wave.
pub fn document_waves(surveys: &[Survey]) -> Vec<WaveDocument> {
    surveys
        .iter()
        .map(|survey| WaveDocument {
            id: survey.id.clone(),
            filename: survey.filename.clone(),
            rows: survey.row_count(),
            columns: survey.column_count(),
            labelled_variables: survey
                .variables
                .iter()
                .filter(|variable| variable.is_labelled())
                .count(),
            memory_bytes: survey.columns.iter().map(column_bytes).sum(),
        })
        .collect()
}

fn column_bytes(column: &ColumnData) -> usize {
    match column {
        ColumnData::Numeric(values) => values.len() * std::mem::size_of::<Option<f64>>(),
        ColumnData::Text(values) => values
            .iter()
            .map(|cell| {
                std::mem::size_of::<Option<String>>() + cell.as_ref().map_or(0, String::len)
            })
            .sum(),
    }
}
