//! Grouped descriptive summaries over harmonized waves.

use std::collections::BTreeMap;

use harmon_common::format_numeric;
use harmon_model::{ColumnData, Survey, Variable};
use polars::prelude::{Column, DataFrame};
use tracing::debug;

use crate::error::{ReportError, Result};

/// Mean of the substantive codes of `value_vars`, per combination of
/// `group_vars`, in long format.
///
/// Declared missing codes and system-missing cells are excluded from both
/// the mean and the count. With a `weight` variable the mean is
/// `sum(w*x) / sum(w)`; rows whose weight is missing are excluded entirely.
///
/// Output columns: one per group variable (category labels where the group
/// variable is labelled), then `variable`, `mean`, `n`.
pub fn group_means(
    survey: &Survey,
    group_vars: &[String],
    value_vars: &[String],
    weight: Option<&str>,
) -> Result<DataFrame> {
    let groups: Vec<(&Variable, &ColumnData)> = group_vars
        .iter()
        .map(|name| lookup(survey, name))
        .collect::<Result<_>>()?;
    let values: Vec<(&Variable, &[Option<f64>])> = value_vars
        .iter()
        .map(|name| numeric_lookup(survey, name))
        .collect::<Result<_>>()?;
    let weights = weight.map(|name| numeric_lookup(survey, name)).transpose()?;

    // (group key, value-variable position) -> (sum of weights, weighted sum, n)
    let mut cells: BTreeMap<(Vec<String>, usize), (f64, f64, u32)> = BTreeMap::new();
    for row in 0..survey.row_count() {
        let w = match &weights {
            Some((_, column)) => match column[row] {
                Some(w) => w,
                None => continue,
            },
            None => 1.0,
        };
        let key: Vec<String> = groups
            .iter()
            .map(|(variable, column)| group_display(variable, column, row))
            .collect();
        for (idx, (variable, column)) in values.iter().enumerate() {
            let Some(value) = column[row] else { continue };
            if variable.missing.is_missing(value) {
                continue;
            }
            let entry = cells.entry((key.clone(), idx)).or_insert((0.0, 0.0, 0));
            entry.0 += w;
            entry.1 += w * value;
            entry.2 += 1;
        }
    }
    debug!(groups = cells.len(), "computed group means");

    let rows = cells.len();
    let mut group_columns: Vec<Vec<String>> = vec![Vec::with_capacity(rows); groups.len()];
    let mut variable_column = Vec::with_capacity(rows);
    let mut mean_column = Vec::with_capacity(rows);
    let mut n_column = Vec::with_capacity(rows);
    for ((key, idx), (sum_w, sum_wx, n)) in cells {
        for (column, cell) in group_columns.iter_mut().zip(key) {
            column.push(cell);
        }
        variable_column.push(values[idx].0.name.clone());
        mean_column.push(if sum_w == 0.0 { None } else { Some(sum_wx / sum_w) });
        n_column.push(n);
    }

    let mut columns = Vec::with_capacity(groups.len() + 3);
    for (name, cells) in group_vars.iter().zip(group_columns) {
        columns.push(Column::new(name.as_str().into(), cells));
    }
    columns.push(Column::new("variable".into(), variable_column));
    columns.push(Column::new("mean".into(), mean_column));
    columns.push(Column::new("n".into(), n_column));
    Ok(DataFrame::new(columns)?)
}

/// Frequency table of one labelled numeric variable.
///
/// Every label from the code book gets a row, declared missing categories
/// included, followed by observed unlabelled codes and a final row for
/// system-missing cells when any exist. Proportions are over all rows.
pub fn category_counts(survey: &Survey, name: &str) -> Result<DataFrame> {
    let (variable, values) = numeric_lookup(survey, name)?;
    let total = values.len();

    let mut observed: Vec<(f64, u32)> = Vec::new();
    let mut sysmis = 0u32;
    for cell in values {
        match cell {
            Some(value) => match observed.iter_mut().find(|(code, _)| code == value) {
                Some((_, count)) => *count += 1,
                None => observed.push((*value, 1)),
            },
            None => sysmis += 1,
        }
    }
    observed.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut codes: Vec<Option<f64>> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    let mut counts: Vec<u32> = Vec::new();
    for entry in &variable.value_labels {
        codes.push(Some(entry.code));
        labels.push(entry.label.clone());
        counts.push(
            observed
                .iter()
                .find(|(code, _)| *code == entry.code)
                .map_or(0, |(_, count)| *count),
        );
    }
    for (code, count) in &observed {
        if variable.label_for(*code).is_none() {
            codes.push(Some(*code));
            labels.push(format_numeric(*code));
            counts.push(*count);
        }
    }
    if sysmis > 0 {
        codes.push(None);
        labels.push(String::new());
        counts.push(sysmis);
    }

    let proportions: Vec<f64> = counts
        .iter()
        .map(|count| {
            if total == 0 {
                0.0
            } else {
                f64::from(*count) / total as f64
            }
        })
        .collect();
    Ok(DataFrame::new(vec![
        Column::new("code".into(), codes),
        Column::new("label".into(), labels),
        Column::new("count".into(), counts),
        Column::new("proportion".into(), proportions),
    ])?)
}

fn lookup<'a>(survey: &'a Survey, name: &str) -> Result<(&'a Variable, &'a ColumnData)> {
    let idx = survey
        .variable_index(name)
        .ok_or_else(|| ReportError::unknown_variable(name))?;
    Ok((&survey.variables[idx], &survey.columns[idx]))
}

fn numeric_lookup<'a>(survey: &'a Survey, name: &str) -> Result<(&'a Variable, &'a [Option<f64>])> {
    let (variable, column) = lookup(survey, name)?;
    let values = column
        .as_numeric()
        .ok_or_else(|| ReportError::not_numeric(name))?;
    Ok((variable, values))
}

fn group_display(variable: &Variable, column: &ColumnData, row: usize) -> String {
    match column {
        ColumnData::Numeric(values) => match values[row] {
            Some(value) => variable
                .label_for(value)
                .map_or_else(|| format_numeric(value), str::to_string),
            None => String::new(),
        },
        ColumnData::Text(values) => values[row].clone().unwrap_or_default(),
    }
}
