//! Variable metadata extraction (`metadata_create`).

use harmon_model::{
    Survey, ValueLabel, VariableMetadata, looks_like_missing_label, normalize_label,
};

/// Builds one metadata row per variable of a survey.
///
/// Value labels are partitioned into substantive and missing categories: a
/// label counts as missing when its code is covered by the declared missing
/// values or when the label text itself marks a non-substantive answer
/// ("DK", "refused", "inap.").
pub fn metadata_create(survey: &Survey) -> Vec<VariableMetadata> {
    survey
        .variables
        .iter()
        .map(|variable| {
            let mut valid_labels = Vec::new();
            let mut na_labels = Vec::new();
            for entry in &variable.value_labels {
                if variable.missing.is_missing(entry.code) || looks_like_missing_label(&entry.label)
                {
                    na_labels.push(ValueLabel::new(entry.code, entry.label.clone()));
                } else {
                    valid_labels.push(ValueLabel::new(entry.code, entry.label.clone()));
                }
            }
            VariableMetadata {
                survey_id: survey.id.clone(),
                filename: survey.filename.clone(),
                var_name_orig: variable.name.clone(),
                label_norm: normalize_label(variable.label.as_deref().unwrap_or(&variable.name)),
                label_orig: variable.label.clone(),
                class: variable.var_type,
                n_labels: variable.value_labels.len(),
                valid_labels,
                na_labels,
                na_range: variable.missing.range,
            }
        })
        .collect()
}

/// Concatenates metadata rows across several waves.
pub fn metadata_waves_create(surveys: &[Survey]) -> Vec<VariableMetadata> {
    surveys.iter().flat_map(metadata_create).collect()
}
