//! The harmonization pipeline: recode, merge, and stack imported waves.

use anyhow::Result;
use harmon_harmonize::{Crosswalk, bind_waves, harmonize_waves, merge_waves};
use harmon_model::{Survey, VarType, normalize_label};
use tracing::info;

/// Per-wave outcome of a pipeline run.
pub struct WaveOutcome {
    pub id: String,
    pub rows: usize,
    /// Number of variables recoded by the crosswalk.
    pub harmonized: usize,
}

/// Result of a full pipeline run.
pub struct PipelineResult {
    pub waves: Vec<WaveOutcome>,
    /// Names the crosswalk actually recoded, after the rename plan.
    pub targets: Vec<String>,
    /// All waves stacked into one survey with a leading `wave` column.
    pub bound: Survey,
}

impl PipelineResult {
    /// Names of the recoded variables present in the bound survey.
    pub fn harmonized_targets(&self) -> Vec<&str> {
        self.targets.iter().map(String::as_str).collect()
    }
}

/// Runs harmonize, merge (when the crosswalk carries a rename plan), and
/// bind over a set of imported waves.
pub fn harmonize_pipeline(surveys: &[Survey], crosswalk: &Crosswalk) -> Result<PipelineResult> {
    let harmonized = harmonize_waves(surveys, crosswalk)?;
    let merged = if crosswalk.plan.is_empty() {
        harmonized
    } else {
        merge_waves(&harmonized, &crosswalk.plan)?
    };

    let mut waves = Vec::with_capacity(surveys.len());
    let mut targets: Vec<String> = Vec::new();
    for (original, wave) in surveys.iter().zip(&merged) {
        let selected = selected_names(original, crosswalk);
        for name in &selected {
            let target = if crosswalk.plan.is_empty() {
                Some(name.clone())
            } else {
                // A selected variable outside the plan is dropped by merge.
                crosswalk
                    .plan
                    .iter()
                    .find(|entry| entry.sources.get(&original.id) == Some(name))
                    .map(|entry| entry.target.clone())
            };
            if let Some(target) = target
                && !targets.contains(&target)
            {
                targets.push(target);
            }
        }
        waves.push(WaveOutcome {
            id: wave.id.clone(),
            rows: wave.row_count(),
            harmonized: selected.len(),
        });
    }

    let bound = bind_waves(&merged)?;
    info!(
        waves = waves.len(),
        rows = bound.row_count(),
        variables = bound.column_count(),
        "pipeline complete"
    );
    Ok(PipelineResult {
        waves,
        targets,
        bound,
    })
}

fn selected_names(survey: &Survey, crosswalk: &Crosswalk) -> Vec<String> {
    survey
        .variables
        .iter()
        .filter(|variable| {
            if variable.var_type != VarType::Numeric || !variable.is_labelled() {
                return false;
            }
            let label_norm = variable
                .label
                .as_deref()
                .map_or_else(|| normalize_label(&variable.name), normalize_label);
            crosswalk.selects(&variable.name, &label_norm)
        })
        .map(|variable| variable.name.clone())
        .collect()
}
