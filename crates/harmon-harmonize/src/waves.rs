//! Operations over whole collections of waves.

use harmon_model::{ColumnData, Survey, VarType, Variable, normalize_label};
use tracing::debug;

use crate::error::{HarmonizeError, Result};
use crate::crosswalk::{Crosswalk, MergeEntry};

/// Harmonizes every selected numeric variable in every wave.
///
/// Selection is by the crosswalk's `selection` regex against the variable
/// name and its normalized label; without a selection every labelled numeric
/// variable is harmonized. Text variables are never touched.
pub fn harmonize_waves(surveys: &[Survey], crosswalk: &Crosswalk) -> Result<Vec<Survey>> {
    surveys
        .iter()
        .map(|survey| harmonize_survey(survey, crosswalk))
        .collect()
}

fn harmonize_survey(survey: &Survey, crosswalk: &Crosswalk) -> Result<Survey> {
    let mut harmonized = survey.clone();
    for (variable, column) in survey.variables.iter().zip(&survey.columns) {
        if variable.var_type != VarType::Numeric || !variable.is_labelled() {
            continue;
        }
        let label_norm = variable
            .label
            .as_deref()
            .map_or_else(|| normalize_label(&variable.name), normalize_label);
        if !crosswalk.selects(&variable.name, &label_norm) {
            continue;
        }
        debug!(wave = %survey.id, variable = %variable.name, "harmonizing values");
        let (new_variable, new_column) =
            crate::values::harmonize_values(variable, column, crosswalk)?;
        harmonized.replace_column(&variable.name, new_variable, new_column)?;
    }
    Ok(harmonized)
}

/// Applies the crosswalk's rename plan: each wave is subset to the plan's
/// source variables and every source is renamed to its target.
///
/// Every wave must provide a source for every target.
pub fn merge_waves(surveys: &[Survey], plan: &[MergeEntry]) -> Result<Vec<Survey>> {
    surveys
        .iter()
        .map(|survey| merge_survey(survey, plan))
        .collect()
}

fn merge_survey(survey: &Survey, plan: &[MergeEntry]) -> Result<Survey> {
    let mut sources = Vec::with_capacity(plan.len());
    for entry in plan {
        let Some(source) = entry.sources.get(&survey.id) else {
            return Err(HarmonizeError::MissingPlanEntry {
                wave: survey.id.clone(),
                target: entry.target.clone(),
            });
        };
        sources.push(source.clone());
    }
    let mut merged = survey.keep_variables(&sources)?;
    for (entry, source) in plan.iter().zip(&sources) {
        if *source != entry.target {
            merged.rename_variable(source, &entry.target)?;
        }
    }
    debug!(wave = %survey.id, variables = plan.len(), "applied merge plan");
    Ok(merged)
}

/// Stacks waves into a single survey, with a leading `wave` text column
/// holding each row's wave identifier.
///
/// The variable union is taken in first-seen order; waves missing a variable
/// contribute system-missing cells. A variable whose type differs across
/// waves is an error.
pub fn bind_waves(surveys: &[Survey]) -> Result<Survey> {
    let total_rows: usize = surveys.iter().map(Survey::row_count).sum();

    let mut union: Vec<&Variable> = Vec::new();
    for survey in surveys {
        for variable in &survey.variables {
            match union.iter().find(|seen| seen.name == variable.name) {
                Some(seen) if seen.var_type != variable.var_type => {
                    return Err(HarmonizeError::TypeConflict {
                        name: variable.name.clone(),
                    });
                }
                Some(_) => {}
                None => union.push(variable),
            }
        }
    }

    let mut bound = Survey::new("bound", "");
    let mut wave_cells = Vec::with_capacity(total_rows);
    let mut wave_width = 0;
    for survey in surveys {
        wave_width = wave_width.max(survey.id.len());
        wave_cells.extend(std::iter::repeat_n(Some(survey.id.clone()), survey.row_count()));
    }
    bound.push_column(
        Variable::text("wave", wave_width).with_label("Wave identifier"),
        ColumnData::Text(wave_cells),
    )?;

    for variable in union {
        let column = match variable.var_type {
            VarType::Numeric => {
                let mut cells = Vec::with_capacity(total_rows);
                for survey in surveys {
                    match survey.column(&variable.name).and_then(ColumnData::as_numeric) {
                        Some(values) => cells.extend_from_slice(values),
                        None => cells.extend(std::iter::repeat_n(None, survey.row_count())),
                    }
                }
                ColumnData::Numeric(cells)
            }
            VarType::Text => {
                let mut cells = Vec::with_capacity(total_rows);
                for survey in surveys {
                    match survey.column(&variable.name).and_then(ColumnData::as_text) {
                        Some(values) => cells.extend(values.iter().cloned()),
                        None => cells.extend(std::iter::repeat_n(None, survey.row_count())),
                    }
                }
                ColumnData::Text(cells)
            }
        };
        bound.push_column(variable.clone(), column)?;
    }
    Ok(bound)
}

/// Borrows one wave by its identifier.
pub fn pull_survey<'a>(surveys: &'a [Survey], id: &str) -> Result<&'a Survey> {
    surveys
        .iter()
        .find(|survey| survey.id == id)
        .ok_or_else(|| HarmonizeError::UnknownSurvey { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crosswalk::CrosswalkConfig;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn wave(id: &str, trust_name: &str, rows: &[Option<f64>]) -> Survey {
        let mut survey = Survey::new(id, format!("{id}.sav"));
        let mut trust = Variable::numeric(trust_name).with_label("Trust in the army");
        trust.insert_value_label(1.0, "Tend to trust");
        trust.insert_value_label(2.0, "Tend not to trust");
        trust.insert_value_label(9.0, "DK");
        survey
            .push_column(trust, ColumnData::Numeric(rows.to_vec()))
            .unwrap();
        survey
            .push_column(
                Variable::text("isocntry", 2),
                ColumnData::Text(vec![Some("NL".to_string()); rows.len()]),
            )
            .unwrap();
        survey
    }

    fn crosswalk() -> Crosswalk {
        let toml = r#"
selection = "^trust"

[[rules]]
pattern = "^tend to trust$"
replace = "trust"

[[rules]]
pattern = "^tend not to trust$"
replace = "not_trust"

[codebook]
trust = 1
not_trust = 0

[missing]
dk = "do_not_know"
"#;
        CrosswalkConfig::from_toml_str(toml, Path::new("inline"))
            .unwrap()
            .compile()
            .unwrap()
    }

    #[test]
    fn harmonize_waves_recodes_selected_variables() {
        let waves = vec![
            wave("ZA5913", "qa10_1", &[Some(1.0), Some(9.0)]),
            wave("ZA6863", "qb8_3", &[Some(2.0), None]),
        ];
        // Selection matches the normalized label, not the name.
        let harmonized = harmonize_waves(&waves, &crosswalk()).unwrap();

        let first = harmonized[0].column("qa10_1").unwrap();
        assert_eq!(first.as_numeric().unwrap(), &[Some(1.0), Some(-1.0)]);
        let second = harmonized[1].column("qb8_3").unwrap();
        assert_eq!(second.as_numeric().unwrap(), &[Some(0.0), None]);

        // The text column passes through untouched.
        assert!(harmonized[0].column("isocntry").unwrap().as_text().is_some());
    }

    #[test]
    fn merge_waves_renames_per_wave_sources() {
        let waves = vec![
            wave("ZA5913", "qa10_1", &[Some(1.0)]),
            wave("ZA6863", "qb8_3", &[Some(2.0)]),
        ];
        let plan = vec![MergeEntry {
            target: "trust_army".to_string(),
            sources: BTreeMap::from([
                ("ZA5913".to_string(), "qa10_1".to_string()),
                ("ZA6863".to_string(), "qb8_3".to_string()),
            ]),
        }];
        let merged = merge_waves(&waves, &plan).unwrap();
        for survey in &merged {
            let names: Vec<&str> = survey.variable_names().collect();
            assert_eq!(names, vec!["trust_army"]);
        }
    }

    #[test]
    fn merge_waves_requires_every_wave() {
        let waves = vec![wave("ZA5913", "qa10_1", &[Some(1.0)])];
        let plan = vec![MergeEntry {
            target: "trust_army".to_string(),
            sources: BTreeMap::from([("ZA6863".to_string(), "qb8_3".to_string())]),
        }];
        assert!(matches!(
            merge_waves(&waves, &plan),
            Err(HarmonizeError::MissingPlanEntry { .. })
        ));
    }

    #[test]
    fn bind_waves_stacks_with_wave_column() {
        let mut second = wave("ZA6863", "trust_army", &[Some(2.0)]);
        second
            .push_column(
                Variable::numeric("age"),
                ColumnData::Numeric(vec![Some(34.0)]),
            )
            .unwrap();
        let waves = vec![wave("ZA5913", "trust_army", &[Some(1.0), Some(9.0)]), second];

        let bound = bind_waves(&waves).unwrap();
        assert_eq!(bound.row_count(), 3);
        let names: Vec<&str> = bound.variable_names().collect();
        assert_eq!(names, vec!["wave", "trust_army", "isocntry", "age"]);

        let wave_ids = bound.column("wave").unwrap().as_text().unwrap();
        assert_eq!(
            wave_ids,
            &[
                Some("ZA5913".to_string()),
                Some("ZA5913".to_string()),
                Some("ZA6863".to_string())
            ]
        );
        // The first wave has no age column, so its rows are missing.
        let age = bound.column("age").unwrap().as_numeric().unwrap();
        assert_eq!(age, &[None, None, Some(34.0)]);
    }

    #[test]
    fn bind_waves_rejects_type_conflicts() {
        let first = wave("ZA5913", "trust_army", &[Some(1.0)]);
        let mut second = Survey::new("ZA6863", "ZA6863.sav");
        second
            .push_column(
                Variable::text("trust_army", 8),
                ColumnData::Text(vec![Some("trust".to_string())]),
            )
            .unwrap();
        assert!(matches!(
            bind_waves(&[first, second]),
            Err(HarmonizeError::TypeConflict { .. })
        ));
    }

    #[test]
    fn pull_survey_by_id() {
        let waves = vec![
            wave("ZA5913", "qa10_1", &[Some(1.0)]),
            wave("ZA6863", "qb8_3", &[Some(2.0)]),
        ];
        assert_eq!(pull_survey(&waves, "ZA6863").unwrap().id, "ZA6863");
        assert!(matches!(
            pull_survey(&waves, "ZA9999"),
            Err(HarmonizeError::UnknownSurvey { .. })
        ));
    }
}
