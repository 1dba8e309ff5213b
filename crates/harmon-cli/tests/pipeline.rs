//! Integration tests for the pipeline module.

use std::collections::BTreeMap;
use std::path::Path;

use harmon_cli::pipeline::harmonize_pipeline;
use harmon_harmonize::{Crosswalk, CrosswalkConfig};
use harmon_model::{ColumnData, Survey, Variable};
use harmon_report::{MissingHandling, category_counts, document_waves, survey_to_dataframe};

const CROSSWALK: &str = r#"
selection = "trust"

[[rules]]
pattern = "^tend to trust$"
replace = "trust"

[[rules]]
pattern = "^tend not to trust$"
replace = "not_trust"

[[rules]]
pattern = "^(dk|dk_na)$"
replace = "do_not_know"

[codebook]
trust = 1
not_trust = 0

[missing]
do_not_know = "do_not_know"

[[variables]]
target = "trust_army"
[variables.sources]
ZA5913 = "qa10_1"
ZA6863 = "qb8_3"
"#;

fn crosswalk() -> Crosswalk {
    CrosswalkConfig::from_toml_str(CROSSWALK, Path::new("inline"))
        .unwrap()
        .compile()
        .unwrap()
}

fn wave(id: &str, name: &str, dk_label: &str, rows: Vec<Option<f64>>) -> Survey {
    let mut survey = Survey::new(id, format!("{id}.sav"));
    let mut trust = Variable::numeric(name).with_label("Trust in the army");
    trust.insert_value_label(1.0, "Tend to trust");
    trust.insert_value_label(2.0, "Tend not to trust");
    trust.insert_value_label(9.0, dk_label);
    let len = rows.len();
    survey
        .push_column(trust, ColumnData::Numeric(rows))
        .unwrap();
    survey
        .push_column(
            Variable::text("isocntry", 2),
            ColumnData::Text(vec![Some("NL".to_string()); len]),
        )
        .unwrap();
    survey
}

fn waves() -> Vec<Survey> {
    vec![
        wave("ZA5913", "qa10_1", "DK", vec![Some(1.0), Some(9.0), None]),
        wave("ZA6863", "qb8_3", "DK/NA", vec![Some(2.0), Some(1.0)]),
    ]
}

#[test]
fn pipeline_binds_harmonized_waves() {
    let result = harmonize_pipeline(&waves(), &crosswalk()).unwrap();

    assert_eq!(result.waves.len(), 2);
    assert_eq!(result.waves[0].id, "ZA5913");
    assert_eq!(result.waves[0].rows, 3);
    assert_eq!(result.waves[0].harmonized, 1);

    assert_eq!(result.bound.row_count(), 5);
    let names: Vec<&str> = result.bound.variable_names().collect();
    assert_eq!(names, vec!["wave", "trust_army"]);
    assert_eq!(result.harmonized_targets(), vec!["trust_army"]);

    let trust = result
        .bound
        .column("trust_army")
        .unwrap()
        .as_numeric()
        .unwrap();
    assert_eq!(trust, &[Some(1.0), Some(-1.0), None, Some(0.0), Some(1.0)]);
}

#[test]
fn pipeline_without_plan_keeps_all_variables() {
    let mut config = CrosswalkConfig::from_toml_str(CROSSWALK, Path::new("inline")).unwrap();
    config.variables.clear();
    let crosswalk = config.compile().unwrap();

    // Without a rename plan the waves keep their own variable names, so the
    // bound survey carries the union.
    let result = harmonize_pipeline(&waves(), &crosswalk).unwrap();
    let names: Vec<&str> = result.bound.variable_names().collect();
    assert_eq!(names, vec!["wave", "qa10_1", "isocntry", "qb8_3"]);
}

#[test]
fn bound_survey_reports_cleanly() {
    let result = harmonize_pipeline(&waves(), &crosswalk()).unwrap();

    let documents = document_waves(std::slice::from_ref(&result.bound));
    assert_eq!(documents[0].rows, 5);
    assert_eq!(documents[0].labelled_variables, 1);

    let frame = survey_to_dataframe(&result.bound, MissingHandling::MaskDeclared).unwrap();
    // -1 is declared missing in the harmonized dictionary.
    assert_eq!(frame.column("trust_army").unwrap().null_count(), 2);

    let counts = category_counts(&result.bound, "trust_army").unwrap();
    // do_not_know, not_trust, trust, plus the system-missing row.
    assert_eq!(counts.height(), 4);
}

#[test]
fn targets_cover_only_recoded_variables() {
    let mut config = CrosswalkConfig::from_toml_str(CROSSWALK, Path::new("inline")).unwrap();
    config.variables.clear();
    let crosswalk = config.compile().unwrap();

    // A labelled numeric variable outside the selection passes through
    // unharmonized and must not get a category table.
    let mut waves = waves();
    let mut age = Variable::numeric("age_group").with_label("Age of respondent");
    age.insert_value_label(1.0, "15-24");
    waves[0]
        .push_column(
            age,
            ColumnData::Numeric(vec![Some(1.0), Some(1.0), None]),
        )
        .unwrap();

    let result = harmonize_pipeline(&waves, &crosswalk).unwrap();
    assert_eq!(result.harmonized_targets(), vec!["qa10_1", "qb8_3"]);
    assert_eq!(result.waves[0].harmonized, 1);
}

#[test]
fn missing_plan_entry_is_an_error() {
    let mut config = CrosswalkConfig::from_toml_str(CROSSWALK, Path::new("inline")).unwrap();
    config.variables[0].sources = BTreeMap::from([("ZA5913".to_string(), "qa10_1".to_string())]);
    let crosswalk = config.compile().unwrap();

    assert!(harmonize_pipeline(&waves(), &crosswalk).is_err());
}
