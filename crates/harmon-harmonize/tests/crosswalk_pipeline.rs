//! Full crosswalk run: load from disk, harmonize, merge, bind.

use harmon_harmonize::{CrosswalkConfig, bind_waves, harmonize_waves, merge_waves};
use harmon_model::{ColumnData, Survey, Variable};

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

fn wave(id: &str, name: &str, label: &str, dk_label: &str, rows: &[Option<f64>]) -> Survey {
    let mut survey = Survey::new(id, format!("{id}.sav"));
    let mut trust = Variable::numeric(name).with_label(label);
    trust.insert_value_label(1.0, "Tend to trust");
    trust.insert_value_label(2.0, "Tend not to trust");
    trust.insert_value_label(9.0, dk_label);
    survey
        .push_column(trust, ColumnData::Numeric(rows.to_vec()))
        .unwrap();
    survey
}

#[test]
fn harmonize_merge_bind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trust.toml");
    std::fs::write(&path, CROSSWALK).unwrap();
    let crosswalk = CrosswalkConfig::load(&path).unwrap().compile().unwrap();

    // Waves label the same question differently.
    let waves = vec![
        wave(
            "ZA5913",
            "qa10_1",
            "TRUST IN INSTITUTIONS: ARMY",
            "DK",
            &[Some(1.0), Some(9.0), None],
        ),
        wave(
            "ZA6863",
            "qb8_3",
            "Trust: the army",
            "DK/NA",
            &[Some(2.0), Some(1.0)],
        ),
    ];

    let harmonized = harmonize_waves(&waves, &crosswalk).unwrap();
    let merged = merge_waves(&harmonized, &crosswalk.plan).unwrap();
    let bound = bind_waves(&merged).unwrap();

    assert_eq!(bound.row_count(), 5);
    let names: Vec<&str> = bound.variable_names().collect();
    assert_eq!(names, vec!["wave", "trust_army"]);

    let trust = bound.column("trust_army").unwrap().as_numeric().unwrap();
    assert_eq!(
        trust,
        &[Some(1.0), Some(-1.0), None, Some(0.0), Some(1.0)]
    );

    // Both "DK" and "DK/NA" landed on the shared missing category.
    let variable = bound.variable("trust_army").unwrap();
    assert_eq!(variable.label_for(-1.0), Some("do_not_know"));
    assert!(variable.missing.is_missing(-1.0));
}
