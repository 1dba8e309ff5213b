//! End-to-end import of a mixed wave folder.

use harmon_ingest::{metadata_waves_create, read_wave_folder};
use harmon_sav::{LabelValue, SavDataset, SavMissing, SavValue, SavVariable, write_sav};

fn sample_sav() -> SavDataset {
    let mut dataset = SavDataset::new();
    dataset.variables.push(
        SavVariable::numeric("qa10_1")
            .with_label("TRUST IN INSTITUTIONS: ARMY")
            .with_missing(SavMissing {
                codes: vec![9.0],
                range: None,
            })
            .with_value_label(LabelValue::Number(1.0), "Tend to trust")
            .with_value_label(LabelValue::Number(2.0), "Tend not to trust")
            .with_value_label(LabelValue::Number(9.0), "DK"),
    );
    dataset
        .variables
        .push(SavVariable::text("isocntry", 4).with_label("COUNTRY CODE"));
    dataset.cases = vec![
        vec![SavValue::number(1.0), SavValue::text("NL")],
        vec![SavValue::number(9.0), SavValue::text("BE")],
        vec![SavValue::missing(), SavValue::text("NL")],
    ];
    dataset
}

#[test]
fn reads_mixed_folder_sorted() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_sav(&dir.path().join("ZA5913.sav"), &sample_sav()).expect("write sav");
    std::fs::write(
        dir.path().join("ZA6863.csv"),
        "qa10_1,isocntry\n2,FR\n1,IT\n",
    )
    .expect("write csv");

    let surveys = read_wave_folder(dir.path()).expect("read folder");
    assert_eq!(surveys.len(), 2);
    assert_eq!(surveys[0].id, "ZA5913");
    assert_eq!(surveys[1].id, "ZA6863");
    assert_eq!(surveys[0].row_count(), 3);
    assert_eq!(surveys[1].row_count(), 2);

    // The sav dictionary survives the import.
    let trust = surveys[0].variable("qa10_1").expect("trust variable");
    assert_eq!(trust.label_for(9.0), Some("DK"));
    assert!(trust.missing.is_missing(9.0));

    // System missing becomes a None cell.
    let column = surveys[0].column("qa10_1").unwrap();
    assert_eq!(column.as_numeric().unwrap()[2], None);
}

#[test]
fn metadata_across_waves() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_sav(&dir.path().join("w1.sav"), &sample_sav()).expect("write sav");
    write_sav(&dir.path().join("w2.sav"), &sample_sav()).expect("write sav");

    let surveys = read_wave_folder(dir.path()).expect("read folder");
    let rows = metadata_waves_create(&surveys);
    assert_eq!(rows.len(), 4);

    let trust_rows: Vec<_> = rows
        .iter()
        .filter(|row| row.var_name_orig == "qa10_1")
        .collect();
    assert_eq!(trust_rows.len(), 2);
    for row in trust_rows {
        assert_eq!(row.label_norm, "trust_in_institutions_army");
        assert_eq!(row.n_valid_labels(), 2);
        assert_eq!(row.n_na_labels(), 1);
    }
}
