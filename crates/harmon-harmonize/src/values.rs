//! Harmonizing the values of a single labelled variable.

use harmon_model::{ColumnData, MissingRule, ValueLabel, Variable, normalize_label};

use crate::error::{HarmonizeError, Result};
use crate::crosswalk::{Crosswalk, UnlabeledPolicy};

/// Rewrites a labelled numeric column onto the crosswalk's harmonized scale.
///
/// Every observed code travels through its original value label: the label is
/// normalized, rewritten by the crosswalk rules, and resolved against the
/// code book and the reserved missing categories. Codes without a label, and
/// codes whose rewritten label stays unresolved, follow the unlabeled policy.
///
/// Returns the harmonized dictionary entry and column.
pub fn harmonize_values(
    variable: &Variable,
    column: &ColumnData,
    crosswalk: &Crosswalk,
) -> Result<(Variable, ColumnData)> {
    let Some(values) = column.as_numeric() else {
        return Err(HarmonizeError::NotNumeric {
            name: variable.name.clone(),
        });
    };

    // Original code -> harmonized code, via the label.
    let mappings: Vec<(f64, Option<i64>)> = variable
        .value_labels
        .iter()
        .map(|entry| {
            let harmonized = crosswalk.rewrite(&normalize_label(&entry.label));
            (entry.code, crosswalk.resolve(&harmonized))
        })
        .collect();

    let recoded: Vec<Option<f64>> = values
        .iter()
        .map(|cell| {
            let value = (*cell)?;
            match mappings.iter().find(|(code, _)| *code == value) {
                Some((_, Some(target))) => Some(*target as f64),
                Some((_, None)) | None => match crosswalk.options.unlabeled {
                    UnlabeledPolicy::Keep => Some(value),
                    UnlabeledPolicy::Missing => None,
                },
            }
        })
        .collect();

    Ok((harmonized_variable(variable, crosswalk), ColumnData::Numeric(recoded)))
}

/// Builds the dictionary entry of a harmonized variable: the crosswalk's code
/// book as value labels plus the reserved missing categories.
fn harmonized_variable(original: &Variable, crosswalk: &Crosswalk) -> Variable {
    let mut labels: Vec<ValueLabel> = crosswalk
        .codebook
        .iter()
        .map(|(label, code)| ValueLabel::new(*code as f64, label.clone()))
        .collect();
    let mut missing_codes: Vec<f64> = Vec::new();
    for kind in crosswalk.missing.values() {
        let code = kind.code() as f64;
        if !missing_codes.contains(&code) {
            labels.push(ValueLabel::new(code, kind.label()));
            missing_codes.push(code);
        }
    }
    labels.sort_by(|a, b| a.code.total_cmp(&b.code));
    labels.dedup_by(|a, b| a.code == b.code);
    missing_codes.sort_by(f64::total_cmp);

    let mut variable = Variable::numeric(&original.name);
    variable.label = original.label.clone();
    variable.value_labels = labels;
    variable.missing = MissingRule {
        codes: missing_codes,
        range: None,
    };
    variable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crosswalk::CrosswalkConfig;
    use std::path::Path;

    fn trust_crosswalk(unlabeled: &str) -> Crosswalk {
        let toml = format!(
            r#"
[[rules]]
pattern = "^tend to trust$"
replace = "trust"

[[rules]]
pattern = "^tend not to trust$"
replace = "not_trust"

[[rules]]
pattern = "^dk_na$"
replace = "dk"

[codebook]
trust = 1
not_trust = 0

[missing]
dk = "do_not_know"

[options]
unlabeled = "{unlabeled}"
"#
        );
        CrosswalkConfig::from_toml_str(&toml, Path::new("inline"))
            .unwrap()
            .compile()
            .unwrap()
    }

    fn trust_variable() -> Variable {
        let mut variable = Variable::numeric("qa10_1").with_label("TRUST: ARMY");
        variable.insert_value_label(1.0, "Tend to trust");
        variable.insert_value_label(2.0, "Tend not to trust");
        variable.insert_value_label(9.0, "DK/NA");
        variable
    }

    #[test]
    fn recodes_through_labels() {
        let crosswalk = trust_crosswalk("missing");
        let column = ColumnData::Numeric(vec![Some(1.0), Some(2.0), Some(9.0), None]);
        let (variable, recoded) =
            harmonize_values(&trust_variable(), &column, &crosswalk).unwrap();

        assert_eq!(
            recoded.as_numeric().unwrap(),
            &[Some(1.0), Some(0.0), Some(-1.0), None]
        );
        // Harmonized code book: -1 dk, 0 not_trust, 1 trust.
        let labels: Vec<(f64, &str)> = variable
            .value_labels
            .iter()
            .map(|entry| (entry.code, entry.label.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![(-1.0, "do_not_know"), (0.0, "not_trust"), (1.0, "trust")]
        );
        assert!(variable.missing.is_missing(-1.0));
        assert!(!variable.missing.is_missing(0.0));
    }

    #[test]
    fn unlabeled_policy_missing() {
        let crosswalk = trust_crosswalk("missing");
        // Code 7 has no value label.
        let column = ColumnData::Numeric(vec![Some(7.0)]);
        let (_, recoded) = harmonize_values(&trust_variable(), &column, &crosswalk).unwrap();
        assert_eq!(recoded.as_numeric().unwrap(), &[None]);
    }

    #[test]
    fn unlabeled_policy_keep() {
        let crosswalk = trust_crosswalk("keep");
        let column = ColumnData::Numeric(vec![Some(7.0)]);
        let (_, recoded) = harmonize_values(&trust_variable(), &column, &crosswalk).unwrap();
        assert_eq!(recoded.as_numeric().unwrap(), &[Some(7.0)]);
    }

    #[test]
    fn text_columns_are_rejected() {
        let crosswalk = trust_crosswalk("missing");
        let column = ColumnData::Text(vec![Some("NL".to_string())]);
        let variable = Variable::text("isocntry", 2);
        assert!(matches!(
            harmonize_values(&variable, &column, &crosswalk),
            Err(HarmonizeError::NotNumeric { .. })
        ));
    }
}
