//! Per-variable metadata rows, the unit of the cross-wave metadata table.

use serde::{Deserialize, Serialize};

use crate::variable::{ValueLabel, VarType};

/// One row of the variable metadata table.
///
/// Collects everything needed to decide how a variable should be harmonized:
/// where it came from, its normalized label, and its code book split into
/// substantive and declared-missing categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableMetadata {
    /// Identifier of the wave the variable belongs to.
    pub survey_id: String,
    /// Source filename of the wave.
    pub filename: String,
    /// Variable name as found in the source file.
    pub var_name_orig: String,
    /// Normalized variable label (lowercase, underscore-separated).
    pub label_norm: String,
    /// Original variable label, untouched.
    pub label_orig: Option<String>,
    pub class: VarType,
    /// Substantive value labels.
    pub valid_labels: Vec<ValueLabel>,
    /// Value labels covered by the declared missing values.
    pub na_labels: Vec<ValueLabel>,
    /// Declared missing range, when present.
    pub na_range: Option<(f64, f64)>,
    pub n_labels: usize,
}

impl VariableMetadata {
    pub fn n_valid_labels(&self) -> usize {
        self.valid_labels.len()
    }

    pub fn n_na_labels(&self) -> usize {
        self.na_labels.len()
    }
}

/// Normalizes a label for matching across waves: lowercase, runs of
/// whitespace and punctuation collapsed to single underscores.
///
/// `"Trust in the Army (%)"` becomes `trust_in_the_army`.
pub fn normalize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_separator = false;
    for ch in label.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_separator = true;
        }
    }
    out
}

/// Heuristic for category labels that denote non-substantive answers even
/// when the file does not declare them missing.
pub fn looks_like_missing_label(label: &str) -> bool {
    let norm = normalize_label(label);
    matches!(
        norm.as_str(),
        "dk" | "dk_na"
            | "do_not_know"
            | "dont_know"
            | "don_t_know"
            | "refused"
            | "refusal"
            | "declined"
            | "no_answer"
            | "na"
            | "inap"
            | "inapplicable"
            | "not_applicable"
            | "not_asked"
    ) || norm.starts_with("inap_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_label_collapses_punctuation() {
        assert_eq!(
            normalize_label("Trust in the Army (%)"),
            "trust_in_the_army"
        );
        assert_eq!(normalize_label("  QA10_1 "), "qa10_1");
        assert_eq!(normalize_label("DK / NA"), "dk_na");
        assert_eq!(normalize_label(""), "");
    }

    #[test]
    fn missing_label_heuristics() {
        assert!(looks_like_missing_label("DK"));
        assert!(looks_like_missing_label("Don't know"));
        assert!(looks_like_missing_label("Refused"));
        assert!(looks_like_missing_label("Inap. (not asked)"));
        assert!(!looks_like_missing_label("Tend to trust"));
        assert!(!looks_like_missing_label("Not at all"));
    }

    #[test]
    fn metadata_serializes() {
        let row = VariableMetadata {
            survey_id: "w1".to_string(),
            filename: "wave1.sav".to_string(),
            var_name_orig: "qa10_1".to_string(),
            label_norm: "trust_in_institutions_army".to_string(),
            label_orig: Some("TRUST IN INSTITUTIONS: ARMY".to_string()),
            class: VarType::Numeric,
            valid_labels: vec![ValueLabel::new(1.0, "tend to trust")],
            na_labels: vec![ValueLabel::new(9.0, "dk")],
            na_range: None,
            n_labels: 2,
        };
        let json = serde_json::to_string(&row).expect("serialize metadata row");
        let round: VariableMetadata = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(round.var_name_orig, "qa10_1");
        assert_eq!(round.n_valid_labels(), 1);
        assert_eq!(round.n_na_labels(), 1);
    }
}
