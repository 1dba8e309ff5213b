//! Crosswalk specifications: the declarative description of how category
//! labels map onto one harmonized scale.
//!
//! A crosswalk is written as TOML:
//!
//! ```toml
//! selection = "^trust"
//!
//! [[rules]]
//! pattern = "^tend to trust$"
//! replace = "trust"
//!
//! [codebook]
//! trust = 1
//! not_trust = 0
//!
//! [missing]
//! dk = "do_not_know"
//!
//! [options]
//! unlabeled = "missing"
//!
//! [[variables]]
//! target = "trust_army"
//! [variables.sources]
//! ZA5913 = "qa10_1"
//! ZA6863 = "qb8_3"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HarmonizeError, Result};

/// Reserved harmonized codes for non-substantive answers.
///
/// Substantive codes are non-negative by construction; the missing
/// categories land on small negative codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonizedMissing {
    DoNotKnow,
    Declined,
    Inapplicable,
}

impl HarmonizedMissing {
    pub fn code(self) -> i64 {
        match self {
            Self::DoNotKnow => -1,
            Self::Declined => -2,
            Self::Inapplicable => -3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DoNotKnow => "do_not_know",
            Self::Declined => "declined",
            Self::Inapplicable => "inapplicable",
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::DoNotKnow, Self::Declined, Self::Inapplicable]
    }
}

/// What to do with observed codes the crosswalk does not cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlabeledPolicy {
    /// Turn unmapped codes into system missing.
    #[default]
    Missing,
    /// Pass unmapped codes through unchanged.
    Keep,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CrosswalkOptions {
    #[serde(default)]
    pub unlabeled: UnlabeledPolicy,
}

/// One regex rewrite applied to normalized labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteRuleConfig {
    pub pattern: String,
    pub replace: String,
}

/// One target variable of the merge plan with its per-wave source names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeEntry {
    pub target: String,
    #[serde(default)]
    pub sources: BTreeMap<String, String>,
}

/// The crosswalk file as written on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrosswalkConfig {
    /// Regex selecting the variables to harmonize (matched against variable
    /// names and normalized labels).
    #[serde(default)]
    pub selection: Option<String>,
    #[serde(default)]
    pub rules: Vec<RewriteRuleConfig>,
    /// Harmonized label to non-negative code.
    #[serde(default)]
    pub codebook: BTreeMap<String, i64>,
    /// Harmonized label to reserved missing category.
    #[serde(default)]
    pub missing: BTreeMap<String, HarmonizedMissing>,
    #[serde(default)]
    pub options: CrosswalkOptions,
    /// Optional per-wave rename plan.
    #[serde(default)]
    pub variables: Vec<MergeEntry>,
}

impl CrosswalkConfig {
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| HarmonizeError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| HarmonizeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Compiles the regex patterns.
    pub fn compile(&self) -> Result<Crosswalk> {
        let selection = match &self.selection {
            Some(pattern) => Some(compile_pattern(pattern)?),
            None => None,
        };
        let rules = self
            .rules
            .iter()
            .map(|rule| {
                Ok(RewriteRule {
                    regex: compile_pattern(&rule.pattern)?,
                    replace: rule.replace.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Crosswalk {
            selection,
            rules,
            codebook: self.codebook.clone(),
            missing: self.missing.clone(),
            options: self.options,
            plan: self.variables.clone(),
        })
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| HarmonizeError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// A compiled rewrite rule.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pub regex: Regex,
    pub replace: String,
}

/// A compiled crosswalk ready to apply.
#[derive(Debug, Clone)]
pub struct Crosswalk {
    pub selection: Option<Regex>,
    pub rules: Vec<RewriteRule>,
    pub codebook: BTreeMap<String, i64>,
    pub missing: BTreeMap<String, HarmonizedMissing>,
    pub options: CrosswalkOptions,
    pub plan: Vec<MergeEntry>,
}

impl Crosswalk {
    /// Applies the rewrite rules to an already-normalized label.
    ///
    /// Rules run in order; each rule rewrites the running result.
    pub fn rewrite(&self, normalized: &str) -> String {
        let mut current = normalized.to_string();
        for rule in &self.rules {
            current = rule
                .regex
                .replace_all(&current, rule.replace.as_str())
                .into_owned();
        }
        current
    }

    /// Resolves a harmonized label to its code.
    pub fn resolve(&self, harmonized_label: &str) -> Option<i64> {
        if let Some(kind) = self.missing.get(harmonized_label) {
            return Some(kind.code());
        }
        self.codebook.get(harmonized_label).copied()
    }

    /// Whether a variable (by name and normalized label) is selected.
    pub fn selects(&self, name: &str, normalized_label: &str) -> bool {
        match &self.selection {
            Some(regex) => regex.is_match(name) || regex.is_match(normalized_label),
            None => true,
        }
    }
}
