//! Crosswalk-driven harmonization of labelled survey variables across waves.
//!
//! The crate takes imported [`harmon_model::Survey`] waves and a TOML
//! crosswalk, rewrites category labels onto one harmonized scale, renames
//! per-wave variables to shared targets, and stacks waves into a single
//! survey with a wave identifier column.

mod crosswalk;
mod error;
mod values;
mod waves;

pub use crosswalk::{
    Crosswalk, CrosswalkConfig, CrosswalkOptions, HarmonizedMissing, MergeEntry,
    RewriteRule, RewriteRuleConfig, UnlabeledPolicy,
};
pub use error::{HarmonizeError, Result};
pub use harmon_model::normalize_label;
pub use values::harmonize_values;
pub use waves::{bind_waves, harmonize_waves, merge_waves, pull_survey};
