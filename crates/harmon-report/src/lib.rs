//! Wave documentation, polars summaries, and file exports.

mod document;
mod error;
mod export;
mod frame;
mod stats;

pub use document::{WaveDocument, document_waves};
pub use error::{ReportError, Result};
pub use export::{write_csv, write_json, write_sav};
pub use frame::{MissingHandling, survey_to_dataframe};
pub use stats::{category_counts, group_means};
