//! Wave discovery, import, and metadata extraction.

pub mod discovery;
pub mod error;
pub mod metadata;
pub mod read;

pub use discovery::{WaveFile, WaveFormat, discover_wave_files, wave_id_from_path};
pub use error::{IngestError, Result};
pub use metadata::{metadata_create, metadata_waves_create};
pub use read::{read_survey, read_surveys, read_wave_folder, survey_from_sav};
