//! SPSS system file (`.sav`) reader and writer.
//!
//! Supports layout-code-2 files: uncompressed and bytecode-compressed case
//! data, variable and value-label dictionary records, documents, long
//! variable names, and declared missing values. zsav (zlib) files are
//! detected and rejected.

mod compression;
mod dict;
mod error;
mod header;
mod raw;
mod reader;
mod types;
mod writer;

pub use error::{Result, SavError};
pub use reader::{SavReader, read_sav, read_sav_with_options};
pub use types::{
    LabelValue, SYSMIS, SavDataset, SavMissing, SavReaderOptions, SavValue, SavVariable,
    SavWriterOptions,
};
pub use writer::{SavWriter, write_sav, write_sav_with_options};
