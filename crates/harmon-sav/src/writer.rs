//! sav file writer.
//!
//! Writes layout-code-2, uncompressed system files with long-name and
//! encoding extension records.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::dict::{EXT_ENCODING, EXT_LONG_NAMES};
use crate::error::{Result, SavError};
use crate::header::{COMPRESSION_NONE, build_header, encode_padded};
use crate::types::{LabelValue, SYSMIS, SavDataset, SavValue, SavVariable, SavWriterOptions};

/// sav file writer.
pub struct SavWriter<W: Write> {
    writer: BufWriter<W>,
    options: SavWriterOptions,
}

impl<W: Write> SavWriter<W> {
    /// Create a new sav writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options: SavWriterOptions::default(),
        }
    }

    /// Create a new sav writer with options.
    pub fn with_options(writer: W, options: SavWriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Write a dataset.
    pub fn write_dataset(mut self, dataset: &SavDataset) -> Result<()> {
        validate_dataset(dataset)?;
        let short_names = assign_short_names(&dataset.variables);

        let nominal_case_size: usize = dataset
            .variables
            .iter()
            .map(SavVariable::segment_count)
            .sum();
        let weight_index = weight_dict_index(dataset);

        let now = Local::now();
        let header = build_header(
            &self.options.product,
            &self.options.file_label,
            nominal_case_size as i32,
            COMPRESSION_NONE,
            weight_index,
            dataset.case_count() as i32,
            &now.format("%d %b %y").to_string(),
            &now.format("%H:%M:%S").to_string(),
        );
        self.writer.write_all(&header)?;

        for (variable, short_name) in dataset.variables.iter().zip(&short_names) {
            self.write_variable_records(variable, short_name)?;
        }

        self.write_value_label_records(dataset)?;
        self.write_long_names_record(dataset, &short_names)?;
        self.write_encoding_record()?;

        // Dictionary terminator.
        self.writer.write_all(&999i32.to_le_bytes())?;
        self.writer.write_all(&0i32.to_le_bytes())?;

        self.write_cases(dataset)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the type-2 record(s) for one variable, including continuation
    /// slots for long strings.
    fn write_variable_records(&mut self, variable: &SavVariable, short_name: &str) -> Result<()> {
        let width = variable.width as i32;
        self.writer.write_all(&2i32.to_le_bytes())?;
        self.writer.write_all(&width.to_le_bytes())?;
        let has_label = i32::from(variable.label.is_some());
        self.writer.write_all(&has_label.to_le_bytes())?;

        let (n_missing, missing_values) = encode_missing(variable)?;
        self.writer.write_all(&n_missing.to_le_bytes())?;

        let format = print_format(variable);
        self.writer.write_all(&format.to_le_bytes())?;
        self.writer.write_all(&format.to_le_bytes())?;
        self.writer.write_all(&encode_padded(short_name, 8))?;

        if let Some(label) = &variable.label {
            let bytes = label.as_bytes();
            let len = bytes.len().min(120);
            self.writer.write_all(&(len as i32).to_le_bytes())?;
            let padded = len.div_ceil(4) * 4;
            let mut buf = vec![b' '; padded];
            buf[..len].copy_from_slice(&bytes[..len]);
            self.writer.write_all(&buf)?;
        }

        for value in missing_values {
            self.writer.write_all(&value.to_le_bytes())?;
        }

        // Continuation slots for string segments beyond the first.
        for _ in 1..variable.segment_count() {
            self.writer.write_all(&2i32.to_le_bytes())?;
            self.writer.write_all(&(-1i32).to_le_bytes())?;
            self.writer.write_all(&0i32.to_le_bytes())?;
            self.writer.write_all(&0i32.to_le_bytes())?;
            self.writer.write_all(&0u32.to_le_bytes())?;
            self.writer.write_all(&0u32.to_le_bytes())?;
            self.writer.write_all(&[b' '; 8])?;
        }
        Ok(())
    }

    /// Writes a type-3/type-4 record pair per labelled variable.
    fn write_value_label_records(&mut self, dataset: &SavDataset) -> Result<()> {
        let mut dict_index = 1i32;
        for variable in &dataset.variables {
            if !variable.value_labels.is_empty() {
                self.writer.write_all(&3i32.to_le_bytes())?;
                self.writer
                    .write_all(&(variable.value_labels.len() as i32).to_le_bytes())?;
                for (value, label) in &variable.value_labels {
                    let raw = match value {
                        LabelValue::Number(number) => number.to_le_bytes(),
                        LabelValue::Text(text) => {
                            let padded = encode_padded(text, 8);
                            padded.try_into().expect("encode_padded returns 8 bytes")
                        }
                    };
                    self.writer.write_all(&raw)?;
                    let bytes = label.as_bytes();
                    let len = bytes.len().min(255);
                    self.writer.write_all(&[len as u8])?;
                    let padded = (len + 1).div_ceil(8) * 8 - 1;
                    let mut buf = vec![b' '; padded];
                    buf[..len].copy_from_slice(&bytes[..len]);
                    self.writer.write_all(&buf)?;
                }
                self.writer.write_all(&4i32.to_le_bytes())?;
                self.writer.write_all(&1i32.to_le_bytes())?;
                self.writer.write_all(&dict_index.to_le_bytes())?;
            }
            dict_index += variable.segment_count() as i32;
        }
        Ok(())
    }

    fn write_long_names_record(
        &mut self,
        dataset: &SavDataset,
        short_names: &[String],
    ) -> Result<()> {
        let pairs: Vec<String> = dataset
            .variables
            .iter()
            .zip(short_names)
            .map(|(variable, short)| format!("{short}={}", variable.name))
            .collect();
        let text = pairs.join("\t");
        self.write_extension(EXT_LONG_NAMES, text.as_bytes())
    }

    fn write_encoding_record(&mut self) -> Result<()> {
        self.write_extension(EXT_ENCODING, b"UTF-8")
    }

    fn write_extension(&mut self, subtype: i32, payload: &[u8]) -> Result<()> {
        self.writer.write_all(&7i32.to_le_bytes())?;
        self.writer.write_all(&subtype.to_le_bytes())?;
        self.writer.write_all(&1i32.to_le_bytes())?; // element size
        self.writer
            .write_all(&(payload.len() as i32).to_le_bytes())?;
        self.writer.write_all(payload)?;
        Ok(())
    }

    fn write_cases(&mut self, dataset: &SavDataset) -> Result<()> {
        for case in &dataset.cases {
            if case.len() != dataset.variables.len() {
                return Err(SavError::CaseLengthMismatch {
                    expected: dataset.variables.len(),
                    actual: case.len(),
                });
            }
            for (value, variable) in case.iter().zip(&dataset.variables) {
                match (value, variable.is_numeric()) {
                    (SavValue::Number(number), true) => {
                        let encoded = number.unwrap_or(SYSMIS);
                        self.writer.write_all(&encoded.to_le_bytes())?;
                    }
                    (SavValue::Text(text), false) => {
                        let padded = encode_padded(text, variable.segment_count() * 8);
                        self.writer.write_all(&padded)?;
                    }
                    _ => {
                        return Err(SavError::TypeMismatch {
                            name: variable.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl SavWriter<File> {
    /// Create a sav file for writing.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

/// Write a dataset to a sav file.
pub fn write_sav(path: &Path, dataset: &SavDataset) -> Result<()> {
    SavWriter::create(path)?.write_dataset(dataset)
}

/// Write a dataset with options.
pub fn write_sav_with_options(
    path: &Path,
    dataset: &SavDataset,
    options: &SavWriterOptions,
) -> Result<()> {
    let file = File::create(path)?;
    SavWriter::with_options(file, options.clone()).write_dataset(dataset)
}

/// Validate a dataset before writing.
fn validate_dataset(dataset: &SavDataset) -> Result<()> {
    let mut seen = BTreeSet::new();
    for variable in &dataset.variables {
        let name = variable.name.trim();
        if name.is_empty() {
            return Err(SavError::EmptyVariableName);
        }
        if !seen.insert(name.to_uppercase()) {
            return Err(SavError::duplicate_variable(name));
        }
        if variable.width > 255 {
            return Err(SavError::StringWidthTooLarge {
                name: variable.name.clone(),
                width: variable.width,
            });
        }
    }
    for case in &dataset.cases {
        if case.len() != dataset.variables.len() {
            return Err(SavError::CaseLengthMismatch {
                expected: dataset.variables.len(),
                actual: case.len(),
            });
        }
    }
    Ok(())
}

/// 1-based dictionary index of the weight variable, 0 when unweighted.
fn weight_dict_index(dataset: &SavDataset) -> i32 {
    let Some(weight_name) = &dataset.weight_variable else {
        return 0;
    };
    let mut index = 1i32;
    for variable in &dataset.variables {
        if variable.name == *weight_name {
            return index;
        }
        index += variable.segment_count() as i32;
    }
    0
}

/// Encodes the declared missing values of a variable.
///
/// Returns the record's count field and the trailing f64 values.
fn encode_missing(variable: &SavVariable) -> Result<(i32, Vec<f64>)> {
    let missing = &variable.missing;
    match missing.range {
        None => {
            if missing.codes.len() > 3 {
                return Err(SavError::TooManyMissingValues {
                    name: variable.name.clone(),
                });
            }
            Ok((missing.codes.len() as i32, missing.codes.clone()))
        }
        Some((low, high)) => {
            if missing.codes.len() > 1 {
                return Err(SavError::TooManyMissingValues {
                    name: variable.name.clone(),
                });
            }
            let mut values = vec![low, high];
            values.extend_from_slice(&missing.codes);
            Ok((-(values.len() as i32), values))
        }
    }
}

/// Builds the print-format word: F width.2 for numerics, A width for strings.
fn print_format(variable: &SavVariable) -> u32 {
    if variable.is_numeric() {
        // Format type 5 (F), width 8, two decimals.
        (5 << 16) | (8 << 8) | 2
    } else {
        // Format type 1 (A), string width.
        (1 << 16) | ((variable.width as u32) << 8)
    }
}

/// Derives unique 8-byte short names from the variable names.
fn assign_short_names(variables: &[SavVariable]) -> Vec<String> {
    let mut taken: BTreeSet<String> = BTreeSet::new();
    let mut names = Vec::with_capacity(variables.len());
    for variable in variables {
        let base: String = variable
            .name
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '@')
            .take(8)
            .collect::<String>()
            .to_uppercase();
        let base = if base.is_empty() {
            "VAR".to_string()
        } else {
            base
        };
        let mut candidate = base.clone();
        let mut counter = 1usize;
        while taken.contains(&candidate) {
            let suffix = counter.to_string();
            let keep = 8usize.saturating_sub(suffix.len());
            candidate = format!("{}{}", &base[..base.len().min(keep)], suffix);
            counter += 1;
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }
    names
}
