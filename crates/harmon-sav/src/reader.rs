//! sav file reader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::compression::{Element, ElementReader, element_to_number, element_to_segment};
use crate::dict::{
    Dictionary, REC_DOCUMENTS, REC_EXTENSION, REC_TERMINATOR, REC_VALUE_LABELS, REC_VARIABLE,
    parse_documents, parse_extension, parse_value_labels, parse_variable_record,
};
use crate::error::{Result, SavError};
use crate::header::{COMPRESSION_BYTECODE, FileHeader, parse_header};
use crate::raw::RawCursor;
use crate::types::{SavDataset, SavReaderOptions, SavValue, SavVariable};

/// sav file reader.
///
/// Reads uncompressed and bytecode-compressed SPSS system files.
pub struct SavReader<R: Read> {
    reader: BufReader<R>,
    options: SavReaderOptions,
}

impl<R: Read> SavReader<R> {
    /// Create a new sav reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            options: SavReaderOptions::default(),
        }
    }

    /// Create a new sav reader with options.
    pub fn with_options(reader: R, options: SavReaderOptions) -> Self {
        Self {
            reader: BufReader::new(reader),
            options,
        }
    }

    /// Read the whole file into memory and parse it.
    pub fn read_dataset(mut self) -> Result<SavDataset> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_sav_data(&data, &self.options)
    }
}

impl SavReader<File> {
    /// Open a sav file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SavError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                SavError::Io(e)
            }
        })?;
        Ok(Self::new(file))
    }
}

/// Read a sav file from a path.
pub fn read_sav(path: &Path) -> Result<SavDataset> {
    SavReader::open(path)?.read_dataset()
}

/// Read a sav file with options.
pub fn read_sav_with_options(path: &Path, options: SavReaderOptions) -> Result<SavDataset> {
    let mut reader = SavReader::open(path)?;
    reader.options = options;
    reader.read_dataset()
}

/// Parse sav data from bytes.
fn parse_sav_data(data: &[u8], options: &SavReaderOptions) -> Result<SavDataset> {
    let mut cursor = RawCursor::new(data);
    let header = parse_header(&mut cursor)?;
    let dict = parse_dictionary(&mut cursor)?;
    let cases = parse_cases(&mut cursor, &header, &dict.variables, options)?;

    let weight_variable = resolve_weight(&header, &dict);

    Ok(SavDataset {
        file_label: header.file_label,
        encoding: dict.encoding,
        documents: dict.documents,
        weight_variable,
        variables: dict.variables,
        cases,
    })
}

/// Walks dictionary records up to the type-999 terminator.
fn parse_dictionary(cursor: &mut RawCursor<'_>) -> Result<Dictionary> {
    let mut dict = Dictionary::default();
    loop {
        if cursor.is_at_end() {
            return Err(SavError::MissingTerminator);
        }
        let offset = cursor.position();
        let record_type = cursor.read_i32()?;
        match record_type {
            REC_VARIABLE => parse_variable_record(cursor, &mut dict)?,
            REC_VALUE_LABELS => parse_value_labels(cursor, &mut dict)?,
            REC_DOCUMENTS => parse_documents(cursor, &mut dict)?,
            REC_EXTENSION => parse_extension(cursor, &mut dict)?,
            REC_TERMINATOR => {
                cursor.skip(4)?; // filler word
                return Ok(dict);
            }
            other => {
                return Err(SavError::UnknownRecord {
                    record_type: other,
                    offset,
                });
            }
        }
    }
}

/// Reads case data after the dictionary terminator.
fn parse_cases(
    cursor: &mut RawCursor<'_>,
    header: &FileHeader,
    variables: &[SavVariable],
    options: &SavReaderOptions,
) -> Result<Vec<Vec<SavValue>>> {
    let swap = cursor.swap();
    let compressed = header.compression == COMPRESSION_BYTECODE;
    let mut elements = ElementReader::new(cursor, compressed, header.bias);

    let case_limit = match (header.ncases, options.max_cases) {
        (n, Some(limit)) if n >= 0 => Some((n as usize).min(limit)),
        (n, None) if n >= 0 => Some(n as usize),
        (_, limit) => limit,
    };

    let mut cases = Vec::new();
    'cases: loop {
        if let Some(limit) = case_limit
            && cases.len() >= limit
        {
            break;
        }
        let mut case = Vec::with_capacity(variables.len());
        for (var_idx, variable) in variables.iter().enumerate() {
            if variable.is_numeric() {
                let Some(element) = elements.next_element()? else {
                    if var_idx == 0 {
                        break 'cases; // clean end between cases
                    }
                    return Err(SavError::invalid_format("case data ends mid-case"));
                };
                case.push(SavValue::Number(element_to_number(element, swap)));
            } else {
                let mut bytes = Vec::with_capacity(variable.segment_count() * 8);
                for segment in 0..variable.segment_count() {
                    let Some(element) = elements.next_element()? else {
                        if var_idx == 0 && segment == 0 {
                            break 'cases;
                        }
                        return Err(SavError::invalid_format("case data ends mid-case"));
                    };
                    bytes.extend_from_slice(&element_to_segment(element));
                }
                bytes.truncate(variable.width);
                let text = String::from_utf8_lossy(&bytes);
                let text = if options.trim_strings {
                    text.trim_end().to_string()
                } else {
                    text.to_string()
                };
                case.push(SavValue::Text(text));
            }
        }
        cases.push(case);
    }

    // A declared case count that the data section cannot satisfy is a
    // structural error, not a truncation to ignore.
    if header.ncases >= 0 && options.max_cases.is_none() && cases.len() < header.ncases as usize {
        return Err(SavError::invalid_format(format!(
            "header declares {} cases, data holds {}",
            header.ncases,
            cases.len()
        )));
    }

    Ok(cases)
}

fn resolve_weight(header: &FileHeader, dict: &Dictionary) -> Option<String> {
    if header.weight_index <= 0 {
        return None;
    }
    dict.variable_at(header.weight_index as usize)
        .ok()
        .map(|idx| dict.variables[idx].name.clone())
}
