//! Dictionary records: variables, value labels, documents, extensions.

use std::collections::BTreeMap;

use crate::error::{Result, SavError};
use crate::raw::{RawCursor, decode_padded, f64_from_raw};
use crate::types::{LabelValue, SavMissing, SavVariable};

/// Record type codes.
pub const REC_VARIABLE: i32 = 2;
pub const REC_VALUE_LABELS: i32 = 3;
pub const REC_VALUE_LABEL_VARS: i32 = 4;
pub const REC_DOCUMENTS: i32 = 6;
pub const REC_EXTENSION: i32 = 7;
pub const REC_TERMINATOR: i32 = 999;

/// Extension subtypes the reader interprets.
pub const EXT_LONG_NAMES: i32 = 13;
pub const EXT_ENCODING: i32 = 20;

/// One slot of the dictionary, in file order.
///
/// Continuation slots pad long strings; value-label records index into this
/// list, so continuations must stay represented.
#[derive(Debug)]
pub(crate) enum DictSlot {
    /// Index into the variables vector.
    Variable(usize),
    Continuation,
}

/// Dictionary accumulated while walking records.
#[derive(Debug, Default)]
pub(crate) struct Dictionary {
    pub variables: Vec<SavVariable>,
    pub slots: Vec<DictSlot>,
    pub documents: Vec<String>,
    pub encoding: Option<String>,
}

impl Dictionary {
    /// Resolves a 1-based dictionary index to a variable position.
    pub fn variable_at(&self, index: usize) -> Result<usize> {
        match self.slots.get(index.wrapping_sub(1)) {
            Some(DictSlot::Variable(var_idx)) => Ok(*var_idx),
            Some(DictSlot::Continuation) => Err(SavError::LabelOnContinuation { index }),
            None => Err(SavError::invalid_format(format!(
                "dictionary index {index} out of range"
            ))),
        }
    }

    /// Applies the long-name extension payload (`SHORT=Long` tab-separated).
    pub fn apply_long_names(&mut self, payload: &str) {
        let by_short: BTreeMap<String, usize> = self
            .variables
            .iter()
            .enumerate()
            .map(|(idx, var)| (var.short_name.to_uppercase(), idx))
            .collect();
        for pair in payload.split('\t') {
            let Some((short, long)) = pair.split_once('=') else {
                continue;
            };
            let long = long.trim();
            if long.is_empty() {
                continue;
            }
            if let Some(idx) = by_short.get(&short.trim().to_uppercase()) {
                self.variables[*idx].name = long.to_string();
            }
        }
    }
}

/// Parses one type-2 variable record (the type code itself already consumed).
pub(crate) fn parse_variable_record(
    cursor: &mut RawCursor<'_>,
    dict: &mut Dictionary,
) -> Result<()> {
    let width = cursor.read_i32()?;
    let has_label = cursor.read_i32()?;
    let n_missing = cursor.read_i32()?;
    let print_format = cursor.read_u32()?;
    let _write_format = cursor.read_u32()?;
    let short_name = cursor.read_padded_string(8)?;

    let label = if has_label != 0 {
        let len = cursor.read_i32()?;
        if len < 0 {
            return Err(SavError::invalid_format("negative variable label length"));
        }
        let len = len as usize;
        let padded = len.div_ceil(4) * 4;
        let bytes = cursor.take(padded)?;
        let text = decode_padded(&bytes[..len]);
        if text.is_empty() { None } else { Some(text) }
    } else {
        None
    };

    let missing = parse_missing_values(cursor, n_missing)?;

    if width < 0 {
        // Continuation of a long string; keeps its slot for index bookkeeping.
        dict.slots.push(DictSlot::Continuation);
        return Ok(());
    }

    if short_name.is_empty() {
        return Err(SavError::EmptyVariableName);
    }

    let mut variable = if width == 0 {
        SavVariable::numeric(short_name.clone())
    } else {
        SavVariable::text(short_name.clone(), width as usize)
    };
    variable.short_name = short_name;
    variable.label = label;
    variable.print_format = print_format;
    variable.missing = missing;

    dict.slots.push(DictSlot::Variable(dict.variables.len()));
    dict.variables.push(variable);
    Ok(())
}

fn parse_missing_values(cursor: &mut RawCursor<'_>, n_missing: i32) -> Result<SavMissing> {
    if n_missing == 0 {
        return Ok(SavMissing::default());
    }
    let count = n_missing.unsigned_abs() as usize;
    if count > 3 {
        return Err(SavError::invalid_format(format!(
            "variable record declares {count} missing values"
        )));
    }
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(cursor.read_f64()?);
    }
    if n_missing > 0 {
        Ok(SavMissing {
            codes: values,
            range: None,
        })
    } else {
        // Negative count: first two values bound a range, the rest are codes.
        if values.len() < 2 {
            return Err(SavError::invalid_format(
                "missing-value range needs two bounds",
            ));
        }
        let low = values[0];
        let high = values[1];
        Ok(SavMissing {
            codes: values[2..].to_vec(),
            range: Some((low, high)),
        })
    }
}

/// Parses a type-3 value-label record plus its mandatory type-4 companion and
/// attaches the labels to the referenced variables.
pub(crate) fn parse_value_labels(cursor: &mut RawCursor<'_>, dict: &mut Dictionary) -> Result<()> {
    let count = cursor.read_i32()?;
    if count < 0 {
        return Err(SavError::invalid_format("negative value label count"));
    }
    let mut raw_labels: Vec<([u8; 8], String)> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let value: [u8; 8] = cursor.take(8)?.try_into().expect("slice length checked");
        let len = usize::from(*cursor.take(1)?.first().expect("one byte"));
        // Value plus length byte plus text is padded to a multiple of 8.
        let padded = (len + 1).div_ceil(8) * 8 - 1;
        let bytes = cursor.take(padded)?;
        let text = decode_padded(&bytes[..len]);
        raw_labels.push((value, text));
    }

    let rec_type = cursor.read_i32()?;
    if rec_type != REC_VALUE_LABEL_VARS {
        return Err(SavError::invalid_format(
            "value-label record not followed by variable index record",
        ));
    }
    let n_vars = cursor.read_i32()?;
    if n_vars <= 0 {
        return Err(SavError::invalid_format("empty value-label index record"));
    }
    let mut targets = Vec::with_capacity(n_vars as usize);
    for _ in 0..n_vars {
        let index = cursor.read_i32()?;
        targets.push(dict.variable_at(index as usize)?);
    }

    for var_idx in targets {
        let is_numeric = dict.variables[var_idx].is_numeric();
        for (raw, text) in &raw_labels {
            let value = if is_numeric {
                LabelValue::Number(f64_from_raw(raw, cursor.swap()))
            } else {
                LabelValue::Text(decode_padded(raw))
            };
            dict.variables[var_idx]
                .value_labels
                .push((value, text.clone()));
        }
    }
    Ok(())
}

/// Parses a type-6 document record.
pub(crate) fn parse_documents(cursor: &mut RawCursor<'_>, dict: &mut Dictionary) -> Result<()> {
    let n_lines = cursor.read_i32()?;
    if n_lines < 0 {
        return Err(SavError::invalid_format("negative document line count"));
    }
    for _ in 0..n_lines {
        dict.documents.push(cursor.read_padded_string(80)?);
    }
    Ok(())
}

/// Parses a type-7 extension record, interpreting the subtypes the model
/// needs and skipping the rest by size.
pub(crate) fn parse_extension(cursor: &mut RawCursor<'_>, dict: &mut Dictionary) -> Result<()> {
    let subtype = cursor.read_i32()?;
    let size = cursor.read_i32()?;
    let count = cursor.read_i32()?;
    if size < 0 || count < 0 {
        return Err(SavError::invalid_format("negative extension record size"));
    }
    let total = (size as usize)
        .checked_mul(count as usize)
        .ok_or_else(|| SavError::invalid_format("extension record size overflow"))?;
    let payload = cursor.take(total)?;
    match subtype {
        EXT_LONG_NAMES => {
            let text = String::from_utf8_lossy(payload);
            dict.apply_long_names(text.trim_end_matches('\0'));
        }
        EXT_ENCODING => {
            let text = decode_padded(payload);
            if !text.is_empty() {
                dict.encoding = Some(text);
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_names_applied_by_short_name() {
        let mut dict = Dictionary::default();
        dict.variables.push(SavVariable::numeric("QA10_1"));
        dict.variables.push(SavVariable::numeric("QA10_2"));
        dict.slots.push(DictSlot::Variable(0));
        dict.slots.push(DictSlot::Variable(1));
        dict.apply_long_names("QA10_1=trust_army\tQA10_2=trust_press");
        assert_eq!(dict.variables[0].name, "trust_army");
        assert_eq!(dict.variables[1].name, "trust_press");
        // Short names are preserved for round-tripping.
        assert_eq!(dict.variables[0].short_name, "QA10_1");
    }

    #[test]
    fn variable_at_rejects_continuations() {
        let mut dict = Dictionary::default();
        dict.variables.push(SavVariable::text("name", 16));
        dict.slots.push(DictSlot::Variable(0));
        dict.slots.push(DictSlot::Continuation);
        assert_eq!(dict.variable_at(1).unwrap(), 0);
        assert!(matches!(
            dict.variable_at(2),
            Err(SavError::LabelOnContinuation { index: 2 })
        ));
        assert!(dict.variable_at(3).is_err());
    }
}
