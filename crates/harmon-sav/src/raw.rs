//! Byte-level cursor over a sav file with endianness handling.
//!
//! The layout code in the file header decides whether multi-byte fields need
//! a byte swap; the cursor applies it uniformly afterwards.

use crate::error::{Result, SavError};

/// A cursor over the raw file bytes.
#[derive(Debug)]
pub(crate) struct RawCursor<'a> {
    data: &'a [u8],
    pos: usize,
    swap: bool,
}

impl<'a> RawCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            swap: false,
        }
    }

    pub fn set_swap(&mut self, swap: bool) {
        self.swap = swap;
    }

    pub fn swap(&self) -> bool {
        self.swap
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(SavError::RecordOutOfBounds { offset: self.pos })?;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(SavError::RecordOutOfBounds { offset: self.pos })?;
        self.pos = end;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("slice length checked");
        let value = i32::from_le_bytes(bytes);
        Ok(if self.swap { value.swap_bytes() } else { value })
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("slice length checked");
        let value = u32::from_le_bytes(bytes);
        Ok(if self.swap { value.swap_bytes() } else { value })
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let mut bytes: [u8; 8] = self.take(8)?.try_into().expect("slice length checked");
        if self.swap {
            bytes.reverse();
        }
        Ok(f64::from_le_bytes(bytes))
    }

    /// Reads `len` bytes as text, lossily decoded, trailing spaces and NULs
    /// removed.
    pub fn read_padded_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len)?;
        Ok(decode_padded(bytes))
    }
}

/// Decodes fixed-width text, dropping trailing space/NUL padding.
pub(crate) fn decode_padded(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim_end_matches(['\0', ' ']).to_string()
}

/// Interprets an 8-byte field as an f64, honoring the swap flag.
pub(crate) fn f64_from_raw(bytes: &[u8; 8], swap: bool) -> f64 {
    let mut buf = *bytes;
    if swap {
        buf.reverse();
    }
    f64::from_le_bytes(buf)
}
