//! The 176-byte sav file header.

use crate::error::{Result, SavError};
use crate::raw::RawCursor;

/// Magic number of an uncompressed or bytecode-compressed sav file.
pub const MAGIC: &[u8; 4] = b"$FL2";
/// Magic number of a zsav (zlib) file; recognized but rejected.
pub const MAGIC_ZSAV: &[u8; 4] = b"$FL3";

/// Total header length in bytes.
pub const HEADER_LEN: usize = 176;

/// Compression code: no compression.
pub const COMPRESSION_NONE: i32 = 0;
/// Compression code: bytecode compression.
pub const COMPRESSION_BYTECODE: i32 = 1;
/// Compression code: zlib compression (zsav body).
pub const COMPRESSION_ZLIB: i32 = 2;

/// Parsed file header.
#[derive(Debug, Clone)]
pub struct FileHeader {
    pub product: String,
    pub layout_code: i32,
    /// 8-byte data elements per case.
    pub nominal_case_size: i32,
    pub compression: i32,
    /// 1-based dictionary index of the weight variable, 0 when unweighted.
    pub weight_index: i32,
    /// Declared case count, -1 when unknown.
    pub ncases: i32,
    pub bias: f64,
    pub creation_date: String,
    pub creation_time: String,
    pub file_label: String,
    /// Whether multi-byte fields need a byte swap.
    pub swap: bool,
}

/// Parses the header and configures the cursor's endianness.
pub(crate) fn parse_header(cursor: &mut RawCursor<'_>) -> Result<FileHeader> {
    let magic = cursor.take(4)?;
    if magic == MAGIC_ZSAV {
        return Err(SavError::unsupported("zsav (zlib compressed) files"));
    }
    if magic != MAGIC {
        return Err(SavError::invalid_format("missing $FL2 magic number"));
    }

    let product = cursor.read_padded_string(60)?;

    // The layout code doubles as the endianness probe.
    let layout_raw = cursor.read_i32()?;
    let swap = !(layout_raw == 2 || layout_raw == 3);
    cursor.set_swap(swap);
    let layout_code = if swap {
        layout_raw.swap_bytes()
    } else {
        layout_raw
    };
    if layout_code != 2 && layout_code != 3 {
        return Err(SavError::invalid_format(format!(
            "unrecognized layout code {layout_code}"
        )));
    }

    let nominal_case_size = cursor.read_i32()?;
    let compression = cursor.read_i32()?;
    if compression == COMPRESSION_ZLIB {
        return Err(SavError::unsupported("zlib compressed case data"));
    }
    if compression != COMPRESSION_NONE && compression != COMPRESSION_BYTECODE {
        return Err(SavError::invalid_format(format!(
            "unrecognized compression code {compression}"
        )));
    }
    let weight_index = cursor.read_i32()?;
    let ncases = cursor.read_i32()?;
    let bias = cursor.read_f64()?;
    let creation_date = cursor.read_padded_string(9)?;
    let creation_time = cursor.read_padded_string(8)?;
    let file_label = cursor.read_padded_string(64)?;
    cursor.skip(3)?;

    if nominal_case_size < 0 {
        return Err(SavError::invalid_format("negative nominal case size"));
    }

    Ok(FileHeader {
        product,
        layout_code,
        nominal_case_size,
        compression,
        weight_index,
        ncases,
        bias,
        creation_date,
        creation_time,
        file_label,
        swap,
    })
}

/// Writes a fixed-width text field, space padded or truncated.
pub(crate) fn encode_padded(value: &str, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for &byte in value.as_bytes().iter().take(len) {
        out.push(byte);
    }
    while out.len() < len {
        out.push(b' ');
    }
    out
}

/// Builds a 176-byte header for the writer (little endian, layout code 2).
pub(crate) fn build_header(
    product: &str,
    file_label: &str,
    nominal_case_size: i32,
    compression: i32,
    weight_index: i32,
    ncases: i32,
    creation_date: &str,
    creation_time: &str,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&encode_padded(product, 60));
    out.extend_from_slice(&2i32.to_le_bytes());
    out.extend_from_slice(&nominal_case_size.to_le_bytes());
    out.extend_from_slice(&compression.to_le_bytes());
    out.extend_from_slice(&weight_index.to_le_bytes());
    out.extend_from_slice(&ncases.to_le_bytes());
    out.extend_from_slice(&100.0f64.to_le_bytes());
    out.extend_from_slice(&encode_padded(creation_date, 9));
    out.extend_from_slice(&encode_padded(creation_time, 8));
    out.extend_from_slice(&encode_padded(file_label, 64));
    out.extend_from_slice(&[0u8; 3]);
    debug_assert_eq!(out.len(), HEADER_LEN);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let bytes = build_header(
            "@(#) SPSS DATA FILE",
            "Eurobarometer wave",
            4,
            COMPRESSION_NONE,
            0,
            10,
            "30 Aug 26",
            "12:00:00",
        );
        assert_eq!(bytes.len(), HEADER_LEN);
        let mut cursor = RawCursor::new(&bytes);
        let header = parse_header(&mut cursor).unwrap();
        assert_eq!(header.layout_code, 2);
        assert_eq!(header.nominal_case_size, 4);
        assert_eq!(header.ncases, 10);
        assert_eq!(header.file_label, "Eurobarometer wave");
        assert!(!header.swap);
        assert_eq!(cursor.position(), HEADER_LEN);
    }

    #[test]
    fn zsav_rejected() {
        let mut bytes = build_header("p", "", 1, COMPRESSION_NONE, 0, 0, "", "");
        bytes[..4].copy_from_slice(MAGIC_ZSAV);
        let mut cursor = RawCursor::new(&bytes);
        assert!(matches!(
            parse_header(&mut cursor),
            Err(SavError::Unsupported { .. })
        ));
    }

    #[test]
    fn bad_magic_rejected() {
        let mut bytes = build_header("p", "", 1, COMPRESSION_NONE, 0, 0, "", "");
        bytes[0] = b'X';
        let mut cursor = RawCursor::new(&bytes);
        assert!(matches!(
            parse_header(&mut cursor),
            Err(SavError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn encode_padded_truncates() {
        assert_eq!(encode_padded("abcdef", 4), b"abcd".to_vec());
        assert_eq!(encode_padded("ab", 4), b"ab  ".to_vec());
    }
}
