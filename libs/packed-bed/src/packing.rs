//! # Packing Codec
//!
//! Headerless binary packings: repeated `(x, y, z, diameter)` records of
//! fixed-width floats.
//!
//! ```text
//! FLOAT x | FLOAT y | FLOAT z | FLOAT diameter | FLOAT x | ...
//! FLOAT = f32 or f64, little or big endian (see PackingFormat)
//! ```
//!
//! The record count is `len / record_width`; there is no count field.

use std::path::Path;

use config::PackingFormat;

use crate::error::FormatError;

/// One decoded `(x, y, z, diameter)` record.
pub type Record = [f64; 4];

/// Decodes a packing byte stream.
///
/// # Example
///
/// ```rust
/// use config::PackingFormat;
/// use packed_bed::{decode, encode};
///
/// let bytes = encode(&[[1.0, 2.0, 3.0, 0.5]], PackingFormat::BigF64);
/// assert_eq!(bytes.len(), 32);
/// assert_eq!(decode(&bytes, PackingFormat::BigF64).unwrap(), vec![[1.0, 2.0, 3.0, 0.5]]);
/// ```
pub fn decode(bytes: &[u8], format: PackingFormat) -> Result<Vec<Record>, FormatError> {
    let record_width = format.record_width();
    if bytes.len() % record_width != 0 {
        return Err(FormatError::Truncated {
            len: bytes.len(),
            record_width,
        });
    }

    let width = format.value_width();
    Ok(bytes
        .chunks_exact(record_width)
        .map(|chunk| {
            let mut record = [0.0; 4];
            for (value, raw) in record.iter_mut().zip(chunk.chunks_exact(width)) {
                *value = read_value(raw, format);
            }
            record
        })
        .collect())
}

/// Encodes records in the given format.
pub fn encode(records: &[Record], format: PackingFormat) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(records.len() * format.record_width());
    for value in records.iter().flatten() {
        write_value(&mut bytes, *value, format);
    }
    bytes
}

/// Reads and decodes a packing file.
pub fn read_packing(
    path: impl AsRef<Path>,
    format: PackingFormat,
) -> Result<Vec<Record>, FormatError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes, format)
}

/// Encodes and writes records to a packing file.
pub fn write_packing(
    path: impl AsRef<Path>,
    records: &[Record],
    format: PackingFormat,
) -> Result<(), FormatError> {
    let path = path.as_ref();
    std::fs::write(path, encode(records, format)).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_value(raw: &[u8], format: PackingFormat) -> f64 {
    match (raw.len(), format.is_little_endian()) {
        (4, true) => f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
        (4, false) => f32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
        (_, little) => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(raw);
            if little {
                f64::from_le_bytes(buf)
            } else {
                f64::from_be_bytes(buf)
            }
        }
    }
}

fn write_value(out: &mut Vec<u8>, value: f64, format: PackingFormat) {
    match format {
        PackingFormat::LittleF32 => out.extend_from_slice(&(value as f32).to_le_bytes()),
        PackingFormat::BigF32 => out.extend_from_slice(&(value as f32).to_be_bytes()),
        PackingFormat::LittleF64 => out.extend_from_slice(&value.to_le_bytes()),
        PackingFormat::BigF64 => out.extend_from_slice(&value.to_be_bytes()),
    }
}
