//! Modified UTF-8 as used by Java data streams.
//!
//! Strings are encoded over their UTF-16 code units: NUL takes two bytes
//! (`C0 80`) and characters outside the BMP are written as two three-byte
//! surrogates instead of one four-byte sequence.

use crate::utils::error::ExecDataError;

/// Encode a string in modified UTF-8
pub fn encode(value: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(value.len());

    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => bytes.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                bytes.push(0xC0 | (unit >> 6) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                bytes.push(0xE0 | (unit >> 12) as u8);
                bytes.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }

    bytes
}

/// Decode modified UTF-8 bytes
///
/// # Errors
/// * `ExecDataError::MalformedString` - a byte sequence is truncated or
///   invalid, or the surrogates do not pair up
pub fn decode(bytes: &[u8]) -> Result<String, ExecDataError> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let first = bytes[i];
        match first >> 4 {
            0x0..=0x7 => {
                units.push(first as u16);
                i += 1;
            }
            0xC | 0xD => {
                let second = continuation(bytes, i + 1)?;
                units.push(((first as u16 & 0x1F) << 6) | second);
                i += 2;
            }
            0xE => {
                let second = continuation(bytes, i + 1)?;
                let third = continuation(bytes, i + 2)?;
                units.push(((first as u16 & 0x0F) << 12) | (second << 6) | third);
                i += 3;
            }
            _ => {
                return Err(ExecDataError::MalformedString(format!(
                    "invalid byte 0x{:02X} at offset {}",
                    first, i
                )))
            }
        }
    }

    String::from_utf16(&units).map_err(|e| ExecDataError::MalformedString(e.to_string()))
}

/// Payload bits of the continuation byte at `index`
fn continuation(bytes: &[u8], index: usize) -> Result<u16, ExecDataError> {
    match bytes.get(index) {
        Some(byte) if byte & 0xC0 == 0x80 => Ok((byte & 0x3F) as u16),
        Some(byte) => Err(ExecDataError::MalformedString(format!(
            "invalid continuation byte 0x{:02X} at offset {}",
            byte, index
        ))),
        None => Err(ExecDataError::MalformedString(
            "truncated multi-byte sequence".to_string(),
        )),
    }
}
