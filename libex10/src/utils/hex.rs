// libex10-rs/libex10/src/utils/hex.rs

//! Hexadecimal formatting for diagnostics.

use std::fmt::Write;

use crate::{Error, Result};

/// Bytes per line of [`hex_dump_lines`].
pub const HEX_DUMP_WIDTH: usize = 16;

/// Lowercase hex without separators.
///
/// Example: `&[0xde, 0xad]` -> `"dead"`
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        // writing to a String never fails
        let _ = write!(s, "{:02x}", b);
        s
    })
}

/// Lowercase hex with a single space between bytes.
///
/// Example: `&[0xde, 0xad]` -> `"de ad"`
pub fn bytes_to_hex_spaced(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i != 0 {
            s.push(' ');
        }
        let _ = write!(s, "{:02x}", b);
    }
    s
}

/// Split `bytes` into dump lines prefixed with the offset of their first
/// byte, e.g. `"0010: 01 02 03"`.
pub fn hex_dump_lines(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(HEX_DUMP_WIDTH)
        .enumerate()
        .map(|(i, chunk)| format!("{:04x}: {}", i * HEX_DUMP_WIDTH, bytes_to_hex_spaced(chunk)))
        .collect()
}

/// Parse a hex string, ignoring ASCII whitespace.
pub fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = s.bytes().filter(|c| !c.is_ascii_whitespace()).collect();
    if cleaned.len() % 2 != 0 {
        return Err(Error::BadParamValue("hex string has odd length".to_string()));
    }
    cleaned
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair)
                .map_err(|_| Error::BadParamValue("hex string is not ASCII".to_string()))?;
            u8::from_str_radix(pair, 16)
                .map_err(|e| Error::BadParamValue(format!("invalid hex pair '{}': {}", pair, e)))
        })
        .collect()
}
