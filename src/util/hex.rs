//! # Hex Encoding/Decoding Utilities
//!
//! Hex helpers used for UID display, password entry on the command line and
//! payload dumps in trace logs.
//!
//! ## Usage
//!
//! ```rust
//! use st25dv_rs::util::hex::{decode_hex, encode_hex, format_hex_compact};
//!
//! let uid = [0xE0, 0x02, 0x26, 0x00, 0x11, 0x22, 0x33, 0x44];
//! assert_eq!(encode_hex(&uid), "e002260011223344");
//! assert_eq!(format_hex_compact(&uid[..2]), "e0 02");
//!
//! assert_eq!(decode_hex("0x00 09").unwrap(), vec![0x00, 0x09]);
//! ```

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

/// Encode bytes to lowercase hex string
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Encode bytes to uppercase hex string
pub fn encode_hex_upper(data: &[u8]) -> String {
    hex::encode_upper(data)
}

/// Decode a hex string to bytes.
///
/// A leading `0x`, whitespace, `:` and `-` separators are ignored, so
/// `"0x0009"`, `"00 09"` and `"00:09"` all decode to `[0x00, 0x09]`.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let input = input.trim();
    let input = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);

    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();

    if cleaned.is_empty() {
        return Err(HexError::EmptyString);
    }

    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }

    hex::decode(&cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Decode a hex string that must yield exactly `N` bytes
pub fn decode_hex_array<const N: usize>(input: &str) -> Result<[u8; N], HexError> {
    let bytes = decode_hex(input)?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| HexError::WrongLength {
        expected: N,
        actual,
    })
}

/// Format hex data for compact display (useful for logs)
///
/// Formats data as "e0 02 26" with spaces between bytes.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hex dump with a memory offset column, 16 bytes per line.
///
/// `base` is the tag offset of the first byte, so dumps of user memory show
/// real EEPROM addresses.
pub fn pretty_hex(data: &[u8], base: u16) -> String {
    data.chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let offset = base as usize + i * 16;
            let ascii: String = chunk
                .iter()
                .map(|&b| {
                    if b.is_ascii_graphic() || b == b' ' {
                        b as char
                    } else {
                        '.'
                    }
                })
                .collect();
            format!("{offset:04x}: {:<47} |{ascii}|", format_hex_compact(chunk))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_case() {
        let data = vec![0xAB, 0xCD, 0xEF];
        assert_eq!(encode_hex(&data), "abcdef");
        assert_eq!(encode_hex_upper(&data), "ABCDEF");
    }

    #[test]
    fn test_decode_separators_and_prefix() {
        let expected = vec![0x00, 0x09, 0xFF];
        assert_eq!(decode_hex("0009ff").unwrap(), expected);
        assert_eq!(decode_hex("0x0009FF").unwrap(), expected);
        assert_eq!(decode_hex("00 09 ff").unwrap(), expected);
        assert_eq!(decode_hex("00:09-ff").unwrap(), expected);
    }

    #[test]
    fn test_decode_array_length() {
        let pwd: [u8; 8] = decode_hex_array("0001020304050607").unwrap();
        assert_eq!(pwd, [0, 1, 2, 3, 4, 5, 6, 7]);

        assert_eq!(
            decode_hex_array::<8>("0001"),
            Err(HexError::WrongLength {
                expected: 8,
                actual: 2
            })
        );
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_hex_compact(&[0x68, 0x31, 0x31, 0x68]), "68 31 31 68");
        assert_eq!(format_hex_compact(&[]), "");
    }

    #[test]
    fn test_pretty_hex_offsets() {
        let data: Vec<u8> = (0u8..20).collect();
        let dump = pretty_hex(&data, 0x0100);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0100: 00 01"));
        assert!(lines[1].starts_with("0110: 10 11 12 13"));
        assert!(pretty_hex(&[], 0).is_empty());
    }

    #[test]
    fn test_errors() {
        assert_eq!(decode_hex(""), Err(HexError::EmptyString));
        assert_eq!(decode_hex("0x"), Err(HexError::EmptyString));
        assert_eq!(decode_hex("1"), Err(HexError::OddLength(1)));
        assert!(matches!(decode_hex("GG"), Err(HexError::DecodeError(_))));
    }
}
