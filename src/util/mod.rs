//! # Utility Modules
//!
//! Small helpers shared by the driver and the command-line tool.

pub mod hex;

pub use hex::{decode_hex, decode_hex_array, encode_hex, format_hex_compact, pretty_hex, HexError};
