//! # I2C Password Handling
//!
//! Presenting the I2C password opens a security session on the tag. The chip
//! expects the password twice around a one-byte command marker:
//!
//! ```text
//! offset 0x0900 │ pwd[0..8] │ 0x09 │ pwd[0..8]
//!               │  8 bytes  │ 1 B  │  8 bytes      = 17-byte payload
//! ```
//!
//! The same layout with marker 0x07 would rewrite the password. The driver
//! never sends that form.

use crate::util::hex::{decode_hex_array, HexError};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Password length in bytes
pub const PASSWORD_LEN: usize = 8;

/// Marker byte of a "present password" frame
pub const PRESENT_PASSWORD_MARKER: u8 = 0x09;

/// Marker byte of a "write password" frame, refused by the driver
pub const WRITE_PASSWORD_MARKER: u8 = 0x07;

/// Length of the password payload following the offset bytes
pub const PASSWORD_FRAME_LEN: usize = 2 * PASSWORD_LEN + 1;

/// An 8-byte I2C password, wiped from memory on drop.
///
/// `Password::default()` is the factory password (eight zero bytes).
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Password([u8; PASSWORD_LEN]);

impl Password {
    pub const fn new(bytes: [u8; PASSWORD_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse 16 hex digits, e.g. `"0000000000000000"` or `"0x1122334455667788"`
    pub fn from_hex(input: &str) -> Result<Self, HexError> {
        decode_hex_array::<PASSWORD_LEN>(input).map(Self)
    }

    pub fn is_factory_default(&self) -> bool {
        self.0 == [0u8; PASSWORD_LEN]
    }

    /// Build the 17-byte "present password" payload
    pub fn presentation_frame(&self) -> PasswordFrame {
        let mut frame = [0u8; PASSWORD_FRAME_LEN];
        frame[..PASSWORD_LEN].copy_from_slice(&self.0);
        frame[PASSWORD_LEN] = PRESENT_PASSWORD_MARKER;
        frame[PASSWORD_LEN + 1..].copy_from_slice(&self.0);
        PasswordFrame(frame)
    }
}

impl From<[u8; PASSWORD_LEN]> for Password {
    fn from(bytes: [u8; PASSWORD_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_factory_default() {
            f.write_str("Password(<factory default>)")
        } else {
            f.write_str("Password(<redacted>)")
        }
    }
}

/// Wire payload written to the password register
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PasswordFrame([u8; PASSWORD_FRAME_LEN]);

impl PasswordFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PasswordFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordFrame(<redacted>, marker=0x{:02X})", self.0[PASSWORD_LEN])
    }
}

/// Check a raw payload destined for the password register.
///
/// Returns the reason for refusal, if any.
pub fn validate_payload(payload: &[u8]) -> Result<(), &'static str> {
    if payload.len() > PASSWORD_LEN && payload[PASSWORD_LEN] == WRITE_PASSWORD_MARKER {
        return Err("password rewrite frames (marker 0x07) are not accepted");
    }
    if payload.len() != PASSWORD_FRAME_LEN {
        return Err("password payload must be 17 bytes (pwd, 0x09, pwd)");
    }
    Ok(())
}
