//! # ST25DV Error Handling
//!
//! This module defines the St25dvError enum, which represents the different error
//! types that can occur while talking to an ST25DV tag.

use crate::transport::TransportError;
use thiserror::Error;

/// Represents the different error types that can occur in the driver.
#[derive(Debug, Error)]
pub enum St25dvError {
    /// A user memory access reaches past the top of the 64-Kbit EEPROM (0x1FFF).
    #[error("{op}: user memory offset 0x{offset:04X} (+{len} bytes) is out of range, last valid offset is 0x{max:04X}")]
    AddressOutOfRange {
        op: &'static str,
        offset: u16,
        len: usize,
        max: u16,
    },

    /// A write targeted the password register outside the unlock path, or the
    /// password payload itself is malformed.
    #[error("{op}: refusing to write protected register at 0x{offset:04X}: {reason}")]
    ProtectedRegister {
        op: &'static str,
        offset: u16,
        reason: &'static str,
    },

    /// IC_REF did not match any known K or KC series code.
    #[error("{op}: IC_REF value 0x{ic_ref:02X} read at 0x{offset:04X} on target 0x{target:02X} does not match any known K or KC series part")]
    UnknownSilicon {
        op: &'static str,
        target: u8,
        offset: u16,
        ic_ref: u8,
    },

    /// Write-completion polling ran out of attempts. The data phase itself
    /// has already been clocked out on the bus.
    #[error("{op}: write at 0x{offset:04X} on target 0x{target:02X} not acknowledged after {attempts} polls")]
    WriteTimeout {
        op: &'static str,
        target: u8,
        offset: u16,
        attempts: u32,
    },

    /// A catalog write carried the wrong number of bytes for the register.
    #[error("{op}: register {register} takes {expected} bytes, got {actual}")]
    LengthMismatch {
        op: &'static str,
        register: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The transport answered with fewer bytes than requested.
    #[error("{op}: short read at 0x{offset:04X} on target 0x{target:02X}: expected {expected} bytes, got {actual}")]
    ShortRead {
        op: &'static str,
        target: u8,
        offset: u16,
        expected: usize,
        actual: usize,
    },

    /// The underlying I2C transport failed.
    #[error("{op}: transport failure at 0x{offset:04X} on target 0x{target:02X}: {source}")]
    Transport {
        op: &'static str,
        target: u8,
        offset: u16,
        #[source]
        source: TransportError,
    },
}

/// Convenience alias used across the driver.
pub type Result<T> = std::result::Result<T, St25dvError>;
