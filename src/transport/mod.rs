//! # I2C Transport Abstraction
//!
//! This module defines the transport trait the tag driver sits on. A transport
//! performs raw addressed exchanges on the I2C bus and a single-shot
//! acknowledgment check; it knows nothing about ST25DV memory layout.
//!
//! ## Implementations
//!
//! - [`mock::MockI2cBus`]: in-memory tag simulator for tests and dry runs
//! - `linux::LinuxI2cTransport`: Linux i2c-dev via `rppal` (feature `raspberry-pi`)

use thiserror::Error;

pub mod mock;

#[cfg(feature = "raspberry-pi")]
pub mod linux;

pub use mock::{MockI2cBus, Transaction};

#[cfg(feature = "raspberry-pi")]
pub use linux::LinuxI2cTransport;

/// Errors that can occur during transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    /// The addressed target did not acknowledge
    #[error("target 0x{target:02X} did not acknowledge")]
    Nack { target: u8 },

    /// The adapter went away (unplugged, device node closed)
    #[error("I2C adapter disconnected: {0}")]
    Disconnected(String),

    /// Any other bus-level failure reported by the adapter
    #[error("I2C bus error: {0}")]
    Bus(String),

    #[error("Invalid transport configuration: {0}")]
    InvalidConfig(String),
}

/// Raw I2C access used by the tag driver.
///
/// Implementations are expected to be owned exclusively by one driver; there
/// is no locking at this layer.
pub trait I2cTransport {
    /// Combined addressed write followed by an addressed read on `target`.
    ///
    /// `read_len == 0` means write-only and must return an empty vector.
    fn exchange(
        &mut self,
        target: u8,
        write: &[u8],
        read_len: usize,
    ) -> Result<Vec<u8>, TransportError>;

    /// Single, non-blocking check whether `target` currently acknowledges
    /// its address. Used for write-completion polling.
    fn poll_ack(&mut self, target: u8) -> Result<bool, TransportError>;
}

impl<T: I2cTransport + ?Sized> I2cTransport for &mut T {
    fn exchange(
        &mut self,
        target: u8,
        write: &[u8],
        read_len: usize,
    ) -> Result<Vec<u8>, TransportError> {
        (**self).exchange(target, write, read_len)
    }

    fn poll_ack(&mut self, target: u8) -> Result<bool, TransportError> {
        (**self).poll_ack(target)
    }
}

impl<T: I2cTransport + ?Sized> I2cTransport for Box<T> {
    fn exchange(
        &mut self,
        target: u8,
        write: &[u8],
        read_len: usize,
    ) -> Result<Vec<u8>, TransportError> {
        (**self).exchange(target, write, read_len)
    }

    fn poll_ack(&mut self, target: u8) -> Result<bool, TransportError> {
        (**self).poll_ack(target)
    }
}

/// Parse a connection URL into a Linux I2C bus number.
///
/// Accepted forms: `i2c:///1`, `i2c://1`, `/dev/i2c-1` and a bare `1`.
pub fn parse_bus_url(url: &str) -> Result<u8, TransportError> {
    let trimmed = url.trim();
    let bus = if let Some(rest) = trimmed.strip_prefix("i2c://") {
        rest.trim_start_matches('/')
    } else if let Some(rest) = trimmed.strip_prefix("/dev/i2c-") {
        rest
    } else {
        trimmed
    };

    bus.parse::<u8>().map_err(|_| {
        TransportError::InvalidConfig(format!("cannot derive an I2C bus number from '{url}'"))
    })
}
