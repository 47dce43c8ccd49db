//! # st25dv-rs - A Rust Crate for ST25DV Dynamic NFC Tags over I2C
//!
//! The st25dv-rs crate provides a host-side driver for the ST25DV64KC dynamic NFC/RFID tag
//! (and the compatible ST25DVxxK / ST25DVxxKC parts), talking to the chip over its I2C port.
//!
//! ## Features
//!
//! - Read and write the system and user memory spaces through a pluggable I2C transport
//! - Detect the silicon variant (K or KC series) from the IC_REF register
//! - Read the device UID, I2C control and security session state
//! - Open an I2C security session by presenting the 8-byte password
//! - Lock the capability container, the RF configuration and area 1
//! - Typed register catalog with access and variant checks
//! - Optional write-completion polling with a bounded number of attempts
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! To use the st25dv-rs crate in your Rust project, add the following to your Cargo.toml file:
//!
//! ```toml
//! [dependencies]
//! st25dv-rs = "0.1.0"
//! ```
//!
//! Then, in your Rust code, you can import the necessary modules and functions:
//!
//! ```rust
//! use st25dv_rs::{
//!     St25dvDriver, St25dvError, IcVariant, Password, Register, WriteOutcome,
//!     MockI2cBus, init_logger, log_info,
//! };
//! ```
//!
//! On Linux hosts, enable the `raspberry-pi` feature for an i2c-dev transport and the
//! `st25dv-cli` command line tool.

pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod password;
pub mod registers;
pub mod transport;
pub mod util;
pub mod variant;

pub use crate::error::{Result, St25dvError};
pub use crate::logging::{init_logger, init_logger_with_level, log_error, log_info, log_warn};

// Driver
pub use config::{DriverConfig, LockPolicy, TransportConfig};
pub use device::{St25dvDriver, TagInfo, WriteOutcome};
pub use password::Password;
pub use variant::{IcRef, IcVariant};

// Register catalog
pub use registers::{
    AreaPassword, AreaSecurity, CcFileLock, ConfigLock, MemorySpace, Register, RfProtection,
    UserArea, REGISTER_CATALOG,
};

// Transports
pub use transport::{I2cTransport, MockI2cBus, TransportError};
#[cfg(feature = "raspberry-pi")]
pub use transport::LinuxI2cTransport;

/// Open the I2C adapter named by `transport` and wrap it in a driver.
///
/// # Arguments
/// * `transport` - Connection URL and bus clock
/// * `config` - Driver settings (lock policy, write polling)
///
/// # Returns
/// * `Ok(St25dvDriver)` - Driver ready for use; no bus traffic has happened yet
/// * `Err(TransportError)` - The adapter could not be opened
#[cfg(feature = "raspberry-pi")]
pub fn connect(
    transport: &TransportConfig,
    config: DriverConfig,
) -> std::result::Result<St25dvDriver<LinuxI2cTransport>, TransportError> {
    let transport = LinuxI2cTransport::open(transport)?;
    Ok(St25dvDriver::with_config(transport, config))
}
