//! # Linux i2c-dev Transport
//!
//! [`I2cTransport`] over `/dev/i2c-N` using the `rppal` crate. Works on any
//! Linux host exposing i2c-dev, Raspberry Pi 4/5 included.
//!
//! ## Hardware Setup
//!
//! ```text
//! Pi Pin │ BCM GPIO │ ST25DV Pin │ Function
//! ───────┼──────────┼────────────┼─────────────
//! 3      │ GPIO 2   │ SDA        │ I2C data
//! 5      │ GPIO 3   │ SCL        │ I2C clock
//! 1      │ 3V3      │ VCC        │ Supply
//! 6      │ GND      │ VSS        │ Ground
//! ```
//!
//! Enable the bus with `dtparam=i2c_arm=on`. The bus clock is fixed by the
//! device tree (`i2c_arm_baudrate`); the configured frequency is only checked
//! against it.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use st25dv_rs::config::TransportConfig;
//! use st25dv_rs::transport::LinuxI2cTransport;
//! use st25dv_rs::St25dvDriver;
//!
//! let transport = LinuxI2cTransport::open(&TransportConfig::new("i2c:///1", 100_000))?;
//! let mut driver = St25dvDriver::new(transport);
//! println!("{}", driver.detect_variant()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::TransportConfig;
use crate::transport::{parse_bus_url, I2cTransport, TransportError};
use rppal::i2c::{Error as I2cError, I2c};

/// I2C transport backed by a Linux i2c-dev adapter
pub struct LinuxI2cTransport {
    i2c: I2c,
    bus: u8,
    /// Target currently programmed as the slave address
    current_target: Option<u8>,
}

impl LinuxI2cTransport {
    /// Open the adapter named by `config.url`
    pub fn open(config: &TransportConfig) -> Result<Self, TransportError> {
        let bus = parse_bus_url(&config.url)?;
        let i2c = I2c::with_bus(bus).map_err(|e| map_error(e, None))?;

        log::info!("Opened I2C bus {bus} ({})", config.url);

        match i2c.clock_speed() {
            Ok(actual) if actual != config.clock_frequency_hz => log::warn!(
                "I2C bus {bus} runs at {actual} Hz, configured {} Hz (set by the device tree)",
                config.clock_frequency_hz
            ),
            Ok(actual) => log::debug!("I2C bus {bus} clock: {actual} Hz"),
            Err(e) => log::debug!("Cannot read I2C bus {bus} clock speed: {e}"),
        }

        Ok(Self {
            i2c,
            bus,
            current_target: None,
        })
    }

    pub fn bus(&self) -> u8 {
        self.bus
    }

    fn select(&mut self, target: u8) -> Result<(), TransportError> {
        if self.current_target != Some(target) {
            self.i2c
                .set_slave_address(u16::from(target))
                .map_err(|e| map_error(e, Some(target)))?;
            self.current_target = Some(target);
        }
        Ok(())
    }
}

impl I2cTransport for LinuxI2cTransport {
    fn exchange(
        &mut self,
        target: u8,
        write: &[u8],
        read_len: usize,
    ) -> Result<Vec<u8>, TransportError> {
        self.select(target)?;

        if read_len == 0 {
            let written = self
                .i2c
                .write(write)
                .map_err(|e| map_error(e, Some(target)))?;
            if written != write.len() {
                return Err(TransportError::Bus(format!(
                    "short write to 0x{target:02X}: {written} of {} bytes",
                    write.len()
                )));
            }
            return Ok(Vec::new());
        }

        let mut buffer = vec![0u8; read_len];
        self.i2c
            .write_read(write, &mut buffer)
            .map_err(|e| map_error(e, Some(target)))?;
        Ok(buffer)
    }

    fn poll_ack(&mut self, target: u8) -> Result<bool, TransportError> {
        self.select(target)?;
        ack_from_quick_command(self.i2c.smbus_quick_command(false), target)
    }
}

/// Only a missing acknowledgment counts as "busy"; other faults propagate
fn ack_from_quick_command(
    result: Result<(), I2cError>,
    target: u8,
) -> Result<bool, TransportError> {
    match result {
        Ok(()) => Ok(true),
        Err(e) => match map_error(e, Some(target)) {
            TransportError::Nack { .. } => {
                log::trace!("poll_ack 0x{target:02X}: no acknowledgment");
                Ok(false)
            }
            other => Err(other),
        },
    }
}

fn map_error(error: I2cError, target: Option<u8>) -> TransportError {
    match error {
        I2cError::Io(e) => match (e.raw_os_error(), target) {
            // ENXIO / EREMOTEIO: no acknowledgment from the target
            (Some(6) | Some(121), Some(target)) => TransportError::Nack { target },
            // ENODEV: adapter removed
            (Some(19), _) => TransportError::Disconnected(e.to_string()),
            _ => TransportError::Bus(e.to_string()),
        },
        other => TransportError::Bus(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn io_error(errno: i32) -> I2cError {
        I2cError::Io(io::Error::from_raw_os_error(errno))
    }

    #[test]
    fn test_errno_mapping() {
        assert!(matches!(
            map_error(io_error(6), Some(0x57)),
            TransportError::Nack { target: 0x57 }
        ));
        assert!(matches!(
            map_error(io_error(121), Some(0x53)),
            TransportError::Nack { target: 0x53 }
        ));
        assert!(matches!(
            map_error(io_error(19), Some(0x57)),
            TransportError::Disconnected(_)
        ));
        assert!(matches!(
            map_error(io_error(5), Some(0x57)),
            TransportError::Bus(_)
        ));
        // without a target a NACK errno cannot be attributed
        assert!(matches!(map_error(io_error(6), None), TransportError::Bus(_)));
    }

    #[test]
    fn test_quick_command_nack_is_not_acknowledged() {
        assert!(ack_from_quick_command(Ok(()), 0x57).unwrap());
        assert!(!ack_from_quick_command(Err(io_error(6)), 0x57).unwrap());
        assert!(!ack_from_quick_command(Err(io_error(121)), 0x57).unwrap());
    }

    #[test]
    fn test_quick_command_disconnect_propagates() {
        assert!(matches!(
            ack_from_quick_command(Err(io_error(19)), 0x57),
            Err(TransportError::Disconnected(_))
        ));
        assert!(matches!(
            ack_from_quick_command(Err(io_error(5)), 0x57),
            Err(TransportError::Bus(_))
        ));
        assert!(matches!(
            ack_from_quick_command(Err(I2cError::FeatureNotSupported), 0x57),
            Err(TransportError::Bus(_))
        ));
    }
}
