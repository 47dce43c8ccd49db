//! # ST25DV Tag Driver
//!
//! This module provides the host-side driver for ST25DV64KC (and compatible
//! K/KC series) dynamic NFC tags. Every operation is synchronous and blocks
//! on the injected [`I2cTransport`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │        Application Layer        │
//! ├─────────────────────────────────┤
//! │   St25dvDriver (this file)      │
//! │   typed ops, unlock, locks      │
//! ├─────────────────────────────────┤
//! │  read/write memory primitives   │
//! ├─────────────────────────────────┤
//! │       I2cTransport trait        │
//! └─────────────────────────────────┘
//! ```
//!
//! ## Wire format
//!
//! Every access starts with the two-byte big-endian memory offset as the
//! write phase of an exchange. Reads add a read phase of the requested
//! length; writes append the payload and read nothing back.
//!
//! ## Usage Example
//!
//! ```rust
//! use st25dv_rs::{IcVariant, MockI2cBus, Password, St25dvDriver};
//!
//! let mut driver = St25dvDriver::new(MockI2cBus::new());
//!
//! if driver.detect_variant()? == IcVariant::Kc {
//!     let _i2c_ctrl = driver.read_i2c_control()?;
//! }
//! let uid = driver.read_device_uid()?;
//! assert_eq!(uid.len(), 8);
//!
//! assert!(driver.unlock(&Password::default())?);
//! # Ok::<(), st25dv_rs::St25dvError>(())
//! ```
//!
//! ## Concurrency
//!
//! The driver owns its transport and takes `&mut self` everywhere. The chip
//! session and the bus are global state; callers sharing one tag across
//! threads must serialize access themselves, e.g. behind a `Mutex`.

use crate::config::DriverConfig;
use crate::error::{Result, St25dvError};
use crate::password::{validate_payload, Password};
use crate::registers::{
    Applicability, AreaSecurity, MemorySpace, Register, UserArea, I2C_PWD_LEN, I2C_PWD_OFFSET,
    USER_MEMORY_END,
};
use crate::transport::I2cTransport;
use crate::util::hex::{encode_hex_upper, format_hex_compact};
use crate::variant::{unknown_silicon, IcVariant};

/// Result of a write as far as completion polling can tell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// No polling requested; the data phase completed on the bus
    Unconfirmed,
    /// The tag acknowledged on poll number `attempt` (1-based)
    Acknowledged { attempt: u32 },
    /// No acknowledgment within `attempts` polls
    TimedOut {
        target: u8,
        offset: u16,
        attempts: u32,
    },
}

impl WriteOutcome {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, WriteOutcome::TimedOut { .. })
    }

    /// Escalate a timeout to [`St25dvError::WriteTimeout`]
    pub fn ensure_completed(self, op: &'static str) -> Result<WriteOutcome> {
        match self {
            WriteOutcome::TimedOut {
                target,
                offset,
                attempts,
            } => Err(St25dvError::WriteTimeout {
                op,
                target,
                offset,
                attempts,
            }),
            other => Ok(other),
        }
    }
}

/// Identity and geometry of the attached tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub variant: IcVariant,
    pub ic_ref: u8,
    /// UID as stored at 0x0018 (LSB first)
    pub uid: [u8; 8],
    /// I2C_CTRL, read only on KC parts
    pub i2c_ctrl: Option<u8>,
    /// Number of user memory blocks
    pub block_count: u32,
    /// Bytes per block
    pub block_size: u32,
}

impl TagInfo {
    pub fn user_memory_bytes(&self) -> u32 {
        self.block_count * self.block_size
    }

    /// UID in the usual MSB-first notation (starts with "e002" on ST parts)
    pub fn uid_hex(&self) -> String {
        let mut msb_first = self.uid;
        msb_first.reverse();
        encode_hex_upper(&msb_first)
    }
}

/// Driver for one ST25DV tag on an I2C transport.
///
/// ## Type Parameters
///
/// * `T` - transport providing addressed exchanges and acknowledgment polls
pub struct St25dvDriver<T: I2cTransport> {
    transport: T,
    config: DriverConfig,
    /// Variant found by the last `detect_variant` call
    variant: Option<IcVariant>,
}

impl<T: I2cTransport> St25dvDriver<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DriverConfig::default())
    }

    pub fn with_config(transport: T, config: DriverConfig) -> Self {
        Self {
            transport,
            config,
            variant: None,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Variant from the most recent successful `detect_variant`
    pub fn variant(&self) -> Option<IcVariant> {
        self.variant
    }

    /// True when `register` is known to exist on the detected silicon.
    /// Returns `false` before `detect_variant` for variant-specific registers.
    pub fn supports(&self, register: Register) -> bool {
        match self.variant {
            Some(variant) => variant.supports(register),
            None => register.descriptor().applicability == Applicability::Both,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    // ------------------------------------------------------------------
    // Memory primitives
    // ------------------------------------------------------------------

    /// Read `len` bytes of system memory starting at `offset`
    pub fn read_system_memory(&mut self, offset: u16, len: usize) -> Result<Vec<u8>> {
        self.read_raw("read_system_memory", MemorySpace::System, offset, len)
    }

    /// Read `len` bytes of user EEPROM starting at `offset`.
    ///
    /// Fails with `AddressOutOfRange` before touching the bus when any byte
    /// lies above 0x1FFF.
    pub fn read_user_memory(&mut self, offset: u16, len: usize) -> Result<Vec<u8>> {
        check_user_range("read_user_memory", offset, len)?;
        self.read_raw("read_user_memory", MemorySpace::User, offset, len)
    }

    /// Write `bytes` to system memory at `offset`, then poll for completion
    /// up to `poll_attempts` times.
    ///
    /// The password register cannot be written through this path.
    pub fn write_system_memory(
        &mut self,
        offset: u16,
        bytes: &[u8],
        poll_attempts: u32,
    ) -> Result<WriteOutcome> {
        check_password_overlap("write_system_memory", offset, bytes.len())?;
        self.write_raw(
            "write_system_memory",
            MemorySpace::System,
            offset,
            bytes,
            poll_attempts,
        )
    }

    /// Write `bytes` to user EEPROM at `offset`, then poll for completion
    /// up to `poll_attempts` times.
    pub fn write_user_memory(
        &mut self,
        offset: u16,
        bytes: &[u8],
        poll_attempts: u32,
    ) -> Result<WriteOutcome> {
        check_user_range("write_user_memory", offset, bytes.len())?;
        self.write_raw(
            "write_user_memory",
            MemorySpace::User,
            offset,
            bytes,
            poll_attempts,
        )
    }

    /// Write a raw payload to the password register.
    ///
    /// This is the only path allowed to reach offset 0x0900. The payload must
    /// be a 17-byte presentation frame; a payload whose byte 8 is 0x07 (a
    /// password rewrite) is refused without touching the bus.
    pub fn write_password_payload(
        &mut self,
        payload: &[u8],
        poll_attempts: u32,
    ) -> Result<WriteOutcome> {
        const OP: &str = "write_password_payload";
        validate_payload(payload).map_err(|reason| St25dvError::ProtectedRegister {
            op: OP,
            offset: I2C_PWD_OFFSET,
            reason,
        })?;
        self.write_raw(OP, MemorySpace::System, I2C_PWD_OFFSET, payload, poll_attempts)
    }

    // ------------------------------------------------------------------
    // Catalog access
    // ------------------------------------------------------------------

    /// Read a catalog register in full
    pub fn read_register(&mut self, register: Register) -> Result<Vec<u8>> {
        self.read_catalog("read_register", register)
    }

    /// Write a catalog register in full.
    ///
    /// Read-only registers and the password register are refused, and
    /// `bytes` must match the register width.
    pub fn write_register(
        &mut self,
        register: Register,
        bytes: &[u8],
        poll_attempts: u32,
    ) -> Result<WriteOutcome> {
        self.write_catalog("write_register", register, bytes, poll_attempts)
    }

    fn read_catalog(&mut self, op: &'static str, register: Register) -> Result<Vec<u8>> {
        let desc = register.descriptor();
        if !desc.access.readable() {
            return Err(St25dvError::ProtectedRegister {
                op,
                offset: desc.offset,
                reason: "register is write-only",
            });
        }
        self.read_raw(op, desc.space, desc.offset, desc.len)
    }

    fn write_catalog(
        &mut self,
        op: &'static str,
        register: Register,
        bytes: &[u8],
        poll_attempts: u32,
    ) -> Result<WriteOutcome> {
        let desc = register.descriptor();
        if register == Register::I2cPwd {
            return Err(St25dvError::ProtectedRegister {
                op,
                offset: desc.offset,
                reason: "the password is only written by unlock",
            });
        }
        if !desc.access.writable() {
            return Err(St25dvError::ProtectedRegister {
                op,
                offset: desc.offset,
                reason: "register is read-only",
            });
        }
        if bytes.len() != desc.len {
            return Err(St25dvError::LengthMismatch {
                op,
                register: desc.name,
                expected: desc.len,
                actual: bytes.len(),
            });
        }
        if desc.is_dynamic() {
            log::debug!("{op}: {} is volatile and resets on power loss", desc.name);
        }
        self.write_raw(op, desc.space, desc.offset, bytes, poll_attempts)
    }

    // ------------------------------------------------------------------
    // Typed operations
    // ------------------------------------------------------------------

    /// Read IC_REF and classify the silicon.
    ///
    /// The result is remembered and consulted by [`St25dvDriver::supports`].
    pub fn detect_variant(&mut self) -> Result<IcVariant> {
        let ic_ref = self.read_ic_ref()?;
        self.classify("detect_variant", ic_ref)
    }

    fn classify(&mut self, op: &'static str, ic_ref: u8) -> Result<IcVariant> {
        let variant = IcVariant::from_ic_ref(ic_ref).map_err(|_| {
            log::error!("{op}: IC_REF 0x{ic_ref:02X} matches neither K nor KC series");
            unknown_silicon(op, ic_ref)
        })?;
        log::debug!("Detected {variant} series part (IC_REF 0x{ic_ref:02X})");
        self.variant = Some(variant);
        Ok(variant)
    }

    pub fn read_ic_ref(&mut self) -> Result<u8> {
        let bytes = self.read_catalog("read_ic_ref", Register::IcRef)?;
        Ok(bytes[0])
    }

    /// Read the 8-byte UID from system memory
    pub fn read_device_uid(&mut self) -> Result<[u8; 8]> {
        let bytes = self.read_catalog("read_device_uid", Register::Uid)?;
        let mut uid = [0u8; 8];
        uid.copy_from_slice(&bytes);
        Ok(uid)
    }

    /// Read the I2C_CTRL register.
    ///
    /// The register only exists on KC parts. On K parts the chip still
    /// answers and the byte is meaningless; check `detect_variant` first.
    pub fn read_i2c_control(&mut self) -> Result<u8> {
        if self.variant == Some(IcVariant::K) {
            log::warn!("Reading I2C_CTRL on a K series part; the value is undefined");
        }
        let bytes = self.read_catalog("read_i2c_control", Register::I2cCtrl)?;
        Ok(bytes[0])
    }

    /// Read I2C_SSO_DYN; `true` when an I2C security session is open.
    ///
    /// Never cached: the chip closes the session on its own.
    pub fn read_security_session_state(&mut self) -> Result<bool> {
        let bytes = self.read_catalog("read_security_session_state", Register::I2cSsoDyn)?;
        Ok(bytes[0] == 1)
    }

    /// Decode the RF security status of one user area
    pub fn read_area_security(&mut self, area: UserArea) -> Result<AreaSecurity> {
        let bytes = self.read_catalog("read_area_security", area.security_register())?;
        Ok(AreaSecurity::decode(bytes[0]))
    }

    pub fn write_area_security(
        &mut self,
        area: UserArea,
        security: AreaSecurity,
        poll_attempts: u32,
    ) -> Result<WriteOutcome> {
        self.write_catalog(
            "write_area_security",
            area.security_register(),
            &[security.encode()],
            poll_attempts,
        )
    }

    /// Detect the variant and collect identity and memory geometry.
    pub fn read_tag_info(&mut self) -> Result<TagInfo> {
        let ic_ref = self.read_ic_ref()?;
        let variant = self.classify("read_tag_info", ic_ref)?;
        let i2c_ctrl = if variant.is_kc() {
            Some(self.read_i2c_control()?)
        } else {
            None
        };
        let uid = self.read_device_uid()?;
        let mem_size = self.read_catalog("read_tag_info", Register::MemSize)?;
        let blk_size = self.read_catalog("read_tag_info", Register::BlkSize)?;

        Ok(TagInfo {
            variant,
            ic_ref,
            uid,
            i2c_ctrl,
            block_count: u32::from(u16::from_le_bytes([mem_size[0], mem_size[1]])) + 1,
            block_size: u32::from(blk_size[0]) + 1,
        })
    }

    // ------------------------------------------------------------------
    // Security session
    // ------------------------------------------------------------------

    /// Open an I2C security session by presenting `password`.
    ///
    /// Runs the handshake states in order:
    ///
    /// 1. CHECK - read the session state; an open session returns `true`
    ///    without sending anything.
    /// 2. SEND - write `pwd ‖ 0x09 ‖ pwd` to the password register.
    /// 3. VERIFY - re-read the session state and return it.
    ///
    /// A rejected password is `Ok(false)`; there is no retry.
    pub fn unlock(&mut self, password: &Password) -> Result<bool> {
        // CHECK
        if self.read_security_session_state()? {
            log::info!("I2C security session already open, not presenting password");
            return Ok(true);
        }

        // SEND
        let frame = password.presentation_frame();
        self.write_password_payload(frame.as_bytes(), 0)?;

        // VERIFY
        let open = self.read_security_session_state()?;
        if open {
            log::info!("I2C security session opened");
        } else {
            log::warn!("I2C password rejected, session remains closed");
        }
        Ok(open)
    }

    /// `unlock` with the factory password (eight zero bytes)
    pub fn unlock_with_factory_password(&mut self) -> Result<bool> {
        self.unlock(&Password::default())
    }

    // ------------------------------------------------------------------
    // Lock operations
    // ------------------------------------------------------------------

    /// Lock the capability container (LOCK_CCFILE) with the configured policy
    pub fn lock_config_area(&mut self) -> Result<WriteOutcome> {
        let value = self.config.lock_policy.cc_file.bits();
        self.write_lock("lock_config_area", Register::LockCcfile, value)
    }

    /// Lock the RF configuration (LOCK_CFG) with the configured policy
    pub fn lock_cfg(&mut self) -> Result<WriteOutcome> {
        let value = self.config.lock_policy.cfg.bits();
        self.write_lock("lock_cfg", Register::LockCfg, value)
    }

    /// Apply the configured RF security status to area 1 (RFA1SS)
    pub fn lock_rfa1_session(&mut self) -> Result<WriteOutcome> {
        let value = self.config.lock_policy.rfa1.encode();
        self.write_lock("lock_rfa1_session", Register::Rfa1ss, value)
    }

    fn write_lock(
        &mut self,
        op: &'static str,
        register: Register,
        value: u8,
    ) -> Result<WriteOutcome> {
        log::info!("{op}: writing 0x{value:02X} to {register}");
        let attempts = self.config.write_poll_attempts;
        self.write_catalog(op, register, &[value], attempts)
    }

    // ------------------------------------------------------------------
    // Bus access
    // ------------------------------------------------------------------

    fn read_raw(
        &mut self,
        op: &'static str,
        space: MemorySpace,
        offset: u16,
        len: usize,
    ) -> Result<Vec<u8>> {
        let target = space.device_address();
        log::debug!("{op}: read {len} bytes at 0x{offset:04X} from {space}");

        let data = self
            .transport
            .exchange(target, &offset.to_be_bytes(), len)
            .map_err(|source| St25dvError::Transport {
                op,
                target,
                offset,
                source,
            })?;

        if data.len() != len {
            return Err(St25dvError::ShortRead {
                op,
                target,
                offset,
                expected: len,
                actual: data.len(),
            });
        }

        log::trace!("{op}: <- [{}]", format_hex_compact(&data));
        Ok(data)
    }

    fn write_raw(
        &mut self,
        op: &'static str,
        space: MemorySpace,
        offset: u16,
        bytes: &[u8],
        poll_attempts: u32,
    ) -> Result<WriteOutcome> {
        let target = space.device_address();
        log::debug!("{op}: write {} bytes at 0x{offset:04X} to {space}", bytes.len());
        if space == MemorySpace::System && offset == I2C_PWD_OFFSET {
            log::trace!("{op}: -> [password frame redacted]");
        } else {
            log::trace!("{op}: -> [{}]", format_hex_compact(bytes));
        }

        let mut frame = Vec::with_capacity(2 + bytes.len());
        frame.extend_from_slice(&offset.to_be_bytes());
        frame.extend_from_slice(bytes);

        let result = self.transport.exchange(target, &frame, 0);
        if space == MemorySpace::System && offset == I2C_PWD_OFFSET {
            zeroize::Zeroize::zeroize(&mut frame);
        }
        result.map_err(|source| St25dvError::Transport {
            op,
            target,
            offset,
            source,
        })?;

        if poll_attempts == 0 {
            return Ok(WriteOutcome::Unconfirmed);
        }
        self.wait_for_write(op, target, offset, poll_attempts)
    }

    /// Poll the target until it acknowledges or `attempts` polls are spent.
    fn wait_for_write(
        &mut self,
        op: &'static str,
        target: u8,
        offset: u16,
        attempts: u32,
    ) -> Result<WriteOutcome> {
        for attempt in 1..=attempts {
            let acked = self
                .transport
                .poll_ack(target)
                .map_err(|source| St25dvError::Transport {
                    op,
                    target,
                    offset,
                    source,
                })?;
            if acked {
                log::debug!("{op}: write acknowledged after {attempt} poll(s)");
                return Ok(WriteOutcome::Acknowledged { attempt });
            }
        }

        log::warn!("{op}: write at 0x{offset:04X} on 0x{target:02X} not acknowledged");
        log::debug!("{op}: gave up after {attempts} polls");
        Ok(WriteOutcome::TimedOut {
            target,
            offset,
            attempts,
        })
    }
}

/// Reject user accesses reaching past the EEPROM
fn check_user_range(op: &'static str, offset: u16, len: usize) -> Result<()> {
    let last = (offset as usize).checked_add(len.saturating_sub(1));
    if offset > USER_MEMORY_END || last.map_or(true, |last| last > USER_MEMORY_END as usize) {
        return Err(St25dvError::AddressOutOfRange {
            op,
            offset,
            len,
            max: USER_MEMORY_END,
        });
    }
    Ok(())
}

/// Reject generic system writes touching the password register
fn check_password_overlap(op: &'static str, offset: u16, len: usize) -> Result<()> {
    let start = offset as usize;
    let end = start.saturating_add(len.max(1));
    let pwd_start = I2C_PWD_OFFSET as usize;
    let pwd_end = pwd_start + I2C_PWD_LEN;
    if start < pwd_end && pwd_start < end {
        return Err(St25dvError::ProtectedRegister {
            op,
            offset,
            reason: "the password register is only written by unlock",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockI2cBus, Transaction, TransportError};

    fn driver() -> (St25dvDriver<MockI2cBus>, MockI2cBus) {
        let bus = MockI2cBus::new();
        (St25dvDriver::new(bus.clone()), bus)
    }

    #[test]
    fn test_read_sends_big_endian_offset() {
        let (mut drv, bus) = driver();
        drv.read_system_memory(0x0123, 3).unwrap();
        assert_eq!(
            bus.transactions(),
            vec![Transaction::Exchange {
                target: 0x57,
                write: vec![0x01, 0x23],
                read_len: 3
            }]
        );
    }

    #[test]
    fn test_write_frame_layout() {
        let (mut drv, bus) = driver();
        let outcome = drv.write_user_memory(0x1FFE, &[0xAA, 0xBB], 0).unwrap();
        assert_eq!(outcome, WriteOutcome::Unconfirmed);
        assert_eq!(
            bus.transactions(),
            vec![Transaction::Exchange {
                target: 0x53,
                write: vec![0x1F, 0xFE, 0xAA, 0xBB],
                read_len: 0
            }]
        );
    }

    #[test]
    fn test_user_end_range() {
        let (mut drv, bus) = driver();
        assert!(matches!(
            drv.read_user_memory(0x1FFF, 2),
            Err(St25dvError::AddressOutOfRange { offset: 0x1FFF, len: 2, .. })
        ));
        assert!(drv.read_user_memory(0x1FFF, 1).is_ok());
        assert!(drv.read_user_memory(0x1FFF, 0).is_ok());
        assert_eq!(bus.exchange_count(), 2);
    }

    #[test]
    fn test_password_overlap_guard() {
        let (mut drv, bus) = driver();
        for (offset, len) in [(0x0900u16, 1usize), (0x08F8, 9), (0x0907, 4), (0x0900, 0)] {
            assert!(matches!(
                drv.write_system_memory(offset, &vec![0u8; len], 0),
                Err(St25dvError::ProtectedRegister { .. })
            ));
        }
        assert!(drv.write_system_memory(0x08F8, &[0u8; 8], 0).is_ok());
        assert!(drv.write_system_memory(0x0908, &[0u8; 1], 0).is_ok());
        assert_eq!(bus.exchange_count(), 2);
    }

    #[test]
    fn test_huge_lengths_do_not_overflow_guards() {
        let (mut drv, bus) = driver();
        assert!(matches!(
            drv.read_user_memory(0x1FFF, usize::MAX),
            Err(St25dvError::AddressOutOfRange { len: usize::MAX, .. })
        ));
        assert!(matches!(
            drv.read_user_memory(0xFFFF, usize::MAX),
            Err(St25dvError::AddressOutOfRange { .. })
        ));
        assert!(check_user_range("op", 0x0001, usize::MAX - 1).is_err());
        assert!(check_password_overlap("op", 0x0000, usize::MAX).is_err());
        assert!(check_password_overlap("op", 0xFFFF, usize::MAX).is_ok());
        assert_eq!(bus.exchange_count(), 0);
    }

    #[test]
    fn test_catalog_write_guards() {
        let (mut drv, bus) = driver();
        assert!(matches!(
            drv.write_register(Register::Uid, &[0u8; 8], 0),
            Err(St25dvError::ProtectedRegister { offset: 0x0018, .. })
        ));
        assert!(matches!(
            drv.write_register(Register::I2cPwd, &[0u8; 8], 0),
            Err(St25dvError::ProtectedRegister { offset: 0x0900, .. })
        ));
        assert!(matches!(
            drv.write_register(Register::LockCfg, &[1, 1], 0),
            Err(St25dvError::LengthMismatch { expected: 1, actual: 2, .. })
        ));
        assert!(matches!(
            drv.read_register(Register::I2cPwd),
            Err(St25dvError::ProtectedRegister { .. })
        ));
        assert_eq!(bus.exchange_count(), 0);
    }

    #[test]
    fn test_dynamic_register_bypasses_eeprom_ceiling() {
        let (mut drv, bus) = driver();
        bus.set_session_open(true);
        assert!(drv.read_security_session_state().unwrap());
        assert_eq!(bus.exchanges()[0].offset(), Some(0x2004));
        assert_eq!(bus.exchanges()[0].target(), 0x53);
    }

    #[test]
    fn test_poll_short_circuits() {
        let (mut drv, bus) = driver();
        bus.queue_ack_responses(&[false, false, true]);
        let outcome = drv.write_system_memory(0x0010, &[1], 5).unwrap();
        assert_eq!(outcome, WriteOutcome::Acknowledged { attempt: 3 });
        assert_eq!(bus.poll_count(), 3);
    }

    #[test]
    fn test_timeout_escalation() {
        let outcome = WriteOutcome::TimedOut {
            target: 0x57,
            offset: 0x000C,
            attempts: 2,
        };
        assert!(outcome.is_timed_out());
        assert!(matches!(
            outcome.ensure_completed("lock"),
            Err(St25dvError::WriteTimeout { attempts: 2, .. })
        ));
        assert_eq!(
            WriteOutcome::Unconfirmed.ensure_completed("x").unwrap(),
            WriteOutcome::Unconfirmed
        );
    }

    #[test]
    fn test_transport_error_context() {
        let (mut drv, bus) = driver();
        bus.fail_next(TransportError::Nack { target: 0x57 });
        match drv.read_device_uid() {
            Err(St25dvError::Transport {
                op,
                target,
                offset,
                source: TransportError::Nack { .. },
            }) => {
                assert_eq!(op, "read_device_uid");
                assert_eq!(target, 0x57);
                assert_eq!(offset, 0x0018);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_supports_before_and_after_detection() {
        let (mut drv, _bus) = driver();
        assert!(!drv.supports(Register::I2cCtrl));
        assert!(drv.supports(Register::Uid));
        drv.detect_variant().unwrap();
        assert!(drv.supports(Register::I2cCtrl));
    }

    #[test]
    fn test_tag_info() {
        let (mut drv, _bus) = driver();
        let info = drv.read_tag_info().unwrap();
        assert_eq!(info.variant, IcVariant::Kc);
        assert_eq!(info.block_count, 2048);
        assert_eq!(info.block_size, 4);
        assert_eq!(info.user_memory_bytes(), 8192);
        assert!(info.uid_hex().starts_with("E002"));
        assert!(info.i2c_ctrl.is_some());
    }
}
