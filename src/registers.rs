//! # ST25DV Register Catalog
//!
//! Register addresses, memory spaces and field encodings for the ST25DVxxK and
//! ST25DVxxKC families. The values come from the ST25DV64KC datasheet.
//!
//! ## Address spaces
//!
//! The chip exposes two address spaces over I2C, selected by the device-select
//! byte rather than by the memory offset:
//!
//! ```text
//! Device select │ 7-bit addr │ Space
//! ──────────────┼────────────┼──────────────────────────────────────
//! E2=0 E1=1     │ 0x53       │ User memory + dynamic registers
//! E2=1 E1=1     │ 0x57       │ System memory (config, UID, password)
//! ```
//!
//! Two further addresses (0x51, 0x55) switch the RF front end off and on; the
//! driver does not use them.
//!
//! ## Catalog
//!
//! Every named register lives in [`REGISTER_CATALOG`], built once on first
//! use. Looking up a register cannot fail.
//!
//! ```rust
//! use st25dv_rs::registers::{MemorySpace, Register};
//!
//! let uid = Register::Uid.descriptor();
//! assert_eq!(uid.space, MemorySpace::System);
//! assert_eq!(uid.offset, 0x0018);
//! assert_eq!(uid.len, 8);
//! ```

use crate::variant::IcVariant;
use bitflags::bitflags;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 7-bit I2C address of the system memory space
pub const SYSTEM_DEVICE_ADDR: u8 = 0x57;

/// 7-bit I2C address of the user memory space
pub const USER_DEVICE_ADDR: u8 = 0x53;

/// Last valid user EEPROM offset on the 64-Kbit part
pub const USER_MEMORY_END: u16 = 0x1FFF;

/// First dynamic register offset in the user address space
pub const DYNAMIC_REGISTER_BASE: u16 = 0x2000;

/// I2C password register offset in system memory
pub const I2C_PWD_OFFSET: u16 = 0x0900;

/// I2C password length in bytes
pub const I2C_PWD_LEN: usize = 8;

/// Address space selected by the device-select byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemorySpace {
    System,
    User,
}

impl MemorySpace {
    /// 7-bit I2C target address used for every access to this space
    pub const fn device_address(self) -> u8 {
        match self {
            MemorySpace::System => SYSTEM_DEVICE_ADDR,
            MemorySpace::User => USER_DEVICE_ADDR,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            MemorySpace::System => "system",
            MemorySpace::User => "user",
        }
    }
}

impl fmt::Display for MemorySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.device_address())
    }
}

/// Host-side access permitted on a register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    pub const fn readable(self) -> bool {
        matches!(self, Access::ReadOnly | Access::ReadWrite)
    }

    pub const fn writable(self) -> bool {
        matches!(self, Access::WriteOnly | Access::ReadWrite)
    }
}

/// Which silicon revisions implement a register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    KOnly,
    KcOnly,
    Both,
}

impl Applicability {
    pub const fn applies_to(self, variant: IcVariant) -> bool {
        match (self, variant) {
            (Applicability::Both, _) => true,
            (Applicability::KOnly, IcVariant::K) => true,
            (Applicability::KcOnly, IcVariant::Kc) => true,
            _ => false,
        }
    }
}

/// Static description of one register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDescriptor {
    /// Datasheet name, e.g. "I2C_SSO_DYN"
    pub name: &'static str,
    pub space: MemorySpace,
    /// Two-byte memory offset, sent big-endian on the wire
    pub offset: u16,
    /// Register width in bytes
    pub len: usize,
    pub access: Access,
    pub applicability: Applicability,
}

impl RegisterDescriptor {
    const fn new(
        name: &'static str,
        space: MemorySpace,
        offset: u16,
        len: usize,
        access: Access,
        applicability: Applicability,
    ) -> Self {
        Self {
            name,
            space,
            offset,
            len,
            access,
            applicability,
        }
    }

    /// True when the register lies in the dynamic (volatile) register window
    pub const fn is_dynamic(&self) -> bool {
        matches!(self.space, MemorySpace::User) && self.offset >= DYNAMIC_REGISTER_BASE
    }
}

/// Named registers known to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// RF area 1 security status
    Rfa1ss,
    /// End of area 1
    Enda1,
    Rfa2ss,
    Enda2,
    Rfa3ss,
    Enda3,
    Rfa4ss,
    /// I2C area security status
    I2css,
    /// Capability container lock
    LockCcfile,
    /// I2C configuration (KC series only)
    I2cCtrl,
    /// System configuration lock
    LockCfg,
    /// User memory size in blocks, minus one (LSB first)
    MemSize,
    /// Block size in bytes, minus one
    BlkSize,
    /// Silicon reference
    IcRef,
    /// 64-bit unique identifier
    Uid,
    /// I2C password
    I2cPwd,
    /// GPO control (dynamic)
    GpoCtrlDyn,
    /// RF management (dynamic)
    RfMngtDyn,
    /// I2C security session status (dynamic)
    I2cSsoDyn,
}

impl Register {
    pub const ALL: [Register; 19] = [
        Register::Rfa1ss,
        Register::Enda1,
        Register::Rfa2ss,
        Register::Enda2,
        Register::Rfa3ss,
        Register::Enda3,
        Register::Rfa4ss,
        Register::I2css,
        Register::LockCcfile,
        Register::I2cCtrl,
        Register::LockCfg,
        Register::MemSize,
        Register::BlkSize,
        Register::IcRef,
        Register::Uid,
        Register::I2cPwd,
        Register::GpoCtrlDyn,
        Register::RfMngtDyn,
        Register::I2cSsoDyn,
    ];

    /// Catalog entry for this register
    pub fn descriptor(self) -> &'static RegisterDescriptor {
        REGISTER_CATALOG.get(self)
    }

    const fn definition(self) -> RegisterDescriptor {
        use Access::*;
        use Applicability::*;
        use MemorySpace::*;
        use RegisterDescriptor as D;

        match self {
            Register::Rfa1ss => D::new("RFA1SS", System, 0x0004, 1, ReadWrite, Both),
            Register::Enda1 => D::new("ENDA1", System, 0x0005, 1, ReadWrite, Both),
            Register::Rfa2ss => D::new("RFA2SS", System, 0x0006, 1, ReadWrite, Both),
            Register::Enda2 => D::new("ENDA2", System, 0x0007, 1, ReadWrite, Both),
            Register::Rfa3ss => D::new("RFA3SS", System, 0x0008, 1, ReadWrite, Both),
            Register::Enda3 => D::new("ENDA3", System, 0x0009, 1, ReadWrite, Both),
            Register::Rfa4ss => D::new("RFA4SS", System, 0x000A, 1, ReadWrite, Both),
            Register::I2css => D::new("I2CSS", System, 0x000B, 1, ReadWrite, Both),
            Register::LockCcfile => D::new("LOCK_CCFILE", System, 0x000C, 1, ReadWrite, Both),
            Register::I2cCtrl => D::new("I2C_CTRL", System, 0x000E, 1, ReadWrite, KcOnly),
            Register::LockCfg => D::new("LOCK_CFG", System, 0x000F, 1, ReadWrite, Both),
            Register::MemSize => D::new("MEM_SIZE", System, 0x0014, 2, ReadOnly, Both),
            Register::BlkSize => D::new("BLK_SIZE", System, 0x0016, 1, ReadOnly, Both),
            Register::IcRef => D::new("IC_REF", System, 0x0017, 1, ReadOnly, Both),
            Register::Uid => D::new("UID", System, 0x0018, 8, ReadOnly, Both),
            Register::I2cPwd => D::new(
                "I2C_PWD",
                System,
                I2C_PWD_OFFSET,
                I2C_PWD_LEN,
                WriteOnly,
                Both,
            ),
            Register::GpoCtrlDyn => D::new("GPO_CTRL_DYN", User, 0x2000, 1, ReadWrite, Both),
            Register::RfMngtDyn => D::new("RF_MNGT_DYN", User, 0x2003, 1, ReadWrite, Both),
            Register::I2cSsoDyn => D::new("I2C_SSO_DYN", User, 0x2004, 1, ReadOnly, Both),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

/// One of the four user memory areas delimited by ENDA1..ENDA3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserArea {
    Area1,
    Area2,
    Area3,
    Area4,
}

impl UserArea {
    pub const ALL: [UserArea; 4] = [
        UserArea::Area1,
        UserArea::Area2,
        UserArea::Area3,
        UserArea::Area4,
    ];

    /// RFAxSS register holding this area's RF security status
    pub const fn security_register(self) -> Register {
        match self {
            UserArea::Area1 => Register::Rfa1ss,
            UserArea::Area2 => Register::Rfa2ss,
            UserArea::Area3 => Register::Rfa3ss,
            UserArea::Area4 => Register::Rfa4ss,
        }
    }

    /// 1-based area number as used in the datasheet
    pub const fn number(self) -> u8 {
        match self {
            UserArea::Area1 => 1,
            UserArea::Area2 => 2,
            UserArea::Area3 => 3,
            UserArea::Area4 => 4,
        }
    }
}

/// Immutable register lookup table
#[derive(Debug)]
pub struct RegisterCatalog {
    entries: Vec<RegisterDescriptor>,
    by_name: HashMap<&'static str, Register>,
}

impl RegisterCatalog {
    fn builtin() -> Self {
        let entries: Vec<RegisterDescriptor> =
            Register::ALL.iter().map(|reg| reg.definition()).collect();
        let by_name = Register::ALL
            .iter()
            .map(|&reg| (reg.definition().name, reg))
            .collect();

        Self { entries, by_name }
    }

    /// Descriptor for `register`
    pub fn get(&self, register: Register) -> &RegisterDescriptor {
        // `entries` is built from `Register::ALL`, which lists the variants in
        // declaration order.
        &self.entries[register as usize]
    }

    /// Case-insensitive lookup by datasheet name
    pub fn find_by_name(&self, name: &str) -> Option<Register> {
        self.by_name.get(name.to_ascii_uppercase().as_str()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Register, &RegisterDescriptor)> + '_ {
        Register::ALL.iter().map(move |&reg| (reg, self.get(reg)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The register catalog, built on first access
pub static REGISTER_CATALOG: Lazy<RegisterCatalog> = Lazy::new(RegisterCatalog::builtin);

bitflags! {
    /// LOCK_CCFILE contents: write-lock of the first two user memory blocks
    /// (the NDEF capability container) from the RF side.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CcFileLock: u8 {
        /// Lock user block 0
        const BLOCK0 = 0b0000_0001;
        /// Lock user block 1
        const BLOCK1 = 0b0000_0010;
    }
}

bitflags! {
    /// LOCK_CFG contents: once set, the RF side can no longer change the
    /// system configuration.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ConfigLock: u8 {
        const LOCKED = 0b0000_0001;
    }
}

/// Which RF password protects an area (RFAxSS bits 1:0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaPassword {
    None,
    Password1,
    Password2,
    Password3,
}

/// RF read/write protection of an area (RFAxSS bits 3:2).
///
/// Area 1 is always readable, so on RFA1SS the two password-read settings
/// only restrict writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfProtection {
    /// Read and write always allowed
    Open,
    /// Read always allowed, write with password
    WriteWithPassword,
    /// Read and write with password
    ReadWriteWithPassword,
    /// Read with password, write forbidden
    WriteForbidden,
}

/// Decoded RFAxSS register value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSecurity {
    pub password: AreaPassword,
    pub protection: RfProtection,
}

impl AreaSecurity {
    const PWD_MASK: u8 = 0b0000_0011;
    const PROT_SHIFT: u8 = 2;

    pub const fn encode(self) -> u8 {
        let pwd = match self.password {
            AreaPassword::None => 0b00,
            AreaPassword::Password1 => 0b01,
            AreaPassword::Password2 => 0b10,
            AreaPassword::Password3 => 0b11,
        };
        let prot = match self.protection {
            RfProtection::Open => 0b00,
            RfProtection::WriteWithPassword => 0b01,
            RfProtection::ReadWriteWithPassword => 0b10,
            RfProtection::WriteForbidden => 0b11,
        };
        (prot << Self::PROT_SHIFT) | pwd
    }

    /// Decode a raw register byte; bits 7:4 are reserved and ignored
    pub const fn decode(raw: u8) -> Self {
        let password = match raw & Self::PWD_MASK {
            0b00 => AreaPassword::None,
            0b01 => AreaPassword::Password1,
            0b10 => AreaPassword::Password2,
            _ => AreaPassword::Password3,
        };
        let protection = match (raw >> Self::PROT_SHIFT) & 0b11 {
            0b00 => RfProtection::Open,
            0b01 => RfProtection::WriteWithPassword,
            0b10 => RfProtection::ReadWriteWithPassword,
            _ => RfProtection::WriteForbidden,
        };
        Self {
            password,
            protection,
        }
    }
}

impl Default for AreaSecurity {
    fn default() -> Self {
        Self {
            password: AreaPassword::None,
            protection: RfProtection::Open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_register() {
        assert_eq!(REGISTER_CATALOG.len(), Register::ALL.len());
        for reg in Register::ALL {
            assert_eq!(REGISTER_CATALOG.get(reg), &reg.definition());
        }
    }

    #[test]
    fn test_find_by_name() {
        assert_eq!(REGISTER_CATALOG.find_by_name("i2c_sso_dyn"), Some(Register::I2cSsoDyn));
        assert_eq!(REGISTER_CATALOG.find_by_name("LOCK_CCFILE"), Some(Register::LockCcfile));
        assert_eq!(REGISTER_CATALOG.find_by_name("NOPE"), None);
    }

    #[test]
    fn test_dynamic_window() {
        assert!(Register::I2cSsoDyn.descriptor().is_dynamic());
        assert!(Register::GpoCtrlDyn.descriptor().is_dynamic());
        assert!(!Register::Uid.descriptor().is_dynamic());
    }

    #[test]
    fn test_area_security_codec() {
        let write_forbidden = AreaSecurity {
            password: AreaPassword::None,
            protection: RfProtection::WriteForbidden,
        };
        assert_eq!(write_forbidden.encode(), 0x0C);
        assert_eq!(AreaSecurity::decode(0x0C), write_forbidden);

        let pwd2 = AreaSecurity::decode(0x06);
        assert_eq!(pwd2.password, AreaPassword::Password2);
        assert_eq!(pwd2.protection, RfProtection::WriteWithPassword);

        // reserved high bits are dropped
        assert_eq!(AreaSecurity::decode(0xF6), pwd2);
        assert_eq!(AreaSecurity::default().encode(), 0x00);
    }

    #[test]
    fn test_lock_bits() {
        assert_eq!((CcFileLock::BLOCK0 | CcFileLock::BLOCK1).bits(), 0x03);
        assert_eq!(CcFileLock::BLOCK1.bits(), 0x02);
        assert_eq!(ConfigLock::LOCKED.bits(), 0x01);
    }

    #[test]
    fn test_area_registers() {
        let offsets: Vec<u16> = UserArea::ALL
            .iter()
            .map(|a| a.security_register().descriptor().offset)
            .collect();
        assert_eq!(offsets, vec![0x0004, 0x0006, 0x0008, 0x000A]);
        assert_eq!(UserArea::Area3.number(), 3);
    }

    #[test]
    fn test_applicability() {
        assert!(Applicability::Both.applies_to(IcVariant::K));
        assert!(Applicability::KcOnly.applies_to(IcVariant::Kc));
        assert!(!Applicability::KcOnly.applies_to(IcVariant::K));
        assert!(!Applicability::KOnly.applies_to(IcVariant::Kc));
    }
}
