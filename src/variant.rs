//! # Silicon Variant Detection
//!
//! The ST25DV family ships in two generations. The newer "KC" parts add a
//! programmable I2C device code (the I2C_CTRL register) among other minor
//! differences. Both generations are told apart by the IC_REF byte in system
//! memory.
//!
//! ```text
//! IC_REF │ Part(s)                  │ Variant
//! ───────┼──────────────────────────┼────────
//! 0x24   │ ST25DV04K                │ K
//! 0x26   │ ST25DV16K, ST25DV64K     │ K
//! 0x50   │ ST25DV04KC               │ KC
//! 0x51   │ ST25DV16KC, ST25DV64KC   │ KC
//! ```

use crate::error::St25dvError;
use crate::registers::Register;
use std::fmt;

/// IC_REF codes of "K" series parts
pub const K_SERIES_IC_REFS: &[u8] = &[IcRef::St25dv04k as u8, IcRef::St25dv16k64k as u8];

/// IC_REF codes of "KC" series parts
pub const KC_SERIES_IC_REFS: &[u8] = &[IcRef::St25dv04kc as u8, IcRef::St25dv16kc64kc as u8];

/// Known IC_REF values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IcRef {
    St25dv04k = 0x24,
    St25dv16k64k = 0x26,
    St25dv04kc = 0x50,
    St25dv16kc64kc = 0x51,
}

impl IcRef {
    pub const fn variant(self) -> IcVariant {
        match self {
            IcRef::St25dv04k | IcRef::St25dv16k64k => IcVariant::K,
            IcRef::St25dv04kc | IcRef::St25dv16kc64kc => IcVariant::Kc,
        }
    }

    /// Product names sharing this code
    pub const fn part_names(self) -> &'static [&'static str] {
        match self {
            IcRef::St25dv04k => &["ST25DV04K"],
            IcRef::St25dv16k64k => &["ST25DV16K", "ST25DV64K"],
            IcRef::St25dv04kc => &["ST25DV04KC"],
            IcRef::St25dv16kc64kc => &["ST25DV16KC", "ST25DV64KC"],
        }
    }
}

impl TryFrom<u8> for IcRef {
    type Error = St25dvError;

    fn try_from(ic_ref: u8) -> Result<Self, Self::Error> {
        match ic_ref {
            0x24 => Ok(IcRef::St25dv04k),
            0x26 => Ok(IcRef::St25dv16k64k),
            0x50 => Ok(IcRef::St25dv04kc),
            0x51 => Ok(IcRef::St25dv16kc64kc),
            _ => Err(unknown_silicon("ic_ref", ic_ref)),
        }
    }
}

/// Silicon generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IcVariant {
    K,
    Kc,
}

impl IcVariant {
    /// Classify an IC_REF byte.
    ///
    /// An unknown code is a hard error: every later variant-gated decision
    /// would be unsafe.
    pub fn from_ic_ref(ic_ref: u8) -> Result<Self, St25dvError> {
        IcRef::try_from(ic_ref).map(IcRef::variant)
    }

    /// Whether `register` exists on this silicon
    pub fn supports(self, register: Register) -> bool {
        register.descriptor().applicability.applies_to(self)
    }

    pub const fn is_kc(self) -> bool {
        matches!(self, IcVariant::Kc)
    }
}

impl fmt::Display for IcVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcVariant::K => f.write_str("K"),
            IcVariant::Kc => f.write_str("KC"),
        }
    }
}

/// `UnknownSilicon` for `ic_ref` as read from the IC_REF register by `op`
pub(crate) fn unknown_silicon(op: &'static str, ic_ref: u8) -> St25dvError {
    let desc = Register::IcRef.descriptor();
    St25dvError::UnknownSilicon {
        op,
        target: desc.space.device_address(),
        offset: desc.offset,
        ic_ref,
    }
}

/// Product names sharing an IC_REF code
pub fn part_names(ic_ref: u8) -> &'static [&'static str] {
    match IcRef::try_from(ic_ref) {
        Ok(code) => code.part_names(),
        Err(_) => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(IcVariant::from_ic_ref(0x51).unwrap(), IcVariant::Kc);
        assert_eq!(IcVariant::from_ic_ref(0x50).unwrap(), IcVariant::Kc);
        assert_eq!(IcVariant::from_ic_ref(0x26).unwrap(), IcVariant::K);
        assert_eq!(IcVariant::from_ic_ref(0x24).unwrap(), IcVariant::K);
    }

    #[test]
    fn test_unknown_code() {
        assert!(matches!(
            IcVariant::from_ic_ref(0xFF),
            Err(St25dvError::UnknownSilicon {
                target: 0x57,
                offset: 0x0017,
                ic_ref: 0xFF,
                ..
            })
        ));
    }

    #[test]
    fn test_every_other_code_is_unknown() {
        for code in 0u8..=0xFF {
            let known = K_SERIES_IC_REFS.contains(&code) || KC_SERIES_IC_REFS.contains(&code);
            assert_eq!(IcVariant::from_ic_ref(code).is_ok(), known, "code 0x{code:02X}");
            assert_eq!(part_names(code).is_empty(), !known);
        }
    }

    #[test]
    fn test_ic_ref_discriminants() {
        assert_eq!(IcRef::try_from(0x51).unwrap(), IcRef::St25dv16kc64kc);
        assert_eq!(IcRef::St25dv16k64k as u8, 0x26);
        assert_eq!(IcRef::St25dv04kc.variant(), IcVariant::Kc);
        assert_eq!(IcRef::St25dv04k.part_names(), &["ST25DV04K"]);
    }

    #[test]
    fn test_i2c_ctrl_gating() {
        assert!(IcVariant::Kc.supports(Register::I2cCtrl));
        assert!(!IcVariant::K.supports(Register::I2cCtrl));
        assert!(IcVariant::K.supports(Register::Uid));
    }
}
