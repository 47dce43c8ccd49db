//! Tests for the register catalog and variant gating.

use st25dv_rs::registers::{
    Access, Applicability, MemorySpace, Register, UserArea, DYNAMIC_REGISTER_BASE,
    USER_MEMORY_END,
};
use st25dv_rs::variant::{part_names, IcVariant};
use st25dv_rs::REGISTER_CATALOG;

#[test]
fn test_datasheet_addresses() {
    let expected: &[(Register, MemorySpace, u16, usize)] = &[
        (Register::Uid, MemorySpace::System, 0x0018, 8),
        (Register::IcRef, MemorySpace::System, 0x0017, 1),
        (Register::I2cCtrl, MemorySpace::System, 0x000E, 1),
        (Register::I2cPwd, MemorySpace::System, 0x0900, 8),
        (Register::I2cSsoDyn, MemorySpace::User, 0x2004, 1),
        (Register::LockCcfile, MemorySpace::System, 0x000C, 1),
        (Register::LockCfg, MemorySpace::System, 0x000F, 1),
        (Register::Rfa1ss, MemorySpace::System, 0x0004, 1),
        (Register::Rfa2ss, MemorySpace::System, 0x0006, 1),
        (Register::Rfa3ss, MemorySpace::System, 0x0008, 1),
        (Register::Rfa4ss, MemorySpace::System, 0x000A, 1),
    ];

    for &(register, space, offset, len) in expected {
        let desc = register.descriptor();
        assert_eq!(desc.space, space, "{register}");
        assert_eq!(desc.offset, offset, "{register}");
        assert_eq!(desc.len, len, "{register}");
    }
}

#[test]
fn test_catalog_is_complete_and_unique() {
    assert_eq!(REGISTER_CATALOG.len(), Register::ALL.len());

    let mut seen = std::collections::HashSet::new();
    for (_, desc) in REGISTER_CATALOG.iter() {
        assert!(seen.insert((desc.space, desc.offset)), "duplicate {}", desc.name);
    }
}

#[test]
fn test_lookup_by_name() {
    assert_eq!(REGISTER_CATALOG.find_by_name("i2c_sso_dyn"), Some(Register::I2cSsoDyn));
    assert_eq!(REGISTER_CATALOG.find_by_name("UID"), Some(Register::Uid));
    assert_eq!(REGISTER_CATALOG.find_by_name("NOPE"), None);
}

#[test]
fn test_access_rules() {
    assert_eq!(Register::I2cPwd.descriptor().access, Access::WriteOnly);
    assert_eq!(Register::I2cSsoDyn.descriptor().access, Access::ReadOnly);
    assert!(!Register::Uid.descriptor().access.writable());
    assert!(Register::LockCfg.descriptor().access.writable());
}

#[test]
fn test_only_dynamic_registers_above_eeprom() {
    for (register, desc) in REGISTER_CATALOG.iter() {
        if desc.space == MemorySpace::User {
            assert!(desc.offset >= DYNAMIC_REGISTER_BASE, "{register}");
            assert!(desc.is_dynamic());
        } else {
            assert!(!desc.is_dynamic());
        }
    }
    assert!(USER_MEMORY_END < DYNAMIC_REGISTER_BASE);
}

#[test]
fn test_variant_gating() {
    assert_eq!(Register::I2cCtrl.descriptor().applicability, Applicability::KcOnly);
    assert!(IcVariant::Kc.supports(Register::I2cCtrl));
    assert!(!IcVariant::K.supports(Register::I2cCtrl));
    for register in Register::ALL {
        if register != Register::I2cCtrl {
            assert!(IcVariant::K.supports(register), "{register}");
            assert!(IcVariant::Kc.supports(register), "{register}");
        }
    }
}

#[test]
fn test_user_areas_map_to_security_registers() {
    let offsets: Vec<u16> = UserArea::ALL
        .iter()
        .map(|area| area.security_register().descriptor().offset)
        .collect();
    assert_eq!(offsets, vec![0x0004, 0x0006, 0x0008, 0x000A]);
}

#[test]
fn test_part_names() {
    assert_eq!(part_names(0x51), &["ST25DV16KC", "ST25DV64KC"]);
    assert!(part_names(0xFF).is_empty());
}
