//! Platform-specific structures and relocation logic for ARM32/Thumb-2.

use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// `e_flags` for `EM_ARM`, decoded to the subset this loader cares about.
pub struct ElfHeaderFlagsARM32 {
    flags: ArmHeaderFlagBits,
    /// EABI version, the top byte of `e_flags`.
    pub abi_version: u8,
}

impl ElfHeaderFlagsARM32 {
    /// `EF_ARM_ABI_FLOAT_SOFT`
    pub const FLOAT_SOFT: u32 = 0x0020_0000;
    /// `EF_ARM_ABI_FLOAT_HARD`
    pub const FLOAT_HARD: u32 = 0x0000_0400;
    /// `EF_ARM_BE8`
    pub const BE8: u32 = 0x0080_0000;
    /// Mask isolating the EABI version byte.
    pub const ABI_MASK: u32 = 0xff00_0000;

    /// Decode from a raw `e_flags` value.
    pub fn from_raw(value: u32) -> Self {
        Self {
            flags: ArmHeaderFlagBits::from_bits_truncate(value),
            abi_version: ((value & Self::ABI_MASK) >> 24) as u8,
        }
    }

    /// Whether the object was built for the hard-float ABI.
    pub fn hard_float(&self) -> bool {
        self.flags.contains(ArmHeaderFlagBits::FLOAT_HARD)
    }

    /// Whether the object is byte-invariant big-endian (`BE8`).
    pub fn be8(&self) -> bool {
        self.flags.contains(ArmHeaderFlagBits::BE8)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct ArmHeaderFlagBits: u32 {
        const FLOAT_SOFT = ElfHeaderFlagsARM32::FLOAT_SOFT;
        const FLOAT_HARD = ElfHeaderFlagsARM32::FLOAT_HARD;
        const BE8 = ElfHeaderFlagsARM32::BE8;
    }
}

/// Patch a `R_ARM_ABS32` site: `*site = *site + symbol_address` (REL
/// semantics — the existing word at the site is the addend).
pub fn relocate_abs32(site: &mut [u8; 4], symbol_address: u32) {
    let addend = u32::from_le_bytes(*site);
    *site = addend.wrapping_add(symbol_address).to_le_bytes();
}

/// Patch a Thumb-2 `BL`/`B.W` pair (`R_ARM_THM_PC22` or
/// `R_ARM_THM_JUMP24`) to branch to `symbol_address` from `site_address`.
///
/// `site` holds the two little-endian halfwords of the instruction pair in
/// file order (`upper` first, `lower` second). The encoding follows the
/// standard Thumb-2 `S`/`J1`/`J2` scheme used by `BL`/`BLX`/`B.W`.
pub fn relocate_thumb_call(site: &mut [u8; 4], site_address: u32, symbol_address: u32) {
    let upper = u16::from_le_bytes([site[0], site[1]]);
    let lower = u16::from_le_bytes([site[2], site[3]]);

    let s = ((upper >> 10) & 1) as u32;
    let j1 = ((lower >> 13) & 1) as u32;
    let j2 = ((lower >> 11) & 1) as u32;

    let mut offset = (s << 24)
        | ((!(j1 ^ s) & 1) << 23)
        | ((!(j2 ^ s) & 1) << 22)
        | ((upper as u32 & 0x03ff) << 12)
        | ((lower as u32 & 0x07ff) << 1);
    if offset & 0x0100_0000 != 0 {
        offset = offset.wrapping_sub(0x0200_0000);
    }

    let target_offset = (offset as i32)
        .wrapping_add(symbol_address as i32)
        .wrapping_sub(site_address as i32) as u32;

    let new_s = (target_offset >> 24) & 1;
    let new_j1 = new_s ^ (!(target_offset >> 23) & 1);
    let new_j2 = new_s ^ (!(target_offset >> 22) & 1);

    let new_upper = (upper & 0xf800) | ((new_s as u16) << 10) | (((target_offset >> 12) & 0x03ff) as u16);
    let new_lower = (lower & 0xd000)
        | ((new_j1 as u16) << 13)
        | ((new_j2 as u16) << 11)
        | (((target_offset >> 1) & 0x07ff) as u16);

    let upper_bytes = new_upper.to_le_bytes();
    let lower_bytes = new_lower.to_le_bytes();
    site[0] = upper_bytes[0];
    site[1] = upper_bytes[1];
    site[2] = lower_bytes[0];
    site[3] = lower_bytes[1];
}
