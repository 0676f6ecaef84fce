//! The ELF32 REL relocation entry (`Elf32_Rel`), 8 bytes, found in the
//! `.rel.*` sections. This loader is REL-only: the addend lives at the
//! target site rather than in the entry itself.

use crate::{
    base::RawElf32Address,
    config::LoaderConfig,
    cursor::FileCursor,
    error::LoadError,
    traits::{read_array, FromReader},
};

/// `R_ARM_NONE` — no-op.
pub const R_ARM_NONE: u32 = 0;
/// `R_ARM_ABS32` — `*site = *site + S` where `S` is the resolved symbol
/// address.
pub const R_ARM_ABS32: u32 = 2;
/// `R_ARM_THM_PC22` — Thumb-2 `BL`/`BLX` 22/23-bit PC-relative branch.
pub const R_ARM_THM_PC22: u32 = 10;
/// `R_ARM_THM_JUMP24` — Thumb-2 `B.W` 24-bit PC-relative branch.
pub const R_ARM_THM_JUMP24: u32 = 30;

/// Byte size of one `Elf32_Rel` entry.
pub const RELOCATION_ENTRY_SIZE: u32 = 8;

#[derive(Debug, Clone, Copy)]
/// One decoded `Elf32_Rel` entry.
pub struct RelocationEntry {
    /// `r_offset` — byte offset within the target section to patch.
    pub offset: RawElf32Address,
    /// Decoded symbol table index (`ELF32_R_SYM(r_info)`).
    pub symbol_index: u32,
    /// Decoded relocation type (`ELF32_R_TYPE(r_info)`).
    pub relocation_type: u32,
}

impl<C> FromReader<C> for RelocationEntry
where
    C: FileCursor,
{
    type Error = LoadError;

    fn from_reader_with(cursor: &mut C, _config: &LoaderConfig) -> Result<Self, Self::Error> {
        let offset = u32::from_le_bytes(read_array(cursor)?);
        let info = u32::from_le_bytes(read_array(cursor)?);
        Ok(Self {
            offset,
            symbol_index: info >> 8,
            relocation_type: info & 0xff,
        })
    }
}
