//! Implementation of the ELF32 section header (`Elf32_Shdr`).

use crate::{
    base::{RawElf32Address, RawElf32Offset, RawElf32Word},
    config::LoaderConfig,
    cursor::FileCursor,
    error::LoadError,
    traits::{read_array, FromReader},
};
use bitflags::bitflags;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use typed_builder::TypedBuilder;

/// `SHT_NULL`
pub const SHT_NULL: u32 = 0;
/// `SHT_PROGBITS`
pub const SHT_PROGBITS: u32 = 1;
/// `SHT_SYMTAB`
pub const SHT_SYMTAB: u32 = 2;
/// `SHT_STRTAB`
pub const SHT_STRTAB: u32 = 3;
/// `SHT_RELA` — unused (this loader is REL-only), retained for completeness.
pub const SHT_RELA: u32 = 4;
/// `SHT_NOBITS` — occupies no file space (`.bss`).
pub const SHT_NOBITS: u32 = 8;
/// `SHT_REL` — the relocation kind this loader understands.
pub const SHT_REL: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u32)]
/// `sh_type` values this loader distinguishes. Anything else decodes as
/// [`SectionHeaderType::Other`] and is classified by name only.
pub enum SectionHeaderType {
    /// `SHT_NULL`
    Null = SHT_NULL,
    /// `SHT_PROGBITS`
    ProgBits = SHT_PROGBITS,
    /// `SHT_SYMTAB`
    SymTab = SHT_SYMTAB,
    /// `SHT_STRTAB`
    StrTab = SHT_STRTAB,
    /// `SHT_RELA`
    Rela = SHT_RELA,
    /// `SHT_NOBITS`
    NoBits = SHT_NOBITS,
    /// `SHT_REL`
    Rel = SHT_REL,
}

impl SectionHeaderType {
    /// Decode a raw `sh_type`, falling back to `Null` for anything this
    /// loader doesn't special-case (the section is still classified by
    /// name, so an unrecognized `sh_type` is not itself fatal).
    pub fn from_raw(value: u32) -> Self {
        SectionHeaderType::from_u32(value).unwrap_or(SectionHeaderType::Null)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// `sh_flags`.
    pub struct SectionHeaderFlags: u32 {
        /// `SHF_WRITE`
        const WRITE = 0x1;
        /// `SHF_ALLOC`
        const ALLOC = 0x2;
        /// `SHF_EXECINSTR`
        const EXECINSTR = 0x4;
    }
}

#[derive(Debug, Clone, TypedBuilder)]
/// One `Elf32_Shdr` entry.
pub struct SectionHeader {
    /// `sh_name` — byte offset into the section-header string table.
    pub name_offset: RawElf32Word,
    /// `sh_type`.
    pub kind: SectionHeaderType,
    /// `sh_flags`.
    pub flags: SectionHeaderFlags,
    /// `sh_addr`. Always 0 for a relocatable object; this loader assigns
    /// its own runtime addresses via the section allocator.
    pub address: RawElf32Address,
    /// `sh_offset` — byte offset of the section's contents in the file
    /// (meaningless for `SHT_NOBITS`).
    pub offset: RawElf32Offset,
    /// `sh_size`.
    pub size: RawElf32Word,
    /// `sh_link`.
    pub link: RawElf32Word,
    /// `sh_info`.
    pub info: RawElf32Word,
    /// `sh_addralign`. Zero and one both mean "no alignment constraint".
    pub address_align: RawElf32Word,
    /// `sh_entsize` — size of one entry, for sections holding a fixed-size
    /// entry table (`.symtab`, `.rel.*`).
    pub entry_size: RawElf32Word,
}

impl<C> FromReader<C> for SectionHeader
where
    C: FileCursor,
{
    type Error = LoadError;

    fn from_reader_with(cursor: &mut C, _config: &LoaderConfig) -> Result<Self, Self::Error> {
        let name_offset = u32::from_le_bytes(read_array(cursor)?);
        let kind = SectionHeaderType::from_raw(u32::from_le_bytes(read_array(cursor)?));
        let flags =
            SectionHeaderFlags::from_bits_truncate(u32::from_le_bytes(read_array(cursor)?));
        let address = u32::from_le_bytes(read_array(cursor)?);
        let offset = u32::from_le_bytes(read_array(cursor)?);
        let size = u32::from_le_bytes(read_array(cursor)?);
        let link = u32::from_le_bytes(read_array(cursor)?);
        let info = u32::from_le_bytes(read_array(cursor)?);
        let address_align = u32::from_le_bytes(read_array(cursor)?);
        let entry_size = u32::from_le_bytes(read_array(cursor)?);

        Ok(Self::builder()
            .name_offset(name_offset)
            .kind(kind)
            .flags(flags)
            .address(address)
            .offset(offset)
            .size(size)
            .link(link)
            .info(info)
            .address_align(address_align)
            .entry_size(entry_size)
            .build())
    }
}
