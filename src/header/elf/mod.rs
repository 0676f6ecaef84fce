//! Implementation of the ELF header. This header is located at the beginning
//! of the ELF object file and is the only header type in the ELF
//! specification which must be located at a specific offset (0) in the
//! file.

pub mod identification;

use crate::{
    base::{RawElf32Address, RawElf32HalfWord, RawElf32Offset, RawElf32Word},
    config::LoaderConfig,
    cursor::FileCursor,
    error::LoadError,
    traits::{read_array, FromReader},
};
use identification::ElfHeaderIdentifier;
use typed_builder::TypedBuilder;

/// `EM_ARM` — the only `e_machine` value this loader accepts.
pub const EM_ARM: u16 = 40;

/// `ET_REL` — relocatable object file. Every object this loader accepts is
/// of this type; there is no support for `ET_EXEC`/`ET_DYN`/`ET_CORE`.
pub const ET_REL: u16 = 1;

#[derive(Debug, Clone, TypedBuilder)]
/// The 52-byte ELF32 file header.
pub struct ElfHeader {
    /// The 16-byte identification block.
    pub identifier: ElfHeaderIdentifier,
    /// `e_type`. Expected to be [`ET_REL`].
    pub kind: RawElf32HalfWord,
    /// `e_machine`. Expected to be [`EM_ARM`].
    pub machine: RawElf32HalfWord,
    /// `e_version`.
    pub version: RawElf32Word,
    /// `e_entry` — entry point, an offset relative to `.text` rather than
    /// an absolute address for a relocatable object.
    pub entry: RawElf32Address,
    /// `e_phoff`. Unused by this loader (no program headers in a `ET_REL`
    /// object) but retained for completeness.
    pub program_header_offset: RawElf32Offset,
    /// `e_shoff` — byte offset of the section header table.
    pub section_header_offset: RawElf32Offset,
    /// `e_flags`.
    pub flags: RawElf32Word,
    /// `e_ehsize`.
    pub header_size: RawElf32HalfWord,
    /// `e_phentsize`.
    pub program_header_entry_size: RawElf32HalfWord,
    /// `e_phnum`.
    pub program_header_entry_count: RawElf32HalfWord,
    /// `e_shentsize` — byte size of one section header table entry.
    pub section_header_entry_size: RawElf32HalfWord,
    /// `e_shnum` — number of entries in the section header table.
    pub section_header_entry_count: RawElf32HalfWord,
    /// `e_shstrndx` — index of the section-header string table within the
    /// section header table itself.
    pub section_name_string_table_index: RawElf32HalfWord,
}

impl<C> FromReader<C> for ElfHeader
where
    C: FileCursor,
{
    type Error = LoadError;

    fn from_reader_with(cursor: &mut C, config: &LoaderConfig) -> Result<Self, Self::Error> {
        let identifier = ElfHeaderIdentifier::from_reader_with(cursor, config)?;
        let kind = u16::from_le_bytes(read_array(cursor)?);
        let machine = u16::from_le_bytes(read_array(cursor)?);
        if machine != EM_ARM {
            return Err(LoadError::UnsupportedMachine { value: machine });
        }
        let version = u32::from_le_bytes(read_array(cursor)?);
        let entry = u32::from_le_bytes(read_array(cursor)?);
        let program_header_offset = u32::from_le_bytes(read_array(cursor)?);
        let section_header_offset = u32::from_le_bytes(read_array(cursor)?);
        let flags = u32::from_le_bytes(read_array(cursor)?);
        let header_size = u16::from_le_bytes(read_array(cursor)?);
        let program_header_entry_size = u16::from_le_bytes(read_array(cursor)?);
        let program_header_entry_count = u16::from_le_bytes(read_array(cursor)?);
        let section_header_entry_size = u16::from_le_bytes(read_array(cursor)?);
        let section_header_entry_count = u16::from_le_bytes(read_array(cursor)?);
        let section_name_string_table_index = u16::from_le_bytes(read_array(cursor)?);

        Ok(Self::builder()
            .identifier(identifier)
            .kind(kind)
            .machine(machine)
            .version(version)
            .entry(entry)
            .program_header_offset(program_header_offset)
            .section_header_offset(section_header_offset)
            .flags(flags)
            .header_size(header_size)
            .program_header_entry_size(program_header_entry_size)
            .program_header_entry_count(program_header_entry_count)
            .section_header_entry_size(section_header_entry_size)
            .section_header_entry_count(section_header_entry_count)
            .section_name_string_table_index(section_name_string_table_index)
            .build())
    }
}
