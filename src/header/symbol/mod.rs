//! The ELF32 symbol table entry (`Elf32_Sym`), 16 bytes, found in `.symtab`.

use crate::{
    base::{RawElf32Address, RawElf32Section, RawElf32Word},
    config::LoaderConfig,
    cursor::FileCursor,
    error::LoadError,
    traits::{read_array, FromReader},
};
use typed_builder::TypedBuilder;

/// `SHN_UNDEF` — a symbol's `st_shndx` is this for an external (undefined)
/// symbol the host resolver must supply.
pub const SHN_UNDEF: RawElf32Section = 0;

/// Byte size of one `Elf32_Sym` entry.
pub const SYMBOL_ENTRY_SIZE: u32 = 16;

#[derive(Debug, Clone, Copy, TypedBuilder)]
/// One decoded `Elf32_Sym` entry.
pub struct SymbolTableEntry {
    /// `st_name` — byte offset into `.strtab`, or 0 for a section-anonymous
    /// symbol.
    pub name_offset: RawElf32Word,
    /// `st_value`.
    pub value: RawElf32Address,
    /// `st_size`.
    pub size: RawElf32Word,
    /// `st_info`.
    pub info: u8,
    /// `st_other`.
    pub other: u8,
    /// `st_shndx` — defining section index, or [`SHN_UNDEF`] for an import.
    pub section_index: RawElf32Section,
}

impl SymbolTableEntry {
    /// True when this symbol must be resolved externally.
    pub fn is_undefined(&self) -> bool {
        self.section_index == SHN_UNDEF
    }
}

impl<C> FromReader<C> for SymbolTableEntry
where
    C: FileCursor,
{
    type Error = LoadError;

    fn from_reader_with(cursor: &mut C, _config: &LoaderConfig) -> Result<Self, Self::Error> {
        let name_offset = u32::from_le_bytes(read_array(cursor)?);
        let value = u32::from_le_bytes(read_array(cursor)?);
        let size = u32::from_le_bytes(read_array(cursor)?);
        let [info] = read_array::<C, 1>(cursor)?;
        let [other] = read_array::<C, 1>(cursor)?;
        let section_index = u16::from_le_bytes(read_array(cursor)?);

        Ok(Self::builder()
            .name_offset(name_offset)
            .value(value)
            .size(size)
            .info(info)
            .other(other)
            .section_index(section_index)
            .build())
    }
}

/// Read the `n`th symbol table entry, seeking to it first.
pub fn read_symbol<C: FileCursor>(
    cursor: &mut C,
    symtab_offset: u32,
    index: u32,
) -> Result<SymbolTableEntry, LoadError> {
    let offset = symtab_offset as u64 + (index as u64 * SYMBOL_ENTRY_SIZE as u64);
    cursor.seek(offset).map_err(|e| LoadError::Io {
        offset,
        detail: format!("{e:?}"),
    })?;
    SymbolTableEntry::from_reader(cursor)
}
