//! Raw wire-format type aliases for ELF32 little-endian fields.
//!
//! The original form of this crate wrapped every field width in a newtype
//! parameterized over class and data encoding, since it had to decode any
//! combination of the two. This loader only ever sees one combination, so
//! fields are read directly as the aliased primitive via
//! [`crate::traits::FromReader`] implementations on the structs that embed
//! them; these aliases exist so the field declarations in `header::elf`,
//! `header::section`, `header::symbol`, and `header::relocation` read the
//! same way the ELF specification names them. There is no `Elf32_Sword`
//! alias: this loader is REL-only (no `r_addend`), and nothing else in the
//! header set decodes a signed 32-bit field.

/// `Elf32_Half` — a 16-bit field.
pub type RawElf32HalfWord = u16;
/// `Elf32_Word` — a 32-bit unsigned field.
pub type RawElf32Word = u32;
/// `Elf32_Addr` — a 32-bit address.
pub type RawElf32Address = u32;
/// `Elf32_Off` — a 32-bit file offset.
pub type RawElf32Offset = u32;
/// `Elf32_Section` — a 16-bit section index.
pub type RawElf32Section = u16;
