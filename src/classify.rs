//! Section classifier: walks the section header table once, sorting every
//! section into the categories the rest of the loader understands.

use crate::{
    config::LoaderConfig,
    cursor::FileCursor,
    error::LoadError,
    header::{
        section::SectionHeader,
        symbol::SYMBOL_ENTRY_SIZE,
    },
    section_map::{strip_rel_prefix, SectionCategories, SectionMap},
    strtab::read_string_at,
    traits::FromReader,
};

/// Result of one full pass over the section header table.
#[derive(Debug, Default)]
pub struct ClassifiedSections {
    /// Logical section directory (`.text`/`.rodata`/`.data`/`.bss`).
    pub sections: SectionMap,
    /// Which required categories were observed.
    pub categories: SectionCategories,
    /// File offset of `.symtab`.
    pub symtab_offset: u32,
    /// Number of entries in `.symtab`.
    pub symtab_count: u32,
    /// File offset of `.strtab` (symbol names).
    pub strtab_offset: u32,
    /// Copied bytes of `.fapmeta`, if present and large enough.
    pub manifest: Vec<u8>,
    /// Copied bytes of `.gnu_debuglink`, if present.
    pub debug_link: Option<Vec<u8>>,
}

/// Walk section indices `1..section_count` (index 0 is always `SHT_NULL`
/// and is skipped), classifying each by name.
pub fn classify_sections<C: FileCursor>(
    cursor: &mut C,
    section_header_offset: u32,
    section_header_entry_size: u32,
    section_count: u16,
    shstrtab_offset: u32,
    config: &LoaderConfig,
) -> Result<ClassifiedSections, LoadError> {
    let mut result = ClassifiedSections::default();

    for index in 1..section_count {
        let header_offset =
            section_header_offset as u64 + index as u64 * section_header_entry_size as u64;
        cursor.seek(header_offset).map_err(|e| LoadError::Io {
            offset: header_offset,
            detail: format!("{e:?}"),
        })?;
        let header = SectionHeader::from_reader(cursor)?;
        let name = read_string_at(cursor, shstrtab_offset + header.name_offset)?;

        match name.as_str() {
            ".text" | ".rodata" | ".data" | ".bss" => {
                result.sections.set_payload(&name, index);
            }
            ".rel.text" | ".rel.rodata" | ".rel.data" => {
                result
                    .sections
                    .set_relocations(strip_rel_prefix(&name), index);
            }
            ".symtab" => {
                result.symtab_offset = header.offset;
                result.symtab_count = header.size / SYMBOL_ENTRY_SIZE;
                result.categories |= SectionCategories::SYMBOL_TABLE;
            }
            ".strtab" => {
                result.strtab_offset = header.offset;
                result.categories |= SectionCategories::SYMBOL_STRINGS;
            }
            ".fapmeta" => {
                if header.size < config.manifest_min_size && config.strict_manifest_size {
                    return Err(LoadError::ManifestTooSmall {
                        size: header.size,
                        minimum: config.manifest_min_size,
                    });
                }
                let mut buf = vec![0u8; header.size as usize];
                if header.kind != crate::header::section::SectionHeaderType::NoBits
                    && header.size > 0
                {
                    cursor.seek(header.offset as u64).map_err(|e| LoadError::Io {
                        offset: header.offset as u64,
                        detail: format!("{e:?}"),
                    })?;
                    cursor.read_exact(&mut buf).map_err(|e| LoadError::Io {
                        offset: header.offset as u64,
                        detail: format!("{e:?}"),
                    })?;
                }
                result.manifest = buf;
                result.categories |= SectionCategories::MANIFEST;
            }
            ".gnu_debuglink" => {
                let mut buf = vec![0u8; header.size as usize];
                if header.size > 0 {
                    cursor.seek(header.offset as u64).map_err(|e| LoadError::Io {
                        offset: header.offset as u64,
                        detail: format!("{e:?}"),
                    })?;
                    cursor.read_exact(&mut buf).map_err(|e| LoadError::Io {
                        offset: header.offset as u64,
                        detail: format!("{e:?}"),
                    })?;
                }
                result.debug_link = Some(buf);
            }
            _ => {
                log::debug!("skipping unrecognized section {name} (sh_type={:?})", header.kind);
            }
        }
    }

    if !result.categories.contains(SectionCategories::SYMBOL_TABLE) {
        return Err(LoadError::MissingRequiredSection {
            category: ".symtab",
        });
    }
    if !result.categories.contains(SectionCategories::SYMBOL_STRINGS) {
        return Err(LoadError::MissingRequiredSection {
            category: ".strtab",
        });
    }
    if !result.categories.contains(SectionCategories::MANIFEST) {
        return Err(LoadError::MissingRequiredSection {
            category: ".fapmeta",
        });
    }

    Ok(result)
}
