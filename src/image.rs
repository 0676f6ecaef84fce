//! [`ElfImage`] — the handle representing one loaded application, and the
//! four operations (`load_headers`, `load_manifest`, `load_section_table`,
//! `load_sections`) that populate it.

use crate::{
    classify::{classify_sections, ClassifiedSections},
    config::LoaderConfig,
    cursor::FileCursor,
    error::{LoadError, LoadStatus},
    header::elf::ElfHeader,
    host::{Scheduler, SectionAllocator, SymbolResolver},
    load::load_sections as load_section_images,
    relocate::relocate_sections,
    resolve::RelocationCache,
    section_map::SectionMap,
    traits::FromReader,
};

/// One published entry in the runtime memory map: where a logical section
/// ended up in memory.
#[derive(Debug, Clone)]
pub struct MemoryMapEntry {
    /// Logical section name (`.text`, `.rodata`, `.data`, `.bss`).
    pub name: String,
    /// Runtime base address.
    pub address: u32,
}

/// Stages an [`ElfImage`] has progressed through. Each public operation
/// checks this to reject out-of-order calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
enum Stage {
    #[default]
    Empty,
    HeadersLoaded,
    SectionTableLoaded,
    SectionsLoaded,
}

/// A loaded (or loading) application image.
///
/// Create with [`ElfImage::new`], drive through the four stage methods in
/// order, then call [`ElfImage::teardown`] when the application is
/// unloaded. Each stage method requires the previous one to have
/// succeeded; calling out of order returns [`LoadError::OutOfOrder`].
#[derive(Debug, Default)]
pub struct ElfImage {
    stage: Stage,
    header: Option<ElfHeader>,
    shstrtab_offset: u32,
    classified: Option<ClassifiedSections>,
    entry_point: u32,
    memory_map: Vec<MemoryMapEntry>,
}

impl ElfImage {
    /// An empty image, ready for `load_headers`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the ELF file header and locate the section-header string
    /// table. Must be called first.
    pub fn load_headers<C: FileCursor>(
        &mut self,
        cursor: &mut C,
        config: &LoaderConfig,
    ) -> Result<(), LoadError> {
        if self.stage != Stage::Empty {
            return Err(LoadError::OutOfOrder {
                expected: "load_headers must be called on a fresh image",
            });
        }

        cursor.seek(0).map_err(|e| LoadError::Io {
            offset: 0,
            detail: format!("{e:?}"),
        })?;
        let header = ElfHeader::from_reader_with(cursor, config)?;

        let shstrndx_offset = header.section_header_offset as u64
            + header.section_name_string_table_index as u64
                * header.section_header_entry_size as u64;
        cursor.seek(shstrndx_offset).map_err(|e| LoadError::Io {
            offset: shstrndx_offset,
            detail: format!("{e:?}"),
        })?;
        let shstrtab_header = crate::header::section::SectionHeader::from_reader(cursor)?;

        log::info!(
            "loaded ELF headers: entry={:#010x}, {} sections",
            header.entry,
            header.section_header_entry_count
        );

        self.shstrtab_offset = shstrtab_header.offset;
        self.header = Some(header);
        self.stage = Stage::HeadersLoaded;
        Ok(())
    }

    /// Quick pass that copies only the manifest (`.fapmeta`) bytes into
    /// `out`, without building the full section directory. Requires
    /// `load_headers` to have run.
    pub fn load_manifest<C: FileCursor>(
        &mut self,
        cursor: &mut C,
        config: &LoaderConfig,
    ) -> Result<Vec<u8>, LoadError> {
        let header = self.header.as_ref().ok_or(LoadError::OutOfOrder {
            expected: "load_headers must run before load_manifest",
        })?;

        let classified = classify_sections(
            cursor,
            header.section_header_offset,
            header.section_header_entry_size as u32,
            header.section_header_entry_count,
            self.shstrtab_offset,
            config,
        )?;

        Ok(classified.manifest)
    }

    /// Build the full section directory: classify every section, requiring
    /// `.symtab`/`.strtab`/`.fapmeta` to all be present. Requires
    /// `load_headers` to have run.
    pub fn load_section_table<C: FileCursor>(
        &mut self,
        cursor: &mut C,
        config: &LoaderConfig,
    ) -> Result<(), LoadError> {
        if self.stage != Stage::HeadersLoaded {
            return Err(LoadError::OutOfOrder {
                expected: "load_headers must run before load_section_table",
            });
        }
        let header = self.header.as_ref().expect("HeadersLoaded implies header is set");

        let classified = classify_sections(
            cursor,
            header.section_header_offset,
            header.section_header_entry_size as u32,
            header.section_header_entry_count,
            self.shstrtab_offset,
            config,
        )?;

        log::info!(
            "classified {} logical sections ({} required categories satisfied)",
            classified.sections.len(),
            classified.categories.bits().count_ones()
        );

        self.classified = Some(classified);
        self.stage = Stage::SectionTableLoaded;
        Ok(())
    }

    /// Allocate and fill every section, relocate them, and publish the
    /// entry point and memory map. Requires `load_section_table` to have
    /// run.
    #[allow(clippy::too_many_arguments)]
    pub fn load_sections<C, R, S, A>(
        &mut self,
        cursor: &mut C,
        resolver: &R,
        scheduler: &mut S,
        allocator: &mut A,
        config: &LoaderConfig,
    ) -> Result<LoadStatus, LoadError>
    where
        C: FileCursor,
        R: SymbolResolver,
        S: Scheduler,
        A: SectionAllocator,
    {
        if self.stage != Stage::SectionTableLoaded {
            return Err(LoadError::OutOfOrder {
                expected: "load_section_table must run before load_sections",
            });
        }
        let header = self
            .header
            .as_ref()
            .expect("SectionTableLoaded implies header is set");
        let classified = self
            .classified
            .as_mut()
            .expect("SectionTableLoaded implies classified is set");

        load_section_images(
            cursor,
            &mut classified.sections,
            header.section_header_offset,
            header.section_header_entry_size as u32,
            allocator,
        )?;

        let mut status = LoadStatus::default();
        let mut cache = RelocationCache::new();
        relocate_sections(
            cursor,
            &mut classified.sections,
            header.section_header_offset,
            header.section_header_entry_size as u32,
            classified.symtab_offset,
            classified.strtab_offset,
            resolver,
            scheduler,
            &mut cache,
            config,
            &mut status,
        )?;
        cache.clear();

        self.publish_memory_map(&classified.sections, header.entry);
        self.stage = Stage::SectionsLoaded;

        if status.is_success() {
            log::info!("all sections relocated cleanly, entry point {:#010x}", self.entry_point);
        } else {
            log::warn!("load completed with missing imports or unsupported relocations");
        }

        Ok(status)
    }

    fn publish_memory_map(&mut self, sections: &SectionMap, entry_offset: u32) {
        let mut map = Vec::new();
        let mut text_base = None;

        for (name, record) in sections.iter() {
            if let Some(address) = record.base_address() {
                if name == ".text" {
                    text_base = Some(address);
                }
                map.push(MemoryMapEntry {
                    name: name.to_string(),
                    address,
                });
            }
        }

        self.entry_point = entry_offset.wrapping_add(text_base.unwrap_or(0));
        self.memory_map = map;
    }

    /// The fixed-up entry point, valid after `load_sections` succeeds.
    pub fn entry_point(&self) -> u32 {
        self.entry_point
    }

    /// The published memory map, valid after `load_sections` succeeds.
    pub fn memory_map(&self) -> &[MemoryMapEntry] {
        &self.memory_map
    }

    /// The `.fapmeta` manifest bytes classified by `load_section_table`.
    /// `None` before `load_section_table` has run or after `teardown`.
    pub fn manifest(&self) -> Option<&[u8]> {
        self.classified.as_ref().map(|c| c.manifest.as_slice())
    }

    /// The `.gnu_debuglink` bytes classified by `load_section_table`, if
    /// the object carried one. `None` before `load_section_table` has run,
    /// after `teardown`, or if the object has no debug link.
    pub fn debug_link(&self) -> Option<&[u8]> {
        self.classified.as_ref()?.debug_link.as_deref()
    }

    /// Release every section buffer via `allocator`, and reset the image
    /// to empty. Safe to call on a partially loaded or already-empty
    /// image.
    pub fn teardown<A: SectionAllocator>(&mut self, allocator: &mut A) {
        if let Some(mut classified) = self.classified.take() {
            for (_, mut record) in classified.sections.drain() {
                if let Some(buffer) = record.data.take() {
                    allocator.dealloc(buffer);
                }
            }
        }
        self.header = None;
        self.entry_point = 0;
        self.memory_map.clear();
        self.stage = Stage::Empty;
    }
}
