//! End-to-end tests driving the public `ElfImage` surface (and, for the
//! cases that need to inspect patched bytes directly, the lower-level
//! `classify`/`load`/`relocate` functions) over synthetic in-memory ELF32
//! ARM objects.

use fap_elf_loader::{
    classify::classify_sections,
    config::LoaderConfig,
    cursor::StdFileCursor,
    error::{LoadError, LoadStatus},
    header::relocation::R_ARM_ABS32,
    host::{NoopScheduler, SymbolResolver, VecSectionAllocator},
    image::ElfImage,
    load::load_sections,
    relocate::relocate_sections,
    resolve::RelocationCache,
};
use std::collections::HashMap;
use std::io::Cursor;

/// Install the env logger once per test binary; ignores the "already
/// installed" error from a prior test in the same process.
fn init_logging() {
    let _ = env_logger::try_init();
}

const SHT_PROGBITS: u32 = 1;
const SHT_SYMTAB: u32 = 2;
const SHT_STRTAB: u32 = 3;
const SHT_NOBITS: u32 = 8;
const SHT_REL: u32 = 9;

enum Content {
    Bytes(Vec<u8>),
    NoBits(u32),
}

struct SectionSpec {
    name: &'static str,
    sh_type: u32,
    flags: u32,
    align: u32,
    content: Content,
}

fn sec(name: &'static str, sh_type: u32, flags: u32, align: u32, data: Vec<u8>) -> SectionSpec {
    SectionSpec {
        name,
        sh_type,
        flags,
        align,
        content: Content::Bytes(data),
    }
}

fn sec_nobits(name: &'static str, align: u32, size: u32) -> SectionSpec {
    SectionSpec {
        name,
        sh_type: SHT_NOBITS,
        flags: 0x2,
        align,
        content: Content::NoBits(size),
    }
}

/// A synthetic object plus the bits of its layout the lower-level tests
/// need to drive `classify_sections`/`load_sections`/`relocate_sections`
/// directly, without going through `ElfImage`.
struct BuiltElf {
    bytes: Vec<u8>,
    section_header_offset: u32,
    section_header_entry_size: u32,
    section_count: u16,
    shstrtab_offset: u32,
}

fn write_section_header(
    buf: &mut Vec<u8>,
    name_offset: u32,
    sh_type: u32,
    flags: u32,
    offset: u32,
    size: u32,
    align: u32,
) {
    buf.extend_from_slice(&name_offset.to_le_bytes());
    buf.extend_from_slice(&sh_type.to_le_bytes());
    buf.extend_from_slice(&flags.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // sh_addr
    buf.extend_from_slice(&offset.to_le_bytes());
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // sh_link
    buf.extend_from_slice(&0u32.to_le_bytes()); // sh_info
    buf.extend_from_slice(&align.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // sh_entsize
}

/// Lay out a complete ELF32/ARM relocatable object: the 52-byte file
/// header, each section's content back to back, a generated `.shstrtab`,
/// and the section header table (index 0 reserved `SHT_NULL`, one entry
/// per `specs`, then `.shstrtab` itself).
fn build_elf(entry: u32, specs: &[SectionSpec]) -> BuiltElf {
    let mut buf = vec![0u8; 52];

    let mut payload_offsets = Vec::with_capacity(specs.len());
    let mut payload_sizes = Vec::with_capacity(specs.len());
    for spec in specs {
        match &spec.content {
            Content::Bytes(data) => {
                payload_offsets.push(buf.len() as u32);
                payload_sizes.push(data.len() as u32);
                buf.extend_from_slice(data);
            }
            Content::NoBits(size) => {
                payload_offsets.push(buf.len() as u32);
                payload_sizes.push(*size);
            }
        }
    }

    let mut shstrtab = vec![0u8];
    let mut name_offsets = Vec::with_capacity(specs.len());
    for spec in specs {
        name_offsets.push(shstrtab.len() as u32);
        shstrtab.extend_from_slice(spec.name.as_bytes());
        shstrtab.push(0);
    }
    let shstrtab_name_offset = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".shstrtab");
    shstrtab.push(0);

    let shstrtab_offset = buf.len() as u32;
    let shstrtab_size = shstrtab.len() as u32;
    buf.extend_from_slice(&shstrtab);

    let section_header_offset = buf.len() as u32;
    buf.extend_from_slice(&[0u8; 40]); // index 0: SHT_NULL

    for (i, spec) in specs.iter().enumerate() {
        write_section_header(
            &mut buf,
            name_offsets[i],
            spec.sh_type,
            spec.flags,
            payload_offsets[i],
            payload_sizes[i],
            spec.align,
        );
    }

    let shstrndx = specs.len() as u16 + 1;
    write_section_header(
        &mut buf,
        shstrtab_name_offset,
        SHT_STRTAB,
        0,
        shstrtab_offset,
        shstrtab_size,
        1,
    );
    let shnum = shstrndx + 1;

    buf[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
    buf[4] = 1; // EI_CLASS = ELFCLASS32
    buf[5] = 1; // EI_DATA = ELFDATA2LSB
    buf[6] = 1; // EI_VERSION = EV_CURRENT
    buf[16..18].copy_from_slice(&1u16.to_le_bytes()); // e_type = ET_REL
    buf[18..20].copy_from_slice(&40u16.to_le_bytes()); // e_machine = EM_ARM
    buf[20..24].copy_from_slice(&1u32.to_le_bytes()); // e_version
    buf[24..28].copy_from_slice(&entry.to_le_bytes());
    buf[32..36].copy_from_slice(&section_header_offset.to_le_bytes());
    buf[40..42].copy_from_slice(&52u16.to_le_bytes()); // e_ehsize
    buf[46..48].copy_from_slice(&40u16.to_le_bytes()); // e_shentsize
    buf[48..50].copy_from_slice(&shnum.to_le_bytes());
    buf[50..52].copy_from_slice(&shstrndx.to_le_bytes());

    BuiltElf {
        bytes: buf,
        section_header_offset,
        section_header_entry_size: 40,
        section_count: shnum,
        shstrtab_offset,
    }
}

fn symbol_bytes(name_offset: u32, value: u32, size: u32, shndx: u16) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&name_offset.to_le_bytes());
    v.extend_from_slice(&value.to_le_bytes());
    v.extend_from_slice(&size.to_le_bytes());
    v.push(0); // st_info
    v.push(0); // st_other
    v.extend_from_slice(&shndx.to_le_bytes());
    v
}

fn rel_bytes(offset: u32, symbol_index: u32, relocation_type: u32) -> Vec<u8> {
    let info = (symbol_index << 8) | relocation_type;
    let mut v = Vec::new();
    v.extend_from_slice(&offset.to_le_bytes());
    v.extend_from_slice(&info.to_le_bytes());
    v
}

struct NoImports;
impl SymbolResolver for NoImports {
    fn resolve(&self, _name: &str) -> Option<u32> {
        None
    }
}

struct KnownImports(HashMap<&'static str, u32>);
impl SymbolResolver for KnownImports {
    fn resolve(&self, name: &str) -> Option<u32> {
        self.0.get(name).copied()
    }
}

#[test]
fn minimal_object_with_no_imports_loads_and_resolves_entry_point() {
    init_logging();
    let elf = build_elf(
        0,
        &[
            sec(".text", SHT_PROGBITS, 0x6, 4, vec![0x70, 0x47, 0x00, 0x00]),
            sec(".fapmeta", SHT_PROGBITS, 0, 1, vec![0u8; 12]),
            sec(".symtab", SHT_SYMTAB, 0, 4, vec![0u8; 16]),
            sec(".strtab", SHT_STRTAB, 0, 1, vec![0u8]),
        ],
    );

    let mut cursor = StdFileCursor::new(Cursor::new(elf.bytes));
    let config = LoaderConfig::default();
    let mut image = ElfImage::new();
    image.load_headers(&mut cursor, &config).unwrap();
    image.load_section_table(&mut cursor, &config).unwrap();
    let status = image
        .load_sections(
            &mut cursor,
            &NoImports,
            &mut NoopScheduler::default(),
            &mut VecSectionAllocator,
            &config,
        )
        .unwrap();

    assert!(status.is_success());
    assert_eq!(image.memory_map().len(), 1);
    assert_eq!(image.memory_map()[0].name, ".text");
    assert_eq!(image.entry_point(), image.memory_map()[0].address);
}

#[test]
fn unresolved_import_is_reported_in_status_not_as_an_error() {
    init_logging();
    let mut symtab = vec![0u8; 16]; // index 0: the mandatory null symbol
    symtab.extend_from_slice(&symbol_bytes(1, 0, 0, 0)); // index 1: undefined, name at offset 1

    let mut strtab = vec![0u8];
    strtab.extend_from_slice(b"missing_fn\0");

    let elf = build_elf(
        0,
        &[
            sec(".text", SHT_PROGBITS, 0x6, 4, vec![0, 0, 0, 0]),
            sec(".rel.text", SHT_REL, 0, 4, rel_bytes(0, 1, R_ARM_ABS32)),
            sec(".fapmeta", SHT_PROGBITS, 0, 1, vec![0u8; 12]),
            sec(".symtab", SHT_SYMTAB, 0, 4, symtab),
            sec(".strtab", SHT_STRTAB, 0, 1, strtab),
        ],
    );

    let mut cursor = StdFileCursor::new(Cursor::new(elf.bytes));
    let config = LoaderConfig::default();
    let mut image = ElfImage::new();
    image.load_headers(&mut cursor, &config).unwrap();
    image.load_section_table(&mut cursor, &config).unwrap();
    let status = image
        .load_sections(
            &mut cursor,
            &NoImports,
            &mut NoopScheduler::default(),
            &mut VecSectionAllocator,
            &config,
        )
        .unwrap();

    match status {
        LoadStatus::MissingImports { missing } => {
            assert_eq!(missing.len(), 1);
            assert!(missing[0].contains("symbol index 1"));
        }
        LoadStatus::Success => panic!("expected the unresolved import to be reported"),
    }
    // The section still loaded even though a relocation could not be satisfied.
    assert_eq!(image.memory_map().len(), 1);
}

#[test]
fn object_without_symtab_is_rejected_at_section_table_stage() {
    init_logging();
    let elf = build_elf(
        0,
        &[
            sec(".text", SHT_PROGBITS, 0x6, 4, vec![0, 0, 0, 0]),
            sec(".fapmeta", SHT_PROGBITS, 0, 1, vec![0u8; 12]),
        ],
    );

    let mut cursor = StdFileCursor::new(Cursor::new(elf.bytes));
    let config = LoaderConfig::default();
    let mut image = ElfImage::new();
    image.load_headers(&mut cursor, &config).unwrap();

    let err = image.load_section_table(&mut cursor, &config).unwrap_err();
    assert!(matches!(
        err,
        LoadError::MissingRequiredSection { category: ".symtab" }
    ));
}

#[test]
fn undersized_manifest_is_rejected_under_the_default_strict_config() {
    init_logging();
    let elf = build_elf(
        0,
        &[
            sec(".fapmeta", SHT_PROGBITS, 0, 1, vec![0u8; 4]), // below the default minimum of 12
            sec(".symtab", SHT_SYMTAB, 0, 4, vec![0u8; 16]),
            sec(".strtab", SHT_STRTAB, 0, 1, vec![0u8]),
        ],
    );

    let mut cursor = StdFileCursor::new(Cursor::new(elf.bytes));
    let config = LoaderConfig::default();
    let mut image = ElfImage::new();
    image.load_headers(&mut cursor, &config).unwrap();

    let err = image.load_section_table(&mut cursor, &config).unwrap_err();
    assert!(matches!(
        err,
        LoadError::ManifestTooSmall { size: 4, minimum: 12 }
    ));
}

#[test]
fn bss_section_is_allocated_zero_filled_without_touching_the_file() {
    init_logging();
    let elf = build_elf(
        0,
        &[
            sec_nobits(".bss", 4, 8),
            sec(".fapmeta", SHT_PROGBITS, 0, 1, vec![0u8; 12]),
            sec(".symtab", SHT_SYMTAB, 0, 4, vec![0u8; 16]),
            sec(".strtab", SHT_STRTAB, 0, 1, vec![0u8]),
        ],
    );

    let mut cursor = StdFileCursor::new(Cursor::new(elf.bytes));
    let config = LoaderConfig::default();

    let mut classified = classify_sections(
        &mut cursor,
        elf.section_header_offset,
        elf.section_header_entry_size,
        elf.section_count,
        elf.shstrtab_offset,
        &config,
    )
    .unwrap();

    load_sections(
        &mut cursor,
        &mut classified.sections,
        elf.section_header_offset,
        elf.section_header_entry_size,
        &mut VecSectionAllocator,
    )
    .unwrap();

    let buffer = classified
        .sections
        .get(".bss")
        .unwrap()
        .data
        .as_ref()
        .unwrap();
    assert_eq!(buffer.len(), 8);
    assert!(buffer.as_slice().iter().all(|&b| b == 0));
}

#[test]
fn abs32_relocation_patches_text_section_in_place() {
    init_logging();
    let mut symtab = vec![0u8; 16];
    symtab.extend_from_slice(&symbol_bytes(1, 0, 0, 0)); // index 1: undefined "target"

    let mut strtab = vec![0u8];
    strtab.extend_from_slice(b"target\0");

    let elf = build_elf(
        0,
        &[
            sec(".text", SHT_PROGBITS, 0x6, 4, vec![0x10, 0, 0, 0]), // existing addend: 0x10
            sec(".rel.text", SHT_REL, 0, 4, rel_bytes(0, 1, R_ARM_ABS32)),
            sec(".fapmeta", SHT_PROGBITS, 0, 1, vec![0u8; 12]),
            sec(".symtab", SHT_SYMTAB, 0, 4, symtab),
            sec(".strtab", SHT_STRTAB, 0, 1, strtab),
        ],
    );

    let mut cursor = StdFileCursor::new(Cursor::new(elf.bytes));
    let config = LoaderConfig::default();

    let mut classified = classify_sections(
        &mut cursor,
        elf.section_header_offset,
        elf.section_header_entry_size,
        elf.section_count,
        elf.shstrtab_offset,
        &config,
    )
    .unwrap();

    load_sections(
        &mut cursor,
        &mut classified.sections,
        elf.section_header_offset,
        elf.section_header_entry_size,
        &mut VecSectionAllocator,
    )
    .unwrap();

    let mut resolved = HashMap::new();
    resolved.insert("target", 0xDEAD_BEEFu32);
    let resolver = KnownImports(resolved);
    let mut status = LoadStatus::default();
    let mut cache = RelocationCache::new();
    relocate_sections(
        &mut cursor,
        &mut classified.sections,
        elf.section_header_offset,
        elf.section_header_entry_size,
        classified.symtab_offset,
        classified.strtab_offset,
        &resolver,
        &mut NoopScheduler::default(),
        &mut cache,
        &config,
        &mut status,
    )
    .unwrap();

    assert!(status.is_success());
    let patched = classified
        .sections
        .get(".text")
        .unwrap()
        .data
        .as_ref()
        .unwrap()
        .as_slice();
    let value = u32::from_le_bytes([patched[0], patched[1], patched[2], patched[3]]);
    assert_eq!(value, 0x10u32.wrapping_add(0xDEAD_BEEF));
}
