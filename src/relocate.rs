//! Relocation engine: walks each section's `.rel.*` table and patches its
//! runtime image in place.

use crate::{
    arch::arm32::{relocate_abs32, relocate_thumb_call},
    config::LoaderConfig,
    cursor::FileCursor,
    error::{LoadError, LoadStatus},
    header::relocation::{
        RelocationEntry, R_ARM_ABS32, R_ARM_NONE, R_ARM_THM_JUMP24, R_ARM_THM_PC22,
        RELOCATION_ENTRY_SIZE,
    },
    header::section::SectionHeader,
    host::{Scheduler, SymbolResolver},
    resolve::{RelocationCache, INVALID_ADDRESS},
    section_map::SectionMap,
    traits::FromReader,
};

/// Relocate every section that has a paired `.rel.*` table.
///
/// Relocation entries whose symbol fails to resolve, or whose type is
/// unsupported, do not abort the pass: they are recorded into `status` and
/// the remaining entries are still processed, so the caller learns about
/// every problem rather than only the first (`SPEC_FULL.md` §4.7).
#[allow(clippy::too_many_arguments)]
pub fn relocate_sections<C: FileCursor, R: SymbolResolver, S: Scheduler>(
    cursor: &mut C,
    sections: &mut SectionMap,
    section_header_offset: u32,
    section_header_entry_size: u32,
    symtab_offset: u32,
    strtab_offset: u32,
    resolver: &R,
    scheduler: &mut S,
    cache: &mut RelocationCache,
    config: &LoaderConfig,
    status: &mut LoadStatus,
) -> Result<(), LoadError> {
    let rel_targets: Vec<(String, u16, u16)> = sections
        .iter()
        .filter(|(_, r)| r.rel_sec_idx != 0)
        .map(|(name, r)| (name.to_string(), r.sec_idx, r.rel_sec_idx))
        .collect();

    for (name, sec_idx, rel_sec_idx) in rel_targets {
        let rel_header_offset = section_header_offset as u64
            + rel_sec_idx as u64 * section_header_entry_size as u64;
        cursor.seek(rel_header_offset).map_err(|e| LoadError::Io {
            offset: rel_header_offset,
            detail: format!("{e:?}"),
        })?;
        let rel_header = SectionHeader::from_reader(cursor)?;
        let entry_count = rel_header.size / RELOCATION_ENTRY_SIZE;

        for i in 0..entry_count {
            if i > 0 && i % config.yield_interval == 0 {
                scheduler.yield_now();
            }

            let entry_offset = rel_header.offset as u64 + i as u64 * RELOCATION_ENTRY_SIZE as u64;
            cursor.seek(entry_offset).map_err(|e| LoadError::Io {
                offset: entry_offset,
                detail: format!("{e:?}"),
            })?;
            let entry = RelocationEntry::from_reader(cursor)?;

            let symbol_address = cache.resolve(
                cursor,
                sections,
                symtab_offset,
                strtab_offset,
                resolver,
                entry.symbol_index,
            )?;

            if symbol_address == INVALID_ADDRESS {
                status.push_missing(format!(
                    "{name}: unresolved symbol index {} (relocation type {})",
                    entry.symbol_index, entry.relocation_type
                ));
                continue;
            }

            let Some(record) = sections.get_by_sec_idx(sec_idx) else {
                continue;
            };
            let Some(buffer) = &record.data else {
                continue;
            };
            let site_address = buffer.address().wrapping_add(entry.offset);

            match entry.relocation_type {
                R_ARM_NONE => {}
                R_ARM_ABS32 => {
                    patch_site(sections, sec_idx, entry.offset, |site| {
                        relocate_abs32(site, symbol_address)
                    });
                }
                R_ARM_THM_PC22 | R_ARM_THM_JUMP24 => {
                    patch_site(sections, sec_idx, entry.offset, |site| {
                        relocate_thumb_call(site, site_address, symbol_address)
                    });
                }
                other => {
                    status.push_missing(format!("{name}: unsupported relocation type {other}"));
                }
            }
        }
    }

    Ok(())
}

fn patch_site(
    sections: &mut SectionMap,
    sec_idx: u16,
    rel_offset: u32,
    patch: impl FnOnce(&mut [u8; 4]),
) {
    let Some((_, record)) = sections.iter_mut().find(|(_, r)| r.sec_idx == sec_idx) else {
        return;
    };
    let Some(buffer) = record.data.as_mut() else {
        return;
    };
    let start = rel_offset as usize;
    let slice = buffer.as_mut_slice();
    if start + 4 > slice.len() {
        log::error!("relocation offset {rel_offset:#x} out of bounds for section");
        return;
    }
    let mut site = [
        slice[start],
        slice[start + 1],
        slice[start + 2],
        slice[start + 3],
    ];
    patch(&mut site);
    slice[start..start + 4].copy_from_slice(&site);
}
