//! Section loader: allocates and fills the runtime image for each payload
//! section discovered by classification.

use crate::{
    cursor::FileCursor,
    error::LoadError,
    header::section::{SectionHeader, SectionHeaderType},
    host::SectionAllocator,
    section_map::SectionMap,
    traits::FromReader,
};

/// Load every classified payload section: allocate its runtime buffer,
/// then either copy its bytes from the file (`SHT_PROGBITS`) or leave it
/// zeroed (`SHT_NOBITS`, i.e. `.bss`).
pub fn load_sections<C: FileCursor, A: SectionAllocator>(
    cursor: &mut C,
    sections: &mut SectionMap,
    section_header_offset: u32,
    section_header_entry_size: u32,
    allocator: &mut A,
) -> Result<(), LoadError> {
    for (name, record) in sections.iter_mut() {
        if record.sec_idx == 0 {
            continue;
        }
        let header_offset = section_header_offset as u64
            + record.sec_idx as u64 * section_header_entry_size as u64;
        cursor.seek(header_offset).map_err(|e| LoadError::Io {
            offset: header_offset,
            detail: format!("{e:?}"),
        })?;
        let header = SectionHeader::from_reader(cursor)?;

        if header.size == 0 {
            log::debug!("section {name} is zero-sized, skipping allocation");
            continue;
        }

        let align = header.address_align.max(1);
        let mut buffer = allocator.alloc(header.size, align).ok_or(LoadError::AllocationFailed {
            size: header.size,
            align,
        })?;

        if header.kind != SectionHeaderType::NoBits {
            cursor.seek(header.offset as u64).map_err(|e| LoadError::Io {
                offset: header.offset as u64,
                detail: format!("{e:?}"),
            })?;
            cursor
                .read_exact(buffer.as_mut_slice())
                .map_err(|e| LoadError::Io {
                    offset: header.offset as u64,
                    detail: format!("{e:?}"),
                })?;
        }

        log::info!(
            "loaded section {name} at {:#010x} ({} bytes, align {align})",
            buffer.address(),
            buffer.len()
        );
        record.data = Some(buffer);
    }

    Ok(())
}
