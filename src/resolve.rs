//! Symbol resolver: turns a symbol table index into a runtime address,
//! memoizing every lookup for the lifetime of one load.

use crate::{
    cursor::FileCursor,
    error::LoadError,
    header::symbol::read_symbol,
    host::SymbolResolver,
    section_map::SectionMap,
    strtab::read_string_at,
};
use std::collections::HashMap;

/// Sentinel returned for a symbol that could not be resolved. Not a
/// plausible Thumb-2 code or data address on this platform, so it is safe
/// to use as an "invalid" marker alongside real addresses.
pub const INVALID_ADDRESS: u32 = 0xFFFF_FFFF;

/// Per-load memoization of resolved symbol addresses, keyed by symbol
/// table index. Cleared at the start and end of every load; an invalid
/// resolution is never cached, only successes are (see `SPEC_FULL.md`
/// §4.6 — this is a deliberate departure from the firmware this was
/// distilled from, which caches unconditionally).
#[derive(Debug, Default)]
pub struct RelocationCache {
    cache: HashMap<u32, u32>,
}

impl RelocationCache {
    /// A fresh, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct symbols resolved so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drop every cached entry.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Resolve symbol `index`, consulting (and populating) the cache.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve<C: FileCursor, R: SymbolResolver>(
        &mut self,
        cursor: &mut C,
        sections: &SectionMap,
        symtab_offset: u32,
        strtab_offset: u32,
        resolver: &R,
        index: u32,
    ) -> Result<u32, LoadError> {
        if let Some(&addr) = self.cache.get(&index) {
            return Ok(addr);
        }

        let symbol = read_symbol(cursor, symtab_offset, index)?;

        let address = if symbol.is_undefined() {
            if symbol.name_offset == 0 {
                None
            } else {
                let name = read_string_at(cursor, strtab_offset + symbol.name_offset)?;
                let resolved = resolver.resolve(&name);
                if resolved.is_none() {
                    log::warn!("unresolved import: {name}");
                }
                resolved
            }
        } else {
            sections
                .get_by_sec_idx(symbol.section_index)
                .and_then(|record| record.base_address())
                .map(|base| base.wrapping_add(symbol.value))
        };

        match address {
            Some(addr) => {
                self.cache.insert(index, addr);
                Ok(addr)
            }
            None => Ok(INVALID_ADDRESS),
        }
    }
}
