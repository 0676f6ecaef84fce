//! The section map: an insertion-ordered, name-keyed directory of the
//! logical sections (`.text`, `.rodata`, `.data`, `.bss`) this loader cares
//! about, plus the bitmask of required categories classification observed.

use crate::host::SectionBuffer;
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Categories the classifier must see at least once for an object to
    /// be loadable.
    pub struct SectionCategories: u32 {
        /// `.symtab` was found.
        const SYMBOL_TABLE = 0x1;
        /// `.strtab` was found.
        const SYMBOL_STRINGS = 0x2;
        /// `.fapmeta` was found.
        const MANIFEST = 0x4;
    }
}

impl SectionCategories {
    /// The categories every loadable object must carry.
    pub const REQUIRED: Self = Self::from_bits_truncate(
        Self::SYMBOL_TABLE.bits() | Self::SYMBOL_STRINGS.bits() | Self::MANIFEST.bits(),
    );
}

#[derive(Debug, Default)]
/// State tracked for one logical section (`.text`, `.rodata`, `.data`, or
/// `.bss`) across classification and loading.
pub struct SectionRecord {
    /// Section-table index of the payload section. 0 means absent.
    pub sec_idx: u16,
    /// Section-table index of the paired `.rel.*` section. 0 means absent.
    pub rel_sec_idx: u16,
    /// Runtime image, populated by the section loader.
    pub data: Option<SectionBuffer>,
}

impl SectionRecord {
    /// Runtime base address, if loaded.
    pub fn base_address(&self) -> Option<u32> {
        self.data.as_ref().map(|b| b.address())
    }
}

/// An insertion-ordered map from logical section name (`.rel` prefix
/// stripped) to its [`SectionRecord`].
///
/// A plain `Vec` rather than a `HashMap`: the number of distinct sections
/// is always small, and the memory-map publication order (§4.8) must be
/// stable and reproducible, which a hash map's iteration order is not.
#[derive(Debug, Default)]
pub struct SectionMap {
    entries: Vec<(String, SectionRecord)>,
}

impl SectionMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update the payload index for `name`. If `name` already has
    /// a record, its `sec_idx` is overwritten (last write wins — see
    /// `SPEC_FULL.md` §9).
    pub fn set_payload(&mut self, name: &str, sec_idx: u16) {
        self.entry_mut(name).sec_idx = sec_idx;
    }

    /// Insert or update the relocation-section index for `name`.
    pub fn set_relocations(&mut self, name: &str, rel_sec_idx: u16) {
        self.entry_mut(name).rel_sec_idx = rel_sec_idx;
    }

    fn entry_mut(&mut self, name: &str) -> &mut SectionRecord {
        if let Some(pos) = self.entries.iter().position(|(n, _)| n == name) {
            &mut self.entries[pos].1
        } else {
            self.entries.push((name.to_string(), SectionRecord::default()));
            &mut self.entries.last_mut().expect("just pushed").1
        }
    }

    /// Look up a record by logical name.
    pub fn get(&self, name: &str) -> Option<&SectionRecord> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    /// Look up a record by the payload section-table index.
    pub fn get_by_sec_idx(&self, sec_idx: u16) -> Option<&SectionRecord> {
        self.entries
            .iter()
            .find(|(_, r)| r.sec_idx == sec_idx)
            .map(|(_, r)| r)
    }

    /// Iterate records in insertion (first-classified) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SectionRecord)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    /// Iterate records mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut SectionRecord)> {
        self.entries.iter_mut().map(|(n, r)| (n.as_str(), r))
    }

    /// Number of distinct logical sections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no section has been classified yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain all records, releasing ownership of their buffers to the
    /// caller (used by teardown).
    pub fn drain(&mut self) -> Vec<(String, SectionRecord)> {
        std::mem::take(&mut self.entries)
    }
}

/// Strip a leading `.rel` from a section name, yielding the logical name
/// its payload counterpart would be classified under (`.rel.text` -> `.text`).
pub fn strip_rel_prefix(name: &str) -> &str {
    name.strip_prefix(".rel").unwrap_or(name)
}
