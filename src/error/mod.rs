//! Error types for the loader core.
//!
//! [`LoadError`] covers conditions that abort a stage outright (truncated
//! reads, structurally invalid objects, allocation failure). Softer
//! conditions — an unresolved import, an unsupported relocation type — are
//! not represented here; they accumulate into [`LoadStatus`] instead, since
//! the engine keeps processing the rest of a relocation section after one.

#[derive(thiserror::Error, Debug, PartialEq, Eq, Hash)]
/// Fatal errors raised while parsing or loading an ELF object.
pub enum LoadError {
    #[error("I/O error at offset {offset}: {detail}")]
    /// A `read_exact`/`seek` on the file cursor failed or returned short.
    Io {
        /// The file offset the operation was attempted at.
        offset: u64,
        /// Debug rendering of the host cursor's error value.
        detail: String,
    },
    #[error("invalid ELF magic")]
    /// The file does not begin with the ELF magic bytes.
    InvalidMagic,
    #[error("unsupported ELF class {value} (only 32-bit objects are supported)")]
    /// `EI_CLASS` was not `ELFCLASS32`.
    UnsupportedClass {
        /// The raw `EI_CLASS` byte.
        value: u8,
    },
    #[error("unsupported ELF data encoding {value} (only little-endian objects are supported)")]
    /// `EI_DATA` was not `ELFDATA2LSB`.
    UnsupportedDataEncoding {
        /// The raw `EI_DATA` byte.
        value: u8,
    },
    #[error("unsupported ELF machine {value} (only ARM is supported)")]
    /// `e_machine` was not `EM_ARM`.
    UnsupportedMachine {
        /// The raw `e_machine` value.
        value: u16,
    },
    #[error("missing required section category: {category}")]
    /// Classification finished without one of the sections every object is
    /// required to carry (symbol table, symbol string table, manifest).
    MissingRequiredSection {
        /// A human-readable name of the missing category.
        category: &'static str,
    },
    #[error(".fapmeta section is {size} bytes, smaller than the minimum of {minimum}")]
    /// The manifest section was smaller than the minimum manifest record size.
    ManifestTooSmall {
        /// The size actually found.
        size: u32,
        /// The minimum required size.
        minimum: u32,
    },
    #[error("allocation of {size} bytes (align {align}) for section failed")]
    /// The host-supplied allocator returned `None`.
    AllocationFailed {
        /// Requested size in bytes.
        size: u32,
        /// Requested alignment in bytes.
        align: u32,
    },
    #[error("operation attempted out of order: {expected}")]
    /// A loader stage was invoked before its prerequisite stage.
    OutOfOrder {
        /// Description of the stage that should have run first.
        expected: &'static str,
    },
}

/// `Result` alias for fallible, stage-aborting operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Outcome of [`crate::image::ElfImage::load_sections`].
///
/// Unlike [`LoadError`], this is not a `Result` error type: a status other
/// than [`LoadStatus::Success`] still means every section was loaded and the
/// image is safe to tear down, just that some imports or relocations could
/// not be satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    /// Every section loaded, every relocation resolved and patched.
    Success,
    /// One or more external symbols failed to resolve, or one or more
    /// relocation entries used an unsupported type. The image is still
    /// usable; the caller should inspect `missing` before invoking the
    /// entry point.
    MissingImports {
        /// Names of symbols the host resolver could not provide, plus
        /// synthetic entries for unsupported relocation types.
        missing: Vec<String>,
    },
}

impl LoadStatus {
    /// Record one more missing import or unsupported relocation, promoting
    /// `Success` to `MissingImports` on first use.
    pub fn push_missing(&mut self, what: String) {
        match self {
            LoadStatus::Success => {
                *self = LoadStatus::MissingImports {
                    missing: vec![what],
                }
            }
            LoadStatus::MissingImports { missing } => missing.push(what),
        }
    }

    /// True if no import or relocation problems were recorded.
    pub fn is_success(&self) -> bool {
        matches!(self, LoadStatus::Success)
    }
}
