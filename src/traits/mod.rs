//! Reader-decoding traits shared by every on-disk structure in this crate.
//!
//! The object format this loader consumes is fixed (32-bit, little-endian,
//! ARM), so unlike a general-purpose ELF library there is no class/encoding
//! type parameter here — every [`FromReader`] implementor decodes exactly
//! one wire shape, pulled through the host's [`FileCursor`](crate::cursor::FileCursor)
//! rather than a raw `std::io::Read`.

use crate::{config::LoaderConfig, cursor::FileCursor, error::LoadError};

/// Decode an owned instance of a type from a [`FileCursor`] at its current
/// position, leaving the cursor positioned just past the decoded bytes.
pub trait FromReader<C>
where
    C: FileCursor,
    Self: Sized,
{
    /// The error type produced on a malformed or truncated read.
    type Error;

    /// Decode an instance honoring `config` (e.g. manifest-size strictness).
    fn from_reader_with(cursor: &mut C, config: &LoaderConfig) -> Result<Self, Self::Error>;

    /// Decode an instance using the default configuration.
    fn from_reader(cursor: &mut C) -> Result<Self, Self::Error> {
        Self::from_reader_with(cursor, &LoaderConfig::default())
    }
}

/// Read a fixed-size field at the cursor's current position, wrapping I/O
/// errors with the offset they occurred at.
pub(crate) fn read_array<C: FileCursor, const N: usize>(
    cursor: &mut C,
) -> Result<[u8; N], LoadError> {
    let offset = cursor.tell().map_err(|e| LoadError::Io {
        offset: 0,
        detail: format!("{e:?}"),
    })?;
    let mut buf = [0u8; N];
    cursor.read_exact(&mut buf).map_err(|e| LoadError::Io {
        offset,
        detail: format!("{e:?}"),
    })?;
    Ok(buf)
}
