//! The file-access boundary the loader core is driven through.
//!
//! The host's filesystem layer is out of scope for this crate (see
//! `SPEC_FULL.md` §1); `FileCursor` is the trait seam a host implements over
//! whatever storage backs the ELF object (a flash-resident file, a RAM
//! buffer, a real `std::fs::File`). Every method reports its own success —
//! unlike the C original this was distilled from, which polls a
//! last-error flag after each call, a per-call `Result` is the idiomatic
//! Rust rendering of the same contract.

use std::io;

/// Random-access, cursor-based read access to one ELF object file.
pub trait FileCursor {
    /// The error type surfaced by a failed seek or read.
    type Error: std::fmt::Debug;

    /// Move the cursor to an absolute byte offset from the start of the file.
    fn seek(&mut self, offset: u64) -> Result<(), Self::Error>;

    /// Current absolute byte offset.
    fn tell(&mut self) -> Result<u64, Self::Error>;

    /// Fill `buf` completely, advancing the cursor. A short read is an error.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Read up to `buf.len()` bytes, advancing the cursor by however many
    /// were actually read. Returns `0` only at true end-of-file; a short
    /// but nonzero read (the cursor ran off the end of the file mid-chunk)
    /// is not an error, unlike [`FileCursor::read_exact`].
    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Blanket [`FileCursor`] over any `Read + Seek`, so tests (and hosts that
/// happen to run on `std`) can drive the loader with an in-memory buffer or
/// a real file handle without writing an adapter.
pub struct StdFileCursor<T> {
    inner: T,
}

impl<T> StdFileCursor<T> {
    /// Wrap a `Read + Seek` value as a [`FileCursor`].
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Unwrap back to the underlying value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> FileCursor for StdFileCursor<T>
where
    T: io::Read + io::Seek,
{
    type Error = io::Error;

    fn seek(&mut self, offset: u64) -> Result<(), Self::Error> {
        self.inner.seek(io::SeekFrom::Start(offset))?;
        Ok(())
    }

    fn tell(&mut self) -> Result<u64, Self::Error> {
        self.inner.stream_position()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.inner.read_exact(buf)
    }

    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        io::Read::read(&mut self.inner, buf)
    }
}
