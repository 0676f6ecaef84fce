//! Reading NUL-terminated strings out of an ELF string table.

use crate::{cursor::FileCursor, error::LoadError};

/// Chunk size the original firmware implementation reads strings in;
/// matched here so behavior on pathological (very long, or truncated at a
/// chunk boundary) names is identical.
const CHUNK_SIZE: usize = 32;

/// Read the NUL-terminated string beginning at absolute file offset
/// `offset`, restoring the cursor's prior position before returning so a
/// caller mid-loop over a section table doesn't lose its place.
pub fn read_string_at<C: FileCursor>(cursor: &mut C, offset: u32) -> Result<String, LoadError> {
    let saved = cursor.tell().map_err(|e| LoadError::Io {
        offset: offset as u64,
        detail: format!("{e:?}"),
    })?;

    let result = read_string_at_inner(cursor, offset);

    cursor.seek(saved).map_err(|e| LoadError::Io {
        offset: saved,
        detail: format!("{e:?}"),
    })?;

    result
}

fn read_string_at_inner<C: FileCursor>(cursor: &mut C, offset: u32) -> Result<String, LoadError> {
    cursor.seek(offset as u64).map_err(|e| LoadError::Io {
        offset: offset as u64,
        detail: format!("{e:?}"),
    })?;

    let mut bytes = Vec::new();
    loop {
        let mut chunk = [0u8; CHUNK_SIZE];
        let read = cursor.read_some(&mut chunk).map_err(|e| LoadError::Io {
            offset: offset as u64 + bytes.len() as u64,
            detail: format!("{e:?}"),
        })?;
        if read == 0 {
            return Err(LoadError::Io {
                offset: offset as u64 + bytes.len() as u64,
                detail: "unterminated string: reached end of file".to_string(),
            });
        }
        match chunk[..read].iter().position(|&b| b == 0) {
            Some(nul_at) => {
                bytes.extend_from_slice(&chunk[..nul_at]);
                break;
            }
            None => bytes.extend_from_slice(&chunk[..read]),
        }
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
