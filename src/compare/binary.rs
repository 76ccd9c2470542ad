//! Byte-for-byte file comparison.
//!
//! Files are streamed in fixed-size chunks from both sides, so memory use
//! stays constant regardless of file size. A size mismatch returns early;
//! equal sizes always fall through to a full content comparison.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::CompareError;

/// Chunk size used when streaming both files.
const CHUNK_SIZE: usize = 64 * 1024;

/// Check whether two files have identical content.
///
/// # Errors
///
/// Returns [`CompareError::Io`] if either file cannot be opened or read.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool, CompareError> {
    let size_a = std::fs::metadata(a).map_err(|e| CompareError::io(a, e))?.len();
    let size_b = std::fs::metadata(b).map_err(|e| CompareError::io(b, e))?.len();
    if size_a != size_b {
        return Ok(false);
    }

    let mut file_a = File::open(a).map_err(|e| CompareError::io(a, e))?;
    let mut file_b = File::open(b).map_err(|e| CompareError::io(b, e))?;
    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let read_a = read_full(&mut file_a, &mut buf_a).map_err(|e| CompareError::io(a, e))?;
        let read_b = read_full(&mut file_b, &mut buf_b).map_err(|e| CompareError::io(b, e))?;

        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; returns bytes read (0 at EOF).
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
