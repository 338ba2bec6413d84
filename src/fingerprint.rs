//! Content fingerprinting.
//!
//! Streams a content handle through SHA-1 in fixed-size blocks and returns
//! the digest as lowercase hex. The handle is rewound afterwards so the same
//! stream can be re-read by the output assembler.

use std::io::{Read, Seek, SeekFrom};

use sha1::{Digest, Sha1};

use crate::DiffError;

/// Read granularity while hashing. Memory use is one block regardless of
/// entry size.
const BLOCK_SIZE: usize = 10 * 1024;

/// Computes the SHA-1 fingerprint of `stream` and repositions it at the
/// start.
pub fn fingerprint<S: Read + Seek>(stream: &mut S) -> Result<String, DiffError> {
    let mut hasher = Sha1::new();
    let mut block = [0u8; BLOCK_SIZE];
    loop {
        let n = stream.read(&mut block)?;
        if n == 0 {
            break;
        }
        hasher.update(&block[..n]);
    }
    stream.seek(SeekFrom::Start(0))?;
    Ok(hex::encode(hasher.finalize()))
}
