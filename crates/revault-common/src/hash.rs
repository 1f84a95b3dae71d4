//! Path hashing.
//!
//! Packages index their entries by MurmurHash3 (x86, 32-bit) of the asset path
//! encoded as UTF-16LE. Each entry stores two hashes: one of the lower-cased
//! path and one of the upper-cased path.

use std::io::Cursor;

use crate::Result;

/// Seed used by the engine for every path hash.
pub const SEED: u32 = 0xFFFF_FFFF;

/// Compute the MurmurHash3 of a byte slice.
#[inline]
pub fn hash_bytes(data: &[u8]) -> Result<u32> {
    Ok(murmur3::murmur3_32(&mut Cursor::new(data), SEED)?)
}

/// Compute the hash of a string as UTF-16LE, without case folding.
pub fn hash_utf16(s: &str) -> Result<u32> {
    let bytes: Vec<u8> = s.encode_utf16().flat_map(u16::to_le_bytes).collect();
    hash_bytes(&bytes)
}

/// Hash of the lower-cased path; the key of a package's entry table.
#[inline]
pub fn hash_path(path: &str) -> Result<u32> {
    hash_utf16(&normalize(path).to_lowercase())
}

/// Hash of the upper-cased path.
#[inline]
pub fn hash_path_upper(path: &str) -> Result<u32> {
    hash_utf16(&normalize(path).to_uppercase())
}

/// Package paths always use forward slashes.
fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}
