//! Name caches for RE Engine packages.
//!
//! Packages store only path hashes. Name caches map those hashes back to
//! paths so entries can be labeled and cross-referenced. Two file kinds are
//! supported:
//!
//! - `.tcache`: binary, optionally compressed (zlib, Zstandard or LZ4 block),
//!   holding 32-bit or 64-bit hashes
//! - `.tcache_ascii`: one `hex_hash,name` record per line

mod cache;
mod error;

pub mod format;

pub use cache::{NameCache, BINARY_EXTENSION, TEXT_EXTENSION};
pub use error::{Error, Result};
pub use format::{CacheCompression, CacheHeader, HashWidth};
