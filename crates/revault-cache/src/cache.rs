//! Hash to name lookup table.

use std::fs;
use std::path::Path;

use hashbrown::HashMap;
use revault_common::BinaryReader;

use crate::format::{CacheCompression, CacheHeader, HashWidth};
use crate::{Error, Result};

/// Extension of binary cache files.
pub const BINARY_EXTENSION: &str = "tcache";

/// Extension of plain-text cache files.
pub const TEXT_EXTENSION: &str = "tcache_ascii";

/// Maps package hashes to human-readable asset paths.
///
/// Purely advisory: a missing name never prevents decoding, it only leaves an
/// entry unlabeled. When the same hash is loaded twice, the later name wins.
#[derive(Debug, Clone, Default)]
pub struct NameCache {
    entries: HashMap<u64, String>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every cache file in a directory.
    ///
    /// Files that fail to load are skipped, as is an unreadable directory.
    pub fn load_directory<P: AsRef<Path>>(path: P) -> Self {
        let mut cache = Self::new();
        cache.extend_from_directory(path.as_ref());
        cache
    }

    fn extend_from_directory(&mut self, dir: &Path) {
        let read_dir = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(e) => {
                tracing::debug!("cannot scan cache directory {}: {}", dir.display(), e);
                return;
            }
        };

        for path in read_dir.filter_map(|e| e.ok()).map(|e| e.path()) {
            let result = match path.extension().and_then(|e| e.to_str()) {
                Some(BINARY_EXTENSION) => self.load_binary(&path),
                Some(TEXT_EXTENSION) => self.load_text(&path),
                _ => continue,
            };

            match result {
                Ok(count) => tracing::debug!("loaded {} names from {}", count, path.display()),
                Err(e) => tracing::debug!("failed to load {}: {}", path.display(), e),
            }
        }
    }

    /// Load a binary cache file, returning the number of records read.
    pub fn load_binary<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let data = fs::read(path)?;
        self.parse_binary(&data)
    }

    /// Load a plain-text cache file, returning the number of records read.
    pub fn load_text<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let text = fs::read_to_string(path)?;
        Ok(self.parse_text(&text))
    }

    /// Parse the contents of a binary cache file.
    pub fn parse_binary(&mut self, data: &[u8]) -> Result<usize> {
        let mut reader = BinaryReader::new(data);
        let header: CacheHeader = reader.read_struct()?;

        let width = HashWidth::from_magic(header.magic)?;
        let compression = CacheCompression::try_from(header.compression)?;
        let compressed_size = size(header.compressed_size)?;
        let decompressed_size = size(header.decompressed_size)?;

        let payload = compression.decompress(reader.read_bytes(compressed_size)?, decompressed_size)?;

        let mut reader = BinaryReader::new(&payload);
        let count = reader.read_u64()?;

        // Parse into a staging list so a truncated file leaves the cache untouched.
        let mut records = Vec::new();
        for _ in 0..count {
            let hash = match width {
                HashWidth::Bits32 => u64::from(reader.read_u32()?),
                HashWidth::Bits64 => reader.read_u64()?,
            };
            records.push((hash, reader.read_cstring()?.to_string()));
        }

        let read = records.len();
        self.entries.extend(records);
        Ok(read)
    }

    /// Parse `hash,name[,...]` lines with a hexadecimal hash.
    ///
    /// Malformed lines are skipped.
    pub fn parse_text(&mut self, text: &str) -> usize {
        let mut read = 0;
        for line in text.lines() {
            let mut fields = line.trim().split(',');
            let (Some(hash), Some(name)) = (fields.next(), fields.next()) else {
                continue;
            };
            if let Ok(hash) = u64::from_str_radix(hash, 16) {
                self.entries.insert(hash, name.to_string());
                read += 1;
            }
        }
        read
    }

    /// Look up the name of a hash.
    #[inline]
    pub fn get(&self, hash: u64) -> Option<&str> {
        self.entries.get(&hash).map(String::as_str)
    }

    #[inline]
    pub fn insert(&mut self, hash: u64, name: impl Into<String>) {
        self.entries.insert(hash, name.into());
    }

    /// Add all names from `other`; its names win on collision.
    pub fn merge(&mut self, other: NameCache) {
        self.entries.extend(other.entries);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> + '_ {
        self.entries.iter().map(|(hash, name)| (*hash, name.as_str()))
    }
}

fn size(value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::InvalidSize(value))
}
