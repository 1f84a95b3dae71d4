//! Package archive reader.
//!
//! A package is a 16-byte header followed by a table of fixed-size entry
//! records. Payloads are addressed by absolute offset. The underlying stream
//! has a single seek position, so every read holds the archive lock for the
//! duration of seek, read and decompress.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use hashbrown::HashMap;
use parking_lot::Mutex;
use revault_common::{hash, BinaryReader, FromBytes};

use crate::decompress;
use crate::entry::{PakEntry, PakHeader};
use crate::{Error, Result};

/// A package opened for reading.
///
/// Entries are keyed by the hash of their lower-cased path.
pub struct PakArchive<R = BufReader<File>> {
    /// Archive file name
    name: String,
    /// Shared stream, one position for all readers
    reader: Mutex<R>,
    /// Entry table keyed by lower hash
    entries: HashMap<u32, PakEntry>,
}

impl PakArchive<BufReader<File>> {
    /// Open a package from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self::from_reader(name, BufReader::new(file))
    }
}

impl<R: Read + Seek> PakArchive<R> {
    /// Parse the header and entry table from any seekable stream.
    pub fn from_reader(name: impl Into<String>, mut reader: R) -> Result<Self> {
        let name = name.into();

        reader.seek(SeekFrom::Start(0))?;
        let header = Self::read_header(&mut reader)?;
        let count = usize::try_from(header.entry_count)
            .map_err(|_| Error::InvalidEntryCount(header.entry_count))?;

        let table_size = count.saturating_mul(PakEntry::SIZE);
        let mut table = Vec::new();
        reader
            .by_ref()
            .take(table_size as u64)
            .read_to_end(&mut table)?;

        let records: Vec<PakEntry> = BinaryReader::new(&table).read_array(count)?;

        let mut entries = HashMap::with_capacity(count);
        for entry in records {
            entries.insert(entry.hash(), entry);
        }

        tracing::info!(entries = entries.len(), "opened package {}", name);

        Ok(Self {
            name,
            reader: Mutex::new(reader),
            entries,
        })
    }

    fn read_header(reader: &mut R) -> Result<PakHeader> {
        let mut bytes = [0u8; std::mem::size_of::<PakHeader>()];
        reader.read_exact(&mut bytes)?;
        let header = PakHeader::read_from_bytes(&bytes[..]).map_err(|_| {
            revault_common::Error::UnexpectedEof {
                offset: 0,
                needed: bytes.len(),
                available: bytes.len(),
            }
        })?;

        let magic = header.magic;
        if magic != PakHeader::MAGIC {
            return Err(Error::InvalidMagic {
                expected: PakHeader::MAGIC,
                actual: magic,
            });
        }

        let version = header.version;
        if version != PakHeader::VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        Ok(header)
    }

    /// Get the archive name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over entries in table order of the hash map.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PakEntry> + '_ {
        self.entries.values()
    }

    /// Get an entry by its lower-case path hash.
    #[inline]
    pub fn get(&self, hash: u32) -> Option<&PakEntry> {
        self.entries.get(&hash)
    }

    /// Whether an entry with this hash exists.
    #[inline]
    pub fn contains(&self, hash: u32) -> bool {
        self.entries.contains_key(&hash)
    }

    /// Find an entry by path (case-insensitive, either slash style).
    pub fn find(&self, path: &str) -> Option<&PakEntry> {
        hash::hash_path(path).ok().and_then(|h| self.get(h))
    }

    /// Read and decompress an entry's payload.
    pub fn read(&self, entry: &PakEntry) -> Result<Vec<u8>> {
        let compression = entry.compression()?;
        let offset = entry.offset;
        let compressed_size = entry.compressed_size;
        let decompressed_size = entry.decompressed_size;

        tracing::debug!(
            hash = entry.hash(),
            offset,
            compressed_size,
            "reading entry ({:?})",
            compression
        );

        let mut reader = self.reader.lock();
        reader.seek(SeekFrom::Start(offset))?;

        let mut data = Vec::new();
        reader
            .by_ref()
            .take(compressed_size)
            .read_to_end(&mut data)?;

        if (data.len() as u64) < compressed_size {
            return Err(revault_common::Error::UnexpectedEof {
                offset: offset as usize,
                needed: compressed_size as usize,
                available: data.len(),
            }
            .into());
        }

        decompress::decompress(compression, data, decompressed_size as usize)
    }

    /// Read an entry by hash.
    pub fn read_hash(&self, hash: u32) -> Result<Vec<u8>> {
        let entry = self.get(hash).ok_or(Error::EntryNotFound(hash))?;
        self.read(entry)
    }

    /// Read an entry by path.
    pub fn read_path(&self, path: &str) -> Result<Vec<u8>> {
        let hash = hash::hash_path(path)?;
        self.read_hash(hash)
    }
}
