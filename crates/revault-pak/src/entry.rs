//! On-disk package header and entry records.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// Package header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct PakHeader {
    /// Signature, always [`PakHeader::MAGIC`]
    pub magic: u32,
    /// Layout version
    pub version: u32,
    /// Number of entry records following the header
    pub entry_count: i32,
    /// Header checksum (not verified)
    pub checksum: u32,
}

impl PakHeader {
    /// "KPKA" read as a little-endian u32.
    pub const MAGIC: u32 = 0x414B_504B;

    /// The only supported entry table layout.
    pub const VERSION: u32 = 4;
}

/// An entry in the package's hashed entry table.
///
/// Entries describe where an asset's payload lives; use
/// [`PakArchive::read`](crate::PakArchive::read) to materialize it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct PakEntry {
    /// Hash of the lower-cased path, the table key
    pub lower_hash: u32,
    /// Hash of the upper-cased path
    pub upper_hash: u32,
    /// Absolute offset of the payload
    pub offset: u64,
    /// Payload size on disk
    pub compressed_size: u64,
    /// Payload size after decompression
    pub decompressed_size: u64,
    /// Low nibble of the first byte selects the codec
    pub flags: [u8; 8],
    /// Payload checksum (not verified)
    pub checksum: i64,
}

impl PakEntry {
    /// Size of an entry record on disk.
    pub const SIZE: usize = 48;

    /// The table key.
    #[inline]
    pub fn hash(&self) -> u32 {
        self.lower_hash
    }

    /// Raw codec nibble.
    #[inline]
    pub fn codec(&self) -> u8 {
        self.flags[0] & 0x0F
    }

    /// Compression applied to the payload.
    pub fn compression(&self) -> Result<Compression> {
        Compression::try_from(self.codec()).map_err(Error::UnsupportedCompression)
    }
}

/// Entry payload codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Stored as-is
    None,
    /// Raw DEFLATE stream without a zlib header
    Deflate,
    /// Zstandard frame
    Zstd,
}

impl TryFrom<u8> for Compression {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Deflate),
            2 => Ok(Self::Zstd),
            other => Err(other),
        }
    }
}
