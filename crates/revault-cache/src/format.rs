//! Binary cache file layout.

use std::io::Read;

use flate2::read::ZlibDecoder;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// Binary cache header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct CacheHeader {
    /// One of the two [`HashWidth`] signatures
    pub magic: u64,
    /// Payload codec
    pub compression: u64,
    /// Payload size on disk
    pub compressed_size: i64,
    /// Payload size after decompression
    pub decompressed_size: i64,
}

/// Width of the hashes stored in a binary cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashWidth {
    /// "TCACHE01"
    Bits32,
    /// "TCACHE02"
    Bits64,
}

impl HashWidth {
    pub const MAGIC_32: u64 = 0x3130_4548_4341_4354;
    pub const MAGIC_64: u64 = 0x3230_4548_4341_4354;

    pub fn from_magic(magic: u64) -> Result<Self> {
        match magic {
            Self::MAGIC_32 => Ok(Self::Bits32),
            Self::MAGIC_64 => Ok(Self::Bits64),
            other => Err(Error::InvalidMagic(other)),
        }
    }

    pub fn magic(self) -> u64 {
        match self {
            Self::Bits32 => Self::MAGIC_32,
            Self::Bits64 => Self::MAGIC_64,
        }
    }
}

/// Payload codec of a binary cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCompression {
    None,
    Zlib,
    Zstd,
    /// LZ4 block; needs the decompressed size
    Lz4,
}

impl TryFrom<u64> for CacheCompression {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Zlib),
            2 => Ok(Self::Zstd),
            3 => Ok(Self::Lz4),
            other => Err(Error::UnsupportedCompression(other)),
        }
    }
}

/// Upper bound on the output buffer reserved from a header's size field.
const MAX_PREALLOC: usize = 64 << 20;

/// Best case expansion of an LZ4 block.
const LZ4_MAX_RATIO: usize = 255;

impl CacheCompression {
    pub fn decompress(self, data: &[u8], decompressed_size: usize) -> Result<Vec<u8>> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Zlib => {
                let mut output = Vec::with_capacity(decompressed_size.min(MAX_PREALLOC));
                ZlibDecoder::new(data)
                    .read_to_end(&mut output)
                    .map_err(|e| Error::Decompression(e.to_string()))?;
                Ok(output)
            }
            Self::Zstd => {
                zstd::decode_all(data).map_err(|e| Error::Decompression(e.to_string()))
            }
            Self::Lz4 => {
                if decompressed_size > data.len().saturating_mul(LZ4_MAX_RATIO) {
                    return Err(Error::InvalidSize(
                        i64::try_from(decompressed_size).unwrap_or(i64::MAX),
                    ));
                }
                lz4_flex::block::decompress(data, decompressed_size)
                    .map_err(|e| Error::Decompression(e.to_string()))
            }
        }
    }
}
