//! Decompression utilities for package entries.

use std::io::Read;

use flate2::read::DeflateDecoder;

use crate::entry::Compression;
use crate::{Error, Result};

/// Upper bound on the output buffer reserved from an entry's declared size.
const MAX_PREALLOC: usize = 64 << 20;

/// Decompress a payload with the codec declared by its entry.
pub fn decompress(compression: Compression, data: Vec<u8>, expected_size: usize) -> Result<Vec<u8>> {
    match compression {
        Compression::None => Ok(data),
        Compression::Deflate => decompress_deflate_sized(&data, expected_size),
        Compression::Zstd => decompress_zstd_sized(&data, expected_size),
    }
}

/// Decompress Zstandard-compressed data with known output size.
pub fn decompress_zstd_sized(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut decoder = zstd::Decoder::new(data).map_err(|e| Error::Decompression(e.to_string()))?;

    let mut output = Vec::with_capacity(expected_size.min(MAX_PREALLOC));
    decoder
        .read_to_end(&mut output)
        .map_err(|e| Error::Decompression(e.to_string()))?;

    Ok(output)
}

/// Decompress raw DEFLATE data with known output size.
pub fn decompress_deflate_sized(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);

    let mut output = Vec::with_capacity(expected_size.min(MAX_PREALLOC));
    decoder
        .read_to_end(&mut output)
        .map_err(|e| Error::Decompression(e.to_string()))?;

    Ok(output)
}
