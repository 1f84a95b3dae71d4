//! Error types for the name cache crate.

use thiserror::Error;

/// Errors that can occur when loading a name cache file.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] revault_common::Error),

    /// The header carries neither cache signature.
    #[error("invalid cache magic: {0:#018x}")]
    InvalidMagic(u64),

    /// Unsupported payload compression.
    #[error("unsupported cache compression: {0}")]
    UnsupportedCompression(u64),

    /// A size field in the header is negative.
    #[error("invalid cache size: {0}")]
    InvalidSize(i64),

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),
}

/// Result type for name cache operations.
pub type Result<T> = std::result::Result<T, Error>;
