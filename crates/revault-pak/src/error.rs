//! Error types for the package crate.

use thiserror::Error;

/// Errors that can occur when working with packages.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] revault_common::Error),

    /// The header does not carry the package signature.
    #[error("invalid package magic: expected {expected:#010x}, got {actual:#010x}")]
    InvalidMagic { expected: u32, actual: u32 },

    /// Unsupported package version.
    #[error("unsupported package version: {0}")]
    UnsupportedVersion(u32),

    /// The header declares a negative entry count.
    #[error("invalid entry count: {0}")]
    InvalidEntryCount(i32),

    /// Unsupported compression codec in an entry's flags.
    #[error("unsupported compression codec: {0}")]
    UnsupportedCompression(u8),

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Entry not found.
    #[error("entry not found: {0:#010x}")]
    EntryNotFound(u32),
}

/// Result type for package operations.
pub type Result<T> = std::result::Result<T, Error>;
