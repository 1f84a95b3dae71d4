//! Error types for revault-common.

use thiserror::Error;

/// Common error type for Revault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A read would run past the end of the buffer.
    #[error("unexpected end of buffer at {offset:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// An on-disk pointer that cannot address the buffer (negative or too large).
    #[error("invalid pointer: {0:#x}")]
    InvalidPointer(i64),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// UTF-16 decoding error.
    #[error("UTF-16 error: {0}")]
    Utf16(#[from] std::string::FromUtf16Error),

    /// Missing null terminator in string.
    #[error("string missing null terminator")]
    MissingNullTerminator,
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
