//! Error types for the mesh crate.

use thiserror::Error;

/// Errors that can occur when decoding a mesh file.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] revault_common::Error),

    /// The version tag at offset 4 is not a known layout.
    #[error("unsupported mesh version: {0:#06x}")]
    UnsupportedVersion(u16),

    /// An index into a string, material or bone table is out of range.
    #[error("missing {kind} reference: index {index}")]
    MissingReference { kind: &'static str, index: i64 },
}

impl Error {
    pub(crate) fn missing(kind: &'static str, index: impl Into<i64>) -> Self {
        Self::MissingReference {
            kind,
            index: index.into(),
        }
    }
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, Error>;
