//! Error types for the material crate.

use thiserror::Error;

/// Errors that can occur when decoding a material definition file.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] revault_common::Error),

    /// A count field is negative.
    #[error("invalid {kind} count: {count}")]
    InvalidCount { kind: &'static str, count: i32 },
}

/// Result type for material operations.
pub type Result<T> = std::result::Result<T, Error>;
