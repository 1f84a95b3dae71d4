//! Error types for the umbrella crate.

use thiserror::Error;

use crate::AssetKind;

/// Any failure from package reading or asset decoding.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Common(#[from] revault_common::Error),

    #[error("package: {0}")]
    Pak(#[from] revault_pak::Error),

    #[error("name cache: {0}")]
    Cache(#[from] revault_cache::Error),

    #[error("mesh: {0}")]
    Mesh(#[from] revault_mesh::Error),

    #[error("motion: {0}")]
    Motion(#[from] revault_motion::Error),

    #[error("material: {0}")]
    Material(#[from] revault_mdf::Error),

    /// The asset kind has no decoder.
    #[error("no decoder for {0:?} assets")]
    UnsupportedAsset(AssetKind),

    /// The export worker pool could not be created.
    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for umbrella operations.
pub type Result<T> = std::result::Result<T, Error>;
