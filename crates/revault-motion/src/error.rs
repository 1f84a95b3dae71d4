//! Error types for the motion crate.

use thiserror::Error;

use crate::codec::Channel;

/// Errors that can occur when decoding a motion or motion list.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] revault_common::Error),

    /// The leading version word is not a known generation.
    #[error("invalid motion version: {0:#x}")]
    InvalidVersion(u32),

    /// A key block names a compression scheme the generation does not define.
    #[error("unknown {channel} compression scheme: {code:#07x}")]
    UnknownCompression { channel: Channel, code: u32 },

    /// A lossy scheme was used on a key block without unpack constants.
    #[error("{0} key block has no unpack data")]
    MissingUnpackData(Channel),

    /// A channel record refers to a bone hash with no rest pose.
    #[error("no rest pose for bone hash {0:#010x}")]
    MissingBone(u32),
}

/// Result type for motion operations.
pub type Result<T> = std::result::Result<T, Error>;
