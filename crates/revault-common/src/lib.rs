//! Common utilities for Revault.
//!
//! This crate provides foundational types and utilities used across all Revault crates:
//!
//! - [`BinaryReader`] - Pointer-resolving binary reading from byte slices
//! - [`hash`] - MurmurHash3 path hashing used by package entry tables
//! - [`model`] - Decoded model, skeleton and material types

mod error;
mod reader;

pub mod hash;
pub mod model;

pub use error::{Error, Result};
pub use model::{Bone, Face, Material, Mesh, Model, Vertex, Weight};
pub use reader::{pointer, BinaryReader};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export glam math types used by decoded assets
pub use glam::{Quat, Vec2, Vec3, Vec4};
