//! Revault - RE Engine package extraction and asset decoding library.
//!
//! This crate ties the Revault crates together: it classifies package
//! entries, dispatches them to the right decoder, resolves the files that
//! assets refer to by path, and runs bulk exports on a worker pool.
//!
//! # Crates
//!
//! - [`revault_common`] - Binary reading, path hashing, shared asset types
//! - [`revault_pak`] - Package (`.pak`) reading
//! - [`revault_cache`] - Hash to path name caches
//! - [`revault_mesh`] - Meshes and skeletons
//! - [`revault_motion`] - Motions and motion lists
//! - [`revault_mdf`] - Material definitions
//!
//! # Example
//!
//! ```no_run
//! use revault::prelude::*;
//!
//! let archive = PakArchive::open("re_chunk_000.pak")?;
//! let cache = NameCache::load_directory("caches");
//!
//! for record in catalog(&archive, &cache) {
//!     if record.kind == AssetKind::Mesh {
//!         let data = archive.read(&record.entry)?;
//!         let asset = decode(record.kind, &data, &mut BoneRegistry::new())?;
//!         println!("{}: {:?}", record.name, asset.kind());
//!     }
//! }
//! # Ok::<(), revault::Error>(())
//! ```

mod asset;
mod catalog;
mod error;
mod export;
mod resolve;

#[cfg(test)]
mod test_util;

pub use revault_cache as cache;
pub use revault_common as common;
pub use revault_mdf as mdf;
pub use revault_mesh as mesh;
pub use revault_motion as motion;
pub use revault_pak as pak;

pub use asset::{decode, Asset, AssetKind};
pub use catalog::{catalog, label, AssetRecord};
pub use error::{Error, Result};
pub use export::{export_assets, AssetSink, ExportOptions, ExportStats};
pub use resolve::{
    attach_materials, resolve_material_file, resolve_texture, FILE_SUFFIXES, TEXTURE_PREFIXES,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        catalog, decode, export_assets, resolve_material_file, resolve_texture, Asset, AssetKind,
        AssetRecord, AssetSink, ExportOptions, ExportStats,
    };
    pub use revault_cache::NameCache;
    pub use revault_common::{BinaryReader, Material, Model};
    pub use revault_mdf::{decode_material, decode_material_defs, MaterialDefs};
    pub use revault_mesh::{decode_mesh, MeshFile};
    pub use revault_motion::{decode_motion, decode_motion_list, Animation, BoneRegistry, MotionList};
    pub use revault_pak::{PakArchive, PakEntry};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
