//! Locating assets that other assets refer to by path.
//!
//! References carry no version suffix, and the package has no directory, so
//! candidate paths are synthesized and probed by hash.

use std::io::{Read, Seek};

use revault_mdf::{decode_material_defs, MaterialDefs};
use revault_mesh::MeshFile;
use revault_pak::{PakArchive, PakEntry};

use crate::Result;

/// Directories tried in front of a texture path, best quality first.
pub const TEXTURE_PREFIXES: [&str; 2] = ["natives/x64/streaming/", "natives/x64/"];

/// Suffixes tried after a stem, in order.
pub const FILE_SUFFIXES: [&str; 7] = [
    ".mdf2.10",
    "_mat.mdf2.10",
    ".mdf2.6",
    "_mat.mdf2.6",
    ".10",
    ".11",
    ".8",
];

/// Find and decode the material file belonging to a mesh.
///
/// The mesh path is cut at its first dot and each suffix is tried in turn.
/// Candidates that exist but fail to read or decode are skipped.
pub fn resolve_material_file<R: Read + Seek>(
    archive: &PakArchive<R>,
    mesh_path: &str,
) -> Option<(String, MaterialDefs)> {
    let stem = mesh_path.split_once('.').map_or(mesh_path, |(stem, _)| stem);

    for suffix in FILE_SUFFIXES {
        let candidate = format!("{stem}{suffix}");
        let Some(entry) = archive.find(&candidate) else {
            continue;
        };

        match read_material_defs(archive, entry) {
            Ok(defs) => return Some((candidate, defs)),
            Err(e) => tracing::debug!("skipping material candidate {}: {}", candidate, e),
        }
    }
    None
}

fn read_material_defs<R: Read + Seek>(archive: &PakArchive<R>, entry: &PakEntry) -> Result<MaterialDefs> {
    let data = archive.read(entry)?;
    Ok(decode_material_defs(&data)?)
}

/// Find the package entry for a texture path taken from a material.
pub fn resolve_texture<R: Read + Seek>(
    archive: &PakArchive<R>,
    texture_path: &str,
) -> Option<(String, PakEntry)> {
    TEXTURE_PREFIXES
        .iter()
        .flat_map(|prefix| {
            FILE_SUFFIXES
                .iter()
                .map(move |suffix| format!("{prefix}{texture_path}{suffix}"))
        })
        .find_map(|candidate| archive.find(&candidate).map(|entry| (candidate, *entry)))
}

/// Resolve a mesh's material file and merge it onto every model.
///
/// Returns the number of model materials that found a definition.
pub fn attach_materials<R: Read + Seek>(
    archive: &PakArchive<R>,
    mesh_path: &str,
    file: &mut MeshFile,
) -> usize {
    let Some((path, defs)) = resolve_material_file(archive, mesh_path) else {
        tracing::debug!("no material file for {}", mesh_path);
        return 0;
    };

    let applied: usize = file
        .models_mut()
        .map(|model| model.apply_materials(|name| defs.get(name)))
        .sum();
    tracing::debug!("applied {} materials from {}", applied, path);
    applied
}
