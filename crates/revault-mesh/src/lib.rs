//! Mesh and skeleton decoder for RE Engine `.mesh` files.
//!
//! Two layouts are supported, selected by the 16-bit version tag at offset 4:
//!
//! - `0x2800`: vertices interleaved in one buffer, with a per-LOD bone remap
//! - `0x0600`: one buffer per attribute, located through a block table, with a
//!   file-wide skinned bone table
//!
//! Vertex strides are not stored; they are inferred from the UV layer count and
//! whether the file has a skeleton.
//!
//! # Example
//!
//! ```no_run
//! let data = std::fs::read("ch01_0000.mesh.1808282334")?;
//! let file = revault_mesh::decode_mesh(&data)?;
//!
//! for (lod, model) in file.models.iter().flatten().enumerate() {
//!     println!("LOD {lod}: {} meshes, {} bones", model.meshes.len(), model.skeleton.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod lod;
mod skeleton;

pub mod header;
pub mod vertex;

#[cfg(test)]
mod test_util;

use std::sync::Arc;

use hashbrown::HashMap;
use revault_common::{model::scale_skeleton, pointer, BinaryReader, Bone, Model};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use header::{
    BoneHeaderRe2, BoneHeaderRe7, FileLayout, GeometryHeaderRe2, GeometryHeaderRe7, MeshHeaderRe2,
    MeshHeaderRe7, VertexBlock,
};
use lod::Geometry;
use skeleton::BoneTable;
use vertex::VertexStorage;

pub use error::{Error, Result};

/// Mesh layout generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeshVersion {
    /// Interleaved vertex buffer
    Re7,
    /// Per-attribute vertex blocks
    Re2,
}

impl MeshVersion {
    pub const TAG_RE7: u16 = 0x2800;
    pub const TAG_RE2: u16 = 0x0600;

    pub fn from_tag(tag: u16) -> Result<Self> {
        match tag {
            Self::TAG_RE7 => Ok(Self::Re7),
            Self::TAG_RE2 => Ok(Self::Re2),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }
}

/// A decoded mesh file.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshFile {
    pub version: MeshVersion,
    /// Shared by every model below.
    pub skeleton: Arc<[Bone]>,
    /// Indexed by model slot, then LOD.
    pub models: Vec<Vec<Model>>,
}

impl MeshFile {
    /// The highest-detail model, if any.
    pub fn primary(&self) -> Option<&Model> {
        self.models.first().and_then(|lods| lods.first())
    }

    /// Number of LODs across all slots.
    pub fn lod_count(&self) -> usize {
        self.models.iter().map(Vec::len).sum()
    }

    /// Scale every model and the shared skeleton by `factor`.
    pub fn scale(&mut self, factor: f32) {
        self.skeleton = scale_skeleton(&self.skeleton, factor);
        for model in self.models.iter_mut().flatten() {
            model.scale(factor);
            model.skeleton = Arc::clone(&self.skeleton);
        }
    }

    /// Mutable access to every model of every slot.
    pub fn models_mut(&mut self) -> impl Iterator<Item = &mut Model> {
        self.models.iter_mut().flatten()
    }
}

/// Decode a mesh file.
pub fn decode_mesh(buffer: &[u8]) -> Result<MeshFile> {
    let mut reader = BinaryReader::new(buffer);
    let version = MeshVersion::from_tag(reader.read_u16_at(4)?)?;

    tracing::debug!("decoding {:?} mesh ({} bytes)", version, buffer.len());

    match version {
        MeshVersion::Re7 => decode_re7(&mut reader),
        MeshVersion::Re2 => decode_re2(&mut reader),
    }
}

fn decode_re7(reader: &mut BinaryReader) -> Result<MeshFile> {
    let header: MeshHeaderRe7 = reader.read_struct_at(0)?;
    let layout = FileLayout::from(header);

    let mut bones = BoneTable::default();
    if layout.bone_header > 0 {
        let bone_header: BoneHeaderRe7 = reader.read_struct_at(pointer(layout.bone_header)?)?;
        bones = BoneTable {
            count: bone_header.bone_count.max(0) as usize,
            records: bone_header.bone_table_pointer,
            matrices: bone_header.matrices_pointer,
        };
    }

    let mut face_buffer = 0;
    let mut base = 0;
    if layout.geometry > 0 {
        let geometry = pointer(layout.geometry)?;
        let geometry_header: GeometryHeaderRe7 = reader.read_struct_at(geometry)?;
        face_buffer = geometry_header.face_buffer_offset;
        base = geometry + std::mem::size_of::<GeometryHeaderRe7>();
    }

    let storage = VertexStorage::Interleaved {
        base,
        skinned: bones.count > 0,
    };

    finish(reader, MeshVersion::Re7, &layout, bones, storage, face_buffer)
}

fn decode_re2(reader: &mut BinaryReader) -> Result<MeshFile> {
    let header: MeshHeaderRe2 = reader.read_struct_at(0)?;
    let layout = FileLayout::from(header);

    let mut bones = BoneTable::default();
    let mut skinned_bones = Vec::new();
    if layout.bone_header > 0 {
        let at = pointer(layout.bone_header)?;
        let bone_header: BoneHeaderRe2 = reader.read_struct_at(at)?;
        bones = BoneTable {
            count: bone_header.bone_count.max(0) as usize,
            records: bone_header.bone_table_pointer,
            matrices: bone_header.matrices_pointer,
        };
        skinned_bones = reader.read_array_at(
            at + std::mem::size_of::<BoneHeaderRe2>(),
            bone_header.skinned_bone_count.max(0) as usize,
        )?;
    }

    let mut face_buffer = 0;
    let mut blocks = HashMap::new();
    if layout.geometry > 0 {
        let geometry: GeometryHeaderRe2 = reader.read_struct_at(pointer(layout.geometry)?)?;
        face_buffer = geometry.face_buffer_offset;

        let table: Vec<VertexBlock> = reader.read_array_at(
            pointer(geometry.vertex_blocks_offset)?,
            geometry.vertex_block_count.max(0) as usize,
        )?;
        for block in table {
            let offset = geometry
                .vertex_data_offset
                .checked_add(i64::from(block.offset))
                .ok_or(revault_common::Error::InvalidPointer(geometry.vertex_data_offset))?;
            blocks.insert(block.id, pointer(offset)?);
        }
    }

    let storage = VertexStorage::Blocks {
        blocks,
        skinned_bones,
    };

    finish(reader, MeshVersion::Re2, &layout, bones, storage, face_buffer)
}

fn finish(
    reader: &mut BinaryReader,
    version: MeshVersion,
    layout: &FileLayout,
    bones: BoneTable,
    storage: VertexStorage,
    face_buffer: i64,
) -> Result<MeshFile> {
    let strings = skeleton::read_strings(reader, layout.string_table, layout.string_count)?;
    let skeleton = skeleton::read_skeleton(reader, &strings, layout.bone_names, bones)?;

    let geometry = Geometry {
        layout,
        strings: &strings,
        skeleton: &skeleton,
        storage: &storage,
        face_buffer,
    };
    let models = lod::read_models(reader, &geometry)?;

    Ok(MeshFile {
        version,
        skeleton,
        models,
    })
}
