//! On-disk mesh structures.
//!
//! Two header generations exist. They carry the same pointers with different
//! widths and padding, so both are normalized into a [`FileLayout`] before
//! any model data is walked.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Interleaved-vertex generation header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct MeshHeaderRe7 {
    pub magic: u32,
    pub version: u32,
    pub file_size: i32,
    pub unk: u16,
    pub string_count: u16,
    pub model_pointers: [i64; 3],
    pub bone_header_pointer: i64,
    pub unk_pointer01: i64,
    pub unk_pointer02: i64,
    pub geometry_pointer: i64,
    pub unk_pointer03: i64,
    pub material_names_pointer: i64,
    pub bone_names_pointer: i64,
    pub unk_pointer04: i64,
    pub string_table_pointer: i64,
}

/// Vertex-block generation header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct MeshHeaderRe2 {
    pub magic: u32,
    pub version: u32,
    pub file_size: i64,
    pub unk: u16,
    pub string_count: u16,
    pub padding: u32,
    pub model_pointers: [i64; 3],
    pub bone_header_pointer: i64,
    pub unk_pointer01: i64,
    pub unk_pointer02: i64,
    pub unk_pointer03: i64,
    pub geometry_pointer: i64,
    pub unk_pointer05: i64,
    pub material_names_pointer: i64,
    pub bone_names_pointer: i64,
    pub unk_pointer08: i64,
    pub string_table_pointer: i64,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct BoneHeaderRe7 {
    pub bone_count: i16,
    pub padding: [u8; 14],
    pub bone_table_pointer: i64,
    pub matrices_pointer: i64,
    pub unk_matrices_pointer01: i64,
    pub unk_matrices_pointer02: i64,
}

/// Followed directly by `skinned_bone_count` i16 skeleton indices.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct BoneHeaderRe2 {
    pub bone_count: i32,
    pub skinned_bone_count: i32,
    pub padding: i64,
    pub bone_table_pointer: i64,
    pub matrices_pointer: i64,
    pub unk_matrices_pointer01: i64,
    pub unk_matrices_pointer02: i64,
}

/// Hierarchy record, one per bone.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct BoneRecord {
    pub index: i16,
    pub parent: i16,
    pub next_sibling: i16,
    pub first_child: i16,
    pub unk: i16,
    pub padding: [u8; 6],
}

/// Row-major 4x4 transform; the last row holds the translation.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Matrix4x4 {
    pub rows: [[f32; 4]; 4],
}

/// Model slot header. The LOD table pointer lives at `slot + 64`.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct ModelHeader {
    pub lod_count: u8,
    pub material_count: u8,
    pub uv_count: u8,
    pub unk01: u8,
    pub unk02: i32,
}

impl ModelHeader {
    /// Offset of the LOD table pointer from the start of the slot.
    pub const LOD_TABLE_OFFSET: usize = 64;
}

/// LOD header. Interleaved files follow it with `bone_count` i16 remap entries.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LodHeader {
    pub mesh_count: u16,
    /// 0 = 16-bit face indices, 1 = 32-bit
    pub flags: u8,
    pub bone_count: u8,
    pub distance: f32,
    pub meshes_pointer: i64,
}

/// Mesh group header, followed by `submesh_count` [`SubMeshHeader`]s.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LodMesh {
    pub index: u8,
    pub submesh_count: u8,
    pub unk01: u8,
    pub unk02: u8,
    pub unk03: i32,
    pub vertex_count: i32,
    pub face_count: i32,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct SubMeshHeader {
    pub material_index: i32,
    pub face_count: i32,
    pub face_index: i32,
    pub vertex_index: i32,
}

/// Geometry header of interleaved files. Vertices start right after it.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct GeometryHeaderRe7 {
    pub vertex_buffer_size: u32,
    pub unk_pointer: i64,
    pub padding: i32,
    pub face_buffer_size: i32,
    pub unk_pointer01: i64,
    pub padding01: i32,
    pub unk01: i64,
    pub face_buffer_offset: i64,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct GeometryHeaderRe2 {
    pub vertex_blocks_offset: i64,
    pub vertex_data_offset: i64,
    pub face_buffer_offset: i64,
    pub vertex_buffer_size: i32,
    pub face_buffer_size: i32,
    pub vertex_block_count: i16,
    pub unk_block_count: i16,
    pub unk01: i64,
    pub unk02: i32,
}

/// Attribute block; `offset` is relative to the geometry's vertex data.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct VertexBlock {
    pub id: i16,
    pub element_size: i16,
    pub offset: i32,
}

/// Pointers common to both header generations.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FileLayout {
    pub string_count: usize,
    pub model_pointers: [i64; 3],
    pub bone_header: i64,
    pub geometry: i64,
    pub material_names: i64,
    pub bone_names: i64,
    pub string_table: i64,
}

impl From<MeshHeaderRe7> for FileLayout {
    fn from(h: MeshHeaderRe7) -> Self {
        Self {
            string_count: h.string_count as usize,
            model_pointers: h.model_pointers,
            bone_header: h.bone_header_pointer,
            geometry: h.geometry_pointer,
            material_names: h.material_names_pointer,
            bone_names: h.bone_names_pointer,
            string_table: h.string_table_pointer,
        }
    }
}

impl From<MeshHeaderRe2> for FileLayout {
    fn from(h: MeshHeaderRe2) -> Self {
        Self {
            string_count: h.string_count as usize,
            model_pointers: h.model_pointers,
            bone_header: h.bone_header_pointer,
            geometry: h.geometry_pointer,
            material_names: h.material_names_pointer,
            bone_names: h.bone_names_pointer,
            string_table: h.string_table_pointer,
        }
    }
}
