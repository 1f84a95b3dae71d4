//! Synthetic mesh files for tests.
//!
//! Both generations get the same content: two bones, one model slot with one
//! LOD, and one mesh group split into two submeshes of three vertices. The
//! first submesh has one degenerate triangle. A second model slot points at
//! garbage so decoding it would fail.

use half::f16;
use zerocopy::{Immutable, IntoBytes};

use crate::header::*;
use crate::vertex::{block, PackedVector, PackedWeights};
use crate::MeshVersion;

pub(crate) struct Buf(Vec<u8>);

impl Buf {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn put<T: IntoBytes + Immutable + ?Sized>(&mut self, at: usize, value: &T) {
        let bytes = value.as_bytes();
        if self.0.len() < at + bytes.len() {
            self.0.resize(at + bytes.len(), 0);
        }
        self.0[at..at + bytes.len()].copy_from_slice(bytes);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

pub const STRING_TABLE: usize = 0x80;
pub const STRING_DATA: usize = 0xA0;
pub const BONE_NAMES: usize = 0xC0;
pub const MATERIAL_NAMES: usize = 0xD0;
pub const BONE_HEADER: usize = 0x100;
pub const BONE_RECORDS: usize = 0x140;
pub const MATRICES: usize = 0x180;
pub const MODEL: usize = 0x200;
pub const LOD_TABLE: usize = 0x250;
pub const LOD: usize = 0x260;
pub const MESH_TABLE: usize = 0x280;
pub const MESH: usize = 0x290;
pub const GEOMETRY: usize = 0x300;
pub const BLOCK_TABLE: usize = 0x340;
pub const VERTEX_DATA: usize = 0x400;
pub const FACES: usize = 0x500;
/// A pointer to nothing decodable.
pub const GARBAGE: i64 = 0xFFFF_FF;

pub const STRINGS: [&str; 4] = ["root", "spine", "skin", "cloth"];
pub const FACE_INDICES: [u32; 9] = [0, 1, 2, 2, 2, 1, 0, 2, 1];
pub const VERTEX_COUNT: usize = 6;
pub const UV: [f32; 2] = [0.5, 0.25];

/// Local indices [0, 1] with weights 200 and 55.
pub fn packed_weights() -> PackedWeights {
    PackedWeights {
        indices: [0, 1, 0, 0, 0, 0, 0, 0],
        weights: [200, 55, 0, 0, 0, 0, 0, 0],
    }
}

fn matrix(x: [f32; 4], y: [f32; 4], z: [f32; 4], w: [f32; 4]) -> Matrix4x4 {
    Matrix4x4 { rows: [x, y, z, w] }
}

fn bone(index: i16, parent: i16) -> BoneRecord {
    BoneRecord {
        index,
        parent,
        next_sibling: -1,
        first_child: -1,
        unk: index,
        padding: [0; 6],
    }
}

fn uv_bits() -> [u16; 2] {
    [f16::from_f32(UV[0]).to_bits(), f16::from_f32(UV[1]).to_bits()]
}

fn put_common(buf: &mut Buf, lod_flags: u8, lod_bones: u8) {
    let mut at = STRING_DATA;
    let mut offsets = Vec::new();
    for s in STRINGS {
        offsets.push(at as i64);
        buf.put(at, s.as_bytes());
        at += s.len() + 1;
    }
    buf.put(STRING_TABLE, offsets.as_slice());
    buf.put(BONE_NAMES, &[0u16, 1]);
    buf.put(MATERIAL_NAMES, &[2i16, 3]);

    buf.put(BONE_RECORDS, &[bone(0, -1), bone(1, 0)]);
    buf.put(
        MATRICES,
        &[
            matrix([1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [1.0, 2.0, 3.0, 1.0]),
            matrix([0.0, 1.0, 0.0, 0.0], [-1.0, 0.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 1.0, 0.0, 1.0]),
        ],
    );

    buf.put(
        MODEL,
        &ModelHeader {
            lod_count: 1,
            material_count: 2,
            uv_count: 1,
            unk01: 0,
            unk02: 0,
        },
    );
    buf.put(MODEL + ModelHeader::LOD_TABLE_OFFSET, &(LOD_TABLE as i64));
    buf.put(LOD_TABLE, &(LOD as i64));
    buf.put(
        LOD,
        &LodHeader {
            mesh_count: 1,
            flags: lod_flags,
            bone_count: lod_bones,
            distance: 0.0,
            meshes_pointer: MESH_TABLE as i64,
        },
    );
    // LOD-local remap: local 0 is skeleton bone 1 and vice versa.
    buf.put(LOD + 16, &[1i16, 0]);
    buf.put(MESH_TABLE, &(MESH as i64));
    buf.put(
        MESH,
        &LodMesh {
            index: 0,
            submesh_count: 2,
            unk01: 0,
            unk02: 0,
            unk03: 0,
            vertex_count: VERTEX_COUNT as i32,
            face_count: FACE_INDICES.len() as i32,
        },
    );
    buf.put(
        MESH + 16,
        &[
            SubMeshHeader {
                material_index: 1,
                face_count: 6,
                face_index: 0,
                vertex_index: 0,
            },
            SubMeshHeader {
                material_index: 0,
                face_count: 3,
                face_index: 6,
                vertex_index: 3,
            },
        ],
    );

    if lod_flags == 1 {
        buf.put(FACES, &FACE_INDICES);
    } else {
        let narrow: Vec<u16> = FACE_INDICES.iter().map(|&i| i as u16).collect();
        buf.put(FACES, narrow.as_slice());
    }
}

/// Build a synthetic mesh file of the given generation.
pub fn build(version: MeshVersion) -> Vec<u8> {
    let mut buf = Buf::new();
    match version {
        MeshVersion::Re7 => put_re7(&mut buf),
        MeshVersion::Re2 => put_re2(&mut buf),
    }
    buf.into_inner()
}

fn put_re7(buf: &mut Buf) {
    buf.put(
        0,
        &MeshHeaderRe7 {
            magic: 0x4853_454D,
            version: u32::from(MeshVersion::TAG_RE7),
            file_size: 0,
            unk: 0,
            string_count: STRINGS.len() as u16,
            model_pointers: [MODEL as i64, GARBAGE, 0],
            bone_header_pointer: BONE_HEADER as i64,
            unk_pointer01: 0,
            unk_pointer02: 0,
            geometry_pointer: GEOMETRY as i64,
            unk_pointer03: 0,
            material_names_pointer: MATERIAL_NAMES as i64,
            bone_names_pointer: BONE_NAMES as i64,
            unk_pointer04: 0,
            string_table_pointer: STRING_TABLE as i64,
        },
    );
    buf.put(
        BONE_HEADER,
        &BoneHeaderRe7 {
            bone_count: 2,
            padding: [0; 14],
            bone_table_pointer: BONE_RECORDS as i64,
            matrices_pointer: MATRICES as i64,
            unk_matrices_pointer01: 0,
            unk_matrices_pointer02: 0,
        },
    );
    buf.put(
        GEOMETRY,
        &GeometryHeaderRe7 {
            vertex_buffer_size: 0,
            unk_pointer: 0,
            padding: 0,
            face_buffer_size: 0,
            unk_pointer01: 0,
            padding01: 0,
            unk01: 0,
            face_buffer_offset: FACES as i64,
        },
    );

    // position, normal, tangent, one UV layer, weights: 40 bytes
    let base = GEOMETRY + std::mem::size_of::<GeometryHeaderRe7>();
    for v in 0..VERTEX_COUNT {
        let at = base + 40 * v;
        buf.put(at, &[v as f32, 0.0, 0.0]);
        buf.put(at + 12, &PackedVector([127, 0, 0, 0]));
        buf.put(at + 16, &PackedVector([0, 127, 0, 0]));
        buf.put(at + 20, &uv_bits());
        buf.put(at + 24, &packed_weights());
    }

    put_common(buf, 0, 2);
}

fn put_re2(buf: &mut Buf) {
    buf.put(
        0,
        &MeshHeaderRe2 {
            magic: 0x4853_454D,
            version: u32::from(MeshVersion::TAG_RE2),
            file_size: 0,
            unk: 0,
            string_count: STRINGS.len() as u16,
            padding: 0,
            model_pointers: [MODEL as i64, GARBAGE, 0],
            bone_header_pointer: BONE_HEADER as i64,
            unk_pointer01: 0,
            unk_pointer02: 0,
            unk_pointer03: 0,
            geometry_pointer: GEOMETRY as i64,
            unk_pointer05: 0,
            material_names_pointer: MATERIAL_NAMES as i64,
            bone_names_pointer: BONE_NAMES as i64,
            unk_pointer08: 0,
            string_table_pointer: STRING_TABLE as i64,
        },
    );
    buf.put(
        BONE_HEADER,
        &BoneHeaderRe2 {
            bone_count: 2,
            skinned_bone_count: 2,
            padding: 0,
            bone_table_pointer: BONE_RECORDS as i64,
            matrices_pointer: MATRICES as i64,
            unk_matrices_pointer01: 0,
            unk_matrices_pointer02: 0,
        },
    );
    // Skinned bone table: local 0 is skeleton bone 1 and vice versa.
    buf.put(BONE_HEADER + 48, &[1i16, 0]);

    let blocks = [
        (block::POSITION, 12, 0),
        (block::NORMAL_TANGENT, 8, 72),
        (block::UV0, 4, 120),
        (block::WEIGHTS, 16, 144),
    ];
    buf.put(
        GEOMETRY,
        &GeometryHeaderRe2 {
            vertex_blocks_offset: BLOCK_TABLE as i64,
            vertex_data_offset: VERTEX_DATA as i64,
            face_buffer_offset: FACES as i64,
            vertex_buffer_size: 0,
            face_buffer_size: 0,
            vertex_block_count: blocks.len() as i16,
            unk_block_count: blocks.len() as i16,
            unk01: 0,
            unk02: 0,
        },
    );
    for (i, &(id, element_size, offset)) in blocks.iter().enumerate() {
        buf.put(
            BLOCK_TABLE + 8 * i,
            &VertexBlock {
                id,
                element_size,
                offset,
            },
        );
    }

    for v in 0..VERTEX_COUNT {
        buf.put(VERTEX_DATA + 12 * v, &[v as f32, 0.0, 0.0]);
        buf.put(VERTEX_DATA + 72 + 8 * v, &PackedVector([127, 0, 0, 0]));
        buf.put(VERTEX_DATA + 72 + 8 * v + 4, &PackedVector([0, 127, 0, 0]));
        buf.put(VERTEX_DATA + 120 + 4 * v, &uv_bits());
        buf.put(VERTEX_DATA + 144 + 16 * v, &packed_weights());
    }

    put_common(buf, 1, 0);
}
