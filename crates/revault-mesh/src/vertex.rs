//! Vertex attribute decoding for both storage layouts.

use glam::{Vec2, Vec3};
use half::f16;
use hashbrown::HashMap;
use revault_common::model::MAX_WEIGHTS;
use revault_common::{BinaryReader, Vertex, Weight};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// A unit vector packed as four signed bytes; the fourth is unused.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct PackedVector(pub [i8; 4]);

impl PackedVector {
    pub fn unpack(self) -> Vec3 {
        let [x, y, z, _] = self.0;
        Vec3::new(x as f32, y as f32, z as f32) / 127.0
    }
}

/// Eight local bone indices followed by eight weight bytes.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct PackedWeights {
    pub indices: [u8; MAX_WEIGHTS],
    pub weights: [u8; MAX_WEIGHTS],
}

impl PackedWeights {
    /// Resolve local indices through `remap` and normalize the influences.
    ///
    /// Stops at the first zero weight.
    pub fn resolve(&self, remap: &[i16]) -> Result<Vec<Weight>> {
        let mut result = Vec::with_capacity(MAX_WEIGHTS);
        for (&local, &weight) in self.indices.iter().zip(&self.weights) {
            if weight == 0 {
                break;
            }

            let bone = remap
                .get(local as usize)
                .and_then(|&global| usize::try_from(global).ok())
                .ok_or_else(|| Error::missing("bone weight", local))?;

            result.push(Weight {
                bone,
                influence: weight as f32 / 255.0,
            });
        }
        Ok(result)
    }
}

fn read_vec3(reader: &mut BinaryReader) -> Result<Vec3> {
    let [x, y, z]: [f32; 3] = reader.read_struct()?;
    Ok(Vec3::new(x, y, z))
}

fn read_half2(reader: &mut BinaryReader) -> Result<Vec2> {
    let u = f16::from_bits(reader.read_u16()?);
    let v = f16::from_bits(reader.read_u16()?);
    Ok(Vec2::new(u.to_f32(), v.to_f32()))
}

/// Attribute block tags.
pub mod block {
    pub const POSITION: i16 = 0;
    pub const NORMAL_TANGENT: i16 = 1;
    pub const UV0: i16 = 2;
    pub const UV1: i16 = 3;
    pub const WEIGHTS: i16 = 4;
}

/// Per-LOD parameters that affect vertex reads.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VertexContext<'a> {
    pub uv_count: u8,
    /// LOD-local bone remap, interleaved files only
    pub lod_bones: &'a [i16],
}

/// How a file stores its vertices.
#[derive(Debug, Clone)]
pub(crate) enum VertexStorage {
    /// One buffer with every attribute of a vertex side by side.
    Interleaved {
        base: usize,
        /// The file has a skeleton, so each vertex carries weights
        skinned: bool,
    },
    /// One buffer per attribute, located through a block table.
    Blocks {
        blocks: HashMap<i16, usize>,
        skinned_bones: Vec<i16>,
    },
}

impl VertexStorage {
    /// Stride of an interleaved vertex, inferred from the UV layer count and
    /// whether weights are present.
    pub fn interleaved_stride(uv_count: u8, skinned: bool) -> usize {
        20 + 4 * uv_count as usize + if skinned { 16 } else { 0 }
    }

    /// Whether LOD-local bone remap tables are in use.
    pub fn uses_lod_bones(&self) -> bool {
        matches!(self, Self::Interleaved { .. })
    }

    /// Read `count` vertices starting at vertex `start`.
    pub fn read(
        &self,
        reader: &mut BinaryReader,
        ctx: VertexContext<'_>,
        start: usize,
        count: usize,
    ) -> Result<Vec<Vertex>> {
        match self {
            Self::Interleaved { base, skinned } => {
                read_interleaved(reader, ctx, *base, *skinned, start, count)
            }
            Self::Blocks {
                blocks,
                skinned_bones,
            } => read_blocks(reader, blocks, skinned_bones, start, count),
        }
    }
}

fn read_interleaved(
    reader: &mut BinaryReader,
    ctx: VertexContext<'_>,
    base: usize,
    skinned: bool,
    start: usize,
    count: usize,
) -> Result<Vec<Vertex>> {
    let stride = VertexStorage::interleaved_stride(ctx.uv_count, skinned);
    let weights_at = 20 + 4 * ctx.uv_count as usize;
    let has_weights = skinned && !ctx.lod_bones.is_empty();

    let first = base.saturating_add(stride.saturating_mul(start));
    reader.ensure_span(first, stride, count)?;

    let mut vertices = Vec::with_capacity(count);
    for v in 0..count {
        let offset = first + stride * v;
        reader.seek(offset);

        let mut vertex = Vertex {
            position: read_vec3(reader)?,
            normal: reader.read_struct::<PackedVector>()?.unpack(),
            tangent: reader.read_struct::<PackedVector>()?.unpack(),
            ..Default::default()
        };

        // Only the first UV layer is decoded.
        if ctx.uv_count > 0 {
            vertex.uvs.push(read_half2(reader)?);
        }

        if has_weights {
            let packed: PackedWeights = reader.read_struct_at(offset + weights_at)?;
            vertex.weights = packed.resolve(ctx.lod_bones)?;
            vertex.normalize_weights();
        }

        vertices.push(vertex);
    }
    Ok(vertices)
}

fn read_blocks(
    reader: &mut BinaryReader,
    blocks: &HashMap<i16, usize>,
    skinned_bones: &[i16],
    start: usize,
    count: usize,
) -> Result<Vec<Vertex>> {
    let spans = [
        (block::POSITION, 12),
        (block::NORMAL_TANGENT, 8),
        (block::UV0, 4),
        (block::UV1, 4),
        (block::WEIGHTS, 16),
    ];
    let mut present = false;
    for (tag, size) in spans {
        if let Some(&base) = blocks.get(&tag) {
            reader.ensure_span(block_start(base, size, start), size, count)?;
            present = true;
        }
    }
    if !present {
        // Nothing bounds the count, so cap it by the file size.
        reader.ensure_span(0, 1, count)?;
    }

    let mut vertices = vec![Vertex::default(); count];

    if let Some(&base) = blocks.get(&block::POSITION) {
        reader.seek(block_start(base, 12, start));
        for vertex in &mut vertices {
            vertex.position = read_vec3(reader)?;
        }
    }

    if let Some(&base) = blocks.get(&block::NORMAL_TANGENT) {
        reader.seek(block_start(base, 8, start));
        for vertex in &mut vertices {
            vertex.normal = reader.read_struct::<PackedVector>()?.unpack();
            vertex.tangent = reader.read_struct::<PackedVector>()?.unpack();
        }
    }

    for tag in [block::UV0, block::UV1] {
        if let Some(&base) = blocks.get(&tag) {
            reader.seek(block_start(base, 4, start));
            for vertex in &mut vertices {
                vertex.uvs.push(read_half2(reader)?);
            }
        }
    }

    if let Some(&base) = blocks.get(&block::WEIGHTS) {
        reader.seek(block_start(base, 16, start));
        for vertex in &mut vertices {
            let packed: PackedWeights = reader.read_struct()?;
            vertex.weights = packed.resolve(skinned_bones)?;
            vertex.normalize_weights();
        }
    }

    Ok(vertices)
}

fn block_start(base: usize, size: usize, start: usize) -> usize {
    base.saturating_add(size.saturating_mul(start))
}
