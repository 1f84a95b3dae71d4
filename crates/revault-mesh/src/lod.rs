//! Model slot and LOD walking shared by both generations.

use std::sync::Arc;

use revault_common::{pointer, BinaryReader, Bone, Face, Material, Mesh, Model};

use crate::header::{FileLayout, LodHeader, LodMesh, ModelHeader, SubMeshHeader};
use crate::vertex::{VertexContext, VertexStorage};
use crate::{Error, Result};

/// Everything the LOD walk needs from the file-level headers.
pub(crate) struct Geometry<'a> {
    pub layout: &'a FileLayout,
    pub strings: &'a [String],
    pub skeleton: &'a Arc<[Bone]>,
    pub storage: &'a VertexStorage,
    pub face_buffer: i64,
}

/// Decode the first non-null model slot into one [`Model`] per LOD.
///
/// Later slots are not decoded.
pub(crate) fn read_models(reader: &mut BinaryReader, geometry: &Geometry<'_>) -> Result<Vec<Vec<Model>>> {
    let slots = geometry.layout.model_pointers;
    let Some(first) = slots.iter().position(|&p| p != 0) else {
        return Ok(Vec::new());
    };

    let skipped = slots[first + 1..].iter().filter(|&&p| p != 0).count();
    if skipped > 0 {
        tracing::warn!("mesh has {} additional model slot(s), only the first is decoded", skipped);
    }

    let lods = read_slot(reader, geometry, slots[first])?;
    Ok(vec![lods])
}

fn read_slot(reader: &mut BinaryReader, geometry: &Geometry<'_>, slot: i64) -> Result<Vec<Model>> {
    let slot = pointer(slot)?;
    let header: ModelHeader = reader.read_struct_at(slot)?;

    let material_indices: Vec<i16> = reader.read_array_at(
        pointer(geometry.layout.material_names)?,
        header.material_count as usize,
    )?;

    let lod_table = reader.read_i64_at(slot + ModelHeader::LOD_TABLE_OFFSET)?;
    let lod_pointers: Vec<i64> = reader.read_array_at(pointer(lod_table)?, header.lod_count as usize)?;

    lod_pointers
        .into_iter()
        .map(|lod| read_lod(reader, geometry, &header, &material_indices, pointer(lod)?))
        .collect()
}

fn read_lod(
    reader: &mut BinaryReader,
    geometry: &Geometry<'_>,
    model: &ModelHeader,
    material_indices: &[i16],
    lod: usize,
) -> Result<Model> {
    let header: LodHeader = reader.read_struct_at(lod)?;

    let lod_bones: Vec<i16> = if geometry.storage.uses_lod_bones() {
        reader.read_array_at(lod + std::mem::size_of::<LodHeader>(), header.bone_count as usize)?
    } else {
        Vec::new()
    };

    let ctx = VertexContext {
        uv_count: model.uv_count,
        lod_bones: &lod_bones,
    };

    let mesh_pointers: Vec<i64> =
        reader.read_array_at(pointer(header.meshes_pointer)?, header.mesh_count as usize)?;

    let mut materials: Vec<Material> = Vec::with_capacity(model.material_count as usize);
    let mut meshes = Vec::new();

    for mesh_pointer in mesh_pointers {
        let mesh_pointer = pointer(mesh_pointer)?;
        let group: LodMesh = reader.read_struct_at(mesh_pointer)?;
        let submeshes: Vec<SubMeshHeader> = reader.read_array_at(
            mesh_pointer + std::mem::size_of::<LodMesh>(),
            group.submesh_count as usize,
        )?;

        let mut consumed = 0i64;
        for (i, sub) in submeshes.iter().enumerate() {
            let name = material_name(geometry.strings, material_indices, sub.material_index)?;
            let material = match materials.iter().position(|m| m.name == name) {
                Some(index) => index,
                None => {
                    materials.push(Material::new(name));
                    materials.len() - 1
                }
            };

            // Counts are implied by the next submesh's start, or by the
            // group total for the last one.
            let vertex_count = match submeshes.get(i + 1) {
                Some(next) => i64::from(next.vertex_index) - i64::from(sub.vertex_index),
                None => i64::from(group.vertex_count) - consumed,
            };
            consumed += vertex_count;

            let start = count(sub.vertex_index)?;
            let vertices = geometry.storage.read(reader, ctx, start, count(vertex_count)?)?;
            let faces = read_faces(reader, geometry.face_buffer, header.flags, sub)?;

            meshes.push(Mesh {
                vertices,
                faces,
                material,
            });
        }
    }

    Ok(Model {
        meshes,
        materials,
        skeleton: Arc::clone(geometry.skeleton),
    })
}

fn material_name<'s>(strings: &'s [String], indices: &[i16], material: i32) -> Result<&'s str> {
    let string_index = usize::try_from(material)
        .ok()
        .and_then(|i| indices.get(i))
        .ok_or_else(|| Error::missing("material", material))?;

    usize::try_from(*string_index)
        .ok()
        .and_then(|i| strings.get(i))
        .map(String::as_str)
        .ok_or_else(|| Error::missing("material name", *string_index))
}

/// Read a submesh's triangles, dropping degenerate ones.
///
/// An unknown index width yields no triangles; the vertices still decode.
fn read_faces(reader: &mut BinaryReader, face_buffer: i64, flags: u8, sub: &SubMeshHeader) -> Result<Vec<Face>> {
    let width = match flags {
        0 => 2,
        1 => 4,
        other => {
            tracing::warn!("unknown face index width {}, skipping faces", other);
            return Ok(Vec::new());
        }
    };

    let triangles = count(sub.face_count)? / 3;
    let first = pointer(face_buffer)?.saturating_add(width * count(sub.face_index)?);
    reader.ensure_span(first, 3 * width, triangles)?;

    let mut faces = Vec::with_capacity(triangles);
    for _ in 0..triangles {
        let mut face = [0u32; 3];
        for index in &mut face {
            *index = match width {
                2 => u32::from(reader.read_u16()?),
                _ => reader.read_u32()?,
            };
        }

        let face = Face(face);
        if !face.is_degenerate() {
            faces.push(face);
        }
    }
    Ok(faces)
}

/// Convert a stored count or index, rejecting negatives.
fn count(value: impl Into<i64>) -> Result<usize> {
    let value = value.into();
    usize::try_from(value).map_err(|_| revault_common::Error::InvalidPointer(value).into())
}
