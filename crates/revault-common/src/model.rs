//! Decoded asset types shared by the mesh and material decoders.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::{Quat, Vec2, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Texture slots tried, in order, when picking a material's diffuse map.
pub const DIFFUSE_SLOTS: [&str; 2] = ["BaseMetalMap", "BaseMap"];

/// Texture slots tried, in order, when picking a material's normal map.
pub const NORMAL_SLOTS: [&str; 2] = ["NormalRoughnessMap", "NormalMap"];

/// A skeleton bone in its local (parent-relative) rest transform.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone, `-1` for a root.
    pub parent: i16,
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Bone {
    /// Whether this bone has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent < 0
    }
}

/// A single bone influence on a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Weight {
    /// Index into the skeleton.
    pub bone: usize,
    pub influence: f32,
}

/// Maximum number of weights a vertex can carry.
pub const MAX_WEIGHTS: usize = 8;

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub uvs: Vec<Vec2>,
    pub weights: Vec<Weight>,
}

impl Vertex {
    /// Rescale influences so they sum to 1.0.
    pub fn normalize_weights(&mut self) {
        let total: f32 = self.weights.iter().map(|w| w.influence).sum();
        if total > 0.0 {
            for weight in &mut self.weights {
                weight.influence /= total;
            }
        }
    }
}

/// A triangle of vertex indices, local to its mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Face(pub [u32; 3]);

impl Face {
    /// A face is degenerate if any two of its indices are equal.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.0;
        a == b || b == c || a == c
    }
}

/// A sub-mesh: one material's worth of geometry.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    /// Index into the owning model's material list.
    pub material: usize,
}

/// A material: texture slots and numeric settings keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Material {
    pub name: String,
    /// Slot name to texture path.
    pub textures: BTreeMap<String, String>,
    /// Setting name to its float values.
    pub settings: BTreeMap<String, Vec<f32>>,
    /// Slot chosen as the diffuse map, once textures are known.
    pub diffuse: Option<String>,
    /// Slot chosen as the normal map, once textures are known.
    pub normal: Option<String>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Copy textures and settings from a decoded definition and pick the
    /// diffuse and normal slots.
    pub fn merge_from(&mut self, definition: &Material) {
        self.textures = definition.textures.clone();
        self.settings = definition.settings.clone();
        self.diffuse = self.first_slot(&DIFFUSE_SLOTS);
        self.normal = self.first_slot(&NORMAL_SLOTS);
    }

    /// Path of the chosen diffuse texture.
    pub fn diffuse_texture(&self) -> Option<&str> {
        self.diffuse
            .as_deref()
            .and_then(|slot| self.textures.get(slot))
            .map(String::as_str)
    }

    /// Path of the chosen normal texture.
    pub fn normal_texture(&self) -> Option<&str> {
        self.normal
            .as_deref()
            .and_then(|slot| self.textures.get(slot))
            .map(String::as_str)
    }

    fn first_slot(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .find(|slot| self.textures.contains_key(**slot))
            .map(|slot| slot.to_string())
    }
}

/// One LOD of a model.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Model {
    pub meshes: Vec<Mesh>,
    /// Unique by name, in first-seen order.
    pub materials: Vec<Material>,
    /// Shared by every LOD decoded from the same file.
    pub skeleton: Arc<[Bone]>,
}

impl Model {
    /// Number of vertices across all meshes.
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    /// Number of faces across all meshes.
    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(|m| m.faces.len()).sum()
    }

    /// Multiply every vertex position by `factor`.
    ///
    /// The skeleton is shared between LODs, so bone translations are not
    /// touched here; see [`scale_skeleton`].
    pub fn scale(&mut self, factor: f32) {
        for vertex in self.meshes.iter_mut().flat_map(|m| m.vertices.iter_mut()) {
            vertex.position *= factor;
        }
    }

    /// Merge decoded material definitions onto this model's materials by name.
    ///
    /// Returns the number of materials that found a definition.
    pub fn apply_materials<'m, F>(&mut self, mut lookup: F) -> usize
    where
        F: FnMut(&str) -> Option<&'m Material>,
    {
        let mut applied = 0;
        for material in &mut self.materials {
            if let Some(definition) = lookup(&material.name) {
                material.merge_from(definition);
                applied += 1;
            }
        }
        applied
    }
}

/// Return a copy of `skeleton` with every translation multiplied by `factor`.
pub fn scale_skeleton(skeleton: &[Bone], factor: f32) -> Arc<[Bone]> {
    skeleton
        .iter()
        .map(|bone| Bone {
            translation: bone.translation * factor,
            ..bone.clone()
        })
        .collect()
}
