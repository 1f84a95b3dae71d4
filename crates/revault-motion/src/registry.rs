//! Rest poses keyed by bone hash.

use glam::{Quat, Vec3};
use hashbrown::HashMap;

/// A bone's rest transform as stored in a motion's base data.
#[derive(Debug, Clone, PartialEq)]
pub struct RestBone {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
}

/// Rest poses accumulated across the motions of one list.
///
/// Third-generation motions may omit their base data and resolve bones
/// against poses seen earlier in the same list. Iteration follows insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct BoneRegistry {
    bones: Vec<(u32, RestBone)>,
    index: HashMap<u32, usize>,
}

impl BoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rest pose for `hash`. A replaced bone keeps its
    /// position.
    pub fn insert(&mut self, hash: u32, bone: RestBone) {
        match self.index.get(&hash) {
            Some(&i) => self.bones[i].1 = bone,
            None => {
                self.index.insert(hash, self.bones.len());
                self.bones.push((hash, bone));
            }
        }
    }

    pub fn get(&self, hash: u32) -> Option<&RestBone> {
        self.position(hash).map(|i| &self.bones[i].1)
    }

    /// Insertion index of `hash`.
    pub fn position(&self, hash: u32) -> Option<usize> {
        self.index.get(&hash).copied()
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &RestBone)> {
        self.bones.iter().map(|(hash, bone)| (*hash, bone))
    }

    pub fn clear(&mut self) {
        self.bones.clear();
        self.index.clear();
    }
}
