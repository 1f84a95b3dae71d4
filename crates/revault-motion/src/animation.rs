//! Decoded animation types.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::registry::RestBone;

/// Sparse key frames of one bone. Frame 0 always holds at least the rest pose.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnimatedBone {
    pub name: String,
    pub translations: BTreeMap<u32, Vec3>,
    pub rotations: BTreeMap<u32, Quat>,
}

impl AnimatedBone {
    /// A bone with only its rest pose at frame 0.
    pub fn from_rest(rest: &RestBone) -> Self {
        Self {
            name: rest.name.clone(),
            translations: BTreeMap::from([(0, rest.translation)]),
            rotations: BTreeMap::from([(0, rest.rotation)]),
        }
    }

    /// Last frame with a key on either channel.
    pub fn last_frame(&self) -> u32 {
        let t = self.translations.keys().next_back().copied().unwrap_or(0);
        let r = self.rotations.keys().next_back().copied().unwrap_or(0);
        t.max(r)
    }
}

/// An absolute (non-additive) skeletal animation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Animation {
    pub name: String,
    /// Frame count from the header; keys may stop earlier.
    pub frame_count: f32,
    pub bones: Vec<AnimatedBone>,
}

impl Animation {
    /// Multiply every translation key by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for bone in &mut self.bones {
            for t in bone.translations.values_mut() {
                *t *= factor;
            }
        }
    }

    pub fn bone(&self, name: &str) -> Option<&AnimatedBone> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn key_count(&self) -> usize {
        self.bones
            .iter()
            .map(|b| b.translations.len() + b.rotations.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest() -> RestBone {
        RestBone {
            name: "hips".to_string(),
            translation: Vec3::new(0.0, 1.0, 0.0),
            rotation: Quat::IDENTITY,
        }
    }

    #[test]
    fn test_from_rest() {
        let bone = AnimatedBone::from_rest(&rest());
        assert_eq!(bone.translations[&0], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(bone.rotations[&0], Quat::IDENTITY);
        assert_eq!(bone.last_frame(), 0);
    }

    #[test]
    fn test_scale_translations_only() {
        let mut bone = AnimatedBone::from_rest(&rest());
        bone.translations.insert(12, Vec3::new(2.0, 0.0, 0.0));
        let mut animation = Animation {
            name: "walk".to_string(),
            frame_count: 13.0,
            bones: vec![bone],
        };

        animation.scale(100.0);

        let bone = animation.bone("hips").unwrap();
        assert_eq!(bone.translations[&0], Vec3::new(0.0, 100.0, 0.0));
        assert_eq!(bone.translations[&12], Vec3::new(200.0, 0.0, 0.0));
        assert_eq!(bone.rotations[&0], Quat::IDENTITY);
        assert_eq!(bone.last_frame(), 12);
        assert_eq!(animation.key_count(), 3);
    }
}
