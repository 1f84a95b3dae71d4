//! Asset classification and decode dispatch.

use revault_mdf::{decode_material_defs, MaterialDefs};
use revault_mesh::{decode_mesh, MeshFile};
use revault_motion::{decode_motion, decode_motion_list, Animation, BoneRegistry, MotionList};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// What an entry holds, judged from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AssetKind {
    Texture,
    Mesh,
    MotionList,
    Motion,
    Material,
    Unknown,
}

impl AssetKind {
    /// Classify a path by the type marker between its dots.
    ///
    /// `.motlist.` is checked before `.mot.`, and the first match wins.
    pub fn classify(name: &str) -> Self {
        if name.contains(".tex.") {
            Self::Texture
        } else if name.contains(".mesh.") {
            Self::Mesh
        } else if name.contains(".motlist.") {
            Self::MotionList
        } else if name.contains(".mot.") {
            Self::Motion
        } else if name.contains(".mdf2.") {
            Self::Material
        } else {
            Self::Unknown
        }
    }

    /// Whether [`decode`] accepts this kind.
    pub fn is_decodable(self) -> bool {
        matches!(
            self,
            Self::Mesh | Self::MotionList | Self::Motion | Self::Material
        )
    }
}

/// A decoded asset.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Asset {
    Mesh(MeshFile),
    Motion(Animation),
    MotionList(MotionList),
    Material(MaterialDefs),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Mesh(_) => AssetKind::Mesh,
            Self::Motion(_) => AssetKind::Motion,
            Self::MotionList(_) => AssetKind::MotionList,
            Self::Material(_) => AssetKind::Material,
        }
    }

    /// Multiply positions and translations by `factor`. Materials are
    /// unaffected.
    pub fn scale(&mut self, factor: f32) {
        match self {
            Self::Mesh(file) => file.scale(factor),
            Self::Motion(animation) => animation.scale(factor),
            Self::MotionList(list) => list.scale(factor),
            Self::Material(_) => {}
        }
    }
}

/// Decode `bytes` as an asset of the given kind.
///
/// Motions and motion lists resolve bones through `registry`; pass a fresh
/// one per independent file.
pub fn decode(kind: AssetKind, bytes: &[u8], registry: &mut BoneRegistry) -> Result<Asset> {
    tracing::debug!("decoding {:?} ({} bytes)", kind, bytes.len());

    let asset = match kind {
        AssetKind::Mesh => Asset::Mesh(decode_mesh(bytes)?),
        AssetKind::Motion => Asset::Motion(decode_motion(bytes, registry)?),
        AssetKind::MotionList => Asset::MotionList(decode_motion_list(bytes, registry)?),
        AssetKind::Material => Asset::Material(decode_material_defs(bytes)?),
        AssetKind::Texture | AssetKind::Unknown => return Err(Error::UnsupportedAsset(kind)),
    };
    Ok(asset)
}
