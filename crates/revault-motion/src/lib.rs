//! Animation decoder for RE Engine `.mot` and `.motlist` files.
//!
//! A motion stores a rest pose keyed by bone hash and, per animated bone, up
//! to two key blocks (translations, then rotations). Each block selects a
//! frame index width and a compression scheme from its flag word; see
//! [`codec`] for the scheme tables.
//!
//! Three generations are recognized by the leading version word. The third
//! may omit its rest pose and resolve bones through a [`BoneRegistry`] shared
//! across one motion list.
//!
//! # Example
//!
//! ```no_run
//! use revault_motion::{decode_motion_list, BoneRegistry};
//!
//! let data = std::fs::read("cha0_walk.motlist.85")?;
//! let mut registry = BoneRegistry::new();
//! let list = decode_motion_list(&data, &mut registry)?;
//!
//! for motion in &list.motions {
//!     println!("{}: {} bones", motion.name, motion.bones.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod animation;
mod error;
mod list;
mod registry;

pub mod codec;
pub mod frames;
pub mod header;

#[cfg(test)]
mod test_util;

use glam::{Quat, Vec3};
use revault_common::{pointer, BinaryReader};

use codec::{Channel, QuatCodec, Unpack, VectorCodec};
use frames::FrameWidth;
use header::{
    presence, BoneChannelsRe2, BoneChannelsRe3, BoneChannelsRe7, ChannelRecord, KeyData, KeyDataRe3,
    KeyDataRe7, MotionHeader, RestBoneRecord,
};

pub use animation::{AnimatedBone, Animation};
pub use error::{Error, Result};
pub use list::{decode_motion_list, MotionList, MotionListVersion};
pub use registry::{BoneRegistry, RestBone};

/// Motion generation, from the leading version word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionVersion {
    Re7,
    Re2,
    /// 32-bit key pointers, 16 unpack constants, shared rest poses
    Re3,
}

impl MotionVersion {
    pub const TAG_RE7: u32 = 0x2B;
    pub const TAG_RE2: u32 = 0x41;
    pub const TAG_RE3: u32 = 0x4E;

    pub fn from_tag(tag: u32) -> Result<Self> {
        match tag {
            Self::TAG_RE7 => Ok(Self::Re7),
            Self::TAG_RE2 => Ok(Self::Re2),
            Self::TAG_RE3 => Ok(Self::Re3),
            other => Err(Error::InvalidVersion(other)),
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            Self::Re7 => Self::TAG_RE7,
            Self::Re2 => Self::TAG_RE2,
            Self::Re3 => Self::TAG_RE3,
        }
    }

    /// Size of one key block.
    pub fn key_size(self) -> usize {
        match self {
            Self::Re7 | Self::Re2 => std::mem::size_of::<KeyDataRe7>(),
            Self::Re3 => std::mem::size_of::<KeyDataRe3>(),
        }
    }

    /// Number of unpack constants per key block.
    pub fn unpack_count(self) -> usize {
        match self {
            Self::Re7 | Self::Re2 => 8,
            Self::Re3 => 16,
        }
    }
}

/// Decode one motion.
///
/// Third-generation motions read and extend `registry`; the other
/// generations use only their own rest pose and leave it untouched.
pub fn decode_motion(buffer: &[u8], registry: &mut BoneRegistry) -> Result<Animation> {
    let mut reader = BinaryReader::new(buffer);
    let version = MotionVersion::from_tag(reader.read_u32_at(0)?)?;
    let header: MotionHeader = reader.read_struct_at(0)?;

    let name_pointer = header.name_pointer;
    let name = if name_pointer > 0 {
        reader.read_utf16_cstring_at(pointer(name_pointer)?)?
    } else {
        String::new()
    };

    tracing::debug!("decoding {:?} motion {:?} ({} bytes)", version, name, buffer.len());

    let channels = read_channel_records(&mut reader, version, &header)?;
    let bones = match version {
        MotionVersion::Re7 | MotionVersion::Re2 => decode_local(&mut reader, version, &header, &channels)?,
        MotionVersion::Re3 => decode_shared(&mut reader, &header, &channels, registry)?,
    };

    Ok(Animation {
        name,
        frame_count: header.frame_count,
        bones,
    })
}

fn read_channel_records(
    reader: &mut BinaryReader,
    version: MotionVersion,
    header: &MotionHeader,
) -> Result<Vec<ChannelRecord>> {
    let at = header.bone_data_pointer;
    if at <= 0 {
        return Ok(Vec::new());
    }

    let at = pointer(at)?;
    let count = header.bone_data_count as usize;
    let records = match version {
        MotionVersion::Re7 => reader
            .read_array_at::<BoneChannelsRe7>(at, count)?
            .into_iter()
            .map(ChannelRecord::from)
            .collect(),
        MotionVersion::Re2 => reader
            .read_array_at::<BoneChannelsRe2>(at, count)?
            .into_iter()
            .map(ChannelRecord::from)
            .collect(),
        MotionVersion::Re3 => reader
            .read_array_at::<BoneChannelsRe3>(at, count)?
            .into_iter()
            .map(ChannelRecord::from)
            .collect(),
    };
    Ok(records)
}

/// Read the rest pose: an `i64` record offset and `i32` count at `at`.
fn read_rest_pose(reader: &mut BinaryReader, at: i64) -> Result<Vec<(u32, RestBone)>> {
    reader.seek(pointer(at)?);
    let offset = reader.read_i64()?;
    let count = reader.read_i32()?.max(0) as usize;

    let records: Vec<RestBoneRecord> = reader.read_array_at(pointer(offset)?, count)?;
    records
        .into_iter()
        .map(|record| {
            let [x, y, z, _] = record.translation;
            let bone = RestBone {
                name: reader.read_utf16_cstring_at(pointer(record.name_pointer)?)?,
                translation: Vec3::new(x, y, z),
                rotation: Quat::from_array(record.rotation),
            };
            Ok((record.hash, bone))
        })
        .collect()
}

/// First and second generation: one output bone per channel record, resolved
/// against the file's own rest pose.
fn decode_local(
    reader: &mut BinaryReader,
    version: MotionVersion,
    header: &MotionHeader,
    channels: &[ChannelRecord],
) -> Result<Vec<AnimatedBone>> {
    let base = header.base_data_pointer;
    if base <= 0 {
        return Ok(Vec::new());
    }

    let mut rest = BoneRegistry::new();
    for (hash, bone) in read_rest_pose(reader, base)? {
        rest.insert(hash, bone);
    }

    channels
        .iter()
        .map(|record| {
            let pose = rest.get(record.hash).ok_or(Error::MissingBone(record.hash))?;
            let mut bone = AnimatedBone::from_rest(pose);
            decode_channels(reader, version, record, &mut bone)?;
            Ok(bone)
        })
        .collect()
}

/// Third generation: every registry bone is output, animated or not.
fn decode_shared(
    reader: &mut BinaryReader,
    header: &MotionHeader,
    channels: &[ChannelRecord],
    registry: &mut BoneRegistry,
) -> Result<Vec<AnimatedBone>> {
    let base = header.base_data_pointer;
    if registry.is_empty() && base > 0 {
        for (hash, bone) in read_rest_pose(reader, base)? {
            registry.insert(hash, bone);
        }
    }

    let mut bones: Vec<AnimatedBone> = registry.iter().map(|(_, rest)| AnimatedBone::from_rest(rest)).collect();

    for record in channels {
        let index = registry
            .position(record.hash)
            .ok_or(Error::MissingBone(record.hash))?;
        decode_channels(reader, MotionVersion::Re3, record, &mut bones[index])?;
    }
    Ok(bones)
}

fn read_key(reader: &mut BinaryReader, version: MotionVersion, at: usize) -> Result<KeyData> {
    let key = match version {
        MotionVersion::Re7 | MotionVersion::Re2 => reader.read_struct_at::<KeyDataRe7>(at)?.into(),
        MotionVersion::Re3 => reader.read_struct_at::<KeyDataRe3>(at)?.into(),
    };
    Ok(key)
}

/// Decode a bone's key blocks, which follow one another from `record.keys`.
fn decode_channels(
    reader: &mut BinaryReader,
    version: MotionVersion,
    record: &ChannelRecord,
    bone: &mut AnimatedBone,
) -> Result<()> {
    if !record.has(presence::TRANSLATIONS) && !record.has(presence::ROTATIONS) {
        return Ok(());
    }

    let mut at = pointer(record.keys)?;

    if record.has(presence::TRANSLATIONS) {
        let key = read_key(reader, version, at)?;
        let code = key.scheme();
        let codec = VectorCodec::from_code(version, code).ok_or(Error::UnknownCompression {
            channel: Channel::Translation,
            code,
        })?;

        let frames = frames::read_frames(reader, key.frames, key.key_count, FrameWidth::from_flags(key.flags))?;
        let unpack = Unpack::read(reader, key.unpack, version.unpack_count())?;
        let values = codec.decode(reader, pointer(key.data)?, frames.len(), unpack.as_ref())?;

        bone.translations.extend(frames.into_iter().zip(values));
        at += version.key_size();
    }

    if record.has(presence::ROTATIONS) {
        let key = read_key(reader, version, at)?;
        let code = key.scheme();
        let codec = QuatCodec::from_code(version, code).ok_or(Error::UnknownCompression {
            channel: Channel::Rotation,
            code,
        })?;

        let frames = frames::read_frames(reader, key.frames, key.key_count, FrameWidth::from_flags(key.flags))?;
        let unpack = Unpack::read(reader, key.unpack, version.unpack_count())?;
        let values = codec.decode(reader, pointer(key.data)?, frames.len(), unpack.as_ref())?;

        bone.rotations.extend(frames.into_iter().zip(values));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{self, build, KEYS, ROOT_HASH, SPINE_HASH};

    fn assert_quat_eq(a: Quat, b: Quat) {
        assert!(a.abs_diff_eq(b, 1e-6), "{a:?} != {b:?}");
    }

    fn check(animation: &Animation) {
        assert_eq!(animation.name, "walk");
        assert_eq!(animation.frame_count, 10.0);

        let names: Vec<&str> = animation.bones.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["root", "spine"]);

        let root = &animation.bones[0];
        // The channel's own frame 0 replaces the rest translation.
        let frames: Vec<u32> = root.translations.keys().copied().collect();
        assert_eq!(frames, [0, 5, 9]);
        assert_eq!(root.translations[&0], Vec3::new(11.0, 20.0, 30.0));
        assert_eq!(root.translations[&5], Vec3::new(10.0, 21.0, 30.0));
        assert_eq!(root.translations[&9], Vec3::new(10.0, 20.0, 31.0));

        let frames: Vec<u32> = root.rotations.keys().copied().collect();
        assert_eq!(frames, [0, 2, 4]);
        assert_eq!(root.rotations[&0], Quat::from_array(test_util::ROOT_ROTATION));
        assert_quat_eq(root.rotations[&2], Quat::IDENTITY);
        assert_quat_eq(root.rotations[&4], Quat::from_xyzw(0.6, 0.0, 0.0, 0.8));

        // Rest pose only, reproduced exactly.
        let spine = &animation.bones[1];
        assert_eq!(spine.translations.len(), 1);
        assert_eq!(spine.rotations.len(), 1);
        assert_eq!(spine.translations[&0], Vec3::from(test_util::SPINE_TRANSLATION));
        assert_eq!(spine.rotations[&0], Quat::from_array(test_util::SPINE_ROTATION));
    }

    #[test]
    fn test_decode_all_generations() {
        for version in [MotionVersion::Re7, MotionVersion::Re2, MotionVersion::Re3] {
            let mut registry = BoneRegistry::new();
            let animation = decode_motion(&build(version), &mut registry).unwrap();
            check(&animation);
        }
    }

    #[test]
    fn test_legacy_leaves_registry_untouched() {
        let mut registry = BoneRegistry::new();
        decode_motion(&build(MotionVersion::Re2), &mut registry).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_re3_fills_registry() {
        let mut registry = BoneRegistry::new();
        decode_motion(&build(MotionVersion::Re3), &mut registry).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(ROOT_HASH).unwrap().name, "root");
        assert_eq!(registry.get(SPINE_HASH).unwrap().name, "spine");
    }

    #[test]
    fn test_re3_prefers_registry() {
        let mut registry = BoneRegistry::new();
        registry.insert(
            SPINE_HASH,
            RestBone {
                name: "shared_spine".to_string(),
                translation: Vec3::ONE,
                rotation: Quat::IDENTITY,
            },
        );
        registry.insert(
            ROOT_HASH,
            RestBone {
                name: "shared_root".to_string(),
                translation: Vec3::ZERO,
                rotation: Quat::IDENTITY,
            },
        );

        let animation = decode_motion(&build(MotionVersion::Re3), &mut registry).unwrap();

        // Registry order, and the file's own rest pose is ignored.
        let names: Vec<&str> = animation.bones.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["shared_spine", "shared_root"]);
        assert_eq!(animation.bones[0].translations[&0], Vec3::ONE);
        assert_eq!(animation.bones[1].translations.len(), 3);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_re3_without_rest_pose() {
        let mut first = BoneRegistry::new();
        decode_motion(&build(MotionVersion::Re3), &mut first).unwrap();

        let mut data = build(MotionVersion::Re3);
        data[16..24].fill(0);

        let animation = decode_motion(&data, &mut first).unwrap();
        check(&animation);

        let mut empty = BoneRegistry::new();
        assert!(matches!(
            decode_motion(&data, &mut empty),
            Err(Error::MissingBone(ROOT_HASH))
        ));
    }

    #[test]
    fn test_missing_bone() {
        let mut registry = BoneRegistry::new();
        registry.insert(
            SPINE_HASH,
            RestBone {
                name: "spine".to_string(),
                translation: Vec3::ZERO,
                rotation: Quat::IDENTITY,
            },
        );

        assert!(matches!(
            decode_motion(&build(MotionVersion::Re3), &mut registry),
            Err(Error::MissingBone(ROOT_HASH))
        ));
    }

    #[test]
    fn test_legacy_without_rest_pose() {
        let mut data = build(MotionVersion::Re7);
        data[16..24].fill(0);

        let animation = decode_motion(&data, &mut BoneRegistry::new()).unwrap();
        assert!(animation.bones.is_empty());
        assert_eq!(animation.name, "walk");
    }

    #[test]
    fn test_invalid_version() {
        let mut data = build(MotionVersion::Re2);
        data[0] = 0x42;

        assert!(matches!(
            decode_motion(&data, &mut BoneRegistry::new()),
            Err(Error::InvalidVersion(0x42))
        ));
    }

    #[test]
    fn test_unknown_compression() {
        let mut data = build(MotionVersion::Re2);
        data[KEYS..KEYS + 4].copy_from_slice(&(0x20_0000u32 | 0x9_0000).to_le_bytes());

        assert!(matches!(
            decode_motion(&data, &mut BoneRegistry::new()),
            Err(Error::UnknownCompression {
                channel: Channel::Translation,
                code: 0x9_0000
            })
        ));
    }

    #[test]
    fn test_missing_unpack_data() {
        let mut data = build(MotionVersion::Re7);
        // Translation key block unpack pointer
        data[KEYS + 32..KEYS + 40].fill(0);

        assert!(matches!(
            decode_motion(&data, &mut BoneRegistry::new()),
            Err(Error::MissingUnpackData(Channel::Translation))
        ));
    }

    #[test]
    fn test_truncated() {
        let mut data = build(MotionVersion::Re2);
        data.truncate(test_util::DATA + 4);

        assert!(matches!(
            decode_motion(&data, &mut BoneRegistry::new()),
            Err(Error::Common(_))
        ));
    }
}
