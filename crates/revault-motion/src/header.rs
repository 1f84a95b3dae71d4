//! On-disk motion structures.
//!
//! Channel records and key blocks differ in width between generations. Both
//! are normalized into [`ChannelRecord`] and [`KeyData`] before decoding.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// `"mot "`, stored at offset 4 of every motion.
pub const MOTION_MAGIC: u32 = 0x2074_6F6D;

/// Motion header, shared by every generation.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct MotionHeader {
    pub version: u32,
    pub magic: u32,
    pub padding: i64,
    pub base_data_pointer: i64,
    pub bone_data_pointer: i64,
    pub unk_pointers: [i64; 6],
    pub name_pointer: i64,
    pub frame_count: f32,
    pub unk_floats: [f32; 3],
    pub bone_count: u16,
    pub bone_data_count: u16,
    pub unk_pointer2_count: u8,
    pub unk_pointer3_count: u8,
    pub unk: u16,
    pub unk_pointer_count: u16,
    pub unk1: u16,
}

/// One bone of the rest pose.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct RestBoneRecord {
    pub name_pointer: i64,
    pub unk_pointers: [i64; 3],
    pub translation: [f32; 4],
    pub rotation: [f32; 4],
    pub index: u32,
    pub hash: u32,
    pub padding: i64,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct BoneChannelsRe7 {
    pub index: u16,
    pub flags: u16,
    pub hash: u32,
    pub keys_pointer: i64,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct BoneChannelsRe2 {
    pub index: u16,
    pub flags: u16,
    pub hash: u32,
    pub unk: f32,
    pub padding: i32,
    pub keys_pointer: i64,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct BoneChannelsRe3 {
    pub index: u16,
    pub flags: u16,
    pub hash: u32,
    pub keys_pointer: i32,
}

/// Key block of the first two generations.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct KeyDataRe7 {
    pub flags: u32,
    pub key_count: i32,
    pub unk: i32,
    pub max_frame: f32,
    pub frames_pointer: i64,
    pub data_pointer: i64,
    pub unpack_pointer: i64,
}

/// Key block of the third generation, with 32-bit pointers.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct KeyDataRe3 {
    pub flags: u32,
    pub key_count: i32,
    pub frames_pointer: i32,
    pub data_pointer: i32,
    pub unpack_pointer: i32,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct MotionListHeaderRe7 {
    pub version: u32,
    pub magic: u32,
    pub padding: i64,
    pub assets_pointer: i64,
    pub unk_pointer: i64,
    pub name_pointer: i64,
    pub asset_count: i32,
}

/// Motion list header of the later generations, one pointer wider.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct MotionListHeaderRe2 {
    pub version: u32,
    pub magic: u32,
    pub padding: i64,
    pub assets_pointer: i64,
    pub unk_pointer: i64,
    pub name_pointer: i64,
    pub unk_pointer01: i64,
    pub asset_count: i32,
}

/// Channel presence bits of a bone record.
pub mod presence {
    pub const TRANSLATIONS: u16 = 1 << 0;
    pub const ROTATIONS: u16 = 1 << 1;
    /// Present in files but not decoded.
    pub const SCALES: u16 = 1 << 2;
}

/// A bone channel record, independent of generation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChannelRecord {
    pub hash: u32,
    pub flags: u16,
    pub keys: i64,
}

impl ChannelRecord {
    pub fn has(&self, bit: u16) -> bool {
        self.flags & bit != 0
    }
}

impl From<BoneChannelsRe7> for ChannelRecord {
    fn from(r: BoneChannelsRe7) -> Self {
        Self {
            hash: r.hash,
            flags: r.flags,
            keys: r.keys_pointer,
        }
    }
}

impl From<BoneChannelsRe2> for ChannelRecord {
    fn from(r: BoneChannelsRe2) -> Self {
        Self {
            hash: r.hash,
            flags: r.flags,
            keys: r.keys_pointer,
        }
    }
}

impl From<BoneChannelsRe3> for ChannelRecord {
    fn from(r: BoneChannelsRe3) -> Self {
        Self {
            hash: r.hash,
            flags: r.flags,
            keys: i64::from(r.keys_pointer),
        }
    }
}

/// A key block, independent of generation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KeyData {
    pub flags: u32,
    pub key_count: i32,
    pub frames: i64,
    pub data: i64,
    pub unpack: i64,
}

impl KeyData {
    pub const SCHEME_MASK: u32 = 0xF_F000;

    /// Compression scheme code.
    pub fn scheme(&self) -> u32 {
        self.flags & Self::SCHEME_MASK
    }
}

impl From<KeyDataRe7> for KeyData {
    fn from(k: KeyDataRe7) -> Self {
        Self {
            flags: k.flags,
            key_count: k.key_count,
            frames: k.frames_pointer,
            data: k.data_pointer,
            unpack: k.unpack_pointer,
        }
    }
}

impl From<KeyDataRe3> for KeyData {
    fn from(k: KeyDataRe3) -> Self {
        Self {
            flags: k.flags,
            key_count: k.key_count,
            frames: i64::from(k.frames_pointer),
            data: i64::from(k.data_pointer),
            unpack: i64::from(k.unpack_pointer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_struct_sizes() {
        assert_eq!(size_of::<MotionHeader>(), 116);
        assert_eq!(size_of::<RestBoneRecord>(), 80);
        assert_eq!(size_of::<BoneChannelsRe7>(), 16);
        assert_eq!(size_of::<BoneChannelsRe2>(), 24);
        assert_eq!(size_of::<BoneChannelsRe3>(), 12);
        assert_eq!(size_of::<KeyDataRe7>(), 40);
        assert_eq!(size_of::<KeyDataRe3>(), 20);
        assert_eq!(size_of::<MotionListHeaderRe7>(), 44);
        assert_eq!(size_of::<MotionListHeaderRe2>(), 52);
    }

    #[test]
    fn test_scheme_mask() {
        let key = KeyData {
            flags: 0x24_3ABC,
            key_count: 0,
            frames: 0,
            data: 0,
            unpack: 0,
        };
        assert_eq!(key.scheme(), 0x4_3000);
    }
}
