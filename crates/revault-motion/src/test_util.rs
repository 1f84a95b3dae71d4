//! Synthetic motion files for tests.
//!
//! Every generation gets the same content: a two-bone rest pose, a root bone
//! with 10-bit packed translations on three frames and three-component
//! rotations on two, and a spine bone with no keys.

use zerocopy::{Immutable, IntoBytes};

use crate::header::*;
use crate::MotionVersion;

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

    pub fn put_utf16(&mut self, at: usize, s: &str) {
        let mut units: Vec<u16> = s.encode_utf16().collect();
        units.push(0);
        self.put(at, units.as_slice());
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

pub const BASE: usize = 0x78;
pub const REST: usize = 0x88;
pub const NAMES: usize = 0x130;
pub const CHANNELS: usize = 0x150;
pub const KEYS: usize = 0x180;
pub const FRAMES: usize = 0x1E0;
pub const DATA: usize = 0x200;
pub const UNPACK: usize = 0x240;
pub const MOTION_NAME: usize = 0x280;

pub const ROOT_HASH: u32 = 0x1111_1111;
pub const SPINE_HASH: u32 = 0x2222_2222;
pub const ROOT_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const SPINE_TRANSLATION: [f32; 3] = [0.0, 0.25, 0.0];
pub const SPINE_ROTATION: [f32; 4] = [0.0, 0.0, 0.6, 0.8];

const TRANSLATION_FLAGS: u32 = 0x20_0000 | 0x4_0000;
const ROTATION_FLAGS: u32 = 0x40_0000 | 0xB_0000;

fn rest(name_pointer: usize, translation: [f32; 3], rotation: [f32; 4], hash: u32) -> RestBoneRecord {
    let [x, y, z] = translation;
    RestBoneRecord {
        name_pointer: name_pointer as i64,
        unk_pointers: [0; 3],
        translation: [x, y, z, 1.0],
        rotation,
        index: 0,
        hash,
        padding: 0,
    }
}

/// Build a synthetic motion of the given generation.
pub fn build(version: MotionVersion) -> Vec<u8> {
    let mut buf = Buf::new();

    buf.put(
        0,
        &MotionHeader {
            version: version.tag(),
            magic: MOTION_MAGIC,
            padding: 0,
            base_data_pointer: BASE as i64,
            bone_data_pointer: CHANNELS as i64,
            unk_pointers: [0; 6],
            name_pointer: MOTION_NAME as i64,
            frame_count: 10.0,
            unk_floats: [0.0; 3],
            bone_count: 2,
            bone_data_count: 2,
            unk_pointer2_count: 0,
            unk_pointer3_count: 0,
            unk: 0,
            unk_pointer_count: 0,
            unk1: 0,
        },
    );

    buf.put(BASE, &(REST as i64));
    buf.put(BASE + 8, &2i32);
    buf.put(
        REST,
        &[
            rest(NAMES, [0.0, 1.5, 0.0], ROOT_ROTATION, ROOT_HASH),
            rest(NAMES + 0x10, SPINE_TRANSLATION, SPINE_ROTATION, SPINE_HASH),
        ],
    );
    buf.put_utf16(NAMES, "root");
    buf.put_utf16(NAMES + 0x10, "spine");
    buf.put_utf16(MOTION_NAME, "walk");

    let animated = presence::TRANSLATIONS | presence::ROTATIONS;
    match version {
        MotionVersion::Re7 => buf.put(
            CHANNELS,
            &[
                BoneChannelsRe7 {
                    index: 0,
                    flags: animated,
                    hash: ROOT_HASH,
                    keys_pointer: KEYS as i64,
                },
                BoneChannelsRe7 {
                    index: 1,
                    flags: 0,
                    hash: SPINE_HASH,
                    keys_pointer: 0,
                },
            ],
        ),
        MotionVersion::Re2 => buf.put(
            CHANNELS,
            &[
                BoneChannelsRe2 {
                    index: 0,
                    flags: animated,
                    hash: ROOT_HASH,
                    unk: 1.0,
                    padding: 0,
                    keys_pointer: KEYS as i64,
                },
                BoneChannelsRe2 {
                    index: 1,
                    flags: 0,
                    hash: SPINE_HASH,
                    unk: 1.0,
                    padding: 0,
                    keys_pointer: 0,
                },
            ],
        ),
        MotionVersion::Re3 => buf.put(
            CHANNELS,
            &[
                BoneChannelsRe3 {
                    index: 0,
                    flags: animated,
                    hash: ROOT_HASH,
                    keys_pointer: KEYS as i32,
                },
                BoneChannelsRe3 {
                    index: 1,
                    flags: 0,
                    hash: SPINE_HASH,
                    keys_pointer: 0,
                },
            ],
        ),
    }

    match version {
        MotionVersion::Re7 | MotionVersion::Re2 => {
            buf.put(
                KEYS,
                &[
                    KeyDataRe7 {
                        flags: TRANSLATION_FLAGS,
                        key_count: 3,
                        unk: 0,
                        max_frame: 9.0,
                        frames_pointer: FRAMES as i64,
                        data_pointer: DATA as i64,
                        unpack_pointer: UNPACK as i64,
                    },
                    KeyDataRe7 {
                        flags: ROTATION_FLAGS,
                        key_count: 2,
                        unk: 0,
                        max_frame: 4.0,
                        frames_pointer: (FRAMES + 0x10) as i64,
                        data_pointer: (DATA + 0x20) as i64,
                        unpack_pointer: 0,
                    },
                ],
            );
            buf.put(UNPACK, &[1.0f32, 1.0, 1.0, 0.0, 10.0, 20.0, 30.0, 0.0]);
        }
        MotionVersion::Re3 => {
            buf.put(
                KEYS,
                &[
                    KeyDataRe3 {
                        flags: TRANSLATION_FLAGS,
                        key_count: 3,
                        frames_pointer: FRAMES as i32,
                        data_pointer: DATA as i32,
                        unpack_pointer: UNPACK as i32,
                    },
                    KeyDataRe3 {
                        flags: ROTATION_FLAGS,
                        key_count: 2,
                        frames_pointer: (FRAMES + 0x10) as i32,
                        data_pointer: (DATA + 0x20) as i32,
                        unpack_pointer: 0,
                    },
                ],
            );
            let mut unpack = [0.0f32; 16];
            unpack[..6].copy_from_slice(&[1.0, 1.0, 1.0, 10.0, 20.0, 30.0]);
            buf.put(UNPACK, &unpack);
        }
    }

    buf.put(FRAMES, &[0u8, 5, 9]);
    buf.put(FRAMES + 0x10, &[2u16, 4]);
    buf.put(DATA, &[1023u32, 1023 << 10, 1023 << 20]);
    buf.put(DATA + 0x20, &[[0.0f32, 0.0, 0.0], [0.6, 0.0, 0.0]]);

    buf.into_inner()
}
