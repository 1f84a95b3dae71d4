//! Key value decompression.
//!
//! Each key block names a compression scheme with a code (`flags & 0xFF000`).
//! The code tables differ between the first two generations and the third:
//! the same code can select a different bit layout, and translation offsets
//! start at a different unpack index. The tables are therefore kept separate
//! and selected by [`MotionVersion`].
//!
//! Every fixed-point component is decoded as
//! `unpack[axis] * (v / (2^n - 1)) + unpack[offset + axis]`.

use std::fmt;

use glam::{Quat, Vec3};
use revault_common::{pointer, BinaryReader};

use crate::{Error, MotionVersion, Result};

/// The channel a key block animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Translation,
    Rotation,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translation => f.write_str("translation"),
            Self::Rotation => f.write_str("rotation"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Per-channel scale and offset constants.
///
/// Files store 8 (first two generations) or 16 (third) floats; missing
/// entries read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Unpack(pub [f32; 16]);

impl Unpack {
    /// Read `count` constants, or `None` when the pointer is not positive.
    pub fn read(reader: &mut BinaryReader, at: i64, count: usize) -> Result<Option<Self>> {
        if at <= 0 {
            return Ok(None);
        }

        let values: Vec<f32> = reader.read_array_at(pointer(at)?, count)?;
        let mut unpack = Self::default();
        for (slot, value) in unpack.0.iter_mut().zip(values) {
            *slot = value;
        }
        Ok(Some(unpack))
    }
}

fn require(unpack: Option<&Unpack>, channel: Channel) -> Result<&Unpack> {
    unpack.ok_or(Error::MissingUnpackData(channel))
}

/// Bit width of a fixed-point scheme, and how three components are packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packing {
    /// One `u16`.
    Bits5,
    /// Three bytes.
    Bits8,
    /// One `u32`.
    Bits10,
    /// Five bytes, most significant first.
    Bits13,
    /// Three `u16`.
    Bits16,
    /// Seven bytes, most significant first.
    Bits18,
    /// One `u64`.
    Bits21,
}

impl Packing {
    pub fn bits(self) -> u32 {
        match self {
            Self::Bits5 => 5,
            Self::Bits8 => 8,
            Self::Bits10 => 10,
            Self::Bits13 => 13,
            Self::Bits16 => 16,
            Self::Bits18 => 18,
            Self::Bits21 => 21,
        }
    }

    /// Bytes per packed key.
    pub fn stride(self) -> usize {
        match self {
            Self::Bits5 => 2,
            Self::Bits8 => 3,
            Self::Bits10 => 4,
            Self::Bits13 => 5,
            Self::Bits16 => 6,
            Self::Bits18 => 7,
            Self::Bits21 => 8,
        }
    }

    /// Largest raw component value.
    pub fn max(self) -> f32 {
        ((1u64 << self.bits()) - 1) as f32
    }

    fn read(self, reader: &mut BinaryReader) -> Result<[u64; 3]> {
        let raw = match self {
            Self::Bits5 => split(u64::from(reader.read_u16()?), 5),
            Self::Bits10 => split(u64::from(reader.read_u32()?), 10),
            Self::Bits21 => split(reader.read_u64()?, 21),
            Self::Bits13 => split(accumulate(reader.read_bytes(5)?), 13),
            Self::Bits18 => split(accumulate(reader.read_bytes(7)?), 18),
            Self::Bits8 => {
                let [x, y, z]: [u8; 3] = reader.read_struct()?;
                [x.into(), y.into(), z.into()]
            }
            Self::Bits16 => {
                let [x, y, z]: [u16; 3] = reader.read_struct()?;
                [x.into(), y.into(), z.into()]
            }
        };
        Ok(raw)
    }

    /// Read `count` packed keys and scale them into vectors.
    fn read_all(self, reader: &mut BinaryReader, count: usize, unpack: &Unpack, offset: usize) -> Result<Vec<Vec3>> {
        reader.peek_bytes(count.saturating_mul(self.stride()))?;

        let max = self.max();
        let u = &unpack.0;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            let [x, y, z] = self.read(reader)?;
            values.push(Vec3::new(
                u[0] * (x as f32 / max) + u[offset],
                u[1] * (y as f32 / max) + u[offset + 1],
                u[2] * (z as f32 / max) + u[offset + 2],
            ));
        }
        Ok(values)
    }
}

fn split(value: u64, bits: u32) -> [u64; 3] {
    let mask = (1u64 << bits) - 1;
    [value & mask, (value >> bits) & mask, (value >> (2 * bits)) & mask]
}

fn accumulate(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, &b| (acc << 8) | u64::from(b))
}

fn read_scalars(reader: &mut BinaryReader, count: usize) -> Result<Vec<f32>> {
    Ok(reader.read_array::<f32>(count)?)
}

fn read_fixed16(reader: &mut BinaryReader, count: usize, scale: f32, offset: f32) -> Result<Vec<f32>> {
    Ok(reader
        .read_array::<u16>(count)?
        .into_iter()
        .map(|v| scale * (f32::from(v) / 65535.0) + offset)
        .collect())
}

/// Translation decompression scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorCodec {
    /// Three `f32` per key.
    Full,
    /// Three fixed-point components; `offset` indexes the first offset constant.
    Packed { packing: Packing, offset: usize },
    /// One `f32` per key on one axis; the other axes come from `unpack[0..3]`.
    AxisFloat(Axis),
    /// One 16-bit value per key on one axis; the other axes come from `unpack[1..4]`.
    Axis16(Axis),
    /// One `f32` per key, written to all three axes.
    UniformFloat,
    /// One 16-bit value per key, written to all three axes.
    Uniform16,
}

impl VectorCodec {
    /// Look up a scheme code in the given generation's table.
    pub fn from_code(version: MotionVersion, code: u32) -> Option<Self> {
        use Packing::*;

        let codec = match version {
            MotionVersion::Re7 | MotionVersion::Re2 => match code {
                0x0_0000 => Self::Full,
                0x2_0000 => Self::Packed { packing: Bits5, offset: 4 },
                0x3_0000 | 0x4_0000 => Self::Packed { packing: Bits10, offset: 4 },
                0x7_0000 => Self::Packed { packing: Bits21, offset: 4 },
                0x3_1000 => Self::AxisFloat(Axis::X),
                0x3_2000 => Self::AxisFloat(Axis::Y),
                0x3_3000 => Self::AxisFloat(Axis::Z),
                0x2_1000 => Self::Axis16(Axis::X),
                0x2_2000 => Self::Axis16(Axis::Y),
                0x2_3000 => Self::Axis16(Axis::Z),
                _ => return None,
            },
            MotionVersion::Re3 => match code {
                0x0_0000 => Self::Full,
                0x2_0000 | 0x3_0000 => Self::Packed { packing: Bits5, offset: 3 },
                0x4_0000 => Self::Packed { packing: Bits10, offset: 3 },
                0x8_0000 => Self::Packed { packing: Bits21, offset: 3 },
                0x2_1000 => Self::Axis16(Axis::X),
                0x2_2000 => Self::Axis16(Axis::Y),
                0x2_3000 => Self::Axis16(Axis::Z),
                0x2_4000 => Self::Uniform16,
                0x4_1000 => Self::AxisFloat(Axis::X),
                0x4_2000 => Self::AxisFloat(Axis::Y),
                0x4_3000 => Self::AxisFloat(Axis::Z),
                0x4_4000 => Self::UniformFloat,
                _ => return None,
            },
        };
        Some(codec)
    }

    /// Decode `count` keys starting at `data`.
    pub fn decode(
        self,
        reader: &mut BinaryReader,
        data: usize,
        count: usize,
        unpack: Option<&Unpack>,
    ) -> Result<Vec<Vec3>> {
        reader.seek(data);

        match self {
            Self::Full => Ok(reader
                .read_array::<[f32; 3]>(count)?
                .into_iter()
                .map(Vec3::from)
                .collect()),
            Self::Packed { packing, offset } => {
                let unpack = require(unpack, Channel::Translation)?;
                packing.read_all(reader, count, unpack, offset)
            }
            Self::AxisFloat(axis) => {
                let u = require(unpack, Channel::Translation)?.0;
                let base = Vec3::new(u[0], u[1], u[2]);
                Ok(read_scalars(reader, count)?
                    .into_iter()
                    .map(|value| {
                        let mut v = base;
                        v[axis.index()] = value;
                        v
                    })
                    .collect())
            }
            Self::Axis16(axis) => {
                let u = require(unpack, Channel::Translation)?.0;
                let base = Vec3::new(u[1], u[2], u[3]);
                Ok(read_fixed16(reader, count, u[0], 0.0)?
                    .into_iter()
                    .map(|value| {
                        let mut v = base;
                        v[axis.index()] += value;
                        v
                    })
                    .collect())
            }
            Self::UniformFloat => Ok(read_scalars(reader, count)?.into_iter().map(Vec3::splat).collect()),
            Self::Uniform16 => {
                let u = require(unpack, Channel::Translation)?.0;
                Ok(read_fixed16(reader, count, u[0], u[3])?
                    .into_iter()
                    .map(Vec3::splat)
                    .collect())
            }
        }
    }
}

/// `w` for a unit quaternion from its vector part, clamped at zero.
fn clamped_w(v: Vec3) -> f32 {
    let w = 1.0 - v.length_squared();
    if w > 0.0 {
        w.sqrt()
    } else {
        0.0
    }
}

/// `w` from the absolute value of the remainder. Only the packed 16-bit
/// rotation scheme reconstructs this way.
fn absolute_w(v: Vec3) -> f32 {
    (1.0 - v.length_squared()).abs().sqrt()
}

fn with_w(v: Vec3, w: f32) -> Quat {
    Quat::from_xyzw(v.x, v.y, v.z, w)
}

/// Rotation decompression scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuatCodec {
    /// Four `f32` per key.
    Full,
    /// Three `f32` per key.
    ThreeComponent,
    /// Three fixed-point components with offsets at `unpack[4..7]`.
    Packed(Packing),
    /// One `f32` per key on one axis; the other axes are zero.
    AxisFloat(Axis),
    /// One 16-bit value per key on one axis; the other axes are zero.
    Axis16(Axis),
}

impl QuatCodec {
    /// Look up a scheme code in the given generation's table.
    pub fn from_code(version: MotionVersion, code: u32) -> Option<Self> {
        use Packing::*;

        let codec = match (version, code) {
            (_, 0x0_0000) => Self::Full,
            (_, 0xB_0000 | 0xC_0000) => Self::ThreeComponent,
            (_, 0x2_1000) => Self::Axis16(Axis::X),
            (_, 0x2_2000) => Self::Axis16(Axis::Y),
            (_, 0x2_3000) => Self::Axis16(Axis::Z),
            (_, 0x3_1000 | 0x4_1000) => Self::AxisFloat(Axis::X),
            (_, 0x3_2000 | 0x4_2000) => Self::AxisFloat(Axis::Y),
            (_, 0x3_3000 | 0x4_3000) => Self::AxisFloat(Axis::Z),
            (MotionVersion::Re7 | MotionVersion::Re2, code) => match code {
                0x3_0000 | 0x4_0000 => Self::Packed(Bits10),
                0x5_0000 => Self::Packed(Bits16),
                0x7_0000 => Self::Packed(Bits21),
                _ => return None,
            },
            (MotionVersion::Re3, code) => match code {
                0x2_0000 => Self::Packed(Bits5),
                0x3_0000 => Self::Packed(Bits8),
                0x4_0000 => Self::Packed(Bits10),
                0x5_0000 => Self::Packed(Bits13),
                0x6_0000 => Self::Packed(Bits16),
                0x7_0000 => Self::Packed(Bits18),
                0x8_0000 => Self::Packed(Bits21),
                _ => return None,
            },
        };
        Some(codec)
    }

    /// Decode `count` keys starting at `data`.
    pub fn decode(
        self,
        reader: &mut BinaryReader,
        data: usize,
        count: usize,
        unpack: Option<&Unpack>,
    ) -> Result<Vec<Quat>> {
        reader.seek(data);

        match self {
            Self::Full => Ok(reader
                .read_array::<[f32; 4]>(count)?
                .into_iter()
                .map(Quat::from_array)
                .collect()),
            Self::ThreeComponent => Ok(reader
                .read_array::<[f32; 3]>(count)?
                .into_iter()
                .map(|v| {
                    let v = Vec3::from(v);
                    with_w(v, clamped_w(v))
                })
                .collect()),
            Self::Packed(packing) => {
                let unpack = require(unpack, Channel::Rotation)?;
                let w = if packing == Packing::Bits16 {
                    absolute_w
                } else {
                    clamped_w
                };
                Ok(packing
                    .read_all(reader, count, unpack, 4)?
                    .into_iter()
                    .map(|v| with_w(v, w(v)))
                    .collect())
            }
            Self::AxisFloat(axis) => Ok(read_scalars(reader, count)?
                .into_iter()
                .map(|value| axis_quat(axis, value))
                .collect()),
            Self::Axis16(axis) => {
                let u = require(unpack, Channel::Rotation)?.0;
                Ok(read_fixed16(reader, count, u[0], u[1])?
                    .into_iter()
                    .map(|value| axis_quat(axis, value))
                    .collect())
            }
        }
    }
}

fn axis_quat(axis: Axis, value: f32) -> Quat {
    let mut v = Vec3::ZERO;
    v[axis.index()] = value;
    with_w(v, clamped_w(v))
}
