//! Key frame index decoding.

use revault_common::{pointer, BinaryReader};

use crate::Result;

/// Storage width of a key block's frame indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameWidth {
    U8,
    U16,
    I32,
    /// Stored as `f32` and truncated.
    F32,
}

impl FrameWidth {
    pub const MASK: u32 = 0xF0_0000;

    /// Select the width from a key block's flag word.
    pub fn from_flags(flags: u32) -> Self {
        match flags & Self::MASK {
            0x20_0000 => Self::U8,
            0x40_0000 => Self::U16,
            0x50_0000 => Self::I32,
            _ => Self::F32,
        }
    }
}

/// Read a key block's frame indices.
///
/// Fewer than two keys means a single key at frame 0; nothing is read.
/// Negative indices saturate to 0.
pub fn read_frames(reader: &mut BinaryReader, frames: i64, key_count: i32, width: FrameWidth) -> Result<Vec<u32>> {
    if key_count < 2 {
        return Ok(vec![0]);
    }

    let count = key_count as usize;
    reader.seek(pointer(frames)?);

    let frames = match width {
        FrameWidth::U8 => reader.read_array::<u8>(count)?.into_iter().map(u32::from).collect(),
        FrameWidth::U16 => reader.read_array::<u16>(count)?.into_iter().map(u32::from).collect(),
        FrameWidth::I32 => reader
            .read_array::<i32>(count)?
            .into_iter()
            .map(|f| f.max(0) as u32)
            .collect(),
        FrameWidth::F32 => reader.read_array::<f32>(count)?.into_iter().map(|f| f as u32).collect(),
    };
    Ok(frames)
}
