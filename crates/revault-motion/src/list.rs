//! Motion lists: a name and a table of embedded motions.

use revault_common::{pointer, BinaryReader};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::header::{MotionListHeaderRe2, MotionListHeaderRe7, MOTION_MAGIC};
use crate::{decode_motion, Animation, BoneRegistry, Error, Result};

/// Motion list generation, from the leading version word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionListVersion {
    Re7,
    Re2,
    Re3,
}

impl MotionListVersion {
    pub const TAG_RE7: u32 = 0x3C;
    pub const TAG_RE2: u32 = 0x55;
    pub const TAG_RE3: u32 = 0x63;

    pub fn from_tag(tag: u32) -> Result<Self> {
        match tag {
            Self::TAG_RE7 => Ok(Self::Re7),
            Self::TAG_RE2 => Ok(Self::Re2),
            Self::TAG_RE3 => Ok(Self::Re3),
            other => Err(Error::InvalidVersion(other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionList {
    pub name: String,
    pub motions: Vec<Animation>,
}

impl MotionList {
    pub fn scale(&mut self, factor: f32) {
        for motion in &mut self.motions {
            motion.scale(factor);
        }
    }
}

/// Decode every motion embedded in a list.
///
/// Entries are not sized, so each runs from its offset to the next distinct
/// offset or the end of the buffer. Entries that are not motions are skipped.
/// All motions share `registry`.
pub fn decode_motion_list(buffer: &[u8], registry: &mut BoneRegistry) -> Result<MotionList> {
    let mut reader = BinaryReader::new(buffer);
    let version = MotionListVersion::from_tag(reader.read_u32_at(0)?)?;

    let (assets, count, name_pointer) = match version {
        MotionListVersion::Re7 => {
            let h: MotionListHeaderRe7 = reader.read_struct_at(0)?;
            (h.assets_pointer, h.asset_count, h.name_pointer)
        }
        MotionListVersion::Re2 | MotionListVersion::Re3 => {
            let h: MotionListHeaderRe2 = reader.read_struct_at(0)?;
            (h.assets_pointer, h.asset_count, h.name_pointer)
        }
    };

    let name = if name_pointer > 0 {
        reader.read_utf16_cstring_at(pointer(name_pointer)?)?
    } else {
        String::new()
    };

    // Several entries may point at the same motion.
    let mut offsets: Vec<i64> = reader.read_array_at(pointer(assets)?, count.max(0) as usize)?;
    offsets.sort_unstable();
    offsets.dedup();

    tracing::debug!("motion list {:?}: {} distinct entries", name, offsets.len());

    let mut motions = Vec::with_capacity(offsets.len());
    for (i, &offset) in offsets.iter().enumerate() {
        let start = pointer(offset)?;
        if reader.read_u32_at(start + 4)? != MOTION_MAGIC {
            tracing::trace!("skipping non-motion entry at {:#x}", start);
            continue;
        }

        let end = match offsets.get(i + 1) {
            Some(&next) => pointer(next)?.min(buffer.len()),
            None => buffer.len(),
        };
        motions.push(decode_motion(&buffer[start..end], registry)?);
    }

    Ok(MotionList { name, motions })
}
