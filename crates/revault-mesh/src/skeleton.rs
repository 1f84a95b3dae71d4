//! Skeleton reconstruction.

use std::sync::Arc;

use glam::{Quat, Vec3};
use revault_common::{pointer, BinaryReader, Bone};

use crate::header::{BoneRecord, Matrix4x4};
use crate::{Error, Result};

impl Matrix4x4 {
    /// Translation stored in the last row.
    pub fn translation(&self) -> Vec3 {
        let w = self.rows[3];
        Vec3::new(w[0], w[1], w[2])
    }

    /// Rotation part as a quaternion.
    ///
    /// Uses the trace when it is positive, otherwise the branch of the
    /// largest diagonal element.
    pub fn to_quaternion(&self) -> Quat {
        let [x, y, z, _] = self.rows;
        let trace = x[0] + y[1] + z[2];

        if trace > 0.0 {
            let d = (trace + 1.0).sqrt() * 2.0;
            Quat::from_xyzw((y[2] - z[1]) / d, (z[0] - x[2]) / d, (x[1] - y[0]) / d, 0.25 * d)
        } else if x[0] > y[1] && x[0] > z[2] {
            let d = (1.0 + x[0] - y[1] - z[2]).sqrt() * 2.0;
            Quat::from_xyzw(0.25 * d, (y[0] + x[1]) / d, (z[0] + x[2]) / d, (y[2] - z[1]) / d)
        } else if y[1] > z[2] {
            let d = (1.0 + y[1] - x[0] - z[2]).sqrt() * 2.0;
            Quat::from_xyzw((y[0] + x[1]) / d, 0.25 * d, (z[1] + y[2]) / d, (z[0] - x[2]) / d)
        } else {
            let d = (1.0 + z[2] - x[0] - y[1]).sqrt() * 2.0;
            Quat::from_xyzw((z[0] + x[2]) / d, (z[1] + y[2]) / d, 0.25 * d, (x[1] - y[0]) / d)
        }
    }
}

/// Where a file's bone hierarchy lives.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BoneTable {
    pub count: usize,
    pub records: i64,
    pub matrices: i64,
}

/// Read the global string table: `count` pointers to 8-bit strings.
pub(crate) fn read_strings(reader: &mut BinaryReader, table: i64, count: usize) -> Result<Vec<String>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let offsets: Vec<i64> = reader.read_array_at(pointer(table)?, count)?;
    offsets
        .into_iter()
        .map(|offset| Ok(reader.read_cstring_at(pointer(offset)?)?.to_string()))
        .collect()
}

/// Build the skeleton shared by every model in the file.
pub(crate) fn read_skeleton(
    reader: &mut BinaryReader,
    strings: &[String],
    names_pointer: i64,
    table: BoneTable,
) -> Result<Arc<[Bone]>> {
    if table.count == 0 {
        return Ok(Arc::from(Vec::new()));
    }

    let name_indices: Vec<u16> = reader.read_array_at(pointer(names_pointer)?, table.count)?;
    let records: Vec<BoneRecord> = reader.read_array_at(pointer(table.records)?, table.count)?;
    let matrices: Vec<Matrix4x4> = reader.read_array_at(pointer(table.matrices)?, table.count)?;

    name_indices
        .iter()
        .zip(&records)
        .zip(&matrices)
        .map(|((&name, record), matrix)| {
            let name = strings
                .get(name as usize)
                .ok_or_else(|| Error::missing("bone name", name))?;

            Ok(Bone {
                name: name.clone(),
                parent: record.parent,
                translation: matrix.translation(),
                rotation: matrix.to_quaternion(),
            })
        })
        .collect()
}
