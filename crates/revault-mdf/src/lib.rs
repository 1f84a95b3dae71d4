//! RE Engine material definition (`.mdf2`) decoder.
//!
//! A material definition file lists materials by name, each with texture
//! slots and float settings. Meshes refer to materials only by name, so the
//! decoded definitions are merged onto a model afterwards.
//!
//! # Example
//!
//! ```no_run
//! use revault_mdf::decode_material_defs;
//!
//! let data = std::fs::read("pl0000.mdf2.10")?;
//! let defs = decode_material_defs(&data)?;
//!
//! for material in defs.iter() {
//!     println!("{}: {} textures", material.name, material.textures.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
pub mod header;

pub use error::{Error, Result};

use hashbrown::HashMap;
use revault_common::{pointer, BinaryReader, Material};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::header::{
    MaterialEntry, MaterialEntryRe2, MaterialEntryRe7, MdfHeader, SettingInfo, TextureEntry,
};

/// Offset of the word that tells the two entry layouts apart. It is an
/// unknown field in the longer layout and the settings buffer size in the
/// shorter one.
const LAYOUT_PROBE: usize = 28;

/// Decoded materials in file order, addressable by name.
#[derive(Debug, Clone, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "Vec<Material>", into = "Vec<Material>")
)]
pub struct MaterialDefs {
    materials: Vec<Material>,
    by_name: HashMap<String, usize>,
}

impl MaterialDefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material. A later material with the same name replaces the
    /// earlier one in place.
    pub fn insert(&mut self, material: Material) {
        match self.by_name.get(&material.name) {
            Some(&i) => self.materials[i] = material,
            None => {
                self.by_name.insert(material.name.clone(), self.materials.len());
                self.materials.push(material);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.by_name.get(name).map(|&i| &self.materials[i])
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn into_vec(self) -> Vec<Material> {
        self.materials
    }
}

impl From<Vec<Material>> for MaterialDefs {
    fn from(materials: Vec<Material>) -> Self {
        materials.into_iter().collect()
    }
}

impl From<MaterialDefs> for Vec<Material> {
    fn from(defs: MaterialDefs) -> Self {
        defs.materials
    }
}

impl FromIterator<Material> for MaterialDefs {
    fn from_iter<I: IntoIterator<Item = Material>>(iter: I) -> Self {
        let mut defs = Self::new();
        for material in iter {
            defs.insert(material);
        }
        defs
    }
}

/// Decode every material in a definition file.
pub fn decode_material_defs(buffer: &[u8]) -> Result<MaterialDefs> {
    let mut reader = BinaryReader::new(buffer);
    let entries = read_entries(&mut reader)?;

    let mut defs = MaterialDefs::new();
    for entry in &entries {
        defs.insert(read_material(&mut reader, entry)?);
    }

    tracing::debug!("decoded {} material definitions", defs.len());
    Ok(defs)
}

/// Decode the material called `name`, if the file defines it.
///
/// Only the matching entry's textures and settings are read.
pub fn decode_material(buffer: &[u8], name: &str) -> Result<Option<Material>> {
    let mut reader = BinaryReader::new(buffer);
    let entries = read_entries(&mut reader)?;

    let mut found = None;
    for entry in &entries {
        if reader.read_utf16_cstring_at(pointer(entry.name)?)? == name {
            found = Some(entry);
        }
    }

    found.map(|entry| read_material(&mut reader, entry)).transpose()
}

fn read_entries(reader: &mut BinaryReader) -> Result<Vec<MaterialEntry>> {
    let header: MdfHeader = reader.read_struct_at(0)?;
    let count = header.material_count as usize;
    if count == 0 {
        return Ok(Vec::new());
    }

    let offset = std::mem::size_of::<MdfHeader>();
    let entries = if reader.read_u32_at(LAYOUT_PROBE)? != 0 {
        reader
            .read_array_at::<MaterialEntryRe2>(offset, count)?
            .into_iter()
            .map(MaterialEntry::from)
            .collect()
    } else {
        reader
            .read_array_at::<MaterialEntryRe7>(offset, count)?
            .into_iter()
            .map(MaterialEntry::from)
            .collect()
    };
    Ok(entries)
}

fn checked_count(kind: &'static str, count: i32) -> Result<usize> {
    usize::try_from(count).map_err(|_| Error::InvalidCount { kind, count })
}

fn read_material(reader: &mut BinaryReader, entry: &MaterialEntry) -> Result<Material> {
    let mut material = Material::new(reader.read_utf16_cstring_at(pointer(entry.name)?)?);

    let texture_count = checked_count("texture", entry.texture_count)?;
    if texture_count > 0 {
        let textures: Vec<TextureEntry> = reader.read_array_at(pointer(entry.textures)?, texture_count)?;
        for texture in &textures {
            let slot = reader.read_utf16_cstring_at(pointer(texture.type_pointer)?)?;
            let path = reader
                .read_utf16_cstring_at(pointer(texture.texture_name_pointer)?)?
                .to_lowercase();
            material.textures.insert(slot, path);
        }
    }

    let settings_count = checked_count("setting", entry.settings_count)?;
    if settings_count > 0 {
        let settings: Vec<SettingInfo> = reader.read_array_at(pointer(entry.settings)?, settings_count)?;
        for setting in &settings {
            let name = reader.read_utf16_cstring_at(pointer(setting.name_pointer)?)?;
            let at = entry
                .settings_buffer
                .checked_add(i64::from(setting.data_offset))
                .ok_or(revault_common::Error::InvalidPointer(entry.settings_buffer))?;
            let at = pointer(at)?;
            let len = checked_count("setting value", setting.data_count)?;
            let values: Vec<f32> = reader.read_array_at(at, len)?;
            material.settings.insert(name, values);
        }
    }

    tracing::trace!(
        "material {:?}: {} textures, {} settings",
        material.name,
        material.textures.len(),
        material.settings.len()
    );
    Ok(material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::{Immutable, IntoBytes};

    struct Buf(Vec<u8>);

    impl Buf {
        fn put<T: IntoBytes + Immutable + ?Sized>(&mut self, at: usize, value: &T) {
            let bytes = value.as_bytes();
            if self.0.len() < at + bytes.len() {
                self.0.resize(at + bytes.len(), 0);
            }
            self.0[at..at + bytes.len()].copy_from_slice(bytes);
        }

        fn put_utf16(&mut self, at: usize, s: &str) {
            let mut units: Vec<u16> = s.encode_utf16().collect();
            units.push(0);
            self.put(at, units.as_slice());
        }
    }

    const ENTRIES: usize = 0x10;
    const TEXTURES: usize = 0x100;
    const SETTINGS: usize = 0x180;
    const FLOATS: usize = 0x200;
    const STRINGS: usize = 0x300;

    /// Two materials: "body" with two textures and one setting, then "eye"
    /// with nothing. The string table is laid out in 0x80-byte slots.
    fn build(short_layout: bool) -> Vec<u8> {
        let mut buf = Buf(Vec::new());
        let s = |slot: usize| (STRINGS + slot * 0x80) as i64;

        buf.put(
            0,
            &MdfHeader {
                magic: 0x0046_444D,
                version: 1,
                material_count: 2,
                padding: [0; 8],
            },
        );

        let entry = |name: i64, textures: i32, settings: i32, buffer_size: i32| {
            (
                MaterialEntryRe7 {
                    name_pointer: name,
                    hash: 0,
                    unk01: 0,
                    unk02: 0,
                    settings_buffer_size: buffer_size,
                    settings_info_count: settings,
                    texture_count: textures,
                    unk03: 0,
                    unk04: 0,
                    settings_info_pointer: SETTINGS as i64,
                    textures_pointer: TEXTURES as i64,
                    settings_buffer_pointer: FLOATS as i64,
                    shader_name_pointer: 0,
                },
                MaterialEntryRe2 {
                    name_pointer: name,
                    hash: 0,
                    settings_buffer_size: buffer_size,
                    settings_info_count: settings,
                    texture_count: textures,
                    unk03: 0,
                    unk04: 0,
                    settings_info_pointer: SETTINGS as i64,
                    textures_pointer: TEXTURES as i64,
                    settings_buffer_pointer: FLOATS as i64,
                    shader_name_pointer: 0,
                },
            )
        };

        let (body7, body2) = entry(s(0), 2, 1, 16);
        let (eye7, eye2) = entry(s(1), 0, 0, 16);
        if short_layout {
            buf.put(ENTRIES, &[body2, eye2]);
        } else {
            buf.put(ENTRIES, &[body7, eye7]);
        }

        buf.put(
            TEXTURES,
            &[
                TextureEntry {
                    type_pointer: s(2),
                    type_hash: 0,
                    unk_hash: 0,
                    texture_name_pointer: s(3),
                },
                TextureEntry {
                    type_pointer: s(4),
                    type_hash: 0,
                    unk_hash: 0,
                    texture_name_pointer: s(5),
                },
            ],
        );
        buf.put(
            SETTINGS,
            &SettingInfo {
                name_pointer: s(6),
                name_hash: 0,
                unk_hash: 0,
                data_count: 3,
                data_offset: 4,
            },
        );
        buf.put(FLOATS, &[9.0f32, 0.25, 0.5, 1.0]);

        for (slot, text) in [
            "body",
            "eye",
            "BaseMetalMap",
            "Character/PL0000/PL0000_ALBM.tex",
            "NormalRoughnessMap",
            "Character/PL0000/PL0000_NRMR.tex",
            "BaseColor",
        ]
        .iter()
        .enumerate()
        {
            buf.put_utf16(STRINGS + slot * 0x80, text);
        }

        buf.0
    }

    #[test]
    fn test_layout_discriminator() {
        let long = build(false);
        let short = build(true);
        assert_eq!(u32::from_le_bytes(long[28..32].try_into().unwrap()), 0);
        assert_ne!(u32::from_le_bytes(short[28..32].try_into().unwrap()), 0);
    }

    #[test]
    fn test_decode_both_layouts() {
        for short_layout in [false, true] {
            let defs = decode_material_defs(&build(short_layout)).unwrap();
            assert_eq!(defs.len(), 2);

            let names: Vec<&str> = defs.iter().map(|m| m.name.as_str()).collect();
            assert_eq!(names, ["body", "eye"]);

            let body = defs.get("body").unwrap();
            assert_eq!(
                body.textures["BaseMetalMap"],
                "character/pl0000/pl0000_albm.tex"
            );
            assert_eq!(
                body.textures["NormalRoughnessMap"],
                "character/pl0000/pl0000_nrmr.tex"
            );
            assert_eq!(body.settings["BaseColor"], [0.25, 0.5, 1.0]);

            let eye = defs.get("eye").unwrap();
            assert!(eye.textures.is_empty());
            assert!(eye.settings.is_empty());
        }
    }

    #[test]
    fn test_decode_single_material() {
        let data = build(true);

        let body = decode_material(&data, "body").unwrap().unwrap();
        assert_eq!(body.textures.len(), 2);
        assert!(decode_material(&data, "hair").unwrap().is_none());
    }

    #[test]
    fn test_empty_file() {
        let mut buf = Buf(Vec::new());
        buf.put(
            0,
            &MdfHeader {
                magic: 0x0046_444D,
                version: 1,
                material_count: 0,
                padding: [0; 8],
            },
        );

        assert!(decode_material_defs(&buf.0).unwrap().is_empty());
    }

    #[test]
    fn test_later_definition_wins() {
        let mut defs = MaterialDefs::new();
        let mut first = Material::new("skin");
        first.settings.insert("Roughness".to_string(), vec![0.1]);
        defs.insert(first);
        defs.insert(Material::new("hair"));
        defs.insert(Material::new("skin"));

        assert_eq!(defs.len(), 2);
        assert!(defs.get("skin").unwrap().settings.is_empty());
        assert_eq!(defs.into_vec()[0].name, "skin");
    }

    #[test]
    fn test_negative_count() {
        let mut data = build(true);
        // texture_count of the first short entry
        let at = ENTRIES + 20;
        data[at..at + 4].copy_from_slice(&(-1i32).to_le_bytes());

        assert!(matches!(
            decode_material_defs(&data),
            Err(Error::InvalidCount { kind: "texture", count: -1 })
        ));
    }

    #[test]
    fn test_settings_offset_overflow() {
        let mut data = build(true);
        // settings_buffer_pointer of the first short entry
        let at = ENTRIES + 48;
        data[at..at + 8].copy_from_slice(&i64::MAX.to_le_bytes());

        assert!(matches!(
            decode_material_defs(&data),
            Err(Error::Common(revault_common::Error::InvalidPointer(i64::MAX)))
        ));
    }

    #[test]
    fn test_truncated() {
        let data = build(false);
        assert!(decode_material_defs(&data[..0x40]).is_err());
    }
}
