//! On-disk material definition structures.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct MdfHeader {
    pub magic: u32,
    pub version: u16,
    pub material_count: u16,
    pub padding: [u8; 8],
}

/// Entry layout with two extra words after the hash.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct MaterialEntryRe7 {
    pub name_pointer: i64,
    pub hash: u32,
    pub unk01: u32,
    pub unk02: u32,
    pub settings_buffer_size: i32,
    pub settings_info_count: i32,
    pub texture_count: i32,
    pub unk03: i32,
    pub unk04: i32,
    pub settings_info_pointer: i64,
    pub textures_pointer: i64,
    pub settings_buffer_pointer: i64,
    pub shader_name_pointer: i64,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct MaterialEntryRe2 {
    pub name_pointer: i64,
    pub hash: u32,
    pub settings_buffer_size: i32,
    pub settings_info_count: i32,
    pub texture_count: i32,
    pub unk03: i32,
    pub unk04: i32,
    pub settings_info_pointer: i64,
    pub textures_pointer: i64,
    pub settings_buffer_pointer: i64,
    pub shader_name_pointer: i64,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct TextureEntry {
    pub type_pointer: i64,
    pub type_hash: u32,
    pub unk_hash: u32,
    pub texture_name_pointer: i64,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct SettingInfo {
    pub name_pointer: i64,
    pub name_hash: u32,
    pub unk_hash: u32,
    pub data_count: i32,
    /// Relative to the entry's settings buffer.
    pub data_offset: i32,
}

/// The parts of an entry both layouts share.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MaterialEntry {
    pub name: i64,
    pub settings_count: i32,
    pub texture_count: i32,
    pub settings: i64,
    pub textures: i64,
    pub settings_buffer: i64,
}

impl From<MaterialEntryRe7> for MaterialEntry {
    fn from(e: MaterialEntryRe7) -> Self {
        Self {
            name: e.name_pointer,
            settings_count: e.settings_info_count,
            texture_count: e.texture_count,
            settings: e.settings_info_pointer,
            textures: e.textures_pointer,
            settings_buffer: e.settings_buffer_pointer,
        }
    }
}

impl From<MaterialEntryRe2> for MaterialEntry {
    fn from(e: MaterialEntryRe2) -> Self {
        Self {
            name: e.name_pointer,
            settings_count: e.settings_info_count,
            texture_count: e.texture_count,
            settings: e.settings_info_pointer,
            textures: e.textures_pointer,
            settings_buffer: e.settings_buffer_pointer,
        }
    }
}
