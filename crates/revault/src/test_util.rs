//! In-memory packages for tests.

use std::io::Cursor;

use revault_common::{hash, Immutable, IntoBytes};
use revault_mdf::header::{MaterialEntryRe2, MdfHeader, TextureEntry};
use revault_pak::{PakArchive, PakEntry, PakHeader};

pub fn path_hash(path: &str) -> u32 {
    hash::hash_path(path).unwrap()
}

/// A package of uncompressed entries, keyed by the hash of each path.
pub fn package(files: &[(&str, Vec<u8>)]) -> PakArchive<Cursor<Vec<u8>>> {
    PakArchive::from_reader("test.pak", Cursor::new(package_bytes(files))).unwrap()
}

pub fn package_bytes(files: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let header = PakHeader {
        magic: PakHeader::MAGIC,
        version: PakHeader::VERSION,
        entry_count: files.len() as i32,
        checksum: 0,
    };

    let mut out = header.as_bytes().to_vec();
    let mut offset = (out.len() + PakEntry::SIZE * files.len()) as u64;
    for (path, data) in files {
        let entry = PakEntry {
            lower_hash: path_hash(path),
            upper_hash: 0,
            offset,
            compressed_size: data.len() as u64,
            decompressed_size: data.len() as u64,
            flags: [0; 8],
            checksum: 0,
        };
        out.extend_from_slice(entry.as_bytes());
        offset += data.len() as u64;
    }
    for (_, data) in files {
        out.extend_from_slice(data);
    }
    out
}

fn put<T: IntoBytes + Immutable + ?Sized>(buf: &mut Vec<u8>, at: usize, value: &T) {
    let bytes = value.as_bytes();
    if buf.len() < at + bytes.len() {
        buf.resize(at + bytes.len(), 0);
    }
    buf[at..at + bytes.len()].copy_from_slice(bytes);
}

fn put_utf16(buf: &mut Vec<u8>, at: usize, s: &str) {
    let mut units: Vec<u16> = s.encode_utf16().collect();
    units.push(0);
    put(buf, at, units.as_slice());
}

/// A material file with one material whose `BaseMap` is
/// `Character/Body.tex`.
pub fn material_file(name: &str) -> Vec<u8> {
    const NAME: usize = 0x60;
    const TEXTURES: usize = 0x80;
    const SLOT: usize = 0xA0;
    const PATH: usize = 0xC0;

    let mut buf = Vec::new();
    put(
        &mut buf,
        0,
        &MdfHeader {
            magic: 0x0046_444D,
            version: 1,
            material_count: 1,
            padding: [0; 8],
        },
    );
    put(
        &mut buf,
        16,
        &MaterialEntryRe2 {
            name_pointer: NAME as i64,
            hash: 0,
            settings_buffer_size: 4,
            settings_info_count: 0,
            texture_count: 1,
            unk03: 0,
            unk04: 0,
            settings_info_pointer: 0,
            textures_pointer: TEXTURES as i64,
            settings_buffer_pointer: 0,
            shader_name_pointer: 0,
        },
    );
    put(
        &mut buf,
        TEXTURES,
        &TextureEntry {
            type_pointer: SLOT as i64,
            type_hash: 0,
            unk_hash: 0,
            texture_name_pointer: PATH as i64,
        },
    );
    put_utf16(&mut buf, NAME, name);
    put_utf16(&mut buf, SLOT, "BaseMap");
    put_utf16(&mut buf, PATH, "Character/Body.tex");
    buf
}
