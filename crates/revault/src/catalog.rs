//! Labelled listings of a package's entries.

use std::io::{Read, Seek};

use revault_cache::NameCache;
use revault_pak::{PakArchive, PakEntry};

use crate::AssetKind;

/// A package entry with the name it is known by.
#[derive(Debug, Clone)]
pub struct AssetRecord {
    pub hash: u32,
    /// Path from the name cache, or a placeholder built from the hash.
    pub name: String,
    pub kind: AssetKind,
    pub entry: PakEntry,
}

impl AssetRecord {
    pub fn new(entry: PakEntry, cache: &NameCache) -> Self {
        let hash = entry.hash();
        let name = label(hash, cache);
        Self {
            hash,
            kind: AssetKind::classify(&name),
            name,
            entry,
        }
    }

    /// Whether the name cache knew this entry.
    pub fn is_named(&self) -> bool {
        !self.name.starts_with(UNNAMED_PREFIX)
    }
}

const UNNAMED_PREFIX: &str = "asset_";

/// The cached path of `hash`, or `asset_<hex>` when the cache has none.
pub fn label(hash: u32, cache: &NameCache) -> String {
    match cache.get(u64::from(hash)) {
        Some(name) => name.to_string(),
        None => format!("{UNNAMED_PREFIX}{hash:x}"),
    }
}

/// Every entry of `archive`, labelled through `cache` and ordered by kind,
/// then name.
pub fn catalog<R: Read + Seek>(archive: &PakArchive<R>, cache: &NameCache) -> Vec<AssetRecord> {
    let mut records: Vec<AssetRecord> = archive
        .iter()
        .map(|entry| AssetRecord::new(*entry, cache))
        .collect();
    records.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));

    let named = records.iter().filter(|r| r.is_named()).count();
    tracing::info!(
        "{}: {} entries, {} named",
        archive.name(),
        records.len(),
        named
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{package, path_hash};

    #[test]
    fn test_label() {
        let mut cache = NameCache::new();
        cache.insert(0xABCD, "natives/x64/a.mesh.1");

        assert_eq!(label(0xABCD, &cache), "natives/x64/a.mesh.1");
        assert_eq!(label(0x1F2E, &cache), "asset_1f2e");
    }

    #[test]
    fn test_catalog_order() {
        let mesh = "natives/x64/pl0000.mesh.1808282334";
        let texture = "natives/x64/pl0000_albm.tex.10";
        let archive = package(&[(mesh, b"m".to_vec()), (texture, b"t".to_vec()), ("other", b"o".to_vec())]);

        let mut cache = NameCache::new();
        cache.insert(u64::from(path_hash(mesh)), mesh);
        cache.insert(u64::from(path_hash(texture)), texture);

        let records = catalog(&archive, &cache);
        let kinds: Vec<AssetKind> = records.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, [AssetKind::Texture, AssetKind::Mesh, AssetKind::Unknown]);

        assert!(records[0].is_named());
        assert!(!records[2].is_named());
        assert_eq!(records[2].name, format!("asset_{:x}", path_hash("other")));
    }
}
