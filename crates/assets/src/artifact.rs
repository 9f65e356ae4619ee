// Copyright (C) 2023 gigablaster

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::{path::PathBuf, sync::Arc};

use crate::{asset_id::AssetId, import_data::hash_bytes};

/// The on-disk location of one tagged artifact blob relative to a pack's root —
/// `id.tag.artifact`, so a texture asset's `"data"` and `"mips"` tags live
/// side by side with its `.res` metadata file.
pub fn artifact_relative_path(id: &AssetId, tag: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}.artifact", id.name(), tag))
}

/// Identifies one named blob belonging to an asset — an asset may own more
/// than one tag (e.g. a texture's `"data"` and `"mips"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub asset_id: AssetId,
    pub tag: &'static str,
}

impl ArtifactKey {
    pub fn new(asset_id: AssetId, tag: &'static str) -> Self {
        Self { asset_id, tag }
    }
}

/// A content-addressed binary blob produced by an importer.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub key: ArtifactKey,
    pub bytes: Arc<[u8]>,
}

impl Artifact {
    pub fn new(key: ArtifactKey, bytes: Vec<u8>) -> Self {
        Self {
            key,
            bytes: Arc::from(bytes),
        }
    }

    pub fn content_hash(&self) -> u64 {
        hash_bytes(&self.bytes)
    }
}

/// The three inputs that must all match for a cached artifact to be reused:
/// the importer's own version, the hash of its `ImportData`, and the combined
/// hash of the source files it read. Changing any one forces a re-import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactCacheKey {
    pub importer_version: u32,
    pub import_data_hash: u64,
    pub source_content_hash_set: u64,
}

impl ArtifactCacheKey {
    pub fn new(importer_version: u32, import_data_hash: u64, source_content_hash_set: u64) -> Self {
        Self {
            importer_version,
            import_data_hash,
            source_content_hash_set,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identical_bytes_hash_identically() {
        let key = ArtifactKey::new(AssetId::new("a"), "data");
        let a = Artifact::new(key.clone(), vec![1, 2, 3]);
        let b = Artifact::new(key, vec![1, 2, 3]);
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn relative_path_includes_tag() {
        let path = artifact_relative_path(&AssetId::new("textures/rock"), "mips");
        assert_eq!(PathBuf::from("textures/rock.mips.artifact"), path);
    }

    #[test]
    fn cache_key_distinguishes_any_differing_input() {
        let base = ArtifactCacheKey::new(1, 10, 100);
        assert_ne!(base, ArtifactCacheKey::new(2, 10, 100));
        assert_ne!(base, ArtifactCacheKey::new(1, 11, 100));
        assert_ne!(base, ArtifactCacheKey::new(1, 10, 101));
    }
}
