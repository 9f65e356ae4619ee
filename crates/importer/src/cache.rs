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

use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use forge_assets::{artifact_relative_path, ArtifactCacheKey, AssetId};
use forge_io::{read_artifact_blob, write_artifact_blob};
use forge_vfs::FileSystem;

/// The `ArtifactCacheKey` sidecar tag every produced asset carries alongside
/// its real artifacts — comparing it against a freshly computed key is the
/// whole of the "re-import iff importer-version/import-data/sources changed"
/// rule from spec.md §4.6, without needing a separate asset database file the
/// way the teacher's `AssetDatabase` does it.
const CACHE_KEY_TAG: &str = "cachekey";

fn encode(key: ArtifactCacheKey) -> Vec<u8> {
    let mut buf = Vec::with_capacity(20);
    buf.write_u32::<LE>(key.importer_version).unwrap();
    buf.write_u64::<LE>(key.import_data_hash).unwrap();
    buf.write_u64::<LE>(key.source_content_hash_set).unwrap();
    buf
}

fn decode(bytes: &[u8]) -> Option<ArtifactCacheKey> {
    let mut r = bytes;
    let importer_version = r.read_u32::<LE>().ok()?;
    let import_data_hash = r.read_u64::<LE>().ok()?;
    let source_content_hash_set = r.read_u64::<LE>().ok()?;
    Some(ArtifactCacheKey::new(
        importer_version,
        import_data_hash,
        source_content_hash_set,
    ))
}

pub fn read_cache_key(output_fs: &dyn FileSystem, id: &AssetId) -> Option<ArtifactCacheKey> {
    let path = artifact_relative_path(id, CACHE_KEY_TAG);
    let raw = output_fs.read_file(&path).ok()?;
    decode(&read_artifact_blob(&raw).ok()?)
}

pub fn write_cache_key(
    output_fs: &dyn FileSystem,
    id: &AssetId,
    key: ArtifactCacheKey,
) -> Result<(), forge_vfs::VfsError> {
    let mut blob = Vec::new();
    write_artifact_blob(&encode(key), &mut blob)
        .map_err(|e| forge_vfs::VfsError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
    output_fs.write_file(&artifact_relative_path(id, CACHE_KEY_TAG), &blob)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cache_key_round_trips_through_encode_decode() {
        let key = ArtifactCacheKey::new(3, 111, 222);
        assert_eq!(Some(key), decode(&encode(key)));
    }
}
