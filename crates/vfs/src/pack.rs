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

use std::path::{Path, PathBuf};

use forge_assets::{AssetId, AssetMeta};

use crate::{
    error::VfsError,
    file_system::{FileSystem, OsFileSystem},
    res_format,
};

/// A named, ordered source of assets. Mirrors the original `Archive` trait —
/// `get_meta` replaces `open`'s raw byte stream with the already-parsed
/// `.res` record, since every caller of a pack wants the metadata, not the
/// bytes, and `read_file` stays for the artifact/source payload itself.
pub trait AssetPack: Send + Sync {
    fn name(&self) -> &str;
    fn get_meta(&self, id: &AssetId) -> Result<AssetMeta, VfsError>;
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, VfsError>;
}

/// A pack backed by a loose directory tree: `<root>/<id>.res` holds the YAML
/// metadata, sibling files hold artifact/source bytes referenced from it.
/// Grounded on `dess-vfs::directory`'s on-disk archive, simplified to loose
/// files since there's no packed-archive format in this spec.
pub struct DirectoryPack {
    name: String,
    fs: OsFileSystem,
    root: PathBuf,
}

impl DirectoryPack {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            name: name.into(),
            fs: OsFileSystem::new(&root),
            root,
        }
    }

    fn res_path(&self, id: &AssetId) -> PathBuf {
        // Every `AssetId` in this workspace is the literal source path
        // including its extension (`"brick.png"`, not `"brick"`), and the
        // importer writes `.res` records by appending, not replacing — this
        // has to match `forge_vfs_res_path` in `forge-importer::pipeline`
        // exactly or nothing written by the pipeline is ever found here.
        PathBuf::from(format!("{}.res", id.name()))
    }
}

impl AssetPack for DirectoryPack {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_meta(&self, id: &AssetId) -> Result<AssetMeta, VfsError> {
        let rel = self.res_path(id);
        if !self.fs.exists(&rel) {
            return Err(VfsError::NoSuchAsset(id.name().to_string()));
        }
        let bytes = self.fs.read_file(&rel)?;
        res_format::parse_res(&bytes)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, VfsError> {
        self.fs.read_file(path)
    }
}

impl DirectoryPack {
    /// Path to the directory this pack reads from, for callers that need to
    /// resolve a relative artifact path returned from an `AssetMeta`.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod test {
    use forge_reflect::Strid;

    use super::*;

    fn write_res_for(dir: &Path, id: &str) {
        let meta = AssetMeta::new(Strid::new("Texture"), Strid::new("texture-loader"), uuid::Uuid::nil());
        let bytes = res_format::write_res(&meta);
        let fs = OsFileSystem::new(dir);
        fs.write_file(&PathBuf::from(format!("{id}.res")), &bytes).unwrap();
    }

    #[test]
    fn reads_metadata_for_known_asset() {
        let dir = tempfile::tempdir().unwrap();
        write_res_for(dir.path(), "textures/rock");

        let pack = DirectoryPack::new("content", dir.path());
        let meta = pack.get_meta(&AssetId::new("textures/rock")).unwrap();
        assert_eq!(meta.class_tag, Strid::new("Texture"));
    }

    #[test]
    fn missing_asset_is_no_such_asset() {
        let dir = tempfile::tempdir().unwrap();
        let pack = DirectoryPack::new("content", dir.path());
        assert!(matches!(
            pack.get_meta(&AssetId::new("nope")),
            Err(VfsError::NoSuchAsset(_))
        ));
    }

    #[test]
    fn reads_metadata_for_asset_id_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        write_res_for(dir.path(), "brick.png");

        let pack = DirectoryPack::new("content", dir.path());
        let meta = pack.get_meta(&AssetId::new("brick.png")).unwrap();
        assert_eq!(meta.class_tag, Strid::new("Texture"));
    }
}
