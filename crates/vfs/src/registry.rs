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

use std::{path::Path, sync::Arc};

use forge_assets::{AssetId, AssetMeta};

use crate::{error::VfsError, pack::AssetPack};

/// Ordered list of mounted packs. The first pack (in mount order) that has
/// metadata for an asset wins — later packs never override an earlier one,
/// mirroring a typical content/mod layering where the base content pack is
/// mounted first and overrides would have to be mounted *before* it instead.
#[derive(Default)]
pub struct PackRegistry {
    packs: Vec<Arc<dyn AssetPack>>,
}

impl PackRegistry {
    pub fn new() -> Self {
        Self { packs: Vec::new() }
    }

    pub fn mount(&mut self, pack: Arc<dyn AssetPack>) {
        self.packs.push(pack);
    }

    pub fn packs(&self) -> &[Arc<dyn AssetPack>] {
        &self.packs
    }

    pub fn get_meta(&self, id: &AssetId) -> Result<AssetMeta, VfsError> {
        for pack in &self.packs {
            match pack.get_meta(id) {
                Ok(meta) => return Ok(meta),
                Err(VfsError::NoSuchAsset(_)) => continue,
                Err(other) => return Err(other),
            }
        }
        Err(VfsError::NoSuchAsset(id.name().to_string()))
    }

    /// Reads `path` from the first pack that has metadata for `id`, falling
    /// back to trying every pack in order if `id` is unknown (e.g. reading a
    /// shared include file that isn't itself an asset).
    pub fn read_file(&self, id: &AssetId, path: &Path) -> Result<Vec<u8>, VfsError> {
        for pack in &self.packs {
            if pack.get_meta(id).is_ok() {
                return pack.read_file(path);
            }
        }
        for pack in &self.packs {
            if let Ok(bytes) = pack.read_file(path) {
                return Ok(bytes);
            }
        }
        Err(VfsError::NotFound(path.display().to_string()))
    }
}

#[cfg(test)]
mod test {
    use forge_reflect::Strid;
    use parking_lot::Mutex;

    use super::*;

    struct FakePack {
        name: String,
        metas: Mutex<std::collections::HashMap<String, AssetMeta>>,
    }

    impl AssetPack for FakePack {
        fn name(&self) -> &str {
            &self.name
        }

        fn get_meta(&self, id: &AssetId) -> Result<AssetMeta, VfsError> {
            self.metas
                .lock()
                .get(id.name())
                .cloned()
                .ok_or_else(|| VfsError::NoSuchAsset(id.name().to_string()))
        }

        fn read_file(&self, _path: &Path) -> Result<Vec<u8>, VfsError> {
            unreachable!("not exercised in this test")
        }
    }

    fn meta_with_tag(tag: &str) -> AssetMeta {
        AssetMeta::new(Strid::new(tag), Strid::new("loader"), uuid::Uuid::nil())
    }

    #[test]
    fn earlier_mounted_pack_wins_on_conflict() {
        let mut base = std::collections::HashMap::new();
        base.insert("a".to_string(), meta_with_tag("Base"));
        let base_pack = Arc::new(FakePack {
            name: "base".into(),
            metas: Mutex::new(base),
        });

        let mut overlay = std::collections::HashMap::new();
        overlay.insert("a".to_string(), meta_with_tag("Overlay"));
        let overlay_pack = Arc::new(FakePack {
            name: "overlay".into(),
            metas: Mutex::new(overlay),
        });

        let mut registry = PackRegistry::new();
        registry.mount(base_pack);
        registry.mount(overlay_pack);

        let meta = registry.get_meta(&AssetId::new("a")).unwrap();
        assert_eq!(meta.class_tag, Strid::new("Base"));
    }

    #[test]
    fn unknown_asset_is_no_such_asset() {
        let registry = PackRegistry::new();
        assert!(matches!(
            registry.get_meta(&AssetId::new("x")),
            Err(VfsError::NoSuchAsset(_))
        ));
    }
}
