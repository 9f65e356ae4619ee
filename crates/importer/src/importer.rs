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

use std::{collections::HashSet, path::Path};

use forge_assets::{hash_bytes, AssetId, AssetMeta, ImportData, SourceFile};
use forge_reflect::{Status, Strid};
use forge_vfs::FileSystem;

/// One named starting point for an importer's settings, surfaced to tooling
/// (the CLI's `import` subcommand lists these so a user isn't left guessing
/// at an importer's options) — grounded in the teacher's per-purpose
/// `ImageSource::from_*` constructors, generalized into a named-template list.
pub struct ImportPreset {
    pub name: &'static str,
    pub import_data_template: Box<dyn ImportData>,
}

/// One asset an importer produced: its metadata record plus the raw,
/// uncompressed bytes for each tagged artifact it owns.
pub struct ImportedAsset {
    pub id: AssetId,
    pub meta: AssetMeta,
    pub artifacts: Vec<(&'static str, Vec<u8>)>,
}

/// Threaded through both importer phases. Tracks every source file actually
/// read (so the framework can build the cacheability hash without trusting
/// the importer to report it correctly) and every dependency asset declared,
/// and collects the assets an importer emits.
pub struct ImportContext<'a> {
    source_fs: &'a dyn FileSystem,
    sources: Vec<SourceFile>,
    deps: HashSet<AssetId>,
    produced: Vec<ImportedAsset>,
}

impl<'a> ImportContext<'a> {
    pub fn new(source_fs: &'a dyn FileSystem) -> Self {
        Self {
            source_fs,
            sources: Vec::new(),
            deps: HashSet::new(),
            produced: Vec::new(),
        }
    }

    /// Reads a source file and records its content hash for cache
    /// validation. Importers should read every source through this rather
    /// than the raw filesystem, or the artifact cache can't detect changes.
    pub fn read_source(&mut self, path: &Path) -> Result<Vec<u8>, forge_vfs::VfsError> {
        let bytes = self.source_fs.read_file(path)?;
        self.sources.push(SourceFile::new(path, hash_bytes(&bytes)));
        Ok(bytes)
    }

    pub fn depend_on(&mut self, id: AssetId) {
        self.deps.insert(id);
    }

    pub fn dependencies(&self) -> &HashSet<AssetId> {
        &self.deps
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.sources
    }

    /// Records one produced asset. `importer_version` and `import_data`
    /// together with the sources read so far become the artifact cache key
    /// the pipeline checks before rewriting anything to disk.
    pub fn emit(
        &mut self,
        id: AssetId,
        class_tag: Strid,
        loader_tag: Strid,
        importer_version: u32,
        import_data: &dyn ImportData,
        artifacts: Vec<(&'static str, Vec<u8>)>,
    ) {
        let mut meta = AssetMeta::new(class_tag, loader_tag, uuid::Uuid::new_v4());
        meta.version = importer_version;
        meta.import_data_blob = import_data.options_blob();
        meta.deps = self.deps.clone();
        self.produced.push(ImportedAsset {
            id,
            meta,
            artifacts,
        });
    }

    pub fn into_produced(self) -> Vec<ImportedAsset> {
        self.produced
    }
}

/// A stateless importer plugin: turns one source file on disk into one or
/// more assets. Every importer the pipeline knows about is registered by
/// file extension and run the same way regardless of what it produces.
pub trait Importer: Send + Sync {
    fn file_extensions(&self) -> &'static [&'static str];

    /// Named starting settings a caller can pick from instead of
    /// hand-building an [`ImportData`] — e.g. a texture importer offers
    /// "color", "normal", "data" presets for its purpose field.
    fn presets(&self, path: &Path) -> Vec<ImportPreset>;

    /// Declares every dependency asset this import will need (e.g. a glTF
    /// mesh's referenced textures) before `import` runs, so the caller can
    /// ensure they're importable first. Importers with no asset-level
    /// dependencies (textures, audio, native) return `Status::ok()` without
    /// touching `ctx`.
    fn collect_dependencies(
        &self,
        ctx: &mut ImportContext,
        path: &Path,
        settings: &dyn ImportData,
    ) -> Status;

    fn import(&self, ctx: &mut ImportContext, path: &Path, settings: &dyn ImportData) -> Status;
}
