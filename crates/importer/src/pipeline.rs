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

use std::{collections::HashMap, path::Path, sync::Arc};

use forge_assets::{artifact_relative_path, hash_source_set, ArtifactCacheKey, ImportData};
use forge_io::write_artifact_blob;
use forge_reflect::{Status, StatusCode};
use forge_vfs::FileSystem;

use crate::{
    cache::{read_cache_key, write_cache_key},
    importer::{ImportContext, Importer},
};

/// Drives importers against a content-source filesystem, writing produced
/// `.res` files and artifacts into an output pack directory and skipping the
/// rewrite when the artifact cache key hasn't changed — the "framework"
/// spec.md §4.6 describes sitting above individual `Importer` plugins,
/// grounded in the teacher's `AssetPipeline::process_assets` driver loop
/// (there keyed by source mtime; here by content hash per the cacheability
/// contract in spec.md §4.4).
pub struct ImportPipeline {
    source_fs: Arc<dyn FileSystem>,
    output_fs: Arc<dyn FileSystem>,
    importers: Vec<Arc<dyn Importer>>,
    by_extension: HashMap<String, usize>,
}

impl ImportPipeline {
    pub fn new(source_fs: Arc<dyn FileSystem>, output_fs: Arc<dyn FileSystem>) -> Self {
        Self {
            source_fs,
            output_fs,
            importers: Vec::new(),
            by_extension: HashMap::new(),
        }
    }

    pub fn register(&mut self, importer: Arc<dyn Importer>) {
        let index = self.importers.len();
        for ext in importer.file_extensions() {
            self.by_extension.insert(ext.to_ascii_lowercase(), index);
        }
        self.importers.push(importer);
    }

    pub fn find_importer(&self, path: &Path) -> Option<&Arc<dyn Importer>> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.by_extension
            .get(&ext)
            .map(|&index| &self.importers[index])
    }

    /// Runs `collect_dependencies` then `import` for `path`, and writes every
    /// produced asset whose cache key doesn't match what's already on disk.
    pub fn import_file(&self, path: &Path, settings: &dyn ImportData) -> Status {
        let Some(importer) = self.find_importer(path) else {
            return Status::new(
                StatusCode::NotImplemented,
                format!("no importer registered for {}", path.display()),
            );
        };

        let mut ctx = ImportContext::new(self.source_fs.as_ref());

        let status = importer.collect_dependencies(&mut ctx, path, settings);
        if status.is_error() {
            return status;
        }

        let status = importer.import(&mut ctx, path, settings);
        if status.is_error() {
            return status;
        }

        for asset in ctx.into_produced() {
            let key = ArtifactCacheKey::new(
                asset.meta.version,
                forge_assets::hash_bytes(&asset.meta.import_data_blob),
                hash_source_set(settings.source_files()),
            );

            if read_cache_key(self.output_fs.as_ref(), &asset.id) == Some(key) {
                log::debug!("'{}' is up to date, skipping rewrite", asset.id);
                continue;
            }

            let res_path = forge_vfs_res_path(&asset.id);
            if let Err(e) = self
                .output_fs
                .write_file(&res_path, &forge_vfs::write_res(&asset.meta))
            {
                return Status::new(StatusCode::FailedWrite, e.to_string());
            }

            for (tag, bytes) in &asset.artifacts {
                let mut blob = Vec::new();
                if let Err(e) = write_artifact_blob(bytes, &mut blob) {
                    return Status::new(StatusCode::FailedEncode, e.to_string());
                }
                let artifact_path = artifact_relative_path(&asset.id, tag);
                if let Err(e) = self.output_fs.write_file(&artifact_path, &blob) {
                    return Status::new(StatusCode::FailedWrite, e.to_string());
                }
            }

            if let Err(e) = write_cache_key(self.output_fs.as_ref(), &asset.id, key) {
                return Status::new(StatusCode::FailedWrite, e.to_string());
            }

            log::info!("imported '{}'", asset.id);
        }

        Status::ok()
    }
}

fn forge_vfs_res_path(id: &forge_assets::AssetId) -> std::path::PathBuf {
    std::path::PathBuf::from(format!("{}.res", id.name()))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use forge_assets::{AssetId, SourceFile};
    use forge_reflect::{Status, Strid};
    use forge_vfs::OsFileSystem;

    use super::*;
    use crate::importer::ImportPreset;

    #[derive(Debug)]
    struct EchoImportData {
        source: Vec<SourceFile>,
    }
    impl ImportData for EchoImportData {
        fn source_files(&self) -> &[SourceFile] {
            &self.source
        }
        fn options_blob(&self) -> Vec<u8> {
            Vec::new()
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[derive(Default)]
    struct EchoImporter;
    impl Importer for EchoImporter {
        fn file_extensions(&self) -> &'static [&'static str] {
            &["echo"]
        }
        fn presets(&self, _path: &Path) -> Vec<ImportPreset> {
            Vec::new()
        }
        fn collect_dependencies(
            &self,
            _ctx: &mut ImportContext,
            _path: &Path,
            _settings: &dyn ImportData,
        ) -> Status {
            Status::ok()
        }
        fn import(&self, ctx: &mut ImportContext, path: &Path, _settings: &dyn ImportData) -> Status {
            let bytes = match ctx.read_source(path) {
                Ok(b) => b,
                Err(e) => return Status::new(StatusCode::FailedRead, e.to_string()),
            };
            let id = AssetId::new(path.to_string_lossy().to_string());
            ctx.emit(
                id,
                Strid::new("Echo"),
                Strid::new("echo-loader"),
                1,
                &EchoImportData { source: Vec::new() },
                vec![("data", bytes)],
            );
            Status::ok()
        }
    }

    #[test]
    fn reimports_only_when_source_changes() {
        let source_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        std::fs::write(source_dir.path().join("a.echo"), b"v1").unwrap();

        let source_fs = Arc::new(OsFileSystem::new(source_dir.path()));
        let output_fs: Arc<dyn FileSystem> = Arc::new(OsFileSystem::new(output_dir.path()));
        let mut pipeline = ImportPipeline::new(source_fs, output_fs.clone());
        pipeline.register(Arc::new(EchoImporter));

        let settings = EchoImportData {
            source: vec![SourceFile::new("a.echo", forge_assets::hash_bytes(b"v1"))],
        };
        let status = pipeline.import_file(Path::new("a.echo"), &settings);
        assert!(status.is_ok());
        assert!(output_fs.exists(std::path::Path::new("a.echo.res")));

        let first_write = output_fs
            .read_file(std::path::Path::new("a.echo.data.artifact"))
            .unwrap();

        // Re-running with the same settings and source content is a no-op.
        let status = pipeline.import_file(Path::new("a.echo"), &settings);
        assert!(status.is_ok());
        let second_write = output_fs
            .read_file(std::path::Path::new("a.echo.data.artifact"))
            .unwrap();
        assert_eq!(first_write, second_write);

        // Changing the source content forces a rewrite.
        std::fs::write(source_dir.path().join("a.echo"), b"v2-longer").unwrap();
        let changed_settings = EchoImportData {
            source: vec![SourceFile::new("a.echo", forge_assets::hash_bytes(b"v2-longer"))],
        };
        let status = pipeline.import_file(Path::new("a.echo"), &changed_settings);
        assert!(status.is_ok());
        let third_write = output_fs
            .read_file(std::path::Path::new("a.echo.data.artifact"))
            .unwrap();
        assert_ne!(first_write, third_write);
    }
}
