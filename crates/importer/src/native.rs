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

use std::any::Any;
use std::path::Path;

use forge_assets::{AssetId, ImportData, SourceFile};
use forge_reflect::{Status, StatusCode, Strid};

use crate::importer::{ImportContext, ImportPreset, Importer};

pub const NATIVE_IMPORTER_VERSION: u32 = 1;

#[derive(Debug, Default)]
pub struct NativeImportData {
    source: Vec<SourceFile>,
}

impl NativeImportData {
    pub fn with_source(mut self, source: Vec<SourceFile>) -> Self {
        self.source = source;
        self
    }
}

impl ImportData for NativeImportData {
    fn source_files(&self) -> &[SourceFile] {
        &self.source
    }

    fn options_blob(&self) -> Vec<u8> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Passthrough for assets already authored as the binary artifact format —
/// the artifact *is* the source file's bytes, unchanged. Grounded in the
/// original engine's `asset/asset_native_loader.cpp`, which skips content
/// processing entirely for pre-baked assets.
#[derive(Debug, Default)]
pub struct NativeImporter;

impl Importer for NativeImporter {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["native"]
    }

    fn presets(&self, _path: &Path) -> Vec<ImportPreset> {
        vec![ImportPreset {
            name: "default",
            import_data_template: Box::new(NativeImportData::default()),
        }]
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
            Err(e) => return Status::new(StatusCode::FailedOpenFile, e.to_string()),
        };

        let id = AssetId::new(path.to_string_lossy().to_string());
        let import_data = NativeImportData {
            source: ctx.source_files().to_vec(),
        };
        ctx.emit(
            id,
            Strid::new("Native"),
            Strid::new("native-loader"),
            NATIVE_IMPORTER_VERSION,
            &import_data,
            vec![("data", bytes)],
        );

        Status::ok()
    }
}
