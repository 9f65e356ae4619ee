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

use std::{any::Any, collections::HashMap, path::Path};

use forge_assets::{AssetId, ImportData, ShaderFile, SourceFile};
use forge_reflect::{Status, StatusCode, Strid};
use serde::{Deserialize, Serialize};

use crate::importer::{ImportContext, ImportPreset, Importer};

pub const SHADER_IMPORTER_VERSION: u32 = 1;

/// The `.shader` YAML, deserialized, plus the text of every source module
/// it names, so the artifact is self-contained and the loader never has to
/// reopen the original files from disk. `extends` is left as a plain name —
/// merging it into a base's reflection is a load-time concern, since only
/// the loader's dependency graph guarantees the base is already resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderFileArtifact {
    pub file: ShaderFile,
    pub source_code: HashMap<String, String>,
}

fn extends_asset_id(path: &Path, extends: &str) -> AssetId {
    let sibling = path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{extends}.shader"));
    AssetId::new(sibling.to_string_lossy().to_string())
}

#[derive(Debug, Default)]
pub struct ShaderImportData {
    source: Vec<SourceFile>,
}

impl ShaderImportData {
    pub fn with_source(mut self, source: Vec<SourceFile>) -> Self {
        self.source = source;
        self
    }
}

impl ImportData for ShaderImportData {
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

/// Parses a `.shader` YAML description and bundles it with its referenced
/// source modules — grounded in the original engine's
/// `plugins/importers/code/shader_importer.cpp` and `grc/shader_file.hpp`.
/// The four-phase reflection/permutation/compile pipeline those sources feed
/// into lives downstream, in the shader reflection crate and its loader.
#[derive(Debug, Default)]
pub struct ShaderImporter;

impl ShaderImporter {
    fn parse(ctx: &mut ImportContext, path: &Path) -> Result<ShaderFile, Status> {
        let bytes = ctx
            .read_source(path)
            .map_err(|e| Status::new(StatusCode::FailedOpenFile, e.to_string()))?;
        serde_yaml::from_slice(&bytes).map_err(|e| Status::new(StatusCode::FailedParse, e.to_string()))
    }
}

impl Importer for ShaderImporter {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["shader"]
    }

    fn presets(&self, _path: &Path) -> Vec<ImportPreset> {
        vec![ImportPreset {
            name: "default",
            import_data_template: Box::new(ShaderImportData::default()),
        }]
    }

    fn collect_dependencies(
        &self,
        ctx: &mut ImportContext,
        path: &Path,
        _settings: &dyn ImportData,
    ) -> Status {
        let file = match Self::parse(ctx, path) {
            Ok(f) => f,
            Err(s) => return s,
        };
        if let Some(extends) = &file.extends {
            ctx.depend_on(extends_asset_id(path, extends));
        }
        Status::ok()
    }

    fn import(&self, ctx: &mut ImportContext, path: &Path, _settings: &dyn ImportData) -> Status {
        let file = match Self::parse(ctx, path) {
            Ok(f) => f,
            Err(s) => return s,
        };
        if let Some(extends) = &file.extends {
            ctx.depend_on(extends_asset_id(path, extends));
        }

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let mut source_code = HashMap::with_capacity(file.sources.len());
        for source in &file.sources {
            let source_path = base.join(&source.file);
            let bytes = match ctx.read_source(&source_path) {
                Ok(b) => b,
                Err(e) => return Status::new(StatusCode::FailedOpenFile, e.to_string()),
            };
            let text = match String::from_utf8(bytes) {
                Ok(t) => t,
                Err(e) => return Status::new(StatusCode::FailedDecode, e.to_string()),
            };
            source_code.insert(source.file.clone(), text);
        }

        let artifact = ShaderFileArtifact {
            file,
            source_code,
        };
        let bytes = match serde_json::to_vec(&artifact) {
            Ok(b) => b,
            Err(e) => return Status::new(StatusCode::FailedEncode, e.to_string()),
        };

        let id = AssetId::new(path.to_string_lossy().to_string());
        let import_data = ShaderImportData {
            source: ctx.source_files().to_vec(),
        };
        ctx.emit(
            id,
            Strid::new("Shader"),
            Strid::new("shader-loader"),
            SHADER_IMPORTER_VERSION,
            &import_data,
            vec![("file", bytes)],
        );

        Status::ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shader_file_artifact_round_trips_through_json() {
        let artifact = ShaderFileArtifact {
            file: ShaderFile {
                name: "lit".into(),
                extends: Some("base".into()),
                param_blocks: Vec::new(),
                techniques: Vec::new(),
                sources: vec![forge_assets::ShaderFileSource {
                    file: "lit.vert".into(),
                    module: "vertex".into(),
                }],
            },
            source_code: HashMap::from([("lit.vert".to_string(), "// vertex".to_string())]),
        };
        let bytes = serde_json::to_vec(&artifact).unwrap();
        let back: ShaderFileArtifact = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.file.name, "lit");
        assert_eq!(back.source_code.get("lit.vert").unwrap(), "// vertex");
    }
}
