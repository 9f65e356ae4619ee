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

use std::{any::Any, collections::HashMap, sync::Arc};

use forge_assets::{Asset, AssetId, ShaderFile};
use forge_asset_manager::{LoadContext, LoadRequest, LoadResult, Loader};
use forge_importer::ShaderFileArtifact;
use forge_reflect::{Status, StatusCode, Strid};
use forge_shader::{
    build_reflection, build_space_prologue, ShaderCache, ShaderCompileInputs, ShaderCompiler, ShaderModule,
    ShaderPlatform, ShaderReflection, SourceBuilder,
};
use forge_concurrency::{AsyncState, TaskManager};
use uuid::Uuid;

fn module_source_name(module: ShaderModule) -> &'static str {
    match module {
        ShaderModule::Vertex => "vertex",
        ShaderModule::Fragment => "fragment",
        ShaderModule::Compute => "compute",
    }
}

/// A live shader: the fully `extends`-merged description, its expanded
/// reflection, every source module's text, and a compiled-program cache
/// private to this asset. One instance is shared by every draw call using
/// this shader, so compiling a permutation once serves them all.
pub struct ShaderFileAsset {
    id: AssetId,
    uuid: Uuid,
    pub file: ShaderFile,
    pub reflection: ShaderReflection,
    pub source_code: HashMap<String, String>,
    pub cache: Arc<ShaderCache>,
}

impl std::fmt::Debug for ShaderFileAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderFileAsset").field("name", &self.file.name).finish()
    }
}

impl Asset for ShaderFileAsset {
    fn id(&self) -> &AssetId {
        &self.id
    }
    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn class_tag(&self) -> Strid {
        Strid::new("Shader")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ShaderFileAsset {
    /// Requests the compiled program for one module of a resolved
    /// permutation, compiling on first request and sharing the in-flight
    /// compile (or the finished program) with every later caller asking
    /// for the same `(platform, permutation, module)`.
    pub fn program(
        self: &Arc<Self>,
        tasks: &TaskManager,
        compiler: Arc<dyn ShaderCompiler>,
        platform: ShaderPlatform,
        technique_name: &str,
        pass_name: &str,
        options: &[(&str, &str)],
        vertex_attribute_mask: u32,
        module: ShaderModule,
    ) -> Result<AsyncState<Arc<forge_shader::GfxShaderProgram>>, Status> {
        let permutation =
            self.reflection
                .resolve_permutation(technique_name, pass_name, options, vertex_attribute_mask)?;

        let source_name = module_source_name(module);
        let source_file = self
            .file
            .sources
            .iter()
            .find(|s| s.module == source_name)
            .ok_or_else(|| Status::new(StatusCode::NoAsset, format!("shader has no '{source_name}' module")))?;
        let raw_source = self
            .source_code
            .get(&source_file.file)
            .cloned()
            .ok_or_else(|| Status::new(StatusCode::NoAsset, format!("missing source text for '{}'", source_file.file)))?;

        let shader_name = self.file.name.clone();
        let reflection = self.reflection.clone();
        let cache_key = ShaderCacheCompiler { reflection, module, raw_source, shader_name: shader_name.clone() };

        Ok(self.cache.get_or_create_program(
            tasks,
            platform,
            permutation,
            compiler,
            move || cache_key.build_inputs(),
        ))
    }
}

/// Assembles the owned `(name, module, source)` triple a compile needs,
/// built lazily on the worker thread so a cache hit never pays for it.
struct ShaderCacheCompiler {
    reflection: ShaderReflection,
    module: ShaderModule,
    raw_source: String,
    shader_name: String,
}

impl ShaderCacheCompiler {
    fn build_inputs(&self) -> ShaderCompileInputs {
        let mut builder = SourceBuilder::new();
        builder.set_version(450, true).set_module(self.module);
        build_space_prologue(&mut builder, &self.reflection);
        builder.add_source(&self.raw_source);
        ShaderCompileInputs {
            shader_name: self.shader_name.clone(),
            module: self.module,
            source: builder.emit(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ShaderLoader;

impl Loader for ShaderLoader {
    fn fill_request(&self, _id: &AssetId, request: &mut LoadRequest) {
        request.want("file");
    }

    fn load(&self, ctx: &LoadContext, id: &AssetId, result: &LoadResult) -> Result<Arc<dyn Asset>, Status> {
        let bytes = result.get("file").ok_or(Status::new(StatusCode::NoAsset, "missing 'file' artifact"))?;
        let artifact: ShaderFileArtifact =
            serde_json::from_slice(bytes).map_err(|e| Status::new(StatusCode::FailedDecode, e.to_string()))?;

        let (file, source_code) = match &artifact.file.extends {
            None => (artifact.file, artifact.source_code),
            Some(_) => {
                let base_id = ctx
                    .meta()
                    .deps
                    .iter()
                    .next()
                    .cloned()
                    .ok_or_else(|| Status::new(StatusCode::NoAsset, "shader declares extends but has no dependency"))?;
                let base = ctx
                    .find_dep(&base_id)
                    .ok_or_else(|| Status::new(StatusCode::NoAsset, "extends base not resolved"))?;
                let base = base
                    .as_any()
                    .downcast_ref::<ShaderFileAsset>()
                    .ok_or_else(|| Status::new(StatusCode::InvalidData, "extends base is not a shader asset"))?;

                let merged_file = ShaderFile::merge_extends(&base.file, &artifact.file);
                let mut merged_sources = base.source_code.clone();
                merged_sources.extend(artifact.source_code);
                (merged_file, merged_sources)
            }
        };

        let reflection = build_reflection(&file)?;

        Ok(Arc::new(ShaderFileAsset {
            id: id.clone(),
            uuid: ctx.meta().uuid,
            file,
            reflection,
            source_code,
            cache: Arc::new(ShaderCache::new()),
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn module_source_names_match_shader_file_convention() {
        assert_eq!("vertex", module_source_name(ShaderModule::Vertex));
        assert_eq!("fragment", module_source_name(ShaderModule::Fragment));
        assert_eq!("compute", module_source_name(ShaderModule::Compute));
    }
}
