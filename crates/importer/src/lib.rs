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

//! C6 — the import pipeline: a registry of stateless [`Importer`] plugins
//! run by an [`ImportPipeline`] that turns source files into artifact blobs
//! through the shared `.res`/artifact framing, skipping rewrites a content-
//! addressed cache key shows are already current.
//!
//! Grounded in `dess-asset-pipeline`'s `AssetPipeline`/`ContentImporter`
//! split and the original engine's `plugins/importers/code/*_importer.cpp`.

mod audio;
mod cache;
mod font;
mod importer;
mod mesh;
mod native;
mod pipeline;
mod shader_import;
mod texture;

pub use audio::{AudioArtifact, AudioImportData, AudioImporter, AUDIO_IMPORTER_VERSION};
pub use font::{
    FontAtlasArtifact, FontImportData, FontImporter, FontMetricsArtifact, GlyphInfo,
    FONT_IMPORTER_VERSION,
};
pub use importer::{ImportContext, ImportPreset, Importer, ImportedAsset};
pub use mesh::{MeshArtifact, MeshImportData, MeshImporter, MeshNode, Submesh, MESH_IMPORTER_VERSION};
pub use native::{NativeImportData, NativeImporter, NATIVE_IMPORTER_VERSION};
pub use pipeline::ImportPipeline;
pub use shader_import::{ShaderFileArtifact, ShaderImportData, ShaderImporter, SHADER_IMPORTER_VERSION};
pub use texture::{
    TextureArtifact, TextureFormat, TextureImportData, TextureImporter, TexturePurpose,
    TEXTURE_IMPORTER_VERSION,
};

/// Builds a pipeline with every provided importer already registered —
/// the set the CLI's `import` subcommand and the default tool wiring use.
pub fn default_pipeline(
    source_fs: std::sync::Arc<dyn forge_vfs::FileSystem>,
    output_fs: std::sync::Arc<dyn forge_vfs::FileSystem>,
) -> ImportPipeline {
    let mut pipeline = ImportPipeline::new(source_fs, output_fs);
    pipeline.register(std::sync::Arc::new(TextureImporter));
    pipeline.register(std::sync::Arc::new(FontImporter));
    pipeline.register(std::sync::Arc::new(MeshImporter));
    pipeline.register(std::sync::Arc::new(AudioImporter));
    pipeline.register(std::sync::Arc::new(NativeImporter));
    pipeline.register(std::sync::Arc::new(ShaderImporter));
    pipeline
}
