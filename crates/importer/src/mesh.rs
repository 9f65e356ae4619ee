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

use std::{
    any::Any,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use forge_assets::{AssetId, ImportData, SourceFile};
use forge_common::{BinaryDeserialization, BinarySerialization};
use forge_reflect::{Status, StatusCode, Strid};

use crate::importer::{ImportContext, ImportPreset, Importer};

pub const MESH_IMPORTER_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct MeshNode {
    pub name: String,
    pub parent: Option<u32>,
    pub transform: [f32; 16],
}

impl BinarySerialization for MeshNode {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        self.name.clone().serialize(w)?;
        self.parent.serialize(w)?;
        self.transform.to_vec().serialize(w)
    }
}

impl BinaryDeserialization for MeshNode {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        let name = String::deserialize(r)?;
        let parent = Option::<u32>::deserialize(r)?;
        let transform_vec = Vec::<f32>::deserialize(r)?;
        let mut transform = [0f32; 16];
        transform.copy_from_slice(&transform_vec);
        Ok(Self {
            name,
            parent,
            transform,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Submesh {
    pub node: u32,
    pub first_index: u32,
    pub index_count: u32,
}

impl BinarySerialization for Submesh {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        self.node.serialize(w)?;
        self.first_index.serialize(w)?;
        self.index_count.serialize(w)
    }
}

impl BinaryDeserialization for Submesh {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        Ok(Self {
            node: u32::deserialize(r)?,
            first_index: u32::deserialize(r)?,
            index_count: u32::deserialize(r)?,
        })
    }
}

/// The flattened scene: one shared vertex/index buffer pair plus the node
/// graph and submesh ranges that index into it — grounded in
/// `dess-asset-pipeline::gltf_import.rs`'s `ModelAsset`/`StaticMeshGeometry`
/// split, simplified to positions/normals/uvs (material and skinning data are
/// out of scope; see DESIGN.md).
#[derive(Debug, Clone)]
pub struct MeshArtifact {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub nodes: Vec<MeshNode>,
    pub submeshes: Vec<Submesh>,
}

impl BinarySerialization for MeshArtifact {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        self.positions.iter().map(|p| p.to_vec()).collect::<Vec<_>>().serialize(w)?;
        self.normals.iter().map(|n| n.to_vec()).collect::<Vec<_>>().serialize(w)?;
        self.uvs.iter().map(|uv| uv.to_vec()).collect::<Vec<_>>().serialize(w)?;
        self.indices.serialize(w)?;
        self.nodes.serialize(w)?;
        self.submeshes.serialize(w)
    }
}

impl BinaryDeserialization for MeshArtifact {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        let positions = Vec::<Vec<f32>>::deserialize(r)?
            .into_iter()
            .map(|v| [v[0], v[1], v[2]])
            .collect();
        let normals = Vec::<Vec<f32>>::deserialize(r)?
            .into_iter()
            .map(|v| [v[0], v[1], v[2]])
            .collect();
        let uvs = Vec::<Vec<f32>>::deserialize(r)?
            .into_iter()
            .map(|v| [v[0], v[1]])
            .collect();
        let indices = Vec::<u32>::deserialize(r)?;
        let nodes = Vec::<MeshNode>::deserialize(r)?;
        let submeshes = Vec::<Submesh>::deserialize(r)?;
        Ok(Self {
            positions,
            normals,
            uvs,
            indices,
            nodes,
            submeshes,
        })
    }
}

#[derive(Debug, Default)]
pub struct MeshImportData {
    source: Vec<SourceFile>,
}

impl MeshImportData {
    pub fn with_source(mut self, source: Vec<SourceFile>) -> Self {
        self.source = source;
        self
    }
}

impl ImportData for MeshImportData {
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

#[derive(Debug, Default)]
pub struct MeshImporter;

impl MeshImporter {
    fn referenced_textures(document: &gltf::Document, base: &Path) -> Vec<PathBuf> {
        document
            .materials()
            .filter_map(|m| m.pbr_metallic_roughness().base_color_texture())
            .filter_map(|info| match info.texture().source().source() {
                gltf::image::Source::Uri { uri, .. } => Some(uri.to_string()),
                gltf::image::Source::View { .. } => None,
            })
            .map(|uri| base.join(uri))
            .collect()
    }
}

impl Importer for MeshImporter {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["gltf", "glb"]
    }

    fn presets(&self, _path: &Path) -> Vec<ImportPreset> {
        vec![ImportPreset {
            name: "default",
            import_data_template: Box::new(MeshImportData::default()),
        }]
    }

    fn collect_dependencies(
        &self,
        ctx: &mut ImportContext,
        path: &Path,
        _settings: &dyn ImportData,
    ) -> Status {
        let bytes = match ctx.read_source(path) {
            Ok(b) => b,
            Err(e) => return Status::new(StatusCode::FailedOpenFile, e.to_string()),
        };
        let document = match gltf::Gltf::from_slice(&bytes) {
            Ok(g) => g.document,
            Err(e) => return Status::new(StatusCode::FailedParse, e.to_string()),
        };
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for texture_path in Self::referenced_textures(&document, base) {
            ctx.depend_on(AssetId::new(texture_path.to_string_lossy().to_string()));
        }
        Status::ok()
    }

    fn import(&self, ctx: &mut ImportContext, path: &Path, _settings: &dyn ImportData) -> Status {
        let bytes = match ctx.read_source(path) {
            Ok(b) => b,
            Err(e) => return Status::new(StatusCode::FailedOpenFile, e.to_string()),
        };
        let (document, buffers, _images) = match gltf::import_slice(&bytes) {
            Ok(v) => v,
            Err(e) => return Status::new(StatusCode::FailedParse, e.to_string()),
        };

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        let mut indices = Vec::new();
        let mut nodes = Vec::new();
        let mut submeshes = Vec::new();

        for node in document.nodes() {
            let (translation, rotation, scale) = node.transform().decomposed();
            let transform = glam::Mat4::from_scale_rotation_translation(
                glam::Vec3::from(scale),
                glam::Quat::from_array(rotation),
                glam::Vec3::from(translation),
            );
            nodes.push(MeshNode {
                name: node.name().unwrap_or("node").to_string(),
                parent: None,
                transform: transform.to_cols_array(),
            });

            let Some(mesh) = node.mesh() else { continue };
            let node_index = nodes.len() as u32 - 1;
            for primitive in mesh.primitives() {
                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
                let base_vertex = positions.len() as u32;

                let Some(position_iter) = reader.read_positions() else { continue };
                for p in position_iter {
                    positions.push(p);
                }
                if let Some(normal_iter) = reader.read_normals() {
                    normals.extend(normal_iter);
                } else {
                    normals.resize(positions.len(), [0.0, 0.0, 1.0]);
                }
                if let Some(uv_iter) = reader.read_tex_coords(0) {
                    uvs.extend(uv_iter.into_f32());
                } else {
                    uvs.resize(positions.len(), [0.0, 0.0]);
                }

                let first_index = indices.len() as u32;
                if let Some(index_iter) = reader.read_indices() {
                    indices.extend(index_iter.into_u32().map(|i| i + base_vertex));
                }
                let index_count = indices.len() as u32 - first_index;
                submeshes.push(Submesh {
                    node: node_index,
                    first_index,
                    index_count,
                });
            }
        }

        let artifact = MeshArtifact {
            positions,
            normals,
            uvs,
            indices,
            nodes,
            submeshes,
        };
        let mut bytes = Vec::new();
        if let Err(e) = artifact.serialize(&mut bytes) {
            return Status::new(StatusCode::FailedEncode, e.to_string());
        }

        let id = AssetId::new(path.to_string_lossy().to_string());
        let import_data = MeshImportData {
            source: ctx.source_files().to_vec(),
        };
        ctx.emit(
            id,
            Strid::new("Mesh"),
            Strid::new("mesh-loader"),
            MESH_IMPORTER_VERSION,
            &import_data,
            vec![("data", bytes)],
        );

        Status::ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mesh_artifact_round_trips() {
        let artifact = MeshArtifact {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uvs: vec![[0.0, 0.0]; 3],
            indices: vec![0, 1, 2],
            nodes: vec![MeshNode {
                name: "root".into(),
                parent: None,
                transform: glam::Mat4::IDENTITY.to_cols_array(),
            }],
            submeshes: vec![Submesh {
                node: 0,
                first_index: 0,
                index_count: 3,
            }],
        };
        let mut buf = Vec::new();
        artifact.serialize(&mut buf).unwrap();
        let back = MeshArtifact::deserialize(&mut buf.as_slice()).unwrap();
        assert_eq!(artifact.positions, back.positions);
        assert_eq!(artifact.indices, back.indices);
        assert_eq!(artifact.submeshes.len(), back.submeshes.len());
    }
}
