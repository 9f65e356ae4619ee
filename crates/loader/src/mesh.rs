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

use std::{any::Any, sync::Arc};

use forge_assets::{Asset, AssetId};
use forge_asset_manager::{LoadContext, LoadRequest, LoadResult, Loader};
use forge_common::BinaryDeserialization;
use forge_importer::{MeshArtifact, MeshNode, Submesh};
use forge_reflect::{Status, StatusCode, Strid};
use uuid::Uuid;

/// Live mesh: the flattened vertex/index buffers, node graph and submesh
/// ranges baked by the importer. Material binding is out of scope (see
/// DESIGN.md); a submesh's `node` index is all a renderer needs to place it.
#[derive(Debug)]
pub struct MeshAsset {
    id: AssetId,
    uuid: Uuid,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub nodes: Vec<MeshNode>,
    pub submeshes: Vec<Submesh>,
}

impl Asset for MeshAsset {
    fn id(&self) -> &AssetId {
        &self.id
    }
    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn class_tag(&self) -> Strid {
        Strid::new("Mesh")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct MeshLoader;

impl Loader for MeshLoader {
    fn fill_request(&self, _id: &AssetId, request: &mut LoadRequest) {
        request.want("data");
    }

    fn load(&self, ctx: &LoadContext, id: &AssetId, result: &LoadResult) -> Result<Arc<dyn Asset>, Status> {
        let bytes = result.get("data").ok_or(Status::new(StatusCode::NoAsset, "missing 'data' artifact"))?;
        let artifact = MeshArtifact::deserialize(&mut bytes.as_ref())
            .map_err(|e| Status::new(StatusCode::FailedDecode, e.to_string()))?;
        Ok(Arc::new(MeshAsset {
            id: id.clone(),
            uuid: ctx.meta().uuid,
            positions: artifact.positions,
            normals: artifact.normals,
            uvs: artifact.uvs,
            indices: artifact.indices,
            nodes: artifact.nodes,
            submeshes: artifact.submeshes,
        }))
    }
}
