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
use forge_importer::{TextureArtifact, TextureFormat};
use forge_reflect::{Status, StatusCode, Strid};
use uuid::Uuid;

/// Live texture: one base level plus the mip chain the importer baked,
/// ready to hand to a GPU driver's upload call. Grounded in the original
/// engine's `resource_loader_texture.cpp`, which does the same "deserialize
/// baked levels straight into a GPU-ready struct" step.
#[derive(Debug)]
pub struct TextureAsset {
    id: AssetId,
    uuid: Uuid,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub mips: Vec<Vec<u8>>,
}

impl Asset for TextureAsset {
    fn id(&self) -> &AssetId {
        &self.id
    }
    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn class_tag(&self) -> Strid {
        Strid::new("Texture")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct TextureLoader;

impl Loader for TextureLoader {
    fn fill_request(&self, _id: &AssetId, request: &mut LoadRequest) {
        request.want("data");
    }

    fn load(&self, ctx: &LoadContext, id: &AssetId, result: &LoadResult) -> Result<Arc<dyn Asset>, Status> {
        let bytes = result.get("data").ok_or(Status::new(StatusCode::NoAsset, "missing 'data' artifact"))?;
        let artifact = TextureArtifact::deserialize(&mut bytes.as_ref())
            .map_err(|e| Status::new(StatusCode::FailedDecode, e.to_string()))?;
        Ok(Arc::new(TextureAsset {
            id: id.clone(),
            uuid: ctx.meta().uuid,
            width: artifact.width,
            height: artifact.height,
            format: artifact.format,
            mips: artifact.mips,
        }))
    }
}
