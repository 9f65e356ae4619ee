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
use forge_importer::AudioArtifact;
use forge_reflect::{Status, StatusCode, Strid};
use uuid::Uuid;

#[derive(Debug)]
pub struct AudioAsset {
    id: AssetId,
    uuid: Uuid,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl Asset for AudioAsset {
    fn id(&self) -> &AssetId {
        &self.id
    }
    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn class_tag(&self) -> Strid {
        Strid::new("Audio")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct AudioLoader;

impl Loader for AudioLoader {
    fn fill_request(&self, _id: &AssetId, request: &mut LoadRequest) {
        request.want("data");
    }

    fn load(&self, ctx: &LoadContext, id: &AssetId, result: &LoadResult) -> Result<Arc<dyn Asset>, Status> {
        let bytes = result.get("data").ok_or(Status::new(StatusCode::NoAsset, "missing 'data' artifact"))?;
        let artifact = AudioArtifact::deserialize(&mut bytes.as_ref())
            .map_err(|e| Status::new(StatusCode::FailedDecode, e.to_string()))?;
        Ok(Arc::new(AudioAsset {
            id: id.clone(),
            uuid: ctx.meta().uuid,
            sample_rate: artifact.sample_rate,
            channels: artifact.channels,
            samples: artifact.samples,
        }))
    }
}
