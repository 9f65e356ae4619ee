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
use forge_reflect::{Status, StatusCode, Strid};
use uuid::Uuid;

/// Passthrough asset: the artifact bytes, held verbatim. Matches the
/// importer's "artifact is the source" contract for pre-baked content.
#[derive(Debug)]
pub struct NativeAsset {
    id: AssetId,
    uuid: Uuid,
    pub bytes: Arc<[u8]>,
}

impl Asset for NativeAsset {
    fn id(&self) -> &AssetId {
        &self.id
    }
    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn class_tag(&self) -> Strid {
        Strid::new("Native")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct NativeLoader;

impl Loader for NativeLoader {
    fn fill_request(&self, _id: &AssetId, request: &mut LoadRequest) {
        request.want("data");
    }

    fn load(&self, ctx: &LoadContext, id: &AssetId, result: &LoadResult) -> Result<Arc<dyn Asset>, Status> {
        let bytes = result.get("data").ok_or(Status::new(StatusCode::NoAsset, "missing 'data' artifact"))?;
        Ok(Arc::new(NativeAsset {
            id: id.clone(),
            uuid: ctx.meta().uuid,
            bytes: bytes.clone(),
        }))
    }
}
