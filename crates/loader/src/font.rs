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

use forge_assets::{Asset, AssetId, AssetRef};
use forge_asset_manager::{LoadContext, LoadRequest, LoadResult, Loader};
use forge_common::BinaryDeserialization;
use forge_importer::{FontMetricsArtifact, GlyphInfo};
use forge_reflect::{Status, StatusCode, Strid};
use uuid::Uuid;

/// Live font: glyph metrics plus a lazy reference to its atlas texture.
/// The atlas is not re-derived here — it's the importer's hidden child
/// dependency (see `forge-importer::font`), already guaranteed resolved by
/// the time this loader runs.
#[derive(Debug)]
pub struct FontAsset {
    id: AssetId,
    uuid: Uuid,
    pub line_height: f32,
    pub glyphs: Vec<GlyphInfo>,
    pub atlas: AssetRef<dyn Asset>,
}

impl FontAsset {
    pub fn glyph(&self, codepoint: u32) -> Option<&GlyphInfo> {
        self.glyphs.iter().find(|g| g.codepoint == codepoint)
    }
}

impl Asset for FontAsset {
    fn id(&self) -> &AssetId {
        &self.id
    }
    fn uuid(&self) -> Uuid {
        self.uuid
    }
    fn class_tag(&self) -> Strid {
        Strid::new("Font")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct FontLoader;

impl Loader for FontLoader {
    fn fill_request(&self, _id: &AssetId, request: &mut LoadRequest) {
        request.want("metrics");
    }

    fn load(&self, ctx: &LoadContext, id: &AssetId, result: &LoadResult) -> Result<Arc<dyn Asset>, Status> {
        let bytes = result
            .get("metrics")
            .ok_or(Status::new(StatusCode::NoAsset, "missing 'metrics' artifact"))?;
        let artifact = FontMetricsArtifact::deserialize(&mut bytes.as_ref())
            .map_err(|e| Status::new(StatusCode::FailedDecode, e.to_string()))?;

        let atlas_id = ctx
            .meta()
            .deps
            .iter()
            .next()
            .cloned()
            .ok_or(Status::new(StatusCode::NoAsset, "font asset has no atlas dependency"))?;
        let atlas: AssetRef<dyn Asset> = AssetRef::new(atlas_id);
        atlas.resolve(|dep_id| ctx.find_dep(dep_id));

        Ok(Arc::new(FontAsset {
            id: id.clone(),
            uuid: ctx.meta().uuid,
            line_height: artifact.line_height,
            glyphs: artifact.glyphs,
            atlas,
        }))
    }
}
