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
    path::Path,
};

use forge_assets::{AssetId, ImportData, SourceFile};
use forge_common::{BinaryDeserialization, BinarySerialization};
use forge_reflect::{Status, StatusCode, Strid};
use fontdue::{Font, FontSettings};

use crate::importer::{ImportContext, ImportPreset, Importer};

pub const FONT_IMPORTER_VERSION: u32 = 1;

/// First and last printable ASCII codepoint baked into every glyph atlas.
/// A fixed, small charset keeps the atlas layout simple — no teacher
/// equivalent exists for this importer, so it is built in the teacher's
/// importer idiom (stateless plugin producing an in-memory artifact) from
/// the original engine's `freetype_font_importer.cpp`/`freetype_font.cpp`.
const FIRST_CODEPOINT: u32 = 0x20;
const LAST_CODEPOINT: u32 = 0x7e;

#[derive(Debug, Clone, Copy)]
pub struct GlyphInfo {
    pub codepoint: u32,
    pub atlas_x: u32,
    pub atlas_y: u32,
    pub width: u32,
    pub height: u32,
    pub advance: f32,
    pub bearing_x: f32,
    pub bearing_y: f32,
}

impl BinarySerialization for GlyphInfo {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        self.codepoint.serialize(w)?;
        self.atlas_x.serialize(w)?;
        self.atlas_y.serialize(w)?;
        self.width.serialize(w)?;
        self.height.serialize(w)?;
        self.advance.serialize(w)?;
        self.bearing_x.serialize(w)?;
        self.bearing_y.serialize(w)
    }
}

impl BinaryDeserialization for GlyphInfo {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        Ok(Self {
            codepoint: u32::deserialize(r)?,
            atlas_x: u32::deserialize(r)?,
            atlas_y: u32::deserialize(r)?,
            width: u32::deserialize(r)?,
            height: u32::deserialize(r)?,
            advance: f32::deserialize(r)?,
            bearing_x: f32::deserialize(r)?,
            bearing_y: f32::deserialize(r)?,
        })
    }
}

/// The atlas asset's own artifact: single-channel (coverage) pixels, same
/// packed-buffer shape a texture artifact's base level would have.
#[derive(Debug, Clone)]
pub struct FontAtlasArtifact {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl BinarySerialization for FontAtlasArtifact {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        self.width.serialize(w)?;
        self.height.serialize(w)?;
        self.pixels.serialize(w)
    }
}

impl BinaryDeserialization for FontAtlasArtifact {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        Ok(Self {
            width: u32::deserialize(r)?,
            height: u32::deserialize(r)?,
            pixels: Vec::<u8>::deserialize(r)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FontMetricsArtifact {
    pub line_height: f32,
    pub glyphs: Vec<GlyphInfo>,
}

impl BinarySerialization for FontMetricsArtifact {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        self.line_height.serialize(w)?;
        self.glyphs.serialize(w)
    }
}

impl BinaryDeserialization for FontMetricsArtifact {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        Ok(Self {
            line_height: f32::deserialize(r)?,
            glyphs: Vec::<GlyphInfo>::deserialize(r)?,
        })
    }
}

#[derive(Debug)]
pub struct FontImportData {
    pub pixel_size: f32,
    source: Vec<SourceFile>,
}

impl FontImportData {
    pub fn new(pixel_size: f32) -> Self {
        Self {
            pixel_size,
            source: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: Vec<SourceFile>) -> Self {
        self.source = source;
        self
    }
}

impl ImportData for FontImportData {
    fn source_files(&self) -> &[SourceFile] {
        &self.source
    }

    fn options_blob(&self) -> Vec<u8> {
        self.pixel_size.to_le_bytes().to_vec()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct FontImporter;

impl Importer for FontImporter {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["ttf"]
    }

    fn presets(&self, _path: &Path) -> Vec<ImportPreset> {
        vec![ImportPreset {
            name: "default",
            import_data_template: Box::new(FontImportData::new(32.0)),
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

    fn import(&self, ctx: &mut ImportContext, path: &Path, settings: &dyn ImportData) -> Status {
        let pixel_size = settings
            .as_any()
            .downcast_ref::<FontImportData>()
            .map(|d| d.pixel_size)
            .unwrap_or(32.0);

        let bytes = match ctx.read_source(path) {
            Ok(b) => b,
            Err(e) => return Status::new(StatusCode::FailedOpenFile, e.to_string()),
        };

        let font = match Font::from_bytes(bytes, FontSettings::default()) {
            Ok(f) => f,
            Err(e) => return Status::new(StatusCode::FailedParse, e.to_string()),
        };

        let rasterized: Vec<(u32, fontdue::Metrics, Vec<u8>)> = (FIRST_CODEPOINT..=LAST_CODEPOINT)
            .filter_map(|codepoint| char::from_u32(codepoint))
            .map(|c| {
                let (metrics, bitmap) = font.rasterize(c, pixel_size);
                (c as u32, metrics, bitmap)
            })
            .collect();

        // Shelf-pack the glyphs left to right into rows capped at 512px wide.
        const ATLAS_WIDTH: u32 = 512;
        let mut glyphs = Vec::with_capacity(rasterized.len());
        let (mut cursor_x, mut cursor_y, mut row_height) = (0u32, 0u32, 0u32);
        let mut rows: Vec<(u32, u32, u32, Vec<(u32, fontdue::Metrics, Vec<u8>, u32)>)> = Vec::new();
        let mut current_row = Vec::new();

        for (codepoint, metrics, bitmap) in rasterized {
            let width = metrics.width as u32;
            if cursor_x + width > ATLAS_WIDTH && cursor_x > 0 {
                rows.push((cursor_y, row_height, ATLAS_WIDTH, std::mem::take(&mut current_row)));
                cursor_y += row_height;
                cursor_x = 0;
                row_height = 0;
            }
            current_row.push((codepoint, metrics, bitmap, cursor_x));
            cursor_x += width;
            row_height = row_height.max(metrics.height as u32);
        }
        rows.push((cursor_y, row_height, ATLAS_WIDTH, current_row));
        let atlas_height = cursor_y + row_height;

        let mut atlas = vec![0u8; (ATLAS_WIDTH as usize) * (atlas_height as usize)];
        for (row_y, _row_height, _row_width, entries) in rows {
            for (codepoint, metrics, bitmap, x) in entries {
                let (width, height) = (metrics.width as u32, metrics.height as u32);
                for y in 0..height {
                    let src = &bitmap[(y * width) as usize..((y + 1) * width) as usize];
                    let dst_row_start = ((row_y + y) * ATLAS_WIDTH + x) as usize;
                    atlas[dst_row_start..dst_row_start + width as usize].copy_from_slice(src);
                }
                glyphs.push(GlyphInfo {
                    codepoint,
                    atlas_x: x,
                    atlas_y: row_y,
                    width,
                    height,
                    advance: metrics.advance_width,
                    bearing_x: metrics.xmin as f32,
                    bearing_y: metrics.ymin as f32,
                });
            }
        }

        let atlas_artifact = FontAtlasArtifact {
            width: ATLAS_WIDTH,
            height: atlas_height,
            pixels: atlas,
        };
        let mut atlas_bytes = Vec::new();
        if let Err(e) = atlas_artifact.serialize(&mut atlas_bytes) {
            return Status::new(StatusCode::FailedEncode, e.to_string());
        }

        let font_source = ctx.source_files().to_vec();
        let atlas_id = AssetId::new(format!("{}#atlas", path.to_string_lossy()));
        let atlas_import_data = FontImportData {
            pixel_size,
            source: font_source.clone(),
        };
        ctx.emit(
            atlas_id.clone(),
            Strid::new("Texture"),
            Strid::new("texture-loader"),
            FONT_IMPORTER_VERSION,
            &atlas_import_data,
            vec![("data", atlas_bytes)],
        );

        // The font asset depends on its own atlas texture — a dependency the
        // caller never asked for directly, exercised by the hidden-child-
        // dependency scenario the loader framework (C7) covers.
        ctx.depend_on(atlas_id);

        let metrics_artifact = FontMetricsArtifact {
            line_height: pixel_size * 1.2,
            glyphs,
        };
        let mut metrics_bytes = Vec::new();
        if let Err(e) = metrics_artifact.serialize(&mut metrics_bytes) {
            return Status::new(StatusCode::FailedEncode, e.to_string());
        }

        let font_id = AssetId::new(path.to_string_lossy().to_string());
        let font_import_data = FontImportData {
            pixel_size,
            source: font_source,
        };
        ctx.emit(
            font_id,
            Strid::new("Font"),
            Strid::new("font-loader"),
            FONT_IMPORTER_VERSION,
            &font_import_data,
            vec![("metrics", metrics_bytes)],
        );

        Status::ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn glyph_info_round_trips() {
        let glyph = GlyphInfo {
            codepoint: 'A' as u32,
            atlas_x: 10,
            atlas_y: 20,
            width: 12,
            height: 14,
            advance: 8.5,
            bearing_x: 0.5,
            bearing_y: -1.0,
        };
        let mut buf = Vec::new();
        glyph.serialize(&mut buf).unwrap();
        let back = GlyphInfo::deserialize(&mut buf.as_slice()).unwrap();
        assert_eq!(glyph.codepoint, back.codepoint);
        assert_eq!(glyph.width, back.width);
        assert_eq!(glyph.advance, back.advance);
    }
}
