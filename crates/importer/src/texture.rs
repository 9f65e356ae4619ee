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
use image::{imageops::FilterType, DynamicImage, GenericImageView};

use crate::importer::{ImportContext, ImportPreset, Importer};

pub const TEXTURE_IMPORTER_VERSION: u32 = 1;

/// How a texture's bytes are meant to be sampled — drives sRGB vs. linear
/// interpretation at load time. Grounded in `dess-asset-pipeline::image_import`'s
/// `ImagePurpose`; the BC5/BC7 block-compression path that purpose also drove
/// there is dropped here, since that compression only pays off against a real
/// GPU driver and this workspace's `forge-gpu` is explicitly driver-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TexturePurpose {
    Color,
    NonColor,
    Normals,
    Sprite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8Srgb,
    Rgba8Unorm,
}

impl TextureFormat {
    fn tag(self) -> u8 {
        match self {
            TextureFormat::Rgba8Srgb => 0,
            TextureFormat::Rgba8Unorm => 1,
        }
    }

    fn from_tag(tag: u8) -> io::Result<Self> {
        match tag {
            0 => Ok(TextureFormat::Rgba8Srgb),
            1 => Ok(TextureFormat::Rgba8Unorm),
            _ => Err(io::Error::new(io::ErrorKind::InvalidData, "bad texture format tag")),
        }
    }
}

/// The decoded texture artifact: one base level plus a full mip chain down to
/// 1x1, each level a tightly packed RGBA8 buffer.
#[derive(Debug, Clone)]
pub struct TextureArtifact {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub mips: Vec<Vec<u8>>,
}

impl BinarySerialization for TextureArtifact {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        self.width.serialize(w)?;
        self.height.serialize(w)?;
        self.format.tag().serialize(w)?;
        self.mips.serialize(w)
    }
}

impl BinaryDeserialization for TextureArtifact {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        let width = u32::deserialize(r)?;
        let height = u32::deserialize(r)?;
        let format = TextureFormat::from_tag(u8::deserialize(r)?)?;
        let mips = Vec::<Vec<u8>>::deserialize(r)?;
        Ok(Self {
            width,
            height,
            format,
            mips,
        })
    }
}

#[derive(Debug)]
pub struct TextureImportData {
    pub purpose: TexturePurpose,
    source: Vec<SourceFile>,
}

impl TextureImportData {
    pub fn new(purpose: TexturePurpose) -> Self {
        Self {
            purpose,
            source: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: Vec<SourceFile>) -> Self {
        self.source = source;
        self
    }
}

impl ImportData for TextureImportData {
    fn source_files(&self) -> &[SourceFile] {
        &self.source
    }

    fn options_blob(&self) -> Vec<u8> {
        serde_json::to_vec(&self.purpose).expect("TexturePurpose always serializes")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct TextureImporter;

impl Importer for TextureImporter {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["png", "jpg", "jpeg", "bmp", "tga"]
    }

    fn presets(&self, _path: &Path) -> Vec<ImportPreset> {
        vec![
            ImportPreset {
                name: "color",
                import_data_template: Box::new(TextureImportData::new(TexturePurpose::Color)),
            },
            ImportPreset {
                name: "data",
                import_data_template: Box::new(TextureImportData::new(TexturePurpose::NonColor)),
            },
            ImportPreset {
                name: "normal",
                import_data_template: Box::new(TextureImportData::new(TexturePurpose::Normals)),
            },
            ImportPreset {
                name: "sprite",
                import_data_template: Box::new(TextureImportData::new(TexturePurpose::Sprite)),
            },
        ]
    }

    fn collect_dependencies(
        &self,
        _ctx: &mut ImportContext,
        _path: &Path,
        _settings: &dyn ImportData,
    ) -> Status {
        // A texture never references other assets.
        Status::ok()
    }

    fn import(&self, ctx: &mut ImportContext, path: &Path, settings: &dyn ImportData) -> Status {
        let purpose = settings
            .as_any()
            .downcast_ref::<TextureImportData>()
            .map(|d| d.purpose)
            .unwrap_or(TexturePurpose::Color);

        let bytes = match ctx.read_source(path) {
            Ok(b) => b,
            Err(e) => return Status::new(StatusCode::FailedOpenFile, e.to_string()),
        };

        let image = match image::load_from_memory(&bytes) {
            Ok(i) => i,
            Err(e) => return Status::new(StatusCode::FailedDecode, e.to_string()),
        };

        let (width, height) = image.dimensions();
        let format = if purpose == TexturePurpose::Color {
            TextureFormat::Rgba8Srgb
        } else {
            TextureFormat::Rgba8Unorm
        };

        let mut mips = vec![image.to_rgba8().into_raw()];
        let mut current = image;
        let (mut w, mut h) = (width, height);
        while w > 1 || h > 1 {
            w = (w / 2).max(1);
            h = (h / 2).max(1);
            current = DynamicImage::ImageRgba8(current.resize_exact(w, h, FilterType::Lanczos3).to_rgba8());
            mips.push(current.to_rgba8().into_raw());
        }

        let artifact = TextureArtifact {
            width,
            height,
            format,
            mips,
        };
        let mut bytes = Vec::new();
        if let Err(e) = artifact.serialize(&mut bytes) {
            return Status::new(StatusCode::FailedEncode, e.to_string());
        }

        let id = AssetId::new(path.to_string_lossy().to_string());
        let import_data = TextureImportData {
            purpose,
            source: ctx.source_files().to_vec(),
        };
        ctx.emit(
            id,
            Strid::new("Texture"),
            Strid::new("texture-loader"),
            TEXTURE_IMPORTER_VERSION,
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
    fn texture_artifact_round_trips() {
        let artifact = TextureArtifact {
            width: 2,
            height: 2,
            format: TextureFormat::Rgba8Unorm,
            mips: vec![vec![1, 2, 3, 4, 5, 6, 7, 8], vec![9, 10, 11, 12]],
        };
        let mut buf = Vec::new();
        artifact.serialize(&mut buf).unwrap();
        let back = TextureArtifact::deserialize(&mut buf.as_slice()).unwrap();
        assert_eq!(artifact.width, back.width);
        assert_eq!(artifact.mips, back.mips);
        assert_eq!(artifact.format, back.format);
    }
}
