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

use crate::importer::{ImportContext, ImportPreset, Importer};

pub const AUDIO_IMPORTER_VERSION: u32 = 1;

/// Decoded PCM: interleaved `i16` samples at `sample_rate`, grounded in the
/// original engine's `resource/audio_stream_wav.cpp` (WAV decode straight to
/// an in-memory PCM buffer, no streaming).
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl BinarySerialization for AudioArtifact {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        self.sample_rate.serialize(w)?;
        self.channels.serialize(w)?;
        self.samples.iter().map(|s| *s as i32).collect::<Vec<_>>().serialize(w)
    }
}

impl BinaryDeserialization for AudioArtifact {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        let sample_rate = u32::deserialize(r)?;
        let channels = u16::deserialize(r)?;
        let samples = Vec::<i32>::deserialize(r)?.into_iter().map(|s| s as i16).collect();
        Ok(Self {
            sample_rate,
            channels,
            samples,
        })
    }
}

#[derive(Debug, Default)]
pub struct AudioImportData {
    source: Vec<SourceFile>,
}

impl AudioImportData {
    /// Attaches the caller's own content-hashed source list, so the pipeline's
    /// cache key actually tracks this file instead of comparing against an
    /// empty source set every time.
    pub fn with_source(mut self, source: Vec<SourceFile>) -> Self {
        self.source = source;
        self
    }
}

impl ImportData for AudioImportData {
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
pub struct AudioImporter;

impl Importer for AudioImporter {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["wav"]
    }

    fn presets(&self, _path: &Path) -> Vec<ImportPreset> {
        vec![ImportPreset {
            name: "default",
            import_data_template: Box::new(AudioImportData::default()),
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

    fn import(&self, ctx: &mut ImportContext, path: &Path, _settings: &dyn ImportData) -> Status {
        let bytes = match ctx.read_source(path) {
            Ok(b) => b,
            Err(e) => return Status::new(StatusCode::FailedOpenFile, e.to_string()),
        };

        let mut reader = match hound::WavReader::new(io::Cursor::new(bytes)) {
            Ok(r) => r,
            Err(e) => return Status::new(StatusCode::FailedParse, e.to_string()),
        };
        let spec = reader.spec();

        let samples: Result<Vec<i16>, hound::Error> = match spec.sample_format {
            hound::SampleFormat::Int => reader.samples::<i16>().collect(),
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(|s| (s * i16::MAX as f32) as i16))
                .collect(),
        };
        let samples = match samples {
            Ok(s) => s,
            Err(e) => return Status::new(StatusCode::FailedDecode, e.to_string()),
        };

        let artifact = AudioArtifact {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        };
        let mut bytes = Vec::new();
        if let Err(e) = artifact.serialize(&mut bytes) {
            return Status::new(StatusCode::FailedEncode, e.to_string());
        }

        let id = AssetId::new(path.to_string_lossy().to_string());
        let import_data = AudioImportData {
            source: ctx.source_files().to_vec(),
        };
        ctx.emit(
            id,
            Strid::new("Audio"),
            Strid::new("audio-loader"),
            AUDIO_IMPORTER_VERSION,
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
    fn audio_artifact_round_trips() {
        let artifact = AudioArtifact {
            sample_rate: 44100,
            channels: 2,
            samples: vec![0, 1000, -1000, 32000],
        };
        let mut buf = Vec::new();
        artifact.serialize(&mut buf).unwrap();
        let back = AudioArtifact::deserialize(&mut buf.as_slice()).unwrap();
        assert_eq!(artifact.sample_rate, back.sample_rate);
        assert_eq!(artifact.samples, back.samples);
    }
}
