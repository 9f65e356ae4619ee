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

//! C4 — the asset data model: identity ([`AssetId`]), the polymorphic
//! [`Asset`] base and its lazy [`AssetRef`], on-disk metadata ([`AssetMeta`]),
//! per-importer [`ImportData`], and content-addressed [`Artifact`]s.
//!
//! Grounded in `dess-assets`'s `Asset`/`AssetRef` split and
//! `dess-asset-pipeline`'s `AssetInfo`/`AssetDatabase`.

mod artifact;
mod asset;
mod asset_id;
mod import_data;
mod meta;
mod shader_file;

pub use artifact::{artifact_relative_path, Artifact, ArtifactCacheKey, ArtifactKey};
pub use asset::{Asset, AssetRef};
pub use asset_id::AssetId;
pub use import_data::{hash_bytes, hash_source_set, ImportData, SourceFile};
pub use meta::AssetMeta;
pub use shader_file::{
    ShaderFile, ShaderFileOption, ShaderFileParam, ShaderFileParamBlock, ShaderFilePass,
    ShaderFileSource, ShaderFileTechnique,
};
