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

//! C7 — the concrete [`Loader`] implementations that turn artifact bytes
//! back into live [`Asset`]s, one per importer-produced class tag.
//!
//! Grounded in the original engine's `resource_loader_*.cpp` family and the
//! teacher's `dess-engine::resources` loader set.

mod audio;
mod font;
mod mesh;
mod native;
mod shader;
mod texture;

use std::sync::Arc;

use forge_asset_manager::AssetManager;
use forge_reflect::Strid;

pub use audio::AudioAsset;
pub use font::FontAsset;
pub use mesh::MeshAsset;
pub use native::NativeAsset;
pub use shader::ShaderFileAsset;
pub use texture::TextureAsset;

pub use audio::AudioLoader;
pub use font::FontLoader;
pub use mesh::MeshLoader;
pub use native::NativeLoader;
pub use shader::ShaderLoader;
pub use texture::TextureLoader;

/// Registers one loader per importer-produced class tag — the set the CLI
/// and runtime wiring use when they don't need a custom loader mix.
pub fn register_default_loaders(manager: &Arc<AssetManager>) {
    manager.add_loader(Strid::new("Texture"), Arc::new(TextureLoader));
    manager.add_loader(Strid::new("Font"), Arc::new(FontLoader));
    manager.add_loader(Strid::new("Mesh"), Arc::new(MeshLoader));
    manager.add_loader(Strid::new("Audio"), Arc::new(AudioLoader));
    manager.add_loader(Strid::new("Native"), Arc::new(NativeLoader));
    manager.add_loader(Strid::new("Shader"), Arc::new(ShaderLoader));
}
