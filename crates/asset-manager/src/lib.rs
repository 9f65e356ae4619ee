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

//! C5 — runtime asset resolution: one lock guards the weak-reference
//! [`AssetManager`] cache, the in-flight `loading` table, mounted packs and
//! registered loaders. `load_async` is the entry point everything else
//! (synchronous `load`, `find`, GC) is built from.
//!
//! Grounded in `dess-engine::asset_cache`'s `SingleTypeAssetCache`/`AssetState`
//! pairing of a weak cache with an in-flight table.

mod loader;
mod manager;
mod request;

pub use loader::{LoadContext, Loader};
pub use manager::{AssetManager, AssetManagerStats};
pub use request::{LoadRequest, LoadResult};
