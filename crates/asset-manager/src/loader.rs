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

use std::sync::Arc;

use forge_assets::{Asset, AssetId, AssetMeta};
use forge_reflect::Status;

use crate::{
    manager::AssetManager,
    request::{LoadRequest, LoadResult},
};

/// View handed to a [`Loader`] while it runs on the task manager: the
/// resolved metadata for the asset being loaded, plus a way to look up
/// already-cached dependencies by id (the manager drives dependency loading
/// itself; by the time a loader runs, every dependency in `meta.deps` has
/// already settled `Ok` and is sitting in the cache).
pub struct LoadContext<'a> {
    manager: &'a AssetManager,
    meta: &'a AssetMeta,
}

impl<'a> LoadContext<'a> {
    pub(crate) fn new(manager: &'a AssetManager, meta: &'a AssetMeta) -> Self {
        Self { manager, meta }
    }

    pub fn meta(&self) -> &AssetMeta {
        self.meta
    }

    /// Cache-only lookup for a dependency by id. Defined to succeed for every
    /// id in `self.meta().deps` — the manager only submits this loader's task
    /// once the dependency join has settled `Ok`.
    pub fn find_dep(&self, id: &AssetId) -> Option<Arc<dyn Asset>> {
        self.manager.find(id)
    }
}

/// A stateless, class-tag-registered plugin that turns fetched artifact bytes
/// into a live [`Asset`]. Runs entirely on the task manager; any operation
/// that must happen on a specific thread (e.g. uploading to a driver that
/// only accepts calls from the render thread) is expected to be fenced
/// through a `CallbackStream` by the concrete loader, not by this trait.
pub trait Loader: Send + Sync {
    /// Declares which tagged artifacts this loader needs for `id`.
    fn fill_request(&self, id: &AssetId, request: &mut LoadRequest);

    /// Consumes the fetched artifacts and produces the live asset.
    fn load(&self, ctx: &LoadContext, id: &AssetId, result: &LoadResult) -> Result<Arc<dyn Asset>, Status>;
}
