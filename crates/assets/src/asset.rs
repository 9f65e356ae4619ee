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
    fmt,
    sync::{Arc, Weak},
};

use forge_reflect::Strid;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::asset_id::AssetId;

/// Polymorphic base every loaded asset implements. The opaque payload is
/// whatever the concrete loader produced; `forge-loader` owns the loaders,
/// this crate only needs the identity surface.
pub trait Asset: Any + Send + Sync + fmt::Debug {
    fn id(&self) -> &AssetId;
    fn uuid(&self) -> Uuid;
    fn class_tag(&self) -> Strid;

    fn as_any(&self) -> &dyn Any;
}

/// A deferred reference to another asset, held by id with a cached weak
/// pointer. Resolving goes through whatever the caller supplies as a lookup —
/// this crate stays decoupled from `forge-asset-manager`, which is the actual
/// resolver, by taking it as a closure rather than a dependency.
pub struct AssetRef<T: ?Sized> {
    id: AssetId,
    cached: Mutex<Weak<T>>,
}

impl<T: ?Sized> fmt::Debug for AssetRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRef").field("id", &self.id).finish()
    }
}

impl<T: ?Sized> AssetRef<T> {
    pub fn new(id: AssetId) -> Self {
        Self {
            id,
            cached: Mutex::new(Weak::new()),
        }
    }

    pub fn none() -> Self {
        Self::new(AssetId::none())
    }

    pub fn id(&self) -> &AssetId {
        &self.id
    }

    pub fn is_none(&self) -> bool {
        self.id.is_none()
    }

    /// Returns the cached strong pointer without touching the resolver, if
    /// one is still alive.
    pub fn cached(&self) -> Option<Arc<T>> {
        self.cached.lock().upgrade()
    }

    /// Resolves through `resolve`, caching the result for subsequent calls.
    /// Only invokes `resolve` when nothing is cached — serialization only
    /// ever needs `id()`, never this.
    pub fn resolve(&self, resolve: impl FnOnce(&AssetId) -> Option<Arc<T>>) -> Option<Arc<T>> {
        if let Some(cached) = self.cached() {
            return Some(cached);
        }
        let resolved = resolve(&self.id)?;
        *self.cached.lock() = Arc::downgrade(&resolved);
        Some(resolved)
    }
}

impl<T: ?Sized> Clone for AssetRef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            cached: Mutex::new(self.cached.lock().clone()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resolve_caches_and_reuses() {
        let asset_ref: AssetRef<u32> = AssetRef::new(AssetId::new("x"));
        let mut calls = 0;
        let resolved = asset_ref.resolve(|_| {
            calls += 1;
            Some(Arc::new(42u32))
        });
        assert_eq!(Some(42), resolved.as_deref().copied());

        // Dropped already (resolve returned an Arc we didn't keep), so the
        // weak slot is empty again and a second resolve calls through once
        // more — this is the expected "no strong holder keeps it alive" case.
        let resolved2 = asset_ref.resolve(|_| {
            calls += 1;
            Some(Arc::new(7u32))
        });
        assert_eq!(Some(7), resolved2.as_deref().copied());
        assert_eq!(2, calls);
    }

    #[test]
    fn resolve_reuses_cache_while_strong_ref_is_alive() {
        let asset_ref: AssetRef<u32> = AssetRef::new(AssetId::new("x"));
        let mut calls = 0;
        let kept = asset_ref
            .resolve(|_| {
                calls += 1;
                Some(Arc::new(1u32))
            })
            .unwrap();

        let again = asset_ref.resolve(|_| {
            calls += 1;
            Some(Arc::new(2u32))
        });
        assert_eq!(1, calls);
        assert!(Arc::ptr_eq(&kept, &again.unwrap()));
    }

    #[test]
    fn none_ref_has_none_id() {
        let asset_ref: AssetRef<u32> = AssetRef::none();
        assert!(asset_ref.is_none());
    }
}
