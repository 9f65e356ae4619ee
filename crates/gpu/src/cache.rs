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

//! The one cache shape every GPU resource cache shares: `Descriptor ->
//! Weak<T>` behind a short-lived lock, never initiating creation itself.
//! A miss is the caller's cue to build the resource and call `add`.
//! `parking_lot::Mutex` stands in for the spin mutex the original design
//! calls for — critical sections here are a map lookup/insert, short and
//! finite, so the difference from a true spinlock is not expected to show.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

pub struct ResourceCache<D, T> {
    entries: Mutex<HashMap<D, Weak<T>>>,
}

impl<D, T> Default for ResourceCache<D, T> {
    fn default() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

impl<D: Eq + Hash + Clone, T> ResourceCache<D, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live handle for `desc`, if one is still alive. A dead
    /// weak reference found here is pruned, not just skipped.
    pub fn get(&self, desc: &D) -> Option<Arc<T>> {
        let mut entries = self.entries.lock();
        match entries.get(desc).and_then(Weak::upgrade) {
            Some(handle) => Some(handle),
            None => {
                entries.remove(desc);
                None
            }
        }
    }

    /// Records `handle` under `desc`, overwriting whatever was there. The
    /// cache never allocates the resource itself — `get` misses, the
    /// caller creates, then calls `add`.
    pub fn add(&self, desc: D, handle: &Arc<T>) {
        self.entries.lock().insert(desc, Arc::downgrade(handle));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry whose handle is no longer alive. Caches never do
    /// this on their own; callers sweep periodically (e.g. alongside the
    /// asset manager's `gc`).
    pub fn prune_dead(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, weak| weak.strong_count() > 0);
        before - entries.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn miss_then_add_then_hit() {
        let cache: ResourceCache<u32, String> = ResourceCache::new();
        assert!(cache.get(&1).is_none());
        let handle = Arc::new("built".to_string());
        cache.add(1, &handle);
        assert_eq!("built", cache.get(&1).unwrap().as_str());
    }

    #[test]
    fn dropped_strong_becomes_a_miss_and_is_pruned() {
        let cache: ResourceCache<u32, String> = ResourceCache::new();
        let handle = Arc::new("built".to_string());
        cache.add(1, &handle);
        drop(handle);
        assert!(cache.get(&1).is_none());
        assert_eq!(0, cache.len());
    }

    #[test]
    fn prune_dead_removes_only_dead_entries() {
        let cache: ResourceCache<u32, String> = ResourceCache::new();
        let alive = Arc::new("alive".to_string());
        cache.add(1, &alive);
        {
            let dead = Arc::new("dead".to_string());
            cache.add(2, &dead);
        }
        assert_eq!(1, cache.prune_dead());
        assert_eq!(1, cache.len());
    }
}
