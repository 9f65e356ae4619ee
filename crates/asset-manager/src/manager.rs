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
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
};

use forge_assets::{artifact_relative_path, Asset, AssetId, AssetMeta};
use forge_concurrency::{AsyncDependency, AsyncState, TaskManager};
use forge_io::read_artifact_blob;
use forge_reflect::Strid;
use forge_vfs::{AssetPack, PackRegistry};
use parking_lot::Mutex;

use crate::{
    loader::{LoadContext, Loader},
    request::{LoadRequest, LoadResult},
};

/// Snapshot of manager bookkeeping, exposed for the CLI's diagnostics output.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetManagerStats {
    pub cached: usize,
    pub in_flight: usize,
    pub packs: usize,
}

struct ManagerState {
    cache: HashMap<AssetId, Weak<dyn Asset>>,
    loading: HashMap<AssetId, AsyncState<Arc<dyn Asset>>>,
    packs: PackRegistry,
    loaders: HashMap<Strid, Arc<dyn Loader>>,
}

/// Runtime asset resolution: `cache`, `loading`, `packs` and `loaders` all
/// live behind one lock. The spec calls for a reentrant mutex since
/// `load_async` conceptually recurses into itself for dependencies — here
/// that recursion only ever happens after the lock guard for the current
/// call has already been dropped, so a plain `Mutex` suffices without
/// needing `parking_lot::ReentrantMutex`'s thread-id bookkeeping.
pub struct AssetManager {
    state: Mutex<ManagerState>,
    tasks: Arc<TaskManager>,
    hot_reload_enabled: AtomicBool,
}

impl AssetManager {
    pub fn new(tasks: Arc<TaskManager>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ManagerState {
                cache: HashMap::new(),
                loading: HashMap::new(),
                packs: PackRegistry::new(),
                loaders: HashMap::new(),
            }),
            tasks,
            hot_reload_enabled: AtomicBool::new(false),
        })
    }

    pub fn add_pack(&self, pack: Arc<dyn AssetPack>) {
        log::info!("mounted asset pack '{}'", pack.name());
        self.state.lock().packs.mount(pack);
    }

    pub fn add_loader(&self, class_tag: Strid, loader: Arc<dyn Loader>) {
        self.state.lock().loaders.insert(class_tag, loader);
    }

    pub fn is_hot_reload_enabled(&self) -> bool {
        self.hot_reload_enabled.load(Ordering::Acquire)
    }

    pub fn set_hot_reload_enabled(&self, enabled: bool) {
        self.hot_reload_enabled.store(enabled, Ordering::Release);
    }

    /// Cache-only lookup, no loading triggered.
    pub fn find(&self, id: &AssetId) -> Option<Arc<dyn Asset>> {
        self.state.lock().cache.get(id).and_then(Weak::upgrade)
    }

    pub fn stats(&self) -> AssetManagerStats {
        let state = self.state.lock();
        AssetManagerStats {
            cached: state.cache.len(),
            in_flight: state.loading.len(),
            packs: state.packs.packs().len(),
        }
    }

    /// Evicts cache entries whose weak reference can no longer be upgraded.
    /// Returns the number evicted.
    pub fn gc(&self) -> usize {
        let mut state = self.state.lock();
        let before = state.cache.len();
        state.cache.retain(|_, weak| weak.strong_count() > 0);
        before - state.cache.len()
    }

    pub fn clear(&self) {
        self.state.lock().cache.clear();
    }

    /// Synchronous convenience over [`Self::load_async`].
    pub fn load(self: &Arc<Self>, id: &AssetId) -> Option<Arc<dyn Asset>> {
        let async_state = self.load_async(id);
        async_state.wait_completed();
        async_state.result()
    }

    pub fn load_async(self: &Arc<Self>, id: &AssetId) -> AsyncState<Arc<dyn Asset>> {
        {
            let mut state = self.state.lock();
            if let Some(weak) = state.cache.get(id) {
                if let Some(strong) = weak.upgrade() {
                    return AsyncState::settled(strong);
                }
                state.cache.remove(id);
            }
            if let Some(existing) = state.loading.get(id) {
                return existing.clone();
            }
        }

        let meta = match self.state.lock().packs.get_meta(id) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("no pack has metadata for '{id}': {e}");
                return AsyncState::settled_failed();
            }
        };

        let async_state: AsyncState<Arc<dyn Asset>> = AsyncState::new();
        {
            let mut state = self.state.lock();
            if let Some(existing) = state.loading.get(id) {
                return existing.clone();
            }
            state.loading.insert(id.clone(), async_state.clone());
        }

        let dep_asyncs: Vec<Arc<dyn AsyncDependency>> = meta
            .deps
            .iter()
            .map(|dep_id| Arc::new(self.load_async(dep_id)) as Arc<dyn AsyncDependency>)
            .collect();
        let deps_joined = AsyncState::join(dep_asyncs);

        let manager = self.clone();
        let id_for_deps = id.clone();
        let async_for_deps = async_state.clone();
        deps_joined.add_on_completion(move |joined| {
            if joined.is_failed() {
                log::warn!("load of '{id_for_deps}' abandoned: a dependency failed");
                async_for_deps.set_failed();
                manager.state.lock().loading.remove(&id_for_deps);
                return;
            }

            let tasks = manager.tasks.clone();
            let manager_for_task = manager.clone();
            let id = id_for_deps.clone();
            let async_state = async_for_deps.clone();
            let meta = meta.clone();
            let submitted = tasks.submit(move || {
                manager_for_task.run_load(&id, &meta, &async_state);
            });
            if submitted.is_err() {
                log::error!("task manager shut down, failing load of '{id_for_deps}'");
                async_for_deps.set_failed();
                manager.state.lock().loading.remove(&id_for_deps);
            }
        });

        async_state
    }

    fn run_load(&self, id: &AssetId, meta: &AssetMeta, async_state: &AsyncState<Arc<dyn Asset>>) {
        let result = self.run_loader(id, meta);
        match result {
            Some(asset) => {
                let mut state = self.state.lock();
                state.cache.insert(id.clone(), Arc::downgrade(&asset));
                state.loading.remove(id);
                drop(state);
                async_state.set_result(asset);
            }
            None => {
                self.state.lock().loading.remove(id);
                async_state.set_failed();
            }
        }
    }

    fn run_loader(&self, id: &AssetId, meta: &AssetMeta) -> Option<Arc<dyn Asset>> {
        let loader = self.state.lock().loaders.get(&meta.loader_tag).cloned()?;

        let mut request = LoadRequest::new();
        loader.fill_request(id, &mut request);

        let mut result = LoadResult::new();
        for tag in request.tags() {
            let path = artifact_relative_path(id, tag);
            let raw = self.state.lock().packs.read_file(id, &path);
            let decoded = raw.map_err(|e| e.to_string()).and_then(|raw| {
                read_artifact_blob(&raw).map_err(|e| e.to_string())
            });
            match decoded {
                Ok(bytes) => result.insert(tag, Arc::from(bytes)),
                Err(e) => {
                    log::error!("failed to read artifact '{tag}' for '{id}': {e}");
                    return None;
                }
            }
        }

        let ctx = LoadContext::new(self, meta);
        match loader.load(&ctx, id, &result) {
            Ok(asset) => Some(asset),
            Err(status) => {
                log::error!("loader failed for '{id}': {status}");
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex as StdMutex;

    use forge_io::write_artifact_blob;
    use forge_reflect::StatusCode;
    use forge_vfs::DirectoryPack;

    use super::*;

    #[derive(Debug)]
    struct TestAsset {
        id: AssetId,
        payload: Vec<u8>,
    }

    impl Asset for TestAsset {
        fn id(&self) -> &AssetId {
            &self.id
        }
        fn uuid(&self) -> uuid::Uuid {
            uuid::Uuid::nil()
        }
        fn class_tag(&self) -> Strid {
            Strid::new("Test")
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct TestLoader {
        loads: StdMutex<u32>,
    }

    impl Loader for TestLoader {
        fn fill_request(&self, _id: &AssetId, request: &mut LoadRequest) {
            request.want("data");
        }

        fn load(&self, _ctx: &LoadContext, id: &AssetId, result: &LoadResult) -> Result<Arc<dyn Asset>, forge_reflect::Status> {
            *self.loads.lock().unwrap() += 1;
            let bytes = result.get("data").ok_or(StatusCode::NoAsset)?;
            Ok(Arc::new(TestAsset {
                id: id.clone(),
                payload: bytes.to_vec(),
            }))
        }
    }

    fn write_fixture(dir: &std::path::Path, name: &str, payload: &[u8]) {
        let meta = AssetMeta::new(Strid::new("Test"), Strid::new("test-loader"), uuid::Uuid::nil());
        let res_path = dir.join(format!("{name}.res"));
        if let Some(parent) = res_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(res_path, forge_vfs::write_res(&meta)).unwrap();

        let mut out = Vec::new();
        write_artifact_blob(payload, &mut out).unwrap();
        std::fs::write(dir.join(format!("{name}.data.artifact")), out).unwrap();
    }

    #[test]
    fn loads_an_asset_and_caches_it() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "test/asset", b"hello");

        let tasks = Arc::new(TaskManager::new(2, "test"));
        let manager = AssetManager::new(tasks);
        manager.add_pack(Arc::new(DirectoryPack::new("content", dir.path())));
        manager.add_loader(
            Strid::new("test-loader"),
            Arc::new(TestLoader {
                loads: StdMutex::new(0),
            }),
        );

        let loaded = manager.load(&AssetId::new("test/asset")).unwrap();
        let test_asset = loaded.as_any().downcast_ref::<TestAsset>().unwrap();
        assert_eq!(b"hello".to_vec(), test_asset.payload);

        let stats = manager.stats();
        assert_eq!(1, stats.cached);
        assert_eq!(0, stats.in_flight);
    }

    #[test]
    fn find_without_prior_load_is_none() {
        let tasks = Arc::new(TaskManager::new(1, "test"));
        let manager = AssetManager::new(tasks);
        assert!(manager.find(&AssetId::new("nope")).is_none());
    }

    #[test]
    fn unknown_asset_fails_the_async() {
        let tasks = Arc::new(TaskManager::new(1, "test"));
        let manager = AssetManager::new(tasks);
        let async_state = manager.load_async(&AssetId::new("nope"));
        async_state.wait_completed();
        assert!(async_state.is_failed());
    }

    #[test]
    fn gc_evicts_only_dead_entries() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "a", b"1");

        let tasks = Arc::new(TaskManager::new(2, "test"));
        let manager = AssetManager::new(tasks);
        manager.add_pack(Arc::new(DirectoryPack::new("content", dir.path())));
        manager.add_loader(
            Strid::new("test-loader"),
            Arc::new(TestLoader {
                loads: StdMutex::new(0),
            }),
        );

        let kept = manager.load(&AssetId::new("a")).unwrap();
        assert_eq!(0, manager.gc());
        drop(kept);
        assert_eq!(1, manager.gc());
        assert_eq!(0, manager.stats().cached);
    }
}
