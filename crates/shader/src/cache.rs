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

//! Phases 3/4: the compiled-program cache. Keyed two levels deep —
//! platform, then [`ShaderPermutation`] — so the same shader asset can
//! serve several backends concurrently. Concurrent requests for the same
//! `(platform, permutation)` share one in-flight compile instead of
//! racing the compiler.
//!
//! `parking_lot::RwLock` stands in for a reader-preferring shared mutex;
//! it doesn't guarantee reader preference under contention, but readers
//! vastly outnumber writers here (a cache miss is rare once warm) so the
//! difference is not expected to matter in practice.

use std::collections::HashMap;
use std::sync::Arc;

use forge_concurrency::{AsyncState, TaskManager};
use forge_reflect::{Status, StatusCode};
use parking_lot::RwLock;

use crate::compiler::{GfxShaderProgram, ShaderCompiler, ShaderCompilerRequest, ShaderModule};
use crate::permutation::ShaderPermutation;

/// Owned inputs for one compile, built lazily so a cache hit never pays the
/// cost of assembling source text. Owned (rather than borrowing into the
/// reflection/asset) so the builder closure can run on the worker thread
/// without smuggling a borrow across it.
pub struct ShaderCompileInputs {
    pub shader_name: String,
    pub module: ShaderModule,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderPlatform(pub u32);

#[derive(Clone)]
enum ProgramEntry {
    InProgress(AsyncState<Arc<GfxShaderProgram>>),
    Ready(Arc<GfxShaderProgram>),
    /// A compile that failed stays parked here rather than being evicted —
    /// draws using this permutation report the same error and skip instead
    /// of re-triggering the compiler on every request. A later successful
    /// recompile (e.g. after a shader edit invalidates the cache) supersedes
    /// this entry through the normal miss path.
    Failed(Status),
}

/// Per-shader cache of compiled programs, shared across however many
/// `ShaderFileAsset`s are alive for a given `.shader` file. Lives behind an
/// `Arc` so `get_or_create_program` can submit a compile to the task
/// manager without the caller holding any lock across the call.
#[derive(Default)]
pub struct ShaderCache {
    entries: RwLock<HashMap<(ShaderPlatform, ShaderPermutation), ProgramEntry>>,
}

impl ShaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the program for `(platform, permutation)`, compiling it on
    /// `tasks` if this is the first request for that key. Concurrent callers
    /// racing the same key all observe the one in-flight compile rather than
    /// each submitting their own.
    pub fn get_or_create_program(
        self: &Arc<Self>,
        tasks: &TaskManager,
        platform: ShaderPlatform,
        permutation: ShaderPermutation,
        compiler: Arc<dyn ShaderCompiler>,
        build_inputs: impl FnOnce() -> ShaderCompileInputs + Send + 'static,
    ) -> AsyncState<Arc<GfxShaderProgram>> {
        let key = (platform, permutation);

        {
            let entries = self.entries.read();
            match entries.get(&key) {
                Some(ProgramEntry::Ready(program)) => return AsyncState::settled(program.clone()),
                Some(ProgramEntry::InProgress(state)) => return state.clone(),
                Some(ProgramEntry::Failed(status)) => {
                    log::error!("shader compile previously failed for {:?}: {status}", key);
                    return AsyncState::settled_failed();
                }
                None => {}
            }
        }

        let mut entries = self.entries.write();
        match entries.get(&key) {
            Some(ProgramEntry::Ready(program)) => return AsyncState::settled(program.clone()),
            Some(ProgramEntry::InProgress(state)) => return state.clone(),
            Some(ProgramEntry::Failed(status)) => {
                log::error!("shader compile previously failed for {:?}: {status}", key);
                return AsyncState::settled_failed();
            }
            None => {}
        }

        let state: AsyncState<Arc<GfxShaderProgram>> = AsyncState::new();
        entries.insert(key, ProgramEntry::InProgress(state.clone()));
        drop(entries);

        let cache = self.clone();
        let task_state = state.clone();
        let submitted = tasks.submit(move || {
            let inputs = build_inputs();
            let request = ShaderCompilerRequest {
                shader_name: &inputs.shader_name,
                module: inputs.module,
                permutation,
                source: &inputs.source,
            };
            match compiler.compile(&request) {
                Ok(program) => {
                    let program = Arc::new(program);
                    cache.entries.write().insert(key, ProgramEntry::Ready(program.clone()));
                    task_state.set_result(program);
                }
                Err(status) => {
                    log::error!("shader compile failed for {:?}: {status}", key);
                    cache.entries.write().insert(key, ProgramEntry::Failed(status));
                    task_state.set_failed();
                }
            }
        });

        if submitted.is_err() {
            let status = Status::new(StatusCode::FailedCompile, format!("failed to submit compile task for {:?}", key));
            self.entries.write().insert(key, ProgramEntry::Failed(status));
            state.set_failed();
        }

        state
    }

    pub fn invalidate_all(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn status_from_async_failure(platform: ShaderPlatform, permutation: ShaderPermutation) -> Status {
    Status::new(
        StatusCode::FailedCompile,
        format!("shader compile failed for platform {:?}, permutation {:?}", platform, permutation),
    )
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::compiler::{NullShaderCompiler, ShaderCompilerRequest, ShaderModule};

    /// Always fails, counting how many times it was asked to compile — used
    /// to prove a failed entry is cached instead of retried on every call.
    #[derive(Default)]
    struct FailingShaderCompiler {
        calls: AtomicUsize,
    }

    impl ShaderCompiler for FailingShaderCompiler {
        fn compile(&self, _request: &ShaderCompilerRequest) -> Result<GfxShaderProgram, Status> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Status::new(StatusCode::FailedCompile, "synthetic failure"))
        }
    }

    fn inputs() -> ShaderCompileInputs {
        ShaderCompileInputs {
            shader_name: "lit".to_string(),
            module: ShaderModule::Fragment,
            source: "void main() {}".to_string(),
        }
    }

    fn sample_permutation() -> ShaderPermutation {
        ShaderPermutation {
            technique_idx: 0,
            pass_idx: 0,
            option_bitmask: 0,
            vertex_attribute_mask: 0,
        }
    }

    #[test]
    fn compiles_once_and_serves_cached_on_second_call() {
        let cache = Arc::new(ShaderCache::new());
        let tasks = TaskManager::new(2, "shader-test");
        let compiler: Arc<dyn ShaderCompiler> = Arc::new(NullShaderCompiler);
        let permutation = sample_permutation();

        let first = cache.get_or_create_program(&tasks, ShaderPlatform(0), permutation, compiler.clone(), inputs);
        first.wait_completed();
        assert!(first.is_ok());
        assert_eq!(1, cache.len());

        let second = cache.get_or_create_program(&tasks, ShaderPlatform(0), permutation, compiler, inputs);
        assert!(second.is_ok() || second.is_in_process());
        second.wait_completed();
        assert_eq!(first.result().unwrap().bytecode, second.result().unwrap().bytecode);

        tasks.shutdown();
    }

    #[test]
    fn failed_compile_is_cached_and_not_retried() {
        let cache = Arc::new(ShaderCache::new());
        let tasks = TaskManager::new(2, "shader-test-fail");
        let failing = Arc::new(FailingShaderCompiler::default());
        let compiler: Arc<dyn ShaderCompiler> = failing.clone();
        let permutation = sample_permutation();

        let first = cache.get_or_create_program(&tasks, ShaderPlatform(0), permutation, compiler.clone(), inputs);
        first.wait_completed();
        assert!(first.is_failed());
        assert_eq!(1, failing.calls.load(Ordering::SeqCst));

        let second = cache.get_or_create_program(&tasks, ShaderPlatform(0), permutation, compiler, inputs);
        assert!(second.is_failed());
        assert_eq!(1, failing.calls.load(Ordering::SeqCst));

        tasks.shutdown();
    }
}
