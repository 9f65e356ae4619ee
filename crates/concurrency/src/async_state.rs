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
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use parking_lot::{Condvar, Mutex};

/// The three states an [`AsyncState`] can be in. Transitions are monotonic:
/// `InProcess -> Ok` or `InProcess -> Failed`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncStatus {
    InProcess,
    Ok,
    Failed,
}

type Callback<T> = Box<dyn FnOnce(&AsyncState<T>) + Send>;

struct Inner<T> {
    status: AsyncStatus,
    result: Option<T>,
    callbacks: Vec<Callback<T>>,
}

/// A settle-once future. Unlike a `Future`, it never gets polled — it is driven by
/// whoever eventually calls `set_result`/`set_failed`, and anyone can register a
/// callback that fires either immediately (already settled) or on the settling
/// thread (still pending). `join` builds the implicit dependency-join semantics
/// spec'd for the asset manager and shader compiler: an `AsyncState` that depends
/// on others settles only once every dependency has, and fails fast if any of them
/// failed.
pub struct AsyncState<T> {
    inner: Arc<Mutex<Inner<T>>>,
    cv: Arc<Condvar>,
}

impl<T> Clone for AsyncState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            cv: self.cv.clone(),
        }
    }
}

impl<T> fmt::Debug for AsyncState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncState")
            .field("status", &self.inner.lock().status)
            .finish()
    }
}

impl<T: Send + 'static> Default for AsyncState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> AsyncState<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                status: AsyncStatus::InProcess,
                result: None,
                callbacks: Vec::new(),
            })),
            cv: Arc::new(Condvar::new()),
        }
    }

    pub fn settled(value: T) -> Self {
        let this = Self::new();
        this.set_result(value);
        this
    }

    pub fn settled_failed() -> Self {
        let this = Self::new();
        this.set_failed();
        this
    }

    pub fn status(&self) -> AsyncStatus {
        self.inner.lock().status
    }

    pub fn is_in_process(&self) -> bool {
        self.status() == AsyncStatus::InProcess
    }

    pub fn is_ok(&self) -> bool {
        self.status() == AsyncStatus::Ok
    }

    pub fn is_failed(&self) -> bool {
        self.status() == AsyncStatus::Failed
    }

    /// Blocks the calling thread until the async has settled. Forbidden on worker
    /// threads by convention (it would risk self-deadlock) but not enforced here,
    /// matching the source design.
    pub fn wait_completed(&self) {
        let mut inner = self.inner.lock();
        while inner.status == AsyncStatus::InProcess {
            self.cv.wait(&mut inner);
        }
    }

    /// Valid only after `is_ok()`; clones the settled value out.
    pub fn result(&self) -> Option<T>
    where
        T: Clone,
    {
        let inner = self.inner.lock();
        (inner.status == AsyncStatus::Ok)
            .then(|| inner.result.clone())
            .flatten()
    }

    /// Registers `cb`. If already settled, it runs inline on the calling thread
    /// right now; otherwise it is queued and runs on whichever thread eventually
    /// settles this async.
    pub fn add_on_completion(&self, cb: impl FnOnce(&AsyncState<T>) + Send + 'static) {
        let mut inner = self.inner.lock();
        if inner.status == AsyncStatus::InProcess {
            inner.callbacks.push(Box::new(cb));
        } else {
            drop(inner);
            cb(self);
        }
    }

    pub fn set_result(&self, value: T) {
        self.settle(AsyncStatus::Ok, Some(value));
    }

    pub fn set_failed(&self) {
        self.settle(AsyncStatus::Failed, None);
    }

    /// The mechanism behind dependency notification: a dependency's settle calls
    /// this on every dependent registered through `add_on_completion`.
    fn settle(&self, status: AsyncStatus, value: Option<T>) {
        let callbacks = {
            let mut inner = self.inner.lock();
            assert_eq!(
                inner.status,
                AsyncStatus::InProcess,
                "AsyncState settled more than once"
            );
            inner.status = status;
            inner.result = value;
            std::mem::take(&mut inner.callbacks)
        };
        self.cv.notify_all();
        for cb in callbacks {
            cb(self);
        }
    }
}

/// Type-erased settle notification, used to join over dependencies of different
/// `T`. Any `AsyncState<T>` can act as a dependency.
pub trait AsyncDependency: Send + Sync {
    fn add_on_settle(&self, cb: Box<dyn FnOnce(bool) + Send>);
}

impl<T: Send + Sync + 'static> AsyncDependency for AsyncState<T> {
    fn add_on_settle(&self, cb: Box<dyn FnOnce(bool) + Send>) {
        self.add_on_completion(move |settled| cb(settled.is_ok()));
    }
}

impl AsyncState<()> {
    /// Returns an async that settles `Ok(())` once every dependency has settled
    /// `Ok`, or `Failed` as soon as any dependency fails. With no dependencies it
    /// settles immediately.
    pub fn join(deps: Vec<Arc<dyn AsyncDependency>>) -> AsyncState<()> {
        let joined = AsyncState::new();
        if deps.is_empty() {
            joined.set_result(());
            return joined;
        }

        let remaining = Arc::new(AtomicUsize::new(deps.len()));
        let any_failed = Arc::new(AtomicBool::new(false));

        for dep in deps {
            let joined = joined.clone();
            let remaining = remaining.clone();
            let any_failed = any_failed.clone();
            dep.add_on_settle(Box::new(move |ok| {
                if !ok {
                    any_failed.store(true, Ordering::Release);
                }
                if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    if any_failed.load(Ordering::Acquire) {
                        joined.set_failed();
                    } else {
                        joined.set_result(());
                    }
                }
            }));
        }

        joined
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn settle_then_register_runs_inline() {
        let a = AsyncState::new();
        a.set_result(42);
        let seen = Arc::new(AtomicU32::new(0));
        let seen2 = seen.clone();
        a.add_on_completion(move |s| seen2.store(s.result().unwrap(), Ordering::Release));
        assert_eq!(42, seen.load(Ordering::Acquire));
    }

    #[test]
    fn register_then_settle_runs_callback() {
        let a: AsyncState<u32> = AsyncState::new();
        let seen = Arc::new(AtomicU32::new(0));
        let seen2 = seen.clone();
        a.add_on_completion(move |s| seen2.store(s.result().unwrap(), Ordering::Release));
        a.set_result(7);
        assert_eq!(7, seen.load(Ordering::Acquire));
    }

    #[test]
    #[should_panic(expected = "settled more than once")]
    fn double_settle_panics() {
        let a = AsyncState::new();
        a.set_result(1);
        a.set_result(2);
    }

    #[test]
    fn join_succeeds_when_all_succeed() {
        let a: AsyncState<u32> = AsyncState::new();
        let b: AsyncState<u32> = AsyncState::new();
        let joined = AsyncState::join(vec![Arc::new(a.clone()), Arc::new(b.clone())]);
        assert!(joined.is_in_process());
        a.set_result(1);
        assert!(joined.is_in_process());
        b.set_result(2);
        assert!(joined.is_ok());
    }

    #[test]
    fn join_fails_if_any_dependency_fails() {
        let a: AsyncState<u32> = AsyncState::new();
        let b: AsyncState<u32> = AsyncState::new();
        let joined = AsyncState::join(vec![Arc::new(a.clone()), Arc::new(b.clone())]);
        a.set_failed();
        b.set_result(2);
        assert!(joined.is_failed());
    }

    #[test]
    fn join_empty_settles_immediately() {
        let joined = AsyncState::join(vec![]);
        assert!(joined.is_ok());
    }

    #[test]
    fn wait_completed_blocks_until_settled() {
        let a: AsyncState<u32> = AsyncState::new();
        let a2 = a.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            a2.set_result(99);
        });
        a.wait_completed();
        assert_eq!(Some(99), a.result());
        handle.join().unwrap();
    }
}
