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
    collections::VecDeque,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use parking_lot::{Condvar, Mutex};

/// A runnable unit of work. One task is roughly "one load" or "one compile" —
/// tasks are expected to be coarse; the pool does not attempt fine-grained
/// work-stealing.
pub type Runnable = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum TaskManagerError {
    #[error("task manager has been shut down")]
    Shutdown,
}

struct Shared {
    queue: Mutex<VecDeque<Runnable>>,
    cv: Condvar,
    shutdown: AtomicBool,
}

impl Shared {
    fn next_to_exec(&self) -> Option<Runnable> {
        let mut queue = self.queue.lock();
        loop {
            if let Some(task) = queue.pop_front() {
                return Some(task);
            }
            if self.shutdown.load(Ordering::Acquire) {
                return None;
            }
            self.cv.wait(&mut queue);
        }
    }
}

/// Owns `N` worker threads pulling from one shared FIFO. Mirrors the original
/// `TaskManager`: workers loop `next_to_exec` under the queue's mutex + condvar
/// until `shutdown` is observed.
pub struct TaskManager {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_prefix: String,
}

impl TaskManager {
    pub fn new(num_workers: usize, worker_prefix: impl Into<String>) -> Self {
        assert!(num_workers > 0, "TaskManager needs at least one worker");
        let worker_prefix = worker_prefix.into();
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            cv: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        let workers = (0..num_workers)
            .map(|i| {
                let shared = shared.clone();
                let name = format!("{worker_prefix}-{i}");
                thread::Builder::new()
                    .name(name.clone())
                    .spawn(move || {
                        while let Some(task) = shared.next_to_exec() {
                            // A task panicking must not take the whole worker
                            // thread down with it; the caller observes the
                            // failure through the AsyncState it settled.
                            if catch_unwind(AssertUnwindSafe(task)).is_err() {
                                log::error!("task panicked on worker {name}");
                            }
                        }
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();

        Self {
            shared,
            workers: Mutex::new(workers),
            worker_prefix,
        }
    }

    /// Enqueues `task`. Fails with `Shutdown` once `shutdown()` has been called.
    pub fn submit(&self, task: impl FnOnce() + Send + 'static) -> Result<(), TaskManagerError> {
        if self.shared.shutdown.load(Ordering::Acquire) {
            return Err(TaskManagerError::Shutdown);
        }
        let mut queue = self.shared.queue.lock();
        queue.push_back(Box::new(task));
        drop(queue);
        self.shared.cv.notify_all();
        Ok(())
    }

    /// Idempotent: stops pulling from the queue and joins every worker.
    pub fn shutdown(&self) {
        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }
        log::info!("shutting down task manager {}", self.worker_prefix);
        self.shared.cv.notify_all();
        let mut workers = self.workers.lock();
        for worker in workers.drain(..) {
            let _ = worker.join();
        }
        self.shared.queue.lock().clear();
    }

    pub fn num_workers(&self) -> usize {
        self.workers.lock().len()
    }

    pub fn num_pending(&self) -> usize {
        self.shared.queue.lock().len()
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn runs_submitted_tasks() {
        let tm = TaskManager::new(4, "test");
        let counter = Arc::new(AtomicU32::new(0));
        for _ in 0..64 {
            let counter = counter.clone();
            tm.submit(move || {
                counter.fetch_add(1, Ordering::AcqRel);
            })
            .unwrap();
        }
        tm.shutdown();
        assert_eq!(64, counter.load(Ordering::Acquire));
    }

    #[test]
    fn submit_after_shutdown_fails() {
        let tm = TaskManager::new(1, "test");
        tm.shutdown();
        assert!(matches!(
            tm.submit(|| {}),
            Err(TaskManagerError::Shutdown)
        ));
    }

    #[test]
    fn panicking_task_does_not_wedge_pool() {
        let tm = TaskManager::new(1, "test");
        tm.submit(|| panic!("boom")).unwrap();
        let counter = Arc::new(AtomicU32::new(0));
        let counter2 = counter.clone();
        tm.submit(move || {
            counter2.fetch_add(1, Ordering::AcqRel);
        })
        .unwrap();
        tm.shutdown();
        assert_eq!(1, counter.load(Ordering::Acquire));
    }
}
