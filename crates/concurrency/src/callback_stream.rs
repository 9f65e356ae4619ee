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
    sync::atomic::{AtomicBool, Ordering},
    thread::ThreadId,
};

use parking_lot::{Condvar, Mutex};

type Command = Box<dyn FnOnce() + Send>;

/// Thread-safe unbounded multi-producer single-consumer callback stream. Used to
/// fence GPU-resource-touching work back onto one designated thread (main/render):
/// an asset manager loading on worker threads pushes the handoff step here instead
/// of touching driver state directly.
///
/// Pushing from the consumer thread itself runs the callback inline rather than
/// enqueuing it, so code that doesn't know whether it is already on the consumer
/// thread can always go through `push` without risking a self-deadlock on `wait`.
pub struct CallbackStream {
    queue: Mutex<VecDeque<Command>>,
    cv: Condvar,
    closed: AtomicBool,
    consumer_id: Mutex<Option<ThreadId>>,
}

impl Default for CallbackStream {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackStream {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            cv: Condvar::new(),
            closed: AtomicBool::new(false),
            consumer_id: Mutex::new(None),
        }
    }

    /// Designates the thread whose calls to `push` run inline. Typically called
    /// once, from the thread that will later call `consume` in a loop.
    pub fn set_consumer_id(&self, thread_id: ThreadId) {
        *self.consumer_id.lock() = Some(thread_id);
    }

    fn is_consumer_thread(&self) -> bool {
        *self.consumer_id.lock() == Some(std::thread::current().id())
    }

    pub fn push(&self, callable: impl FnOnce() + Send + 'static) {
        if self.is_consumer_thread() {
            callable();
            return;
        }
        let mut queue = self.queue.lock();
        queue.push_back(Box::new(callable));
        drop(queue);
        self.cv.notify_all();
    }

    /// Pushes, then blocks the calling thread until the callback has run.
    pub fn push_and_wait(&self, callable: impl FnOnce() + Send + 'static) {
        self.push(callable);
        self.wait();
    }

    /// Pops and runs a single queued command. Returns `false` if the queue was
    /// empty.
    pub fn consume(&self) -> bool {
        let command = {
            let mut queue = self.queue.lock();
            let command = queue.pop_front();
            if queue.is_empty() {
                self.cv.notify_all();
            }
            command
        };
        match command {
            Some(command) => {
                command();
                true
            }
            None => false,
        }
    }

    /// Drains and runs every command currently queued, then returns. Does not
    /// block waiting for commands pushed after this call started.
    pub fn consume_all(&self) -> usize {
        let mut n = 0;
        while self.consume() {
            n += 1;
        }
        n
    }

    /// Blocks until the queue observed at call time has fully drained.
    pub fn wait(&self) {
        let mut queue = self.queue.lock();
        while !queue.is_empty() {
            self.cv.wait(&mut queue);
        }
    }

    pub fn push_close(&self) {
        self.closed.store(true, Ordering::Release);
        self.cv.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use std::sync::{atomic::AtomicU32, Arc};

    use super::*;

    #[test]
    fn push_from_other_thread_then_consume() {
        let stream = Arc::new(CallbackStream::new());
        stream.set_consumer_id(std::thread::current().id());

        let counter = Arc::new(AtomicU32::new(0));
        let stream2 = stream.clone();
        let counter2 = counter.clone();
        let handle = std::thread::spawn(move || {
            stream2.push(move || {
                counter2.fetch_add(1, Ordering::AcqRel);
            });
        });
        handle.join().unwrap();

        assert_eq!(1, stream.len());
        assert!(stream.consume());
        assert_eq!(1, counter.load(Ordering::Acquire));
    }

    #[test]
    fn push_from_consumer_thread_runs_inline() {
        let stream = CallbackStream::new();
        stream.set_consumer_id(std::thread::current().id());
        let counter = Arc::new(AtomicU32::new(0));
        let counter2 = counter.clone();
        stream.push(move || {
            counter2.fetch_add(1, Ordering::AcqRel);
        });
        assert_eq!(1, counter.load(Ordering::Acquire));
        assert_eq!(0, stream.len());
    }

    #[test]
    fn push_and_wait_blocks_until_processed() {
        let stream = Arc::new(CallbackStream::new());
        // No consumer thread designated: both sides enqueue/dequeue across threads.
        let counter = Arc::new(AtomicU32::new(0));
        let counter2 = counter.clone();
        let stream2 = stream.clone();

        let waiter = std::thread::spawn(move || {
            stream2.push_and_wait(move || {
                counter2.fetch_add(1, Ordering::AcqRel);
            });
        });

        // Drain on this thread until the waiter observes completion.
        loop {
            if stream.consume() {
                break;
            }
            std::thread::yield_now();
        }
        waiter.join().unwrap();
        assert_eq!(1, counter.load(Ordering::Acquire));
    }

    #[test]
    fn consume_all_drains_queue() {
        let stream = CallbackStream::new();
        let counter = Arc::new(AtomicU32::new(0));
        for _ in 0..10 {
            let counter = counter.clone();
            stream.push(move || {
                counter.fetch_add(1, Ordering::AcqRel);
            });
        }
        assert_eq!(10, stream.consume_all());
        assert_eq!(10, counter.load(Ordering::Acquire));
    }
}
