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

//! C1 — the concurrency substrate: a coarse-grained worker pool ([`TaskManager`]),
//! a settle-once future with dependency propagation ([`AsyncState`]), and a
//! single-consumer command queue ([`CallbackStream`]) used to fence work back onto
//! a designated thread (main/render thread).
//!
//! Grounded in the original engine's `core/task_manager.cpp` / `core/task_runtime.hpp`
//! (FIFO queue behind a mutex + condvar, cooperative shutdown) and in the teacher's
//! `dess_common::executor::Executor` / `dess_engine::asset_cache::AssetState` for the
//! Rust idiom of wrapping that in a settle-once handle instead of callback soup.

mod async_state;
mod callback_stream;
mod task_manager;

pub use async_state::*;
pub use callback_stream::*;
pub use task_manager::*;
