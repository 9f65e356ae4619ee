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

//! C2 — structured I/O. [`tree::IoTree`] is a cursor-based reader/writer over a
//! tree of primitive and composite values, generic over a [`tree::TreeBackend`]
//! so the YAML (human-editable `.res`/`.shader` files) and binary (artifact
//! blob) backends share one set of navigation semantics. [`lz4`] wraps the
//! compression codec the binary backend and the artifact cache use.
//!
//! Grounded in `dess-vfs`'s directory/packed tree layering and the original
//! engine's `io/compression.{hpp,cpp}`.

mod artifact_blob;
mod backend;
mod lz4;
mod node;
mod tree;
mod value;

pub use artifact_blob::{read_artifact_blob, write_artifact_blob};
pub use backend::{BinaryBackend, YamlBackend};
pub use node::Node;
pub use tree::{IoTree, TreeBackend};
pub use value::{FromValue, InternedString, ToValue, Value};

pub use self::lz4::{compress, decompress, estimate, Lz4Error};
