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

//! C3 — reflection & identity: interned string ids ([`Strid`]), the error
//! taxonomy ([`Status`]/[`StatusCode`]), and a type registry ([`ClassRegistry`])
//! for dynamic, self-describing objects.
//!
//! Grounded in the original engine's `core/string_id.{hpp,cpp}` and
//! `core/status.hpp`; the registry is a registry-builder pattern replacing the
//! original's macro-driven RTTI, since Rust has no offset-based field access
//! to mirror safely.

mod registry;
mod status;
mod strid;

pub use registry::{read_fields, write_fields, ClassInfo, ClassRegistry, FieldFlags, FieldInfo, Reflected};
pub use status::{Status, StatusCode, StatusResult};
pub use strid::{Strid, StridPool};
