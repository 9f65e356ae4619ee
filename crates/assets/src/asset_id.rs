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
    io::{self, Read, Write},
};

use forge_common::{BinaryDeserialization, BinarySerialization};
use forge_reflect::Strid;

/// A handle wrapping an interned name. Cheap to copy, equality and hash are
/// the interned string's id/pointer rather than its bytes — grounded directly
/// on `Strid`'s own identity semantics, which is exactly what the spec asks
/// `AssetId` to have.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(Strid);

impl AssetId {
    pub fn new(name: impl Into<Strid>) -> Self {
        Self(name.into())
    }

    /// The sentinel empty id.
    pub fn none() -> Self {
        Self(Strid::empty())
    }

    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    pub fn name(&self) -> &str {
        self.0.as_str()
    }

    pub fn strid(&self) -> &Strid {
        &self.0
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl BinarySerialization for AssetId {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        self.0.as_str().to_string().serialize(w)
    }
}
impl BinaryDeserialization for AssetId {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        Ok(AssetId::new(String::deserialize(r)?))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_name_is_the_same_id() {
        assert_eq!(AssetId::new("a/b.png"), AssetId::new("a/b.png"));
        assert_ne!(AssetId::new("a/b.png"), AssetId::new("a/c.png"));
    }

    #[test]
    fn default_is_none() {
        assert!(AssetId::default().is_none());
        assert!(!AssetId::new("x").is_none());
    }
}
