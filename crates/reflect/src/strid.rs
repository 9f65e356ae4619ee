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
    hash::{Hash, Hasher},
    sync::Arc,
};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Which pool a [`Strid`] was interned into — kept separate so debug-only
/// identifiers (e.g. per-instance tags) don't pollute the long-lived release
/// pool's memory for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StridPool {
    Release,
    Debug,
}

struct Interner {
    by_string: FxHashMap<Arc<str>, usize>,
    by_id: Vec<Arc<str>>,
}

impl Interner {
    fn new() -> Self {
        Self {
            by_string: FxHashMap::default(),
            by_id: Vec::new(),
        }
    }

    fn intern(&mut self, s: &str) -> (usize, Arc<str>) {
        if let Some((string, &id)) = self.by_string.get_key_value(s) {
            return (id, string.clone());
        }
        let arc: Arc<str> = Arc::from(s);
        let id = self.by_id.len();
        self.by_id.push(arc.clone());
        self.by_string.insert(arc.clone(), id);
        (id, arc)
    }
}

static RELEASE_POOL: Lazy<Mutex<Interner>> = Lazy::new(|| Mutex::new(Interner::new()));
static DEBUG_POOL: Lazy<Mutex<Interner>> = Lazy::new(|| Mutex::new(Interner::new()));

fn pool_table(pool: StridPool) -> &'static Mutex<Interner> {
    match pool {
        StridPool::Release => &RELEASE_POOL,
        StridPool::Debug => &DEBUG_POOL,
    }
}

/// Interned, globally-stored string id. Equality/hash/ordering are all O(1)
/// against the pool-assigned integer id rather than the string content —
/// comparisons are the whole point of interning.
#[derive(Clone)]
pub struct Strid {
    id: usize,
    pool: StridPool,
    string: Arc<str>,
}

impl Strid {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self::in_pool(s, StridPool::Release)
    }

    pub fn in_pool(s: impl AsRef<str>, pool: StridPool) -> Self {
        let (id, string) = pool_table(pool).lock().intern(s.as_ref());
        Self { id, pool, string }
    }

    pub fn empty() -> Self {
        Self::new("")
    }

    pub fn is_empty(&self) -> bool {
        self.string.is_empty()
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn pool(&self) -> StridPool {
        self.pool
    }

    pub fn as_str(&self) -> &str {
        &self.string
    }
}

impl Default for Strid {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Strid {
    fn eq(&self, other: &Self) -> bool {
        self.pool == other.pool && self.id == other.id
    }
}
impl Eq for Strid {}

impl Hash for Strid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pool.hash(state);
        self.id.hash(state);
    }
}

impl PartialOrd for Strid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Strid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.string.cmp(&other.string)
    }
}

impl fmt::Debug for Strid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Strid({:?})", self.string)
    }
}

impl fmt::Display for Strid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.string)
    }
}

impl From<&str> for Strid {
    fn from(s: &str) -> Self {
        Strid::new(s)
    }
}
impl From<String> for Strid {
    fn from(s: String) -> Self {
        Strid::new(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_content_interns_to_same_id() {
        let a = Strid::new("asset/foo");
        let b = Strid::new("asset/foo");
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn different_content_gets_different_id() {
        let a = Strid::new("a");
        let b = Strid::new("b");
        assert_ne!(a, b);
    }

    #[test]
    fn release_and_debug_pools_are_distinct() {
        let a = Strid::in_pool("shared", StridPool::Release);
        let b = Strid::in_pool("shared", StridPool::Debug);
        assert_ne!(a, b);
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn empty_is_empty() {
        assert!(Strid::empty().is_empty());
        assert!(!Strid::new("x").is_empty());
    }
}
