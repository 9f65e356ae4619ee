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

use std::{collections::HashMap, sync::Arc};

/// Declares which tagged artifact blobs a loader needs, filled in by
/// `Loader::fill_request` before the manager fetches anything.
#[derive(Debug, Default)]
pub struct LoadRequest {
    tags: Vec<&'static str>,
}

impl LoadRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn want(&mut self, tag: &'static str) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn tags(&self) -> &[&'static str] {
        &self.tags
    }
}

/// The artifact bytes fetched to satisfy a [`LoadRequest`], keyed by the same
/// tags.
#[derive(Debug, Default)]
pub struct LoadResult {
    artifacts: HashMap<&'static str, Arc<[u8]>>,
}

impl LoadResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: &'static str, bytes: Arc<[u8]>) {
        self.artifacts.insert(tag, bytes);
    }

    pub fn get(&self, tag: &'static str) -> Option<&Arc<[u8]>> {
        self.artifacts.get(tag)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn want_is_idempotent() {
        let mut req = LoadRequest::new();
        req.want("data");
        req.want("data");
        req.want("mips");
        assert_eq!(["data", "mips"].as_slice(), req.tags());
    }

    #[test]
    fn result_roundtrips_by_tag() {
        let mut result = LoadResult::new();
        result.insert("data", Arc::from(vec![1, 2, 3]));
        assert_eq!(&[1, 2, 3], result.get("data").unwrap().as_ref());
        assert!(result.get("mips").is_none());
    }
}
