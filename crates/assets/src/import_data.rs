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

use std::{any::Any, fmt, hash::Hasher, path::PathBuf};

use siphasher::sip::SipHasher13;

/// One source file an importer consumed, with the content hash used for
/// cache invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content_hash: u64,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content_hash: u64) -> Self {
        Self {
            path: path.into(),
            content_hash,
        }
    }
}

/// Polymorphic, per-importer record: the source files and options that
/// deterministically produce an asset's artifact bytes. Each importer defines
/// its own concrete type; this crate only needs the cacheability surface.
pub trait ImportData: fmt::Debug + Send + Sync {
    fn source_files(&self) -> &[SourceFile];

    /// A stable byte encoding of the import options (everything that isn't a
    /// source file hash) — importers derive their own `import-data-hash` from
    /// this via [`hash_bytes`].
    fn options_blob(&self) -> Vec<u8>;

    /// Lets an importer recover its own concrete settings type from the
    /// trait object the framework passes around — mirrors [`crate::Asset`]'s
    /// own `as_any`.
    fn as_any(&self) -> &dyn Any;
}

pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = SipHasher13::new();
    hasher.write(bytes);
    hasher.finish()
}

/// Combines a set of per-source-file hashes into the one hash the artifact
/// cache key compares against. Order-independent: `deps` are a set in the
/// data model, not a sequence.
pub fn hash_source_set(sources: &[SourceFile]) -> u64 {
    let mut combined = 0u64;
    for source in sources {
        let mut hasher = SipHasher13::new();
        hasher.write(source.path.to_string_lossy().as_bytes());
        hasher.write_u64(source.content_hash);
        combined ^= hasher.finish();
    }
    combined
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn source_set_hash_is_order_independent() {
        let a = SourceFile::new("a.png", 1);
        let b = SourceFile::new("b.png", 2);
        assert_eq!(hash_source_set(&[a.clone(), b.clone()]), hash_source_set(&[b, a]));
    }

    #[test]
    fn different_hashes_yield_different_combined_hash() {
        let a = SourceFile::new("a.png", 1);
        let a2 = SourceFile::new("a.png", 2);
        assert_ne!(hash_source_set(&[a]), hash_source_set(&[a2]));
    }
}
