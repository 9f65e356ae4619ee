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
    fs,
    path::{Path, PathBuf},
};

use crate::error::VfsError;

/// The raw filesystem surface the pipeline consumes — importers read source
/// files through this rather than touching `std::fs` directly, so tests can
/// swap in an in-memory implementation.
pub trait FileSystem: Send + Sync {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, VfsError>;
    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), VfsError>;
    fn exists(&self, path: &Path) -> bool;
}

/// Rooted view over the real filesystem.
pub struct OsFileSystem {
    root: PathBuf,
}

impl OsFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileSystem for OsFileSystem {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, VfsError> {
        let full = self.resolve(path);
        fs::read(&full).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VfsError::NotFound(full.display().to_string())
            } else {
                VfsError::Io(e)
            }
        })
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), VfsError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, bytes)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let fs = OsFileSystem::new(dir.path());
        fs.write_file(Path::new("a/b.txt"), b"hello").unwrap();
        assert_eq!(b"hello".to_vec(), fs.read_file(Path::new("a/b.txt")).unwrap());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let fs = OsFileSystem::new(dir.path());
        assert!(matches!(
            fs.read_file(Path::new("nope.txt")),
            Err(VfsError::NotFound(_))
        ));
    }
}
