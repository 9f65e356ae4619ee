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

use forge_reflect::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse {0}")]
    Parse(String),
    #[error("no asset pack has metadata for {0}")]
    NoSuchAsset(String),
}

impl From<&VfsError> for StatusCode {
    fn from(err: &VfsError) -> Self {
        match err {
            VfsError::NotFound(_) => StatusCode::FailedFindFile,
            VfsError::Io(_) => StatusCode::FailedOpenFile,
            VfsError::Parse(_) => StatusCode::FailedParse,
            VfsError::NoSuchAsset(_) => StatusCode::NoAsset,
        }
    }
}
