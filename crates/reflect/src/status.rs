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

use std::fmt;

/// Engine-wide error taxonomy — mirrors the original `StatusCode` enum 1:1.
/// Crate-local `thiserror` error types convert into this at their API
/// boundary so the whole system ends up observable through one vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    Error,
    NotImplemented,
    FailedInstantiate,
    FailedLoadLibrary,
    FailedLoadSymbol,
    FailedOpenFile,
    FailedFindFile,
    FailedParse,
    FailedRead,
    FailedWrite,
    FailedEncode,
    FailedDecode,
    FailedResize,
    FailedCompress,
    FailedDecompress,
    FailedCompile,
    InvalidData,
    InvalidParameter,
    InvalidState,
    NoProperty,
    NoMethod,
    NoClass,
    NoValue,
    NoAsset,
    ExitCode0,
    ExitCode1,
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Ok => "Ok",
            StatusCode::Error => "Error",
            StatusCode::NotImplemented => "NotImplemented",
            StatusCode::FailedInstantiate => "FailedInstantiate",
            StatusCode::FailedLoadLibrary => "FailedLoadLibrary",
            StatusCode::FailedLoadSymbol => "FailedLoadSymbol",
            StatusCode::FailedOpenFile => "FailedOpenFile",
            StatusCode::FailedFindFile => "FailedFindFile",
            StatusCode::FailedParse => "FailedParse",
            StatusCode::FailedRead => "FailedRead",
            StatusCode::FailedWrite => "FailedWrite",
            StatusCode::FailedEncode => "FailedEncode",
            StatusCode::FailedDecode => "FailedDecode",
            StatusCode::FailedResize => "FailedResize",
            StatusCode::FailedCompress => "FailedCompress",
            StatusCode::FailedDecompress => "FailedDecompress",
            StatusCode::FailedCompile => "FailedCompile",
            StatusCode::InvalidData => "InvalidData",
            StatusCode::InvalidParameter => "InvalidParameter",
            StatusCode::InvalidState => "InvalidState",
            StatusCode::NoProperty => "NoProperty",
            StatusCode::NoMethod => "NoMethod",
            StatusCode::NoClass => "NoClass",
            StatusCode::NoValue => "NoValue",
            StatusCode::NoAsset => "NoAsset",
            StatusCode::ExitCode0 => "ExitCode0",
            StatusCode::ExitCode1 => "ExitCode1",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status code plus an optional human-readable message, used in place of
/// exceptions at fallible API boundaries that don't need a richer error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: StatusCode,
    message: String,
}

impl Status {
    pub fn ok() -> Self {
        Self {
            code: StatusCode::Ok,
            message: String::new(),
        }
    }

    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_code(code: StatusCode) -> Self {
        Self {
            code,
            message: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }

    pub fn is_error(&self) -> bool {
        !self.is_ok()
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ok()
    }
}

impl From<StatusCode> for Status {
    fn from(code: StatusCode) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "'{}'", self.code)
        } else {
            write!(f, "'{}': {}", self.code, self.message)
        }
    }
}

impl std::error::Error for Status {}

pub type StatusResult<T> = Result<T, Status>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ok_status_is_ok() {
        assert!(Status::ok().is_ok());
        assert!(!Status::from_code(StatusCode::Error).is_ok());
    }

    #[test]
    fn display_includes_message_when_present() {
        let s = Status::new(StatusCode::FailedParse, "unexpected token");
        assert_eq!("'FailedParse': unexpected token", s.to_string());
        assert_eq!("'Ok'", Status::ok().to_string());
    }
}
