// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur in aliasfs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed retry parameters, alias sets, extensions or paths.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Target already exists: {}", .0.display())]
    TargetExists(PathBuf),

    /// The OS error left over once the retry budget is spent.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn source_not_found<P: AsRef<Path>>(path: P) -> Self {
        Error::SourceNotFound(path.as_ref().to_path_buf())
    }

    pub fn target_exists<P: AsRef<Path>>(path: P) -> Self {
        Error::TargetExists(path.as_ref().to_path_buf())
    }

    pub fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Kind of the underlying OS error, if this is an I/O failure.
    #[must_use]
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// Programmer errors and copy/move outcomes fail fast; everything else is
    /// worth another attempt.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            Error::InvalidArgument(_) | Error::SourceNotFound(_) | Error::TargetExists(_)
        )
    }
}
