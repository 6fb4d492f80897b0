//! Error types for file I/O operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for file I/O operations.
pub type FsResult<T> = Result<T, FsError>;

/// Errors that can occur while reading or writing store files.
#[derive(Debug, Error)]
pub enum FsError {
    /// The requested file does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The OS refused access to the file.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The file exists but its content is not valid JSON for the
    /// requested type.
    #[error("malformed document: {path}: {source}")]
    Malformed {
        /// Path of the unparsable file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The atomic commit step (temp write, sync, or rename) failed.
    #[error("write failed: {path}: {source}")]
    WriteFailed {
        /// Destination path of the failed write.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Any other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    /// Classifies a read error for `path` into the typed taxonomy.
    pub(crate) fn from_read(path: &std::path::Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
                source: err,
            },
            _ => Self::Io(err),
        }
    }

    /// Wraps a commit-step failure for `path`.
    pub(crate) fn write_failed(path: &std::path::Path, source: io::Error) -> Self {
        Self::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true if this error means the file simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
