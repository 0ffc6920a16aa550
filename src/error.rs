//! Error types for the synchronizer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A required source root does not exist.
    #[error("Source directory does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// Read, write or delete failure on a specific path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two source units resolve to the same target name.
    #[error(
        "Unit name collision for '{name}': {} and {}",
        first.display(),
        second.display()
    )]
    NameCollision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn walk(root: &std::path::Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        SyncError::Io { path, source }
    }
}

/// Attach the offending path to an `io::Result`.
pub(crate) trait IoResultExt<T> {
    fn at(self, path: &std::path::Path) -> Result<T, SyncError>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at(self, path: &std::path::Path) -> Result<T, SyncError> {
        self.map_err(|e| SyncError::io(path, e))
    }
}
