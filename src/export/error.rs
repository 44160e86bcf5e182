//! Error type for export writers.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing export documents.
#[derive(Debug, Error)]
pub enum ExportError {
    /// File system error writing the document.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Creates an IO error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
