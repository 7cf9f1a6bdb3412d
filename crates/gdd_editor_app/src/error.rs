// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors surfaced by the editor front end.

use gdd_editor_graph::GraphError;
use std::path::PathBuf;
use thiserror::Error;

/// Editor application errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Graph, scene or codec failure
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// File access failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Settings file could not be parsed
    #[error("Invalid settings: {0}")]
    Settings(#[from] ron::error::SpannedError),

    /// Settings could not be encoded
    #[error("Failed to encode settings: {0}")]
    Encode(#[from] ron::Error),

    /// Settings written by a newer editor
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },
}

impl AppError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for editor operations
pub type AppResult<T> = std::result::Result<T, AppError>;
