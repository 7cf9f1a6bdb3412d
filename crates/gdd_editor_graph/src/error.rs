// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types shared by the graph store, scene tree and document codec.

use thiserror::Error;

/// Why a `connect` request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionFailure {
    /// One of the pin references does not resolve
    UnresolvedEndpoint,
    /// Both pins have the same direction
    SameDirection,
    /// The pins carry different value types
    TypeMismatch,
}

/// Graph engine errors
#[derive(Debug, Error)]
pub enum GraphError {
    /// An id or pin reference does not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// A pin with this name already exists on the node
    #[error("Pin '{pin}' already exists on node {node}")]
    DuplicatePin {
        /// Node the pin was added to
        node: String,
        /// Colliding pin name
        pin: String,
    },

    /// Direction or type mismatch, or an unresolved endpoint
    #[error("Invalid connection ({kind:?}): {message}")]
    InvalidConnection {
        /// Failure classifier
        kind: ConnectionFailure,
        /// Human-readable detail
        message: String,
    },

    /// A reserved property key was given a value of the wrong shape
    #[error("Invalid property '{key}': {reason}")]
    InvalidProperty {
        /// Offending key
        key: String,
        /// What was expected
        reason: String,
    },

    /// A scene tree move or removal would break the hierarchy
    #[error("Invalid hierarchy operation: {0}")]
    InvalidHierarchy(String),

    /// Malformed or unrecognized persisted document
    #[error("Schema error: {0}")]
    Schema(String),

    /// Underlying storage failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    pub(crate) fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }

    pub(crate) fn invalid_connection(kind: ConnectionFailure, message: impl Into<String>) -> Self {
        Self::InvalidConnection {
            kind,
            message: message.into(),
        }
    }

    /// The connection failure classifier, if this is an `InvalidConnection`
    pub fn connection_failure(&self) -> Option<ConnectionFailure> {
        match self {
            Self::InvalidConnection { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(err.into())
        } else {
            Self::Schema(err.to_string())
        }
    }
}

impl From<ron::error::SpannedError> for GraphError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::Schema(err.to_string())
    }
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Error when the graph contains a cycle
#[derive(Debug, Error)]
#[error("Graph contains a cycle")]
pub struct CycleError;
