// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use crate::pin::PinRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A connection from an output pin to an input pin
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source (output) pin
    pub output: PinRef,
    /// Target (input) pin
    pub input: PinRef,
}

impl Connection {
    pub(crate) fn new(id: ConnectionId, output: PinRef, input: PinRef) -> Self {
        Self { id, output, input }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.output.node == node_id || self.input.node == node_id
    }

    /// Check if this connection involves a specific pin
    pub fn involves_pin(&self, pin: &PinRef) -> bool {
        self.output == *pin || self.input == *pin
    }

    /// Both endpoints, output first
    pub fn endpoints(&self) -> [&PinRef; 2] {
        [&self.output, &self.input]
    }
}
