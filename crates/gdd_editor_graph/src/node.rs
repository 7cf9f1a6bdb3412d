// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::pin::{Pin, PinDirection};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Open property mapping shared by graph nodes and scene nodes
pub type Properties = IndexMap<String, serde_json::Value>;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Free-form kind classifier
    pub kind: String,
    /// Position in the graph view
    pub position: [f32; 2],
    /// Pins by name, in insertion order
    pub pins: IndexMap<String, Pin>,
    /// Arbitrary properties
    pub properties: Properties,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: impl Into<String>, position: [f32; 2]) -> Self {
        let kind = kind.into();
        Self {
            id,
            name: kind.clone(),
            kind,
            position,
            pins: IndexMap::new(),
            properties: Properties::new(),
        }
    }

    /// Get a pin by name
    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.get(name)
    }

    /// Get all pins
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.values()
    }

    /// Input pins, in insertion order
    pub fn input_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins_with_direction(PinDirection::Input)
    }

    /// Output pins, in insertion order
    pub fn output_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins_with_direction(PinDirection::Output)
    }

    fn pins_with_direction(&self, direction: PinDirection) -> impl Iterator<Item = &Pin> {
        self.pins.values().filter(move |p| p.direction == direction)
    }

    /// Get a property value
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}
