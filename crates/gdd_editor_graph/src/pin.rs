// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pin definitions for node inputs/outputs.

use crate::connection::ConnectionId;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// Input pin
    Input,
    /// Output pin
    Output,
}

impl PinDirection {
    /// The direction a compatible peer must have
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }

    /// Literal used in persisted documents
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for PinDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PinDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Self::Input),
            "output" => Ok(Self::Output),
            other => Err(format!("unknown pin direction '{other}'")),
        }
    }
}

/// Value type that can flow through pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinType {
    /// Execution signal (for blueprint graphs)
    Exec,
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// String value
    String,
    /// Object reference
    Object,
}

impl PinType {
    /// All pin types, in declaration order
    pub fn all() -> &'static [PinType] {
        &[
            PinType::Exec,
            PinType::Bool,
            PinType::Int,
            PinType::Float,
            PinType::String,
            PinType::Object,
        ]
    }

    /// Literal used in persisted documents
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exec => "exec",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Object => "object",
        }
    }

    /// Check if this type can connect to another type.
    ///
    /// There are no implicit conversions: only identical types connect.
    pub fn can_connect_to(self, other: PinType) -> bool {
        self == other
    }
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PinType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown pin type '{s}'"))
    }
}

/// Address of a pin: owning node plus pin name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinRef {
    /// Owning node
    pub node: NodeId,
    /// Pin name, unique within the node
    pub pin: String,
}

impl PinRef {
    /// Create a new pin reference
    pub fn new(node: NodeId, pin: impl Into<String>) -> Self {
        Self {
            node,
            pin: pin.into(),
        }
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.pin)
    }
}

/// A pin on a node.
///
/// Direction and type are fixed at creation; pins are only created and
/// destroyed through [`crate::Graph`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Pin {
    /// Pin name
    pub name: String,
    /// Data type
    pub pin_type: PinType,
    /// Pin direction
    pub direction: PinDirection,
    /// Owning node
    pub node: NodeId,
    /// Connections attached to this pin, in creation order
    pub connections: Vec<ConnectionId>,
}

impl Pin {
    pub(crate) fn new(
        node: NodeId,
        name: impl Into<String>,
        pin_type: PinType,
        direction: PinDirection,
    ) -> Self {
        Self {
            name: name.into(),
            pin_type,
            direction,
            node,
            connections: Vec::new(),
        }
    }

    /// Reference to this pin
    pub fn pin_ref(&self) -> PinRef {
        PinRef::new(self.node, self.name.clone())
    }

    /// Whether any connection is attached
    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    /// Check if a connection to another pin is valid
    pub fn can_connect(&self, other: &Pin) -> bool {
        self.direction == other.direction.opposite() && self.pin_type.can_connect_to(other.pin_type)
    }
}

/// Pin declaration used by node kind templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinTemplate {
    /// Pin name
    pub name: String,
    /// Data type
    #[serde(rename = "type")]
    pub pin_type: PinType,
    /// Pin direction
    pub direction: PinDirection,
}

impl PinTemplate {
    /// Declare an input pin
    pub fn input(name: impl Into<String>, pin_type: PinType) -> Self {
        Self {
            name: name.into(),
            pin_type,
            direction: PinDirection::Input,
        }
    }

    /// Declare an output pin
    pub fn output(name: impl Into<String>, pin_type: PinType) -> Self {
        Self {
            name: name.into(),
            pin_type,
            direction: PinDirection::Output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_parse_back() {
        for t in PinType::all() {
            assert_eq!(t.as_str().parse::<PinType>().unwrap(), *t);
        }
        assert_eq!("input".parse::<PinDirection>().unwrap(), PinDirection::Input);
        assert!("unknown-type".parse::<PinType>().is_err());
        assert!("sideways".parse::<PinDirection>().is_err());
    }

    #[test]
    fn test_serde_literals() {
        assert_eq!(serde_json::to_string(&PinType::Exec).unwrap(), "\"exec\"");
        assert_eq!(serde_json::to_string(&PinDirection::Output).unwrap(), "\"output\"");
        assert!(serde_json::from_str::<PinType>("\"vector3\"").is_err());
    }

    #[test]
    fn test_can_connect() {
        let node = NodeId::new();
        let out = Pin::new(node, "out", PinType::Int, PinDirection::Output);
        let input = Pin::new(node, "in", PinType::Int, PinDirection::Input);
        let float_in = Pin::new(node, "f", PinType::Float, PinDirection::Input);

        assert!(out.can_connect(&input));
        assert!(input.can_connect(&out));
        assert!(!out.can_connect(&out));
        assert!(!out.can_connect(&float_in));
    }
}
