// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node kind templates and the closed per-kind property schema.
//!
//! The graph store itself treats kinds as free-form strings. A
//! [`KindRegistry`] is applied at the boundary (property panel, document
//! codec) to reject unknown kinds and unexpected property keys early.

pub mod blueprint;
pub mod flow;
pub mod scene;

use crate::error::{GraphError, Result};
use crate::node::Properties;
use crate::pin::PinTemplate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Keys that map onto node attributes rather than free properties
pub const RESERVED_KEYS: &[&str] = &["name", "kind", "description", "position"];

/// Node kind category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Entry points triggered by the runtime
    Event,
    /// Branching and sequencing
    Logic,
    /// Arithmetic and comparison
    Math,
    /// Variable access
    Variable,
    /// Flow chart steps
    Flow,
    /// Scene composition elements
    Scene,
    /// Utility nodes
    Utility,
    /// Custom/user-defined
    Custom,
}

/// Node kind definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeKind {
    /// Unique kind identifier, as stored in `Node::kind`
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Pins created with every instance
    pub pins: Vec<PinTemplate>,
    /// Allowed property keys; `None` leaves the schema open
    pub properties: Option<Vec<String>>,
}

impl NodeKind {
    /// Create a kind with no pins and an open property schema
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: NodeCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            description: String::new(),
            pins: Vec::new(),
            properties: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a template pin
    pub fn with_pin(mut self, pin: PinTemplate) -> Self {
        self.pins.push(pin);
        self
    }

    /// Close the property schema to the given keys
    pub fn with_properties(mut self, keys: &[&str]) -> Self {
        self.properties = Some(keys.iter().map(|k| (*k).to_string()).collect());
        self
    }

    /// Whether a property key is accepted by this kind
    pub fn allows_property(&self, key: &str) -> bool {
        RESERVED_KEYS.contains(&key)
            || self
                .properties
                .as_ref()
                .map_or(true, |keys| keys.iter().any(|k| k == key))
    }
}

/// Registry of available node kinds
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    /// Registered kinds by ID
    kinds: IndexMap<String, NodeKind>,
}

impl KindRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node kind, replacing any previous kind with the same id
    pub fn register(&mut self, kind: NodeKind) {
        self.kinds.insert(kind.id.clone(), kind);
    }

    /// Get a node kind by ID
    pub fn get(&self, id: &str) -> Option<&NodeKind> {
        self.kinds.get(id)
    }

    /// Whether a kind is registered
    pub fn contains(&self, id: &str) -> bool {
        self.kinds.contains_key(id)
    }

    /// Get all registered kinds
    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values()
    }

    /// Get kinds by category
    pub fn kinds_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values().filter(move |k| k.category == category)
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Check a property map against the schema of `kind`
    pub fn validate_properties(&self, kind: &str, properties: &Properties) -> Result<()> {
        let node_kind = self
            .get(kind)
            .ok_or_else(|| GraphError::not_found(format_args!("node kind '{kind}'")))?;

        match properties.keys().find(|key| !node_kind.allows_property(key)) {
            Some(key) => Err(GraphError::InvalidProperty {
                key: key.clone(),
                reason: format!("not a property of kind '{kind}'"),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinType;
    use serde_json::json;

    fn registry() -> KindRegistry {
        let mut registry = KindRegistry::new();
        registry.register(
            NodeKind::new("text", "Text", NodeCategory::Scene).with_properties(&["text", "font_size"]),
        );
        registry.register(
            NodeKind::new("custom", "Custom", NodeCategory::Custom)
                .with_pin(PinTemplate::input("In", PinType::Object)),
        );
        registry
    }

    #[test]
    fn test_closed_schema_rejects_unknown_keys() {
        let registry = registry();
        let mut props = Properties::new();
        props.insert("text".into(), json!("Hello"));
        props.insert("position".into(), json!([1.0, 2.0]));
        assert!(registry.validate_properties("text", &props).is_ok());

        props.insert("colour".into(), json!("red"));
        let err = registry.validate_properties("text", &props).unwrap_err();
        assert!(matches!(err, GraphError::InvalidProperty { ref key, .. } if key == "colour"));
    }

    #[test]
    fn test_open_schema_and_unknown_kind() {
        let registry = registry();
        let mut props = Properties::new();
        props.insert("anything".into(), json!(1));
        assert!(registry.validate_properties("custom", &props).is_ok());
        assert!(matches!(
            registry.validate_properties("missing", &props),
            Err(GraphError::NotFound(_))
        ));
    }

    #[test]
    fn test_category_filter() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.kinds_in_category(NodeCategory::Scene).count(), 1);
    }
}
