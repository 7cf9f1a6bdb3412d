// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document codec: conversion between graphs/scenes and persisted text.
//!
//! Loading is all-or-nothing. A document is parsed into plain document
//! structs first and then validated while a fresh store is built; the
//! store is only handed back when every node, pin and connection passed.

use crate::connection::{Connection, ConnectionId};
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::kinds::KindRegistry;
use crate::node::{Node, NodeId, Properties};
use crate::pin::{Pin, PinDirection, PinRef, PinType};
use crate::scene::{SceneNode, SceneNodeData, SceneNodeId, SceneTree};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Current document format version
pub const FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    FORMAT_VERSION
}

/// Textual encoding of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// JSON
    #[default]
    Json,
    /// Rusty Object Notation
    Ron,
}

impl DocumentFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "ron" => Some(Self::Ron),
            _ => None,
        }
    }

    /// Preferred file extension
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Ron => "ron",
        }
    }
}

// -------------------------------------------------------------------------
// Document structs
// -------------------------------------------------------------------------

/// Persisted graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Nodes in creation order
    pub nodes: Vec<NodeDocument>,
    /// Connections in creation order
    #[serde(default)]
    pub connections: Vec<ConnectionDocument>,
}

/// Persisted graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    /// Node ID
    pub id: NodeId,
    /// Kind classifier
    pub kind: String,
    /// Display name; defaults to the kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Position in the graph view
    pub position: [f32; 2],
    /// Pins in insertion order
    #[serde(default)]
    pub pins: Vec<PinDocument>,
    /// Properties
    #[serde(default)]
    pub properties: Properties,
}

/// Persisted pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinDocument {
    /// Pin name
    pub name: String,
    /// Value type
    #[serde(rename = "type")]
    pub pin_type: PinType,
    /// Direction
    pub direction: PinDirection,
}

/// Persisted connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDocument {
    /// Connection ID
    pub id: ConnectionId,
    /// Output endpoint
    pub output: PinRef,
    /// Input endpoint
    pub input: PinRef,
}

/// Persisted scene node (recursive). The root also carries the version
/// and the scene name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNodeDocument {
    /// Format version, root only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Scene name, root only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    /// Node ID; a fresh one is assigned when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SceneNodeId>,
    /// Node name
    pub name: String,
    /// Kind classifier
    pub kind: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Properties
    #[serde(default)]
    pub properties: Properties,
    /// Child nodes
    #[serde(default)]
    pub children: Vec<SceneNodeDocument>,
}

// -------------------------------------------------------------------------
// Codec
// -------------------------------------------------------------------------

/// Serializes and deserializes graphs and scene trees
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentCodec<'a> {
    format: DocumentFormat,
    pretty: bool,
    kinds: Option<&'a KindRegistry>,
}

impl<'a> DocumentCodec<'a> {
    /// Create a codec for a format, compact output, free-form kinds
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: false,
            kinds: None,
        }
    }

    /// Pretty-print output
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Reject node kinds and properties not allowed by `kinds` when loading
    pub fn with_kinds(mut self, kinds: &'a KindRegistry) -> Self {
        self.kinds = Some(kinds);
        self
    }

    /// Format in use
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Serialize a graph
    pub fn serialize_graph(&self, graph: &Graph) -> Result<String> {
        self.encode(&graph_to_document(graph))
    }

    /// Deserialize a graph
    pub fn deserialize_graph(&self, text: &str) -> Result<Graph> {
        let document: GraphDocument = self.decode(text)?;
        graph_from_document(document, self.kinds)
    }

    /// Serialize a scene tree
    pub fn serialize_scene(&self, scene: &SceneTree) -> Result<String> {
        self.encode(&scene_to_document(scene))
    }

    /// Deserialize a scene tree
    pub fn deserialize_scene(&self, text: &str) -> Result<SceneTree> {
        let document: SceneNodeDocument = self.decode(text)?;
        scene_from_document(document, self.kinds)
    }

    fn encode<T: Serialize>(&self, document: &T) -> Result<String> {
        let text = match (self.format, self.pretty) {
            (DocumentFormat::Json, true) => serde_json::to_string_pretty(document)?,
            (DocumentFormat::Json, false) => serde_json::to_string(document)?,
            (DocumentFormat::Ron, true) => {
                ron::ser::to_string_pretty(document, ron::ser::PrettyConfig::default())
                    .map_err(ron_error)?
            }
            (DocumentFormat::Ron, false) => ron::to_string(document).map_err(ron_error)?,
        };
        Ok(text)
    }

    fn decode<T: for<'de> Deserialize<'de>>(&self, text: &str) -> Result<T> {
        let document = match self.format {
            DocumentFormat::Json => serde_json::from_str(text)?,
            DocumentFormat::Ron => ron::from_str(text)?,
        };
        Ok(document)
    }
}

fn ron_error(err: ron::Error) -> GraphError {
    GraphError::Schema(err.to_string())
}

fn schema(message: impl Into<String>) -> GraphError {
    GraphError::Schema(message.into())
}

fn check_version(version: u32) -> Result<()> {
    if version > FORMAT_VERSION {
        return Err(schema(format!(
            "document version {version} is newer than supported version {FORMAT_VERSION}"
        )));
    }
    Ok(())
}

fn check_kind(kind: &str, properties: &Properties, kinds: Option<&KindRegistry>) -> Result<()> {
    if kind.is_empty() {
        return Err(schema("node kind must not be empty"));
    }
    if let Some(kinds) = kinds {
        if !kinds.contains(kind) {
            return Err(schema(format!("unrecognized node kind '{kind}'")));
        }
        kinds
            .validate_properties(kind, properties)
            .map_err(|e| schema(e.to_string()))?;
    }
    Ok(())
}

// -------------------------------------------------------------------------
// Graph conversion
// -------------------------------------------------------------------------

/// Build the document form of a graph, preserving insertion order
pub fn graph_to_document(graph: &Graph) -> GraphDocument {
    GraphDocument {
        version: FORMAT_VERSION,
        nodes: graph
            .nodes()
            .map(|node| NodeDocument {
                id: node.id,
                kind: node.kind.clone(),
                name: (node.name != node.kind).then(|| node.name.clone()),
                position: node.position,
                pins: node
                    .pins()
                    .map(|pin| PinDocument {
                        name: pin.name.clone(),
                        pin_type: pin.pin_type,
                        direction: pin.direction,
                    })
                    .collect(),
                properties: node.properties.clone(),
            })
            .collect(),
        connections: graph
            .connections()
            .map(|c| ConnectionDocument {
                id: c.id,
                output: c.output.clone(),
                input: c.input.clone(),
            })
            .collect(),
    }
}

/// Build a graph from its document form, validating everything
pub fn graph_from_document(document: GraphDocument, kinds: Option<&KindRegistry>) -> Result<Graph> {
    check_version(document.version)?;

    let mut graph = Graph::new();
    for node_doc in document.nodes {
        if graph.find_node(node_doc.id).is_some() {
            return Err(schema(format!("duplicate node id {}", node_doc.id)));
        }
        check_kind(&node_doc.kind, &node_doc.properties, kinds)?;
        if !node_doc.position.iter().all(|c| c.is_finite()) {
            return Err(schema(format!(
                "node {}: position {:?} is not finite",
                node_doc.id, node_doc.position
            )));
        }

        let mut node = Node::new(node_doc.id, node_doc.kind, node_doc.position);
        if let Some(name) = node_doc.name {
            node.name = name;
        }
        for pin in node_doc.pins {
            if node.pins.contains_key(&pin.name) {
                return Err(schema(format!("duplicate pin '{}' on node {}", pin.name, node.id)));
            }
            node.pins.insert(
                pin.name.clone(),
                Pin::new(node.id, pin.name, pin.pin_type, pin.direction),
            );
        }
        node.properties = node_doc.properties;
        graph.insert_node(node);
    }

    for connection in document.connections {
        if graph.contains_connection(connection.id) {
            return Err(schema(format!("duplicate connection id {}", connection.id)));
        }
        let (output, input) = graph
            .validate_endpoints(&connection.output, &connection.input)
            .map_err(|e| schema(format!("connection {}: {e}", connection.id)))?;
        if output != connection.output {
            return Err(schema(format!(
                "connection {}: 'output' refers to an input pin",
                connection.id
            )));
        }
        graph.attach_connection(Connection::new(connection.id, output, input));
    }

    tracing::debug!(
        nodes = graph.node_count(),
        connections = graph.connection_count(),
        "decoded graph document"
    );
    Ok(graph)
}

// -------------------------------------------------------------------------
// Scene conversion
// -------------------------------------------------------------------------

/// Build the document form of a scene tree
pub fn scene_to_document(scene: &SceneTree) -> SceneNodeDocument {
    fn convert(node: &SceneNode) -> SceneNodeDocument {
        SceneNodeDocument {
            version: None,
            scene: None,
            id: Some(node.id),
            name: node.name.clone(),
            kind: node.kind.clone(),
            description: node.description.clone(),
            properties: node.properties.clone(),
            children: node.children.iter().map(convert).collect(),
        }
    }

    let mut root = convert(scene.root());
    root.version = Some(FORMAT_VERSION);
    root.scene = Some(scene.name().to_string());
    root
}

/// Build a scene tree from its document form, validating everything
pub fn scene_from_document(
    document: SceneNodeDocument,
    kinds: Option<&KindRegistry>,
) -> Result<SceneTree> {
    fn convert(
        doc: SceneNodeDocument,
        kinds: Option<&KindRegistry>,
        seen: &mut HashSet<SceneNodeId>,
    ) -> Result<SceneNode> {
        check_kind(&doc.kind, &doc.properties, kinds)?;
        let id = doc.id.unwrap_or_default();
        if !seen.insert(id) {
            return Err(schema(format!("duplicate scene node id {id}")));
        }

        let data = SceneNodeData {
            name: doc.name,
            kind: doc.kind,
            description: doc.description,
            properties: doc.properties,
        };
        let mut node = SceneNode::from_data(id, data);
        for child in doc.children {
            node.children.push(convert(child, kinds, seen)?);
        }
        Ok(node)
    }

    check_version(document.version.unwrap_or(FORMAT_VERSION))?;
    let name = document.scene.clone().unwrap_or_else(|| document.name.clone());
    let mut seen = HashSet::new();
    let root = convert(document, kinds, &mut seen)?;

    tracing::debug!(nodes = seen.len(), "decoded scene document");
    Ok(SceneTree::from_root(name, root))
}
