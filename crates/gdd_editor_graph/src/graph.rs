// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph store containing nodes and connections.
//!
//! All structural mutation goes through [`Graph`], which keeps these
//! invariants after every call:
//! - every connection links an output pin to an input pin of the same type
//! - every connection endpoint resolves to a pin of a node in the store
//! - each pin's connection list mirrors the store's connection map
//!
//! Each successful top-level mutation fires exactly one [`GraphEvent`].
//! Cycles are not rejected by [`Graph::connect`]; use
//! [`Graph::has_cycle`] where a caller needs acyclic dataflow.

use crate::connection::{Connection, ConnectionId};
use crate::error::{ConnectionFailure, CycleError, GraphError, Result};
use crate::kinds::KindRegistry;
use crate::node::{Node, NodeId};
use crate::notify::{Notifier, SubscriptionId};
use crate::pin::{Pin, PinDirection, PinRef, PinType};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;

/// Structural change reported to graph observers
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    /// A node was created
    NodeCreated(NodeId),
    /// A node's name, position or properties changed
    NodeUpdated(NodeId),
    /// A node was deleted together with its pins and their connections
    NodeDeleted {
        /// Deleted node
        node: NodeId,
        /// Names of the pins it owned
        pins: Vec<String>,
        /// Connections removed by the cascade
        connections: Vec<ConnectionId>,
    },
    /// A pin was added
    PinAdded(PinRef),
    /// A pin was removed together with its connections
    PinRemoved {
        /// Removed pin
        pin: PinRef,
        /// Connections removed by the cascade
        connections: Vec<ConnectionId>,
    },
    /// A connection was created
    Connected(ConnectionId),
    /// A connection was removed
    Disconnected(ConnectionId),
    /// Every node and connection was removed
    Cleared,
}

/// A node graph
#[derive(Debug, Default)]
pub struct Graph {
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between pins
    connections: IndexMap<ConnectionId, Connection>,
    /// Change observers
    notifier: Notifier<Graph, GraphEvent>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    /// Register an observer called after every successful mutation
    pub fn subscribe(&mut self, callback: impl Fn(&Graph, &GraphEvent) + 'static) -> SubscriptionId {
        self.notifier.subscribe(callback)
    }

    /// Remove an observer
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn notify(&self, event: GraphEvent) {
        self.notifier.emit(self, &event);
    }

    // ---------------------------------------------------------------------
    // Nodes
    // ---------------------------------------------------------------------

    /// Create a node with no pins and empty properties.
    ///
    /// Coordinates that are not finite are replaced with `0.0`.
    pub fn create_node(&mut self, kind: impl Into<String>, position: [f32; 2]) -> &Node {
        let finite = position.map(|c| if c.is_finite() { c } else { 0.0 });
        if finite != position {
            tracing::warn!(?position, "replaced non-finite node position");
        }
        let node = Node::new(NodeId::new(), kind, finite);
        let id = node.id;
        tracing::debug!(node = %id, kind = %node.kind, "created node");
        self.nodes.insert(id, node);
        self.notify(GraphEvent::NodeCreated(id));
        &self.nodes[&id]
    }

    /// Create a node carrying the template pins of a registered kind
    pub fn create_node_from_kind(
        &mut self,
        kinds: &KindRegistry,
        kind: &str,
        position: [f32; 2],
    ) -> Result<&Node> {
        let template = kinds
            .get(kind)
            .ok_or_else(|| GraphError::not_found(format_args!("node kind '{kind}'")))?;
        let position = finite_position("position", position)?;

        let mut node = Node::new(NodeId::new(), kind, position);
        node.name = template.name.clone();
        for pin in &template.pins {
            if node.pins.contains_key(&pin.name) {
                return Err(GraphError::DuplicatePin {
                    node: node.id.to_string(),
                    pin: pin.name.clone(),
                });
            }
            node.pins.insert(
                pin.name.clone(),
                Pin::new(node.id, pin.name.clone(), pin.pin_type, pin.direction),
            );
        }

        let id = node.id;
        tracing::debug!(node = %id, kind, pins = node.pins.len(), "created node from kind");
        self.nodes.insert(id, node);
        self.notify(GraphEvent::NodeCreated(id));
        Ok(&self.nodes[&id])
    }

    /// Delete a node, its pins, and every connection touching those pins
    pub fn delete_node(&mut self, node_id: NodeId) -> Result<Node> {
        let node = self.node_or_not_found(node_id)?;

        // Snapshot before detaching; a same-node connection appears twice.
        let affected: IndexSet<ConnectionId> = node
            .pins
            .values()
            .flat_map(|p| p.connections.iter().copied())
            .collect();

        let connections: Vec<ConnectionId> = affected
            .into_iter()
            .filter(|id| self.detach_connection(*id).is_some())
            .collect();

        let Some(node) = self.nodes.shift_remove(&node_id) else {
            return Err(GraphError::not_found(format_args!("node {node_id}")));
        };

        tracing::debug!(node = %node_id, connections = connections.len(), "deleted node");
        self.notify(GraphEvent::NodeDeleted {
            node: node_id,
            pins: node.pins.keys().cloned().collect(),
            connections,
        });
        Ok(node)
    }

    /// Change a node's display name
    pub fn rename_node(&mut self, node_id: NodeId, name: impl Into<String>) -> Result<()> {
        self.node_mut_or_not_found(node_id)?.name = name.into();
        self.notify(GraphEvent::NodeUpdated(node_id));
        Ok(())
    }

    /// Move a node
    pub fn move_node(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<()> {
        let position = finite_position("position", position)?;
        self.node_mut_or_not_found(node_id)?.position = position;
        self.notify(GraphEvent::NodeUpdated(node_id));
        Ok(())
    }

    /// Merge properties into a node.
    ///
    /// `"name"` (string) and `"position"` (`[x, y]`) update the node's
    /// attributes; every other key is stored as-is. Shapes are checked
    /// before anything is applied.
    pub fn update_properties<K>(
        &mut self,
        node_id: NodeId,
        properties: impl IntoIterator<Item = (K, serde_json::Value)>,
    ) -> Result<()>
    where
        K: Into<String>,
    {
        self.node_or_not_found(node_id)?;

        let mut name = None;
        let mut position = None;
        let mut rest = Vec::new();
        for (key, value) in properties {
            let key = key.into();
            match key.as_str() {
                "name" => name = Some(reserved_string(&key, value)?),
                "position" => position = Some(reserved_position(&key, &value)?),
                _ => rest.push((key, value)),
            }
        }

        let node = self.node_mut_or_not_found(node_id)?;
        if let Some(name) = name {
            node.name = name;
        }
        if let Some(position) = position {
            node.position = position;
        }
        let merged = rest.len();
        node.properties.extend(rest);

        tracing::debug!(node = %node_id, merged, "updated node properties");
        self.notify(GraphEvent::NodeUpdated(node_id));
        Ok(())
    }

    /// Get a node by ID
    pub fn find_node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get all nodes, in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node_or_not_found(&self, node_id: NodeId) -> Result<&Node> {
        self.nodes
            .get(&node_id)
            .ok_or_else(|| GraphError::not_found(format_args!("node {node_id}")))
    }

    fn node_mut_or_not_found(&mut self, node_id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&node_id)
            .ok_or_else(|| GraphError::not_found(format_args!("node {node_id}")))
    }

    // ---------------------------------------------------------------------
    // Pins
    // ---------------------------------------------------------------------

    /// Add a pin to a node
    pub fn add_pin(
        &mut self,
        node_id: NodeId,
        name: impl Into<String>,
        pin_type: PinType,
        direction: PinDirection,
    ) -> Result<&Pin> {
        let name = name.into();
        let node = self.node_mut_or_not_found(node_id)?;
        if node.pins.contains_key(&name) {
            tracing::warn!(node = %node_id, pin = %name, "rejected duplicate pin");
            return Err(GraphError::DuplicatePin {
                node: node_id.to_string(),
                pin: name,
            });
        }

        node.pins
            .insert(name.clone(), Pin::new(node_id, name.clone(), pin_type, direction));
        tracing::debug!(node = %node_id, pin = %name, %pin_type, %direction, "added pin");

        let pin_ref = PinRef::new(node_id, name);
        self.notify(GraphEvent::PinAdded(pin_ref.clone()));
        Ok(&self.nodes[&node_id].pins[&pin_ref.pin])
    }

    /// Remove a pin and every connection attached to it
    pub fn remove_pin(&mut self, node_id: NodeId, name: &str) -> Result<Pin> {
        let pin = self
            .find_pin(node_id, name)
            .ok_or_else(|| GraphError::not_found(format_args!("pin {node_id}.{name}")))?;

        let affected: IndexSet<ConnectionId> = pin.connections.iter().copied().collect();
        let connections: Vec<ConnectionId> = affected
            .into_iter()
            .filter(|id| self.detach_connection(*id).is_some())
            .collect();

        let pin = self
            .node_mut_or_not_found(node_id)?
            .pins
            .shift_remove(name)
            .ok_or_else(|| GraphError::not_found(format_args!("pin {node_id}.{name}")))?;

        tracing::debug!(node = %node_id, pin = name, connections = connections.len(), "removed pin");
        self.notify(GraphEvent::PinRemoved {
            pin: pin.pin_ref(),
            connections,
        });
        Ok(pin)
    }

    /// Get a pin by owning node and name
    pub fn find_pin(&self, node_id: NodeId, name: &str) -> Option<&Pin> {
        self.nodes.get(&node_id)?.pins.get(name)
    }

    /// Resolve a pin reference
    pub fn resolve(&self, pin: &PinRef) -> Option<&Pin> {
        self.find_pin(pin.node, &pin.pin)
    }

    // ---------------------------------------------------------------------
    // Connections
    // ---------------------------------------------------------------------

    /// Connect an output pin to an input pin.
    ///
    /// The arguments may be given in either order; the stored connection
    /// always has the output pin as `output`. Fan-in and fan-out are
    /// allowed. On failure nothing changes.
    pub fn connect(&mut self, output: &PinRef, input: &PinRef) -> Result<&Connection> {
        let (output, input) = match self.validate_endpoints(output, input) {
            Ok(endpoints) => endpoints,
            Err(err) => {
                tracing::warn!(%output, %input, error = %err, "rejected connection");
                return Err(err);
            }
        };

        let id = ConnectionId::new();
        tracing::debug!(connection = %id, %output, %input, "connected");
        self.attach_connection(Connection::new(id, output, input));
        self.notify(GraphEvent::Connected(id));
        Ok(&self.connections[&id])
    }

    /// Remove a connection. Removing the same id twice fails the second time.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Result<Connection> {
        let connection = self
            .detach_connection(connection_id)
            .ok_or_else(|| GraphError::not_found(format_args!("connection {connection_id}")))?;
        tracing::debug!(connection = %connection_id, "disconnected");
        self.notify(GraphEvent::Disconnected(connection_id));
        Ok(connection)
    }

    /// Get a connection by ID
    pub fn find_connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections, in creation order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get connections attached to a pin, in the pin's order
    pub fn connections_for_pin<'a>(&'a self, pin: &PinRef) -> impl Iterator<Item = &'a Connection> + 'a {
        self.resolve(pin)
            .into_iter()
            .flat_map(|p| p.connections.iter())
            .filter_map(move |id| self.connections.get(id))
    }

    /// Resolve both endpoints, then check direction, then type.
    /// Returns the pair ordered as (output, input).
    pub(crate) fn validate_endpoints(&self, a: &PinRef, b: &PinRef) -> Result<(PinRef, PinRef)> {
        let pin_a = self.resolve(a).ok_or_else(|| unresolved(a))?;
        let pin_b = self.resolve(b).ok_or_else(|| unresolved(b))?;

        if pin_a.direction == pin_b.direction {
            return Err(GraphError::invalid_connection(
                ConnectionFailure::SameDirection,
                format!("{a} and {b} are both {}", pin_a.direction),
            ));
        }
        if !pin_a.pin_type.can_connect_to(pin_b.pin_type) {
            return Err(GraphError::invalid_connection(
                ConnectionFailure::TypeMismatch,
                format!("{a} is {} but {b} is {}", pin_a.pin_type, pin_b.pin_type),
            ));
        }

        Ok(match pin_a.direction {
            PinDirection::Output => (a.clone(), b.clone()),
            PinDirection::Input => (b.clone(), a.clone()),
        })
    }

    /// Insert an already validated connection and link it from both pins
    pub(crate) fn attach_connection(&mut self, connection: Connection) {
        let id = connection.id;
        for endpoint in connection.endpoints() {
            if let Some(pin) = self
                .nodes
                .get_mut(&endpoint.node)
                .and_then(|n| n.pins.get_mut(&endpoint.pin))
            {
                pin.connections.push(id);
            }
        }
        self.connections.insert(id, connection);
    }

    /// Remove a connection from the store and from both endpoint pins
    fn detach_connection(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.shift_remove(&connection_id)?;
        for endpoint in connection.endpoints() {
            if let Some(pin) = self
                .nodes
                .get_mut(&endpoint.node)
                .and_then(|n| n.pins.get_mut(&endpoint.pin))
            {
                pin.connections.retain(|c| *c != connection_id);
            }
        }
        Some(connection)
    }

    pub(crate) fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    pub(crate) fn contains_connection(&self, connection_id: ConnectionId) -> bool {
        self.connections.contains_key(&connection_id)
    }

    /// Remove every node and connection
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        tracing::debug!("cleared graph");
        self.notify(GraphEvent::Cleared);
    }

    // ---------------------------------------------------------------------
    // Ordering
    // ---------------------------------------------------------------------

    /// Get nodes in dependency order (upstream before downstream)
    pub fn topological_order(&self) -> std::result::Result<Vec<NodeId>, CycleError> {
        let mut visited = HashSet::new();
        let mut temp_mark = HashSet::new();
        let mut order = Vec::new();

        for node_id in self.nodes.keys() {
            if !visited.contains(node_id) {
                self.visit(*node_id, &mut visited, &mut temp_mark, &mut order)?;
            }
        }

        Ok(order)
    }

    /// Whether connections form a cycle (including a node feeding itself)
    pub fn has_cycle(&self) -> bool {
        self.topological_order().is_err()
    }

    fn visit(
        &self,
        node_id: NodeId,
        visited: &mut HashSet<NodeId>,
        temp_mark: &mut HashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> std::result::Result<(), CycleError> {
        if temp_mark.contains(&node_id) {
            return Err(CycleError);
        }
        if visited.contains(&node_id) {
            return Ok(());
        }

        temp_mark.insert(node_id);

        // Visit all nodes that this node depends on
        for connection in self.connections_for_node(node_id) {
            if connection.input.node == node_id {
                self.visit(connection.output.node, visited, temp_mark, order)?;
            }
        }

        temp_mark.remove(&node_id);
        visited.insert(node_id);
        order.push(node_id);

        Ok(())
    }
}

/// Structural equality: same nodes, pins, connections and properties.
/// Observers are not compared.
impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.connections == other.connections
    }
}

fn unresolved(pin: &PinRef) -> GraphError {
    GraphError::invalid_connection(
        ConnectionFailure::UnresolvedEndpoint,
        format!("pin {pin} does not exist"),
    )
}

fn reserved_string(key: &str, value: serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        other => Err(GraphError::InvalidProperty {
            key: key.to_string(),
            reason: format!("expected a string, got {other}"),
        }),
    }
}

fn reserved_position(key: &str, value: &serde_json::Value) -> Result<[f32; 2]> {
    let invalid = || GraphError::InvalidProperty {
        key: key.to_string(),
        reason: format!("expected [x, y], got {value}"),
    };
    match value.as_array().map(Vec::as_slice) {
        Some([x, y]) => {
            let x = x.as_f64().ok_or_else(invalid)?;
            let y = y.as_f64().ok_or_else(invalid)?;
            finite_position(key, [x as f32, y as f32])
        }
        _ => Err(invalid()),
    }
}

/// Positions must survive a JSON round trip, which has no infinity or NaN
fn finite_position(key: &str, position: [f32; 2]) -> Result<[f32; 2]> {
    if position.iter().all(|c| c.is_finite()) {
        Ok(position)
    } else {
        Err(GraphError::InvalidProperty {
            key: key.to_string(),
            reason: format!("coordinates must be finite f32 values, got {position:?}"),
        })
    }
}
