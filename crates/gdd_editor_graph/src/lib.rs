// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph engine for the game design document editor.
//!
//! This crate provides the data model behind:
//! - Blueprint graphs (visual scripting)
//! - Flow charts
//! - Scene trees (nested composition)
//!
//! ## Architecture
//!
//! - [`Graph`]: nodes with typed, directional pins and the connections
//!   between them, with cascading deletes
//! - [`SceneTree`]: strict containment hierarchy of scene nodes
//! - [`Notifier`]: synchronous change notification, one event per mutation
//! - [`DocumentCodec`]: JSON/RON documents, loaded all-or-nothing
//! - [`KindRegistry`]: closed per-kind schema applied at the boundary
//!
//! The store is single-writer: observers get shared access only.

pub mod codec;
pub mod connection;
pub mod error;
pub mod graph;
pub mod kinds;
pub mod node;
pub mod notify;
pub mod pin;
pub mod scene;

pub use codec::{DocumentCodec, DocumentFormat, GraphDocument, SceneNodeDocument, FORMAT_VERSION};
pub use connection::{Connection, ConnectionId};
pub use error::{ConnectionFailure, CycleError, GraphError, Result};
pub use graph::{Graph, GraphEvent};
pub use kinds::{KindRegistry, NodeCategory, NodeKind};
pub use node::{Node, NodeId, Properties};
pub use notify::{Notifier, SubscriptionId};
pub use pin::{Pin, PinDirection, PinRef, PinTemplate, PinType};
pub use scene::{SceneEvent, SceneNode, SceneNodeData, SceneNodeId, SceneTree};
