// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene tree: strict containment hierarchy of scene nodes.
//!
//! Every node except the root has exactly one parent. Subtrees are only
//! created under an existing node or moved under a node outside themselves,
//! so the hierarchy stays acyclic.

use crate::error::{GraphError, Result};
use crate::kinds::scene::ROOT_KIND;
use crate::node::Properties;
use crate::notify::{Notifier, SubscriptionId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneNodeId(pub Uuid);

impl SceneNodeId {
    /// Create a new random scene node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SceneNodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SceneNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A node in the scene tree, owning its children
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct SceneNode {
    /// Unique ID
    pub id: SceneNodeId,
    /// Node name
    pub name: String,
    /// Free-form kind classifier
    pub kind: String,
    /// Description
    pub description: String,
    /// Arbitrary properties
    pub properties: Properties,
    /// Child nodes, in order
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub(crate) fn from_data(id: SceneNodeId, data: SceneNodeData) -> Self {
        Self {
            id,
            name: data.name,
            kind: data.kind,
            description: data.description,
            properties: data.properties,
            children: Vec::new(),
        }
    }

    /// Get a property value
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }

    /// IDs of this node and all its descendants, depth-first
    pub fn subtree_ids(&self) -> Vec<SceneNodeId> {
        DepthFirst::new(self).map(|n| n.id).collect()
    }
}

/// Data for a new scene node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNodeData {
    /// Node name
    pub name: String,
    /// Kind classifier
    pub kind: String,
    /// Description
    pub description: String,
    /// Initial properties
    pub properties: Properties,
}

impl SceneNodeData {
    /// Create node data with a name and kind
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a property
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// Structural change reported to scene observers
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// A child was appended under a parent
    ChildAdded {
        /// Parent node
        parent: SceneNodeId,
        /// New child
        child: SceneNodeId,
    },
    /// A node's attributes or properties changed
    NodeUpdated(SceneNodeId),
    /// A subtree was removed
    NodeRemoved {
        /// Root of the removed subtree
        node: SceneNodeId,
        /// Former parent
        parent: SceneNodeId,
        /// Every removed id, depth-first starting with `node`
        removed: Vec<SceneNodeId>,
    },
    /// A subtree moved to a new parent
    Reparented {
        /// Moved node
        node: SceneNodeId,
        /// Previous parent
        old_parent: SceneNodeId,
        /// New parent
        new_parent: SceneNodeId,
    },
}

/// A scene: a named tree of scene nodes
#[derive(Debug)]
pub struct SceneTree {
    /// Scene name
    name: String,
    /// Root node
    root: SceneNode,
    /// Change observers
    notifier: Notifier<SceneTree, SceneEvent>,
}

impl SceneTree {
    /// Create a scene with an empty root container
    pub fn new(name: impl Into<String>) -> Self {
        let root = SceneNode::from_data(SceneNodeId::new(), SceneNodeData::new("Root", ROOT_KIND));
        Self::from_root(name, root)
    }

    pub(crate) fn from_root(name: impl Into<String>, root: SceneNode) -> Self {
        Self {
            name: name.into(),
            root,
            notifier: Notifier::new(),
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root node
    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// Register an observer called after every successful mutation
    pub fn subscribe(&mut self, callback: impl Fn(&SceneTree, &SceneEvent) + 'static) -> SubscriptionId {
        self.notifier.subscribe(callback)
    }

    /// Remove an observer
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn notify(&self, event: SceneEvent) {
        self.notifier.emit(self, &event);
    }

    /// Append a new child under `parent_id`
    pub fn add_child(&mut self, parent_id: SceneNodeId, data: SceneNodeData) -> Result<&SceneNode> {
        let mut path = self.path_or_not_found(parent_id)?;
        let child = SceneNode::from_data(SceneNodeId::new(), data);
        let child_id = child.id;

        let parent = self.node_at_mut(&path);
        path.push(parent.children.len());
        parent.children.push(child);

        tracing::debug!(parent = %parent_id, child = %child_id, "added scene node");
        self.notify(SceneEvent::ChildAdded {
            parent: parent_id,
            child: child_id,
        });
        Ok(self.node_at(&path))
    }

    /// Merge properties into a node.
    ///
    /// `"name"`, `"kind"` and `"description"` must be strings and update
    /// the node's attributes; every other key is stored as-is.
    pub fn update_node<K>(
        &mut self,
        node_id: SceneNodeId,
        properties: impl IntoIterator<Item = (K, serde_json::Value)>,
    ) -> Result<()>
    where
        K: Into<String>,
    {
        let path = self.path_or_not_found(node_id)?;

        let mut attributes = Vec::new();
        let mut rest = Vec::new();
        for (key, value) in properties {
            let key = key.into();
            match key.as_str() {
                "name" | "kind" | "description" => match value {
                    serde_json::Value::String(s) => attributes.push((key, s)),
                    other => {
                        return Err(GraphError::InvalidProperty {
                            reason: format!("expected a string, got {other}"),
                            key,
                        })
                    }
                },
                _ => rest.push((key, value)),
            }
        }

        let node = self.node_at_mut(&path);
        for (key, value) in attributes {
            match key.as_str() {
                "name" => node.name = value,
                "kind" => node.kind = value,
                _ => node.description = value,
            }
        }
        node.properties.extend(rest);

        tracing::debug!(node = %node_id, "updated scene node");
        self.notify(SceneEvent::NodeUpdated(node_id));
        Ok(())
    }

    /// Remove a node and its entire subtree. The root cannot be removed.
    pub fn remove_node(&mut self, node_id: SceneNodeId) -> Result<SceneNode> {
        if node_id == self.root.id {
            return Err(GraphError::InvalidHierarchy("the scene root cannot be removed".into()));
        }
        let mut path = self.path_or_not_found(node_id)?;
        let Some(index) = path.pop() else {
            return Err(GraphError::InvalidHierarchy("the scene root cannot be removed".into()));
        };

        let parent = self.node_at_mut(&path);
        let parent_id = parent.id;
        let removed = parent.children.remove(index);
        let removed_ids = removed.subtree_ids();

        tracing::debug!(node = %node_id, count = removed_ids.len(), "removed scene subtree");
        self.notify(SceneEvent::NodeRemoved {
            node: node_id,
            parent: parent_id,
            removed: removed_ids,
        });
        Ok(removed)
    }

    /// Move a subtree under a new parent, appending it as the last child.
    ///
    /// Fails with `InvalidHierarchy` for the root or when `new_parent_id`
    /// is the node itself or one of its descendants.
    pub fn reparent(&mut self, node_id: SceneNodeId, new_parent_id: SceneNodeId) -> Result<()> {
        if node_id == self.root.id {
            return Err(GraphError::InvalidHierarchy("the scene root cannot be moved".into()));
        }
        let mut node_path = self.path_or_not_found(node_id)?;
        let target_path = self.path_or_not_found(new_parent_id)?;
        if target_path.starts_with(&node_path) {
            tracing::warn!(node = %node_id, new_parent = %new_parent_id, "rejected move into own subtree");
            return Err(GraphError::InvalidHierarchy(format!(
                "cannot move {node_id} under itself or its descendant {new_parent_id}"
            )));
        }

        let Some(index) = node_path.pop() else {
            return Err(GraphError::InvalidHierarchy("the scene root cannot be moved".into()));
        };
        let old_parent = self.node_at_mut(&node_path);
        let old_parent_id = old_parent.id;
        let subtree = old_parent.children.remove(index);

        // Sibling indices may have shifted; look the target up again.
        let target_path = self.path_or_not_found(new_parent_id)?;
        self.node_at_mut(&target_path).children.push(subtree);

        tracing::debug!(node = %node_id, from = %old_parent_id, to = %new_parent_id, "reparented scene node");
        self.notify(SceneEvent::Reparented {
            node: node_id,
            old_parent: old_parent_id,
            new_parent: new_parent_id,
        });
        Ok(())
    }

    /// Depth-first search from the root
    pub fn find_node(&self, node_id: SceneNodeId) -> Option<&SceneNode> {
        self.iter().find(|n| n.id == node_id)
    }

    /// Parent of a node; `None` for the root or an unknown id
    pub fn parent_of(&self, node_id: SceneNodeId) -> Option<&SceneNode> {
        let mut path = self.path_to(node_id)?;
        path.pop()?;
        Some(self.node_at(&path))
    }

    /// Whether the tree contains a node
    pub fn contains(&self, node_id: SceneNodeId) -> bool {
        self.find_node(node_id).is_some()
    }

    /// All nodes, depth-first pre-order starting with the root
    pub fn iter(&self) -> DepthFirst<'_> {
        DepthFirst::new(&self.root)
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false: a scene has at least its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Child indices leading from the root to `node_id`
    fn path_to(&self, node_id: SceneNodeId) -> Option<Vec<usize>> {
        fn search(node: &SceneNode, target: SceneNodeId, path: &mut Vec<usize>) -> bool {
            if node.id == target {
                return true;
            }
            for (i, child) in node.children.iter().enumerate() {
                path.push(i);
                if search(child, target, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        search(&self.root, node_id, &mut path).then_some(path)
    }

    fn path_or_not_found(&self, node_id: SceneNodeId) -> Result<Vec<usize>> {
        self.path_to(node_id)
            .ok_or_else(|| GraphError::not_found(format_args!("scene node {node_id}")))
    }

    fn node_at(&self, path: &[usize]) -> &SceneNode {
        path.iter().fold(&self.root, |node, &i| &node.children[i])
    }

    fn node_at_mut(&mut self, path: &[usize]) -> &mut SceneNode {
        path.iter().fold(&mut self.root, |node, &i| &mut node.children[i])
    }
}

/// Structural equality: same name and tree. Observers are not compared.
impl PartialEq for SceneTree {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.root == other.root
    }
}

/// Depth-first pre-order iterator over a scene subtree
#[derive(Debug)]
pub struct DepthFirst<'a> {
    stack: Vec<&'a SceneNode>,
}

impl<'a> DepthFirst<'a> {
    fn new(root: &'a SceneNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a SceneNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sample() -> (SceneTree, SceneNodeId, SceneNodeId, SceneNodeId) {
        let mut tree = SceneTree::new("Main Menu");
        let root = tree.root().id;
        let c1 = tree.add_child(root, SceneNodeData::new("Panel", "container")).unwrap().id;
        let g = tree.add_child(c1, SceneNodeData::new("Title", "text")).unwrap().id;
        (tree, root, c1, g)
    }

    #[test]
    fn test_remove_subtree() {
        let (mut tree, root, c1, g) = sample();
        let events = event_log(&mut tree);

        let removed = tree.remove_node(c1).unwrap();
        assert_eq!(removed.children.len(), 1);
        assert!(tree.find_node(c1).is_none());
        assert!(tree.find_node(g).is_none());
        assert_eq!(tree.len(), 1);
        assert_eq!(
            *events.borrow(),
            [SceneEvent::NodeRemoved {
                node: c1,
                parent: root,
                removed: vec![c1, g],
            }]
        );

        assert!(matches!(tree.remove_node(c1), Err(GraphError::NotFound(_))));
    }

    #[test]
    fn test_add_child_unknown_parent() {
        let mut tree = SceneTree::new("Scene");
        let err = tree
            .add_child(SceneNodeId::new(), SceneNodeData::new("Orphan", "sprite"))
            .unwrap_err();
        assert!(matches!(err, GraphError::NotFound(_)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_children_keep_order() {
        let mut tree = SceneTree::new("Scene");
        let root = tree.root().id;
        for name in ["a", "b", "c"] {
            tree.add_child(root, SceneNodeData::new(name, "text")).unwrap();
        }
        let names: Vec<_> = tree.root().children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let (mut tree, root, _, _) = sample();
        assert!(matches!(tree.remove_node(root), Err(GraphError::InvalidHierarchy(_))));
        assert_eq!(tree.len(), 3);
    }

    fn event_log(tree: &mut SceneTree) -> Rc<RefCell<Vec<SceneEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&events);
        tree.subscribe(move |_, e| log.borrow_mut().push(e.clone()));
        events
    }

    #[test]
    fn test_add_child_notifies_once() {
        let mut tree = SceneTree::new("Scene");
        let root = tree.root().id;
        let events = event_log(&mut tree);

        let child = tree.add_child(root, SceneNodeData::new("Logo", "sprite")).unwrap().id;
        assert_eq!(*events.borrow(), [SceneEvent::ChildAdded { parent: root, child }]);
    }

    #[test]
    fn test_update_node() {
        let (mut tree, _, c1, _) = sample();
        let events = event_log(&mut tree);

        tree.update_node(c1, [("name", json!("Header")), ("size", json!([100, 40]))])
            .unwrap();
        let node = tree.find_node(c1).unwrap();
        assert_eq!(node.name, "Header");
        assert_eq!(node.property("size"), Some(&json!([100, 40])));
        assert_eq!(*events.borrow(), [SceneEvent::NodeUpdated(c1)]);

        let err = tree.update_node(c1, [("kind", json!(3))]).unwrap_err();
        assert!(matches!(err, GraphError::InvalidProperty { .. }));
        assert_eq!(tree.find_node(c1).unwrap().kind, "container");
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn test_reparent_rejects_descendant() {
        let (mut tree, root, c1, g) = sample();
        let events = event_log(&mut tree);

        assert!(matches!(tree.reparent(c1, g), Err(GraphError::InvalidHierarchy(_))));
        assert!(matches!(tree.reparent(c1, c1), Err(GraphError::InvalidHierarchy(_))));
        assert!(matches!(tree.reparent(root, c1), Err(GraphError::InvalidHierarchy(_))));
        assert!(events.borrow().is_empty());

        tree.reparent(g, root).unwrap();
        assert_eq!(tree.parent_of(g).unwrap().id, root);
        assert!(tree.find_node(c1).unwrap().children.is_empty());
        assert_eq!(
            *events.borrow(),
            [SceneEvent::Reparented {
                node: g,
                old_parent: c1,
                new_parent: root,
            }]
        );
    }

    #[test]
    fn test_failed_scene_mutation_does_not_notify() {
        let (mut tree, root, c1, g) = sample();
        let events = event_log(&mut tree);

        assert!(matches!(
            tree.add_child(SceneNodeId::new(), SceneNodeData::new("Orphan", "text")),
            Err(GraphError::NotFound(_))
        ));
        assert!(matches!(
            tree.update_node(g, [("tint", json!("red")), ("kind", json!(false))]),
            Err(GraphError::InvalidProperty { .. })
        ));
        assert!(matches!(
            tree.update_node(SceneNodeId::new(), [("name", json!("Ghost"))]),
            Err(GraphError::NotFound(_))
        ));
        assert!(matches!(tree.remove_node(root), Err(GraphError::InvalidHierarchy(_))));
        assert!(matches!(tree.remove_node(SceneNodeId::new()), Err(GraphError::NotFound(_))));
        assert!(matches!(tree.reparent(c1, g), Err(GraphError::InvalidHierarchy(_))));
        assert!(matches!(tree.reparent(root, c1), Err(GraphError::InvalidHierarchy(_))));
        assert!(matches!(tree.reparent(g, SceneNodeId::new()), Err(GraphError::NotFound(_))));

        assert!(events.borrow().is_empty());
        assert!(tree.find_node(g).unwrap().property("tint").is_none());
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_reparent_after_earlier_sibling() {
        let mut tree = SceneTree::new("Scene");
        let root = tree.root().id;
        let a = tree.add_child(root, SceneNodeData::new("a", "container")).unwrap().id;
        let b = tree.add_child(root, SceneNodeData::new("b", "container")).unwrap().id;

        tree.reparent(a, b).unwrap();
        assert_eq!(tree.parent_of(a).unwrap().id, b);
        assert_eq!(tree.root().children.len(), 1);
    }

    #[test]
    fn test_depth_first_order() {
        let (mut tree, root, c1, g) = sample();
        let c2 = tree.add_child(root, SceneNodeData::new("Footer", "text")).unwrap().id;
        let ids: Vec<_> = tree.iter().map(|n| n.id).collect();
        assert_eq!(ids, [root, c1, g, c2]);
        assert!(tree.parent_of(root).is_none());
    }
}
