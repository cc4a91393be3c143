//! Node hierarchy for Horizon Touch.
//!
//! Gestures are attached to nodes of a scene hierarchy. The engine needs very
//! little from that hierarchy: whether a node exists and who its parent is.
//! That contract is the [`NodeHierarchy`] trait, so an application can plug
//! in its own transform tree. [`SceneGraph`] is the bundled implementation,
//! an arena-backed tree with stable [`NodeId`] handles.
//!
//! # Key Types
//!
//! - [`NodeId`] - Stable identifier for a node
//! - [`NodeHierarchy`] - Read-only parent lookup used by pointer routing
//! - [`SceneGraph`] - Arena-based tree implementing [`NodeHierarchy`]
//!
//! # Example
//!
//! ```
//! use horizon_touch_core::scene::{NodeHierarchy, SceneGraph};
//!
//! let mut scene = SceneGraph::new();
//! let window = scene.create_node("window");
//! let button = scene.create_child(window, "button").unwrap();
//!
//! assert_eq!(scene.hit_path(button), vec![button, window]);
//! assert_eq!(scene.depth(button), 1);
//! ```

use slotmap::{new_key_type, SlotMap};

use crate::error::{SceneError, SceneResult};

new_key_type! {
    /// A unique identifier for a node in a [`SceneGraph`].
    ///
    /// `NodeId`s are stable handles that remain valid while the tree changes
    /// shape. They become invalid when the node is destroyed.
    pub struct NodeId;
}

impl NodeId {
    /// Convert the NodeId to a raw u64 value.
    ///
    /// Useful when an external scene keeps its own numeric identifiers.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create a NodeId from a raw u64 value.
    ///
    /// This does not check whether the node exists in any hierarchy.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Read-only view of a node hierarchy.
///
/// Pointer routing walks from the node under a pointer up to the root, and
/// arbitration orders gestures by how deep their node sits. Both only need
/// parent links, so that is all an external scene has to provide.
pub trait NodeHierarchy {
    /// Returns whether the node exists.
    fn contains_node(&self, node: NodeId) -> bool;

    /// Returns the parent of a node, or `None` for roots and unknown nodes.
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the node followed by all of its ancestors, nearest first.
    ///
    /// Returns an empty path for unknown nodes.
    fn hit_path(&self, node: NodeId) -> Vec<NodeId> {
        if !self.contains_node(node) {
            return Vec::new();
        }
        let mut path = vec![node];
        let mut current = self.parent_of(node);
        while let Some(id) = current {
            path.push(id);
            current = self.parent_of(id);
        }
        path
    }

    /// Returns the number of ancestors of a node (roots have depth 0).
    fn depth(&self, node: NodeId) -> usize {
        self.hit_path(node).len().saturating_sub(1)
    }

    /// Returns whether `node` is a strict descendant of `ancestor`.
    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        node != ancestor && self.hit_path(node).contains(&ancestor)
    }
}

/// Internal data stored for each node.
#[derive(Debug, Default)]
struct NodeData {
    /// Human-readable name for debugging.
    name: String,
    /// Parent node (if any).
    parent: Option<NodeId>,
    /// Child nodes in insertion order.
    children: Vec<NodeId>,
}

/// Arena-based node tree.
///
/// Destroying a node destroys its whole subtree.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, NodeData>,
}

impl SceneGraph {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Create a new root node.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let data = NodeData {
            name: name.into(),
            ..NodeData::default()
        };
        let id = self.nodes.insert(data);
        tracing::trace!(target: "horizon_touch_core::scene", ?id, "created node");
        id
    }

    /// Create a new node as the last child of `parent`.
    pub fn create_child(&mut self, parent: NodeId, name: impl Into<String>) -> SceneResult<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::InvalidNodeId(parent));
        }
        let id = self.create_node(name);
        self.set_parent(id, Some(parent))?;
        Ok(id)
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns the removed IDs, descendants first and `id` last.
    #[tracing::instrument(skip(self), target = "horizon_touch_core::scene", level = "trace")]
    pub fn destroy(&mut self, id: NodeId) -> SceneResult<Vec<NodeId>> {
        let mut removed = Vec::new();
        self.collect_descendants(id, &mut removed)?;
        removed.push(id);

        if let Some(parent_id) = self.nodes.get(id).and_then(|d| d.parent)
            && let Some(parent) = self.nodes.get_mut(parent_id)
        {
            parent.children.retain(|&child| child != id);
        }

        for node in &removed {
            self.nodes.remove(*node);
        }
        tracing::trace!(target: "horizon_touch_core::scene", ?id, removed = removed.len(), "destroyed subtree");
        Ok(removed)
    }

    fn collect_descendants(&self, id: NodeId, result: &mut Vec<NodeId>) -> SceneResult<()> {
        let data = self.nodes.get(id).ok_or(SceneError::InvalidNodeId(id))?;
        for &child in &data.children {
            self.collect_descendants(child, result)?;
            result.push(child);
        }
        Ok(())
    }

    /// Check if a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Set the parent of a node. Passing `None` makes it a root.
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> SceneResult<()> {
        if !self.nodes.contains_key(id) {
            return Err(SceneError::InvalidNodeId(id));
        }
        if let Some(parent) = new_parent {
            if !self.nodes.contains_key(parent) {
                return Err(SceneError::InvalidNodeId(parent));
            }
            if parent == id || self.is_descendant_of(parent, id) {
                return Err(SceneError::CircularParentage { node: id, parent });
            }
        }

        let old_parent = self.nodes.get(id).and_then(|d| d.parent);
        if let Some(old) = old_parent
            && let Some(data) = self.nodes.get_mut(old)
        {
            data.children.retain(|&child| child != id);
        }

        if let Some(data) = self.nodes.get_mut(id) {
            data.parent = new_parent;
        }

        if let Some(parent) = new_parent
            && let Some(data) = self.nodes.get_mut(parent)
        {
            data.children.push(id);
        }

        Ok(())
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> SceneResult<Option<NodeId>> {
        self.nodes
            .get(id)
            .map(|d| d.parent)
            .ok_or(SceneError::InvalidNodeId(id))
    }

    /// Get the children of a node.
    pub fn children(&self, id: NodeId) -> SceneResult<&[NodeId]> {
        self.nodes
            .get(id)
            .map(|d| d.children.as_slice())
            .ok_or(SceneError::InvalidNodeId(id))
    }

    /// Get the node's name.
    pub fn name(&self, id: NodeId) -> SceneResult<&str> {
        self.nodes
            .get(id)
            .map(|d| d.name.as_str())
            .ok_or(SceneError::InvalidNodeId(id))
    }

    /// Set the node's name.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> SceneResult<()> {
        let data = self.nodes.get_mut(id).ok_or(SceneError::InvalidNodeId(id))?;
        data.name = name.into();
        Ok(())
    }

    /// Get all ancestors of a node from immediate parent to root.
    pub fn ancestors(&self, id: NodeId) -> SceneResult<Vec<NodeId>> {
        if !self.nodes.contains_key(id) {
            return Err(SceneError::InvalidNodeId(id));
        }
        Ok(self.hit_path(id).into_iter().skip(1).collect())
    }

    /// Number of nodes in the scene.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate over root nodes.
    pub fn root_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, data)| data.parent.is_none())
            .map(|(id, _)| id)
    }

    /// Depth-first pre-order traversal starting from a node.
    pub fn depth_first_preorder(&self, id: NodeId) -> SceneResult<Vec<NodeId>> {
        let mut result = Vec::new();
        self.preorder_into(id, &mut result)?;
        Ok(result)
    }

    fn preorder_into(&self, id: NodeId, result: &mut Vec<NodeId>) -> SceneResult<()> {
        let data = self.nodes.get(id).ok_or(SceneError::InvalidNodeId(id))?;
        result.push(id);
        for &child in &data.children {
            self.preorder_into(child, result)?;
        }
        Ok(())
    }
}

impl NodeHierarchy for SceneGraph {
    fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|d| d.parent)
    }
}

static_assertions::assert_impl_all!(SceneGraph: Send, Sync);
