//! Error types for Horizon Touch core.

use std::fmt;

use crate::scene::NodeId;

/// Errors that can occur while editing or querying the node hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The node ID is invalid or the node has been destroyed.
    InvalidNodeId(NodeId),
    /// Attempted to set a node as its own parent or ancestor.
    CircularParentage {
        /// The node being re-parented.
        node: NodeId,
        /// The requested parent, which is a descendant of `node`.
        parent: NodeId,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNodeId(id) => write!(f, "Invalid or destroyed node ID {id:?}"),
            Self::CircularParentage { node, parent } => {
                write!(
                    f,
                    "Cannot make {parent:?} the parent of {node:?}: it is a descendant"
                )
            }
        }
    }
}

impl std::error::Error for SceneError {}

/// Result type for node hierarchy operations.
pub type SceneResult<T> = std::result::Result<T, SceneError>;
