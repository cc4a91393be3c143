//! Error types for the gesture engine.

use std::path::PathBuf;

use horizon_touch_core::{NodeId, SceneError};

use crate::gesture::GestureId;
use crate::pointer::PointerId;

/// Errors returned by gesture management operations.
///
/// These are the only fatal errors in the engine, and they all occur at
/// configuration time. Problems found while processing input are reported
/// through [`DispatchError`] and never abort a batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GestureError {
    /// The node is not part of the hierarchy.
    #[error("node {0:?} is not part of the hierarchy")]
    NodeNotFound(NodeId),

    /// No gesture with this ID is attached.
    #[error("gesture {0:?} is not attached")]
    GestureNotFound(GestureId),

    /// The minimum pointer count exceeds a non-zero maximum.
    #[error("invalid pointer thresholds: min_pointers {min} exceeds max_pointers {max}")]
    InvalidThresholds {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },

    /// A gesture cannot wait for itself to fail.
    #[error("gesture {0:?} cannot require itself to fail")]
    SelfDependency(GestureId),

    /// Hierarchy error.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Malformed input found while routing a batch.
///
/// The offending event is dropped, the error is logged and recorded in the
/// batch report, and processing continues with the next event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// A press arrived for a pointer that is already active.
    #[error("pointer {0} is already active")]
    DuplicatePress(PointerId),

    /// An update, release or cancel arrived for a pointer that is not active.
    #[error("pointer {0} is not active")]
    UnknownPointer(PointerId),

    /// A press targeted a node that is not in the hierarchy.
    #[error("pointer {pointer} pressed on unknown node {node:?}")]
    UnknownTarget {
        /// The pressed pointer.
        pointer: PointerId,
        /// The missing target node.
        node: NodeId,
    },
}

/// Errors reported by a [`MessageTarget`](crate::message::MessageTarget).
///
/// Message errors are logged and never propagate into the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    /// One or more handlers panicked while handling the message.
    #[error("{failures} handler(s) panicked while handling {name:?}")]
    HandlerPanicked {
        /// Message name.
        name: String,
        /// Number of handlers that panicked.
        failures: usize,
    },

    /// The target refused the message.
    #[error("message {name:?} rejected: {reason}")]
    Rejected {
        /// Message name.
        name: String,
        /// Why the target refused it.
        reason: String,
    },
}

impl MessageError {
    /// Create a rejection error.
    pub fn rejected(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or schema error.
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to serialize to TOML.
    #[error("failed to serialize configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON syntax or schema error.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A gesture preset failed validation.
    #[error("gesture preset {name:?}: {source}")]
    InvalidGesture {
        /// Preset name.
        name: String,
        /// Validation failure.
        #[source]
        source: GestureError,
    },
}

/// Result type for gesture management operations.
pub type Result<T> = std::result::Result<T, GestureError>;
