//! Core systems for Horizon Touch.
//!
//! This crate provides the foundations the gesture engine is built on:
//!
//! - **Node Hierarchy**: Stable node identifiers and parent lookup
//! - **Signal/Slot System**: Ordered listener tables with per-slot failure isolation
//! - **Geometry**: Pointer positions
//! - **Logging**: `tracing` targets and tree debug output
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_touch_core::Signal;
//!
//! let pressed = Signal::<&'static str>::new();
//! let conn_id = pressed.connect(|name| {
//!     println!("{} was pressed", name);
//! });
//!
//! pressed.emit("button");
//! pressed.disconnect(conn_id);
//! ```
//!
//! # Hierarchy Example
//!
//! ```
//! use horizon_touch_core::{NodeHierarchy, SceneGraph};
//!
//! let mut scene = SceneGraph::new();
//! let window = scene.create_node("window");
//! let button = scene.create_child(window, "button").unwrap();
//!
//! assert!(scene.is_descendant_of(button, window));
//! ```

mod error;
pub mod geometry;
pub mod logging;
pub mod scene;
pub mod signal;

pub use error::{SceneError, SceneResult};
pub use geometry::Point;
pub use logging::{SceneTreeDebug, TreeFormatOptions, TreeStyle};
pub use scene::{NodeHierarchy, NodeId, SceneGraph};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
