//! Horizon Touch - pointer gesture recognition and arbitration.
//!
//! Gestures are attached to nodes of a hierarchy. Each input tick the
//! backend hands the [`GestureManager`] a batch of [`PointerEvent`]s; the
//! manager routes pressed pointers to the gestures on the pressed node and
//! its ancestors, runs their recognition hooks, settles conflicts between
//! them and publishes the outcome.
//!
//! # Key Types
//!
//! - [`GestureManager`] - Owns the hierarchy, gestures and pointers
//! - [`Gesture`] / [`GestureBase`] - Recognizer trait and its shared state
//! - [`PressGesture`] - Recognizes when a node is touched
//! - [`GestureDelegate`] / [`SimultaneousPolicy`] - Conflict policy
//! - [`TouchConfig`] - Settings loaded from TOML or JSON
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use horizon_touch::{GestureManager, PointerEvent, PressGesture, SimultaneousPolicy};
//!
//! let mut manager = GestureManager::new();
//! let list = manager.hierarchy_mut().create_node("list");
//! let row = manager.hierarchy_mut().create_child(list, "row").unwrap();
//!
//! // Without a delegate both presses recognize together.
//! let row_press = manager.attach(row, PressGesture::new()).unwrap();
//! let list_press = manager.attach(list, PressGesture::new()).unwrap();
//!
//! let report = manager.process_batch(&[PointerEvent::pressed(1, (4.0, 4.0), row)]);
//! assert_eq!(report.recognized(), vec![row_press, list_press]);
//!
//! // An exclusive delegate lets the deeper gesture win.
//! let policy = Arc::new(SimultaneousPolicy::new());
//! manager
//!     .gesture_mut(row_press)
//!     .unwrap()
//!     .base_mut()
//!     .set_delegate(policy.clone());
//!
//! manager.process_batch(&[PointerEvent::released(1, (4.0, 4.0))]);
//! let report = manager.process_batch(&[PointerEvent::pressed(2, (4.0, 4.0), row)]);
//! assert_eq!(report.recognized(), vec![row_press]);
//! assert_eq!(report.failed(), vec![list_press]);
//! ```

pub mod arena;
pub mod config;
pub mod delegate;
pub mod dispatch;
mod error;
pub mod gesture;
#[cfg(feature = "winit")]
pub mod input;
pub mod manager;
pub mod message;
pub mod pointer;
pub mod press;
pub mod state;

pub use arena::{ArbitrationPlan, Contender, Decision, GestureArena, GesturePriority};
pub use config::{GestureSettings, ManagerConfig, TouchConfig};
pub use delegate::{GestureDelegate, SimultaneousPolicy};
pub use dispatch::{BatchRouting, Dispatcher, GestureLookup};
pub use error::{ConfigError, DispatchError, GestureError, MessageError, Result};
pub use gesture::{
    Gesture, GestureBase, GestureId, GestureNotification, NotificationKind, StateChange,
};
pub use manager::{BatchReport, GestureManager};
pub use message::{MessageHandlers, MessageSender, MessageTarget};
pub use pointer::{Pointer, PointerEvent, PointerId, PointerKind, PointerPhase, PressData};
pub use press::{PressEvent, PressGesture};
pub use state::{GestureState, IllegalTransition, PointerCountState};

pub use horizon_touch_core::{NodeHierarchy, NodeId, Point, SceneGraph, Signal};
