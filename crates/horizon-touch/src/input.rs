//! Conversion from winit touch events.
//!
//! [`WinitTouchAdapter`] turns the `winit::event::Touch` values a window
//! receives into [`PointerEvent`]s. A touch start needs a target node, so
//! the caller supplies a hit test. Touches that hit nothing are ignored
//! along with all of their later events.
//!
//! ```ignore
//! use horizon_touch::input::WinitTouchAdapter;
//!
//! let mut adapter = WinitTouchAdapter::new();
//! let mut batch = Vec::new();
//!
//! // For every WindowEvent::Touch received this frame:
//! if let Some(event) = adapter.convert(&touch, |position| scene_hit_test(position)) {
//!     batch.push(event);
//! }
//!
//! // Once per frame:
//! let report = manager.process_batch(&batch);
//! ```

use std::collections::HashSet;

use horizon_touch_core::logging::targets;
use horizon_touch_core::{NodeId, Point};
use winit::event::{Touch, TouchPhase as WinitTouchPhase};

use crate::pointer::{PointerEvent, PointerKind, PointerPhase};

/// Converts a winit touch phase to a pointer phase.
pub fn from_winit_touch_phase(phase: WinitTouchPhase) -> PointerPhase {
    match phase {
        WinitTouchPhase::Started => PointerPhase::Pressed,
        WinitTouchPhase::Moved => PointerPhase::Updated,
        WinitTouchPhase::Ended => PointerPhase::Released,
        WinitTouchPhase::Cancelled => PointerPhase::Cancelled,
    }
}

/// Converts a winit touch location to a point in window coordinates.
pub fn touch_position(touch: &Touch) -> Point {
    Point::new(touch.location.x as f32, touch.location.y as f32)
}

/// Stateful converter from winit touches to pointer events.
#[derive(Debug, Default)]
pub struct WinitTouchAdapter {
    /// Touches that were started on a node and have not ended.
    active: HashSet<u64>,
}

impl WinitTouchAdapter {
    /// Creates an adapter with no active touches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of touches currently tracked.
    pub fn active_touch_count(&self) -> usize {
        self.active.len()
    }

    /// Convert one touch.
    ///
    /// `hit_test` is called for touch starts only and returns the node under
    /// the touch. Returns `None` for touches that are not tracked.
    pub fn convert<F>(&mut self, touch: &Touch, hit_test: F) -> Option<PointerEvent>
    where
        F: FnOnce(Point) -> Option<NodeId>,
    {
        let position = touch_position(touch);
        match touch.phase {
            WinitTouchPhase::Started => {
                let Some(target) = hit_test(position) else {
                    tracing::trace!(target: targets::DISPATCH, touch = touch.id, "touch hit no node; ignoring");
                    return None;
                };
                self.active.insert(touch.id);
                Some(
                    PointerEvent::pressed(touch.id, position, target).with_kind(PointerKind::Touch),
                )
            }
            WinitTouchPhase::Moved => self
                .active
                .contains(&touch.id)
                .then(|| PointerEvent::updated(touch.id, position)),
            WinitTouchPhase::Ended => self
                .active
                .remove(&touch.id)
                .then(|| PointerEvent::released(touch.id, position)),
            WinitTouchPhase::Cancelled => self
                .active
                .remove(&touch.id)
                .then(|| PointerEvent::cancelled(touch.id, position)),
        }
    }

    /// Forget every tracked touch, for example when the window loses focus.
    ///
    /// Pair this with [`GestureManager::cancel_all_pointers`](crate::GestureManager::cancel_all_pointers).
    pub fn clear(&mut self) {
        self.active.clear();
    }
}
