//! Press gesture.
//!
//! Recognizes as soon as a node is touched. The gesture recognizes when the
//! number of assigned pointers first reaches `min_pointers` and fails if a
//! single press step also overshoots `max_pointers`, such as two fingers
//! landing in the same batch on a gesture limited to one.
//!
//! # Example
//!
//! ```
//! use horizon_touch::{GestureManager, PointerEvent, PressGesture};
//!
//! let mut manager = GestureManager::new();
//! let button = manager.hierarchy_mut().create_node("button");
//!
//! let press = PressGesture::new();
//! press.pressed().connect(|event| println!("pressed at {:?}", event.position));
//! let id = manager.attach(button, press).unwrap();
//!
//! let report = manager.process_batch(&[PointerEvent::pressed(1, (10.0, 10.0), button)]);
//! assert_eq!(report.recognized(), vec![id]);
//! ```

use horizon_touch_core::{NodeId, Point, Signal};

use crate::config::GestureSettings;
use crate::gesture::{Gesture, GestureBase, GestureId};
use crate::message::ON_PRESS;
use crate::pointer::Pointer;
use crate::state::{GestureState, PointerCountState};

/// Published when a press gesture recognizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressEvent {
    /// The gesture that recognized.
    pub gesture: GestureId,
    /// Node the gesture is attached to.
    pub node: NodeId,
    /// Centroid of the pressing pointers.
    pub position: Option<Point>,
}

/// Recognizes when its node is pressed.
#[derive(Debug)]
pub struct PressGesture {
    base: GestureBase,
    pressed: Signal<PressEvent>,
}

impl Default for PressGesture {
    fn default() -> Self {
        Self::new()
    }
}

impl PressGesture {
    /// Gesture type name.
    pub const KIND: &'static str = "press";

    /// Create a press gesture with default settings.
    pub fn new() -> Self {
        Self::with_settings(GestureSettings::default())
    }

    /// Create a press gesture with the given settings.
    pub fn with_settings(settings: GestureSettings) -> Self {
        Self {
            base: GestureBase::with_settings(Self::KIND, settings),
            pressed: Signal::new(),
        }
    }

    /// Published when the gesture recognizes.
    pub fn pressed(&self) -> &Signal<PressEvent> {
        &self.pressed
    }

    /// Whether pointers pressed on descendant nodes are ignored.
    pub fn ignore_children(&self) -> bool {
        self.base.settings().ignore_children
    }

    /// Set whether pointers pressed on descendant nodes are ignored.
    pub fn set_ignore_children(&mut self, ignore: bool) {
        let settings = self.base.settings().clone().with_ignore_children(ignore);
        self.base.set_settings(settings);
    }
}

impl Gesture for PressGesture {
    fn base(&self) -> &GestureBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GestureBase {
        &mut self.base
    }

    fn should_receive_pointer(&self, pointer: &Pointer) -> bool {
        if !self.base.should_receive_pointer(pointer) {
            return false;
        }
        !self.ignore_children() || pointer.press_target() == self.base.node()
    }

    fn pointers_pressed(&mut self, _pointers: &[Pointer]) {
        match self.base.pointer_count_state() {
            PointerCountState::PassedMinThreshold => {
                self.base.set_state(GestureState::Recognized);
            }
            PointerCountState::PassedMinMaxThreshold => {
                self.base.set_state(GestureState::Failed);
            }
            _ => {}
        }
    }

    fn on_recognized(&mut self) {
        self.pressed.emit(PressEvent {
            gesture: self.base.id(),
            node: self.base.node(),
            position: self.base.screen_position(),
        });
        self.base.send_message(ON_PRESS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::{PointerId, PointerKind, PressData};

    fn pointer_on(target: NodeId) -> Pointer {
        Pointer::new(
            PointerId(1),
            PointerKind::Touch,
            PressData {
                target,
                position: Point::ZERO,
                hit_path: vec![target],
                frame: 1,
            },
        )
    }

    #[test]
    fn test_recognizes_on_first_pointer() {
        let mut press = PressGesture::new();
        press.base_mut().add_pointers(&[PointerId(1)]);
        press.pointers_pressed(&[]);
        assert_eq!(press.base().effective_state(), GestureState::Recognized);
    }

    #[test]
    fn test_fails_when_both_thresholds_pass_at_once() {
        let mut press =
            PressGesture::with_settings(GestureSettings::new().with_min_pointers(1).with_max_pointers(1));
        press.base_mut().add_pointers(&[PointerId(1), PointerId(2)]);
        press.pointers_pressed(&[]);
        assert_eq!(press.base().effective_state(), GestureState::Failed);
    }

    #[test]
    fn test_waits_for_min_pointers() {
        let mut press = PressGesture::with_settings(GestureSettings::new().with_min_pointers(2));
        press.base_mut().add_pointers(&[PointerId(1)]);
        press.pointers_pressed(&[]);
        assert!(!press.base().has_pending_request());

        press.base_mut().add_pointers(&[PointerId(2)]);
        press.pointers_pressed(&[]);
        assert_eq!(press.base().effective_state(), GestureState::Recognized);
    }

    #[test]
    fn test_ignore_children_filters_by_press_target() {
        let mut nodes = slotmap::SlotMap::<NodeId, ()>::with_key();
        let own = nodes.insert(());
        let child = nodes.insert(());

        let mut press = PressGesture::new();
        press.base_mut().attach(GestureId::default(), own);
        assert!(press.should_receive_pointer(&pointer_on(child)));

        press.set_ignore_children(true);
        assert!(press.should_receive_pointer(&pointer_on(own)));
        assert!(!press.should_receive_pointer(&pointer_on(child)));
    }
}
