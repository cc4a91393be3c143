//! Pointers and raw pointer events.
//!
//! A [`Pointer`] is the engine's record of one active contact: a finger, a
//! mouse button held down, a pen. Pointers are created when the input
//! backend reports a press and are owned by the
//! [`Dispatcher`](crate::dispatch::Dispatcher), which is the only component
//! that mutates them. Gestures see read-only snapshots.

use std::collections::VecDeque;
use std::fmt;

use horizon_touch_core::{NodeId, Point};

/// Identifier of one contact, stable from press to release.
///
/// Backends usually derive this from the platform's touch or device ID.
/// Once a pointer is released its ID may be reused in a later batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for PointerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// The kind of device behind a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerKind {
    /// A finger on a touch surface.
    #[default]
    Touch,
    /// A mouse button.
    Mouse,
    /// A stylus.
    Pen,
    /// A tracked physical object.
    Object,
}

/// Snapshot taken when a pointer is pressed.
///
/// Never changes for the lifetime of the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct PressData {
    /// The node the pointer was pressed on.
    pub target: NodeId,
    /// Position at press time.
    pub position: Point,
    /// Target followed by the ancestors that were eligible for routing,
    /// as recorded at press time.
    pub hit_path: Vec<NodeId>,
    /// Batch number of the press.
    pub frame: u64,
}

/// One active contact.
#[derive(Debug, Clone, PartialEq)]
pub struct Pointer {
    id: PointerId,
    kind: PointerKind,
    position: Point,
    previous_position: Point,
    press: PressData,
    history: VecDeque<Point>,
}

impl Pointer {
    pub(crate) fn new(id: PointerId, kind: PointerKind, press: PressData) -> Self {
        let position = press.position;
        let mut history = VecDeque::new();
        history.push_back(position);
        Self {
            id,
            kind,
            position,
            previous_position: position,
            press,
            history,
        }
    }

    /// The pointer's ID.
    pub fn id(&self) -> PointerId {
        self.id
    }

    /// The device kind.
    pub fn kind(&self) -> PointerKind {
        self.kind
    }

    /// Current position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Position before the most recent move.
    pub fn previous_position(&self) -> Point {
        self.previous_position
    }

    /// The press snapshot.
    pub fn press_data(&self) -> &PressData {
        &self.press
    }

    /// The node the pointer was pressed on.
    pub fn press_target(&self) -> NodeId {
        self.press.target
    }

    /// Recent positions, oldest first, including the current one.
    pub fn history(&self) -> impl ExactSizeIterator<Item = Point> + '_ {
        self.history.iter().copied()
    }

    /// Movement since the previous position.
    pub fn delta(&self) -> Point {
        self.position - self.previous_position
    }

    /// Movement since the press.
    pub fn total_delta(&self) -> Point {
        self.position - self.press.position
    }

    pub(crate) fn move_to(&mut self, position: Point, history_len: usize) {
        self.previous_position = self.position;
        self.position = position;
        if history_len == 0 {
            return;
        }
        self.history.push_back(position);
        while self.history.len() > history_len {
            self.history.pop_front();
        }
    }
}

/// Lifecycle phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// Contact started.
    Pressed,
    /// Contact moved.
    Updated,
    /// Contact lifted normally.
    Released,
    /// Contact was taken away by the system.
    Cancelled,
}

/// A raw event from the input backend.
///
/// The backend hit-tests presses itself and supplies the target node; the
/// engine never queries positions against the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// A new contact.
    Pressed {
        /// Contact ID.
        id: PointerId,
        /// Device kind.
        kind: PointerKind,
        /// Press position.
        position: Point,
        /// Hit-tested node under the pointer.
        target: NodeId,
    },
    /// An active contact moved.
    Updated {
        /// Contact ID.
        id: PointerId,
        /// New position.
        position: Point,
    },
    /// An active contact lifted.
    Released {
        /// Contact ID.
        id: PointerId,
        /// Release position.
        position: Point,
    },
    /// An active contact was cancelled by the system.
    Cancelled {
        /// Contact ID.
        id: PointerId,
        /// Last known position.
        position: Point,
    },
}

impl PointerEvent {
    /// A touch press on `target`.
    pub fn pressed(id: impl Into<PointerId>, position: impl Into<Point>, target: NodeId) -> Self {
        Self::Pressed {
            id: id.into(),
            kind: PointerKind::Touch,
            position: position.into(),
            target,
        }
    }

    /// A move.
    pub fn updated(id: impl Into<PointerId>, position: impl Into<Point>) -> Self {
        Self::Updated {
            id: id.into(),
            position: position.into(),
        }
    }

    /// A release.
    pub fn released(id: impl Into<PointerId>, position: impl Into<Point>) -> Self {
        Self::Released {
            id: id.into(),
            position: position.into(),
        }
    }

    /// A cancellation.
    pub fn cancelled(id: impl Into<PointerId>, position: impl Into<Point>) -> Self {
        Self::Cancelled {
            id: id.into(),
            position: position.into(),
        }
    }

    /// Replace the device kind of a press event. Other events are unchanged.
    pub fn with_kind(mut self, new_kind: PointerKind) -> Self {
        if let Self::Pressed { kind, .. } = &mut self {
            *kind = new_kind;
        }
        self
    }

    /// The pointer this event refers to.
    pub fn id(&self) -> PointerId {
        match self {
            Self::Pressed { id, .. }
            | Self::Updated { id, .. }
            | Self::Released { id, .. }
            | Self::Cancelled { id, .. } => *id,
        }
    }

    /// The event's position.
    pub fn position(&self) -> Point {
        match self {
            Self::Pressed { position, .. }
            | Self::Updated { position, .. }
            | Self::Released { position, .. }
            | Self::Cancelled { position, .. } => *position,
        }
    }

    /// The lifecycle phase.
    pub fn phase(&self) -> PointerPhase {
        match self {
            Self::Pressed { .. } => PointerPhase::Pressed,
            Self::Updated { .. } => PointerPhase::Updated,
            Self::Released { .. } => PointerPhase::Released,
            Self::Cancelled { .. } => PointerPhase::Cancelled,
        }
    }
}
