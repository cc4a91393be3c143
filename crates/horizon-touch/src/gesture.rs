//! The gesture contract.
//!
//! A gesture is a stateful recognizer attached to one scene node. Concrete
//! gestures embed a [`GestureBase`], which holds everything the engine
//! manages on their behalf (state machine, assigned pointers, delegate,
//! listeners), and implement the [`Gesture`] trait, whose hooks carry the
//! recognition logic.
//!
//! Hooks never commit state directly. They call
//! [`GestureBase::set_state`], which validates and queues the request; the
//! engine commits queued requests after every hook of the batch has run and
//! conflicts have been resolved.
//!
//! # Notifications
//!
//! Each committed transition is published on
//! [`GestureBase::state_changed`]. Transitions into `Recognized`, `Failed`,
//! `Ended` or `Cancelled` are additionally published once on
//! [`GestureBase::notifications`].

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use horizon_touch_core::logging::targets;
use horizon_touch_core::signal::panic_message;
use horizon_touch_core::{NodeId, Point, Signal};
use slotmap::new_key_type;

use crate::config::GestureSettings;
use crate::delegate::GestureDelegate;
use crate::message::{MessageSender, MessageTarget, ON_GESTURE_STATE_CHANGE};
use crate::pointer::{Pointer, PointerId};
use crate::state::{GestureState, PointerCountState, StateMachine};

new_key_type! {
    /// Identifier of an attached gesture.
    pub struct GestureId;
}

/// The outcome reported by a gesture notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// The gesture recognized.
    Recognized,
    /// The gesture failed.
    Failed,
    /// A continuous gesture ended.
    Ended,
    /// The gesture was cancelled.
    Cancelled,
}

impl NotificationKind {
    /// The notification produced by entering `state`, if any.
    pub fn from_state(state: GestureState) -> Option<Self> {
        match state {
            GestureState::Recognized => Some(Self::Recognized),
            GestureState::Failed => Some(Self::Failed),
            GestureState::Ended => Some(Self::Ended),
            GestureState::Cancelled => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A terminal transition, as delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureNotification {
    /// The gesture that transitioned.
    pub gesture: GestureId,
    /// The node it is attached to.
    pub node: NodeId,
    /// What happened.
    pub kind: NotificationKind,
}

/// A committed state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// The gesture that transitioned.
    pub gesture: GestureId,
    /// The node it is attached to.
    pub node: NodeId,
    /// State before the transition.
    pub previous: GestureState,
    /// State after the transition.
    pub current: GestureState,
}

impl StateChange {
    /// The notification this transition produces, if it is terminal.
    pub fn notification(&self) -> Option<GestureNotification> {
        NotificationKind::from_state(self.current).map(|kind| GestureNotification {
            gesture: self.gesture,
            node: self.node,
            kind,
        })
    }
}

/// Data and behavior shared by every gesture.
pub struct GestureBase {
    id: GestureId,
    node: NodeId,
    kind: &'static str,
    name: String,
    settings: GestureSettings,
    machine: StateMachine,
    pointers: Vec<PointerId>,
    count_state: PointerCountState,
    screen_position: Option<Point>,
    delegate: Option<Arc<dyn GestureDelegate>>,
    message_target: Option<Arc<dyn MessageTarget>>,
    requires_to_fail: Vec<GestureId>,
    state_changed: Signal<StateChange>,
    notifications: Signal<GestureNotification>,
}

impl GestureBase {
    /// Create an unattached base with default settings.
    ///
    /// `kind` is a short static name for the gesture type, used in logs and
    /// debug output.
    pub fn new(kind: &'static str) -> Self {
        Self::with_settings(kind, GestureSettings::default())
    }

    /// Create an unattached base with the given settings.
    pub fn with_settings(kind: &'static str, settings: GestureSettings) -> Self {
        Self {
            id: GestureId::default(),
            node: NodeId::default(),
            kind,
            name: String::new(),
            settings,
            machine: StateMachine::new(),
            pointers: Vec::new(),
            count_state: PointerCountState::InRange,
            screen_position: None,
            delegate: None,
            message_target: None,
            requires_to_fail: Vec::new(),
            state_changed: Signal::new(),
            notifications: Signal::new(),
        }
    }

    /// The gesture's ID. Null until attached.
    pub fn id(&self) -> GestureId {
        self.id
    }

    /// The node the gesture is attached to. Null until attached.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Whether the gesture has been attached to a manager.
    pub fn is_attached(&self) -> bool {
        self.id != GestureId::default()
    }

    /// The gesture type name.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The debug name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the debug name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The gesture's settings.
    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    /// Replace the settings.
    ///
    /// Thresholds are validated when the gesture is attached.
    pub fn set_settings(&mut self, settings: GestureSettings) {
        self.settings = settings;
    }

    /// Set the minimum pointer count.
    pub fn set_min_pointers(&mut self, min: u32) {
        self.settings.min_pointers = min;
    }

    /// Set the maximum pointer count. 0 means no limit.
    pub fn set_max_pointers(&mut self, max: u32) {
        self.settings.max_pointers = max;
    }

    /// Whether the gesture takes part in routing.
    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Enable or disable the gesture. A disabled gesture receives no new
    /// pointers but keeps the ones it already holds.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.enabled = enabled;
    }

    /// The committed state.
    pub fn state(&self) -> GestureState {
        self.machine.state()
    }

    /// The state once queued requests commit.
    pub fn effective_state(&self) -> GestureState {
        self.machine.effective_state()
    }

    /// Whether a state request is waiting for the engine.
    pub fn has_pending_request(&self) -> bool {
        self.machine.has_pending()
    }

    /// Request a transition.
    ///
    /// Returns `false` and leaves the gesture untouched when the transition
    /// is not a legal edge from the gesture's effective state.
    pub fn set_state(&mut self, next: GestureState) -> bool {
        match self.machine.request(next) {
            Ok(()) => {
                tracing::trace!(
                    target: targets::STATE,
                    gesture = ?self.id,
                    kind = self.kind,
                    requested = %next,
                    "state requested"
                );
                true
            }
            Err(err) => {
                tracing::debug!(target: targets::STATE, gesture = ?self.id, kind = self.kind, "{err}");
                false
            }
        }
    }

    /// Assigned pointers, in assignment order.
    pub fn pointers(&self) -> &[PointerId] {
        &self.pointers
    }

    /// Number of assigned pointers.
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Whether `pointer` is assigned to this gesture.
    pub fn has_pointer(&self, pointer: PointerId) -> bool {
        self.pointers.contains(&pointer)
    }

    /// How the most recent press or release moved the pointer count.
    pub fn pointer_count_state(&self) -> PointerCountState {
        self.count_state
    }

    /// Centroid of the assigned pointers, or of the last ones when none remain.
    pub fn screen_position(&self) -> Option<Point> {
        self.screen_position
    }

    /// The delegate, if any.
    pub fn delegate(&self) -> Option<&Arc<dyn GestureDelegate>> {
        self.delegate.as_ref()
    }

    /// Set the delegate.
    pub fn set_delegate(&mut self, delegate: Arc<dyn GestureDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Remove the delegate.
    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// The message target, if any.
    pub fn message_target(&self) -> Option<&Arc<dyn MessageTarget>> {
        self.message_target.as_ref()
    }

    /// Set the message target.
    pub fn set_message_target(&mut self, target: Arc<dyn MessageTarget>) {
        self.message_target = Some(target);
    }

    /// Remove the message target.
    pub fn clear_message_target(&mut self) {
        self.message_target = None;
    }

    /// Gestures that must fail before this one may begin or recognize.
    pub fn requires_to_fail(&self) -> &[GestureId] {
        &self.requires_to_fail
    }

    /// Published on every committed transition.
    pub fn state_changed(&self) -> &Signal<StateChange> {
        &self.state_changed
    }

    /// Published once on every transition into a terminal state.
    pub fn notifications(&self) -> &Signal<GestureNotification> {
        &self.notifications
    }

    /// Whether the delegate lets this gesture take `pointer`.
    pub fn should_receive_pointer(&self, pointer: &Pointer) -> bool {
        self.delegate
            .as_ref()
            .is_none_or(|delegate| delegate.should_receive_pointer(self, pointer))
    }

    /// Whether recognizing this gesture should force `other` to fail.
    ///
    /// Without a delegate gestures never prevent each other.
    pub fn can_prevent(&self, other: &GestureBase) -> bool {
        self.delegate
            .as_ref()
            .is_some_and(|delegate| !delegate.should_recognize_simultaneously(self, other))
    }

    /// Whether the delegate lets this gesture leave `Possible`.
    pub fn should_begin(&self) -> bool {
        self.delegate
            .as_ref()
            .is_none_or(|delegate| delegate.should_begin(self))
    }

    /// Send a named message to the target, if messages are enabled and a
    /// target is set. Target errors are logged.
    pub fn send_message(&self, name: &str) {
        if !self.settings.send_messages {
            return;
        }
        self.deliver(name);
    }

    fn deliver(&self, name: &str) {
        let Some(target) = &self.message_target else {
            return;
        };
        let sender = MessageSender {
            gesture: self.id,
            node: self.node,
            state: self.machine.state(),
        };
        if let Err(err) = target.send_message(name, &sender) {
            tracing::warn!(target: targets::MESSAGE, gesture = ?self.id, "{err}");
        }
    }

    pub(crate) fn attach(&mut self, id: GestureId, node: NodeId) {
        self.id = id;
        self.node = node;
    }

    pub(crate) fn add_requirement(&mut self, other: GestureId) {
        if !self.requires_to_fail.contains(&other) {
            self.requires_to_fail.push(other);
        }
    }

    pub(crate) fn remove_requirement(&mut self, other: GestureId) {
        self.requires_to_fail.retain(|&id| id != other);
    }

    pub(crate) fn needs_arbitration(&self) -> bool {
        self.machine.needs_arbitration()
    }

    pub(crate) fn take_pending(&mut self) -> Vec<GestureState> {
        self.machine.take_pending()
    }

    pub(crate) fn clear_pending(&mut self) {
        self.machine.clear_pending();
    }

    pub(crate) fn add_pointers(&mut self, ids: &[PointerId]) {
        let previous = self.pointers.len();
        for &id in ids {
            if !self.pointers.contains(&id) {
                self.pointers.push(id);
            }
        }
        self.count_state = PointerCountState::after_press(
            previous,
            self.pointers.len(),
            self.settings.min_pointers,
            self.settings.max_pointers,
        );
    }

    pub(crate) fn remove_pointers(&mut self, ids: &[PointerId]) {
        let previous = self.pointers.len();
        self.pointers.retain(|id| !ids.contains(id));
        self.count_state = PointerCountState::after_release(
            previous,
            self.pointers.len(),
            self.settings.min_pointers,
            self.settings.max_pointers,
        );
    }

    pub(crate) fn set_screen_position(&mut self, position: Option<Point>) {
        if position.is_some() {
            self.screen_position = position;
        }
    }

    /// Commit a transition against the committed state.
    pub(crate) fn commit(&mut self, next: GestureState) -> Option<StateChange> {
        match self.machine.commit(next) {
            Ok(previous) => {
                tracing::debug!(
                    target: targets::STATE,
                    gesture = ?self.id,
                    kind = self.kind,
                    "{previous} -> {next}"
                );
                Some(StateChange {
                    gesture: self.id,
                    node: self.node,
                    previous,
                    current: next,
                })
            }
            Err(err) => {
                tracing::debug!(target: targets::STATE, gesture = ?self.id, kind = self.kind, "{err}");
                None
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.machine.reset();
        self.pointers.clear();
        self.count_state = PointerCountState::InRange;
        self.screen_position = None;
    }
}

impl fmt::Debug for GestureBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureBase")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("state", &self.machine.state())
            .field("pending", &self.machine.pending())
            .field("pointers", &self.pointers)
            .field("has_delegate", &self.delegate.is_some())
            .finish()
    }
}

/// A gesture recognizer.
///
/// Implementors embed a [`GestureBase`] and override the hooks they need.
/// Every hook has a no-op default.
pub trait Gesture: Any + Send {
    /// Shared gesture data.
    fn base(&self) -> &GestureBase;

    /// Shared gesture data, mutably.
    fn base_mut(&mut self) -> &mut GestureBase;

    /// Whether the gesture wants `pointer`. Consulted once, when the
    /// pointer is pressed.
    fn should_receive_pointer(&self, pointer: &Pointer) -> bool {
        self.base().should_receive_pointer(pointer)
    }

    /// Whether recognizing this gesture should force `other` to fail.
    fn can_prevent(&self, other: &dyn Gesture) -> bool {
        self.base().can_prevent(other.base())
    }

    /// Whether `other` recognizing should force this gesture to fail.
    fn can_be_prevented_by(&self, other: &dyn Gesture) -> bool {
        self.base().can_prevent(other.base())
    }

    /// Pointers were assigned to the gesture.
    fn pointers_pressed(&mut self, _pointers: &[Pointer]) {}

    /// Assigned pointers moved.
    fn pointers_updated(&mut self, _pointers: &[Pointer]) {}

    /// Assigned pointers were released.
    fn pointers_released(&mut self, _pointers: &[Pointer]) {}

    /// Assigned pointers were cancelled. The gesture is cancelled right
    /// after this hook if it is not yet terminal.
    fn pointers_cancelled(&mut self, _pointers: &[Pointer]) {}

    /// The gesture entered `Recognized`.
    fn on_recognized(&mut self) {}

    /// The gesture entered `Ended`.
    fn on_ended(&mut self) {}

    /// The gesture entered `Failed`.
    fn on_failed(&mut self) {}

    /// The gesture entered `Cancelled`.
    fn on_cancelled(&mut self) {}

    /// The gesture was reset to `Possible`.
    fn on_reset(&mut self) {}
}

/// Commit `next` on `gesture` and run everything a committed transition
/// triggers: the `state_changed` signal, the state change message, the
/// matching hook and the terminal notification.
///
/// Returns `None` if the transition is illegal from the committed state.
pub(crate) fn apply_transition(
    gesture: &mut dyn Gesture,
    next: GestureState,
) -> Option<StateChange> {
    let change = gesture.base_mut().commit(next)?;

    let base = gesture.base();
    base.state_changed.emit(change);
    if base.settings.send_state_change_messages {
        base.deliver(ON_GESTURE_STATE_CHANGE);
    }

    let hook = panic::catch_unwind(AssertUnwindSafe(|| match next {
        GestureState::Recognized => gesture.on_recognized(),
        GestureState::Ended => gesture.on_ended(),
        GestureState::Failed => gesture.on_failed(),
        GestureState::Cancelled => gesture.on_cancelled(),
        _ => {}
    }));
    if let Err(payload) = hook {
        tracing::error!(
            target: targets::STATE,
            gesture = ?change.gesture,
            state = %next,
            panic = panic_message(payload.as_ref()),
            "transition hook panicked"
        );
    }

    if let Some(notification) = change.notification() {
        gesture.base().notifications.emit(notification);
    }
    Some(change)
}

/// Return `gesture` to `Possible` and run its reset hook.
pub(crate) fn reset_gesture(gesture: &mut dyn Gesture) {
    gesture.base_mut().reset();
    tracing::trace!(target: targets::STATE, gesture = ?gesture.base().id(), "reset");
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| gesture.on_reset())) {
        tracing::error!(
            target: targets::STATE,
            gesture = ?gesture.base().id(),
            panic = panic_message(payload.as_ref()),
            "reset hook panicked"
        );
    }
}
