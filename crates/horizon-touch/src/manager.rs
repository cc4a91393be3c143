//! Gesture manager and batch processing.
//!
//! [`GestureManager`] owns the node hierarchy, the attached gestures, the
//! pointer [`Dispatcher`] and the [`GestureArena`]. It has a single entry
//! point per input tick, [`process_batch`](GestureManager::process_batch),
//! which runs these steps in order:
//!
//! 1. Gestures that finished their attempt in an earlier batch and hold no
//!    pointers are reset to `Possible`.
//! 2. The dispatcher applies the raw events to the pointer registry and
//!    drops malformed ones.
//! 3. Recognition hooks run in event order. Consecutive events of the same
//!    phase form a run, and each gesture sees all of its pointers in a run
//!    in one call. A release that arrived before a press is therefore
//!    removed before the press is added. Pressed pointers are routed when
//!    their run comes up, fixing the gestures they belong to, so a gesture
//!    that finished earlier in the batch does not receive them. Cancelled
//!    pointers force their gestures into `Cancelled`.
//! 4. Queued state requests are committed. Requests that start or
//!    recognize a gesture go through the arena first. Gestures whose last
//!    pointer left while still undecided are finalized. This repeats while
//!    anything changes, so a failure can release a deferred dependant in the
//!    same batch.
//! 5. Ended pointers are removed from the registry.
//!
//! Everything that happened is returned in a [`BatchReport`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use horizon_touch_core::logging::{SceneTreeDebug, targets};
use horizon_touch_core::signal::panic_message;
use horizon_touch_core::{NodeHierarchy, NodeId, Point, SceneGraph, Signal};
use slotmap::SlotMap;

use crate::arena::{Contender, Decision, GestureArena};
use crate::config::ManagerConfig;
use crate::dispatch::{Dispatcher, GestureLookup};
use crate::error::{DispatchError, GestureError, Result};
use crate::gesture::{
    Gesture, GestureId, GestureNotification, NotificationKind, StateChange, apply_transition,
    reset_gesture,
};
use crate::pointer::{Pointer, PointerEvent, PointerId, PointerPhase};
use crate::state::GestureState;

/// Everything that happened during one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Batch number, starting at 1.
    pub frame: u64,
    /// Gestures reset to `Possible` at the start of the batch.
    pub resets: Vec<GestureId>,
    /// Committed transitions, in commit order.
    pub transitions: Vec<StateChange>,
    /// Terminal transitions, in commit order.
    pub notifications: Vec<GestureNotification>,
    /// Gestures still waiting on a required-to-fail gesture.
    pub deferred: Vec<GestureId>,
    /// Events that were dropped as malformed.
    pub rejected: Vec<DispatchError>,
}

impl BatchReport {
    fn new(frame: u64) -> Self {
        Self {
            frame,
            ..Default::default()
        }
    }

    /// Gestures that produced a notification of `kind`, in order.
    pub fn with_kind(&self, kind: NotificationKind) -> Vec<GestureId> {
        self.notifications
            .iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.gesture)
            .collect()
    }

    /// Gestures that recognized.
    pub fn recognized(&self) -> Vec<GestureId> {
        self.with_kind(NotificationKind::Recognized)
    }

    /// Gestures that failed.
    pub fn failed(&self) -> Vec<GestureId> {
        self.with_kind(NotificationKind::Failed)
    }

    /// Gestures that ended.
    pub fn ended(&self) -> Vec<GestureId> {
        self.with_kind(NotificationKind::Ended)
    }

    /// Gestures that were cancelled.
    pub fn cancelled(&self) -> Vec<GestureId> {
        self.with_kind(NotificationKind::Cancelled)
    }

    /// Whether nothing happened.
    pub fn is_empty(&self) -> bool {
        self.resets.is_empty()
            && self.transitions.is_empty()
            && self.deferred.is_empty()
            && self.rejected.is_empty()
    }
}

struct GestureSlot {
    gesture: Box<dyn Gesture>,
    sequence: u64,
}

struct Lookup<'a> {
    gestures: &'a SlotMap<GestureId, GestureSlot>,
    by_node: &'a HashMap<NodeId, Vec<GestureId>>,
}

impl GestureLookup for Lookup<'_> {
    fn gestures_on(&self, node: NodeId) -> &[GestureId] {
        self.by_node.get(&node).map_or(&[], Vec::as_slice)
    }

    fn accepts(&self, id: GestureId, pointer: &Pointer) -> bool {
        let Some(slot) = self.gestures.get(id) else {
            return false;
        };
        let gesture = slot.gesture.as_ref();
        let base = gesture.base();
        if !base.is_enabled() || base.effective_state().is_terminal() {
            return false;
        }
        panic::catch_unwind(AssertUnwindSafe(|| gesture.should_receive_pointer(pointer)))
            .unwrap_or_else(|payload| {
                tracing::error!(
                    target: targets::DISPATCH,
                    gesture = ?id,
                    panic = panic_message(payload.as_ref()),
                    "pointer filter panicked; skipping gesture"
                );
                false
            })
    }
}

/// Owner of the gesture engine.
///
/// `H` is the node hierarchy gestures are attached to. The default,
/// [`SceneGraph`], is a self-contained hierarchy; applications with their
/// own scene implement [`NodeHierarchy`] for it instead.
pub struct GestureManager<H: NodeHierarchy = SceneGraph> {
    hierarchy: H,
    config: ManagerConfig,
    gestures: SlotMap<GestureId, GestureSlot>,
    /// Attach order.
    order: Vec<GestureId>,
    by_node: HashMap<NodeId, Vec<GestureId>>,
    next_sequence: u64,
    dispatcher: Dispatcher,
    arena: GestureArena,
    notifications: Signal<GestureNotification>,
    frame: u64,
}

impl Default for GestureManager<SceneGraph> {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureManager<SceneGraph> {
    /// Create a manager with an empty scene and default configuration.
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Create a manager with an empty scene.
    pub fn with_config(config: ManagerConfig) -> Self {
        Self::with_hierarchy(SceneGraph::new(), config)
    }

    /// Destroy `node` and its descendants, detaching their gestures first.
    ///
    /// Gestures that were in progress are cancelled. Returns the detached
    /// gestures.
    pub fn destroy_node(&mut self, node: NodeId) -> Result<Vec<GestureId>> {
        let doomed = self.hierarchy.depth_first_preorder(node)?;
        let mut detached = Vec::new();
        for node in doomed {
            for id in self.gestures_on(node).to_vec() {
                self.detach(id)?;
                detached.push(id);
            }
        }
        self.hierarchy.destroy(node)?;
        Ok(detached)
    }

    /// Render the subtree at `root`, listing each node's gestures and states.
    pub fn debug_tree(&self, root: NodeId) -> Result<String> {
        let output = SceneTreeDebug::new().format_subtree_with(&self.hierarchy, root, |node| {
            self.gestures_on(node)
                .iter()
                .filter_map(|&id| self.gesture(id))
                .map(|gesture| {
                    let base = gesture.base();
                    let name = if base.name().is_empty() {
                        base.kind()
                    } else {
                        base.name()
                    };
                    format!("{name}: {}", base.state())
                })
                .collect()
        })?;
        Ok(output)
    }
}

impl<H: NodeHierarchy> GestureManager<H> {
    /// Create a manager over an existing hierarchy.
    pub fn with_hierarchy(hierarchy: H, config: ManagerConfig) -> Self {
        Self {
            hierarchy,
            dispatcher: Dispatcher::new(&config),
            config,
            gestures: SlotMap::with_key(),
            order: Vec::new(),
            by_node: HashMap::new(),
            next_sequence: 0,
            arena: GestureArena::new(),
            notifications: Signal::new(),
            frame: 0,
        }
    }

    /// The node hierarchy.
    pub fn hierarchy(&self) -> &H {
        &self.hierarchy
    }

    /// The node hierarchy, mutably.
    ///
    /// Removing a node that still has gestures leaves them attached to a
    /// dead node; use [`destroy_node`](GestureManager::destroy_node) or
    /// [`detach`](Self::detach) first.
    pub fn hierarchy_mut(&mut self) -> &mut H {
        &mut self.hierarchy
    }

    /// The engine configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The pointer registry.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Number of batches processed.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Published for every terminal transition of every gesture.
    pub fn notifications(&self) -> &Signal<GestureNotification> {
        &self.notifications
    }

    /// Attach `gesture` to `node`.
    ///
    /// Fails if the node is not in the hierarchy or the gesture's pointer
    /// thresholds are inverted.
    pub fn attach<G: Gesture>(&mut self, node: NodeId, mut gesture: G) -> Result<GestureId> {
        if !self.hierarchy.contains_node(node) {
            return Err(GestureError::NodeNotFound(node));
        }
        gesture.base().settings().validate()?;

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let id = self.gestures.insert_with_key(|id| {
            gesture.base_mut().attach(id, node);
            GestureSlot {
                gesture: Box::new(gesture),
                sequence,
            }
        });
        self.by_node.entry(node).or_default().push(id);
        self.order.push(id);

        tracing::debug!(target: targets::MANAGER, gesture = ?id, ?node, "gesture attached");
        Ok(id)
    }

    /// Detach a gesture and hand it back.
    ///
    /// A gesture that still holds pointers and has not finished is
    /// cancelled first. The returned gesture is reset and unattached.
    pub fn detach(&mut self, id: GestureId) -> Result<Box<dyn Gesture>> {
        let slot = self
            .gestures
            .get_mut(id)
            .ok_or(GestureError::GestureNotFound(id))?;
        let base = slot.gesture.base_mut();
        base.clear_pending();
        if base.pointer_count() > 0 && !base.state().is_terminal() {
            let mut report = BatchReport::new(self.frame);
            self.commit(id, GestureState::Cancelled, &mut report);
        }

        let mut slot = self
            .gestures
            .remove(id)
            .ok_or(GestureError::GestureNotFound(id))?;
        let node = slot.gesture.base().node();
        if let Some(list) = self.by_node.get_mut(&node) {
            list.retain(|&other| other != id);
            if list.is_empty() {
                self.by_node.remove(&node);
            }
        }
        self.order.retain(|&other| other != id);
        self.dispatcher.forget_gesture(id);
        self.arena.forget(id);
        for other in self.gestures.values_mut() {
            other.gesture.base_mut().remove_requirement(id);
        }

        reset_gesture(slot.gesture.as_mut());
        slot.gesture
            .base_mut()
            .attach(GestureId::default(), NodeId::default());
        tracing::debug!(target: targets::MANAGER, gesture = ?id, ?node, "gesture detached");
        Ok(slot.gesture)
    }

    /// Make `gesture` wait until `dependency` fails before it may begin or
    /// recognize. If `dependency` recognizes, `gesture` fails.
    pub fn require_to_fail(&mut self, gesture: GestureId, dependency: GestureId) -> Result<()> {
        if gesture == dependency {
            return Err(GestureError::SelfDependency(gesture));
        }
        if !self.gestures.contains_key(dependency) {
            return Err(GestureError::GestureNotFound(dependency));
        }
        let slot = self
            .gestures
            .get_mut(gesture)
            .ok_or(GestureError::GestureNotFound(gesture))?;
        slot.gesture.base_mut().add_requirement(dependency);
        Ok(())
    }

    /// An attached gesture.
    pub fn gesture(&self, id: GestureId) -> Option<&dyn Gesture> {
        self.gestures.get(id).map(|slot| slot.gesture.as_ref())
    }

    /// An attached gesture, mutably.
    ///
    /// State requests made through this reference are committed during the
    /// next batch.
    pub fn gesture_mut(&mut self, id: GestureId) -> Option<&mut dyn Gesture> {
        self.gestures.get_mut(id).map(|slot| slot.gesture.as_mut())
    }

    /// An attached gesture of a concrete type.
    pub fn gesture_as<T: Gesture>(&self, id: GestureId) -> Option<&T> {
        let gesture: &dyn Any = self.gestures.get(id)?.gesture.as_ref();
        gesture.downcast_ref::<T>()
    }

    /// An attached gesture of a concrete type, mutably.
    pub fn gesture_as_mut<T: Gesture>(&mut self, id: GestureId) -> Option<&mut T> {
        let gesture: &mut dyn Any = self.gestures.get_mut(id)?.gesture.as_mut();
        gesture.downcast_mut::<T>()
    }

    /// The committed state of a gesture.
    pub fn state(&self, id: GestureId) -> Option<GestureState> {
        self.gesture(id).map(|g| g.base().state())
    }

    /// Gestures attached to `node`, in attach order.
    pub fn gestures_on(&self, node: NodeId) -> &[GestureId] {
        self.by_node.get(&node).map_or(&[], Vec::as_slice)
    }

    /// All attached gestures, in attach order.
    pub fn gesture_ids(&self) -> &[GestureId] {
        &self.order
    }

    /// Number of attached gestures.
    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    /// Whether no gestures are attached.
    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    /// Whether `id` is waiting on a required-to-fail gesture.
    pub fn is_deferred(&self, id: GestureId) -> bool {
        self.arena.is_deferred(id)
    }

    /// Cancel every active pointer, for example when the window loses focus.
    pub fn cancel_all_pointers(&mut self) -> BatchReport {
        let events: Vec<PointerEvent> = self
            .dispatcher
            .pointers()
            .into_iter()
            .map(|p| PointerEvent::cancelled(p.id(), p.position()))
            .collect();
        self.process_batch(&events)
    }

    /// Process one tick of input.
    #[tracing::instrument(
        skip_all,
        target = "horizon_touch::manager",
        fields(frame = self.frame + 1, events = events.len())
    )]
    pub fn process_batch(&mut self, events: &[PointerEvent]) -> BatchReport {
        self.frame += 1;
        let mut report = BatchReport::new(self.frame);

        self.reset_finished(&mut report);

        let routing = self
            .dispatcher
            .apply_events(events, &self.hierarchy, self.frame);
        report.rejected.clone_from(&routing.rejected);

        // Pointers each gesture held at any point of this batch.
        let mut held: HashMap<GestureId, Vec<PointerId>> = HashMap::new();
        for (id, slot) in &self.gestures {
            let pointers = slot.gesture.base().pointers();
            if !pointers.is_empty() {
                held.insert(id, pointers.to_vec());
            }
        }

        // Runs keep event order: a lift before a press is removed first.
        let mut abandoned = Vec::new();
        for (phase, run) in routing.runs() {
            match phase {
                PointerPhase::Pressed => {
                    for &pointer in &run {
                        let lookup = Lookup {
                            gestures: &self.gestures,
                            by_node: &self.by_node,
                        };
                        self.dispatcher.route(pointer, &lookup);
                    }
                    for (id, pointers) in self.group(&run, false) {
                        held.entry(id).or_default().extend_from_slice(&pointers);
                        if let Some(slot) = self.gestures.get_mut(id) {
                            slot.gesture.base_mut().add_pointers(&pointers);
                        }
                        self.refresh_position(id);
                        let snapshots = self.snapshots(&pointers);
                        self.run_hook(id, &mut report, |g| g.pointers_pressed(&snapshots));
                    }
                }
                PointerPhase::Updated => {
                    for (id, pointers) in self.group(&run, true) {
                        self.refresh_position(id);
                        let snapshots = self.snapshots(&pointers);
                        self.run_hook(id, &mut report, |g| g.pointers_updated(&snapshots));
                    }
                }
                PointerPhase::Released => {
                    for (id, pointers) in self.group(&run, true) {
                        self.refresh_position(id);
                        if let Some(slot) = self.gestures.get_mut(id) {
                            slot.gesture.base_mut().remove_pointers(&pointers);
                        }
                        let snapshots = self.snapshots(&pointers);
                        self.run_hook(id, &mut report, |g| g.pointers_released(&snapshots));
                        if !abandoned.contains(&id) {
                            abandoned.push(id);
                        }
                    }
                }
                PointerPhase::Cancelled => {
                    for (id, pointers) in self.group(&run, true) {
                        if let Some(slot) = self.gestures.get_mut(id) {
                            slot.gesture.base_mut().remove_pointers(&pointers);
                        }
                        let snapshots = self.snapshots(&pointers);
                        self.run_hook(id, &mut report, |g| g.pointers_cancelled(&snapshots));
                        self.force_cancel(id, &mut report);
                        if !abandoned.contains(&id) {
                            abandoned.push(id);
                        }
                    }
                }
            }
        }

        self.arbitrate(&held, &abandoned, &mut report);

        for pointer in routing.ended() {
            self.dispatcher.retire(pointer);
        }
        report.deferred = self
            .order
            .iter()
            .copied()
            .filter(|&id| self.arena.is_deferred(id))
            .collect();

        tracing::debug!(
            target: targets::MANAGER,
            frame = self.frame,
            transitions = report.transitions.len(),
            rejected = report.rejected.len(),
            "batch processed"
        );
        report
    }

    fn reset_finished(&mut self, report: &mut BatchReport) {
        for &id in &self.order {
            let Some(slot) = self.gestures.get_mut(id) else {
                continue;
            };
            let base = slot.gesture.base();
            if base.state().is_terminal() && base.pointer_count() == 0 {
                reset_gesture(slot.gesture.as_mut());
                self.arena.forget(id);
                report.resets.push(id);
            }
        }
    }

    /// Group `pointers` by the gestures they are routed to, in routing order.
    fn group(&self, pointers: &[PointerId], held_only: bool) -> Vec<(GestureId, Vec<PointerId>)> {
        let mut groups: Vec<(GestureId, Vec<PointerId>)> = Vec::new();
        for &pointer in pointers {
            for &id in self.dispatcher.assignment(pointer) {
                let Some(slot) = self.gestures.get(id) else {
                    continue;
                };
                if held_only && !slot.gesture.base().has_pointer(pointer) {
                    continue;
                }
                match groups.iter_mut().find(|(gesture, _)| *gesture == id) {
                    Some((_, list)) => list.push(pointer),
                    None => groups.push((id, vec![pointer])),
                }
            }
        }
        groups
    }

    fn snapshots(&self, pointers: &[PointerId]) -> Vec<Pointer> {
        pointers
            .iter()
            .filter_map(|&id| self.dispatcher.pointer(id).cloned())
            .collect()
    }

    fn refresh_position(&mut self, id: GestureId) {
        let Some(slot) = self.gestures.get_mut(id) else {
            return;
        };
        let positions: Vec<Point> = slot
            .gesture
            .base()
            .pointers()
            .iter()
            .filter_map(|&p| self.dispatcher.pointer(p).map(Pointer::position))
            .collect();
        let centroid = (!positions.is_empty()).then(|| {
            let sum = positions.iter().fold(Point::ZERO, |acc, &p| acc + p);
            let n = positions.len() as f32;
            Point::new(sum.x / n, sum.y / n)
        });
        slot.gesture.base_mut().set_screen_position(centroid);
    }

    fn run_hook<F>(&mut self, id: GestureId, report: &mut BatchReport, hook: F)
    where
        F: FnOnce(&mut dyn Gesture),
    {
        let Some(slot) = self.gestures.get_mut(id) else {
            return;
        };
        let result = panic::catch_unwind(AssertUnwindSafe(|| hook(slot.gesture.as_mut())));
        if let Err(payload) = result {
            tracing::error!(
                target: targets::MANAGER,
                gesture = ?id,
                panic = panic_message(payload.as_ref()),
                "recognition hook panicked; failing gesture"
            );
            self.abort(id, report);
        }
    }

    /// Drop queued requests and force the gesture out of its attempt.
    fn abort(&mut self, id: GestureId, report: &mut BatchReport) {
        let Some(slot) = self.gestures.get_mut(id) else {
            return;
        };
        let base = slot.gesture.base_mut();
        base.clear_pending();
        if let Some(target) = base.state().forced_failure() {
            self.commit(id, target, report);
        }
    }

    fn force_cancel(&mut self, id: GestureId, report: &mut BatchReport) {
        let Some(slot) = self.gestures.get_mut(id) else {
            return;
        };
        let base = slot.gesture.base_mut();
        base.clear_pending();
        if !base.state().is_terminal() {
            self.commit(id, GestureState::Cancelled, report);
        }
    }

    fn commit(&mut self, id: GestureId, next: GestureState, report: &mut BatchReport) -> bool {
        let Some(slot) = self.gestures.get_mut(id) else {
            return false;
        };
        let Some(change) = apply_transition(slot.gesture.as_mut(), next) else {
            return false;
        };
        report.transitions.push(change);
        if let Some(notification) = change.notification() {
            self.arena.forget(id);
            report.notifications.push(notification);
            self.notifications.emit(notification);
        }
        true
    }

    fn commit_pending(&mut self, id: GestureId, report: &mut BatchReport) -> bool {
        let Some(slot) = self.gestures.get_mut(id) else {
            return false;
        };
        let mut committed = false;
        for next in slot.gesture.base_mut().take_pending() {
            committed |= self.commit(id, next, report);
        }
        committed
    }

    fn arbitrate(
        &mut self,
        held: &HashMap<GestureId, Vec<PointerId>>,
        abandoned: &[GestureId],
        report: &mut BatchReport,
    ) {
        loop {
            let mut progressed = false;

            // Requests that do not start or recognize a gesture commit first.
            for id in self.order.clone() {
                let direct = self.gestures.get(id).is_some_and(|slot| {
                    let base = slot.gesture.base();
                    base.has_pending_request() && !base.needs_arbitration()
                });
                if direct {
                    progressed |= self.commit_pending(id, report);
                }
            }

            let contenders = self.contenders(held);
            let plan = {
                let gestures = &self.gestures;
                self.arena.resolve(
                    &contenders,
                    |a, b| voids(gestures, a, b),
                    |id| {
                        gestures
                            .get(id)
                            .is_some_and(|slot| slot.gesture.base().should_begin())
                    },
                )
            };
            self.arena.record(&plan);
            for &(id, decision) in plan.decisions() {
                match decision {
                    Decision::Accept => {
                        progressed |= self.commit_pending(id, report);
                    }
                    Decision::Reject(target) => {
                        if let Some(slot) = self.gestures.get_mut(id) {
                            slot.gesture.base_mut().clear_pending();
                        }
                        progressed |= self.commit(id, target, report);
                    }
                    Decision::Defer => {}
                }
            }

            // Gestures that lost their last pointer without finishing.
            for &id in abandoned {
                let target = self.gestures.get(id).and_then(|slot| {
                    let base = slot.gesture.base();
                    if base.pointer_count() == 0 && !base.has_pending_request() {
                        base.state().abandoned()
                    } else {
                        None
                    }
                });
                if let Some(target) = target {
                    progressed |= self.commit(id, target, report);
                }
            }

            if !progressed {
                break;
            }
        }
    }

    fn contenders(&self, held: &HashMap<GestureId, Vec<PointerId>>) -> Vec<Contender> {
        self.order
            .iter()
            .filter_map(|&id| {
                let slot = self.gestures.get(id)?;
                let base = slot.gesture.base();
                let mut pointers = held.get(&id).cloned().unwrap_or_default();
                for &pointer in base.pointers() {
                    if !pointers.contains(&pointer) {
                        pointers.push(pointer);
                    }
                }
                let active = base.pointer_count() > 0 || base.has_pending_request();
                if !active && pointers.is_empty() {
                    return None;
                }
                Some(Contender {
                    id,
                    sequence: slot.sequence,
                    depth: self.hierarchy.depth(base.node()),
                    priority: base.settings().priority,
                    state: base.state(),
                    candidate: base.needs_arbitration(),
                    active,
                    pointers,
                    requires_to_fail: base.requires_to_fail().to_vec(),
                })
            })
            .collect()
    }
}

fn voids(gestures: &SlotMap<GestureId, GestureSlot>, a: GestureId, b: GestureId) -> bool {
    match (gestures.get(a), gestures.get(b)) {
        (Some(a), Some(b)) => {
            let (a, b) = (a.gesture.as_ref(), b.gesture.as_ref());
            a.can_prevent(b) || b.can_be_prevented_by(a)
        }
        _ => false,
    }
}

impl<H: NodeHierarchy> fmt::Debug for GestureManager<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureManager")
            .field("frame", &self.frame)
            .field("gestures", &self.gestures.len())
            .field("active_pointers", &self.dispatcher.active_count())
            .field("config", &self.config)
            .finish()
    }
}

static_assertions::assert_impl_all!(GestureManager: Send);
static_assertions::assert_impl_all!(BatchReport: Send, Sync);
