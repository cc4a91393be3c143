//! Pointer registry and routing.
//!
//! The [`Dispatcher`] owns every active [`Pointer`]. For each batch it
//! applies the raw events to the registry, rejecting malformed ones, and
//! records the surviving lifecycle steps in event order. When a pointer is
//! pressed it records the hit path and fixes the set of gestures the
//! pointer is routed to for the rest of its life.
//!
//! Routing walks the hit path recorded at press time, target first and then
//! each ancestor, and collects the gestures attached to each node in attach
//! order. Later changes to the hierarchy do not reroute active pointers.

use std::collections::{HashMap, HashSet};

use horizon_touch_core::logging::targets;
use horizon_touch_core::{NodeHierarchy, NodeId, Point};

use crate::config::ManagerConfig;
use crate::error::DispatchError;
use crate::gesture::GestureId;
use crate::pointer::{Pointer, PointerEvent, PointerId, PointerPhase, PressData};

/// Gesture lookups the dispatcher needs while routing a press.
pub trait GestureLookup {
    /// Gestures attached to `node`, in attach order.
    fn gestures_on(&self, node: NodeId) -> &[GestureId];

    /// Whether `gesture` is enabled, non-terminal and accepts `pointer`.
    fn accepts(&self, gesture: GestureId, pointer: &Pointer) -> bool;
}

/// Pointers touched by one batch, grouped by phase in event order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRouting {
    /// Newly pressed pointers.
    pub pressed: Vec<PointerId>,
    /// Pointers that moved. Each appears once.
    pub updated: Vec<PointerId>,
    /// Pointers that lifted.
    pub released: Vec<PointerId>,
    /// Pointers that were cancelled.
    pub cancelled: Vec<PointerId>,
    /// Events that were dropped.
    pub rejected: Vec<DispatchError>,
    /// Accepted events as `(phase, pointer)`, in the order they arrived.
    pub steps: Vec<(PointerPhase, PointerId)>,
}

impl BatchRouting {
    /// Consecutive steps of the same phase merged into one run.
    ///
    /// Runs keep event order, so a release that arrived before a press is
    /// handed out before it. A pointer appears at most once per run.
    pub fn runs(&self) -> Vec<(PointerPhase, Vec<PointerId>)> {
        let mut runs: Vec<(PointerPhase, Vec<PointerId>)> = Vec::new();
        for &(phase, pointer) in &self.steps {
            match runs.last_mut() {
                Some((last, pointers)) if *last == phase => {
                    if !pointers.contains(&pointer) {
                        pointers.push(pointer);
                    }
                }
                _ => runs.push((phase, vec![pointer])),
            }
        }
        runs
    }

    /// Pointers that end with this batch.
    pub fn ended(&self) -> impl Iterator<Item = PointerId> + '_ {
        self.released.iter().chain(&self.cancelled).copied()
    }
}

/// Owner of the pointer registry.
#[derive(Debug)]
pub struct Dispatcher {
    pointers: HashMap<PointerId, Pointer>,
    assignments: HashMap<PointerId, Vec<GestureId>>,
    history_len: usize,
    propagate_to_ancestors: bool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(&ManagerConfig::default())
    }
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new(config: &ManagerConfig) -> Self {
        Self {
            pointers: HashMap::new(),
            assignments: HashMap::new(),
            history_len: config.pointer_history_len,
            propagate_to_ancestors: config.propagate_to_ancestors,
        }
    }

    /// An active pointer.
    pub fn pointer(&self, id: PointerId) -> Option<&Pointer> {
        self.pointers.get(&id)
    }

    /// All active pointers, in ID order.
    pub fn pointers(&self) -> Vec<&Pointer> {
        let mut pointers: Vec<&Pointer> = self.pointers.values().collect();
        pointers.sort_by_key(|p| p.id());
        pointers
    }

    /// Number of active pointers.
    pub fn active_count(&self) -> usize {
        self.pointers.len()
    }

    /// Gestures the pointer was routed to when it was pressed.
    pub fn assignment(&self, id: PointerId) -> &[GestureId] {
        self.assignments.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Apply one batch of raw events to the registry.
    ///
    /// Released and cancelled pointers stay in the registry until
    /// [`retire`](Self::retire) so their final snapshot can be delivered.
    pub fn apply_events<H: NodeHierarchy>(
        &mut self,
        events: &[PointerEvent],
        hierarchy: &H,
        frame: u64,
    ) -> BatchRouting {
        let mut routing = BatchRouting::default();
        let mut ended: HashSet<PointerId> = HashSet::new();

        for event in events {
            let id = event.id();
            let result = match *event {
                PointerEvent::Pressed {
                    id,
                    kind,
                    position,
                    target,
                } => {
                    if self.pointers.contains_key(&id) || ended.contains(&id) {
                        Err(DispatchError::DuplicatePress(id))
                    } else if !hierarchy.contains_node(target) {
                        Err(DispatchError::UnknownTarget { pointer: id, node: target })
                    } else {
                        let hit_path = if self.propagate_to_ancestors {
                            hierarchy.hit_path(target)
                        } else {
                            vec![target]
                        };
                        let press = PressData {
                            target,
                            position,
                            hit_path,
                            frame,
                        };
                        self.pointers.insert(id, Pointer::new(id, kind, press));
                        routing.pressed.push(id);
                        routing.steps.push((PointerPhase::Pressed, id));
                        Ok(())
                    }
                }
                PointerEvent::Updated { position, .. } => {
                    self.move_active(id, position, &ended).map(|()| {
                        if !routing.updated.contains(&id) {
                            routing.updated.push(id);
                        }
                        routing.steps.push((PointerPhase::Updated, id));
                    })
                }
                PointerEvent::Released { position, .. } => {
                    self.move_active(id, position, &ended).map(|()| {
                        ended.insert(id);
                        routing.released.push(id);
                        routing.steps.push((PointerPhase::Released, id));
                    })
                }
                PointerEvent::Cancelled { position, .. } => {
                    self.move_active(id, position, &ended).map(|()| {
                        ended.insert(id);
                        routing.cancelled.push(id);
                        routing.steps.push((PointerPhase::Cancelled, id));
                    })
                }
            };

            if let Err(err) = result {
                tracing::warn!(target: targets::DISPATCH, frame, "dropping event: {err}");
                routing.rejected.push(err);
            }
        }

        tracing::trace!(
            target: targets::DISPATCH,
            frame,
            pressed = routing.pressed.len(),
            updated = routing.updated.len(),
            released = routing.released.len(),
            cancelled = routing.cancelled.len(),
            "batch routed"
        );
        routing
    }

    fn move_active(
        &mut self,
        id: PointerId,
        position: Point,
        ended: &HashSet<PointerId>,
    ) -> Result<(), DispatchError> {
        if ended.contains(&id) {
            return Err(DispatchError::UnknownPointer(id));
        }
        let pointer = self
            .pointers
            .get_mut(&id)
            .ok_or(DispatchError::UnknownPointer(id))?;
        if pointer.position() != position {
            pointer.move_to(position, self.history_len);
        }
        Ok(())
    }

    /// Gestures eligible for `pointer`, in routing order.
    pub fn eligible_gestures(&self, pointer: &Pointer, lookup: &impl GestureLookup) -> Vec<GestureId> {
        let mut eligible = Vec::new();
        for &node in &pointer.press_data().hit_path {
            for &gesture in lookup.gestures_on(node) {
                if lookup.accepts(gesture, pointer) {
                    eligible.push(gesture);
                }
            }
        }
        eligible
    }

    /// Route a pressed pointer and fix its assignment.
    pub fn route(&mut self, id: PointerId, lookup: &impl GestureLookup) -> &[GestureId] {
        let eligible = match self.pointers.get(&id) {
            Some(pointer) => self.eligible_gestures(pointer, lookup),
            None => Vec::new(),
        };
        tracing::debug!(target: targets::DISPATCH, pointer = %id, gestures = eligible.len(), "pointer routed");
        self.assignments.entry(id).or_insert(eligible)
    }

    /// Remove an ended pointer from the registry.
    pub fn retire(&mut self, id: PointerId) -> Option<Pointer> {
        self.assignments.remove(&id);
        self.pointers.remove(&id)
    }

    /// Remove `gesture` from every assignment.
    pub fn forget_gesture(&mut self, gesture: GestureId) {
        for assigned in self.assignments.values_mut() {
            assigned.retain(|&g| g != gesture);
        }
    }
}
