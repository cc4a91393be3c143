//! Conflict resolution between gestures.
//!
//! When several gestures want to leave `Possible` in the same pass, the
//! arena decides which of them may. Candidates are ordered by precedence:
//! higher [`GesturePriority`] first, then deeper owning node, then attach
//! order. The order is total, so identical input always produces identical
//! outcomes.
//!
//! Each candidate, in order:
//!
//! 1. fails if an earlier winner in this pass voided it,
//! 2. fails if an overlapping gesture already in `Began` or `Changed` voids it,
//! 3. fails if a gesture it requires to fail has recognized, and is deferred
//!    while such a gesture is still undecided,
//! 4. fails if its delegate refuses to let it begin,
//! 5. otherwise wins and voids every overlapping, non-terminal gesture it
//!    prevents.
//!
//! "A voids B" means `A.can_prevent(B) || B.can_be_prevented_by(A)`. Two
//! gestures overlap when they share a pointer. A voided gesture is forced
//! into `Failed`, or into `Cancelled` if it is already in `Changed`.
//!
//! Resolution is a pure function of a [`Contender`] snapshot. The manager
//! commits the resulting [`ArbitrationPlan`].

use std::cmp::Reverse;
use std::collections::HashSet;

use horizon_touch_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::gesture::GestureId;
use crate::pointer::PointerId;
use crate::state::GestureState;

/// Priority level for gesture recognition.
///
/// Higher priority gestures get first chance at recognition when conflicts occur.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum GesturePriority {
    /// Low priority - processed last.
    Low = 0,
    /// Normal priority - default for most gestures.
    #[default]
    Normal = 1,
    /// High priority - processed first.
    High = 2,
}

/// Snapshot of one gesture taking part in arbitration.
#[derive(Debug, Clone, PartialEq)]
pub struct Contender {
    /// The gesture.
    pub id: GestureId,
    /// Attach order.
    pub sequence: u64,
    /// Depth of the owning node.
    pub depth: usize,
    /// Arbitration priority.
    pub priority: GesturePriority,
    /// Committed state.
    pub state: GestureState,
    /// Whether a queued request wants to leave `Possible`.
    pub candidate: bool,
    /// Whether the gesture holds pointers or has a queued request.
    pub active: bool,
    /// Pointers held at any point of the current batch.
    pub pointers: Vec<PointerId>,
    /// Gestures that must fail first.
    pub requires_to_fail: Vec<GestureId>,
}

impl Contender {
    fn overlaps(&self, other: &Contender) -> bool {
        self.pointers.iter().any(|p| other.pointers.contains(p))
    }
}

/// The arena's verdict for one gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Commit the queued requests.
    Accept,
    /// Drop the queued requests and force the given terminal state.
    Reject(GestureState),
    /// Keep the queued requests for a later pass.
    Defer,
}

/// Ordered decisions produced by one arbitration pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArbitrationPlan {
    decisions: Vec<(GestureId, Decision)>,
}

impl ArbitrationPlan {
    /// Decisions in commit order.
    pub fn decisions(&self) -> &[(GestureId, Decision)] {
        &self.decisions
    }

    /// Whether the pass decided nothing.
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// The decision for `id`, if any.
    pub fn decision(&self, id: GestureId) -> Option<Decision> {
        self.decisions
            .iter()
            .find(|(gesture, _)| *gesture == id)
            .map(|&(_, decision)| decision)
    }

    /// Whether any gesture was accepted or rejected.
    pub fn made_progress(&self) -> bool {
        self.decisions
            .iter()
            .any(|(_, decision)| *decision != Decision::Defer)
    }

    fn push(&mut self, id: GestureId, decision: Decision) {
        self.decisions.retain(|(gesture, _)| *gesture != id);
        self.decisions.push((id, decision));
    }
}

enum Dependency {
    Clear,
    Recognized(GestureId),
    Undecided(GestureId),
}

/// Arbitration engine.
///
/// The arena itself only remembers which gestures are currently deferred;
/// everything else is derived from the snapshot passed to
/// [`resolve`](Self::resolve).
#[derive(Debug, Default)]
pub struct GestureArena {
    deferred: HashSet<GestureId>,
}

impl GestureArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the decisions for one pass.
    ///
    /// `voids(a, b)` answers whether `a` recognizing forces `b` to fail.
    /// `should_begin(a)` asks the delegate of `a` for permission to begin.
    pub fn resolve<V, B>(&self, contenders: &[Contender], voids: V, should_begin: B) -> ArbitrationPlan
    where
        V: Fn(GestureId, GestureId) -> bool,
        B: Fn(GestureId) -> bool,
    {
        let mut order: Vec<&Contender> = contenders.iter().filter(|c| c.candidate).collect();
        order.sort_by_key(|c| (Reverse(c.priority), Reverse(c.depth), c.sequence));

        let mut plan = ArbitrationPlan::default();
        let mut winners: Vec<GestureId> = Vec::new();
        let mut voided: HashSet<GestureId> = HashSet::new();

        for candidate in order {
            let id = candidate.id;
            if voided.contains(&id) {
                continue;
            }

            let blocker = contenders.iter().find(|other| {
                other.id != id
                    && other.state.is_in_progress()
                    && !voided.contains(&other.id)
                    && other.overlaps(candidate)
                    && voids(other.id, id)
            });
            if let Some(blocker) = blocker {
                tracing::debug!(target: targets::ARENA, gesture = ?id, by = ?blocker.id, "prevented by active gesture");
                reject(&mut plan, &mut voided, candidate);
                continue;
            }

            match dependency_status(candidate, contenders, &winners, &voided) {
                Dependency::Recognized(dependency) => {
                    tracing::debug!(target: targets::ARENA, gesture = ?id, ?dependency, "required gesture recognized");
                    reject(&mut plan, &mut voided, candidate);
                    continue;
                }
                Dependency::Undecided(dependency) => {
                    tracing::trace!(target: targets::ARENA, gesture = ?id, ?dependency, "deferred");
                    plan.push(id, Decision::Defer);
                    continue;
                }
                Dependency::Clear => {}
            }

            if !should_begin(id) {
                tracing::debug!(target: targets::ARENA, gesture = ?id, "delegate refused to begin");
                reject(&mut plan, &mut voided, candidate);
                continue;
            }

            tracing::debug!(target: targets::ARENA, gesture = ?id, "accepted");
            winners.push(id);
            plan.push(id, Decision::Accept);

            for other in contenders {
                if other.id == id
                    || other.state.is_terminal()
                    || voided.contains(&other.id)
                    || winners.contains(&other.id)
                {
                    continue;
                }
                if candidate.overlaps(other) && voids(id, other.id) {
                    tracing::debug!(target: targets::ARENA, gesture = ?other.id, by = ?id, "prevented by winner");
                    reject(&mut plan, &mut voided, other);
                }
            }
        }
        plan
    }

    /// Remember which gestures a committed plan deferred.
    pub fn record(&mut self, plan: &ArbitrationPlan) {
        for &(id, decision) in plan.decisions() {
            if decision == Decision::Defer {
                self.deferred.insert(id);
            } else {
                self.deferred.remove(&id);
            }
        }
    }

    /// Whether `id` is waiting on a required-to-fail gesture.
    pub fn is_deferred(&self, id: GestureId) -> bool {
        self.deferred.contains(&id)
    }

    /// Forget `id`, for example after it was detached or reset.
    pub fn forget(&mut self, id: GestureId) {
        self.deferred.remove(&id);
    }
}

fn reject(plan: &mut ArbitrationPlan, voided: &mut HashSet<GestureId>, contender: &Contender) {
    if let Some(target) = contender.state.forced_failure() {
        voided.insert(contender.id);
        plan.push(contender.id, Decision::Reject(target));
    }
}

fn dependency_status(
    candidate: &Contender,
    contenders: &[Contender],
    winners: &[GestureId],
    voided: &HashSet<GestureId>,
) -> Dependency {
    let mut status = Dependency::Clear;
    for &dependency in &candidate.requires_to_fail {
        if voided.contains(&dependency) {
            continue;
        }
        if winners.contains(&dependency) {
            return Dependency::Recognized(dependency);
        }
        // Gestures outside the snapshot are idle and count as failed.
        let Some(other) = contenders.iter().find(|c| c.id == dependency) else {
            continue;
        };
        match other.state {
            GestureState::Failed | GestureState::Cancelled => {}
            GestureState::Possible => {
                if other.active {
                    status = Dependency::Undecided(dependency);
                }
            }
            GestureState::Began
            | GestureState::Changed
            | GestureState::Recognized
            | GestureState::Ended => return Dependency::Recognized(dependency),
        }
    }
    status
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    struct Fixture {
        ids: SlotMap<GestureId, ()>,
        contenders: Vec<Contender>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ids: SlotMap::with_key(),
                contenders: Vec::new(),
            }
        }

        fn add(&mut self, depth: usize, candidate: bool, pointers: &[u64]) -> GestureId {
            let id = self.ids.insert(());
            self.contenders.push(Contender {
                id,
                sequence: self.contenders.len() as u64,
                depth,
                priority: GesturePriority::Normal,
                state: GestureState::Possible,
                candidate,
                active: true,
                pointers: pointers.iter().copied().map(PointerId).collect(),
                requires_to_fail: Vec::new(),
            });
            id
        }

        fn get_mut(&mut self, id: GestureId) -> &mut Contender {
            self.contenders.iter_mut().find(|c| c.id == id).unwrap()
        }
    }

    fn exclusive(_: GestureId, _: GestureId) -> bool {
        true
    }

    fn simultaneous(_: GestureId, _: GestureId) -> bool {
        false
    }

    fn always(_: GestureId) -> bool {
        true
    }

    #[test]
    fn test_first_attached_wins_on_same_node() {
        let mut fx = Fixture::new();
        let first = fx.add(1, true, &[1]);
        let second = fx.add(1, true, &[1]);

        let plan = GestureArena::new().resolve(&fx.contenders, exclusive, always);
        assert_eq!(plan.decision(first), Some(Decision::Accept));
        assert_eq!(
            plan.decision(second),
            Some(Decision::Reject(GestureState::Failed))
        );
    }

    #[test]
    fn test_deeper_node_wins() {
        let mut fx = Fixture::new();
        let parent = fx.add(0, true, &[1]);
        let child = fx.add(2, true, &[1]);

        let plan = GestureArena::new().resolve(&fx.contenders, exclusive, always);
        assert_eq!(plan.decisions()[0], (child, Decision::Accept));
        assert_eq!(
            plan.decision(parent),
            Some(Decision::Reject(GestureState::Failed))
        );
    }

    #[test]
    fn test_priority_beats_depth() {
        let mut fx = Fixture::new();
        let parent = fx.add(0, true, &[1]);
        let child = fx.add(2, true, &[1]);
        fx.get_mut(parent).priority = GesturePriority::High;

        let plan = GestureArena::new().resolve(&fx.contenders, exclusive, always);
        assert_eq!(plan.decision(parent), Some(Decision::Accept));
        assert_eq!(
            plan.decision(child),
            Some(Decision::Reject(GestureState::Failed))
        );
    }

    #[test]
    fn test_simultaneous_and_disjoint_gestures_all_win() {
        let mut fx = Fixture::new();
        let a = fx.add(1, true, &[1]);
        let b = fx.add(1, true, &[1]);
        let plan = GestureArena::new().resolve(&fx.contenders, simultaneous, always);
        assert_eq!(plan.decision(a), Some(Decision::Accept));
        assert_eq!(plan.decision(b), Some(Decision::Accept));

        let mut fx = Fixture::new();
        let a = fx.add(1, true, &[1]);
        let b = fx.add(1, true, &[2]);
        let plan = GestureArena::new().resolve(&fx.contenders, exclusive, always);
        assert_eq!(plan.decision(a), Some(Decision::Accept));
        assert_eq!(plan.decision(b), Some(Decision::Accept));
    }

    #[test]
    fn test_in_progress_gesture_blocks_candidate() {
        let mut fx = Fixture::new();
        let pan = fx.add(0, false, &[1]);
        fx.get_mut(pan).state = GestureState::Changed;
        let press = fx.add(3, true, &[1]);

        let plan = GestureArena::new().resolve(&fx.contenders, exclusive, always);
        assert_eq!(
            plan.decision(press),
            Some(Decision::Reject(GestureState::Failed))
        );
        assert_eq!(plan.decision(pan), None);
    }

    #[test]
    fn test_winner_cancels_changed_gesture() {
        let mut fx = Fixture::new();
        let pan = fx.add(0, false, &[1]);
        fx.get_mut(pan).state = GestureState::Changed;
        let press = fx.add(3, true, &[1]);

        // Only the press prevents; the pan does not.
        let voids = move |a: GestureId, _: GestureId| a == press;
        let plan = GestureArena::new().resolve(&fx.contenders, voids, always);
        assert_eq!(plan.decision(press), Some(Decision::Accept));
        assert_eq!(
            plan.decision(pan),
            Some(Decision::Reject(GestureState::Cancelled))
        );
    }

    #[test]
    fn test_required_gesture_defers_then_releases() {
        let mut fx = Fixture::new();
        let double_tap = fx.add(1, false, &[1]);
        let press = fx.add(1, true, &[1]);
        fx.get_mut(press).requires_to_fail.push(double_tap);

        let mut arena = GestureArena::new();
        let plan = arena.resolve(&fx.contenders, simultaneous, always);
        assert_eq!(plan.decision(press), Some(Decision::Defer));
        assert!(!plan.made_progress());
        arena.record(&plan);
        assert!(arena.is_deferred(press));

        fx.get_mut(double_tap).state = GestureState::Failed;
        let plan = arena.resolve(&fx.contenders, simultaneous, always);
        assert_eq!(plan.decision(press), Some(Decision::Accept));
        arena.record(&plan);
        assert!(!arena.is_deferred(press));
    }

    #[test]
    fn test_required_gesture_recognizing_fails_dependant() {
        let mut fx = Fixture::new();
        let double_tap = fx.add(1, true, &[1]);
        let press = fx.add(1, true, &[1]);
        fx.get_mut(press).requires_to_fail.push(double_tap);

        let plan = GestureArena::new().resolve(&fx.contenders, simultaneous, always);
        assert_eq!(plan.decision(double_tap), Some(Decision::Accept));
        assert_eq!(
            plan.decision(press),
            Some(Decision::Reject(GestureState::Failed))
        );
    }

    #[test]
    fn test_idle_dependency_counts_as_failed() {
        let mut fx = Fixture::new();
        let idle = fx.add(1, false, &[]);
        fx.get_mut(idle).active = false;
        let press = fx.add(1, true, &[1]);
        fx.get_mut(press).requires_to_fail.push(idle);

        let plan = GestureArena::new().resolve(&fx.contenders, simultaneous, always);
        assert_eq!(plan.decision(press), Some(Decision::Accept));
    }

    #[test]
    fn test_should_begin_refusal() {
        let mut fx = Fixture::new();
        let a = fx.add(1, true, &[1]);
        let b = fx.add(1, true, &[1]);

        let plan = GestureArena::new().resolve(&fx.contenders, exclusive, move |id| id != a);
        assert_eq!(plan.decision(a), Some(Decision::Reject(GestureState::Failed)));
        assert_eq!(plan.decision(b), Some(Decision::Accept));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut fx = Fixture::new();
        for depth in [2, 0, 2, 1, 3, 1] {
            fx.add(depth, true, &[1, 2]);
        }
        let arena = GestureArena::new();
        let first = arena.resolve(&fx.contenders, exclusive, always);
        for _ in 0..10 {
            assert_eq!(arena.resolve(&fx.contenders, exclusive, always), first);
        }
        let accepted: Vec<_> = first
            .decisions()
            .iter()
            .filter(|(_, d)| *d == Decision::Accept)
            .collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].0, fx.contenders[4].id);
    }
}
