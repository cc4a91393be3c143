//! Tests for conflict resolution, dependencies, cancellation and input
//! validation across the whole engine.

use std::sync::Arc;

use horizon_touch::{
    DispatchError, Gesture, GestureBase, GestureManager, GesturePriority, GestureSettings,
    GestureState, NotificationKind, Pointer, PointerEvent, PointerId, PressGesture,
    SimultaneousPolicy,
};

/// Continuous gesture: begins on press, changes on move, ends on release.
struct Drag {
    base: GestureBase,
}

impl Drag {
    fn new() -> Self {
        Self {
            base: GestureBase::new("drag"),
        }
    }
}

impl Gesture for Drag {
    fn base(&self) -> &GestureBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GestureBase {
        &mut self.base
    }

    fn pointers_pressed(&mut self, _pointers: &[Pointer]) {
        self.base.set_state(GestureState::Began);
    }

    fn pointers_updated(&mut self, _pointers: &[Pointer]) {
        self.base.set_state(GestureState::Changed);
    }

    fn pointers_released(&mut self, _pointers: &[Pointer]) {
        if self.base.pointer_count() == 0 {
            self.base.set_state(GestureState::Ended);
        }
    }
}

/// Holds pointers without ever deciding; fails when they lift.
struct Hold {
    base: GestureBase,
}

impl Hold {
    fn new() -> Self {
        Self {
            base: GestureBase::new("hold"),
        }
    }
}

impl Gesture for Hold {
    fn base(&self) -> &GestureBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GestureBase {
        &mut self.base
    }
}

fn exclusive(gesture: PressGesture, policy: &Arc<SimultaneousPolicy>) -> PressGesture {
    let mut gesture = gesture;
    gesture.base_mut().set_delegate(policy.clone());
    gesture
}

#[test]
fn test_no_delegate_means_no_prevention() {
    let mut manager = GestureManager::new();
    let node = manager.hierarchy_mut().create_node("node");
    let a = manager.attach(node, PressGesture::new()).unwrap();
    let b = manager.attach(node, PressGesture::new()).unwrap();

    let (ga, gb) = (manager.gesture(a).unwrap(), manager.gesture(b).unwrap());
    assert!(!ga.can_prevent(gb));
    assert!(!ga.can_be_prevented_by(gb));
    assert!(!gb.can_prevent(ga));
    assert!(!gb.can_be_prevented_by(ga));

    let report = manager.process_batch(&[PointerEvent::pressed(1, (0.0, 0.0), node)]);
    assert_eq!(report.recognized(), vec![a, b]);
}

fn run_exclusive_same_node() -> (Vec<GestureState>, horizon_touch::BatchReport) {
    let mut manager = GestureManager::new();
    let node = manager.hierarchy_mut().create_node("node");
    let policy = Arc::new(SimultaneousPolicy::new());
    let first = manager
        .attach(node, exclusive(PressGesture::new(), &policy))
        .unwrap();
    let second = manager
        .attach(node, exclusive(PressGesture::new(), &policy))
        .unwrap();

    let report = manager.process_batch(&[PointerEvent::pressed(7, (1.0, 1.0), node)]);
    let states = vec![
        manager.state(first).unwrap(),
        manager.state(second).unwrap(),
    ];
    (states, report)
}

#[test]
fn test_disallowing_delegate_leaves_exactly_one_winner() {
    let (states, report) = run_exclusive_same_node();
    assert_eq!(states, vec![GestureState::Recognized, GestureState::Failed]);
    assert_eq!(report.recognized().len(), 1);
    assert_eq!(report.failed().len(), 1);

    for _ in 0..5 {
        assert_eq!(run_exclusive_same_node(), (states.clone(), report.clone()));
    }
}

#[test]
fn test_allowed_pair_recognizes_together() {
    let mut manager = GestureManager::new();
    let node = manager.hierarchy_mut().create_node("node");
    let policy = Arc::new(SimultaneousPolicy::new());
    let a = manager
        .attach(node, exclusive(PressGesture::new(), &policy))
        .unwrap();
    let b = manager
        .attach(node, exclusive(PressGesture::new(), &policy))
        .unwrap();
    policy.allow_simultaneous(a, b);

    let report = manager.process_batch(&[PointerEvent::pressed(1, (0.0, 0.0), node)]);
    assert_eq!(report.recognized(), vec![a, b]);
}

#[test]
fn test_deeper_node_wins_then_priority_overrides() {
    let mut manager = GestureManager::new();
    let list = manager.hierarchy_mut().create_node("list");
    let row = manager.hierarchy_mut().create_child(list, "row").unwrap();
    let policy = Arc::new(SimultaneousPolicy::new());

    // Attached ancestor first so attach order alone would favour it.
    let outer = manager
        .attach(list, exclusive(PressGesture::new(), &policy))
        .unwrap();
    let inner = manager
        .attach(row, exclusive(PressGesture::new(), &policy))
        .unwrap();

    let report = manager.process_batch(&[PointerEvent::pressed(1, (0.0, 0.0), row)]);
    assert_eq!(report.recognized(), vec![inner]);
    assert_eq!(report.failed(), vec![outer]);

    manager.process_batch(&[PointerEvent::released(1, (0.0, 0.0))]);
    manager
        .gesture_mut(outer)
        .unwrap()
        .base_mut()
        .set_settings(GestureSettings::new().with_priority(GesturePriority::High));

    let report = manager.process_batch(&[PointerEvent::pressed(2, (0.0, 0.0), row)]);
    assert_eq!(report.recognized(), vec![outer]);
    assert_eq!(report.failed(), vec![inner]);
}

#[test]
fn test_disjoint_pointers_do_not_conflict() {
    let mut manager = GestureManager::new();
    let left = manager.hierarchy_mut().create_node("left");
    let right = manager.hierarchy_mut().create_node("right");
    let policy = Arc::new(SimultaneousPolicy::new());
    let a = manager
        .attach(left, exclusive(PressGesture::new(), &policy))
        .unwrap();
    let b = manager
        .attach(right, exclusive(PressGesture::new(), &policy))
        .unwrap();

    let report = manager.process_batch(&[
        PointerEvent::pressed(1, (0.0, 0.0), left),
        PointerEvent::pressed(2, (50.0, 0.0), right),
    ]);
    assert_eq!(report.recognized(), vec![a, b]);
}

#[test]
fn test_winner_voids_undecided_competitors() {
    let mut manager = GestureManager::new();
    let node = manager.hierarchy_mut().create_node("node");
    let policy = Arc::new(SimultaneousPolicy::new());

    let mut drag = Drag::new();
    drag.base_mut().set_delegate(policy.clone());
    let drag = manager.attach(node, drag).unwrap();
    // Needs a second finger, so it has not asked for anything yet.
    let press = manager
        .attach(
            node,
            exclusive(
                PressGesture::with_settings(GestureSettings::new().with_min_pointers(2)),
                &policy,
            ),
        )
        .unwrap();

    let report = manager.process_batch(&[PointerEvent::pressed(1, (0.0, 0.0), node)]);
    assert_eq!(report.failed(), vec![press]);
    assert_eq!(manager.state(drag), Some(GestureState::Began));

    let report = manager.process_batch(&[PointerEvent::updated(1, (3.0, 0.0))]);
    assert!(report.notifications.is_empty());
    assert_eq!(manager.state(drag), Some(GestureState::Changed));
}

#[test]
fn test_active_gesture_blocks_late_candidate() {
    let mut manager = GestureManager::new();
    let list = manager.hierarchy_mut().create_node("list");
    let row = manager.hierarchy_mut().create_child(list, "row").unwrap();
    let policy = Arc::new(SimultaneousPolicy::new());

    let mut drag = Drag::new();
    drag.base_mut().set_delegate(policy.clone());
    let drag = manager.attach(list, drag).unwrap();
    let press = manager
        .attach(row, exclusive(PressGesture::new(), &policy))
        .unwrap();

    // The first pointer lands on the list only.
    manager.process_batch(&[PointerEvent::pressed(1, (0.0, 0.0), list)]);
    assert_eq!(manager.state(drag), Some(GestureState::Began));
    assert_eq!(manager.state(press), Some(GestureState::Possible));

    // The second lands on the row and reaches both; the running drag wins.
    let report = manager.process_batch(&[PointerEvent::pressed(2, (5.0, 0.0), row)]);
    assert_eq!(manager.dispatcher().assignment(PointerId(2)), &[press, drag]);
    assert_eq!(report.failed(), vec![press]);
    assert_eq!(manager.state(drag), Some(GestureState::Began));
}

/// Always prevents others and can never be prevented.
struct Greedy {
    base: GestureBase,
}

impl Gesture for Greedy {
    fn base(&self) -> &GestureBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GestureBase {
        &mut self.base
    }

    fn can_prevent(&self, _other: &dyn Gesture) -> bool {
        true
    }

    fn can_be_prevented_by(&self, _other: &dyn Gesture) -> bool {
        false
    }

    fn pointers_pressed(&mut self, _pointers: &[Pointer]) {
        if self.base.pointer_count() >= 2 {
            self.base.set_state(GestureState::Recognized);
        }
    }
}

#[test]
fn test_asymmetric_winner_cancels_changed_competitor() {
    let mut manager = GestureManager::new();
    let node = manager.hierarchy_mut().create_node("node");

    let drag = manager.attach(node, Drag::new()).unwrap();
    let greedy = manager
        .attach(
            node,
            Greedy {
                base: GestureBase::new("greedy"),
            },
        )
        .unwrap();

    manager.process_batch(&[PointerEvent::pressed(1, (0.0, 0.0), node)]);
    manager.process_batch(&[PointerEvent::updated(1, (2.0, 0.0))]);
    assert_eq!(manager.state(drag), Some(GestureState::Changed));
    assert_eq!(manager.state(greedy), Some(GestureState::Possible));

    let report = manager.process_batch(&[PointerEvent::pressed(2, (4.0, 0.0), node)]);
    assert_eq!(report.recognized(), vec![greedy]);
    assert_eq!(report.cancelled(), vec![drag]);
}

#[test]
fn test_external_cancellation() {
    let mut manager = GestureManager::new();
    let node = manager.hierarchy_mut().create_node("node");
    let drag = manager.attach(node, Drag::new()).unwrap();
    let hold = manager.attach(node, Hold::new()).unwrap();

    manager.process_batch(&[PointerEvent::pressed(1, (0.0, 0.0), node)]);
    assert_eq!(manager.state(drag), Some(GestureState::Began));
    assert_eq!(manager.state(hold), Some(GestureState::Possible));

    let report = manager.process_batch(&[PointerEvent::cancelled(1, (0.0, 0.0))]);
    assert_eq!(report.cancelled(), vec![drag, hold]);
    assert_eq!(manager.dispatcher().active_count(), 0);

    let report = manager.process_batch(&[]);
    assert_eq!(report.resets, vec![drag, hold]);
}

#[test]
fn test_require_to_fail_defers_until_dependency_fails() {
    let mut manager = GestureManager::new();
    let node = manager.hierarchy_mut().create_node("node");
    let press = manager.attach(node, PressGesture::new()).unwrap();
    let hold = manager.attach(node, Hold::new()).unwrap();
    manager.require_to_fail(press, hold).unwrap();

    let report = manager.process_batch(&[PointerEvent::pressed(1, (0.0, 0.0), node)]);
    assert!(report.recognized().is_empty());
    assert_eq!(report.deferred, vec![press]);
    assert!(manager.is_deferred(press));
    assert_eq!(manager.state(press), Some(GestureState::Possible));

    // Still undecided while the pointer is held.
    let report = manager.process_batch(&[PointerEvent::updated(1, (1.0, 0.0))]);
    assert_eq!(report.deferred, vec![press]);

    let report = manager.process_batch(&[PointerEvent::released(1, (1.0, 0.0))]);
    assert_eq!(report.failed(), vec![hold]);
    assert_eq!(report.recognized(), vec![press]);
    assert!(report.deferred.is_empty());
}

#[test]
fn test_require_to_fail_fails_when_dependency_recognizes() {
    let mut manager = GestureManager::new();
    let node = manager.hierarchy_mut().create_node("node");
    let dependant = manager.attach(node, PressGesture::new()).unwrap();
    let dependency = manager.attach(node, PressGesture::new()).unwrap();
    manager.require_to_fail(dependant, dependency).unwrap();

    let report = manager.process_batch(&[PointerEvent::pressed(1, (0.0, 0.0), node)]);
    assert_eq!(report.recognized(), vec![dependency]);
    assert_eq!(report.failed(), vec![dependant]);
}

#[test]
fn test_require_to_fail_validation() {
    let mut manager = GestureManager::new();
    let node = manager.hierarchy_mut().create_node("node");
    let a = manager.attach(node, PressGesture::new()).unwrap();
    let b = manager.attach(node, PressGesture::new()).unwrap();

    assert_eq!(
        manager.require_to_fail(a, a),
        Err(horizon_touch::GestureError::SelfDependency(a))
    );
    manager.detach(b).unwrap();
    assert_eq!(
        manager.require_to_fail(a, b),
        Err(horizon_touch::GestureError::GestureNotFound(b))
    );
}

#[test]
fn test_malformed_events_are_rejected_without_aborting() {
    let mut manager = GestureManager::new();
    let node = manager.hierarchy_mut().create_node("node");
    let dead = manager.hierarchy_mut().create_node("dead");
    manager.hierarchy_mut().destroy(dead).unwrap();
    let press = manager.attach(node, PressGesture::new()).unwrap();

    let report = manager.process_batch(&[
        PointerEvent::updated(9, (0.0, 0.0)),
        PointerEvent::pressed(1, (0.0, 0.0), node),
        PointerEvent::pressed(1, (0.0, 0.0), node),
        PointerEvent::pressed(2, (0.0, 0.0), dead),
    ]);
    assert_eq!(
        report.rejected,
        vec![
            DispatchError::UnknownPointer(PointerId(9)),
            DispatchError::DuplicatePress(PointerId(1)),
            DispatchError::UnknownTarget {
                pointer: PointerId(2),
                node: dead
            },
        ]
    );
    assert_eq!(report.recognized(), vec![press]);

    let report = manager.process_batch(&[
        PointerEvent::released(1, (0.0, 0.0)),
        PointerEvent::updated(1, (0.0, 0.0)),
    ]);
    assert_eq!(
        report.rejected,
        vec![DispatchError::UnknownPointer(PointerId(1))]
    );
}

#[test]
fn test_destroy_node_cancels_in_progress_gestures() {
    let mut manager = GestureManager::new();
    let window = manager.hierarchy_mut().create_node("window");
    let canvas = manager
        .hierarchy_mut()
        .create_child(window, "canvas")
        .unwrap();
    let drag = manager.attach(canvas, Drag::new()).unwrap();
    let outer = manager.attach(window, PressGesture::new()).unwrap();

    let cancelled = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let cancelled_clone = cancelled.clone();
    manager.notifications().connect(move |n| {
        if n.kind == NotificationKind::Cancelled {
            cancelled_clone.lock().push(n.gesture);
        }
    });

    manager.process_batch(&[PointerEvent::pressed(1, (0.0, 0.0), canvas)]);
    let detached = manager.destroy_node(canvas).unwrap();
    assert_eq!(detached, vec![drag]);
    assert_eq!(*cancelled.lock(), vec![drag]);
    assert_eq!(manager.gesture_ids(), &[outer]);

    // The surviving ancestor still sees the pointer lift.
    let report = manager.process_batch(&[PointerEvent::released(1, (0.0, 0.0))]);
    assert!(report.rejected.is_empty());
}
