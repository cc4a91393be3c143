//! Gesture delegates.
//!
//! A delegate is an external policy object consulted by a gesture. Its
//! main job is to decide which gestures may recognize at the same time.
//! Without a delegate a gesture never prevents another one.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::gesture::{GestureBase, GestureId};
use crate::pointer::Pointer;

/// Policy hooks consulted by gestures.
pub trait GestureDelegate: Send + Sync {
    /// Whether `gesture` and `other` may both recognize while sharing pointers.
    ///
    /// Returning `false` lets whichever of the two wins arbitration force the
    /// other one to fail.
    fn should_recognize_simultaneously(&self, gesture: &GestureBase, other: &GestureBase) -> bool;

    /// Whether `gesture` may leave `Possible` after winning arbitration.
    fn should_begin(&self, _gesture: &GestureBase) -> bool {
        true
    }

    /// Whether `gesture` may take `pointer` when it is pressed.
    fn should_receive_pointer(&self, _gesture: &GestureBase, _pointer: &Pointer) -> bool {
        true
    }
}

impl<F> GestureDelegate for F
where
    F: Fn(&GestureBase, &GestureBase) -> bool + Send + Sync,
{
    fn should_recognize_simultaneously(&self, gesture: &GestureBase, other: &GestureBase) -> bool {
        self(gesture, other)
    }
}

/// Pair-based simultaneous recognition policy.
///
/// Gestures are exclusive unless their pair has been allowed. The policy
/// can be shared between gestures and edited after they are attached.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_touch::{Gesture, GestureManager, PressGesture, SimultaneousPolicy};
///
/// let mut manager = GestureManager::new();
/// let node = manager.hierarchy_mut().create_node("button");
/// let policy = Arc::new(SimultaneousPolicy::new());
///
/// let mut first = PressGesture::new();
/// first.base_mut().set_delegate(policy.clone());
/// let first = manager.attach(node, first).unwrap();
///
/// let mut second = PressGesture::new();
/// second.base_mut().set_delegate(policy.clone());
/// let second = manager.attach(node, second).unwrap();
///
/// policy.allow_simultaneous(first, second);
/// assert!(policy.can_be_simultaneous(second, first));
/// ```
#[derive(Debug, Default)]
pub struct SimultaneousPolicy {
    allow_by_default: bool,
    /// Pairs stored in canonical order.
    pairs: RwLock<HashSet<(GestureId, GestureId)>>,
}

impl SimultaneousPolicy {
    /// Creates a policy with no allowed pairs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy that allows every pair. Calls to
    /// [`disallow_simultaneous`](Self::disallow_simultaneous) then list the
    /// exceptions.
    pub fn allow_all() -> Self {
        Self {
            allow_by_default: true,
            pairs: RwLock::new(HashSet::new()),
        }
    }

    /// Allows two gestures to be recognized simultaneously.
    pub fn allow_simultaneous(&self, a: GestureId, b: GestureId) {
        if self.allow_by_default {
            self.pairs.write().remove(&canonical(a, b));
        } else {
            self.pairs.write().insert(canonical(a, b));
        }
    }

    /// Disallows two gestures from being recognized simultaneously.
    pub fn disallow_simultaneous(&self, a: GestureId, b: GestureId) {
        if self.allow_by_default {
            self.pairs.write().insert(canonical(a, b));
        } else {
            self.pairs.write().remove(&canonical(a, b));
        }
    }

    /// Returns whether two gestures can be recognized simultaneously.
    pub fn can_be_simultaneous(&self, a: GestureId, b: GestureId) -> bool {
        if a == b {
            return true;
        }
        let listed = self.pairs.read().contains(&canonical(a, b));
        listed != self.allow_by_default
    }
}

impl GestureDelegate for SimultaneousPolicy {
    fn should_recognize_simultaneously(&self, gesture: &GestureBase, other: &GestureBase) -> bool {
        self.can_be_simultaneous(gesture.id(), other.id())
    }
}

fn canonical(a: GestureId, b: GestureId) -> (GestureId, GestureId) {
    if a <= b { (a, b) } else { (b, a) }
}

static_assertions::assert_impl_all!(SimultaneousPolicy: Send, Sync);

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn ids() -> (GestureId, GestureId, GestureId) {
        let mut map = SlotMap::<GestureId, ()>::with_key();
        (map.insert(()), map.insert(()), map.insert(()))
    }

    #[test]
    fn test_policy_pairs_are_symmetric() {
        let (a, b, c) = ids();
        let policy = SimultaneousPolicy::new();
        assert!(!policy.can_be_simultaneous(a, b));

        policy.allow_simultaneous(b, a);
        assert!(policy.can_be_simultaneous(a, b));
        assert!(policy.can_be_simultaneous(b, a));
        assert!(!policy.can_be_simultaneous(a, c));

        policy.disallow_simultaneous(a, b);
        assert!(!policy.can_be_simultaneous(a, b));
    }

    #[test]
    fn test_allow_all_with_exceptions() {
        let (a, b, c) = ids();
        let policy = SimultaneousPolicy::allow_all();
        assert!(policy.can_be_simultaneous(a, b));

        policy.disallow_simultaneous(c, a);
        assert!(!policy.can_be_simultaneous(a, c));
        assert!(policy.can_be_simultaneous(b, c));

        policy.allow_simultaneous(a, c);
        assert!(policy.can_be_simultaneous(a, c));
    }

    #[test]
    fn test_gesture_is_simultaneous_with_itself() {
        let (a, _, _) = ids();
        assert!(SimultaneousPolicy::new().can_be_simultaneous(a, a));
    }
}
