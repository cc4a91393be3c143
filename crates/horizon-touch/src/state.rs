//! Gesture recognition states.
//!
//! Every gesture runs one [`StateMachine`]. Recognition logic *requests*
//! transitions; requests are validated immediately against the legal edge
//! table and queued. The arbitration engine decides when a queued request
//! is committed, because leaving `Possible` for `Began` or `Recognized` may
//! be refused if a competing gesture wins.
//!
//! ```text
//! Possible -> Began | Recognized | Failed | Cancelled
//! Began    -> Changed | Recognized | Failed | Cancelled
//! Changed  -> Changed | Recognized | Ended | Cancelled
//! ```
//!
//! `Recognized`, `Failed`, `Ended` and `Cancelled` are terminal for the
//! current attempt. Only a reset returns the machine to `Possible`.

use std::fmt;

/// Recognition state of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureState {
    /// Waiting for input that could start the gesture.
    #[default]
    Possible,
    /// A continuous gesture has started.
    Began,
    /// A continuous gesture has updated.
    Changed,
    /// A discrete gesture completed, or a continuous one finished successfully.
    Recognized,
    /// The gesture did not match the input.
    Failed,
    /// A continuous gesture ended.
    Ended,
    /// The gesture was aborted.
    Cancelled,
}

impl GestureState {
    /// Whether the state ends the current attempt.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Recognized | Self::Failed | Self::Ended | Self::Cancelled
        )
    }

    /// Whether a continuous gesture is in progress.
    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::Began | Self::Changed)
    }

    /// Whether `next` is a legal edge from this state.
    pub fn can_transition_to(self, next: GestureState) -> bool {
        use GestureState::*;
        matches!(
            (self, next),
            (Possible, Began | Recognized | Failed | Cancelled)
                | (Began, Changed | Recognized | Failed | Cancelled)
                | (Changed, Changed | Recognized | Ended | Cancelled)
        )
    }

    /// The terminal state a gesture in this state is forced into when it is
    /// aborted from outside its own logic.
    ///
    /// `Changed` cannot fail, so it is cancelled instead. Terminal states
    /// have no forced successor.
    pub fn forced_failure(self) -> Option<GestureState> {
        match self {
            Self::Possible | Self::Began => Some(Self::Failed),
            Self::Changed => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// The terminal state a gesture in this state is finalized into when its
    /// last pointer leaves.
    pub fn abandoned(self) -> Option<GestureState> {
        match self {
            Self::Possible => Some(Self::Failed),
            Self::Began | Self::Changed => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Possible => "Possible",
            Self::Began => "Began",
            Self::Changed => "Changed",
            Self::Recognized => "Recognized",
            Self::Failed => "Failed",
            Self::Ended => "Ended",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

/// A transition request that violates the edge table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal gesture state transition {from} -> {to}")]
pub struct IllegalTransition {
    /// State the request was validated against.
    pub from: GestureState,
    /// Requested state.
    pub to: GestureState,
}

/// Committed state plus the queue of validated, not yet committed requests.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    state: GestureState,
    pending: Vec<GestureState>,
}

impl StateMachine {
    /// A machine in `Possible` with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed state.
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// The state the machine will be in once all pending requests commit.
    pub fn effective_state(&self) -> GestureState {
        self.pending.last().copied().unwrap_or(self.state)
    }

    /// Queued requests, oldest first.
    pub fn pending(&self) -> &[GestureState] {
        &self.pending
    }

    /// Whether any request is queued.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Whether the queued requests must pass arbitration before committing.
    ///
    /// That is the case when the machine is still `Possible` and the first
    /// queued request starts or recognizes the gesture.
    pub fn needs_arbitration(&self) -> bool {
        self.state == GestureState::Possible
            && matches!(
                self.pending.first(),
                Some(GestureState::Began | GestureState::Recognized)
            )
    }

    /// Queue a request, validated against the effective state.
    pub fn request(&mut self, next: GestureState) -> Result<(), IllegalTransition> {
        let from = self.effective_state();
        if !from.can_transition_to(next) {
            return Err(IllegalTransition { from, to: next });
        }
        self.pending.push(next);
        Ok(())
    }

    /// Remove and return all queued requests.
    pub fn take_pending(&mut self) -> Vec<GestureState> {
        std::mem::take(&mut self.pending)
    }

    /// Drop all queued requests.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Commit a transition, validated against the committed state.
    ///
    /// Returns the previous state.
    pub fn commit(&mut self, next: GestureState) -> Result<GestureState, IllegalTransition> {
        let from = self.state;
        if !from.can_transition_to(next) {
            return Err(IllegalTransition { from, to: next });
        }
        self.state = next;
        Ok(from)
    }

    /// Return to `Possible` and drop all queued requests.
    pub fn reset(&mut self) {
        self.state = GestureState::Possible;
        self.pending.clear();
    }
}

/// How a press or release moved the assigned pointer count relative to the
/// gesture's `[min_pointers, max_pointers]` window.
///
/// A `min_pointers` of 0 behaves like 1 and a `max_pointers` of 0 means no
/// upper limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerCountState {
    /// The count stayed inside the window.
    #[default]
    InRange,
    /// The count is and was below the minimum.
    TooFew,
    /// The count is and was above the maximum.
    TooMany,
    /// The count crossed the minimum (up on press, down on release).
    PassedMinThreshold,
    /// The count crossed the maximum (up on press, down on release).
    PassedMaxThreshold,
    /// Both thresholds were crossed in one step.
    PassedMinMaxThreshold,
}

impl PointerCountState {
    /// Classify a press that took the count from `previous` to `current`.
    pub fn after_press(previous: usize, current: usize, min: u32, max: u32) -> Self {
        let min = min.max(1) as usize;
        let mut state = Self::InRange;
        if previous < min {
            state = if current >= min {
                Self::PassedMinThreshold
            } else {
                Self::TooFew
            };
        }
        if max > 0 {
            let max = max as usize;
            if previous <= max {
                if current > max {
                    state = Self::crossed_max(state);
                }
            } else {
                state = Self::TooMany;
            }
        }
        state
    }

    /// Classify a release that took the count from `previous` to `current`.
    pub fn after_release(previous: usize, current: usize, min: u32, max: u32) -> Self {
        let min = min.max(1) as usize;
        let mut state = Self::InRange;
        if previous >= min {
            if current < min {
                state = Self::PassedMinThreshold;
            }
        } else {
            state = Self::TooFew;
        }
        if max > 0 {
            let max = max as usize;
            if previous > max {
                state = if current <= max {
                    Self::crossed_max(state)
                } else {
                    Self::TooMany
                };
            }
        }
        state
    }

    fn crossed_max(state: Self) -> Self {
        if state == Self::PassedMinThreshold {
            Self::PassedMinMaxThreshold
        } else {
            Self::PassedMaxThreshold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GestureState::*;
    use super::*;

    const ALL: [GestureState; 7] = [
        Possible, Began, Changed, Recognized, Failed, Ended, Cancelled,
    ];

    #[test]
    fn test_terminal_states_have_no_edges() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_edge_table() {
        assert!(Possible.can_transition_to(Recognized));
        assert!(Possible.can_transition_to(Cancelled));
        assert!(!Possible.can_transition_to(Changed));
        assert!(!Possible.can_transition_to(Ended));
        assert!(Began.can_transition_to(Failed));
        assert!(!Began.can_transition_to(Ended));
        assert!(Changed.can_transition_to(Changed));
        assert!(!Changed.can_transition_to(Failed));
        assert!(!Possible.can_transition_to(Possible));
    }

    #[test]
    fn test_request_validates_against_effective_state() {
        let mut machine = StateMachine::new();
        machine.request(Began).unwrap();
        machine.request(Changed).unwrap();
        assert_eq!(machine.state(), Possible);
        assert_eq!(machine.effective_state(), Changed);
        assert!(machine.needs_arbitration());

        let err = machine.request(Failed).unwrap_err();
        assert_eq!(err, IllegalTransition { from: Changed, to: Failed });
        assert_eq!(machine.pending(), &[Began, Changed]);
    }

    #[test]
    fn test_commit_and_reset() {
        let mut machine = StateMachine::new();
        machine.request(Recognized).unwrap();
        for next in machine.take_pending() {
            machine.commit(next).unwrap();
        }
        assert_eq!(machine.state(), Recognized);
        assert!(machine.commit(Possible).is_err());
        assert!(machine.request(Began).is_err());

        machine.reset();
        assert_eq!(machine.state(), Possible);
        assert!(!machine.has_pending());
    }

    #[test]
    fn test_failure_requests_skip_arbitration() {
        let mut machine = StateMachine::new();
        machine.request(Failed).unwrap();
        assert!(!machine.needs_arbitration());
    }

    #[test]
    fn test_forced_targets() {
        assert_eq!(Possible.forced_failure(), Some(Failed));
        assert_eq!(Began.forced_failure(), Some(Failed));
        assert_eq!(Changed.forced_failure(), Some(Cancelled));
        assert_eq!(Recognized.forced_failure(), None);
        assert_eq!(Possible.abandoned(), Some(Failed));
        assert_eq!(Began.abandoned(), Some(Cancelled));
    }

    #[test]
    fn test_pointer_count_press() {
        use PointerCountState as S;
        // No limits: the first pointer passes the implicit minimum of one.
        assert_eq!(S::after_press(0, 1, 0, 0), S::PassedMinThreshold);
        assert_eq!(S::after_press(1, 2, 0, 0), S::InRange);
        // Two at once with min = max = 1.
        assert_eq!(S::after_press(0, 2, 1, 1), S::PassedMinMaxThreshold);
        assert_eq!(S::after_press(0, 1, 2, 0), S::TooFew);
        assert_eq!(S::after_press(1, 2, 1, 1), S::PassedMaxThreshold);
        assert_eq!(S::after_press(2, 3, 1, 1), S::TooMany);
    }

    #[test]
    fn test_pointer_count_release() {
        use PointerCountState as S;
        assert_eq!(S::after_release(1, 0, 0, 0), S::PassedMinThreshold);
        assert_eq!(S::after_release(3, 2, 2, 0), S::InRange);
        assert_eq!(S::after_release(1, 0, 2, 0), S::TooFew);
        assert_eq!(S::after_release(2, 0, 1, 1), S::PassedMinMaxThreshold);
        assert_eq!(S::after_release(3, 2, 1, 1), S::TooMany);
        assert_eq!(S::after_release(2, 1, 1, 1), S::PassedMaxThreshold);
    }
}
