use std::fmt;

use log::debug;

use crate::backend::BackendId;

/// Lifecycle of one backend's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connecting,
    Running,
    Summarizing,
    Done,
    Failed,
}

impl RunState {
    pub fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Running)
                | (Connecting, Failed)
                | (Running, Summarizing)
                | (Summarizing, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks the state machine of a single backend run.
pub struct RunTracker {
    backend: BackendId,
    state: RunState,
}

impl RunTracker {
    pub fn new(backend: BackendId) -> Self {
        Self {
            backend,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal run transition {} -> {}",
            self.state,
            next
        );
        debug!("{}: {} -> {}", self.backend, self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut run = RunTracker::new(BackendId::from("redis"));
        for next in [
            RunState::Connecting,
            RunState::Running,
            RunState::Summarizing,
            RunState::Done,
        ] {
            run.advance(next);
        }
        assert!(run.state().is_terminal());
    }

    #[test]
    fn test_failure_only_from_connecting() {
        assert!(RunState::Connecting.can_advance_to(RunState::Failed));
        assert!(!RunState::Running.can_advance_to(RunState::Failed));
        assert!(!RunState::Idle.can_advance_to(RunState::Running));
        assert!(!RunState::Done.can_advance_to(RunState::Connecting));
    }

    #[test]
    #[should_panic(expected = "illegal run transition")]
    #[cfg(debug_assertions)]
    fn test_illegal_transition_panics_in_debug() {
        let mut run = RunTracker::new(BackendId::from("mongodb"));
        run.advance(RunState::Done);
    }
}
