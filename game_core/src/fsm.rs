//! Engine lifecycle state machine
//!
//! `idle -> playing <-> paused`, `playing -> ended -> (reset) -> idle`, and
//! `disposed` as a terminal sink reachable from everywhere.

use serde::Serialize;

/// Lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Playing,
    Paused,
    Ended,
    Disposed,
}

/// Actions that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineAction {
    Start,
    Pause,
    GameOver,
    Reset,
    Dispose,
}

/// Result of a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionResult {
    pub success: bool,
    pub from_state: EngineState,
    pub to_state: EngineState,
    pub action: EngineAction,
}

/// Engine Finite State Machine
#[derive(Debug, Clone)]
pub struct EngineFsm {
    state: EngineState,
}

impl EngineFsm {
    pub fn new() -> Self {
        Self {
            state: EngineState::Idle,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Check if a transition is valid
    pub fn can_transition(&self, action: EngineAction) -> bool {
        self.next_state(action).is_some()
    }

    /// Attempt a transition
    pub fn transition(&mut self, action: EngineAction) -> TransitionResult {
        let from_state = self.state;

        if let Some(next_state) = self.next_state(action) {
            self.state = next_state;
            TransitionResult {
                success: true,
                from_state,
                to_state: next_state,
                action,
            }
        } else {
            TransitionResult {
                success: false,
                from_state,
                to_state: from_state,
                action,
            }
        }
    }

    fn next_state(&self, action: EngineAction) -> Option<EngineState> {
        use EngineAction as A;
        use EngineState as S;

        match (self.state, action) {
            (S::Disposed, _) => None,
            (_, A::Dispose) => Some(S::Disposed),

            (S::Idle | S::Paused, A::Start) => Some(S::Playing),
            (S::Playing, A::Pause) => Some(S::Paused),
            (S::Playing, A::GameOver) => Some(S::Ended),

            // Reset only leaves Ended; elsewhere it clears scores in place.
            (S::Ended, A::Reset) => Some(S::Idle),
            (state, A::Reset) => Some(state),

            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == EngineState::Playing
    }

    pub fn is_ended(&self) -> bool {
        self.state == EngineState::Ended
    }

    pub fn is_disposed(&self) -> bool {
        self.state == EngineState::Disposed
    }
}

impl Default for EngineFsm {
    fn default() -> Self {
        Self::new()
    }
}
