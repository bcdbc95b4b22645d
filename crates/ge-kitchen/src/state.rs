//! Coordinator lifecycle state machine
//!
//! ```text
//! Unstarted → Connecting → Initializing → Ready
//! ```
//!
//! Every transition is one-way. A coordinator that needs to reconnect from
//! scratch is replaced by a new instance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of one coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    /// Constructed, no client yet
    #[default]
    Unstarted,
    /// Client created, session coming up
    Connecting,
    /// Session established, waiting for appliances to sync
    Initializing,
    /// Roster received and every appliance initialized
    Ready,
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid coordinator transition from {from:?} to {to:?}: {reason}")]
pub struct InvalidTransition {
    pub from: CoordinatorState,
    pub to: CoordinatorState,
    pub reason: &'static str,
}

impl CoordinatorState {
    /// Attempt a transition to a new state.
    pub fn try_transition(self, to: CoordinatorState) -> Result<CoordinatorState, InvalidTransition> {
        use CoordinatorState::*;

        let valid = matches!(
            (self, to),
            (Unstarted, Connecting) | (Connecting, Initializing) | (Initializing, Ready)
        );

        if valid {
            Ok(to)
        } else {
            Err(InvalidTransition {
                from: self,
                to,
                reason: Self::transition_error_reason(self, to),
            })
        }
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition_to(self, to: CoordinatorState) -> bool {
        self.try_transition(to).is_ok()
    }

    pub fn is_ready(self) -> bool {
        self == CoordinatorState::Ready
    }

    fn transition_error_reason(from: CoordinatorState, to: CoordinatorState) -> &'static str {
        use CoordinatorState::*;

        match (from, to) {
            (Ready, _) => "Ready is terminal - construct a new coordinator to reconnect",
            (_, Unstarted) => "Cannot return to Unstarted",
            (Unstarted, Initializing) | (Unstarted, Ready) => {
                "Client not started - must go through Connecting"
            }
            (Connecting, Ready) => "Session not established - must go through Initializing",
            (a, b) if a == b => "Already in this state",
            _ => "Invalid state transition",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CoordinatorState::*;

    #[test]
    fn test_forward_path() {
        let state = Unstarted;
        let state = state.try_transition(Connecting).unwrap();
        let state = state.try_transition(Initializing).unwrap();
        let state = state.try_transition(Ready).unwrap();
        assert!(state.is_ready());
    }

    #[test]
    fn test_cannot_skip_states() {
        assert!(!Unstarted.can_transition_to(Initializing));
        assert!(!Unstarted.can_transition_to(Ready));

        let err = Connecting.try_transition(Ready).unwrap_err();
        assert_eq!(err.from, Connecting);
        assert_eq!(err.to, Ready);
        assert!(err.reason.contains("Initializing"));
    }

    #[test]
    fn test_ready_is_terminal() {
        for to in [Unstarted, Connecting, Initializing, Ready] {
            let err = Ready.try_transition(to).unwrap_err();
            assert!(err.reason.contains("terminal"));
        }
    }

    #[test]
    fn test_no_way_back() {
        assert!(!Connecting.can_transition_to(Unstarted));
        assert!(!Initializing.can_transition_to(Connecting));
        assert!(!Initializing.can_transition_to(Unstarted));
    }

    #[test]
    fn test_error_display() {
        let err = Unstarted.try_transition(Ready).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unstarted"));
        assert!(msg.contains("Ready"));
    }
}
