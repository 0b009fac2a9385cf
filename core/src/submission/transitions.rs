//! Submission phase transition rules

use super::types::SubmissionPhase;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: SubmissionPhase,
        to: SubmissionPhase,
    },
    #[error("Terminal state {state:?} can only return to Idle")]
    FromTerminalState { state: SubmissionPhase },
}

pub struct SubmissionTransition;

impl SubmissionTransition {
    pub fn validate(from: SubmissionPhase, to: SubmissionPhase) -> Result<(), TransitionError> {
        use SubmissionPhase::*;

        if from.is_terminal() && to != Idle {
            return Err(TransitionError::FromTerminalState { state: from });
        }

        let is_valid = matches!(
            (from, to),
            (Idle, Dispatching)
                | (Dispatching, Broadcast)
                | (Dispatching, Failed)
                | (Broadcast, Confirmed)
                | (Broadcast, Failed)
                | (Confirmed, Idle)
                | (Failed, Idle)
        );

        if is_valid {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition { from, to })
        }
    }

    pub fn phase_description(phase: SubmissionPhase) -> &'static str {
        match phase {
            SubmissionPhase::Idle => "Ready",
            SubmissionPhase::Dispatching => "Sending...",
            SubmissionPhase::Broadcast => "Mining...",
            SubmissionPhase::Confirmed => "Mined",
            SubmissionPhase::Failed => "Failed",
        }
    }
}
