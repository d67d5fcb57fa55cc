//! Turn state types

use crate::llm::LlmErrorKind;
use serde::Serialize;

/// Where the current turn is
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnState {
    /// Waiting for user text
    #[default]
    Idle,

    /// User text accepted, turn being recorded
    Submitted { text: String },

    /// Completion request in flight
    Completing { attempt: u32 },

    /// Provider reported context overflow, oldest message being dropped
    Overflow { attempt: u32 },

    /// Reply received (terminal for the turn)
    Done { reply: String },

    /// Turn abandoned (terminal for the turn)
    Failed { reason: FailReason },
}

/// Why a turn was abandoned
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailReason {
    /// Non-recoverable provider error, shown to the user
    Provider { message: String, kind: LlmErrorKind },
    /// History truncated down to the preamble; nothing left to send
    NothingToSend,
}

impl TurnState {
    /// A turn is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            TurnState::Submitted { .. } | TurnState::Completing { .. } | TurnState::Overflow { .. }
        )
    }

    /// Turn finished, either way
    #[allow(dead_code)] // Used by turn simulations in tests
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Done { .. } | TurnState::Failed { .. })
    }

    /// Completion attempts made so far in this turn
    pub fn attempt(&self) -> u32 {
        match self {
            TurnState::Completing { attempt } | TurnState::Overflow { attempt } => *attempt,
            _ => 0,
        }
    }
}
