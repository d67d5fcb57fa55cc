//! Pure state transition function

use super::{Effect, Event, FailReason, TurnState};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A reply is still being generated, please wait")]
    Busy,
    #[error("Nothing to send")]
    EmptyInput,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs and performs
/// no I/O; conversation mutations happen only through the returned effects.
pub fn transition(state: &TurnState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User submission
        // ============================================================
        (
            TurnState::Idle | TurnState::Done { .. } | TurnState::Failed { .. },
            Event::UserSubmit { text },
        ) => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyInput);
            }
            Ok(TransitionResult::new(TurnState::Submitted { text: text.clone() })
                .with_effect(Effect::RecordUserTurn { text }))
        }

        (state, Event::UserSubmit { .. }) if state.is_busy() => Err(TransitionError::Busy),

        (TurnState::Submitted { .. }, Event::TurnRecorded) => {
            Ok(TransitionResult::new(TurnState::Completing { attempt: 1 })
                .with_effect(Effect::RequestCompletion))
        }

        // ============================================================
        // Completion outcome
        // ============================================================
        (TurnState::Completing { .. }, Event::CompletionSucceeded { reply }) => {
            let mut result = TransitionResult::new(TurnState::Done {
                reply: reply.clone(),
            })
            .with_effect(Effect::RecordReply {
                text: reply.clone(),
            })
            .with_effect(Effect::FinishTurn);
            if !reply.is_empty() {
                result = result.with_effect(Effect::SynthesizeSpeech { text: reply });
            }
            Ok(result)
        }

        // Context overflow -> drop the oldest message and retry
        (TurnState::Completing { attempt }, Event::CompletionFailed { error })
            if error.kind.is_context_overflow() =>
        {
            Ok(TransitionResult::new(TurnState::Overflow { attempt: *attempt })
                .with_effect(Effect::DropOldestExchange))
        }

        (TurnState::Completing { .. }, Event::CompletionFailed { error }) => {
            Ok(TransitionResult::new(TurnState::Failed {
                reason: FailReason::Provider {
                    message: error.message.clone(),
                    kind: error.kind,
                },
            })
            .with_effect(Effect::SurfaceError {
                message: error.message,
            })
            .with_effect(Effect::FinishTurn))
        }

        // ============================================================
        // Truncation
        // ============================================================
        (TurnState::Overflow { attempt }, Event::ExchangeDropped { has_content: true }) => {
            Ok(TransitionResult::new(TurnState::Completing {
                attempt: attempt + 1,
            })
            .with_effect(Effect::RequestCompletion))
        }

        // Only the preamble is left: give up without a request or a message
        (TurnState::Overflow { .. }, Event::ExchangeDropped { has_content: false }) => {
            Ok(TransitionResult::new(TurnState::Failed {
                reason: FailReason::NothingToSend,
            })
            .with_effect(Effect::FinishTurn))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}
