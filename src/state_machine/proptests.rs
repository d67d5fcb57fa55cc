//! Property-based tests for the turn state machine
//!
//! A small pure simulator applies effects to a `ConversationState` with
//! scripted provider outcomes, so whole turns can be checked without I/O.

use super::*;
use crate::llm::{ChatMessage, LlmError, LlmErrorKind};
use crate::session::ConversationState;
use proptest::prelude::*;
use std::collections::VecDeque;

const PREAMBLE: &str = "You are a kind assistant. Answer concisely";

// ============================================================================
// Simulator
// ============================================================================

#[derive(Debug, Clone)]
enum Outcome {
    Reply(String),
    Overflow,
    Error(LlmErrorKind),
}

#[derive(Default)]
struct Sim {
    conv: ConversationState,
    state: TurnState,
    /// Log length at each completion request
    requests: Vec<usize>,
    surfaced: Vec<String>,
    spoken: Vec<String>,
}

impl Sim {
    fn run_turn(
        &mut self,
        text: &str,
        outcomes: &mut dyn Iterator<Item = Outcome>,
    ) -> Result<(), TransitionError> {
        let mut queue = VecDeque::from([Event::UserSubmit {
            text: text.to_string(),
        }]);

        while let Some(event) = queue.pop_front() {
            let result = transition(&self.state, event)?;
            self.state = result.new_state;
            for effect in result.effects {
                match effect {
                    Effect::RecordUserTurn { text } => {
                        self.conv.append_user_turn(&text, PREAMBLE);
                        queue.push_back(Event::TurnRecorded);
                    }
                    Effect::RequestCompletion => {
                        self.requests.push(self.conv.messages().len());
                        let event = match outcomes.next().unwrap_or(Outcome::Reply("ok".into())) {
                            Outcome::Reply(reply) => Event::CompletionSucceeded { reply },
                            Outcome::Overflow => Event::CompletionFailed {
                                error: LlmError::context_length_exceeded("too long"),
                            },
                            Outcome::Error(kind) => Event::CompletionFailed {
                                error: LlmError::new(kind, "provider said no"),
                            },
                        };
                        queue.push_back(event);
                    }
                    Effect::RecordReply { text } => {
                        self.conv.record_reply(&text);
                    }
                    Effect::DropOldestExchange => {
                        let has_content = self.conv.drop_oldest_exchange();
                        queue.push_back(Event::ExchangeDropped { has_content });
                    }
                    Effect::SynthesizeSpeech { text } => self.spoken.push(text),
                    Effect::SurfaceError { message } => self.surfaced.push(message),
                    Effect::FinishTurn => self.conv.clear_pending(),
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::ServerError),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::InvalidRequest),
        Just(LlmErrorKind::MalformedResponse),
        Just(LlmErrorKind::Unknown),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        3 => "[a-z]{0,6}".prop_map(Outcome::Reply),
        2 => Just(Outcome::Overflow),
        1 => arb_error_kind().prop_map(Outcome::Error),
    ]
}

fn arb_busy_state() -> impl Strategy<Value = TurnState> {
    prop_oneof![
        "[a-z]{1,10}".prop_map(|text| TurnState::Submitted { text }),
        (1u32..10).prop_map(|attempt| TurnState::Completing { attempt }),
        (1u32..10).prop_map(|attempt| TurnState::Overflow { attempt }),
    ]
}

fn arb_prompt() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,8}( [a-z]{1,8}){0,3}"
}

/// A session that has already completed `turns` exchanges
fn sim_with_turns(turns: usize) -> Sim {
    let mut sim = Sim::default();
    let mut replies = (0..turns).map(|i| Outcome::Reply(format!("answer {i}")));
    for i in 0..turns {
        sim.run_turn(&format!("question {i}"), &mut replies).unwrap();
    }
    sim
}

proptest! {
    // Display lists stay paired and each turn ends in a terminal state
    #[test]
    fn prop_display_lists_stay_paired(
        turns in proptest::collection::vec(
            (arb_prompt(), proptest::collection::vec(arb_outcome(), 1..6)),
            1..8,
        )
    ) {
        let mut sim = Sim::default();
        for (prompt, outcomes) in turns {
            sim.run_turn(&prompt, &mut outcomes.into_iter()).unwrap();
            prop_assert_eq!(sim.conv.past().len(), sim.conv.generated().len());
            prop_assert!(sim.state.is_terminal(), "turn left in {:?}", sim.state);
            prop_assert_eq!(sim.conv.pending_input(), "");
        }
    }

    // The system preamble is never truncated away
    #[test]
    fn prop_preamble_survives(
        turns in proptest::collection::vec(
            (arb_prompt(), proptest::collection::vec(arb_outcome(), 1..6)),
            1..8,
        )
    ) {
        let mut sim = Sim::default();
        for (prompt, outcomes) in turns {
            sim.run_turn(&prompt, &mut outcomes.into_iter()).unwrap();
            prop_assert_eq!(&sim.conv.messages()[0], &ChatMessage::system(PREAMBLE));
        }
    }

    // Sustained overflow shrinks the log on every attempt and stops at the preamble
    #[test]
    fn prop_sustained_overflow_terminates(prior_turns in 0usize..6, prompt in arb_prompt()) {
        let mut sim = sim_with_turns(prior_turns);
        let before = sim.requests.len();

        sim.run_turn(&prompt, &mut std::iter::repeat(Outcome::Overflow)).unwrap();

        let sent = &sim.requests[before..];
        let log_len = 2 * prior_turns + 2;
        prop_assert_eq!(sent.len(), log_len - 1);
        prop_assert_eq!(sent[0], log_len);
        for pair in sent.windows(2) {
            prop_assert_eq!(pair[1] + 1, pair[0]);
        }
        prop_assert_eq!(sim.conv.messages().len(), 1);
        prop_assert_eq!(
            &sim.state,
            &TurnState::Failed { reason: FailReason::NothingToSend }
        );
        prop_assert!(sim.surfaced.is_empty());
    }

    // Overflow followed by success retries exactly as often as it overflowed
    #[test]
    fn prop_overflow_then_success(prior_turns in 2usize..6, overflows in 1usize..3) {
        let mut sim = sim_with_turns(prior_turns);
        let before = sim.requests.len();
        let mut outcomes = std::iter::repeat(Outcome::Overflow)
            .take(overflows)
            .chain(std::iter::once(Outcome::Reply("fine".into())));

        sim.run_turn("next", &mut outcomes).unwrap();

        prop_assert_eq!(sim.requests.len() - before, overflows + 1);
        prop_assert_eq!(sim.state.clone(), TurnState::Done { reply: "fine".into() });
        prop_assert_eq!(sim.conv.generated().last().map(String::as_str), Some("fine"));
        prop_assert_eq!(sim.conv.past().last().map(String::as_str), Some("next"));
    }

    // Any other provider error is surfaced once and never retried
    #[test]
    fn prop_other_errors_not_retried(prior_turns in 0usize..4, kind in arb_error_kind()) {
        let mut sim = sim_with_turns(prior_turns);
        let before = sim.requests.len();
        let log_before = sim.conv.messages().len();

        sim.run_turn("hello", &mut std::iter::once(Outcome::Error(kind))).unwrap();

        prop_assert_eq!(sim.requests.len() - before, 1);
        prop_assert_eq!(sim.surfaced.len(), 1);
        prop_assert_eq!(sim.conv.generated().len(), prior_turns);
        // User message stays in the log
        prop_assert_eq!(sim.conv.messages().len(), log_before.max(1) + 1);
    }

    // Repeating the same reply never adds a second display entry
    #[test]
    fn prop_repeated_reply_shown_once(reply in "[a-z]{1,10}", repeats in 2usize..5) {
        let mut sim = Sim::default();
        for i in 0..repeats {
            sim.run_turn(
                &format!("ask {i}"),
                &mut std::iter::once(Outcome::Reply(reply.clone())),
            )
            .unwrap();
        }
        prop_assert_eq!(sim.conv.generated(), &[reply.clone()][..]);
        prop_assert_eq!(sim.conv.past(), &["ask 0".to_string()][..]);
        // Each turn still speaks its reply
        prop_assert_eq!(sim.spoken.len(), repeats);
    }

    // Busy states reject new submissions
    #[test]
    fn prop_busy_rejects_submissions(state in arb_busy_state(), text in arb_prompt()) {
        let result = transition(&state, Event::UserSubmit { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::Busy);
    }

    // Blank input never starts a turn
    #[test]
    fn prop_blank_input_rejected(text in "[ \t\n]{0,5}") {
        let mut sim = sim_with_turns(1);
        let before = sim.conv.clone();
        let result = sim.run_turn(&text, &mut std::iter::empty());
        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyInput);
        prop_assert_eq!(sim.conv, before);
    }
}
