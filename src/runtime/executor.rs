//! Turn executor

use crate::llm::{CompletionRequest, LlmService};
use crate::session::ChatSession;
use crate::state_machine::{transition, Effect, Event, TransitionError, TurnState};
use crate::tts::SpeechSynthesizer;
use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};

/// What one turn produced, for the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: Option<String>,
    /// Provider error shown to the user
    pub error: Option<String>,
    /// MP3 audio for the reply
    pub audio: Option<Vec<u8>>,
    pub audio_error: Option<String>,
    /// Completion requests beyond the first
    pub retries: u32,
}

/// Runs turns against any completion and speech implementation
pub struct TurnRunner<L, S>
where
    L: LlmService,
    S: SpeechSynthesizer,
{
    llm: L,
    speech: S,
}

impl<L, S> TurnRunner<L, S>
where
    L: LlmService,
    S: SpeechSynthesizer,
{
    pub fn new(llm: L, speech: S) -> Self {
        Self { llm, speech }
    }

    /// Run one user submission to completion
    ///
    /// Events produced by effects are fed back into the state machine until
    /// the turn settles in `Done` or `Failed`. A rejected submission leaves
    /// the session untouched. If the returned future is dropped mid-turn the
    /// session goes back to `Idle`, so the next submission starts a new turn.
    pub async fn run_turn(
        &self,
        session: &mut ChatSession,
        text: &str,
    ) -> Result<TurnOutcome, TransitionError> {
        let mut outcome = TurnOutcome::default();
        let mut requests: u32 = 0;
        let mut queue = VecDeque::from([Event::UserSubmit {
            text: text.to_string(),
        }]);
        let mut session = TurnGuard {
            session,
            started: false,
        };

        while let Some(event) = queue.pop_front() {
            let result = match transition(&session.state, event) {
                Ok(result) => result,
                Err(e) => {
                    if session.started {
                        tracing::error!(error = %e, state = ?session.state, "Turn aborted");
                        session.reset();
                    }
                    return Err(e);
                }
            };
            session.started = true;
            session.state = result.new_state;

            for effect in result.effects {
                if matches!(effect, Effect::RequestCompletion) {
                    requests += 1;
                }
                let next = self.execute_effect(&mut session, effect, &mut outcome).await;
                if let Some(event) = next {
                    queue.push_back(event);
                }
            }
        }

        outcome.retries = requests.saturating_sub(1);
        tracing::info!(
            state = ?session.state,
            retries = outcome.retries,
            messages = session.conversation.messages().len(),
            "Turn finished"
        );
        Ok(outcome)
    }

    async fn execute_effect(
        &self,
        session: &mut ChatSession,
        effect: Effect,
        outcome: &mut TurnOutcome,
    ) -> Option<Event> {
        match effect {
            Effect::RecordUserTurn { text } => {
                let preamble = session.preamble();
                session.conversation.append_user_turn(&text, &preamble);
                Some(Event::TurnRecorded)
            }

            Effect::RequestCompletion => {
                let request = CompletionRequest {
                    model: session.settings.model,
                    temperature: session.settings.temperature,
                    messages: session.conversation.messages().to_vec(),
                };
                tracing::debug!(
                    attempt = session.state.attempt(),
                    messages = request.messages.len(),
                    "Requesting completion"
                );
                let event = match self.llm.complete(&request).await {
                    Ok(response) => match response.reply_text() {
                        Ok(reply) => Event::CompletionSucceeded {
                            reply: reply.to_string(),
                        },
                        Err(error) => Event::CompletionFailed { error },
                    },
                    Err(error) => Event::CompletionFailed { error },
                };
                Some(event)
            }

            Effect::RecordReply { text } => {
                session.conversation.record_reply(&text);
                outcome.reply = Some(text);
                None
            }

            Effect::DropOldestExchange => {
                let has_content = session.conversation.drop_oldest_exchange();
                tracing::warn!(
                    remaining = session.conversation.messages().len(),
                    has_content,
                    "Context length exceeded, dropped oldest message"
                );
                Some(Event::ExchangeDropped { has_content })
            }

            Effect::SynthesizeSpeech { text } => {
                let lang = session.settings.locale.code();
                match self.speech.synthesize(&text, lang).await {
                    Ok(audio) => outcome.audio = Some(audio),
                    Err(e) => {
                        tracing::warn!(
                            kind = ?e.kind,
                            error = %e.message,
                            lang,
                            "Speech synthesis failed"
                        );
                        outcome.audio_error = Some(e.message);
                    }
                }
                None
            }

            Effect::SurfaceError { message } => {
                outcome.error = Some(message);
                None
            }

            Effect::FinishTurn => {
                session.conversation.clear_pending();
                None
            }
        }
    }
}

/// Session borrowed for one turn; a turn still in flight when this drops was cancelled
struct TurnGuard<'a> {
    session: &'a mut ChatSession,
    started: bool,
}

impl TurnGuard<'_> {
    fn reset(&mut self) {
        self.session.state = TurnState::Idle;
        self.session.conversation.clear_pending();
    }
}

impl Deref for TurnGuard<'_> {
    type Target = ChatSession;

    fn deref(&self) -> &ChatSession {
        self.session
    }
}

impl DerefMut for TurnGuard<'_> {
    fn deref_mut(&mut self) -> &mut ChatSession {
        self.session
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if self.started && self.session.state.is_busy() {
            tracing::warn!(state = ?self.session.state, "Turn cancelled");
            self.reset();
        }
    }
}
