//! Runtime for executing chat turns
//!
//! The executor drives the pure turn state machine, performing each effect
//! against the session and the two outbound services.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::{TurnOutcome, TurnRunner};

use crate::llm::LlmService;
use crate::tts::SpeechSynthesizer;
use std::sync::Arc;

/// Type alias for the runner wired to real services
pub type ProductionRunner = TurnRunner<Arc<dyn LlmService>, Arc<dyn SpeechSynthesizer>>;
