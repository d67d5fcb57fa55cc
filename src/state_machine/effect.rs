//! Effects produced by state transitions

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append the user message (seeding the preamble on an empty log)
    RecordUserTurn { text: String },

    /// Send the current log to the completion provider
    RequestCompletion,

    /// Append the assistant message and update the display lists
    RecordReply { text: String },

    /// Drop the oldest message after the preamble
    DropOldestExchange,

    /// Turn the reply into audio
    SynthesizeSpeech { text: String },

    /// Show an error on the page
    SurfaceError { message: String },

    /// Forget the pending input
    FinishTurn,
}
