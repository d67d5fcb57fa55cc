//! Turn state machine
//!
//! Pure transitions in the Elm style: `(state, event) -> (state, effects)`.
//! The runtime executes the effects and feeds the events they produce back in.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{FailReason, TurnState};
pub use transition::{transition, TransitionError};
