//! Core chat session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Toast, ToastVariant};
pub use event::Event;
pub use state::{ChatState, SessionContext};
pub use transition::{transition, TransitionError};
