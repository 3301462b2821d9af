//! Game rules: the turn/phase state machine, win conditions, and the
//! session that ties every component together.
//!
//! `GameSession` is the host's entry point. It owns the session state,
//! routes each host action to the card engine or the arbiter, surfaces
//! combo hints, checks win conditions, and publishes events.

pub mod phase;
pub mod session;
pub mod win;

pub use phase::Phase;
pub use session::{GameSession, StepResult};
pub use win::{evaluate, Comparison, ConditionKind, EndReason, Outcome, WinCondition};
