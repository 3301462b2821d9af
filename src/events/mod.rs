//! Events raised by a session and the channel that delivers them.

mod bus;
mod event;

pub use bus::{EventBus, SubscriptionId};
pub use event::GameEvent;
