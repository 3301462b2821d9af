//! Effect system for card abilities.
//!
//! - `Effect`: the closed set of effects a theme can author
//! - `Target`: who an effect applies to, relative to the acting player
//! - `EffectResolver`: applies effects to player state, clamping values
//!
//! Shared pool claims are effects too, but the resolver hands them off:
//! see [`crate::resources`].

mod effect;
mod resolver;
mod targeting;

pub use effect::Effect;
pub use resolver::{ChangeKey, EffectOutcome, EffectResolver, ResolverContext, ValueChange};
pub use targeting::{Target, Targets};
