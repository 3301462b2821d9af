//! Card system: definitions, instances, registry, and card play.
//!
//! ## Key Types
//!
//! - `CardDefinition`: immutable card data authored by the theme
//! - `CardInstance`: one physical copy in a session (state, modifiers)
//! - `CardRegistry`: definition lookup by `CardId`
//! - `play_card` / `discard_card`: the Card Resolution Engine

pub mod definition;
pub mod instance;
pub mod play;
pub mod registry;

pub use definition::{CardDefinition, CardKind, Cost, Rarity};
pub use instance::{CardInstance, CardState, InstanceId, Modifier};
pub use play::{discard_card, play_card, DiscardResult, PlayReport, PlayResult};
pub use registry::CardRegistry;
