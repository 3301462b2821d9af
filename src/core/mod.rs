//! Core engine types: ids, players, RNG, errors, configuration, state.
//!
//! This module contains the building blocks every other module uses.
//! Themes configure the engine through `ThemeConfig`; the engine never
//! embeds game content.

pub mod config;
pub mod error;
pub mod ids;
pub mod player;
pub mod rng;
pub mod state;
pub mod theme;

pub use config::{
    DeckEntry, ResourceDefinition, SessionSettings, StatDefinition, ThemeConfig, DEFAULT_DRAW_PER_TURN,
    DEFAULT_MAX_TURNS, DEFAULT_STARTING_HAND_SIZE,
};
pub use error::{ConfigError, InvariantViolation, PlayError, Result, RulesError};
pub use ids::{CardId, ComboId, PoolId, ResourceId, StatId};
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use state::{PlayerState, SessionState};
pub use theme::Theme;
