//! # theme-deck-core
//!
//! Rules core for a family of themed, turn-based card games.
//!
//! A theme (office survival, parenting, startup, travel, ...) is pure
//! data: stats, resources, cards, shared pools, combos and win conditions,
//! loaded from JSON or built in code. The core resolves card effects
//! against player state, detects combos, and arbitrates scarce shared
//! resources. Rendering, persistence and AI opponents belong to the host.
//!
//! ## Design Principles
//!
//! 1. **Content-Agnostic**: No hardcoded stats, cards or pools. Themes
//!    declare them and the core validates them once at load.
//!
//! 2. **N-Player First**: Every session takes a player count; effects
//!    target the actor, the opponents or everyone.
//!
//! 3. **All-or-Nothing Actions**: Each host action either completes or
//!    leaves the session exactly as it was.
//!
//! 4. **Deterministic**: One seeded RNG per session drives shuffles and
//!    random claims, so equal seeds and equal host calls give equal games.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: card piles use `im` vectors, making
//!   the per-action checkpoint clone cheap.
//!
//! - **Buffered Events**: subscribers only hear about actions that
//!   committed.
//!
//! ## Modules
//!
//! - `core`: ids, players, RNG, errors, theme config, session state
//! - `cards`: card definitions, instances, registry, card play
//! - `effects`: effect model, targeting, effect resolver
//! - `resources`: shared pools and the arbiter
//! - `combos`: combo patterns and hint detection
//! - `rules`: phases, win conditions, game sessions
//! - `events`: game events and the event bus

pub mod cards;
pub mod combos;
pub mod core;
pub mod effects;
pub mod events;
pub mod resources;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    CardId, ComboId, ConfigError, GameRng, InvariantViolation, PlayError, PlayerId, PlayerMap, PlayerState, PoolId,
    ResourceDefinition, ResourceId, Result, RulesError, SessionSettings, SessionState, StatDefinition, StatId, Theme,
    ThemeConfig,
};

pub use crate::cards::{
    CardDefinition, CardInstance, CardKind, CardRegistry, CardState, Cost, DiscardResult, InstanceId, Modifier,
    PlayReport, PlayResult, Rarity,
};

pub use crate::effects::{Effect, EffectOutcome, EffectResolver, ResolverContext, Target};

pub use crate::resources::{
    ClaimOutcome, ClaimResult, ClaimRule, PoolState, SharedResourceArbiter, SharedResourceDefinition,
};

pub use crate::combos::{check_combo_opportunity, ComboDefinition, ComboHint, ComboHintState, ComboPattern, HintKind};

pub use crate::rules::{Comparison, EndReason, GameSession, Outcome, Phase, StepResult, WinCondition};

pub use crate::events::{EventBus, GameEvent, SubscriptionId};
