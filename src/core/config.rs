//! Theme and session configuration.
//!
//! Themes configure the engine at startup by providing:
//! - `StatDefinition` / `ResourceDefinition`: what players track
//! - `CardDefinition`s and a `DeckEntry` list: what players draw
//! - `SharedResourceDefinition`s: pools every player contests
//! - `ComboDefinition`s and `WinCondition`s
//!
//! The engine never embeds game content - a `ThemeConfig` is either
//! deserialized from a JSON theme document or assembled with the `with_*`
//! builders, then validated into a [`Theme`](super::Theme).

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::ids::{CardId, ResourceId, StatId};
use crate::cards::CardDefinition;
use crate::combos::ComboDefinition;
use crate::effects::Effect;
use crate::resources::SharedResourceDefinition;
use crate::rules::WinCondition;

/// Turn ceiling used when a theme does not declare one.
pub const DEFAULT_MAX_TURNS: u32 = 30;

/// Cards dealt to each player at game start unless the theme says otherwise.
pub const DEFAULT_STARTING_HAND_SIZE: usize = 5;

/// Cards drawn on entering each draw phase unless the theme says otherwise.
pub const DEFAULT_DRAW_PER_TURN: usize = 1;

fn default_stat_max() -> i64 {
    100
}

fn default_copies() -> u32 {
    1
}

/// A bounded player stat.
///
/// Values are clamped to `[min, max]` after every change.
/// Bounds default to `[0, 100]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDefinition {
    pub id: StatId,

    /// Display name. Purely informational.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub min: i64,

    #[serde(default = "default_stat_max")]
    pub max: i64,

    /// Value every player starts with.
    #[serde(default)]
    pub initial: i64,
}

impl StatDefinition {
    /// Create a stat with the default `[0, 100]` bounds.
    pub fn new(id: impl Into<StatId>, initial: i64) -> Self {
        let id = id.into();
        Self {
            name: id.as_str().to_string(),
            id,
            min: 0,
            max: default_stat_max(),
            initial,
        }
    }

    /// Override the bounds (builder pattern).
    #[must_use]
    pub fn with_bounds(mut self, min: i64, max: i64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Clamp a raw value into this stat's bounds.
    #[must_use]
    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

/// A floor-zero player resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub id: ResourceId,

    #[serde(default)]
    pub name: String,

    /// Value every player starts with.
    #[serde(default)]
    pub initial: i64,

    /// Optional ceiling. Resources are unbounded above unless set.
    #[serde(default)]
    pub max: Option<i64>,
}

impl ResourceDefinition {
    /// Create an unbounded resource.
    pub fn new(id: impl Into<ResourceId>, initial: i64) -> Self {
        let id = id.into();
        Self {
            name: id.as_str().to_string(),
            id,
            initial,
            max: None,
        }
    }

    /// Set a ceiling (builder pattern).
    #[must_use]
    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Clamp a raw value to `[0, max]`.
    #[must_use]
    pub fn clamp(&self, value: i64) -> i64 {
        let floored = value.max(0);
        match self.max {
            Some(max) => floored.min(max),
            None => floored,
        }
    }
}

/// How many copies of a card go into each player's starting deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card: CardId,

    #[serde(default = "default_copies")]
    pub copies: u32,
}

/// Complete theme content, as authored.
///
/// Deserializes from a JSON theme document; any field left out takes its
/// default (empty lists, 5-card opening hand, 1 draw per turn, 30 turns).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
    pub stats: Vec<StatDefinition>,
    pub resources: Vec<ResourceDefinition>,
    pub cards: Vec<CardDefinition>,
    pub deck: Vec<DeckEntry>,
    pub starting_hand_size: usize,
    pub draw_per_turn: usize,
    pub shared_resources: Vec<SharedResourceDefinition>,
    pub combos: Vec<ComboDefinition>,
    pub win_conditions: Vec<WinCondition>,
    /// Applied to every player on entering the end phase (decay, upkeep).
    pub per_turn_effects: Vec<Effect>,
    pub max_turns: u32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            stats: Vec::new(),
            resources: Vec::new(),
            cards: Vec::new(),
            deck: Vec::new(),
            starting_hand_size: DEFAULT_STARTING_HAND_SIZE,
            draw_per_turn: DEFAULT_DRAW_PER_TURN,
            shared_resources: Vec::new(),
            combos: Vec::new(),
            win_conditions: Vec::new(),
            per_turn_effects: Vec::new(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl ThemeConfig {
    /// Create an empty theme with default turn settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON theme document. Validation happens in `Theme::new`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn with_stat(mut self, stat: StatDefinition) -> Self {
        self.stats.push(stat);
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource: ResourceDefinition) -> Self {
        self.resources.push(resource);
        self
    }

    #[must_use]
    pub fn with_card(mut self, card: CardDefinition) -> Self {
        self.cards.push(card);
        self
    }

    /// Put `copies` of a card into every player's starting deck.
    #[must_use]
    pub fn with_deck_entry(mut self, card: impl Into<CardId>, copies: u32) -> Self {
        self.deck.push(DeckEntry {
            card: card.into(),
            copies,
        });
        self
    }

    #[must_use]
    pub fn with_shared_resource(mut self, pool: SharedResourceDefinition) -> Self {
        self.shared_resources.push(pool);
        self
    }

    #[must_use]
    pub fn with_combo(mut self, combo: ComboDefinition) -> Self {
        self.combos.push(combo);
        self
    }

    #[must_use]
    pub fn with_win_condition(mut self, condition: WinCondition) -> Self {
        self.win_conditions.push(condition);
        self
    }

    #[must_use]
    pub fn with_per_turn_effect(mut self, effect: Effect) -> Self {
        self.per_turn_effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_draw_per_turn(mut self, count: usize) -> Self {
        self.draw_per_turn = count;
        self
    }

    #[must_use]
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }
}

/// Per-session knobs chosen by the host, independent of the theme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Number of players (1-255).
    pub player_count: usize,

    /// Seed for deck shuffles and random claim draws.
    pub seed: u64,

    /// Overrides the theme's turn ceiling when set.
    pub max_turns: Option<u32>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            player_count: 1,
            seed: 0,
            max_turns: None,
        }
    }
}

impl SessionSettings {
    /// Settings for `player_count` players with seed 0.
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    /// Reject player counts a `PlayerMap` cannot hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_count == 0 || self.player_count > 255 {
            return Err(ConfigError::InvalidPlayerCount(self.player_count));
        }
        if self.max_turns == Some(0) {
            return Err(ConfigError::InvalidValue {
                context: "session settings".to_string(),
                reason: "max_turns must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
