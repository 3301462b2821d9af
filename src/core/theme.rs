//! Validated theme content.
//!
//! A [`Theme`] is a [`ThemeConfig`] that passed validation, plus lookup
//! indexes over it. Every id a card, pool, combo or condition mentions is
//! known to exist, every bound is consistent, and claims never nest.
//! Runtime code can therefore treat a missing id as an invariant
//! violation rather than a content error.
//!
//! ```
//! use theme_deck_core::core::Theme;
//!
//! let theme = Theme::from_json(r#"{
//!     "name": "office",
//!     "stats": [{"id": "performance", "initial": 50}],
//!     "cards": [{"id": "memo", "type": "action", "name": "Memo",
//!                "effects": [{"type": "modify_stat", "stat": "performance", "value": 5}]}],
//!     "deck": [{"card": "memo", "copies": 4}]
//! }"#).unwrap();
//!
//! assert_eq!(theme.name(), "office");
//! assert_eq!(theme.cards().len(), 1);
//! ```

use rustc_hash::{FxHashMap, FxHashSet};

use super::config::{DeckEntry, ResourceDefinition, StatDefinition, ThemeConfig};
use super::error::ConfigError;
use super::ids::{CardId, PoolId, ResourceId, StatId};
use crate::cards::{CardDefinition, CardRegistry};
use crate::combos::{ComboDefinition, ComboPattern};
use crate::effects::Effect;
use crate::resources::{ClaimRule, SharedResourceDefinition};
use crate::rules::{ConditionKind, WinCondition};

/// Theme content after validation.
#[derive(Clone, Debug)]
pub struct Theme {
    config: ThemeConfig,
    cards: CardRegistry,
    stats: FxHashMap<StatId, usize>,
    resources: FxHashMap<ResourceId, usize>,
    pools: FxHashMap<PoolId, usize>,
}

impl Theme {
    /// Validate a theme configuration.
    pub fn new(config: ThemeConfig) -> Result<Self, ConfigError> {
        let mut stats = FxHashMap::default();
        for (i, stat) in config.stats.iter().enumerate() {
            if stats.insert(stat.id.clone(), i).is_some() {
                return Err(duplicate("stat", stat.id.as_str()));
            }
            if stat.min > stat.max || stat.initial < stat.min || stat.initial > stat.max {
                return Err(ConfigError::InvalidStatBounds {
                    stat: stat.id.clone(),
                    min: stat.min,
                    max: stat.max,
                    initial: stat.initial,
                });
            }
        }

        let mut resources = FxHashMap::default();
        for (i, resource) in config.resources.iter().enumerate() {
            if resources.insert(resource.id.clone(), i).is_some() {
                return Err(duplicate("resource", resource.id.as_str()));
            }
            if resource.initial < 0 {
                return Err(ConfigError::InvalidResource {
                    resource: resource.id.clone(),
                    reason: format!("initial value {} is negative", resource.initial),
                });
            }
            if let Some(max) = resource.max {
                if max < resource.initial {
                    return Err(ConfigError::InvalidResource {
                        resource: resource.id.clone(),
                        reason: format!("max {max} is below the initial value {}", resource.initial),
                    });
                }
            }
        }

        let mut pools = FxHashMap::default();
        for (i, pool) in config.shared_resources.iter().enumerate() {
            if pools.insert(pool.id.clone(), i).is_some() {
                return Err(duplicate("pool", pool.id.as_str()));
            }
        }

        let mut cards = CardRegistry::new();
        for card in &config.cards {
            cards.register(card.clone())?;
        }

        let theme = Self {
            config,
            cards,
            stats,
            resources,
            pools,
        };
        theme.validate()?;
        Ok(theme)
    }

    /// Parse and validate a JSON theme document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::new(ThemeConfig::from_json(json)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let config = &self.config;

        if config.max_turns == 0 {
            return Err(ConfigError::InvalidValue {
                context: "theme".to_string(),
                reason: "max_turns must be at least 1".to_string(),
            });
        }

        for card in &config.cards {
            let context = format!("card {}", card.id);
            if let Some(cost) = &card.cost {
                self.check_resource(&cost.resource, &context)?;
                if cost.amount < 0 {
                    return Err(ConfigError::InvalidValue {
                        context,
                        reason: format!("cost {} is negative", cost.amount),
                    });
                }
            }
            for effect in &card.effects {
                self.check_effect(effect, &context, true)?;
            }
        }

        for entry in &config.deck {
            if !self.cards.contains(&entry.card) {
                return Err(ConfigError::UnknownCard {
                    context: "deck".to_string(),
                    card: entry.card.clone(),
                });
            }
        }

        for pool in &config.shared_resources {
            self.check_pool(pool)?;
        }

        let mut combo_ids = FxHashSet::default();
        for combo in &config.combos {
            if !combo_ids.insert(combo.id.clone()) {
                return Err(duplicate("combo", combo.id.as_str()));
            }
            self.check_combo(combo)?;
        }

        for (i, condition) in config.win_conditions.iter().enumerate() {
            let context = format!("win condition {i}");
            match &condition.kind {
                ConditionKind::StatThreshold { stat } => self.check_stat(stat, &context)?,
                ConditionKind::ResourceThreshold { resource } => {
                    self.check_resource(resource, &context)?;
                }
            }
        }

        for effect in &config.per_turn_effects {
            self.check_effect(effect, "per-turn effects", true)?;
        }

        Ok(())
    }

    fn check_pool(&self, pool: &SharedResourceDefinition) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidPool {
            pool: pool.id.clone(),
            reason,
        };

        if pool.total_amount <= 0 {
            return Err(invalid(format!("total_amount {} must be positive", pool.total_amount)));
        }
        if pool.renewable {
            if pool.renewal_interval == 0 {
                return Err(invalid("renewable pools need a renewal_interval of at least 1".to_string()));
            }
            if pool.renewal_amount <= 0 {
                return Err(invalid(format!(
                    "renewal_amount {} must be positive",
                    pool.renewal_amount
                )));
            }
        }

        let context = format!("pool {}", pool.id);
        for rule in &pool.claim_rules {
            match rule {
                ClaimRule::HighestStat { stat } | ClaimRule::MinStat { stat, .. } => {
                    self.check_stat(stat, &context)?;
                }
                ClaimRule::FirstCome | ClaimRule::Random => {}
            }
        }
        for effect in &pool.claim_effects {
            self.check_effect(effect, &context, false)?;
        }
        Ok(())
    }

    fn check_combo(&self, combo: &ComboDefinition) -> Result<(), ConfigError> {
        let cards = combo.pattern.cards();
        if cards.is_empty() {
            let shape = match combo.pattern {
                ComboPattern::Set { .. } => "set",
                ComboPattern::Sequence { .. } => "sequence",
            };
            return Err(ConfigError::InvalidCombo {
                combo: combo.id.clone(),
                reason: format!("{shape} pattern lists no cards"),
            });
        }

        let context = format!("combo {}", combo.id);
        for card in cards {
            if !self.cards.contains(card) {
                return Err(ConfigError::UnknownCard {
                    context,
                    card: card.clone(),
                });
            }
        }
        for effect in &combo.bonus_effects {
            self.check_effect(effect, &context, true)?;
        }
        Ok(())
    }

    fn check_effect(&self, effect: &Effect, context: &str, allow_claims: bool) -> Result<(), ConfigError> {
        match effect {
            Effect::ModifyStat { stat, .. } | Effect::SetStat { stat, .. } => self.check_stat(stat, context),
            Effect::GainResource { resource, value, .. } | Effect::LoseResource { resource, value, .. } => {
                self.check_resource(resource, context)?;
                if *value < 0 {
                    return Err(ConfigError::InvalidValue {
                        context: context.to_string(),
                        reason: format!("{} value {value} is negative", effect.kind_name()),
                    });
                }
                Ok(())
            }
            Effect::DrawCards { .. } | Effect::ApplyModifier { .. } => Ok(()),
            Effect::ClaimShared { pool, .. } => {
                if !allow_claims {
                    return Err(ConfigError::UnsupportedEffect {
                        effect: "claim_shared",
                        context: context.to_string(),
                    });
                }
                if !self.pools.contains_key(pool) {
                    return Err(ConfigError::UnknownPool {
                        context: context.to_string(),
                        pool: pool.clone(),
                    });
                }
                Ok(())
            }
        }
    }

    fn check_stat(&self, stat: &StatId, context: &str) -> Result<(), ConfigError> {
        if self.stats.contains_key(stat) {
            Ok(())
        } else {
            Err(ConfigError::UnknownStat {
                context: context.to_string(),
                stat: stat.clone(),
            })
        }
    }

    fn check_resource(&self, resource: &ResourceId, context: &str) -> Result<(), ConfigError> {
        if self.resources.contains_key(resource) {
            Ok(())
        } else {
            Err(ConfigError::UnknownResource {
                context: context.to_string(),
                resource: resource.clone(),
            })
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    #[must_use]
    pub fn cards(&self) -> &CardRegistry {
        &self.cards
    }

    #[must_use]
    pub fn card(&self, id: &CardId) -> Option<&CardDefinition> {
        self.cards.get(id)
    }

    #[must_use]
    pub fn stats(&self) -> &[StatDefinition] {
        &self.config.stats
    }

    #[must_use]
    pub fn stat(&self, id: &StatId) -> Option<&StatDefinition> {
        self.stats.get(id).map(|&i| &self.config.stats[i])
    }

    #[must_use]
    pub fn resources(&self) -> &[ResourceDefinition] {
        &self.config.resources
    }

    #[must_use]
    pub fn resource(&self, id: &ResourceId) -> Option<&ResourceDefinition> {
        self.resources.get(id).map(|&i| &self.config.resources[i])
    }

    /// Shared pools in declaration order. `SessionState::pools` is parallel.
    #[must_use]
    pub fn pools(&self) -> &[SharedResourceDefinition] {
        &self.config.shared_resources
    }

    /// Position of a pool in [`pools`](Self::pools).
    #[must_use]
    pub fn pool_index(&self, id: &PoolId) -> Option<usize> {
        self.pools.get(id).copied()
    }

    #[must_use]
    pub fn pool(&self, id: &PoolId) -> Option<&SharedResourceDefinition> {
        self.pool_index(id).map(|i| &self.config.shared_resources[i])
    }

    #[must_use]
    pub fn deck(&self) -> &[DeckEntry] {
        &self.config.deck
    }

    #[must_use]
    pub fn combos(&self) -> &[ComboDefinition] {
        &self.config.combos
    }

    #[must_use]
    pub fn win_conditions(&self) -> &[WinCondition] {
        &self.config.win_conditions
    }

    #[must_use]
    pub fn per_turn_effects(&self) -> &[Effect] {
        &self.config.per_turn_effects
    }

    #[must_use]
    pub fn starting_hand_size(&self) -> usize {
        self.config.starting_hand_size
    }

    #[must_use]
    pub fn draw_per_turn(&self) -> usize {
        self.config.draw_per_turn
    }

    #[must_use]
    pub fn max_turns(&self) -> u32 {
        self.config.max_turns
    }
}

fn duplicate(kind: &'static str, id: &str) -> ConfigError {
    ConfigError::DuplicateId {
        kind,
        id: id.to_string(),
    }
}
