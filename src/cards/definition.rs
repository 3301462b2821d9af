//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a card as the theme
//! authored it: what kind of card it is, what it costs, and the ordered
//! effects it resolves. Per-copy data (where the copy is, which modifiers
//! it carries) lives in `CardInstance`.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, ResourceId};
use crate::effects::Effect;

/// Card kind. Themes use these for flavour and for modifier filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Action,
    Event,
    Resource,
    Character,
    Modifier,
}

/// Rarity tag. Ordered from most to least common; combo hints prefer rarer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// What a card costs to play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub resource: ResourceId,
    pub amount: i64,
}

impl Cost {
    pub fn new(resource: impl Into<ResourceId>, amount: i64) -> Self {
        Self {
            resource: resource.into(),
            amount,
        }
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use theme_deck_core::cards::{CardDefinition, CardKind};
/// use theme_deck_core::effects::Effect;
///
/// let coffee = CardDefinition::new("coffee", "Coffee Break", CardKind::Action)
///     .with_cost("energy", 1)
///     .with_effect(Effect::modify_stat("performance", 10));
///
/// assert_eq!(coffee.effects.len(), 1);
/// assert_eq!(coffee.cost.unwrap().amount, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,

    #[serde(rename = "type")]
    pub kind: CardKind,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Resolved strictly in this order when the card is played.
    #[serde(default)]
    pub effects: Vec<Effect>,

    #[serde(default)]
    pub cost: Option<Cost>,

    #[serde(default)]
    pub rarity: Option<Rarity>,
}

impl CardDefinition {
    /// Create a free card with no effects.
    #[must_use]
    pub fn new(id: impl Into<CardId>, name: impl Into<String>, kind: CardKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            description: String::new(),
            effects: Vec::new(),
            cost: None,
            rarity: None,
        }
    }

    /// Append an effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Set the play cost (builder pattern).
    #[must_use]
    pub fn with_cost(mut self, resource: impl Into<ResourceId>, amount: i64) -> Self {
        self.cost = Some(Cost::new(resource, amount));
        self
    }

    #[must_use]
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Rarity, treating an untagged card as common.
    #[must_use]
    pub fn rarity_or_common(&self) -> Rarity {
        self.rarity.unwrap_or_default()
    }
}
