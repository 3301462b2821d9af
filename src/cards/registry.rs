//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores every card definition of a theme and provides
//! lookup by `CardId`. Declaration order is kept for iteration so theme
//! listings stay stable.

use rustc_hash::FxHashMap;

use super::definition::CardDefinition;
use crate::core::{CardId, ConfigError};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use theme_deck_core::cards::{CardDefinition, CardKind, CardRegistry};
/// use theme_deck_core::core::CardId;
///
/// let mut registry = CardRegistry::new();
/// registry
///     .register(CardDefinition::new("coffee", "Coffee Break", CardKind::Action))
///     .unwrap();
///
/// assert_eq!(registry.get(&CardId::new("coffee")).unwrap().name, "Coffee Break");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: Vec<CardDefinition>,
    index: FxHashMap<CardId, usize>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// A second card with the same id is a theme defect.
    pub fn register(&mut self, card: CardDefinition) -> Result<(), ConfigError> {
        if self.index.contains_key(&card.id) {
            return Err(ConfigError::DuplicateId {
                kind: "card",
                id: card.id.as_str().to_string(),
            });
        }
        self.index.insert(card.id.clone(), self.cards.len());
        self.cards.push(card);
        Ok(())
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&CardDefinition> {
        self.index.get(id).map(|&i| &self.cards[i])
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all card definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.iter()
    }
}
