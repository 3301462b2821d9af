//! Card instances - runtime card state.
//!
//! `CardInstance` represents one physical copy of a card in a session.
//! Copies are created when a player's deck is built at game start and move
//! deck → hand → played/discarded. They carry the modifiers other cards
//! attached to them while in hand.

use serde::{Deserialize, Serialize};

use crate::core::CardId;

/// Unique identifier of one card copy within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Create a new instance ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a card copy currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardState {
    InDeck,
    InHand,
    Played,
    Discarded,
}

/// A modifier attached to a card copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// Adds to the card's cost. The effective cost never drops below 0.
    CostDelta(i64),
    /// Adds to the magnitude of the card's stat and resource effects.
    EffectBoost(i64),
}

/// A card copy in a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique id for this copy.
    pub id: InstanceId,

    /// Reference to the card definition.
    pub card: CardId,

    pub state: CardState,

    /// Active modifiers, in the order they were attached.
    pub modifiers: Vec<Modifier>,
}

impl CardInstance {
    /// Create a copy sitting in a deck.
    #[must_use]
    pub fn new(id: InstanceId, card: CardId) -> Self {
        Self {
            id,
            card,
            state: CardState::InDeck,
            modifiers: Vec::new(),
        }
    }

    /// Attach a modifier.
    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    /// Sum of all `CostDelta` modifiers.
    #[must_use]
    pub fn cost_delta(&self) -> i64 {
        self.modifiers
            .iter()
            .map(|m| match m {
                Modifier::CostDelta(d) => *d,
                Modifier::EffectBoost(_) => 0,
            })
            .sum()
    }

    /// Sum of all `EffectBoost` modifiers.
    #[must_use]
    pub fn effect_boost(&self) -> i64 {
        self.modifiers
            .iter()
            .map(|m| match m {
                Modifier::EffectBoost(b) => *b,
                Modifier::CostDelta(_) => 0,
            })
            .sum()
    }

    /// Effective cost given the definition's base cost.
    #[must_use]
    pub fn effective_cost(&self, base: i64) -> i64 {
        (base + self.cost_delta()).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copy() -> CardInstance {
        CardInstance::new(InstanceId::new(3), CardId::new("coffee"))
    }

    #[test]
    fn test_new_instance_in_deck() {
        let card = copy();
        assert_eq!(card.state, CardState::InDeck);
        assert!(card.modifiers.is_empty());
        assert_eq!(format!("{}", card.id), "#3");
    }

    #[test]
    fn test_modifier_sums() {
        let mut card = copy();
        card.add_modifier(Modifier::CostDelta(-1));
        card.add_modifier(Modifier::EffectBoost(5));
        card.add_modifier(Modifier::CostDelta(-1));

        assert_eq!(card.cost_delta(), -2);
        assert_eq!(card.effect_boost(), 5);
    }

    #[test]
    fn test_effective_cost_floor() {
        let mut card = copy();
        card.add_modifier(Modifier::CostDelta(-5));

        assert_eq!(card.effective_cost(2), 0);
        assert_eq!(card.effective_cost(7), 2);
    }

    #[test]
    fn test_modifier_json_shape() {
        let json = serde_json::to_string(&Modifier::CostDelta(-1)).unwrap();
        assert_eq!(json, r#"{"cost_delta":-1}"#);
    }
}
