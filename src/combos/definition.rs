//! Combo definitions.
//!
//! A combo is a group of cards that pays off when played in the same turn.
//! `set` combos need every listed card in any order; `sequence` combos need
//! them in the listed relative order (other plays may come in between).
//! Both count copies: a pattern listing a card twice needs two plays.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::Rarity;
use crate::core::{CardId, ComboId};
use crate::effects::Effect;

/// Which plays complete a combo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComboPattern {
    Set { cards: Vec<CardId> },
    Sequence { cards: Vec<CardId> },
}

impl ComboPattern {
    #[must_use]
    pub fn cards(&self) -> &[CardId] {
        match self {
            ComboPattern::Set { cards } | ComboPattern::Sequence { cards } => cards,
        }
    }

    /// Cards still to be played, given this turn's plays in order.
    ///
    /// For a sequence the result is in the order the cards must come.
    #[must_use]
    pub fn missing(&self, played: &[CardId]) -> Vec<CardId> {
        match self {
            ComboPattern::Set { cards } => {
                let mut available = counts(played);
                cards
                    .iter()
                    .filter(|card| match available.get_mut(*card) {
                        Some(n) if *n > 0 => {
                            *n -= 1;
                            false
                        }
                        _ => true,
                    })
                    .cloned()
                    .collect()
            }
            ComboPattern::Sequence { cards } => {
                let mut matched = 0;
                for card in played {
                    if matched < cards.len() && cards[matched] == *card {
                        matched += 1;
                    }
                }
                cards[matched..].to_vec()
            }
        }
    }

    #[must_use]
    pub fn is_completed_by(&self, played: &[CardId]) -> bool {
        self.missing(played).is_empty()
    }
}

/// Multiset of card ids.
pub(crate) fn counts(cards: &[CardId]) -> FxHashMap<&CardId, usize> {
    let mut counts = FxHashMap::default();
    for card in cards {
        *counts.entry(card).or_insert(0) += 1;
    }
    counts
}

/// What completing a combo is worth.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboReward {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub points: i64,
}

/// A theme-authored combo.
///
/// ```json
/// {"id": "all_nighter", "name": "All-Nighter",
///  "pattern": {"type": "sequence", "cards": ["coffee", "overtime"]},
///  "reward": {"description": "Crunch time", "points": 20},
///  "bonus_effects": [{"type": "modify_stat", "stat": "performance", "value": 10}]}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboDefinition {
    pub id: ComboId,

    #[serde(default)]
    pub name: String,

    pub pattern: ComboPattern,

    #[serde(default)]
    pub reward: ComboReward,

    #[serde(default)]
    pub rarity: Option<Rarity>,

    /// Applied once per turn to the player who completes the combo.
    #[serde(default)]
    pub bonus_effects: Vec<Effect>,
}

impl ComboDefinition {
    pub fn new(id: impl Into<ComboId>, pattern: ComboPattern) -> Self {
        let id = id.into();
        Self {
            name: id.as_str().to_string(),
            id,
            pattern,
            reward: ComboReward::default(),
            rarity: None,
            bonus_effects: Vec::new(),
        }
    }

    /// A `set` combo over the given cards.
    pub fn set<I, C>(id: impl Into<ComboId>, cards: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CardId>,
    {
        Self::new(id, ComboPattern::Set {
            cards: cards.into_iter().map(Into::into).collect(),
        })
    }

    /// A `sequence` combo over the given cards, in order.
    pub fn sequence<I, C>(id: impl Into<ComboId>, cards: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CardId>,
    {
        Self::new(id, ComboPattern::Sequence {
            cards: cards.into_iter().map(Into::into).collect(),
        })
    }

    #[must_use]
    pub fn with_points(mut self, points: i64) -> Self {
        self.reward.points = points;
        self
    }

    #[must_use]
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }

    #[must_use]
    pub fn with_bonus_effect(mut self, effect: Effect) -> Self {
        self.bonus_effects.push(effect);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(cards: &[&str]) -> Vec<CardId> {
        cards.iter().map(|c| CardId::new(*c)).collect()
    }

    #[test]
    fn test_set_any_order() {
        let pattern = ComboDefinition::set("c", ["a", "b"]).pattern;

        assert!(pattern.is_completed_by(&ids(&["b", "x", "a"])));
        assert_eq!(pattern.missing(&ids(&["b"])), ids(&["a"]));
    }

    #[test]
    fn test_set_counts_copies() {
        let pattern = ComboDefinition::set("c", ["a", "a"]).pattern;

        assert!(!pattern.is_completed_by(&ids(&["a"])));
        assert!(pattern.is_completed_by(&ids(&["a", "a"])));
    }

    #[test]
    fn test_sequence_order_matters() {
        let pattern = ComboDefinition::sequence("c", ["a", "b", "c"]).pattern;

        assert!(pattern.is_completed_by(&ids(&["a", "x", "b", "c"])));
        assert!(!pattern.is_completed_by(&ids(&["b", "a", "c"])));
        assert_eq!(pattern.missing(&ids(&["b", "a"])), ids(&["b", "c"]));
    }

    #[test]
    fn test_combo_json() {
        let json = r#"{
            "id": "all_nighter",
            "name": "all_nighter",
            "pattern": {"type": "sequence", "cards": ["coffee", "overtime"]},
            "reward": {"points": 20},
            "rarity": "rare"
        }"#;
        let combo: ComboDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(
            combo,
            ComboDefinition::sequence("all_nighter", ["coffee", "overtime"])
                .with_points(20)
                .with_rarity(Rarity::Rare)
        );
    }
}
