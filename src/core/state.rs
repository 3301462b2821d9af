//! Session state: everything that changes while a game is played.
//!
//! ## PlayerState
//!
//! One player's cards (deck, hand, played and discard piles), bounded
//! stats, floor-zero resources, and the cards they played this turn.
//!
//! ## SessionState
//!
//! The complete mutable state of a session:
//! - Phase, turn counter, end reason
//! - Per-player state and combo hint memory
//! - Shared pool state and queued claim requests
//! - RNG
//!
//! Card piles use `im` persistent vectors, so cloning a `SessionState`
//! to checkpoint an action is cheap. See [`SessionState::transact`].

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::config::SessionSettings;
use super::error::Result;
use super::ids::{CardId, ResourceId, StatId};
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use super::theme::Theme;
use crate::cards::{CardInstance, CardState, InstanceId};
use crate::combos::ComboHintState;
use crate::resources::{ClaimRequest, PoolState};
use crate::rules::{EndReason, Phase};

/// One player's mutable state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,

    /// Cards in hand, in the order they were drawn.
    pub hand: Vector<CardInstance>,

    /// Draw pile. The front is the top card.
    pub deck: Vector<CardInstance>,

    pub played: Vector<CardInstance>,

    pub discard: Vector<CardInstance>,

    pub stats: FxHashMap<StatId, i64>,

    pub resources: FxHashMap<ResourceId, i64>,

    /// Card ids played this turn, in play order. Cleared each new turn.
    pub played_this_turn: Vector<CardId>,
}

impl PlayerState {
    /// Create an empty player with no cards, stats or resources.
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            hand: Vector::new(),
            deck: Vector::new(),
            played: Vector::new(),
            discard: Vector::new(),
            stats: FxHashMap::default(),
            resources: FxHashMap::default(),
            played_this_turn: Vector::new(),
        }
    }

    #[must_use]
    pub fn stat(&self, stat: &StatId) -> Option<i64> {
        self.stats.get(stat).copied()
    }

    #[must_use]
    pub fn resource(&self, resource: &ResourceId) -> Option<i64> {
        self.resources.get(resource).copied()
    }

    /// Position of a card copy in the hand.
    #[must_use]
    pub fn hand_position(&self, instance: InstanceId) -> Option<usize> {
        self.hand.iter().position(|c| c.id == instance)
    }

    /// Look up a card copy in the hand.
    #[must_use]
    pub fn find_in_hand(&self, instance: InstanceId) -> Option<&CardInstance> {
        self.hand.iter().find(|c| c.id == instance)
    }

    /// Take a card copy out of the hand.
    pub fn take_from_hand(&mut self, instance: InstanceId) -> Option<CardInstance> {
        let position = self.hand_position(instance)?;
        Some(self.hand.remove(position))
    }

    /// Move up to `count` cards from the top of the deck into the hand.
    ///
    /// Returns how many were drawn. An empty deck draws nothing.
    pub fn draw(&mut self, count: usize) -> usize {
        let mut drawn = 0;
        while drawn < count {
            let Some(mut card) = self.deck.pop_front() else {
                break;
            };
            card.state = CardState::InHand;
            self.hand.push_back(card);
            drawn += 1;
        }
        drawn
    }

    /// Card ids currently in hand, in hand order.
    #[must_use]
    pub fn hand_cards(&self) -> Vec<CardId> {
        self.hand.iter().map(|c| c.card.clone()).collect()
    }

    /// Card ids played this turn, in play order.
    #[must_use]
    pub fn play_history(&self) -> Vec<CardId> {
        self.played_this_turn.iter().cloned().collect()
    }
}

/// Complete mutable state of one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,

    /// Turn number. 0 during setup, 1 for the first turn.
    pub turn: u32,

    pub players: PlayerMap<PlayerState>,

    /// One entry per theme pool, in declaration order.
    pub pools: Vec<PoolState>,

    pub hints: PlayerMap<ComboHintState>,

    /// Claims queued during the action phase, in submission order.
    pub pending_claims: Vec<ClaimRequest>,

    /// Set once the game is over.
    pub end_reason: Option<EndReason>,

    pub rng: GameRng,

    /// Next unused card instance id.
    pub next_instance: u32,
}

impl SessionState {
    /// Build a fresh session in the setup phase.
    ///
    /// Every player gets the theme's initial stats and resources and a
    /// shuffled deck built from the theme's deck list. Pools start full.
    /// Hands stay empty until the session deals them.
    pub fn new(theme: &Theme, settings: &SessionSettings) -> Result<Self> {
        settings.validate()?;
        let player_count = settings.player_count;

        let mut rng = GameRng::new(settings.seed);
        let mut next_instance = 0u32;
        let mut players = PlayerMap::new(player_count, PlayerState::new);

        for (_, player) in players.iter_mut() {
            for stat in theme.stats() {
                player.stats.insert(stat.id.clone(), stat.initial);
            }
            for resource in theme.resources() {
                player.resources.insert(resource.id.clone(), resource.initial);
            }

            let mut deck = Vec::new();
            for entry in theme.deck() {
                for _ in 0..entry.copies {
                    deck.push(CardInstance::new(
                        InstanceId::new(next_instance),
                        entry.card.clone(),
                    ));
                    next_instance += 1;
                }
            }
            rng.shuffle(&mut deck);
            player.deck = deck.into_iter().collect();
        }

        let pools = theme.pools().iter().map(PoolState::full).collect();

        Ok(Self {
            phase: Phase::Setup,
            turn: 0,
            players,
            pools,
            hints: PlayerMap::with_default(player_count),
            pending_claims: Vec::new(),
            end_reason: None,
            rng,
            next_instance,
        })
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Run `action` against this state, restoring the prior state if it
    /// returns an error.
    pub fn transact<T>(&mut self, action: impl FnOnce(&mut SessionState) -> Result<T>) -> Result<T> {
        let checkpoint = self.clone();
        let result = action(self);
        if result.is_err() {
            *self = checkpoint;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardKind};
    use crate::core::{RulesError, StatDefinition, ThemeConfig, ResourceDefinition, InvariantViolation};
    use crate::resources::SharedResourceDefinition;

    fn theme() -> Theme {
        let config = ThemeConfig::new("office")
            .with_stat(StatDefinition::new("performance", 50))
            .with_resource(ResourceDefinition::new("energy", 3))
            .with_card(CardDefinition::new("memo", "Memo", CardKind::Action))
            .with_card(CardDefinition::new("coffee", "Coffee", CardKind::Resource))
            .with_deck_entry("memo", 3)
            .with_deck_entry("coffee", 2)
            .with_shared_resource(SharedResourceDefinition::new("parking", 2));
        Theme::new(config).unwrap()
    }

    #[test]
    fn test_new_session_state() {
        let state = SessionState::new(&theme(), &SessionSettings::new(2)).unwrap();

        assert_eq!(state.phase, Phase::Setup);
        assert_eq!(state.turn, 0);
        assert_eq!(state.player_count(), 2);
        assert_eq!(state.next_instance, 10);
        assert_eq!(state.pools[0].remaining, 2);

        for (_, player) in state.players.iter() {
            assert_eq!(player.deck.len(), 5);
            assert!(player.hand.is_empty());
            assert_eq!(player.stat(&StatId::new("performance")), Some(50));
            assert_eq!(player.resource(&ResourceId::new("energy")), Some(3));
        }
    }

    #[test]
    fn test_instance_ids_unique() {
        let state = SessionState::new(&theme(), &SessionSettings::new(3)).unwrap();

        let mut ids: Vec<_> = state
            .players
            .iter()
            .flat_map(|(_, p)| p.deck.iter().map(|c| c.id))
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_same_seed_same_deal() {
        let settings = SessionSettings::new(2).with_seed(11);
        let a = SessionState::new(&theme(), &settings).unwrap();
        let b = SessionState::new(&theme(), &settings).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_moves_top_cards() {
        let mut state = SessionState::new(&theme(), &SessionSettings::new(1)).unwrap();
        let player = &mut state.players[PlayerId::new(0)];
        let top = player.deck[0].id;

        assert_eq!(player.draw(2), 2);
        assert_eq!(player.hand[0].id, top);
        assert!(player.hand.iter().all(|c| c.state == CardState::InHand));
        assert_eq!(player.draw(10), 3);
        assert_eq!(player.draw(1), 0);
    }

    #[test]
    fn test_take_from_hand() {
        let mut state = SessionState::new(&theme(), &SessionSettings::new(1)).unwrap();
        let player = &mut state.players[PlayerId::new(0)];
        player.draw(2);
        let id = player.hand[1].id;

        let card = player.take_from_hand(id).unwrap();
        assert_eq!(card.id, id);
        assert_eq!(player.hand.len(), 1);
        assert!(player.take_from_hand(id).is_none());
    }

    #[test]
    fn test_transact_rolls_back_on_error() {
        let mut state = SessionState::new(&theme(), &SessionSettings::new(1)).unwrap();
        let before = state.clone();

        let result: Result<()> = state.transact(|s| {
            s.turn = 9;
            s.players[PlayerId::new(0)].draw(3);
            Err(InvariantViolation::UndeclaredStat(StatId::new("mood")).into())
        });

        assert!(matches!(result, Err(RulesError::Invariant(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn test_transact_keeps_success() {
        let mut state = SessionState::new(&theme(), &SessionSettings::new(1)).unwrap();
        state.transact(|s| {
            s.turn = 4;
            Ok(())
        })
        .unwrap();
        assert_eq!(state.turn, 4);
    }

    #[test]
    fn test_invalid_player_count() {
        let result = SessionState::new(&theme(), &SessionSettings::new(0));
        assert!(matches!(result, Err(RulesError::Config(_))));
    }
}
