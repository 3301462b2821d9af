//! Game events.
//!
//! Events tell the host what happened during an action: which card was
//! played, who won a claim, which combo to highlight. The host renders
//! them; the rules core never reads them back.

use serde::{Deserialize, Serialize};

use crate::cards::InstanceId;
use crate::combos::ComboHint;
use crate::core::{CardId, ComboId, PlayerId, PoolId};
use crate::rules::{EndReason, Phase};

/// Something that happened in a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TurnStarted {
        turn: u32,
    },

    PhaseChanged {
        from: Phase,
        to: Phase,
    },

    CardPlayed {
        player: PlayerId,
        instance: InstanceId,
        card: CardId,
    },

    CardDiscarded {
        player: PlayerId,
        instance: InstanceId,
        card: CardId,
    },

    ResourceClaimed {
        pool: PoolId,
        player: PlayerId,
        remaining: i64,
    },

    PoolRenewed {
        pool: PoolId,
        restored: i64,
        remaining: i64,
    },

    ComboHint {
        player: PlayerId,
        hint: ComboHint,
    },

    ComboCompleted {
        player: PlayerId,
        combo: ComboId,
        points: i64,
    },

    GameOver {
        reason: EndReason,
    },
}

impl GameEvent {
    /// Snake-case event name, stable for hosts that dispatch on strings.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::TurnStarted { .. } => "turn_started",
            GameEvent::PhaseChanged { .. } => "phase_changed",
            GameEvent::CardPlayed { .. } => "card_played",
            GameEvent::CardDiscarded { .. } => "card_discarded",
            GameEvent::ResourceClaimed { .. } => "resource_claimed",
            GameEvent::PoolRenewed { .. } => "pool_renewed",
            GameEvent::ComboHint { .. } => "combo_hint",
            GameEvent::ComboCompleted { .. } => "combo_completed",
            GameEvent::GameOver { .. } => "game_over",
        }
    }

    /// The player this event concerns, if it concerns one.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            GameEvent::CardPlayed { player, .. }
            | GameEvent::CardDiscarded { player, .. }
            | GameEvent::ResourceClaimed { player, .. }
            | GameEvent::ComboHint { player, .. }
            | GameEvent::ComboCompleted { player, .. } => Some(*player),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(GameEvent::TurnStarted { turn: 1 }.name(), "turn_started");
        assert_eq!(
            GameEvent::PhaseChanged { from: Phase::Main, to: Phase::Action }.name(),
            "phase_changed"
        );
    }

    #[test]
    fn test_event_player() {
        let event = GameEvent::ResourceClaimed {
            pool: PoolId::new("parking"),
            player: PlayerId::new(2),
            remaining: 0,
        };
        assert_eq!(event.player(), Some(PlayerId::new(2)));
        assert_eq!(GameEvent::TurnStarted { turn: 3 }.player(), None);
    }
}
