//! Effect targeting.
//!
//! Themes aim effects at the acting player, at everyone else, or at every
//! player. Resolution always yields players in ascending id order, which is
//! also the candidate order for shared pool claims.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::PlayerId;

/// Who an effect applies to, relative to the acting player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The acting player.
    #[default]
    #[serde(rename = "self")]
    Actor,
    /// Every player except the acting player.
    Opponent,
    /// Every player, the actor included.
    All,
}

/// Resolved target list. Most sessions have few players.
pub type Targets = SmallVec<[PlayerId; 4]>;

impl Target {
    /// Resolve to concrete players for a session of `player_count` players.
    ///
    /// ```
    /// use theme_deck_core::core::PlayerId;
    /// use theme_deck_core::effects::Target;
    ///
    /// let foes = Target::Opponent.resolve(PlayerId::new(1), 3);
    /// assert_eq!(foes.as_slice(), &[PlayerId::new(0), PlayerId::new(2)]);
    /// ```
    #[must_use]
    pub fn resolve(self, actor: PlayerId, player_count: usize) -> Targets {
        match self {
            Target::Actor => {
                let mut targets = Targets::new();
                targets.push(actor);
                targets
            }
            Target::Opponent => PlayerId::all(player_count).filter(|&p| p != actor).collect(),
            Target::All => PlayerId::all(player_count).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor() {
        let targets = Target::Actor.resolve(PlayerId::new(2), 4);
        assert_eq!(targets.as_slice(), &[PlayerId::new(2)]);
    }

    #[test]
    fn test_opponent_solo_is_empty() {
        assert!(Target::Opponent.resolve(PlayerId::new(0), 1).is_empty());
    }

    #[test]
    fn test_all_in_player_order() {
        let targets = Target::All.resolve(PlayerId::new(2), 3);
        assert_eq!(
            targets.as_slice(),
            &[PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)]
        );
    }

    #[test]
    fn test_self_serializes_as_self() {
        assert_eq!(serde_json::to_string(&Target::Actor).unwrap(), "\"self\"");
        let t: Target = serde_json::from_str("\"opponent\"").unwrap();
        assert_eq!(t, Target::Opponent);
    }
}
