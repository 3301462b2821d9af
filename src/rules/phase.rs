//! Turn phases.
//!
//! ```text
//! setup → draw → main → action → resolve → end ─┐
//!           ▲                                   │
//!           └───────────── next turn ───────────┘
//!                    (any phase) → game_over
//! ```
//!
//! `setup` is only visited while a session is being built. `game_over` is
//! terminal.

use serde::{Deserialize, Serialize};

/// A phase of the turn cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Draw,
    Main,
    Action,
    Resolve,
    End,
    GameOver,
}

impl Phase {
    /// The phase that follows this one in the normal cycle.
    ///
    /// `End` wraps to `Draw` (a new turn). `GameOver` stays put.
    #[must_use]
    pub const fn next(self) -> Phase {
        match self {
            Phase::Setup => Phase::Draw,
            Phase::Draw => Phase::Main,
            Phase::Main => Phase::Action,
            Phase::Action => Phase::Resolve,
            Phase::Resolve => Phase::End,
            Phase::End => Phase::Draw,
            Phase::GameOver => Phase::GameOver,
        }
    }

    /// Cards may be played or discarded.
    #[must_use]
    pub const fn allows_card_play(self) -> bool {
        matches!(self, Phase::Main | Phase::Action)
    }

    /// Players may claim or queue claims on shared pools.
    #[must_use]
    pub const fn allows_claims(self) -> bool {
        matches!(self, Phase::Action)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver)
    }

    /// Lowercase name used in events and messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Draw => "draw",
            Phase::Main => "main",
            Phase::Action => "action",
            Phase::Resolve => "resolve",
            Phase::End => "end",
            Phase::GameOver => "game_over",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle() {
        let mut phase = Phase::Setup;
        let mut seen = Vec::new();
        for _ in 0..7 {
            phase = phase.next();
            seen.push(phase);
        }

        assert_eq!(
            seen,
            vec![
                Phase::Draw,
                Phase::Main,
                Phase::Action,
                Phase::Resolve,
                Phase::End,
                Phase::Draw,
                Phase::Main,
            ]
        );
    }

    #[test]
    fn test_game_over_is_terminal() {
        assert_eq!(Phase::GameOver.next(), Phase::GameOver);
        assert!(Phase::GameOver.is_terminal());
        assert!(!Phase::GameOver.allows_card_play());
    }

    #[test]
    fn test_permissions() {
        assert!(Phase::Main.allows_card_play());
        assert!(Phase::Action.allows_card_play());
        assert!(!Phase::Resolve.allows_card_play());
        assert!(!Phase::Draw.allows_card_play());

        assert!(Phase::Action.allows_claims());
        assert!(!Phase::Main.allows_claims());
    }

    #[test]
    fn test_display() {
        assert_eq!(Phase::GameOver.to_string(), "game_over");
        assert_eq!(Phase::Main.to_string(), "main");
    }
}
