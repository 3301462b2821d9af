//! Win/loss conditions and end reasons.
//!
//! Conditions are checked after every completed action. The first match
//! (conditions in declared order, players in player order) ends the game.
//! A condition says whether it means victory or defeat for the player who
//! meets it; the turn ceiling is a separate end reason.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, PlayerMap, PlayerState, ResourceId, StatId};

/// What a condition measures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionKind {
    StatThreshold { stat: StatId },
    ResourceThreshold { resource: ResourceId },
}

/// How the measured value is compared with the threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = ">")]
    Above,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = "<")]
    Below,
    #[serde(rename = "==")]
    Equal,
}

impl Comparison {
    #[must_use]
    pub fn holds(self, value: i64, threshold: i64) -> bool {
        match self {
            Comparison::AtLeast => value >= threshold,
            Comparison::Above => value > threshold,
            Comparison::AtMost => value <= threshold,
            Comparison::Below => value < threshold,
            Comparison::Equal => value == threshold,
        }
    }
}

/// What meeting a condition means for the player who met it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Victory,
    Defeat,
}

/// A theme-authored end condition.
///
/// ```json
/// {"type": "stat_threshold", "stat": "performance", "comparison": ">=", "threshold": 100}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinCondition {
    #[serde(flatten)]
    pub kind: ConditionKind,

    pub comparison: Comparison,

    pub threshold: i64,

    #[serde(default)]
    pub outcome: Outcome,

    /// Host-facing description, e.g. "Promoted!".
    #[serde(default)]
    pub label: Option<String>,
}

impl WinCondition {
    /// A victory condition on a stat.
    pub fn stat(stat: impl Into<StatId>, comparison: Comparison, threshold: i64) -> Self {
        Self {
            kind: ConditionKind::StatThreshold { stat: stat.into() },
            comparison,
            threshold,
            outcome: Outcome::Victory,
            label: None,
        }
    }

    /// A victory condition on a resource.
    pub fn resource(resource: impl Into<ResourceId>, comparison: Comparison, threshold: i64) -> Self {
        Self {
            kind: ConditionKind::ResourceThreshold {
                resource: resource.into(),
            },
            comparison,
            threshold,
            outcome: Outcome::Victory,
            label: None,
        }
    }

    /// Mark as a defeat condition (builder pattern).
    #[must_use]
    pub fn as_defeat(mut self) -> Self {
        self.outcome = Outcome::Defeat;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Does `player` currently meet this condition?
    #[must_use]
    pub fn is_met_by(&self, player: &PlayerState) -> bool {
        let value = match &self.kind {
            ConditionKind::StatThreshold { stat } => player.stat(stat),
            ConditionKind::ResourceThreshold { resource } => player.resource(resource),
        };
        value.is_some_and(|v| self.comparison.holds(v, self.threshold))
    }
}

/// Why a session ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// A theme condition fired.
    Condition {
        /// Index into the theme's win condition list.
        index: usize,
        player: PlayerId,
        outcome: Outcome,
    },
    /// The turn ceiling was reached.
    TurnLimit { turns: u32 },
}

impl EndReason {
    /// The player who won, if the game ended in a victory.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            EndReason::Condition {
                player,
                outcome: Outcome::Victory,
                ..
            } => Some(*player),
            _ => None,
        }
    }
}

/// Find the first condition met by any player.
#[must_use]
pub fn evaluate(conditions: &[WinCondition], players: &PlayerMap<PlayerState>) -> Option<EndReason> {
    conditions.iter().enumerate().find_map(|(index, condition)| {
        players
            .iter()
            .find(|(_, state)| condition.is_met_by(state))
            .map(|(player, _)| EndReason::Condition {
                index,
                player,
                outcome: condition.outcome,
            })
    })
}
