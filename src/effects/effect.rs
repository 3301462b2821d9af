//! Effect definitions.
//!
//! Effects are pure data: a theme lists them on cards, pools, combos and
//! per-turn upkeep, and the engine applies them. They never run themselves.
//!
//! In theme documents each effect is an object with a `type` tag:
//!
//! ```json
//! {"type": "modify_stat", "stat": "performance", "value": 10, "target": "self"}
//! ```
//!
//! Unknown `type` strings fail deserialization, so a bad theme is rejected
//! at load time rather than halfway through a turn.

use serde::{Deserialize, Serialize};

use super::targeting::Target;
use crate::cards::{CardKind, Modifier};
use crate::core::{PoolId, ResourceId, StatId};

/// An atomic game effect.
///
/// ## Player State Effects
///
/// - `ModifyStat` / `SetStat`: change a bounded stat (clamped)
/// - `GainResource` / `LoseResource`: change a floor-zero resource
///
/// ## Hand Effects
///
/// - `DrawCards`: move cards from deck to hand
/// - `ApplyModifier`: attach a modifier to cards in hand
///
/// ## Shared Pool Effects
///
/// - `ClaimShared`: contest one unit of a shared pool; routed to the
///   arbiter rather than the effect resolver
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    ModifyStat {
        stat: StatId,
        value: i64,
        #[serde(default)]
        target: Target,
    },

    SetStat {
        stat: StatId,
        value: i64,
        #[serde(default)]
        target: Target,
    },

    GainResource {
        resource: ResourceId,
        value: i64,
        #[serde(default)]
        target: Target,
    },

    LoseResource {
        resource: ResourceId,
        value: i64,
        #[serde(default)]
        target: Target,
    },

    DrawCards {
        count: usize,
        #[serde(default)]
        target: Target,
    },

    ApplyModifier {
        modifier: Modifier,
        /// Only cards of this kind receive the modifier.
        #[serde(default)]
        kind: Option<CardKind>,
        #[serde(default)]
        target: Target,
    },

    /// The resolved targets become the claim candidates, in player order.
    ClaimShared {
        pool: PoolId,
        #[serde(default)]
        target: Target,
    },
}

impl Effect {
    /// Add `value` to a stat of the acting player.
    pub fn modify_stat(stat: impl Into<StatId>, value: i64) -> Self {
        Self::ModifyStat {
            stat: stat.into(),
            value,
            target: Target::Actor,
        }
    }

    /// Set a stat of the acting player.
    pub fn set_stat(stat: impl Into<StatId>, value: i64) -> Self {
        Self::SetStat {
            stat: stat.into(),
            value,
            target: Target::Actor,
        }
    }

    /// Give the acting player `value` of a resource.
    pub fn gain_resource(resource: impl Into<ResourceId>, value: i64) -> Self {
        Self::GainResource {
            resource: resource.into(),
            value,
            target: Target::Actor,
        }
    }

    /// Take `value` of a resource from the acting player.
    pub fn lose_resource(resource: impl Into<ResourceId>, value: i64) -> Self {
        Self::LoseResource {
            resource: resource.into(),
            value,
            target: Target::Actor,
        }
    }

    /// The acting player draws `count` cards.
    pub fn draw(count: usize) -> Self {
        Self::DrawCards {
            count,
            target: Target::Actor,
        }
    }

    /// Attach a modifier to every card in the acting player's hand.
    pub fn apply_modifier(modifier: Modifier) -> Self {
        Self::ApplyModifier {
            modifier,
            kind: None,
            target: Target::Actor,
        }
    }

    /// The acting player claims one unit of a pool.
    pub fn claim(pool: impl Into<PoolId>) -> Self {
        Self::ClaimShared {
            pool: pool.into(),
            target: Target::Actor,
        }
    }

    /// Retarget this effect (builder pattern).
    #[must_use]
    pub fn targeting(mut self, new_target: Target) -> Self {
        match &mut self {
            Self::ModifyStat { target, .. }
            | Self::SetStat { target, .. }
            | Self::GainResource { target, .. }
            | Self::LoseResource { target, .. }
            | Self::DrawCards { target, .. }
            | Self::ApplyModifier { target, .. }
            | Self::ClaimShared { target, .. } => *target = new_target,
        }
        self
    }

    /// Restrict an `ApplyModifier` effect to one card kind (builder pattern).
    #[must_use]
    pub fn only_kind(mut self, card_kind: CardKind) -> Self {
        if let Self::ApplyModifier { kind, .. } = &mut self {
            *kind = Some(card_kind);
        }
        self
    }

    /// Who this effect is aimed at.
    #[must_use]
    pub fn target(&self) -> Target {
        match self {
            Self::ModifyStat { target, .. }
            | Self::SetStat { target, .. }
            | Self::GainResource { target, .. }
            | Self::LoseResource { target, .. }
            | Self::DrawCards { target, .. }
            | Self::ApplyModifier { target, .. }
            | Self::ClaimShared { target, .. } => *target,
        }
    }

    /// The `type` tag this effect carries in theme documents.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ModifyStat { .. } => "modify_stat",
            Self::SetStat { .. } => "set_stat",
            Self::GainResource { .. } => "gain_resource",
            Self::LoseResource { .. } => "lose_resource",
            Self::DrawCards { .. } => "draw_cards",
            Self::ApplyModifier { .. } => "apply_modifier",
            Self::ClaimShared { .. } => "claim_shared",
        }
    }

    /// Copy of this effect with its magnitude raised by `boost`.
    ///
    /// Applies to stat deltas and resource gains/losses; other effects are
    /// returned unchanged. A negative stat delta grows more negative. A
    /// negative boost shrinks the magnitude down to zero, never past it, so
    /// the effect keeps its direction.
    #[must_use]
    pub fn boosted(&self, boost: i64) -> Self {
        if boost == 0 {
            return self.clone();
        }
        let mut effect = self.clone();
        match &mut effect {
            Self::ModifyStat { value, .. } => {
                *value = if *value < 0 {
                    value.saturating_sub(boost).min(0)
                } else {
                    value.saturating_add(boost).max(0)
                };
            }
            Self::GainResource { value, .. } | Self::LoseResource { value, .. } => {
                *value = value.saturating_add(boost).max(0);
            }
            _ => {}
        }
        effect
    }
}
