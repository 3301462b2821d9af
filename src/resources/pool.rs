//! Shared pool definitions and state.

use serde::{Deserialize, Serialize};

use crate::core::{PoolId, StatId};
use crate::effects::Effect;

/// How a contested claim picks its winner.
///
/// Rules apply in declared order, each narrowing the candidate field.
/// `MinStat` is a filter applied before any other rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaimRule {
    /// Keep the candidates sharing the greatest value of `stat`.
    HighestStat { stat: StatId },
    /// Keep the earliest candidate.
    FirstCome,
    /// Keep one candidate chosen with the session RNG.
    Random,
    /// Only candidates with `stat >= min` may claim at all.
    MinStat { stat: StatId, min: i64 },
}

/// A finite, optionally renewable resource every player contests.
///
/// ```json
/// {"id": "parking", "name": "Parking Spot", "total_amount": 3,
///  "renewable": true, "renewal_interval": 5, "renewal_amount": 1,
///  "claim_rules": [{"type": "highest_stat", "stat": "seniority"}]}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedResourceDefinition {
    pub id: PoolId,

    #[serde(default)]
    pub name: String,

    pub total_amount: i64,

    #[serde(default)]
    pub renewable: bool,

    /// Turns between renewals.
    #[serde(default)]
    pub renewal_interval: u32,

    /// Units restored per renewal, capped at `total_amount`.
    #[serde(default)]
    pub renewal_amount: i64,

    #[serde(default)]
    pub claim_rules: Vec<ClaimRule>,

    /// Applied to the winner of each claim.
    #[serde(default)]
    pub claim_effects: Vec<Effect>,
}

impl SharedResourceDefinition {
    /// Create a non-renewable pool with no claim rules.
    pub fn new(id: impl Into<PoolId>, total_amount: i64) -> Self {
        let id = id.into();
        Self {
            name: id.as_str().to_string(),
            id,
            total_amount,
            renewable: false,
            renewal_interval: 0,
            renewal_amount: 0,
            claim_rules: Vec::new(),
            claim_effects: Vec::new(),
        }
    }

    /// Restore `amount` units every `interval` turns (builder pattern).
    #[must_use]
    pub fn renewable(mut self, interval: u32, amount: i64) -> Self {
        self.renewable = true;
        self.renewal_interval = interval;
        self.renewal_amount = amount;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: ClaimRule) -> Self {
        self.claim_rules.push(rule);
        self
    }

    #[must_use]
    pub fn with_claim_effect(mut self, effect: Effect) -> Self {
        self.claim_effects.push(effect);
        self
    }

    /// Eligibility filters, in declared order.
    pub fn filters(&self) -> impl Iterator<Item = (&StatId, i64)> {
        self.claim_rules.iter().filter_map(|rule| match rule {
            ClaimRule::MinStat { stat, min } => Some((stat, *min)),
            _ => None,
        })
    }
}

/// Live state of one pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolState {
    /// Units left to claim. Always within `[0, total_amount]`.
    pub remaining: i64,

    /// Turns until the next renewal. Unused for non-renewable pools.
    pub turns_until_renewal: u32,
}

impl PoolState {
    /// A full pool with a fresh renewal countdown.
    #[must_use]
    pub fn full(definition: &SharedResourceDefinition) -> Self {
        Self {
            remaining: definition.total_amount,
            turns_until_renewal: definition.renewal_interval,
        }
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0
    }
}
