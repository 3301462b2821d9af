//! Shared Resource Arbiter.
//!
//! Decides who gets a unit of a contested pool and keeps pools in range.
//!
//! ## Contest
//!
//! 1. `min_stat` filters drop ineligible candidates.
//! 2. The remaining rules narrow the field in declared order:
//!    `highest_stat` keeps every candidate tied for the top value,
//!    `first_come` keeps the earliest, `random` keeps one drawn from the
//!    session RNG (only drawn when more than one candidate is left).
//! 3. The first candidate still standing wins. With no rules this makes
//!    the first requester the winner.
//!
//! A successful claim takes one unit and applies the pool's claim effects
//! to the winner. Losing candidates, and every candidate of an exhausted
//! pool, leave the session untouched.
//!
//! ## Renewal
//!
//! `tick_renewals` runs once per turn. Each renewable pool counts down
//! and, on reaching zero, restores `renewal_amount` units (capped at the
//! total) and restarts the countdown.

use log::debug;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::pool::{ClaimRule, SharedResourceDefinition};
use crate::core::{InvariantViolation, PlayError, PlayerId, PoolId, Result, SessionState, Theme};
use crate::effects::{EffectOutcome, EffectResolver, ResolverContext};

/// A claim queued during the action phase.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub pool: PoolId,
    pub player: PlayerId,
}

/// Result of one contest for one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub pool: PoolId,
    /// `None` when the pool was empty or no candidate was eligible.
    pub winner: Option<PlayerId>,
    /// Units left after the contest.
    pub remaining: i64,
    /// Claim effects applied to the winner, in declared order.
    pub effects: Vec<EffectOutcome>,
}

/// Host-level claim result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimResult {
    Claimed(ClaimOutcome),
    Rejected(PlayError),
}

impl ClaimResult {
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        matches!(self, ClaimResult::Claimed(_))
    }

    #[must_use]
    pub fn error(&self) -> Option<&PlayError> {
        match self {
            ClaimResult::Rejected(err) => Some(err),
            ClaimResult::Claimed(_) => None,
        }
    }
}

/// A pool that regenerated this tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Renewal {
    pub pool: PoolId,
    /// Units actually restored after capping at the total.
    pub restored: i64,
    pub remaining: i64,
}

/// Arbitrates claims on shared pools.
pub struct SharedResourceArbiter;

impl SharedResourceArbiter {
    /// Why `player` cannot claim from `pool` right now, if anything.
    ///
    /// Returns the pool's index when the claim may go ahead.
    pub fn check_claim(
        theme: &Theme,
        state: &SessionState,
        pool: &PoolId,
        player: PlayerId,
    ) -> std::result::Result<usize, PlayError> {
        if !state.players.contains(player) {
            return Err(PlayError::UnknownPlayer(player));
        }
        let index = theme
            .pool_index(pool)
            .ok_or_else(|| PlayError::UnknownPool(pool.clone()))?;
        if state.pools[index].is_exhausted() {
            return Err(PlayError::PoolExhausted(pool.clone()));
        }
        if !Self::is_eligible(&theme.pools()[index], state, player) {
            return Err(PlayError::NotEligible {
                pool: pool.clone(),
                player,
            });
        }
        Ok(index)
    }

    /// Single claim request: a contest with one candidate.
    pub fn claim(ctx: &ResolverContext<'_>, state: &mut SessionState, pool: &PoolId, player: PlayerId) -> Result<bool> {
        let outcome = Self::contest(ctx, state, pool, &[player])?;
        Ok(outcome.winner.is_some())
    }

    /// Contest one unit of `pool` among `candidates` (in request order).
    pub fn contest(
        ctx: &ResolverContext<'_>,
        state: &mut SessionState,
        pool: &PoolId,
        candidates: &[PlayerId],
    ) -> Result<ClaimOutcome> {
        let index = ctx
            .theme
            .pool_index(pool)
            .ok_or_else(|| InvariantViolation::UndeclaredPool(pool.clone()))?;
        let definition = &ctx.theme.pools()[index];

        let winner = if state.pools[index].is_exhausted() {
            None
        } else {
            Self::select(definition, state, candidates)
        };

        let Some(winner) = winner else {
            debug!("claim on {pool}: no winner among {} candidate(s)", candidates.len());
            return Ok(ClaimOutcome {
                pool: pool.clone(),
                winner: None,
                remaining: state.pools[index].remaining,
                effects: Vec::new(),
            });
        };

        state.pools[index].remaining -= 1;
        Self::check_pool(definition, state.pools[index].remaining)?;
        let effects = EffectResolver::apply_all(ctx, &definition.claim_effects, winner, &mut state.players)?;

        let remaining = state.pools[index].remaining;
        debug!("claim on {pool}: {winner} wins, {remaining} left");
        Ok(ClaimOutcome {
            pool: pool.clone(),
            winner: Some(winner),
            remaining,
            effects,
        })
    }

    /// Arbitrate every queued claim, pool by pool.
    ///
    /// Pools are handled in order of their first request. Each pool runs
    /// contests among its requesters, in request order, until every
    /// requester has a unit or no winner can be found; the last outcome of
    /// a pool reports the unserved requesters with `winner: None`.
    pub fn resolve_pending(ctx: &ResolverContext<'_>, state: &mut SessionState) -> Result<Vec<ClaimOutcome>> {
        let requests = std::mem::take(&mut state.pending_claims);

        let mut pools: Vec<(PoolId, Vec<PlayerId>)> = Vec::new();
        for request in requests {
            match pools.iter_mut().find(|(pool, _)| *pool == request.pool) {
                Some((_, players)) => players.push(request.player),
                None => pools.push((request.pool, vec![request.player])),
            }
        }

        let mut outcomes = Vec::new();
        for (pool, mut candidates) in pools {
            while !candidates.is_empty() {
                let outcome = Self::contest(ctx, state, &pool, &candidates)?;
                let winner = outcome.winner;
                outcomes.push(outcome);
                match winner {
                    Some(winner) => candidates.retain(|&p| p != winner),
                    None => break,
                }
            }
        }
        Ok(outcomes)
    }

    /// Advance every renewable pool's countdown by one turn.
    pub fn tick_renewals(ctx: &ResolverContext<'_>, state: &mut SessionState) -> Result<SmallVec<[Renewal; 2]>> {
        let mut renewals = SmallVec::new();

        for (definition, pool) in ctx.theme.pools().iter().zip(state.pools.iter_mut()) {
            if !definition.renewable {
                continue;
            }
            pool.turns_until_renewal = pool.turns_until_renewal.saturating_sub(1);
            if pool.turns_until_renewal > 0 {
                continue;
            }

            let before = pool.remaining;
            pool.remaining = pool.remaining.saturating_add(definition.renewal_amount).min(definition.total_amount);
            pool.turns_until_renewal = definition.renewal_interval;
            Self::check_pool(definition, pool.remaining)?;

            debug!("{} renewed: {before} -> {}", definition.id, pool.remaining);
            renewals.push(Renewal {
                pool: definition.id.clone(),
                restored: pool.remaining - before,
                remaining: pool.remaining,
            });
        }
        Ok(renewals)
    }

    /// Check every pool against `[0, total_amount]`.
    pub fn check_pools(theme: &Theme, state: &SessionState) -> Result<()> {
        for (definition, pool) in theme.pools().iter().zip(&state.pools) {
            Self::check_pool(definition, pool.remaining)?;
        }
        Ok(())
    }

    fn check_pool(definition: &SharedResourceDefinition, remaining: i64) -> Result<()> {
        if remaining < 0 || remaining > definition.total_amount {
            return Err(InvariantViolation::PoolOutOfBounds {
                pool: definition.id.clone(),
                remaining,
                total: definition.total_amount,
            }
            .into());
        }
        Ok(())
    }

    fn is_eligible(definition: &SharedResourceDefinition, state: &SessionState, player: PlayerId) -> bool {
        let Some(player) = state.players.get(player) else {
            return false;
        };
        definition
            .filters()
            .all(|(stat, min)| player.stat(stat).is_some_and(|value| value >= min))
    }

    fn select(definition: &SharedResourceDefinition, state: &mut SessionState, candidates: &[PlayerId]) -> Option<PlayerId> {
        let mut field: SmallVec<[PlayerId; 4]> = SmallVec::new();
        for &candidate in candidates {
            if !field.contains(&candidate) && Self::is_eligible(definition, state, candidate) {
                field.push(candidate);
            }
        }

        for rule in &definition.claim_rules {
            if field.len() <= 1 {
                break;
            }
            match rule {
                ClaimRule::HighestStat { stat } => {
                    let value_of = |p: PlayerId| state.players[p].stat(stat).unwrap_or(i64::MIN);
                    let best = field.iter().map(|&p| value_of(p)).max().unwrap_or(i64::MIN);
                    field.retain(|p| value_of(*p) == best);
                }
                ClaimRule::FirstCome => field.truncate(1),
                ClaimRule::Random => {
                    if let Some(pick) = state.rng.choose_index(field.len()) {
                        let chosen = field[pick];
                        field.clear();
                        field.push(chosen);
                    }
                }
                ClaimRule::MinStat { .. } => {}
            }
        }

        field.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SessionSettings, StatDefinition, StatId, ThemeConfig};
    use crate::effects::Effect;

    fn theme(pool: SharedResourceDefinition) -> Theme {
        Theme::new(
            ThemeConfig::new("office")
                .with_stat(StatDefinition::new("seniority", 0))
                .with_stat(StatDefinition::new("performance", 50))
                .with_shared_resource(pool),
        )
        .unwrap()
    }

    fn state(theme: &Theme, players: usize) -> SessionState {
        SessionState::new(theme, &SessionSettings::new(players)).unwrap()
    }

    fn set_seniority(state: &mut SessionState, player: u8, value: i64) {
        state.players[PlayerId::new(player)]
            .stats
            .insert(StatId::new("seniority"), value);
    }

    fn p(id: u8) -> PlayerId {
        PlayerId::new(id)
    }

    #[test]
    fn test_highest_stat_wins() {
        let theme = theme(
            SharedResourceDefinition::new("parking", 1)
                .with_rule(ClaimRule::HighestStat { stat: StatId::new("seniority") }),
        );
        let ctx = ResolverContext::new(&theme);
        let mut state = state(&theme, 2);
        set_seniority(&mut state, 0, 80);
        set_seniority(&mut state, 1, 95);

        let outcome = SharedResourceArbiter::contest(&ctx, &mut state, &PoolId::new("parking"), &[p(0), p(1)]).unwrap();

        assert_eq!(outcome.winner, Some(p(1)));
        assert_eq!(outcome.remaining, 0);
        assert!(!SharedResourceArbiter::claim(&ctx, &mut state, &PoolId::new("parking"), p(0)).unwrap());
    }

    #[test]
    fn test_tie_falls_to_first_listed() {
        let theme = theme(
            SharedResourceDefinition::new("parking", 1)
                .with_rule(ClaimRule::HighestStat { stat: StatId::new("seniority") }),
        );
        let ctx = ResolverContext::new(&theme);
        let mut state = state(&theme, 3);
        set_seniority(&mut state, 0, 10);
        set_seniority(&mut state, 1, 90);
        set_seniority(&mut state, 2, 90);

        let outcome =
            SharedResourceArbiter::contest(&ctx, &mut state, &PoolId::new("parking"), &[p(2), p(0), p(1)]).unwrap();
        assert_eq!(outcome.winner, Some(p(2)));
    }

    #[test]
    fn test_no_rules_is_first_come() {
        let theme = theme(SharedResourceDefinition::new("printer", 2));
        let ctx = ResolverContext::new(&theme);
        let mut state = state(&theme, 3);

        let outcome =
            SharedResourceArbiter::contest(&ctx, &mut state, &PoolId::new("printer"), &[p(1), p(0)]).unwrap();
        assert_eq!(outcome.winner, Some(p(1)));
    }

    #[test]
    fn test_min_stat_filters() {
        let theme = theme(
            SharedResourceDefinition::new("office", 1)
                .with_rule(ClaimRule::MinStat { stat: StatId::new("seniority"), min: 5 }),
        );
        let ctx = ResolverContext::new(&theme);
        let mut state = state(&theme, 2);
        set_seniority(&mut state, 1, 5);

        let outcome =
            SharedResourceArbiter::contest(&ctx, &mut state, &PoolId::new("office"), &[p(0), p(1)]).unwrap();
        assert_eq!(outcome.winner, Some(p(1)));

        assert_eq!(
            SharedResourceArbiter::check_claim(&theme, &state, &PoolId::new("office"), p(0)),
            Err(PlayError::PoolExhausted(PoolId::new("office")))
        );
    }

    #[test]
    fn test_check_claim_errors() {
        let theme = theme(
            SharedResourceDefinition::new("office", 1)
                .with_rule(ClaimRule::MinStat { stat: StatId::new("seniority"), min: 5 }),
        );
        let state = state(&theme, 1);

        assert_eq!(
            SharedResourceArbiter::check_claim(&theme, &state, &PoolId::new("desk"), p(0)),
            Err(PlayError::UnknownPool(PoolId::new("desk")))
        );
        assert_eq!(
            SharedResourceArbiter::check_claim(&theme, &state, &PoolId::new("office"), p(0)),
            Err(PlayError::NotEligible { pool: PoolId::new("office"), player: p(0) })
        );
        assert_eq!(
            SharedResourceArbiter::check_claim(&theme, &state, &PoolId::new("office"), p(4)),
            Err(PlayError::UnknownPlayer(p(4)))
        );
    }

    #[test]
    fn test_random_is_seeded() {
        let theme = theme(SharedResourceDefinition::new("lottery", 1).with_rule(ClaimRule::Random));
        let ctx = ResolverContext::new(&theme);

        let winners: Vec<_> = (0..2)
            .map(|_| {
                let mut state = state(&theme, 4);
                SharedResourceArbiter::contest(&ctx, &mut state, &PoolId::new("lottery"), &[p(0), p(1), p(2), p(3)])
                    .unwrap()
                    .winner
            })
            .collect();

        assert!(winners[0].is_some());
        assert_eq!(winners[0], winners[1]);
    }

    #[test]
    fn test_claim_effects_apply_to_winner() {
        let theme = theme(
            SharedResourceDefinition::new("parking", 1).with_claim_effect(Effect::modify_stat("performance", 5)),
        );
        let ctx = ResolverContext::new(&theme);
        let mut state = state(&theme, 2);

        let outcome = SharedResourceArbiter::contest(&ctx, &mut state, &PoolId::new("parking"), &[p(1)]).unwrap();

        assert_eq!(outcome.effects.len(), 1);
        let performance = StatId::new("performance");
        assert_eq!(state.players[p(1)].stat(&performance), Some(55));
        assert_eq!(state.players[p(0)].stat(&performance), Some(50));
    }

    #[test]
    fn test_renewal_cycle() {
        let theme = theme(SharedResourceDefinition::new("parking", 3).renewable(5, 1));
        let ctx = ResolverContext::new(&theme);
        let mut state = state(&theme, 1);
        let pool = PoolId::new("parking");

        for _ in 0..3 {
            assert!(SharedResourceArbiter::claim(&ctx, &mut state, &pool, p(0)).unwrap());
        }
        assert_eq!(state.pools[0].remaining, 0);

        for _ in 0..4 {
            assert!(SharedResourceArbiter::tick_renewals(&ctx, &mut state).unwrap().is_empty());
        }
        let renewals = SharedResourceArbiter::tick_renewals(&ctx, &mut state).unwrap();

        assert_eq!(renewals.len(), 1);
        assert_eq!(renewals[0].restored, 1);
        assert_eq!(state.pools[0].remaining, 1);
    }

    #[test]
    fn test_renewal_caps_at_total() {
        let theme = theme(SharedResourceDefinition::new("parking", 3).renewable(1, 2));
        let ctx = ResolverContext::new(&theme);
        let mut state = state(&theme, 1);

        SharedResourceArbiter::claim(&ctx, &mut state, &PoolId::new("parking"), p(0)).unwrap();
        let renewals = SharedResourceArbiter::tick_renewals(&ctx, &mut state).unwrap();

        assert_eq!(renewals[0].restored, 1);
        assert_eq!(state.pools[0].remaining, 3);
    }

    #[test]
    fn test_huge_renewal_saturates() {
        let theme = theme(SharedResourceDefinition::new("parking", 3).renewable(1, i64::MAX));
        let ctx = ResolverContext::new(&theme);
        let mut state = state(&theme, 1);

        SharedResourceArbiter::claim(&ctx, &mut state, &PoolId::new("parking"), p(0)).unwrap();
        let renewals = SharedResourceArbiter::tick_renewals(&ctx, &mut state).unwrap();

        assert_eq!(renewals[0].restored, 1);
        assert_eq!(state.pools[0].remaining, 3);

        // Full pools tick without overflowing too.
        let renewals = SharedResourceArbiter::tick_renewals(&ctx, &mut state).unwrap();
        assert_eq!(renewals[0].restored, 0);
        assert_eq!(state.pools[0].remaining, 3);
    }

    #[test]
    fn test_non_renewable_stays_empty() {
        let theme = theme(SharedResourceDefinition::new("bonus", 1));
        let ctx = ResolverContext::new(&theme);
        let mut state = state(&theme, 1);

        SharedResourceArbiter::claim(&ctx, &mut state, &PoolId::new("bonus"), p(0)).unwrap();
        for _ in 0..20 {
            SharedResourceArbiter::tick_renewals(&ctx, &mut state).unwrap();
        }
        assert_eq!(state.pools[0].remaining, 0);
    }

    #[test]
    fn test_resolve_pending_in_request_order() {
        let theme = theme(SharedResourceDefinition::new("printer", 2));
        let ctx = ResolverContext::new(&theme);
        let mut state = state(&theme, 3);
        for player in [2, 0, 1] {
            state.pending_claims.push(ClaimRequest {
                pool: PoolId::new("printer"),
                player: p(player),
            });
        }

        let outcomes = SharedResourceArbiter::resolve_pending(&ctx, &mut state).unwrap();
        let winners: Vec<_> = outcomes.iter().map(|o| o.winner).collect();

        assert_eq!(winners, vec![Some(p(2)), Some(p(0)), None]);
        assert!(state.pending_claims.is_empty());
        assert_eq!(state.pools[0].remaining, 0);
    }
}
