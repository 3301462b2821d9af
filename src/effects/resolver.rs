//! Effect resolution - applying effects to player state.
//!
//! The `EffectResolver` applies one effect at a time to every player the
//! effect targets. Requested changes that would leave a stat or resource
//! out of range are clamped, never rejected. After each change the new
//! value is re-checked against its declared bounds; a value that still
//! falls outside them means the resolver is broken, and the caller rolls
//! the whole action back.
//!
//! Shared pool claims are not resolved here. `ClaimShared` belongs to the
//! arbiter, and handing one to the resolver is a configuration error.

use log::debug;
use smallvec::SmallVec;

use crate::cards::{CardKind, Modifier};
use crate::core::{
    ConfigError, InvariantViolation, PlayerId, PlayerMap, PlayerState, ResourceId, Result, StatId, Theme,
};

use super::Effect;

/// Context for resolving effects: the theme the session runs.
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    pub theme: &'a Theme,
}

impl<'a> ResolverContext<'a> {
    #[must_use]
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

/// What a stat or resource change touched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKey {
    Stat(StatId),
    Resource(ResourceId),
}

/// One clamped change to one player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueChange {
    pub player: PlayerId,
    pub key: ChangeKey,
    /// Delta the effect asked for.
    pub requested: i64,
    /// Delta actually applied after clamping.
    pub applied: i64,
    /// Value after the change.
    pub value: i64,
}

impl ValueChange {
    /// Was the requested change cut short by a bound?
    #[must_use]
    pub fn was_clamped(&self) -> bool {
        self.requested != self.applied
    }
}

/// Everything one effect did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectOutcome {
    pub changes: SmallVec<[ValueChange; 4]>,
    /// Cards moved from deck to hand, summed over targets.
    pub cards_drawn: usize,
    /// Hand cards that received a modifier, summed over targets.
    pub cards_modified: usize,
}

/// Applies effects to player state.
pub struct EffectResolver;

impl EffectResolver {
    /// Apply `effect` on behalf of `actor`.
    ///
    /// Targets resolve relative to `actor` and are processed in player
    /// order.
    pub fn apply(
        ctx: &ResolverContext<'_>,
        effect: &Effect,
        actor: PlayerId,
        players: &mut PlayerMap<PlayerState>,
    ) -> Result<EffectOutcome> {
        let targets = effect.target().resolve(actor, players.player_count());
        let mut outcome = EffectOutcome::default();

        for target in targets {
            let player = &mut players[target];
            match effect {
                Effect::ModifyStat { stat, value, .. } => {
                    let current = Self::current_stat(ctx, player, stat)?;
                    let change = Self::write_stat(ctx, player, stat, current.saturating_add(*value), *value)?;
                    outcome.changes.push(change);
                }

                Effect::SetStat { stat, value, .. } => {
                    let current = Self::current_stat(ctx, player, stat)?;
                    let change = Self::write_stat(ctx, player, stat, *value, value.saturating_sub(current))?;
                    outcome.changes.push(change);
                }

                Effect::GainResource { resource, value, .. } => {
                    let current = Self::current_resource(ctx, player, resource)?;
                    let change =
                        Self::write_resource(ctx, player, resource, current.saturating_add(*value), *value)?;
                    outcome.changes.push(change);
                }

                Effect::LoseResource { resource, value, .. } => {
                    let current = Self::current_resource(ctx, player, resource)?;
                    let change =
                        Self::write_resource(ctx, player, resource, current.saturating_sub(*value), -*value)?;
                    outcome.changes.push(change);
                }

                Effect::DrawCards { count, .. } => {
                    outcome.cards_drawn += player.draw(*count);
                }

                Effect::ApplyModifier { modifier, kind, .. } => {
                    outcome.cards_modified += Self::attach_modifier(ctx, player, *modifier, *kind)?;
                }

                Effect::ClaimShared { pool, .. } => {
                    return Err(ConfigError::UnsupportedEffect {
                        effect: "claim_shared",
                        context: format!("pool {pool} must be claimed through the arbiter"),
                    }
                    .into());
                }
            }
        }

        debug!(
            "{} by {actor}: {} change(s), {} drawn, {} modified",
            effect.kind_name(),
            outcome.changes.len(),
            outcome.cards_drawn,
            outcome.cards_modified
        );
        Ok(outcome)
    }

    /// Apply effects in order. Later effects see the results of earlier ones.
    pub fn apply_all<'e>(
        ctx: &ResolverContext<'_>,
        effects: impl IntoIterator<Item = &'e Effect>,
        actor: PlayerId,
        players: &mut PlayerMap<PlayerState>,
    ) -> Result<Vec<EffectOutcome>> {
        effects
            .into_iter()
            .map(|effect| Self::apply(ctx, effect, actor, players))
            .collect()
    }

    /// Check every stat and resource of every player against its bounds.
    pub fn check_bounds(ctx: &ResolverContext<'_>, players: &PlayerMap<PlayerState>) -> Result<()> {
        for (id, player) in players.iter() {
            for stat in ctx.theme.stats() {
                if let Some(value) = player.stat(&stat.id) {
                    if value < stat.min || value > stat.max {
                        return Err(InvariantViolation::StatOutOfBounds {
                            player: id,
                            stat: stat.id.clone(),
                            value,
                            min: stat.min,
                            max: stat.max,
                        }
                        .into());
                    }
                }
            }
            for resource in ctx.theme.resources() {
                if let Some(value) = player.resource(&resource.id) {
                    Self::check_resource_value(id, &resource.id, value, resource.max)?;
                }
            }
        }
        Ok(())
    }

    fn current_stat(ctx: &ResolverContext<'_>, player: &PlayerState, stat: &StatId) -> Result<i64> {
        let definition = ctx
            .theme
            .stat(stat)
            .ok_or_else(|| InvariantViolation::UndeclaredStat(stat.clone()))?;
        Ok(player.stat(stat).unwrap_or(definition.initial))
    }

    fn current_resource(ctx: &ResolverContext<'_>, player: &PlayerState, resource: &ResourceId) -> Result<i64> {
        let definition = ctx
            .theme
            .resource(resource)
            .ok_or_else(|| InvariantViolation::UndeclaredResource(resource.clone()))?;
        Ok(player.resource(resource).unwrap_or(definition.initial))
    }

    fn write_stat(
        ctx: &ResolverContext<'_>,
        player: &mut PlayerState,
        stat: &StatId,
        raw: i64,
        requested: i64,
    ) -> Result<ValueChange> {
        let definition = ctx
            .theme
            .stat(stat)
            .ok_or_else(|| InvariantViolation::UndeclaredStat(stat.clone()))?;
        let before = player.stat(stat).unwrap_or(definition.initial);
        let value = definition.clamp(raw);

        if value < definition.min || value > definition.max {
            return Err(InvariantViolation::StatOutOfBounds {
                player: player.id,
                stat: stat.clone(),
                value,
                min: definition.min,
                max: definition.max,
            }
            .into());
        }

        player.stats.insert(stat.clone(), value);
        Ok(ValueChange {
            player: player.id,
            key: ChangeKey::Stat(stat.clone()),
            requested,
            applied: value - before,
            value,
        })
    }

    fn write_resource(
        ctx: &ResolverContext<'_>,
        player: &mut PlayerState,
        resource: &ResourceId,
        raw: i64,
        requested: i64,
    ) -> Result<ValueChange> {
        let definition = ctx
            .theme
            .resource(resource)
            .ok_or_else(|| InvariantViolation::UndeclaredResource(resource.clone()))?;
        let before = player.resource(resource).unwrap_or(definition.initial);
        let value = definition.clamp(raw);

        Self::check_resource_value(player.id, resource, value, definition.max)?;

        player.resources.insert(resource.clone(), value);
        Ok(ValueChange {
            player: player.id,
            key: ChangeKey::Resource(resource.clone()),
            requested,
            applied: value - before,
            value,
        })
    }

    fn check_resource_value(
        player: PlayerId,
        resource: &ResourceId,
        value: i64,
        max: Option<i64>,
    ) -> std::result::Result<(), InvariantViolation> {
        if value < 0 {
            return Err(InvariantViolation::NegativeResource {
                player,
                resource: resource.clone(),
                value,
            });
        }
        if let Some(max) = max {
            if value > max {
                return Err(InvariantViolation::ResourceAboveMax {
                    player,
                    resource: resource.clone(),
                    value,
                    max,
                });
            }
        }
        Ok(())
    }

    fn attach_modifier(
        ctx: &ResolverContext<'_>,
        player: &mut PlayerState,
        modifier: Modifier,
        kind: Option<CardKind>,
    ) -> Result<usize> {
        let mut modified = 0;
        for card in player.hand.iter_mut() {
            if let Some(kind) = kind {
                let definition = ctx
                    .theme
                    .card(&card.card)
                    .ok_or_else(|| InvariantViolation::UndefinedCard(card.card.clone()))?;
                if definition.kind != kind {
                    continue;
                }
            }
            card.add_modifier(modifier);
            modified += 1;
        }
        Ok(modified)
    }
}
