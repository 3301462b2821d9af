//! Card Resolution Engine.
//!
//! Playing a card goes through two stages:
//!
//! 1. **Checks**, in order, before anything changes: the game is not over,
//!    the phase allows plays, the player exists, the copy is in their hand,
//!    and they hold the effective cost.
//! 2. **Resolution**: pay the cost, apply the card's effects in declared
//!    order (shared pool claims go to the arbiter), move the copy to the
//!    played pile and record the play for combo detection.
//!
//! A failed check is routine and comes back as `PlayResult::Rejected`.
//! An error during resolution restores the session state as it was before
//! the call.

use log::{debug, warn};

use super::definition::{CardDefinition, Cost};
use super::instance::{CardState, InstanceId};
use crate::core::{CardId, InvariantViolation, PlayError, PlayerId, Result, SessionState};
use crate::effects::{Effect, EffectOutcome, EffectResolver, ResolverContext};
use crate::resources::{ClaimOutcome, SharedResourceArbiter};

/// What a successful play did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayReport {
    pub player: PlayerId,
    pub instance: InstanceId,
    pub card: CardId,
    /// Cost actually paid, after modifiers.
    pub cost_paid: Option<Cost>,
    /// One outcome per non-claim effect, in declared order.
    pub effects: Vec<EffectOutcome>,
    /// One outcome per claim effect, in declared order.
    pub claims: Vec<ClaimOutcome>,
}

/// Result of asking to play a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayResult {
    Played(PlayReport),
    Rejected(PlayError),
}

impl PlayResult {
    #[must_use]
    pub fn is_played(&self) -> bool {
        matches!(self, PlayResult::Played(_))
    }

    #[must_use]
    pub fn report(&self) -> Option<&PlayReport> {
        match self {
            PlayResult::Played(report) => Some(report),
            PlayResult::Rejected(_) => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&PlayError> {
        match self {
            PlayResult::Rejected(err) => Some(err),
            PlayResult::Played(_) => None,
        }
    }
}

/// Result of asking to discard a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiscardResult {
    Discarded { card: CardId },
    Rejected(PlayError),
}

/// Play a card from `player`'s hand.
pub fn play_card(
    ctx: &ResolverContext<'_>,
    state: &mut SessionState,
    player: PlayerId,
    instance: InstanceId,
) -> Result<PlayResult> {
    let card_id = match check_in_hand(state, player, instance, "playing cards") {
        Ok(card) => card,
        Err(err) => return Ok(reject(err)),
    };
    let definition = ctx
        .theme
        .card(&card_id)
        .ok_or_else(|| InvariantViolation::UndefinedCard(card_id.clone()))?;

    let cost = effective_cost(definition, state, player, instance);
    if let Some(cost) = &cost {
        let available = state.players[player].resource(&cost.resource).unwrap_or(0);
        if available < cost.amount {
            return Ok(reject(PlayError::InsufficientResource {
                resource: cost.resource.clone(),
                required: cost.amount,
                available,
            }));
        }
    }

    let report = state.transact(|s| resolve(ctx, s, definition, player, instance, cost))?;
    debug!("{player} played {} ({instance})", report.card);
    Ok(PlayResult::Played(report))
}

/// Discard a card from `player`'s hand without resolving it.
pub fn discard_card(state: &mut SessionState, player: PlayerId, instance: InstanceId) -> DiscardResult {
    if let Err(err) = check_in_hand(state, player, instance, "discarding cards") {
        warn!("discard rejected: {err}");
        return DiscardResult::Rejected(err);
    }

    let hand_owner = &mut state.players[player];
    let Some(mut card) = hand_owner.take_from_hand(instance) else {
        return DiscardResult::Rejected(PlayError::CardNotInHand { player, instance });
    };
    card.state = CardState::Discarded;
    let card_id = card.card.clone();
    hand_owner.discard.push_back(card);

    debug!("{player} discarded {card_id} ({instance})");
    DiscardResult::Discarded { card: card_id }
}

fn reject(err: PlayError) -> PlayResult {
    warn!("play rejected: {err}");
    PlayResult::Rejected(err)
}

/// Checks shared by play and discard. Returns the copy's card id.
fn check_in_hand(
    state: &SessionState,
    player: PlayerId,
    instance: InstanceId,
    action: &'static str,
) -> std::result::Result<CardId, PlayError> {
    if state.is_over() {
        return Err(PlayError::GameOver);
    }
    if !state.phase.allows_card_play() {
        return Err(PlayError::WrongPhase {
            action,
            phase: state.phase,
        });
    }
    let hand_owner = state.players.get(player).ok_or(PlayError::UnknownPlayer(player))?;
    hand_owner
        .find_in_hand(instance)
        .map(|card| card.card.clone())
        .ok_or(PlayError::CardNotInHand { player, instance })
}

fn effective_cost(
    definition: &CardDefinition,
    state: &SessionState,
    player: PlayerId,
    instance: InstanceId,
) -> Option<Cost> {
    let base = definition.cost.as_ref()?;
    let amount = state.players[player]
        .find_in_hand(instance)
        .map_or(base.amount, |card| card.effective_cost(base.amount));
    Some(Cost::new(base.resource.clone(), amount))
}

fn resolve(
    ctx: &ResolverContext<'_>,
    state: &mut SessionState,
    definition: &CardDefinition,
    player: PlayerId,
    instance: InstanceId,
    cost: Option<Cost>,
) -> Result<PlayReport> {
    let Some(mut card) = state.players[player].take_from_hand(instance) else {
        return Err(InvariantViolation::LostInstance { player, instance }.into());
    };

    if let Some(cost) = &cost {
        if cost.amount > 0 {
            let payment = Effect::lose_resource(cost.resource.clone(), cost.amount);
            EffectResolver::apply(ctx, &payment, player, &mut state.players)?;
        }
    }

    let (effects, claims) = resolve_effects(ctx, state, &definition.effects, player, card.effect_boost())?;

    card.state = CardState::Played;
    let played = &mut state.players[player];
    played.played.push_back(card);
    played.played_this_turn.push_back(definition.id.clone());

    Ok(PlayReport {
        player,
        instance,
        card: definition.id.clone(),
        cost_paid: cost,
        effects,
        claims,
    })
}

/// Apply `effects` in order for `actor`, sending claims to the arbiter.
///
/// `boost` raises the magnitude of stat and resource effects.
pub(crate) fn resolve_effects(
    ctx: &ResolverContext<'_>,
    state: &mut SessionState,
    effects: &[Effect],
    actor: PlayerId,
    boost: i64,
) -> Result<(Vec<EffectOutcome>, Vec<ClaimOutcome>)> {
    let mut outcomes = Vec::new();
    let mut claims = Vec::new();
    for effect in effects {
        match effect {
            Effect::ClaimShared { pool, target } => {
                let candidates = target.resolve(actor, state.player_count());
                claims.push(SharedResourceArbiter::contest(ctx, state, pool, &candidates)?);
            }
            _ => {
                let effect = effect.boosted(boost);
                outcomes.push(EffectResolver::apply(ctx, &effect, actor, &mut state.players)?);
            }
        }
    }
    Ok((outcomes, claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardInstance, CardKind, Modifier};
    use crate::core::{ResourceDefinition, ResourceId, SessionSettings, StatDefinition, StatId, Theme, ThemeConfig};
    use crate::resources::SharedResourceDefinition;
    use crate::rules::Phase;

    fn theme() -> Theme {
        Theme::new(
            ThemeConfig::new("office")
                .with_stat(StatDefinition::new("performance", 50))
                .with_resource(ResourceDefinition::new("energy", 2))
                .with_shared_resource(SharedResourceDefinition::new("parking", 1))
                .with_card(
                    CardDefinition::new("memo", "Memo", CardKind::Action)
                        .with_cost("energy", 1)
                        .with_effect(Effect::modify_stat("performance", 10)),
                )
                .with_card(
                    CardDefinition::new("overtime", "Overtime", CardKind::Action)
                        .with_cost("energy", 5)
                        .with_effect(Effect::modify_stat("performance", 30)),
                )
                .with_card(
                    CardDefinition::new("early_bird", "Early Bird", CardKind::Event)
                        .with_effect(Effect::claim("parking")),
                ),
        )
        .unwrap()
    }

    /// A session in the main phase with the given cards in player 0's hand.
    fn session(theme: &Theme, hand: &[&str]) -> SessionState {
        let mut state = SessionState::new(theme, &SessionSettings::new(2)).unwrap();
        state.phase = Phase::Main;
        state.turn = 1;
        for card in hand {
            let mut copy = CardInstance::new(InstanceId::new(state.next_instance), CardId::new(*card));
            state.next_instance += 1;
            copy.state = CardState::InHand;
            state.players[PlayerId::new(0)].hand.push_back(copy);
        }
        state
    }

    fn first_in_hand(state: &SessionState) -> InstanceId {
        state.players[PlayerId::new(0)].hand[0].id
    }

    #[test]
    fn test_play_resolves_and_moves_card() {
        let theme = theme();
        let ctx = ResolverContext::new(&theme);
        let mut state = session(&theme, &["memo"]);
        let instance = first_in_hand(&state);

        let result = play_card(&ctx, &mut state, PlayerId::new(0), instance).unwrap();
        let report = result.report().unwrap();

        assert_eq!(report.cost_paid, Some(Cost::new("energy", 1)));
        let player = &state.players[PlayerId::new(0)];
        assert_eq!(player.stat(&StatId::new("performance")), Some(60));
        assert_eq!(player.resource(&ResourceId::new("energy")), Some(1));
        assert!(player.hand.is_empty());
        assert_eq!(player.played[0].state, CardState::Played);
        assert_eq!(player.play_history(), vec![CardId::new("memo")]);
    }

    #[test]
    fn test_insufficient_resource_rejected_without_change() {
        let theme = theme();
        let ctx = ResolverContext::new(&theme);
        let mut state = session(&theme, &["overtime"]);
        let before = state.clone();

        let instance = first_in_hand(&state);
        let result = play_card(&ctx, &mut state, PlayerId::new(0), instance).unwrap();

        assert_eq!(
            result.error(),
            Some(&PlayError::InsufficientResource {
                resource: ResourceId::new("energy"),
                required: 5,
                available: 2,
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_cost_modifier_lowers_cost() {
        let theme = theme();
        let ctx = ResolverContext::new(&theme);
        let mut state = session(&theme, &["overtime"]);
        state.players[PlayerId::new(0)].hand[0].add_modifier(Modifier::CostDelta(-4));

        let instance = first_in_hand(&state);
        let result = play_card(&ctx, &mut state, PlayerId::new(0), instance).unwrap();

        assert!(result.is_played());
        assert_eq!(
            state.players[PlayerId::new(0)].resource(&ResourceId::new("energy")),
            Some(1)
        );
    }

    #[test]
    fn test_effect_boost() {
        let theme = theme();
        let ctx = ResolverContext::new(&theme);
        let mut state = session(&theme, &["memo"]);
        state.players[PlayerId::new(0)].hand[0].add_modifier(Modifier::EffectBoost(5));

        let instance = first_in_hand(&state);
        play_card(&ctx, &mut state, PlayerId::new(0), instance).unwrap();
        assert_eq!(
            state.players[PlayerId::new(0)].stat(&StatId::new("performance")),
            Some(65)
        );
    }

    #[test]
    fn test_claim_effect_goes_to_arbiter() {
        let theme = theme();
        let ctx = ResolverContext::new(&theme);
        let mut state = session(&theme, &["early_bird"]);

        let instance = first_in_hand(&state);
        let result = play_card(&ctx, &mut state, PlayerId::new(0), instance).unwrap();
        let report = result.report().unwrap();

        assert_eq!(report.claims.len(), 1);
        assert_eq!(report.claims[0].winner, Some(PlayerId::new(0)));
        assert_eq!(state.pools[0].remaining, 0);
    }

    #[test]
    fn test_precondition_order() {
        let theme = theme();
        let ctx = ResolverContext::new(&theme);
        let mut state = session(&theme, &["memo"]);
        let instance = first_in_hand(&state);

        state.phase = Phase::Resolve;
        let result = play_card(&ctx, &mut state, PlayerId::new(7), instance).unwrap();
        assert!(matches!(result.error(), Some(PlayError::WrongPhase { .. })));

        state.phase = Phase::Action;
        let result = play_card(&ctx, &mut state, PlayerId::new(7), instance).unwrap();
        assert_eq!(result.error(), Some(&PlayError::UnknownPlayer(PlayerId::new(7))));

        let result = play_card(&ctx, &mut state, PlayerId::new(1), instance).unwrap();
        assert_eq!(
            result.error(),
            Some(&PlayError::CardNotInHand {
                player: PlayerId::new(1),
                instance,
            })
        );

        state.phase = Phase::GameOver;
        let result = play_card(&ctx, &mut state, PlayerId::new(0), instance).unwrap();
        assert_eq!(result.error(), Some(&PlayError::GameOver));
    }

    #[test]
    fn test_discard() {
        let theme = theme();
        let mut state = session(&theme, &["memo"]);
        let instance = first_in_hand(&state);

        let result = discard_card(&mut state, PlayerId::new(0), instance);
        assert_eq!(result, DiscardResult::Discarded { card: CardId::new("memo") });

        let player = &state.players[PlayerId::new(0)];
        assert!(player.hand.is_empty());
        assert_eq!(player.discard[0].state, CardState::Discarded);
        assert!(player.play_history().is_empty());

        let again = discard_card(&mut state, PlayerId::new(0), instance);
        assert!(matches!(again, DiscardResult::Rejected(PlayError::CardNotInHand { .. })));
    }
}
