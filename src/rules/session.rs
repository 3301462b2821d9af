//! Game sessions: the turn/phase state machine and the host-facing API.
//!
//! A [`GameSession`] owns one [`SessionState`] and runs every host action
//! against it atomically:
//!
//! 1. The action runs against the live state, raising events into a
//!    buffer.
//! 2. On success, win conditions are checked and the buffered events are
//!    delivered to subscribers in subscription order.
//! 3. On error, the state is restored to its value before the call and the
//!    buffered events are dropped.
//!
//! Illegal player actions are not errors: they come back as `Rejected`
//! results and leave the state untouched.
//!
//! ## Turn cycle
//!
//! | Step | What happens |
//! |---|---|
//! | setup → draw | hands dealt, turn 1 starts |
//! | draw → main | automatic, right after the draw |
//! | main → action | nothing extra |
//! | action → resolve | queued claims are arbitrated |
//! | resolve → end | pools tick toward renewal, per-turn effects apply |
//! | end → draw | turn advances, combo memory clears, cards drawn |
//!
//! ```
//! use theme_deck_core::core::{SessionSettings, StatDefinition, Theme, ThemeConfig};
//! use theme_deck_core::rules::{GameSession, Phase};
//!
//! let theme = Theme::new(
//!     ThemeConfig::new("minimal").with_stat(StatDefinition::new("focus", 10)),
//! ).unwrap();
//! let mut session = GameSession::start_game(theme, SessionSettings::new(2)).unwrap();
//!
//! assert_eq!(session.phase(), Phase::Main);
//! assert_eq!(session.turn(), 1);
//!
//! session.end_turn().unwrap();
//! assert_eq!(session.turn(), 2);
//! ```

use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::phase::Phase;
use super::win::{evaluate, EndReason};
use crate::cards::{self, DiscardResult, InstanceId, PlayResult};
use crate::combos::{check_combo_opportunity, newly_completed, ComboHint};
use crate::core::{
    ConfigError, PlayError, PlayerId, PlayerState, PoolId, Result, SessionSettings, SessionState, Theme,
};
use crate::effects::{EffectResolver, ResolverContext};
use crate::events::{EventBus, GameEvent, SubscriptionId};
use crate::resources::{ClaimOutcome, ClaimRequest, ClaimResult, PoolState, SharedResourceArbiter};

/// Result of a phase step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    Advanced { from: Phase, to: Phase },
    Rejected(PlayError),
}

impl StepResult {
    #[must_use]
    pub fn is_advanced(&self) -> bool {
        matches!(self, StepResult::Advanced { .. })
    }
}

/// Encoded form of a session, for snapshots.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    settings: SessionSettings,
    state: SessionState,
}

/// One playthrough of a theme.
pub struct GameSession {
    theme: Arc<Theme>,
    settings: SessionSettings,
    state: SessionState,
    events: EventBus,
}

impl GameSession {
    /// Build a session in the setup phase. Nothing is dealt until
    /// [`start`](Self::start), so subscribers registered in between see
    /// the opening events.
    pub fn new(theme: impl Into<Arc<Theme>>, settings: SessionSettings) -> Result<Self> {
        let theme = theme.into();
        let state = SessionState::new(&theme, &settings)?;
        Ok(Self {
            theme,
            settings,
            state,
            events: EventBus::new(),
        })
    }

    /// Build a session and play it up to the first turn's main phase.
    pub fn start_game(theme: impl Into<Arc<Theme>>, settings: SessionSettings) -> Result<Self> {
        let mut session = Self::new(theme, settings)?;
        session.start()?;
        Ok(session)
    }

    /// Deal opening hands and start turn 1.
    pub fn start(&mut self) -> Result<StepResult> {
        if self.state.phase != Phase::Setup {
            return Ok(self.reject_step(PlayError::WrongPhase {
                action: "starting the game",
                phase: self.state.phase,
            }));
        }
        self.advance_phase()
    }

    /// Throw the current state away and start again from the same theme
    /// and settings. The same seed deals the same cards.
    pub fn reset_game(&mut self) -> Result<StepResult> {
        self.events.discard_pending();
        self.state = SessionState::new(&self.theme, &self.settings)?;
        info!("session for theme `{}` reset", self.theme.name());
        self.start()
    }

    // === Host actions ===

    /// Play a card from a player's hand.
    pub fn play_card(&mut self, player: PlayerId, instance: InstanceId) -> Result<PlayResult> {
        self.act(|theme, state, events| {
            let ctx = ResolverContext::new(theme);
            let result = cards::play_card(&ctx, state, player, instance)?;
            if let PlayResult::Played(report) = &result {
                events.emit(GameEvent::CardPlayed {
                    player,
                    instance,
                    card: report.card.clone(),
                });
                emit_claims(events, &report.claims);
                offer_combos(&ctx, state, events, player)?;
            }
            Ok(result)
        })
    }

    /// Discard a card from a player's hand without resolving it.
    pub fn discard_card(&mut self, player: PlayerId, instance: InstanceId) -> Result<DiscardResult> {
        self.act(|theme, state, events| {
            let result = cards::discard_card(state, player, instance);
            if let DiscardResult::Discarded { card } = &result {
                events.emit(GameEvent::CardDiscarded {
                    player,
                    instance,
                    card: card.clone(),
                });
                refresh_hint(theme, state, events, player);
            }
            Ok(result)
        })
    }

    /// Claim one unit of a pool right away. Only allowed in the action phase.
    pub fn claim(&mut self, pool: &PoolId, player: PlayerId) -> Result<ClaimResult> {
        if let Err(err) = self.check_claim_phase() {
            return Ok(self.reject_claim(err));
        }
        if let Err(err) = SharedResourceArbiter::check_claim(&self.theme, &self.state, pool, player) {
            return Ok(self.reject_claim(err));
        }

        self.act(|theme, state, events| {
            let ctx = ResolverContext::new(theme);
            let outcome = SharedResourceArbiter::contest(&ctx, state, pool, &[player])?;
            emit_claims(events, std::slice::from_ref(&outcome));
            Ok(ClaimResult::Claimed(outcome))
        })
    }

    /// Queue a claim to be arbitrated when the phase moves to resolve.
    ///
    /// Requests are arbitrated in the order they were queued.
    pub fn request_claim(&mut self, pool: &PoolId, player: PlayerId) -> std::result::Result<(), PlayError> {
        let checked = self.check_claim_phase().and_then(|()| {
            if !self.state.players.contains(player) {
                return Err(PlayError::UnknownPlayer(player));
            }
            if self.theme.pool_index(pool).is_none() {
                return Err(PlayError::UnknownPool(pool.clone()));
            }
            let request = ClaimRequest {
                pool: pool.clone(),
                player,
            };
            if self.state.pending_claims.contains(&request) {
                return Err(PlayError::DuplicateClaimRequest {
                    pool: pool.clone(),
                    player,
                });
            }
            Ok(request)
        });

        match checked {
            Ok(request) => {
                debug!("{player} queued a claim on {pool}");
                self.state.pending_claims.push(request);
                Ok(())
            }
            Err(err) => {
                warn!("claim request rejected: {err}");
                Err(err)
            }
        }
    }

    /// Move one step along the turn cycle.
    pub fn advance_phase(&mut self) -> Result<StepResult> {
        if self.state.is_over() {
            return Ok(self.reject_step(PlayError::GameOver));
        }
        let max_turns = self.max_turns();
        self.act(|theme, state, events| {
            let from = state.phase;
            step(theme, state, events, max_turns)?;
            Ok(StepResult::Advanced { from, to: state.phase })
        })
    }

    /// Advance until the next turn's main phase, or until the game ends.
    pub fn end_turn(&mut self) -> Result<StepResult> {
        if self.state.is_over() {
            return Ok(self.reject_step(PlayError::GameOver));
        }
        let max_turns = self.max_turns();
        self.act(|theme, state, events| {
            let from = state.phase;
            let turn = state.turn;
            loop {
                step(theme, state, events, max_turns)?;
                check_end(theme, state, events);
                if state.is_over() || (state.phase == Phase::Main && state.turn > turn) {
                    break;
                }
            }
            Ok(StepResult::Advanced { from, to: state.phase })
        })
    }

    // === Events ===

    /// Register an event handler. Handlers run in subscription order.
    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // === Snapshots ===

    /// Encode the session state, RNG position included.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let snapshot = Snapshot {
            settings: self.settings.clone(),
            state: self.state.clone(),
        };
        Ok(bincode::serialize(&snapshot)?)
    }

    /// Rebuild a session from a snapshot taken with the same theme.
    ///
    /// Subscribers are not part of a snapshot.
    pub fn restore(theme: impl Into<Arc<Theme>>, bytes: &[u8]) -> Result<Self> {
        let Snapshot { settings, state } = bincode::deserialize(bytes)?;
        Self::with_state(theme, settings, state)
    }

    /// Resume a session from a state the host kept.
    ///
    /// The state must fit the theme: same pools, player count matching the
    /// settings, and every stat, resource and pool within bounds.
    pub fn with_state(theme: impl Into<Arc<Theme>>, settings: SessionSettings, state: SessionState) -> Result<Self> {
        let theme = theme.into();
        settings.validate()?;
        if state.pools.len() != theme.pools().len() || state.player_count() != settings.player_count {
            return Err(ConfigError::InvalidValue {
                context: "snapshot".to_string(),
                reason: format!("does not match theme `{}`", theme.name()),
            }
            .into());
        }
        EffectResolver::check_bounds(&ResolverContext::new(&theme), &state.players)?;
        SharedResourceArbiter::check_pools(&theme, &state)?;

        Ok(Self {
            theme,
            settings,
            state,
            events: EventBus::new(),
        })
    }

    // === Accessors ===

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> Option<&PlayerState> {
        self.state.players.get(player)
    }

    #[must_use]
    pub fn pool(&self, pool: &PoolId) -> Option<&PoolState> {
        self.theme.pool_index(pool).map(|i| &self.state.pools[i])
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    /// The combo currently surfaced to a player.
    #[must_use]
    pub fn combo_hint(&self, player: PlayerId) -> Option<&ComboHint> {
        self.state.hints.get(player)?.hint.as_ref()
    }

    #[must_use]
    pub fn end_reason(&self) -> Option<&EndReason> {
        self.state.end_reason.as_ref()
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Effective turn ceiling: the session override, else the theme's.
    #[must_use]
    pub fn max_turns(&self) -> u32 {
        self.settings.max_turns.unwrap_or_else(|| self.theme.max_turns())
    }

    // === Internals ===

    /// Run an action atomically, then check for game end and deliver events.
    fn act<T>(&mut self, action: impl FnOnce(&Theme, &mut SessionState, &mut EventBus) -> Result<T>) -> Result<T> {
        let theme = Arc::clone(&self.theme);
        let events = &mut self.events;
        let result = self.state.transact(|state| {
            let value = action(&theme, state, events)?;
            check_end(&theme, state, events);
            Ok(value)
        });

        match &result {
            Ok(_) => self.events.flush(),
            Err(err) => {
                warn!("action rolled back: {err}");
                self.events.discard_pending();
            }
        }
        result
    }

    fn check_claim_phase(&self) -> std::result::Result<(), PlayError> {
        if self.state.is_over() {
            return Err(PlayError::GameOver);
        }
        if !self.state.phase.allows_claims() {
            return Err(PlayError::WrongPhase {
                action: "claiming shared resources",
                phase: self.state.phase,
            });
        }
        Ok(())
    }

    fn reject_claim(&self, err: PlayError) -> ClaimResult {
        warn!("claim rejected: {err}");
        ClaimResult::Rejected(err)
    }

    fn reject_step(&self, err: PlayError) -> StepResult {
        warn!("phase step rejected: {err}");
        StepResult::Rejected(err)
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("theme", &self.theme.name())
            .field("settings", &self.settings)
            .field("phase", &self.state.phase)
            .field("turn", &self.state.turn)
            .field("events", &self.events)
            .finish()
    }
}

/// One step of the turn cycle from the current phase.
fn step(theme: &Theme, state: &mut SessionState, events: &mut EventBus, max_turns: u32) -> Result<()> {
    let ctx = ResolverContext::new(theme);
    let next = state.phase.next();

    match state.phase {
        Phase::Setup => {
            for (_, player) in state.players.iter_mut() {
                player.draw(theme.starting_hand_size());
            }
            info!(
                "theme `{}` started with {} player(s), seed {}",
                theme.name(),
                state.player_count(),
                state.rng.seed()
            );
            begin_turn(theme, state, events, 1);
        }

        Phase::Draw | Phase::Main => enter(state, events, next),

        Phase::Action => {
            enter(state, events, next);
            let outcomes = SharedResourceArbiter::resolve_pending(&ctx, state)?;
            emit_claims(events, &outcomes);
        }

        Phase::Resolve => {
            enter(state, events, next);
            for renewal in SharedResourceArbiter::tick_renewals(&ctx, state)? {
                events.emit(GameEvent::PoolRenewed {
                    pool: renewal.pool,
                    restored: renewal.restored,
                    remaining: renewal.remaining,
                });
            }
            let players: Vec<_> = state.players.player_ids().collect();
            for player in players {
                let (_, claims) = cards::play::resolve_effects(&ctx, state, theme.per_turn_effects(), player, 0)?;
                emit_claims(events, &claims);
            }
        }

        Phase::End => {
            let next_turn = state.turn + 1;
            if next_turn > max_turns {
                end_game(state, events, EndReason::TurnLimit { turns: state.turn });
            } else {
                begin_turn(theme, state, events, next_turn);
            }
        }

        Phase::GameOver => {}
    }
    Ok(())
}

/// Enter the draw phase of `turn`, draw, and move on to main.
fn begin_turn(theme: &Theme, state: &mut SessionState, events: &mut EventBus, turn: u32) {
    enter(state, events, Phase::Draw);
    state.turn = turn;
    for (_, hints) in state.hints.iter_mut() {
        hints.reset_hints();
    }
    for (_, player) in state.players.iter_mut() {
        player.played_this_turn.clear();
    }
    events.emit(GameEvent::TurnStarted { turn });
    for (_, player) in state.players.iter_mut() {
        player.draw(theme.draw_per_turn());
    }
    enter(state, events, Phase::Main);
}

fn enter(state: &mut SessionState, events: &mut EventBus, to: Phase) {
    let from = state.phase;
    state.phase = to;
    debug!("phase {from} -> {to} (turn {})", state.turn);
    events.emit(GameEvent::PhaseChanged { from, to });
}

fn end_game(state: &mut SessionState, events: &mut EventBus, reason: EndReason) {
    enter(state, events, Phase::GameOver);
    info!("game over on turn {}: {reason:?}", state.turn);
    state.end_reason = Some(reason.clone());
    events.emit(GameEvent::GameOver { reason });
}

/// End the game if any win condition is met.
fn check_end(theme: &Theme, state: &mut SessionState, events: &mut EventBus) {
    if state.is_over() {
        return;
    }
    if let Some(reason) = evaluate(theme.win_conditions(), &state.players) {
        end_game(state, events, reason);
    }
}

fn emit_claims(events: &mut EventBus, claims: &[ClaimOutcome]) {
    for claim in claims {
        if let Some(player) = claim.winner {
            events.emit(GameEvent::ResourceClaimed {
                pool: claim.pool.clone(),
                player,
                remaining: claim.remaining,
            });
        }
    }
}

/// Reward newly completed combos and surface the next hint.
fn offer_combos(
    ctx: &ResolverContext<'_>,
    state: &mut SessionState,
    events: &mut EventBus,
    player: PlayerId,
) -> Result<()> {
    let combos = ctx.theme.combos();
    if combos.is_empty() {
        return Ok(());
    }

    let hand = state.players[player].hand_cards();
    let played = state.players[player].play_history();
    let hint = check_combo_opportunity(&hand, &played, combos, &state.hints[player].completed);

    for combo in newly_completed(&played, combos, &state.hints[player].completed) {
        let (_, claims) = cards::play::resolve_effects(ctx, state, &combo.bonus_effects, player, 0)?;
        emit_claims(events, &claims);
        state.hints[player].completed.insert(combo.id.clone());
        debug!("{player} completed combo {}", combo.id);
        events.emit(GameEvent::ComboCompleted {
            player,
            combo: combo.id.clone(),
            points: combo.reward.points,
        });
    }

    if let Some(hint) = &hint {
        events.emit(GameEvent::ComboHint {
            player,
            hint: hint.clone(),
        });
    }
    state.hints[player].hint = hint;
    Ok(())
}

/// Recompute a player's hint after their hand changed without a play.
///
/// Rewards nothing. A changed hint is raised as a `combo_hint` event.
fn refresh_hint(theme: &Theme, state: &mut SessionState, events: &mut EventBus, player: PlayerId) {
    let combos = theme.combos();
    if combos.is_empty() {
        return;
    }

    let hand = state.players[player].hand_cards();
    let played = state.players[player].play_history();
    let hint = check_combo_opportunity(&hand, &played, combos, &state.hints[player].completed);
    if hint == state.hints[player].hint {
        return;
    }

    if let Some(hint) = &hint {
        events.emit(GameEvent::ComboHint {
            player,
            hint: hint.clone(),
        });
    }
    state.hints[player].hint = hint;
}
