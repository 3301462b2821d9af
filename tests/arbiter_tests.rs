//! Shared pool arbitration through the session API.

use std::cell::RefCell;
use std::rc::Rc;

use theme_deck_core::core::{
    PlayError, PlayerId, PoolId, SessionSettings, SessionState, StatDefinition, StatId, Theme, ThemeConfig,
};
use theme_deck_core::events::GameEvent;
use theme_deck_core::resources::{ClaimRule, SharedResourceDefinition};
use theme_deck_core::rules::{GameSession, Phase};

const P0: PlayerId = PlayerId(0);
const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

fn office() -> Theme {
    Theme::from_json(include_str!("fixtures/office.json")).unwrap()
}

fn in_action_phase(theme: Theme, player_count: usize, rig: impl FnOnce(&mut SessionState)) -> GameSession {
    let settings = SessionSettings::new(player_count).with_seed(3);
    let session = GameSession::start_game(theme.clone(), settings.clone()).unwrap();
    let mut state = session.state().clone();
    rig(&mut state);
    let mut session = GameSession::with_state(theme, settings, state).unwrap();
    session.advance_phase().unwrap();
    assert_eq!(session.phase(), Phase::Action);
    session
}

fn set_stat(state: &mut SessionState, player: PlayerId, stat: &str, value: i64) {
    state.players[player].stats.insert(StatId::new(stat), value);
}

fn claims(session: &mut GameSession) -> Rc<RefCell<Vec<(PlayerId, i64)>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    session.subscribe(move |event| {
        if let GameEvent::ResourceClaimed { player, remaining, .. } = event {
            sink.borrow_mut().push((*player, *remaining));
        }
    });
    log
}

#[test]
fn test_highest_seniority_wins_parking() {
    let mut session = in_action_phase(office(), 2, |state| {
        set_stat(state, P0, "seniority", 80);
        set_stat(state, P1, "seniority", 95);
    });
    let log = claims(&mut session);
    let parking = PoolId::new("parking");

    session.request_claim(&parking, P0).unwrap();
    session.request_claim(&parking, P1).unwrap();
    session.advance_phase().unwrap();

    assert_eq!(*log.borrow(), vec![(P1, 0)]);
    assert_eq!(session.pool(&parking).unwrap().remaining, 0);
    let health = StatId::new("health");
    assert_eq!(session.player(P1).unwrap().stat(&health), Some(85));
    assert_eq!(session.player(P0).unwrap().stat(&health), Some(80));
}

#[test]
fn test_seniority_tie_goes_to_earliest_request() {
    let mut session = in_action_phase(office(), 2, |_| {});
    let log = claims(&mut session);
    let parking = PoolId::new("parking");

    session.request_claim(&parking, P1).unwrap();
    session.request_claim(&parking, P0).unwrap();
    session.advance_phase().unwrap();

    assert_eq!(*log.borrow(), vec![(P1, 0)]);
}

#[test]
fn test_queued_first_come_serves_in_request_order() {
    let mut session = in_action_phase(office(), 3, |_| {});
    let log = claims(&mut session);
    let room = PoolId::new("meeting_room");

    session.request_claim(&room, P2).unwrap();
    session.request_claim(&room, P0).unwrap();
    session.advance_phase().unwrap();

    assert_eq!(*log.borrow(), vec![(P2, 2), (P0, 1)]);
    assert!(session.state().pending_claims.is_empty());
}

#[test]
fn test_requests_only_in_action_phase() {
    let mut session = GameSession::start_game(office(), SessionSettings::new(1)).unwrap();
    let room = PoolId::new("meeting_room");

    assert!(matches!(
        session.request_claim(&room, P0),
        Err(PlayError::WrongPhase { phase: Phase::Main, .. })
    ));
    assert!(session.state().pending_claims.is_empty());
}

#[test]
fn test_meeting_room_renews_after_five_turns() {
    let mut session = in_action_phase(office(), 3, |_| {});
    let room = PoolId::new("meeting_room");

    let renewals = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&renewals);
    session.subscribe(move |event| {
        if let GameEvent::PoolRenewed { restored, remaining, .. } = event {
            sink.borrow_mut().push((*restored, *remaining));
        }
    });

    for player in [P0, P1, P2] {
        assert!(session.claim(&room, player).unwrap().is_claimed());
    }
    assert_eq!(session.pool(&room).unwrap().remaining, 0);
    assert_eq!(
        session.claim(&room, P0).unwrap().error(),
        Some(&PlayError::PoolExhausted(room.clone()))
    );

    for _ in 0..4 {
        session.end_turn().unwrap();
    }
    assert_eq!(session.pool(&room).unwrap().remaining, 0);
    assert!(renewals.borrow().is_empty());

    session.end_turn().unwrap();
    assert_eq!(session.pool(&room).unwrap().remaining, 1);
    assert_eq!(*renewals.borrow(), vec![(1, 1)]);
}

#[test]
fn test_exhausted_non_renewable_pool_stays_empty() {
    let mut session = in_action_phase(office(), 1, |_| {});
    let parking = PoolId::new("parking");

    assert!(session.claim(&parking, P0).unwrap().is_claimed());
    for _ in 0..8 {
        session.end_turn().unwrap();
        assert_eq!(session.pool(&parking).unwrap().remaining, 0);
    }
}

#[test]
fn test_min_stat_gate() {
    let theme = Theme::new(
        ThemeConfig::new("startup")
            .with_stat(StatDefinition::new("funding", 0))
            .with_shared_resource(
                SharedResourceDefinition::new("investor_meeting", 2).with_rule(ClaimRule::MinStat {
                    stat: StatId::new("funding"),
                    min: 30,
                }),
            ),
    )
    .unwrap();
    let mut session = in_action_phase(theme, 2, |state| {
        set_stat(state, P1, "funding", 30);
    });
    let pool = PoolId::new("investor_meeting");

    assert_eq!(
        session.claim(&pool, P0).unwrap().error(),
        Some(&PlayError::NotEligible { pool: pool.clone(), player: P0 })
    );
    assert!(session.claim(&pool, P1).unwrap().is_claimed());
    assert_eq!(session.pool(&pool).unwrap().remaining, 1);
}

#[test]
fn test_random_rule_is_seeded() {
    let theme = || {
        Theme::new(
            ThemeConfig::new("travel").with_shared_resource(
                SharedResourceDefinition::new("window_seat", 1).with_rule(ClaimRule::Random),
            ),
        )
        .unwrap()
    };
    let winner = || {
        let mut session = in_action_phase(theme(), 4, |_| {});
        let seat = PoolId::new("window_seat");
        for player in PlayerId::all(4) {
            session.request_claim(&seat, player).unwrap();
        }
        let log = claims(&mut session);
        session.advance_phase().unwrap();
        let winners = log.borrow().clone();
        assert_eq!(winners.len(), 1);
        winners[0].0
    };

    assert_eq!(winner(), winner());
}
