/// Integration tests for game flow scenarios
///
/// These tests drive a session through its phases with a manual clock and
/// check the transitions and events players would observe.
use party_cards::{
    GameEvent, ManualScheduler, PlayerId, Session, SessionConfig, SessionError,
    entities::{Countdown, ResetReason, Status},
};
use rand::{SeedableRng, rngs::StdRng};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

fn deck(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix} card {i}")).collect()
}

fn config(min_players: usize, max_players: Option<usize>) -> SessionConfig {
    SessionConfig {
        white_deck: deck("white", 100),
        black_deck: deck("black", 10),
        min_players,
        max_players,
        ..SessionConfig::default()
    }
}

fn new_session(config: SessionConfig) -> Session<ManualScheduler> {
    Session::with_rng(config, ManualScheduler::new(), StdRng::seed_from_u64(2024)).unwrap()
}

fn with_players(min_players: usize, ids: &[&str]) -> Session<ManualScheduler> {
    let mut session = new_session(config(min_players, None));
    for id in ids {
        session.add_player(*id).unwrap();
    }
    session
}

fn submit_first_card(session: &mut Session<ManualScheduler>, player: &str) {
    let card = session
        .player_deck(&PlayerId::new(player))
        .unwrap()
        .cards()[0]
        .id;
    session.submit_cards(player, &[card]).unwrap();
}

fn record(session: &mut Session<ManualScheduler>) -> Arc<Mutex<Vec<GameEvent>>> {
    let events = Arc::new(Mutex::new(vec![]));
    let sink = events.clone();
    session.subscribe(move |event: &GameEvent| sink.lock().unwrap().push(event.clone()));
    events
}

#[test]
fn test_two_players_start_a_round() {
    let mut session = with_players(2, &["1", "2"]);
    assert_eq!(session.status(), Status::CountdownToGame);

    session.advance(Duration::from_secs(15));

    let state = session.get_state();
    assert_eq!(state.status, Status::GamePlaying);
    assert!(state.black_card.is_some_and(|card| !card.is_empty()));
    assert_eq!(state.czar_id, Some(PlayerId::new("1")));
    assert_eq!(state.countdown, Some(Countdown::CzarPicking));
}

#[test]
fn test_countdown_does_not_fire_early() {
    let mut session = with_players(2, &["1", "2"]);

    session.advance(Duration::from_secs(14));

    assert_eq!(session.status(), Status::CountdownToGame);
}

#[test]
fn test_all_submissions_skip_game_timer() {
    let mut session = with_players(2, &["1", "2", "3"]);
    session.advance(Duration::from_secs(15));
    assert_eq!(session.czar_id(), Some(&PlayerId::new("1")));

    submit_first_card(&mut session, "2");
    assert_eq!(session.status(), Status::GamePlaying);
    submit_first_card(&mut session, "3");

    assert_eq!(session.status(), Status::CzarPicking);
    assert_eq!(session.pending_countdown(), Some(Countdown::SkipCzar));
    // The game-duration timer was replaced, not left running.
    assert_eq!(session.scheduler().pending().len(), 1);
}

#[test]
fn test_pick_winner_scores_and_rotates() {
    let mut session = with_players(2, &["1", "2"]);
    session.advance(Duration::from_secs(15));
    submit_first_card(&mut session, "2");
    assert_eq!(session.status(), Status::CzarPicking);
    let events = record(&mut session);

    let submission = session.submission_id_of(&PlayerId::new("2")).unwrap();
    session.pick_winner(submission).unwrap();

    let state = session.get_state();
    assert_eq!(state.status, Status::CzarPicked);
    assert_eq!(state.player_scores[&PlayerId::new("2")], 1);
    assert_eq!(state.czar_id, Some(PlayerId::new("2")));
    let winner = state.winner.unwrap();
    assert_eq!(winner.submission.id, submission);
    assert_eq!(winner.black_card, state.black_card);

    let events = events.lock().unwrap();
    assert_eq!(
        events[0],
        GameEvent::PlayerScored {
            player_id: PlayerId::new("2"),
            score: 1,
        }
    );
    assert!(matches!(
        &events[1],
        GameEvent::DeckChange { player_id, added_to_deck: Some(added), .. }
            if *player_id == PlayerId::new("2") && added.len() == 1
    ));
    assert!(matches!(events.last(), Some(GameEvent::StateChanged(_))));
}

#[test]
fn test_winning_cards_are_replaced() {
    let mut session = with_players(2, &["1", "2"]);
    session.advance(Duration::from_secs(15));
    let player = PlayerId::new("2");
    let played = session.player_deck(&player).unwrap().cards()[0].clone();
    session.submit_cards("2", &[played.id]).unwrap();

    let submission = session.submission_id_of(&player).unwrap();
    session.pick_winner(submission).unwrap();

    let deck = session.player_deck(&player).unwrap();
    assert_eq!(deck.len(), 10);
    assert!(!deck.contains(&played.id));
}

#[test]
fn test_czar_leaving_mid_round_resets_with_next_czar() {
    let mut session = with_players(2, &["1", "2", "3"]);
    session.advance(Duration::from_secs(15));
    submit_first_card(&mut session, "3");
    let events = record(&mut session);

    session.remove_player("1").unwrap();

    let state = session.get_state();
    assert_eq!(state.status, Status::CountdownToGame);
    assert_eq!(state.reason, Some(ResetReason::CzarLeft));
    assert_eq!(state.czar_id, Some(PlayerId::new("2")));
    assert_eq!(state.black_card, None);
    assert_eq!(state.submitted_cards, None);

    session.advance(Duration::from_secs(15));
    assert_eq!(session.czar_id(), Some(&PlayerId::new("2")));

    let events = events.lock().unwrap();
    assert_eq!(events[0], GameEvent::PlayerRemoved(PlayerId::new("1")));
}

#[test]
fn test_full_session_rejects_player() {
    let mut session = new_session(config(2, Some(2)));
    session.add_player("1").unwrap();
    session.add_player("2").unwrap();

    assert_eq!(session.add_player("3"), Err(SessionError::GameFull));
    assert_eq!(
        session.player_ids(),
        &[PlayerId::new("1"), PlayerId::new("2")]
    );
}

#[test]
fn test_duplicate_and_unknown_players() {
    let mut session = with_players(2, &["1"]);

    assert_eq!(session.add_player(" 1 "), Err(SessionError::AlreadyInGame));
    assert_eq!(session.remove_player("9"), Err(SessionError::NotInGame));
}

#[test]
fn test_wrong_phase_errors() {
    let mut session = with_players(2, &["1", "2"]);
    let card = session.player_deck(&PlayerId::new("2")).unwrap().cards()[0].id;

    assert_eq!(
        session.submit_cards("2", &[card]),
        Err(SessionError::CannotSubmit)
    );
    assert_eq!(
        session.pick_winner(uuid::Uuid::nil()),
        Err(SessionError::CannotPickWinner)
    );

    session.advance(Duration::from_secs(15));
    assert_eq!(
        session.submit_cards("9", &[card]),
        Err(SessionError::NotInGame)
    );
    session.submit_cards("2", &[card]).unwrap();
    assert_eq!(
        session.pick_winner(uuid::Uuid::nil()),
        Err(SessionError::UnknownSubmission)
    );
}

#[test]
fn test_double_submission_rejected() {
    let mut session = with_players(2, &["1", "2", "3"]);
    session.advance(Duration::from_secs(15));
    submit_first_card(&mut session, "2");

    let card = session.player_deck(&PlayerId::new("2")).unwrap().cards()[1].id;
    assert_eq!(
        session.submit_cards("2", &[card]),
        Err(SessionError::AlreadySubmitted)
    );
}

#[test]
fn test_judge_rotates_across_rounds() {
    let mut session = with_players(2, &["A", "B", "C"]);
    let mut judges = vec![];

    for _ in 0..4 {
        session.advance(Duration::from_secs(15));
        assert_eq!(session.status(), Status::GamePlaying);
        let judge = session.czar_id().cloned().unwrap();
        judges.push(judge.to_string());

        let answering: Vec<PlayerId> = session
            .player_ids()
            .iter()
            .filter(|id| **id != judge)
            .cloned()
            .collect();
        for id in &answering {
            submit_first_card(&mut session, id.as_str());
        }
        let submission = session.submission_id_of(&answering[0]).unwrap();
        session.pick_winner(submission).unwrap();

        session.advance(Duration::from_secs(15));
        assert_eq!(session.status(), Status::CountdownToGame);
    }

    assert_eq!(judges, vec!["A", "B", "C", "A"]);
}

#[test]
fn test_idle_judge_is_skipped() {
    let mut session = with_players(2, &["1", "2", "3"]);
    session.advance(Duration::from_secs(15));
    submit_first_card(&mut session, "2");
    let events = record(&mut session);

    // Game timer expires, then the judge never picks.
    session.advance(Duration::from_secs(60));
    assert_eq!(session.status(), Status::CzarPicking);
    session.advance(Duration::from_secs(60));

    let state = session.get_state();
    assert_eq!(state.status, Status::CountdownToGame);
    assert_eq!(state.reason, Some(ResetReason::CzarSkipped));
    assert_eq!(state.czar_id, Some(PlayerId::new("2")));

    let skipped: Vec<PlayerId> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            GameEvent::PlayerSkipped(id) => Some(id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec![PlayerId::new("3"), PlayerId::new("1")]);
}

#[test]
fn test_state_change_carries_snapshot() {
    let mut session = new_session(config(2, None));
    let events = record(&mut session);
    session.add_player("1").unwrap();
    session.add_player("2").unwrap();

    let events = events.lock().unwrap();
    let kinds: Vec<&str> = events.iter().map(GameEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "PLAYER_ADDED",
            "DECK_CHANGE",
            "PLAYER_ADDED",
            "DECK_CHANGE",
            "STATE_CHANGED"
        ]
    );
    let Some(GameEvent::StateChanged(view)) = events.last() else {
        panic!("expected a state change");
    };
    assert_eq!(view.status, Status::CountdownToGame);
    assert_eq!(view.player_ids.len(), 2);
    assert!(view.countdown_until.is_some());
}

#[test]
fn test_snapshot_serializes_for_transports() {
    let mut session = with_players(2, &["1", "2"]);
    session.advance(Duration::from_secs(15));

    let json: serde_json::Value = serde_json::from_str(&session.get_state().to_json().unwrap()).unwrap();

    assert_eq!(json["status"], "GAME_PLAYING");
    assert_eq!(json["czarId"], "1");
    assert_eq!(json["playerScores"]["2"], 0);
    assert!(json["submittedCards"].as_object().unwrap().is_empty());
}

#[test]
fn test_seeded_sessions_are_deterministic() {
    let mut a = with_players(2, &["1", "2"]);
    let mut b = with_players(2, &["1", "2"]);
    a.advance(Duration::from_secs(15));
    b.advance(Duration::from_secs(15));

    assert_eq!(a.get_state().black_card, b.get_state().black_card);
    assert_eq!(
        a.player_deck(&PlayerId::new("1")),
        b.player_deck(&PlayerId::new("1"))
    );
}

#[test]
fn test_player_ids_are_not_rewritten() {
    let mut session = new_session(config(2, None));
    let accented = format!("a{}", "é".repeat(40));
    let prefix = "x".repeat(64);

    session.add_player(accented.as_str()).unwrap();
    session.add_player(format!("{prefix}-alice")).unwrap();
    session.add_player(format!("{prefix}-bob")).unwrap();

    assert_eq!(session.player_ids().len(), 3);
    assert_eq!(session.player_ids()[0].as_str(), accented);
    session.remove_player(format!("{prefix}-bob")).unwrap();
    let alice = PlayerId::new(&format!("{prefix}-alice"));
    assert!(session.player_ids().contains(&alice));
}

#[test]
fn test_rejected_operations_leave_state_unchanged() {
    let mut session = new_session(config(2, Some(3)));
    for id in ["1", "2", "3"] {
        session.add_player(id).unwrap();
    }
    session.advance(Duration::from_secs(15));
    submit_first_card(&mut session, "2");

    let before = session.get_state();
    let pending_before = session.scheduler().pending().to_vec();
    let events = record(&mut session);

    let own_card = session.player_deck(&PlayerId::new("2")).unwrap().cards()[1].id;
    let judge_card = session.player_deck(&PlayerId::new("1")).unwrap().cards()[0].id;
    let rejections = [
        session.add_player("2"),
        session.add_player("4"),
        session.remove_player("9"),
        session.submit_cards("2", &[own_card]),
        session.submit_cards("3", &[judge_card]),
        session.submit_cards("1", &[judge_card]),
        session.pick_winner(before.submission_of(&PlayerId::new("2")).unwrap().id),
    ];

    assert_eq!(
        rejections,
        [
            Err(SessionError::AlreadyInGame),
            Err(SessionError::GameFull),
            Err(SessionError::NotInGame),
            Err(SessionError::AlreadySubmitted),
            Err(SessionError::InvalidCards),
            Err(SessionError::CzarCannotSubmit),
            Err(SessionError::CannotPickWinner),
        ]
    );
    assert_eq!(session.get_state(), before);
    assert_eq!(session.scheduler().pending(), pending_before.as_slice());
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn test_czar_leaving_while_picking_resets_with_next_czar() {
    let mut session = with_players(2, &["1", "2", "3"]);
    session.advance(Duration::from_secs(15));
    submit_first_card(&mut session, "2");
    submit_first_card(&mut session, "3");
    assert_eq!(session.status(), Status::CzarPicking);

    session.remove_player("1").unwrap();

    let state = session.get_state();
    assert_eq!(state.status, Status::CountdownToGame);
    assert_eq!(state.reason, Some(ResetReason::CzarLeft));
    assert_eq!(state.czar_id, Some(PlayerId::new("2")));
    assert_eq!(state.submitted_cards, None);
    assert_eq!(state.submitted_players, None);
    assert_eq!(state.winner, None);
    assert_eq!(state.countdown, Some(Countdown::StartGame));

    session.advance(Duration::from_secs(15));
    assert_eq!(session.status(), Status::GamePlaying);
    assert_eq!(session.czar_id(), Some(&PlayerId::new("2")));
}
