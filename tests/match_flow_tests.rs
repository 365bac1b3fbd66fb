//! Integration tests for the match flow
//!
//! Drives a headless app with [`MatchPlugin`] the way a real client does:
//! server frames go in through the transport end of a [`MatchLink`], pointer
//! input is written as messages, and outbound frames are read back from the
//! transport. Time is advanced by hand, one fixed step per update.

use bevy_app::App;
use bevy_math::Rect;
use bevy_time::Time;
use duelchess::core::MatchSettings;
use duelchess::game::{
    teardown_match, BoardResized, ClockState, MatchBoard, MatchClock, MatchOutcome, MatchPlugin,
    MatchSession, Piece, PieceColor, PieceKind, PlayerCommand, Square, SquareInput,
};
use duelchess::networking::{MatchLink, TransportEnds};
use duelchess::rendering::{AnimationCoordinator, PieceVisual};
use std::time::Duration;

fn sq(text: &str) -> Square {
    Square::from_algebraic(text).unwrap()
}

/// App with a connected link and a laid-out 800px board
fn match_app() -> (App, TransportEnds) {
    let (link, ends) = MatchLink::pair();
    let mut app = App::new();
    app.insert_resource(MatchSettings {
        compensate_transit_lag: false,
        ..Default::default()
    })
    .insert_resource(link)
    .add_plugins(MatchPlugin);
    app.world_mut().write_message(BoardResized {
        bounds: Rect::new(0.0, 0.0, 800.0, 800.0),
    });
    (app, ends)
}

fn step_by(app: &mut App, millis: u64) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_millis(millis));
    app.update();
}

fn step(app: &mut App) {
    step_by(app, 100);
}

fn push(app: &mut App, ends: &TransportEnds, frame: &str) {
    ends.to_client.send(frame.to_string()).unwrap();
    step(app);
}

fn start_round(app: &mut App, ends: &TransportEnds, colour: u8, time_ms: u64) {
    push(
        app,
        ends,
        &format!(
            r#"{{"event":"start","data":{{"colour":{colour},"timeRemaining":{time_ms},"round":1,"totalRounds":2}}}}"#
        ),
    );
}

fn sent(ends: &TransportEnds) -> Vec<String> {
    ends.from_client.try_iter().collect()
}

fn visual_at(app: &mut App, square: Square) -> Option<Piece> {
    let mut query = app.world_mut().query::<&PieceVisual>();
    query
        .iter(app.world())
        .find(|visual| visual.square == square)
        .map(|visual| visual.piece)
}

fn play(app: &mut App, from: &str, to: &str) {
    app.world_mut().write_message(SquareInput::Press(sq(from)));
    app.world_mut().write_message(SquareInput::Press(sq(to)));
    step(app);
}

#[test]
fn test_start_event_sets_up_round() {
    //! Start resets board, clocks and session and spawns 32 piece entities
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 0, 180_000);

    let board = app.world().resource::<MatchBoard>();
    assert_eq!(board.local_color(), PieceColor::Black);
    assert_eq!(board.turn(), PieceColor::White);
    assert_eq!(board.legal_moves().len(), 20);

    let clock = app.world().resource::<MatchClock>();
    assert_eq!(clock.state(), ClockState::Running);
    assert_eq!(clock.remaining(PieceColor::White), 180_000);

    let session = app.world().resource::<MatchSession>();
    assert_eq!((session.round, session.total_rounds), (1, 2));

    let mut query = app.world_mut().query::<&PieceVisual>();
    assert_eq!(query.iter(app.world()).count(), 32);
}

#[test]
fn test_local_move_is_sent_and_committed_after_delay() {
    //! e2e4 goes out immediately, the view commits one frame later
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 1, 300_000);

    play(&mut app, "e2", "e4");
    assert_eq!(sent(&ends), vec![r#"{"event":"move","data":"e2e4"}"#.to_string()]);

    let board = app.world().resource::<MatchBoard>();
    assert!(board.board().is_empty(sq("e2")));
    assert_eq!(board.turn(), PieceColor::Black);
    assert!(app.world().resource::<AnimationCoordinator>().is_pending());
    assert!(
        visual_at(&mut app, sq("e2")).is_some(),
        "view still shows the old snapshot while sliding"
    );

    step(&mut app);
    assert!(!app.world().resource::<AnimationCoordinator>().is_pending());
    assert_eq!(
        visual_at(&mut app, sq("e4")),
        Some(Piece::new(PieceKind::Pawn, PieceColor::White))
    );
    assert_eq!(visual_at(&mut app, sq("e2")), None);
}

#[test]
fn test_drag_and_drop_commits_immediately() {
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 1, 300_000);

    app.world_mut().write_message(SquareInput::DragStart(sq("g1")));
    app.world_mut().write_message(SquareInput::DropOn(sq("f3")));
    step(&mut app);

    assert_eq!(sent(&ends), vec![r#"{"event":"move","data":"g1f3"}"#.to_string()]);
    assert!(!app.world().resource::<AnimationCoordinator>().is_pending());
    assert_eq!(
        visual_at(&mut app, sq("f3")),
        Some(Piece::new(PieceKind::Knight, PieceColor::White))
    );
}

#[test]
fn test_illegal_local_move_sends_nothing() {
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 1, 300_000);

    play(&mut app, "e2", "e5");
    assert!(sent(&ends).is_empty());
    let board = app.world().resource::<MatchBoard>();
    assert!(board.board().piece_at(sq("e2")).is_some());
    assert_eq!(board.selection().map(|s| s.origin), Some(sq("e2")));
}

#[test]
fn test_remote_move_updates_board_and_clock() {
    //! Black seat receives white's move with both remaining times
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 0, 300_000);

    push(
        &mut app,
        &ends,
        r#"{"event":"move","data":{"turn":0,"move":"e2e4","castles":null,"isCheck":false,
            "enPassant":false,"legalMoves":["e7e5","c7c5"],"moveStack":["e2e4"],
            "timeRemainingWhite":295000,"timeRemainingBlack":300000}}"#,
    );

    let board = app.world().resource::<MatchBoard>();
    assert!(board.is_my_turn());
    assert!(board.board().piece_at(sq("e4")).is_some());
    assert_eq!(board.legal_moves().len(), 2);

    let clock = app.world().resource::<MatchClock>();
    assert_eq!(clock.turn(), PieceColor::Black);
    assert_eq!(clock.remaining(PieceColor::White), 295_000);
    assert_eq!(clock.remaining(PieceColor::Black), 300_000);

    step(&mut app);
    let clock = app.world().resource::<MatchClock>();
    assert_eq!(clock.remaining(PieceColor::Black), 299_900);
    assert_eq!(clock.remaining(PieceColor::White), 295_000);
}

#[test]
fn test_local_move_charges_mover_until_the_move() {
    //! White moves 90ms after a tick; the next tick 10ms later charges black only
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 1, 300_000);
    step(&mut app);
    assert_eq!(
        app.world().resource::<MatchClock>().remaining(PieceColor::White),
        299_900
    );

    app.world_mut().write_message(SquareInput::Press(sq("e2")));
    app.world_mut().write_message(SquareInput::Press(sq("e4")));
    step_by(&mut app, 90);
    step_by(&mut app, 10);

    let clock = app.world().resource::<MatchClock>();
    assert_eq!(clock.turn(), PieceColor::Black);
    assert_eq!(clock.remaining(PieceColor::White), 299_810);
    assert_eq!(clock.remaining(PieceColor::Black), 299_990);
}

#[test]
fn test_clock_runs_out_and_flags_once() {
    //! Own clock hitting zero on own turn emits exactly one flag
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 1, 1_000);

    for _ in 0..15 {
        step(&mut app);
    }

    let frames = sent(&ends);
    assert_eq!(frames, vec![r#"{"event":"flag","data":1}"#.to_string()]);
    let clock = app.world().resource::<MatchClock>();
    assert_eq!(clock.remaining(PieceColor::White), 0);
    assert_eq!(clock.state(), ClockState::Flagged);
}

#[test]
fn test_opponent_clock_running_out_is_not_flagged() {
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 0, 500);
    for _ in 0..10 {
        step(&mut app);
    }
    assert!(sent(&ends).is_empty());
    assert_eq!(
        app.world().resource::<MatchClock>().remaining(PieceColor::White),
        0
    );
}

#[test]
fn test_outcome_stops_clock_and_locks_board() {
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 1, 300_000);

    push(
        &mut app,
        &ends,
        r#"{"event":"move","data":{"winner":0,"outcome":12,"matchScore":[1,0]}}"#,
    );

    let session = app.world().resource::<MatchSession>();
    let result = session.last_result.expect("round result recorded");
    assert_eq!(result.outcome, MatchOutcome::Resignation);
    assert_eq!(result.winner, Some(PieceColor::Black));
    assert_eq!(session.score_of(PieceColor::Black), Some(1.0));
    assert_eq!(
        app.world().resource::<MatchClock>().state(),
        ClockState::Stopped
    );

    play(&mut app, "e2", "e4");
    assert!(sent(&ends).is_empty());
    let remaining = app.world().resource::<MatchClock>().remaining(PieceColor::White);
    step(&mut app);
    assert_eq!(
        app.world().resource::<MatchClock>().remaining(PieceColor::White),
        remaining
    );
}

#[test]
fn test_outcome_cancels_pending_animation() {
    //! A checkmating move arrives and the round ends in the same update
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 0, 300_000);

    push(
        &mut app,
        &ends,
        r#"{"event":"move","data":{"turn":0,"move":"d2d4","legalMoves":[],"outcome":1,"winner":1}}"#,
    );

    let coordinator = app.world().resource::<AnimationCoordinator>();
    assert!(!coordinator.is_pending());
    assert!(coordinator.displayed().piece_at(sq("d4")).is_some());
}

#[test]
fn test_clock_sync_event_flips_turn() {
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 1, 60_000);

    push(
        &mut app,
        &ends,
        r#"{"event":"clockSync","data":{"white":58000,"black":60000}}"#,
    );
    step(&mut app);

    let clock = app.world().resource::<MatchClock>();
    assert_eq!(clock.turn(), PieceColor::Black);
    assert_eq!(clock.remaining(PieceColor::White), 58_000);
    assert_eq!(clock.remaining(PieceColor::Black), 59_900);
}

#[test]
fn test_rapid_moves_keep_newest_snapshot() {
    //! An opponent reply inside the commit window supersedes the pending local commit
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 1, 300_000);

    app.world_mut().write_message(SquareInput::Press(sq("e2")));
    app.world_mut().write_message(SquareInput::Press(sq("e4")));
    step_by(&mut app, 10);

    ends.to_client
        .send(
            r#"{"event":"move","data":{"turn":1,"move":"e7e5","legalMoves":["g1f3"]}}"#
                .to_string(),
        )
        .unwrap();
    step_by(&mut app, 10);
    assert!(app.world().resource::<AnimationCoordinator>().is_pending());

    step_by(&mut app, 200);
    let coordinator = app.world().resource::<AnimationCoordinator>();
    assert!(!coordinator.is_pending());
    assert!(coordinator.displayed().piece_at(sq("e4")).is_some());
    assert!(coordinator.displayed().piece_at(sq("e5")).is_some());
}

#[test]
fn test_draw_offer_and_accept() {
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 1, 300_000);

    push(&mut app, &ends, r#"{"event":"drawOffer","data":null}"#);
    assert!(app.world().resource::<MatchSession>().draw_offered);

    app.world_mut().write_message(PlayerCommand::AcceptDraw);
    step(&mut app);
    assert_eq!(sent(&ends), vec![r#"{"event":"acceptDraw"}"#.to_string()]);
    assert!(!app.world().resource::<MatchSession>().draw_offered);
}

#[test]
fn test_exit_closes_link() {
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 1, 300_000);

    app.world_mut().write_message(PlayerCommand::Exit);
    step(&mut app);

    assert_eq!(sent(&ends), vec![r#"{"event":"exit"}"#.to_string()]);
    assert!(!app.world().resource::<MatchLink>().is_connected());
    assert!(ends.to_client.send("late".to_string()).is_err());
}

#[test]
fn test_teardown_releases_match() {
    let (mut app, ends) = match_app();
    start_round(&mut app, &ends, 1, 300_000);
    play(&mut app, "d2", "d4");

    teardown_match(app.world_mut());

    assert!(!app.world().resource::<MatchLink>().is_connected());
    assert_eq!(
        app.world().resource::<MatchClock>().state(),
        ClockState::Stopped
    );
    let coordinator = app.world().resource::<AnimationCoordinator>();
    assert!(!coordinator.is_pending());
    assert!(coordinator.displayed().piece_at(sq("d4")).is_some());
}
