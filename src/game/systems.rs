//! Match systems
//!
//! Thin ECS wrappers around the match resources. All state transitions live in
//! [`MatchBoard`], [`MatchClock`], [`MatchSession`] and
//! [`AnimationCoordinator`]; the systems below only route messages between
//! them in the order fixed by [`super::system_sets::MatchSystems`].

use super::board::Orientation;
use super::clock::{ClockEvent, ClockState, MatchClock};
use super::events::{BoardCommitted, BoardResized, PlayerCommand, SquareInput};
use super::reconciler::{AppliedMove, MatchBoard, MoveSource};
use super::session::{MatchSession, RoundResult};
use super::types::PieceColor;
use crate::core::MatchSettings;
use crate::networking::protocol::{ClientAction, ServerEvent};
use crate::networking::MatchLink;
use crate::rendering::AnimationCoordinator;
use bevy_ecs::prelude::*;
use bevy_time::{Time, Timer, TimerMode};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Repeating timer driving the clock prediction
#[derive(Resource, Debug, Clone)]
pub struct ClockTicker(pub Timer);

impl ClockTicker {
    pub fn new(period: Duration) -> Self {
        ClockTicker(Timer::new(period, TimerMode::Repeating))
    }
}

impl Default for ClockTicker {
    fn default() -> Self {
        ClockTicker::new(Duration::from_millis(100))
    }
}

/// Current wall-clock time in epoch milliseconds
fn epoch_now_ms() -> f64 {
    web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64() * 1_000.0)
        .unwrap_or(0.0)
}

/// Hand an applied move to the coordinator, committing at once if it won't animate
fn schedule_or_commit(
    coordinator: &mut AnimationCoordinator,
    applied: &AppliedMove,
    now: Duration,
    committed: &mut MessageWriter<BoardCommitted>,
) {
    if !coordinator.schedule(applied, now) {
        committed.write(BoardCommitted {
            board: applied.plan.board,
        });
    }
}

/// Claim the win on time when the local clock ran out
fn raise_flag(event: Option<ClockEvent>, actions: &mut MessageWriter<ClientAction>) {
    if let Some(ClockEvent::FlagRaised(color)) = event {
        warn!("[CLOCK] Out of time, flagging {}", color.name());
        actions.write(ClientAction::Flag(color));
    }
}

/// Decode inbound frames from the link
pub fn receive_server_events(
    link: Option<ResMut<MatchLink>>,
    mut events: MessageWriter<ServerEvent>,
) {
    let Some(mut link) = link else {
        return;
    };
    for event in link.drain() {
        events.write(event);
    }
}

/// Recompute anchors when the rendered board changes size
pub fn handle_board_resize(
    mut resized: MessageReader<BoardResized>,
    mut coordinator: ResMut<AnimationCoordinator>,
) {
    if let Some(latest) = resized.read().last() {
        coordinator.on_resize(latest.bounds);
    }
}

/// Selection and local moves from pointer input
pub fn handle_square_input(
    mut inputs: MessageReader<SquareInput>,
    mut board: ResMut<MatchBoard>,
    mut clock: ResMut<MatchClock>,
    mut coordinator: ResMut<AnimationCoordinator>,
    mut actions: MessageWriter<ClientAction>,
    mut committed: MessageWriter<BoardCommitted>,
    time: Res<Time>,
) {
    for input in inputs.read() {
        let (destination, source) = match *input {
            SquareInput::Press(square) => {
                // Clicking another own piece switches the selection
                if board.select(square) {
                    continue;
                }
                (square, MoveSource::LocalClick)
            }
            SquareInput::DragStart(square) => {
                board.select(square);
                continue;
            }
            SquareInput::DropOn(square) => (square, MoveSource::LocalDrop),
        };

        if let Some(applied) = board.apply_local_move(destination, source, &mut actions) {
            let flagged = clock.set_turn(board.turn(), time.elapsed());
            raise_flag(flagged, &mut actions);
            schedule_or_commit(&mut coordinator, &applied, time.elapsed(), &mut committed);
        }
    }
}

/// Draw offers, resignation and exit
pub fn handle_player_commands(
    mut player_commands: MessageReader<PlayerCommand>,
    mut session: ResMut<MatchSession>,
    board: Res<MatchBoard>,
    mut actions: MessageWriter<ClientAction>,
) {
    for command in player_commands.read() {
        match command {
            PlayerCommand::OfferDraw if !board.is_terminal() => session.offer_draw(&mut actions),
            PlayerCommand::AcceptDraw => {
                session.accept_draw(&mut actions);
            }
            PlayerCommand::Resign if !board.is_terminal() => session.resign(&mut actions),
            PlayerCommand::Exit => session.exit(&mut actions),
            _ => debug!("[MATCH] Ignoring {:?} after the round ended", command),
        }
    }
}

/// Fold server events into board, clock and session
#[allow(clippy::too_many_arguments)]
pub fn apply_server_events(
    mut events: MessageReader<ServerEvent>,
    mut board: ResMut<MatchBoard>,
    mut clock: ResMut<MatchClock>,
    mut session: ResMut<MatchSession>,
    mut coordinator: ResMut<AnimationCoordinator>,
    mut ticker: ResMut<ClockTicker>,
    settings: Res<MatchSettings>,
    time: Res<Time>,
    mut committed: MessageWriter<BoardCommitted>,
    mut actions: MessageWriter<ClientAction>,
) {
    let now = time.elapsed();
    for event in events.read() {
        match event {
            ServerEvent::Start(start) => {
                board.start_round(start.colour);
                clock.reset(start.time_remaining_ms(), start.colour, now);
                ticker.0.reset();
                session.begin_round(start.round, start.total_rounds);
                coordinator.set_orientation(Orientation::for_seat(start.colour));
                coordinator.reset(*board.board());
                committed.write(BoardCommitted {
                    board: *board.board(),
                });
                info!(
                    "[MATCH] Round {}/{} as {}",
                    start.round,
                    start.total_rounds,
                    start.colour.name()
                );
            }
            ServerEvent::Move(update) => {
                if let Some(applied) = board.apply_remote_update(update) {
                    schedule_or_commit(&mut coordinator, &applied, now, &mut committed);
                }
                let flagged = if update.turn.is_some() {
                    clock.set_turn(board.turn(), now)
                } else {
                    None
                };

                let lag = if settings.compensate_transit_lag {
                    update.transit_lag(epoch_now_ms())
                } else {
                    0
                };
                clock.resync_lagged(
                    update.time_remaining_ms(PieceColor::White),
                    update.time_remaining_ms(PieceColor::Black),
                    lag,
                    now,
                );
                if clock.state() == ClockState::Flagged {
                    raise_flag(flagged, &mut actions);
                }

                if let Some(outcome) = update.outcome {
                    let result = RoundResult {
                        outcome,
                        winner: update.winner,
                    };
                    session.record_result(result, update.match_score);
                    clock.stop();
                    if let Some(snapshot) = coordinator.cancel() {
                        committed.write(BoardCommitted { board: snapshot });
                    }
                }
            }
            ServerEvent::ClockSync(sync) => {
                let flagged = clock.sync(sync.white_ms(), sync.black_ms(), now);
                raise_flag(flagged, &mut actions);
            }
            ServerEvent::DrawOffer => {
                info!("[MATCH] Opponent offers a draw");
                session.receive_draw_offer();
            }
            ServerEvent::MatchEnded(ended) => {
                match ended.overall_winner {
                    Some(color) => info!("[MATCH] Match over, {} wins", color.name()),
                    None => info!("[MATCH] Match over, drawn"),
                }
                session.end_series(ended.overall_winner);
                clock.stop();
            }
        }
    }
}

/// Advance the clock prediction on every ticker period
pub fn tick_match_clock(
    time: Res<Time>,
    mut ticker: ResMut<ClockTicker>,
    mut clock: ResMut<MatchClock>,
    mut actions: MessageWriter<ClientAction>,
) {
    ticker.0.tick(time.delta());
    if !ticker.0.just_finished() {
        return;
    }
    let flagged = clock.tick(time.elapsed());
    raise_flag(flagged, &mut actions);
}

/// Commit the pending snapshot once its animation delay is over
pub fn commit_pending_board(
    time: Res<Time>,
    mut coordinator: ResMut<AnimationCoordinator>,
    mut committed: MessageWriter<BoardCommitted>,
) {
    if let Some(board) = coordinator.poll(time.elapsed()) {
        committed.write(BoardCommitted { board });
    }
}

/// Encode queued client actions onto the link
pub fn flush_client_actions(
    mut actions: MessageReader<ClientAction>,
    link: Option<ResMut<MatchLink>>,
) {
    let Some(mut link) = link else {
        for action in actions.read() {
            debug!("[NETWORK] No link, dropping {}", action.name());
        }
        return;
    };

    for action in actions.read() {
        if let Err(e) = link.send(action) {
            warn!("[NETWORK] Could not send {}: {}", action.name(), e);
        }
        if *action == ClientAction::Exit {
            link.close();
        }
    }
}

/// Release everything that could still fire against a discarded board
pub fn teardown_match(world: &mut World) {
    if let Some(mut coordinator) = world.get_resource_mut::<AnimationCoordinator>() {
        coordinator.cancel();
    }
    if let Some(mut clock) = world.get_resource_mut::<MatchClock>() {
        clock.stop();
    }
    if let Some(mut link) = world.get_resource_mut::<MatchLink>() {
        link.close();
    }
    info!("[MATCH] Match torn down");
}
