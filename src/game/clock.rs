//! Match clock
//!
//! Two countdowns in milliseconds, one per color. Only the side to move is
//! charged. The local tick is a prediction: every server update that carries
//! remaining times overwrites it.
//!
//! # Time base
//!
//! [`MatchClock::tick`] takes a monotonic timestamp (`Duration` since app
//! start) instead of a fixed period. Elapsed time is measured from the previous
//! baseline, so a late or throttled tick still charges the right amount.
//!
//! # States
//!
//! ```text
//! Idle ──start──▶ Running ──own clock hits 0──▶ Flagged
//!                    │  ▲                          │
//!                    │  └──resync with time left───┘
//!                    └──stop (round over)──▶ Stopped
//! ```

use super::types::PieceColor;
use bevy_ecs::prelude::*;
use std::time::Duration;
use tracing::{debug, info};

/// Remaining time per color, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockPair {
    pub white: u64,
    pub black: u64,
}

impl ClockPair {
    pub fn uniform(milliseconds: u64) -> Self {
        ClockPair {
            white: milliseconds,
            black: milliseconds,
        }
    }

    pub fn get(&self, color: PieceColor) -> u64 {
        match color {
            PieceColor::White => self.white,
            PieceColor::Black => self.black,
        }
    }

    fn slot(&mut self, color: PieceColor) -> &mut u64 {
        match color {
            PieceColor::White => &mut self.white,
            PieceColor::Black => &mut self.black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Idle,
    Running,
    /// Local clock ran out and the flag has been raised
    Flagged,
    /// Round over; ticks are ignored until the next round
    Stopped,
}

/// Emitted by [`MatchClock::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    FlagRaised(PieceColor),
}

/// Resource holding both clocks and the turn they follow
#[derive(Resource, Debug, Clone)]
pub struct MatchClock {
    times: ClockPair,
    turn: PieceColor,
    local_color: PieceColor,
    state: ClockState,
    baseline: Option<Duration>,
}

impl Default for MatchClock {
    fn default() -> Self {
        MatchClock::new(0)
    }
}

impl MatchClock {
    pub fn new(initial_ms: u64) -> Self {
        MatchClock {
            times: ClockPair::uniform(initial_ms),
            turn: PieceColor::White,
            local_color: PieceColor::White,
            state: ClockState::Idle,
            baseline: None,
        }
    }

    /// Begin a round: both sides get `initial_ms`, white to move
    pub fn reset(&mut self, initial_ms: u64, local_color: PieceColor, now: Duration) {
        self.times = ClockPair::uniform(initial_ms);
        self.turn = PieceColor::White;
        self.local_color = local_color;
        self.state = ClockState::Running;
        self.baseline = Some(now);
        info!("[CLOCK] Reset to {} ms each", initial_ms);
    }

    /// Start counting from `now` without touching the remaining times
    pub fn start(&mut self, now: Duration) {
        self.state = ClockState::Running;
        self.baseline = Some(now);
    }

    /// Halt for good; only [`MatchClock::reset`] restarts a stopped clock
    pub fn stop(&mut self) {
        if self.state != ClockState::Stopped {
            debug!("[CLOCK] Stopped at {:?}", self.times);
        }
        self.state = ClockState::Stopped;
        self.baseline = None;
    }

    /// Charge the side to move for the time since the last baseline
    ///
    /// Returns a flag event exactly once, when the local player's own clock
    /// reaches zero on their turn.
    pub fn tick(&mut self, now: Duration) -> Option<ClockEvent> {
        if self.state != ClockState::Running {
            return None;
        }
        let Some(baseline) = self.baseline else {
            self.baseline = Some(now);
            return None;
        };

        let elapsed_ms = now.saturating_sub(baseline).as_millis() as u64;
        // Advance by the whole milliseconds charged so fractions carry over
        self.baseline = Some(baseline + Duration::from_millis(elapsed_ms));

        let remaining = self.times.slot(self.turn);
        *remaining = remaining.saturating_sub(elapsed_ms);

        if *remaining == 0 && self.turn == self.local_color {
            self.state = ClockState::Flagged;
            info!("[CLOCK] {} flagged", self.turn.name());
            return Some(ClockEvent::FlagRaised(self.turn));
        }
        None
    }

    /// Overwrite whichever sides the server reported and restart the baseline
    ///
    /// A payload with neither value is ignored entirely.
    pub fn resync(&mut self, white: Option<u64>, black: Option<u64>, now: Duration) {
        if white.is_none() && black.is_none() {
            return;
        }
        if let Some(ms) = white {
            self.times.white = ms;
        }
        if let Some(ms) = black {
            self.times.black = ms;
        }
        if self.state == ClockState::Stopped {
            return;
        }
        self.baseline = Some(now);
        if self.state == ClockState::Flagged && self.times.get(self.local_color) > 0 {
            self.state = ClockState::Running;
        }
        debug!("[CLOCK] Resynced to {:?}", self.times);
    }

    /// Resync, then charge the side to move for the transit lag
    pub fn resync_lagged(
        &mut self,
        white: Option<u64>,
        black: Option<u64>,
        lag_ms: u64,
        now: Duration,
    ) {
        if white.is_none() && black.is_none() {
            return;
        }
        self.resync(white, black, now);
        if lag_ms > 0 && self.state != ClockState::Stopped {
            let remaining = self.times.slot(self.turn);
            *remaining = remaining.saturating_sub(lag_ms);
            debug!("[CLOCK] Charged {} ms transit lag to {}", lag_ms, self.turn.name());
        }
    }

    /// Dedicated sync event: resync and treat it as a turn change
    ///
    /// Time since the last tick is charged to the outgoing side first. A flag
    /// raised by that charge is returned only if the resync did not clear it.
    pub fn sync(
        &mut self,
        white: Option<u64>,
        black: Option<u64>,
        now: Duration,
    ) -> Option<ClockEvent> {
        let event = self.tick(now);
        self.resync(white, black, now);
        self.turn = self.turn.opponent();
        event.filter(|_| self.state == ClockState::Flagged)
    }

    /// Follow the board's turn
    ///
    /// The outgoing side is charged up to `now` before the switch, so the next
    /// tick only charges the new side to move.
    pub fn set_turn(&mut self, turn: PieceColor, now: Duration) -> Option<ClockEvent> {
        if turn == self.turn {
            return None;
        }
        let event = self.tick(now);
        self.turn = turn;
        event
    }

    pub fn turn(&self) -> PieceColor {
        self.turn
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn local_color(&self) -> PieceColor {
        self.local_color
    }

    /// Copy of both remaining times for display
    pub fn snapshot(&self) -> ClockPair {
        self.times
    }

    pub fn remaining(&self, color: PieceColor) -> u64 {
        self.times.get(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn running(initial: u64, local: PieceColor) -> MatchClock {
        let mut clock = MatchClock::new(initial);
        clock.reset(initial, local, ms(0));
        clock
    }

    #[test]
    fn test_tick_charges_mover_then_flags_once() {
        //! 300s each, white to move: 30s tick charges white only, then one flag
        let mut clock = running(300_000, PieceColor::White);

        assert_eq!(clock.tick(ms(30_000)), None);
        assert_eq!(
            clock.snapshot(),
            ClockPair {
                white: 270_000,
                black: 300_000
            }
        );

        assert_eq!(
            clock.tick(ms(400_000)),
            Some(ClockEvent::FlagRaised(PieceColor::White))
        );
        assert_eq!(clock.remaining(PieceColor::White), 0);
        assert_eq!(clock.tick(ms(400_100)), None, "flag is raised only once");
        assert_eq!(clock.tick(ms(500_000)), None);
        assert_eq!(clock.state(), ClockState::Flagged);
    }

    #[test]
    fn test_tick_is_monotone_for_side_to_move() {
        //! clock[c]' = max(0, clock[c] - e), other side untouched
        let mut clock = running(10_000, PieceColor::White);
        clock.set_turn(PieceColor::Black, ms(0));
        let mut now = 0;
        for step in [0, 1, 99, 250, 4_000, 7_000] {
            let before = clock.snapshot();
            now += step;
            clock.tick(ms(now));
            let after = clock.snapshot();
            assert_eq!(after.black, before.black.saturating_sub(step));
            assert_eq!(after.white, before.white);
        }
        assert_eq!(clock.remaining(PieceColor::Black), 0);
    }

    #[test]
    fn test_opponent_running_out_does_not_flag() {
        //! Only the local player's own clock raises a flag
        let mut clock = running(1_000, PieceColor::Black);
        assert_eq!(clock.tick(ms(5_000)), None);
        assert_eq!(clock.remaining(PieceColor::White), 0);
        assert_eq!(clock.state(), ClockState::Running);
    }

    #[test]
    fn test_fractional_milliseconds_carry_over() {
        let mut clock = running(1_000, PieceColor::White);
        clock.tick(Duration::from_micros(1_500));
        clock.tick(Duration::from_micros(3_000));
        assert_eq!(clock.remaining(PieceColor::White), 997);
    }

    #[test]
    fn test_resync_partial_payload() {
        //! Missing fields keep their local prediction
        let mut clock = running(60_000, PieceColor::White);
        clock.tick(ms(10_000));
        clock.resync(None, Some(42_000), ms(10_000));
        assert_eq!(clock.remaining(PieceColor::White), 50_000);
        assert_eq!(clock.remaining(PieceColor::Black), 42_000);

        clock.resync(None, None, ms(20_000));
        clock.tick(ms(20_000));
        assert_eq!(
            clock.remaining(PieceColor::White),
            40_000,
            "empty resync keeps the old baseline"
        );
    }

    #[test]
    fn test_resync_resets_baseline() {
        let mut clock = running(60_000, PieceColor::White);
        clock.resync(Some(55_000), Some(60_000), ms(5_000));
        clock.tick(ms(6_000));
        assert_eq!(clock.remaining(PieceColor::White), 54_000);
    }

    #[test]
    fn test_turn_change_charges_outgoing_side() {
        //! White moves 90ms after the last tick, black then thinks for 10ms
        let mut clock = running(300_000, PieceColor::White);
        assert_eq!(clock.set_turn(PieceColor::Black, ms(90)), None);
        clock.tick(ms(100));
        assert_eq!(
            clock.snapshot(),
            ClockPair {
                white: 299_910,
                black: 299_990
            }
        );

        clock.set_turn(PieceColor::Black, ms(150));
        clock.tick(ms(200));
        assert_eq!(clock.remaining(PieceColor::Black), 299_890);
        assert_eq!(clock.remaining(PieceColor::White), 299_910);
    }

    #[test]
    fn test_turn_change_can_raise_flag() {
        //! Running out on the move that hands the turn over still flags
        let mut clock = running(50, PieceColor::White);
        assert_eq!(
            clock.set_turn(PieceColor::Black, ms(80)),
            Some(ClockEvent::FlagRaised(PieceColor::White))
        );
        assert_eq!(clock.state(), ClockState::Flagged);
        assert_eq!(clock.turn(), PieceColor::Black);
    }

    #[test]
    fn test_sync_charges_outgoing_side_before_flip() {
        //! A partial sync keeps the charged value for the missing side
        let mut clock = running(60_000, PieceColor::White);
        assert_eq!(clock.sync(None, Some(60_000), ms(700)), None);
        assert_eq!(clock.remaining(PieceColor::White), 59_300);
        clock.tick(ms(1_000));
        assert_eq!(clock.remaining(PieceColor::Black), 59_700);
        assert_eq!(clock.remaining(PieceColor::White), 59_300);
    }

    #[test]
    fn test_sync_event_flips_turn() {
        let mut clock = running(60_000, PieceColor::White);
        clock.sync(Some(58_000), Some(60_000), ms(2_000));
        assert_eq!(clock.turn(), PieceColor::Black);
        clock.tick(ms(3_000));
        assert_eq!(clock.remaining(PieceColor::White), 58_000);
        assert_eq!(clock.remaining(PieceColor::Black), 59_000);
    }

    #[test]
    fn test_lag_charged_to_side_to_move() {
        let mut clock = running(60_000, PieceColor::White);
        clock.set_turn(PieceColor::Black, ms(0));
        clock.resync_lagged(Some(59_000), Some(60_000), 250, ms(1_000));
        assert_eq!(clock.remaining(PieceColor::Black), 59_750);
        assert_eq!(clock.remaining(PieceColor::White), 59_000);
    }

    #[test]
    fn test_stopped_clock_ignores_ticks() {
        let mut clock = running(60_000, PieceColor::White);
        clock.stop();
        assert_eq!(clock.tick(ms(30_000)), None);
        assert_eq!(clock.remaining(PieceColor::White), 60_000);

        clock.resync(Some(10_000), None, ms(30_000));
        assert_eq!(clock.state(), ClockState::Stopped);
        assert_eq!(clock.remaining(PieceColor::White), 10_000);
    }

    #[test]
    fn test_resync_after_flag_resumes() {
        let mut clock = running(100, PieceColor::White);
        assert!(clock.tick(ms(200)).is_some());
        clock.resync(Some(5_000), None, ms(200));
        assert_eq!(clock.state(), ClockState::Running);
        clock.tick(ms(1_200));
        assert_eq!(clock.remaining(PieceColor::White), 4_000);
    }

    #[test]
    fn test_idle_clock_does_not_run() {
        let mut clock = MatchClock::new(1_000);
        assert_eq!(clock.tick(ms(5_000)), None);
        assert_eq!(clock.remaining(PieceColor::White), 1_000);
        clock.start(ms(5_000));
        clock.tick(ms(5_500));
        assert_eq!(clock.remaining(PieceColor::White), 500);
    }
}
