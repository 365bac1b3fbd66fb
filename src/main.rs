//! duelchess command-line entry point
//!
//! `duelchess replay <events.jsonl>` drives a headless match from a file of
//! server frames, one JSON envelope per line. Lines starting with `>` are local
//! moves in notation (`> e2e4`), played as two square presses. Blank lines and
//! lines starting with `#` are skipped.

use anyhow::{Context, Result};
use bevy_app::App;
use bevy_math::Rect;
use bevy_time::Time;
use clap::{Parser, Subcommand, ValueEnum};
use duelchess::core::{load_settings, settings_path};
use duelchess::game::{
    format_clock, teardown_match, BoardResized, MatchBoard, MatchClock, MatchPlugin,
    MatchSession, Move, Orientation, PieceColor, SquareInput,
};
use duelchess::networking::MatchLink;
use duelchess::rendering::AnimationCoordinator;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duelchess", version, about = "Networked chess match client core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded stream of server frames
    Replay {
        /// File with one frame per line
        events: PathBuf,

        /// Seat to play before the first `start` frame arrives
        #[arg(long, value_enum, default_value_t = Seat::White)]
        colour: Seat,

        /// Simulated time between frames, milliseconds
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
        frame_ms: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Seat {
    White,
    Black,
}

impl From<Seat> for PieceColor {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::White => PieceColor::White,
            Seat::Black => PieceColor::Black,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay {
            events,
            colour,
            frame_ms,
        } => replay(&events, colour.into(), Duration::from_millis(frame_ms)),
    }
}

fn step(app: &mut App, frame: Duration) {
    app.world_mut().resource_mut::<Time>().advance_by(frame);
    app.update();
}

fn replay(path: &Path, colour: PieceColor, frame: Duration) -> Result<()> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let settings = load_settings(&settings_path());
    let settle_frames = settings.commit_delay().as_millis() / frame.as_millis().max(1) + 1;

    let (link, ends) = MatchLink::pair();
    let mut app = App::new();
    app.insert_resource(settings)
        .insert_resource(link)
        .add_plugins(MatchPlugin)
        .insert_resource(MatchBoard::new(colour));
    app.world_mut()
        .resource_mut::<AnimationCoordinator>()
        .set_orientation(Orientation::for_seat(colour));
    app.world_mut().write_message(BoardResized {
        bounds: Rect::new(0.0, 0.0, 800.0, 800.0),
    });

    let mut frames = 0usize;
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(text) = line.strip_prefix('>') {
            let mv = Move::from_uci(text.trim())
                .with_context(|| format!("line {}: bad local move", index + 1))?;
            app.world_mut().write_message(SquareInput::Press(mv.from));
            app.world_mut().write_message(SquareInput::Press(mv.to));
        } else {
            ends.to_client
                .send(line.to_string())
                .context("match link closed while replaying")?;
            frames += 1;
        }
        step(&mut app, frame);
    }
    for _ in 0..settle_frames {
        step(&mut app, frame);
    }
    info!("[MATCH] Replayed {} frames from {}", frames, path.display());

    let world = app.world();
    let board = world.resource::<MatchBoard>();
    let displayed = world.resource::<AnimationCoordinator>().displayed();
    println!("{}", displayed.render(Orientation::for_seat(board.local_color())));

    let clocks = world.resource::<MatchClock>().snapshot();
    println!(
        "White {}  Black {}  ({} to move)",
        format_clock(clocks.white),
        format_clock(clocks.black),
        board.turn().name()
    );

    let session = world.resource::<MatchSession>();
    if let Some(result) = session.last_result {
        println!("Round {}/{}: {}", session.round, session.total_rounds, result.summary());
    }
    if let Some([black, white]) = session.match_score {
        println!("Score: White {white} - Black {black}");
    }
    if session.series_over {
        match session.overall_winner {
            Some(color) => println!("Match won by {}", color.name()),
            None => println!("Match drawn"),
        }
    }

    for sent in ends.from_client.try_iter() {
        println!("-> {sent}");
    }
    teardown_match(app.world_mut());
    Ok(())
}
