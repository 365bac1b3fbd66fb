//! Match plugin - client-side match state and systems
//!
//! Registers the match resources, the messages flowing between network,
//! input and view, and the systems in [`MatchSystems`] order.
//!
//! # Plugin Dependencies
//!
//! Needs a [`Time`] resource that advances every frame (`bevy_time::TimePlugin`
//! in a running app; tests advance it by hand). [`MatchSettings`] is read at
//! build time, so insert a loaded copy before adding the plugin to override
//! the defaults.
//!
//! A [`crate::networking::MatchLink`] resource is optional: without one, server
//! events can still be written directly as messages and outbound actions are
//! dropped.

use super::board::Orientation;
use super::clock::MatchClock;
use super::events::{BoardCommitted, BoardResized, PlayerCommand, SquareInput};
use super::reconciler::MatchBoard;
use super::session::MatchSession;
use super::system_sets::MatchSystems;
use super::systems::*;
use crate::core::{save_settings_system, MatchSettings};
use crate::networking::protocol::{ClientAction, ServerEvent};
use crate::rendering::{position_piece_visuals, sync_piece_visuals, AnimationCoordinator};
use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_time::Time;

/// Match plugin for the duel client
pub struct MatchPlugin;

impl Plugin for MatchPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Time>().init_resource::<MatchSettings>();

        let settings = app.world().resource::<MatchSettings>().clone();
        app.insert_resource(AnimationCoordinator::new(
            Orientation::WhiteBottom,
            settings.commit_delay(),
        ))
        .insert_resource(ClockTicker::new(settings.clock_tick()))
        .init_resource::<MatchBoard>()
        .init_resource::<MatchClock>()
        .init_resource::<MatchSession>();

        app.add_message::<ServerEvent>()
            .add_message::<ClientAction>()
            .add_message::<SquareInput>()
            .add_message::<PlayerCommand>()
            .add_message::<BoardResized>()
            .add_message::<BoardCommitted>();

        // Network → Input → Reconcile → Clock → Visual → Outbound
        app.configure_sets(
            Update,
            (
                MatchSystems::Network,
                MatchSystems::Input,
                MatchSystems::Reconcile,
                MatchSystems::Clock,
                MatchSystems::Visual,
                MatchSystems::Outbound,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                receive_server_events.in_set(MatchSystems::Network),
                (handle_board_resize, handle_square_input, handle_player_commands)
                    .chain()
                    .in_set(MatchSystems::Input),
                apply_server_events.in_set(MatchSystems::Reconcile),
                tick_match_clock.in_set(MatchSystems::Clock),
                (commit_pending_board, sync_piece_visuals, position_piece_visuals)
                    .chain()
                    .in_set(MatchSystems::Visual),
                (flush_client_actions, save_settings_system).in_set(MatchSystems::Outbound),
            ),
        );
    }
}
