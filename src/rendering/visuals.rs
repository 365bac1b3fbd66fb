//! Piece entities for the displayed snapshot
//!
//! One [`PieceVisual`] entity per occupied square of the displayed board. They
//! are respawned whenever a snapshot is committed and repositioned every frame
//! from the square anchors plus any in-flight slide offset.

use super::animation::AnimationCoordinator;
use crate::game::events::BoardCommitted;
use crate::game::types::{Piece, Square};
use bevy_ecs::prelude::*;
use bevy_math::Vec3;
use bevy_transform::components::Transform;

/// Rendered piece sitting on a square of the displayed board
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceVisual {
    pub square: Square,
    pub piece: Piece,
}

/// Rebuild piece entities after a commit
pub fn sync_piece_visuals(
    mut commands: Commands,
    mut committed: MessageReader<BoardCommitted>,
    visuals: Query<Entity, With<PieceVisual>>,
) {
    let Some(latest) = committed.read().last() else {
        return;
    };

    for entity in visuals.iter() {
        commands.entity(entity).despawn();
    }
    for (square, piece) in latest.board.pieces() {
        commands.spawn((PieceVisual { square, piece }, Transform::default()));
    }
}

/// Place each piece at its anchor, shifted by any active slide
///
/// Screen space grows downward, world space upward, so y is negated.
pub fn position_piece_visuals(
    coordinator: Res<AnimationCoordinator>,
    mut visuals: Query<(&PieceVisual, &mut Transform)>,
) {
    let Some(anchors) = coordinator.anchors() else {
        return;
    };

    for (visual, mut transform) in visuals.iter_mut() {
        let screen = anchors.anchor(visual.square) + coordinator.offset_for(visual.square);
        transform.translation = Vec3::new(screen.x, -screen.y, 0.0);
        transform.scale = if coordinator.is_vanishing(visual.square) {
            Vec3::ZERO
        } else {
            Vec3::ONE
        };
    }
}
