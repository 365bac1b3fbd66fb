//! Per-square pixel anchors
//!
//! The rendered board reports its bounding rectangle in screen space (y grows
//! downward). Anchors are the corner each square is laid out from: the
//! bottom-left corner of a1 for the White seat, mirrored for Black, stepping
//! one square width per file and per rank.

use crate::game::board::Orientation;
use crate::game::types::Square;
use bevy_math::{Rect, Vec2};

/// Cached anchor for every square
#[derive(Debug, Clone, PartialEq)]
pub struct SquareAnchors {
    anchors: [Vec2; 64],
    square_size: f32,
}

impl SquareAnchors {
    /// Derive anchors from the board's bounding box
    ///
    /// Returns `None` for a degenerate (zero or negative width) rectangle, as
    /// happens before the board is first laid out.
    pub fn compute(bounds: Rect, orientation: Orientation) -> Option<Self> {
        let square_size = bounds.width() / 8.0;
        if square_size.is_nan() || square_size <= 0.0 {
            return None;
        }

        let (start, step) = match orientation {
            Orientation::WhiteBottom => (
                Vec2::new(bounds.min.x, bounds.max.y),
                Vec2::new(square_size, -square_size),
            ),
            Orientation::BlackBottom => (
                Vec2::new(bounds.max.x, bounds.min.y),
                Vec2::new(-square_size, square_size),
            ),
        };

        let mut anchors = [Vec2::ZERO; 64];
        for square in Square::all() {
            let (rank, file) = square.to_tuple();
            anchors[square.index()] =
                start + Vec2::new(step.x * file as f32, step.y * rank as f32);
        }
        Some(SquareAnchors {
            anchors,
            square_size,
        })
    }

    pub fn anchor(&self, square: Square) -> Vec2 {
        self.anchors[square.index()]
    }

    /// Screen-space translation that carries a piece from `from` to `to`
    pub fn delta(&self, from: Square, to: Square) -> Vec2 {
        self.anchor(to) - self.anchor(from)
    }

    pub fn square_size(&self) -> f32 {
        self.square_size
    }
}
