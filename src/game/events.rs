use super::board::Board;
use super::types::Square;
use bevy_ecs::prelude::*;
use bevy_math::Rect;

/// Pointer input resolved to a canonical square by the view
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareInput {
    /// Click on a square: selects an own piece or plays the selection there
    Press(Square),
    /// Drag started on a square
    DragStart(Square),
    /// Dragged piece released over a square
    DropOn(Square),
}

/// Non-move player actions from the match UI
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    OfferDraw,
    AcceptDraw,
    Resign,
    Exit,
}

/// The rendered board's bounding box changed (screen space, y down)
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct BoardResized {
    pub bounds: Rect,
}

/// A snapshot became the displayed board
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCommitted {
    pub board: Board,
}
