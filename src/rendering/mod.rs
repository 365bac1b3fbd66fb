//! Board presentation: square anchors, move animation and piece entities

pub mod anchors;
pub mod animation;
pub mod visuals;

pub use anchors::SquareAnchors;
pub use animation::{AnimationCoordinator, PieceTransition};
pub use visuals::{position_piece_visuals, sync_piece_visuals, PieceVisual};
