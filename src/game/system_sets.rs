//! System organization using SystemSets
//!
//! Defines execution order for match systems. Each frame runs:
//!
//! 1. **Network** - Drain inbound frames into [`crate::networking::ServerEvent`] messages
//! 2. **Input** - Selection and local moves from pointer input, player commands
//! 3. **Reconcile** - Fold server events into board, clock and session
//! 4. **Clock** - Advance the clock prediction, raise the flag
//! 5. **Visual** - Commit pending snapshots, position piece entities
//! 6. **Outbound** - Encode queued client actions onto the link
//!
//! Input runs before Reconcile so a click landing in the same frame as an
//! opponent move is judged against the turn the player saw when clicking.

use bevy_ecs::prelude::*;

/// System execution order for the match client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum MatchSystems {
    Network,
    Input,
    Reconcile,
    Clock,
    Visual,
    Outbound,
}
