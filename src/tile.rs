use serde::{Deserialize, Serialize};

/// Lifecycle of one board tile. `Hidden` only exists before the board is
/// materialized; `Recycled` is terminal and means every pooled handle has
/// been returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TilePhase {
    Hidden,
    Clickable,
    Exploding,
    Recycled,
}

impl TilePhase {
    pub const fn is_clickable(self) -> bool {
        matches!(self, Self::Clickable)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Recycled)
    }
}

impl Default for TilePhase {
    fn default() -> Self {
        Self::Hidden
    }
}
