use serde::{Deserialize, Serialize};

/// Per-cell projection the rendering layer paints, derived from the board
/// plus the visibility masks and end-of-game overlays. Variants are listed
/// in precedence order.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellView {
    /// Highlighted as incorrect at game end: a wrongly flagged cell, or the
    /// cell whose open/guess ended the game.
    Mistake,
    /// Still flagged; `verified` carries the adjacency count exposed by a
    /// successful flag guess, if any.
    Flagged { verified: Option<u8> },
    Hidden,
    Revealed(u8),
    /// An uncovered mine, only ever visible once the game has ended.
    Mine,
}

impl CellView {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Revealed(_) | Self::Mine)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged { .. })
    }
}
