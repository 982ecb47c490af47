use serde::{Deserialize, Serialize};

/// State of a single board position.
///
/// `is_mine` and `neighbor_count` are fixed when the board is generated, `is_revealed` only ever goes from `false` to
/// `true`, and `is_flagged` may only change while the cell is still unrevealed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    /// Mines among the grid-clipped neighbors, always zero for mines.
    pub neighbor_count: u8,
}

impl Cell {
    /// Whether a plain reveal would do anything to this cell.
    pub const fn is_revealable(self) -> bool {
        !self.is_revealed && !self.is_flagged
    }

    /// Whether flood fill continues through this cell once revealed.
    pub const fn is_empty(self) -> bool {
        !self.is_mine && self.neighbor_count == 0
    }
}
