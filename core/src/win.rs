use crate::*;

/// The board is cleared when every safe cell is revealed and no mine is.
pub fn check_win(grid: &Grid) -> bool {
    grid.cells()
        .all(|(_, cell)| cell.is_mine != cell.is_revealed)
}
