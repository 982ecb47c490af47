use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rectangular board of [`Cell`]s addressed by `(x, y)`.
///
/// Public operations never mutate a grid in place, they hand back a new grid (see [`reveal_cell`]) so callers can
/// tell a no-op apart from a change by whether they got their own grid back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<Cell>,
}

impl Grid {
    /// A grid with no mines and nothing revealed or flagged.
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(nd_index(size)),
        }
    }

    /// Builds a grid with mines at exactly the given coordinates and neighbor counts filled in.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut grid = Self::new(size);

        for &coords in mine_coords {
            let coords = grid.validate_coords(coords)?;
            grid.cell_mut(coords).is_mine = true;
        }

        grid.compute_neighbor_counts();
        Ok(grid)
    }

    pub fn size(&self) -> Coord2 {
        let (dim_x, dim_y) = self.cells.dim();
        (dim_x as Coord, dim_y as Coord)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        area(self.size())
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// All cells with their coordinates, column by column.
    pub fn cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((x, y), &cell)| ((x as Coord, y as Coord), cell))
    }

    /// The up-to-8 cells touching `coords`, row by row, clipped to the board.
    pub fn iter_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<> {
        let (x, y) = coords;
        let (width, height) = self.size();
        let columns = x.saturating_sub(1)..x.saturating_add(2).min(width);
        let rows = y.saturating_sub(1)..y.saturating_add(2).min(height);

        rows.flat_map(move |ny| columns.clone().map(move |nx| (nx, ny)))
            .filter(move |&pos| pos != coords)
    }

    pub fn mine_count(&self) -> CellCount {
        self.count_cells(|cell| cell.is_mine)
    }

    pub fn flag_count(&self) -> CellCount {
        self.count_cells(|cell| cell.is_flagged)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.count_cells(|cell| cell.is_revealed)
    }

    /// Mines not yet accounted for by a flag, negative when the player over-flags.
    pub fn mines_left(&self) -> isize {
        (self.mine_count() as isize) - (self.flag_count() as isize)
    }

    pub fn count_adjacent_mines(&self, coords: Coord2) -> u8 {
        self.count_neighbors(coords, |cell| cell.is_mine)
    }

    pub fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.count_neighbors(coords, |cell| cell.is_flagged)
    }

    /// Copies the flags of `other` onto this grid, used when the mines are placed after the player started flagging.
    pub fn with_flags_from(mut self, other: &Grid) -> Self {
        if other.size() != self.size() {
            log::warn!(
                "Ignoring flags from a {:?} grid on a {:?} grid",
                other.size(),
                self.size()
            );
            return self;
        }

        for cell in self.cells.iter_mut() {
            cell.is_flagged = false;
        }
        for (coords, cell) in other.cells() {
            if cell.is_flagged && !self[coords].is_revealed {
                self.cell_mut(coords).is_flagged = true;
            }
        }
        self
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[nd_index(coords)]
    }

    /// Recomputes every non-mine cell's neighbor count, mines keep zero.
    pub(crate) fn compute_neighbor_counts(&mut self) {
        let (x_end, y_end) = self.size();
        for x in 0..x_end {
            for y in 0..y_end {
                let coords = (x, y);
                let count = if self[coords].is_mine {
                    0
                } else {
                    self.count_adjacent_mines(coords)
                };
                self.cell_mut(coords).neighbor_count = count;
            }
        }
    }

    /// Reveals every mine, returns whether any cell changed.
    pub(crate) fn reveal_all_mines(&mut self) -> bool {
        let mut changed = false;
        for cell in self.cells.iter_mut() {
            if cell.is_mine && !cell.is_revealed {
                cell.is_revealed = true;
                changed = true;
            }
        }
        changed
    }

    fn count_cells(&self, predicate: impl Fn(&Cell) -> bool) -> CellCount {
        // at most `Coord::MAX * Coord::MAX` cells, fits in `CellCount`
        self.cells.iter().filter(|cell| predicate(cell)).count() as CellCount
    }

    fn count_neighbors(&self, coords: Coord2, predicate: impl Fn(&Cell) -> bool) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| predicate(&self[pos]))
            .count() as u8
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[nd_index(coords)]
    }
}

/// `Array2` is indexed `[x, y]`, so the first axis runs along the width.
fn nd_index((x, y): Coord2) -> [usize; 2] {
    [x.into(), y.into()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_counts_follow_mines() {
        let grid = Grid::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();

        assert_eq!(grid.mine_count(), 2);
        assert_eq!(grid[(1, 1)].neighbor_count, 2);
        assert_eq!(grid[(1, 0)].neighbor_count, 1);
        assert_eq!(grid[(2, 0)].neighbor_count, 0);
        assert_eq!(grid[(0, 0)].neighbor_count, 0);
    }

    #[test]
    fn neighbors_are_clipped_to_the_board() {
        let grid = Grid::new((9, 9));
        let corner: alloc::vec::Vec<_> = grid.iter_neighbors((0, 0)).collect();

        assert_eq!(corner, [(1, 0), (0, 1), (1, 1)]);
        assert_eq!(grid.iter_neighbors((4, 0)).count(), 5);
        assert_eq!(grid.iter_neighbors((4, 4)).count(), 8);
        assert_eq!(Grid::new((30, 16)).iter_neighbors((29, 15)).count(), 3);
        assert_eq!(Grid::new((1, 1)).iter_neighbors((0, 0)).count(), 0);
        assert_eq!(Grid::new((3, 1)).iter_neighbors((1, 0)).count(), 2);
    }

    #[test]
    fn out_of_bounds_mines_are_rejected() {
        assert_eq!(
            Grid::from_mine_coords((3, 3), &[(3, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn size_is_width_by_height() {
        let grid = Grid::new((30, 16));

        assert_eq!(grid.size(), (30, 16));
        assert_eq!(grid.width(), 30);
        assert_eq!(grid.height(), 16);
        assert_eq!(grid.total_cells(), 480);
        assert!(grid.validate_coords((29, 15)).is_ok());
        assert_eq!(grid.validate_coords((15, 29)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn carried_flags_skip_revealed_cells() {
        let mut placeholder = Grid::new((2, 2));
        placeholder.cell_mut((0, 0)).is_flagged = true;
        placeholder.cell_mut((1, 1)).is_flagged = true;

        let mut generated = Grid::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        generated.cell_mut((1, 1)).is_revealed = true;
        let generated = generated.with_flags_from(&placeholder);

        assert!(generated[(0, 0)].is_flagged);
        assert!(!generated[(1, 1)].is_flagged);
        assert_eq!(generated.mines_left(), 0);
    }
}
