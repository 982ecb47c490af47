use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::*;

/// Result of a chorded reveal.
#[derive(Clone, Debug, PartialEq)]
pub struct ChordOutcome<'a> {
    /// `Cow::Borrowed` when nothing changed.
    pub grid: Cow<'a, Grid>,
    /// An unflagged mine was among the opened neighbors.
    pub exploded: bool,
}

impl ChordOutcome<'_> {
    pub fn has_update(&self) -> bool {
        matches!(self.grid, Cow::Owned(_))
    }
}

/// Reveals `coords` and flood-fills outward from empty cells.
///
/// Already revealed or flagged targets hand the input back as `Cow::Borrowed`. Flags also stop the cascade, a flagged
/// cell is never opened automatically.
pub fn reveal_cell(grid: &Grid, coords: Coord2) -> Result<Cow<'_, Grid>> {
    let coords = grid.validate_coords(coords)?;

    if !grid[coords].is_revealable() {
        return Ok(Cow::Borrowed(grid));
    }

    let mut next = grid.clone();
    flood_reveal(&mut next, coords);
    Ok(Cow::Owned(next))
}

/// Opens every hidden, unflagged neighbor of a revealed number whose flag count matches it.
pub fn chord_reveal(grid: &Grid, coords: Coord2) -> Result<ChordOutcome<'_>> {
    let coords = grid.validate_coords(coords)?;
    let unchanged = ChordOutcome {
        grid: Cow::Borrowed(grid),
        exploded: false,
    };

    let cell = grid[coords];
    if !cell.is_revealed || cell.neighbor_count == 0 {
        return Ok(unchanged);
    }

    let flagged = grid.count_flagged_neighbors(coords);
    if flagged != cell.neighbor_count {
        log::trace!(
            "Chord at {:?} skipped, {} flags around a {}",
            coords,
            flagged,
            cell.neighbor_count
        );
        return Ok(unchanged);
    }

    let mut next = grid.clone();
    let mut exploded = false;
    let mut changed = false;
    for neighbor in grid.iter_neighbors(coords) {
        let neighbor_cell = next[neighbor];
        if !neighbor_cell.is_revealable() {
            continue;
        }
        if neighbor_cell.is_mine {
            exploded = true;
        } else {
            changed |= flood_reveal(&mut next, neighbor) > 0;
        }
    }

    if exploded {
        log::debug!("Chord at {:?} hit a mine", coords);
        changed |= next.reveal_all_mines();
    }

    Ok(if changed {
        ChordOutcome {
            grid: Cow::Owned(next),
            exploded,
        }
    } else {
        unchanged
    })
}

/// Reveals every mine, used when the game is lost.
pub fn reveal_mines(grid: &Grid) -> Cow<'_, Grid> {
    let mut next = grid.clone();
    if next.reveal_all_mines() {
        Cow::Owned(next)
    } else {
        Cow::Borrowed(grid)
    }
}

/// Flips the flag on an unrevealed cell, revealed cells hand the input back unchanged.
pub fn toggle_flag(grid: &Grid, coords: Coord2) -> Result<Cow<'_, Grid>> {
    let coords = grid.validate_coords(coords)?;

    if grid[coords].is_revealed {
        return Ok(Cow::Borrowed(grid));
    }

    let mut next = grid.clone();
    let cell = next.cell_mut(coords);
    cell.is_flagged = !cell.is_flagged;
    Ok(Cow::Owned(next))
}

/// Depth-first flood fill with an explicit stack, returns how many cells were revealed.
///
/// Cells already revealed are skipped on pop, so no visited set is needed and each cell is opened at most once.
fn flood_reveal(grid: &mut Grid, start: Coord2) -> CellCount {
    let mut revealed = 0;
    let mut to_visit = Vec::from([start]);

    while let Some(coords) = to_visit.pop() {
        let cell = grid.cell_mut(coords);
        if !cell.is_revealable() {
            continue;
        }

        cell.is_revealed = true;
        revealed += 1;

        if cell.is_empty() {
            to_visit.extend(grid.iter_neighbors(coords));
        }
    }

    log::trace!("Flood fill from {:?} revealed {} cells", start, revealed);
    revealed
}
