use super::*;

/// Uniformly random placement, optionally keeping one coordinate (the first click) safe.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
    safe: Option<Coord2>,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64, safe: Option<Coord2>) -> Self {
        Self { seed, safe }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: BoardConfig) -> Grid {
        use rand::prelude::*;

        let mut grid = Grid::new(config.size);

        let safe = self.safe.and_then(|coords| match grid.validate_coords(coords) {
            Ok(coords) => Some(coords),
            Err(_) => {
                log::warn!("Safe coordinate {:?} is outside the board, ignored", coords);
                None
            }
        });

        // rejection sampling only terminates while there are free cells left to pick
        let free_cells = config.total_cells() - CellCount::from(safe.is_some());
        debug_assert!(config.mines <= free_cells, "board config should be validated");
        let mines = if config.mines > free_cells {
            log::warn!(
                "Requested {} mines but only {} cells are free, placing {}",
                config.mines,
                free_cells,
                free_cells
            );
            free_cells
        } else {
            config.mines
        };

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let (width, height) = config.size;
        let mut placed = 0;
        while placed < mines {
            let coords = (rng.random_range(0..width), rng.random_range(0..height));
            if Some(coords) == safe || grid[coords].is_mine {
                continue;
            }
            grid.cell_mut(coords).is_mine = true;
            placed += 1;
        }
        log::debug!(
            "Placed {} mines on a {}x{} board (seed {}, safe {:?})",
            placed,
            width,
            height,
            self.seed,
            safe
        );

        grid.compute_neighbor_counts();
        grid
    }
}
