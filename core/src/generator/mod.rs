use crate::*;
pub use random::*;

mod random;

pub trait BoardGenerator {
    fn generate(self, config: BoardConfig) -> Grid;
}

/// Generates a board for the player's settings, optionally keeping `first_click` free of mines.
pub fn create_board(settings: GameSettings, first_click: Option<Coord2>, seed: u64) -> Grid {
    RandomBoardGenerator::new(seed, first_click).generate(settings.board_config())
}
