use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

/// Fixed board dimensions offered to the player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl BoardSize {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// `(width, height)` for this size.
    pub const fn dimensions(self) -> Coord2 {
        use BoardSize::*;
        match self {
            Small => (9, 9),
            Medium => (16, 16),
            Large => (30, 16),
        }
    }

    pub const fn name(self) -> &'static str {
        use BoardSize::*;
        match self {
            Small => "Small",
            Medium => "Medium",
            Large => "Large",
        }
    }
}

/// Fixed mine densities offered to the player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Normal, Self::Hard];

    /// Mine density as a whole percentage of the board.
    ///
    /// Kept integral so the mine count is an exact floor of `cells * density`.
    pub const fn mine_percent(self) -> u8 {
        use Difficulty::*;
        match self {
            Easy => 10,
            Normal => 15,
            Hard => 20,
        }
    }

    pub fn density(self) -> f32 {
        f32::from(self.mine_percent()) / 100.0
    }

    pub const fn name(self) -> &'static str {
        use Difficulty::*;
        match self {
            Easy => "Easy",
            Normal => "Normal",
            Hard => "Hard",
        }
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoardSize {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|size| size.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(GameError::UnknownSize)
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(GameError::UnknownDifficulty)
    }
}

/// The `(size, difficulty)` pair chosen by the player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameSettings {
    pub size: BoardSize,
    pub difficulty: Difficulty,
}

impl GameSettings {
    pub const fn new(size: BoardSize, difficulty: Difficulty) -> Self {
        Self { size, difficulty }
    }

    pub const fn board_config(self) -> BoardConfig {
        let size = self.size.dimensions();
        let total = area(size) as u32;
        let mines = total * self.difficulty.mine_percent() as u32 / 100;
        BoardConfig::new_unchecked(size, mines as CellCount)
    }
}

impl From<GameSettings> for BoardConfig {
    fn from(settings: GameSettings) -> Self {
        settings.board_config()
    }
}

// Every table entry has to leave at least one safe cell, otherwise mine placement could never finish.
const _: () = {
    let mut i = 0;
    while i < BoardSize::ALL.len() {
        let mut j = 0;
        while j < Difficulty::ALL.len() {
            let config = GameSettings::new(BoardSize::ALL[i], Difficulty::ALL[j]).board_config();
            assert!(config.mines < config.total_cells());
            j += 1;
        }
        i += 1;
    }
};

/// Resolved board shape and mine count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl BoardConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validates a custom configuration, mine placement needs at least one cell left free.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidCoords);
        }
        let config = Self::new_unchecked(size, mines);
        if mines >= config.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(config)
    }

    pub const fn total_cells(&self) -> CellCount {
        area(self.size)
    }
}
