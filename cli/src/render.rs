use clearfield_core::{Cell, GameSettings, Grid};
use clearfield_session::{GameStatus, LeaderboardEntry};

fn cell_char(cell: Cell) -> char {
    match cell {
        Cell { is_revealed: true, is_mine: true, .. } => '*',
        Cell { is_revealed: true, neighbor_count: 0, .. } => '.',
        Cell { is_revealed: true, neighbor_count, .. } => char::from(b'0' + neighbor_count),
        Cell { is_flagged: true, .. } => 'F',
        _ => '#',
    }
}

/// Text dump of the board with x along the top and y down the side.
pub fn board(grid: &Grid) -> String {
    let (width, height) = grid.size();
    let mut out = String::from("   ");
    for x in 0..width {
        out.push_str(&format!("{:>2}", x % 100));
    }
    out.push('\n');

    for y in 0..height {
        out.push_str(&format!("{y:>2} "));
        for x in 0..width {
            out.push(' ');
            out.push(cell_char(grid[(x, y)]));
        }
        out.push('\n');
    }
    out
}

pub fn status_line(status: GameStatus, mines_left: isize, elapsed_secs: u32) -> String {
    let label = match status {
        GameStatus::Idle => "press n for a new game",
        GameStatus::Playing => "playing",
        GameStatus::Won => "Victory! record it with: w NAME",
        GameStatus::Lost => "Game Over",
    };
    format!("mines {}  time {}s  {}", mines_left.max(0), elapsed_secs, label)
}

/// Ranking for one category, `entries` are expected to be filtered and sorted already.
pub fn leaderboard(category: GameSettings, entries: &[LeaderboardEntry]) -> String {
    let title = format!("{} {}", category.size, category.difficulty);
    if entries.is_empty() {
        return format!("no {title} games recorded yet\n");
    }

    let mut out = format!("best times, {title}\n");
    for (rank, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {:<16} {:>5}s  {}\n",
            rank + 1,
            entry.player_name,
            entry.time,
            entry.date.date()
        ));
    }
    out
}
