use std::borrow::Cow;
use std::mem;

use clearfield_core::*;
use futures_channel::oneshot;
use futures_util::future::{BoxFuture, FutureExt};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Identifies one game within a session, changes on every new game.
pub type GameId = u64;

/// Valid transitions:
/// - Idle/Won/Lost -> Playing (new game)
/// - Playing -> Won
/// - Playing -> Lost
/// - Won -> Idle (win submitted)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Idle,
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// What a player action did to the session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Nothing changed, the action was not applicable.
    Ignored,
    Updated,
    Won,
    Lost,
}

impl ActionOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// When mines get placed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Generation {
    /// Wait for the first reveal and keep that cell safe.
    #[default]
    Deferred,
    /// Place mines as soon as the game starts, the first click may hit one.
    Eager,
}

struct PendingCommentary {
    game: GameId,
    receiver: oneshot::Receiver<String>,
}

/// Drives one player's games: board, status, elapsed time, flavor text and the leaderboard.
///
/// All actions take `&mut self`, so moves are applied one at a time. Elapsed time only advances through
/// [`tick`](Self::tick), which the host calls every [`TICK_INTERVAL`]. Flavor text requests are queued as tasks for
/// the host to spawn (see [`take_tasks`](Self::take_tasks)) and land through
/// [`poll_commentary`](Self::poll_commentary).
pub struct GameSession<G, S> {
    settings: GameSettings,
    generation: Generation,
    grid: Grid,
    mines_placed: bool,
    status: GameStatus,
    stopwatch: Stopwatch,
    game_id: GameId,
    rng: SmallRng,
    commentator: Commentator<G>,
    leaderboard: Leaderboard<S>,
    commentary: Option<String>,
    pending: Option<PendingCommentary>,
    tasks: Vec<BoxFuture<'static, ()>>,
}

impl<G: TextGenerator, S: KeyValueStore> GameSession<G, S> {
    pub fn new(settings: GameSettings, commentator: Commentator<G>, leaderboard: Leaderboard<S>) -> Self {
        Self {
            settings,
            generation: Generation::default(),
            grid: Grid::new(settings.size.dimensions()),
            mines_placed: false,
            status: GameStatus::Idle,
            stopwatch: Stopwatch::default(),
            game_id: 0,
            rng: SmallRng::seed_from_u64(rand::random()),
            commentator,
            leaderboard,
            commentary: None,
            pending: None,
            tasks: Vec::new(),
        }
    }

    /// Makes every board of this session reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generation = generation;
        self
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.stopwatch.elapsed()
    }

    pub fn is_timer_running(&self) -> bool {
        self.stopwatch.is_running()
    }

    /// Latest flavor text for the current game, if it arrived.
    pub fn commentary(&self) -> Option<&str> {
        self.commentary.as_deref()
    }

    pub fn has_pending_commentary(&self) -> bool {
        self.pending.is_some()
    }

    /// Mines minus flags, negative when over-flagged. Uses the configured count so it works before mines are placed.
    pub fn mines_left(&self) -> isize {
        (self.settings.board_config().mines as isize) - (self.grid.flag_count() as isize)
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard.entries()
    }

    /// Ranking for one size and difficulty, fastest first.
    pub fn leaderboard_for(&self, size: BoardSize, difficulty: Difficulty) -> Vec<LeaderboardEntry> {
        self.leaderboard.entries_for(size, difficulty)
    }

    /// Fastest recorded time for the current settings.
    pub fn best_time(&self) -> Option<LeaderboardEntry> {
        self.leaderboard
            .best_time(self.settings.size, self.settings.difficulty)
    }

    /// Starts over with the current settings, allowed from any state.
    pub fn new_game(&mut self) {
        self.game_id = self.game_id.wrapping_add(1);
        self.commentary = None;
        self.pending = None;

        self.grid = match self.generation {
            Generation::Eager => create_board(self.settings, None, self.rng.random()),
            Generation::Deferred => Grid::new(self.settings.size.dimensions()),
        };
        self.mines_placed = matches!(self.generation, Generation::Eager);
        self.status = GameStatus::Playing;
        self.stopwatch.start();

        log::debug!(
            "Game {} started: {} {} ({:?})",
            self.game_id,
            self.settings.size,
            self.settings.difficulty,
            self.generation
        );
    }

    pub fn new_game_with(&mut self, settings: GameSettings) {
        self.settings = settings;
        self.new_game();
    }

    pub fn tick(&mut self) {
        self.stopwatch.tick();
    }

    /// Opens a hidden, unflagged cell. A mine loses the game, clearing the last safe cell wins it.
    pub fn reveal(&mut self, coords: Coord2) -> ActionOutcome {
        if !self.status.is_playing() {
            return ActionOutcome::Ignored;
        }
        let coords = match self.grid.validate_coords(coords) {
            Ok(coords) => coords,
            Err(err) => {
                log::warn!("Ignoring reveal at {:?}: {}", coords, err);
                return ActionOutcome::Ignored;
            }
        };
        if !self.grid[coords].is_revealable() {
            return ActionOutcome::Ignored;
        }

        if !self.mines_placed {
            self.place_mines(coords);
        }

        if self.grid[coords].is_mine {
            log::debug!("Game {} hit a mine at {:?}", self.game_id, coords);
            self.grid = reveal_mines(&self.grid).into_owned();
            return self.lose();
        }

        let next = match reveal_cell(&self.grid, coords) {
            Ok(Cow::Owned(next)) => next,
            Ok(Cow::Borrowed(_)) => return ActionOutcome::Ignored,
            Err(err) => {
                log::warn!("Ignoring reveal at {:?}: {}", coords, err);
                return ActionOutcome::Ignored;
            }
        };
        self.grid = next;
        self.settle_after_reveal()
    }

    /// Opens the neighbors of a revealed number once its flags add up, see [`chord_reveal`].
    pub fn chord(&mut self, coords: Coord2) -> ActionOutcome {
        if !self.status.is_playing() {
            return ActionOutcome::Ignored;
        }

        let outcome = match chord_reveal(&self.grid, coords) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("Ignoring chord at {:?}: {}", coords, err);
                return ActionOutcome::Ignored;
            }
        };
        let exploded = outcome.exploded;
        let Cow::Owned(next) = outcome.grid else {
            return ActionOutcome::Ignored;
        };

        self.grid = next;
        if exploded {
            self.lose()
        } else {
            self.settle_after_reveal()
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> ActionOutcome {
        if !self.status.is_playing() {
            return ActionOutcome::Ignored;
        }

        match toggle_flag(&self.grid, coords) {
            Ok(Cow::Owned(next)) => {
                self.grid = next;
                ActionOutcome::Updated
            }
            Ok(Cow::Borrowed(_)) => ActionOutcome::Ignored,
            Err(err) => {
                log::warn!("Ignoring flag at {:?}: {}", coords, err);
                ActionOutcome::Ignored
            }
        }
    }

    /// Records the win under `player_name` and returns the updated leaderboard, `None` unless the game was won.
    pub fn submit_win(&mut self, player_name: &str) -> Option<Vec<LeaderboardEntry>> {
        if self.status != GameStatus::Won {
            return None;
        }

        let player_name = match player_name.trim() {
            "" => ANONYMOUS_PLAYER,
            name => name,
        };
        let entries = self.leaderboard.save_entry(NewEntry {
            player_name: player_name.to_owned(),
            time: self.stopwatch.elapsed(),
            size: self.settings.size,
            difficulty: self.settings.difficulty,
        });
        log::info!(
            "{} cleared {} {} in {}s",
            player_name,
            self.settings.size,
            self.settings.difficulty,
            self.stopwatch.elapsed()
        );

        self.status = GameStatus::Idle;
        Some(entries)
    }

    /// Hands over queued flavor text requests, the host spawns them on its executor.
    pub fn take_tasks(&mut self) -> Vec<BoxFuture<'static, ()>> {
        mem::take(&mut self.tasks)
    }

    /// Picks up flavor text that arrived since the last call, returns whether the slot changed.
    ///
    /// Text requested for an earlier game is dropped.
    pub fn poll_commentary(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        match pending.receiver.try_recv() {
            Ok(None) => false,
            Ok(Some(text)) => {
                let game = pending.game;
                self.pending = None;
                if game == self.game_id {
                    self.commentary = Some(text);
                    true
                } else {
                    log::debug!("Dropping commentary for game {}, now on {}", game, self.game_id);
                    false
                }
            }
            Err(oneshot::Canceled) => {
                log::debug!("Commentary request for game {} was dropped", pending.game);
                self.pending = None;
                false
            }
        }
    }

    fn place_mines(&mut self, safe: Coord2) {
        let seed = self.rng.random();
        self.grid = create_board(self.settings, Some(safe), seed).with_flags_from(&self.grid);
        self.mines_placed = true;
        log::debug!("Game {} mines placed around first click {:?}", self.game_id, safe);
    }

    fn settle_after_reveal(&mut self) -> ActionOutcome {
        if !check_win(&self.grid) {
            return ActionOutcome::Updated;
        }

        self.status = GameStatus::Won;
        self.stopwatch.stop();
        log::debug!("Game {} won in {}s", self.game_id, self.stopwatch.elapsed());

        let message = self.commentator.victory_message(
            VICTORY_PLAYER,
            self.stopwatch.elapsed(),
            self.settings.size,
            self.settings.difficulty,
        );
        self.request_commentary(message);
        ActionOutcome::Won
    }

    fn lose(&mut self) -> ActionOutcome {
        self.status = GameStatus::Lost;
        self.stopwatch.stop();
        log::debug!("Game {} lost after {}s", self.game_id, self.stopwatch.elapsed());

        let message = self.commentator.loss_message();
        self.request_commentary(message);
        ActionOutcome::Lost
    }

    fn request_commentary(&mut self, message: BoxFuture<'static, String>) {
        let (sender, receiver) = oneshot::channel();
        self.pending = Some(PendingCommentary {
            game: self.game_id,
            receiver,
        });

        let game = self.game_id;
        self.tasks.push(
            async move {
                let text = message.await;
                if sender.send(text).is_err() {
                    log::trace!("Commentary for game {} arrived after it was replaced", game);
                }
            }
            .boxed(),
        );
    }
}

/// Name recorded for a win submitted without one.
pub const ANONYMOUS_PLAYER: &str = "Anonymous";

#[cfg(test)]
mod tests {
    use super::*;

    type TestSession = GameSession<Offline, MemoryStore>;

    fn session(generation: Generation) -> TestSession {
        GameSession::new(
            GameSettings::default(),
            Commentator::new(Offline),
            Leaderboard::new(MemoryStore::new()),
        )
        .with_seed(17)
        .with_generation(generation)
    }

    fn run_tasks(session: &mut TestSession) {
        for task in session.take_tasks() {
            task.now_or_never().expect("offline commentary resolves immediately");
        }
    }

    fn first_mine(grid: &Grid) -> Coord2 {
        grid.cells()
            .find(|(_, cell)| cell.is_mine)
            .map(|(coords, _)| coords)
            .expect("boards have mines")
    }

    fn clear_board(session: &mut TestSession) -> ActionOutcome {
        let safe: Vec<_> = session
            .grid()
            .cells()
            .filter(|(_, cell)| !cell.is_mine)
            .map(|(coords, _)| coords)
            .collect();
        let mut outcome = ActionOutcome::Ignored;
        for coords in safe {
            let next = session.reveal(coords);
            if next.has_update() {
                outcome = next;
            }
        }
        outcome
    }

    #[test]
    fn actions_are_ignored_until_a_game_starts() {
        let mut session = session(Generation::Eager);

        assert_eq!(session.status(), GameStatus::Idle);
        assert_eq!(session.reveal((0, 0)), ActionOutcome::Ignored);
        assert_eq!(session.toggle_flag((0, 0)), ActionOutcome::Ignored);
        assert_eq!(session.chord((0, 0)), ActionOutcome::Ignored);
        session.tick();
        assert_eq!(session.elapsed_secs(), 0);
    }

    #[test]
    fn deferred_board_keeps_first_click_and_flags() {
        let mut session = session(Generation::Deferred);
        session.new_game();
        assert_eq!(session.grid().mine_count(), 0);

        session.toggle_flag((8, 8));
        let outcome = session.reveal((4, 4));

        assert!(matches!(outcome, ActionOutcome::Updated | ActionOutcome::Won));
        assert_eq!(session.grid().mine_count(), 8);
        assert!(!session.grid()[(4, 4)].is_mine);
        assert!(session.grid()[(4, 4)].is_revealed);
        assert!(session.grid()[(8, 8)].is_flagged);
        assert_eq!(session.mines_left(), 7);
    }

    #[test]
    fn hitting_a_mine_loses_and_shows_every_mine() {
        let mut session = session(Generation::Eager);
        session.new_game();
        session.tick();

        let mine = first_mine(session.grid());
        assert_eq!(session.reveal(mine), ActionOutcome::Lost);

        assert_eq!(session.status(), GameStatus::Lost);
        assert!(!session.is_timer_running());
        assert!(session.grid().cells().all(|(_, cell)| !cell.is_mine || cell.is_revealed));
        session.tick();
        assert_eq!(session.elapsed_secs(), 1);
        assert_eq!(session.reveal((0, 0)), ActionOutcome::Ignored);
    }

    #[test]
    fn loss_commentary_falls_back_offline() {
        let mut session = session(Generation::Eager);
        session.new_game();
        session.reveal(first_mine(session.grid()));
        assert!(session.has_pending_commentary());
        assert!(!session.poll_commentary());

        run_tasks(&mut session);

        assert!(session.poll_commentary());
        assert_eq!(session.commentary(), Some(LOSS_ERROR_FALLBACK));
        assert!(!session.has_pending_commentary());
    }

    #[test]
    fn stale_commentary_never_reaches_a_new_game() {
        let mut session = session(Generation::Eager);
        session.new_game();
        session.reveal(first_mine(session.grid()));
        let stale = session.take_tasks();

        session.new_game();
        for task in stale {
            task.now_or_never().unwrap();
        }

        assert!(!session.poll_commentary());
        assert_eq!(session.commentary(), None);
    }

    #[test]
    fn clearing_the_board_wins_and_records_time() {
        let mut session = session(Generation::Eager);
        session.new_game();
        for _ in 0..42 {
            session.tick();
        }

        assert_eq!(clear_board(&mut session), ActionOutcome::Won);
        assert_eq!(session.status(), GameStatus::Won);
        session.tick();

        let entries = session.submit_win("  ").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].time, 42);
        assert_eq!(entries[0].player_name, ANONYMOUS_PLAYER);
        assert_eq!(session.status(), GameStatus::Idle);
        assert_eq!(session.submit_win("again"), None);
        assert_eq!(session.best_time().map(|entry| entry.time), Some(42));

        run_tasks(&mut session);
        assert!(session.poll_commentary());
        assert_eq!(session.commentary(), Some(VICTORY_ERROR_FALLBACK));
    }

    fn started(settings: GameSettings, seed: u64) -> TestSession {
        let mut session = GameSession::new(settings, Commentator::new(Offline), Leaderboard::new(MemoryStore::new()))
            .with_seed(seed)
            .with_generation(Generation::Eager);
        session.new_game();
        session
    }

    #[test]
    fn chord_with_misplaced_flags_loses() {
        let settings = GameSettings::new(BoardSize::Small, Difficulty::Hard);
        let mut lost_games = 0;

        for seed in 0..30 {
            let mut session = started(settings, seed);
            let grid = session.grid().clone();
            // a number with enough safe neighbors to put every flag on the wrong cell
            let candidate = grid.cells().find(|&(coords, cell)| {
                let safe_neighbors = grid.iter_neighbors(coords).filter(|&pos| !grid[pos].is_mine).count();
                !cell.is_mine && cell.neighbor_count > 0 && safe_neighbors >= usize::from(cell.neighbor_count)
            });
            let Some((target, cell)) = candidate else {
                continue;
            };

            assert_eq!(session.reveal(target), ActionOutcome::Updated);
            let wrong_flags = grid
                .iter_neighbors(target)
                .filter(|&pos| !grid[pos].is_mine)
                .take(usize::from(cell.neighbor_count));
            for pos in wrong_flags {
                assert_eq!(session.toggle_flag(pos), ActionOutcome::Updated);
            }
            session.tick();

            assert_eq!(session.chord(target), ActionOutcome::Lost, "seed {seed}");
            assert_eq!(session.status(), GameStatus::Lost);
            assert!(!session.is_timer_running());
            assert!(session.has_pending_commentary());
            assert!(session.grid().cells().all(|(_, cell)| !cell.is_mine || cell.is_revealed));
            session.tick();
            assert_eq!(session.elapsed_secs(), 1);

            run_tasks(&mut session);
            assert!(session.poll_commentary());
            assert_eq!(session.commentary(), Some(LOSS_ERROR_FALLBACK));
            lost_games += 1;
        }

        assert!(lost_games > 0);
    }

    #[test]
    fn chord_opening_the_last_safe_cell_wins() {
        let settings = GameSettings::new(BoardSize::Small, Difficulty::Hard);
        let mut won_games = 0;

        for seed in 0..30 {
            let mut session = started(settings, seed);
            let grid = session.grid().clone();
            // a safe cell no flood fill reaches, next to a number that can chord it open
            let setup = grid.cells().find_map(|(last, cell)| {
                if cell.is_mine || grid.iter_neighbors(last).any(|pos| grid[pos].is_empty()) {
                    return None;
                }
                grid.iter_neighbors(last)
                    .find(|&pos| !grid[pos].is_mine)
                    .map(|target| (last, target))
            });
            let Some((last, target)) = setup else {
                continue;
            };

            let others: Vec<_> = grid
                .cells()
                .filter(|&(coords, cell)| !cell.is_mine && coords != last)
                .map(|(coords, _)| coords)
                .collect();
            for coords in others {
                session.reveal(coords);
            }
            assert_eq!(session.status(), GameStatus::Playing, "seed {seed}");
            assert!(!session.grid()[last].is_revealed);
            for pos in grid.iter_neighbors(target).filter(|&pos| grid[pos].is_mine) {
                session.toggle_flag(pos);
            }

            assert_eq!(session.chord(target), ActionOutcome::Won, "seed {seed}");
            assert_eq!(session.status(), GameStatus::Won);
            assert!(!session.is_timer_running());
            assert!(session.has_pending_commentary());
            won_games += 1;
        }

        assert!(won_games > 0);
    }

    #[test]
    fn new_game_with_switches_settings() {
        let mut session = session(Generation::Eager);
        let settings = GameSettings::new(BoardSize::Large, Difficulty::Hard);

        session.new_game_with(settings);

        assert_eq!(session.settings(), settings);
        assert_eq!(session.grid().size(), (30, 16));
        assert_eq!(session.grid().mine_count(), 96);
        assert_eq!(session.game_id(), 1);
    }

    #[test]
    fn switching_settings_mid_game_restarts() {
        let mut session = session(Generation::Deferred);
        session.new_game();
        session.toggle_flag((0, 0));
        session.tick();

        session.new_game_with(GameSettings::new(BoardSize::Medium, Difficulty::Normal));

        assert_eq!(session.status(), GameStatus::Playing);
        assert_eq!(session.game_id(), 2);
        assert_eq!(session.elapsed_secs(), 0);
        assert_eq!(session.grid().size(), (16, 16));
        assert_eq!(session.grid().flag_count(), 0);
        assert_eq!(session.mines_left(), 38);

        session.reveal((8, 8));
        assert_eq!(session.grid().mine_count(), 38);
    }
}
