use clearfield_core::{BoardSize, Difficulty};
use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Result;
use crate::store::KeyValueStore;

/// Key the leaderboard lives under in its [`KeyValueStore`].
pub const STORAGE_KEY: &str = "minesweeper_leaderboard";

const ID_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub player_name: String,
    /// Whole seconds.
    pub time: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub size: BoardSize,
    pub difficulty: Difficulty,
}

impl LeaderboardEntry {
    /// Whether this entry competes in the given size and difficulty.
    pub fn is_in(&self, size: BoardSize, difficulty: Difficulty) -> bool {
        self.size == size && self.difficulty == difficulty
    }
}

/// A finished game before it gets an id and a timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEntry {
    pub player_name: String,
    pub time: u32,
    pub size: BoardSize,
    pub difficulty: Difficulty,
}

/// Best times, kept sorted fastest first.
#[derive(Clone, Debug)]
pub struct Leaderboard<S> {
    store: S,
}

impl<S: KeyValueStore> Leaderboard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stored entries, or none at all when the storage is missing or unreadable.
    pub fn entries(&self) -> Vec<LeaderboardEntry> {
        match self.load() {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Ignoring unreadable leaderboard: {}", err);
                Vec::new()
            }
        }
    }

    /// Records a finished game and returns the updated, sorted leaderboard.
    ///
    /// The list is returned even if it could not be written back.
    pub fn save_entry(&mut self, entry: NewEntry) -> Vec<LeaderboardEntry> {
        let mut entries = self.entries();
        entries.push(LeaderboardEntry {
            id: generate_id(),
            player_name: entry.player_name,
            time: entry.time,
            date: OffsetDateTime::now_utc(),
            size: entry.size,
            difficulty: entry.difficulty,
        });
        entries.sort_by_key(|entry| entry.time);

        if let Err(err) = self.persist(&entries) {
            log::error!("Could not save leaderboard: {}", err);
        }
        entries
    }

    /// Entries ranked within one size and difficulty, fastest first.
    pub fn entries_for(&self, size: BoardSize, difficulty: Difficulty) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<_> = self
            .entries()
            .into_iter()
            .filter(|entry| entry.is_in(size, difficulty))
            .collect();
        // hand-edited storage may not be sorted
        entries.sort_by_key(|entry| entry.time);
        entries
    }

    /// Fastest entry for this size and difficulty.
    pub fn best_time(&self, size: BoardSize, difficulty: Difficulty) -> Option<LeaderboardEntry> {
        self.entries_for(size, difficulty).into_iter().next()
    }

    fn load(&self) -> Result<Vec<LeaderboardEntry>> {
        match self.store.get(STORAGE_KEY)? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&mut self, entries: &[LeaderboardEntry]) -> Result<()> {
        let data = serde_json::to_string(entries)?;
        self.store.set(STORAGE_KEY, data)
    }
}

fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect()
}
