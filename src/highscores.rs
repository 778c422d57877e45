//! High score leaderboard
//!
//! Append-only list of finished matches, queried as top-N by score. Ties keep
//! insertion order.

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceError, Storage, decode, encode};
use crate::platform;

/// Default number of rows for a leaderboard query
pub const DEFAULT_LIMIT: usize = 10;
/// Rows shown by the history view
pub const HISTORY_LIMIT: usize = 20;
/// Longest accepted player name (characters)
pub const MAX_NAME_LEN: usize = 15;
pub const DEFAULT_PLAYER_NAME: &str = "PLAYER 1";

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Assigned by the store; never reused
    pub id: Option<i64>,
    pub name: String,
    pub score: u32,
    /// ISO-8601 timestamp
    pub date: String,
}

/// Persisted form of the leaderboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ScoreBook {
    next_id: i64,
    entries: Vec<ScoreEntry>,
}

/// Trim and cap a player name, falling back to the default
pub fn normalize_name(name: &str) -> String {
    let trimmed: String = name.trim().chars().take(MAX_NAME_LEN).collect();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Leaderboard persistence
pub struct ScoreStore<S> {
    storage: S,
    book: ScoreBook,
}

impl<S: Storage> ScoreStore<S> {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "pong_scores";

    /// Open the leaderboard, starting fresh if nothing readable is stored
    pub fn open(storage: S) -> Self {
        let book = match storage.read(Self::STORAGE_KEY) {
            Ok(Some(blob)) => match decode::<ScoreBook>(&blob) {
                Ok(mut book) => {
                    let max_id = book.entries.iter().filter_map(|e| e.id).max().unwrap_or(0);
                    book.next_id = book.next_id.max(max_id + 1);
                    log::info!("Loaded {} high scores", book.entries.len());
                    book
                }
                Err(err) => {
                    log::warn!("Stored high scores unreadable, starting fresh: {}", err);
                    ScoreBook::default()
                }
            },
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                ScoreBook::default()
            }
            Err(err) => {
                log::warn!("Failed to load high scores: {}", err);
                ScoreBook::default()
            }
        };
        Self { storage, book }
    }

    /// Append a timestamped entry.
    ///
    /// The entry is kept in memory even when persisting it fails; the error
    /// is returned only so the caller can show a notice.
    pub fn save(&mut self, name: &str, score: u32) -> Result<ScoreEntry, PersistenceError> {
        self.book.next_id = self.book.next_id.max(1);
        let entry = ScoreEntry {
            id: Some(self.book.next_id),
            name: normalize_name(name),
            score,
            date: platform::now_iso8601(),
        };
        self.book.next_id += 1;
        self.book.entries.push(entry.clone());
        log::info!("Score recorded: {} {}", entry.name, entry.score);

        self.persist()?;
        Ok(entry)
    }

    /// Highest scores first, at most `limit` rows
    pub fn top_scores(&self, limit: usize) -> Vec<ScoreEntry> {
        let mut ranked: Vec<&ScoreEntry> = self.book.entries.iter().collect();
        // Stable sort keeps earlier entries ahead on ties
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.into_iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.book.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book.entries.is_empty()
    }

    /// Wipe every entry. Ids keep counting from where they were.
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.book.entries.clear();
        log::info!("High scores cleared");
        self.persist()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&self) -> Result<(), PersistenceError> {
        let result =
            encode(&self.book).and_then(|blob| self.storage.write(Self::STORAGE_KEY, &blob));
        if let Err(err) = &result {
            log::error!("Failed to save high scores: {}", err);
        }
        result
    }
}
