#![warn(clippy::all, clippy::pedantic)]

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::game::{DEFAULT_PLAYER_NAME, LEADERBOARD_CAPACITY, MAX_NAME_LEN};

const LEADERBOARD_FILE_NAME: &str = "leaderboard.toml";
const LOCAL_LEADERBOARD_PATH: &str = "stackfall_leaderboard.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub score: u32,
    pub timestamp: String,
}

impl Entry {
    /// Builds an entry stamped with the current local time.
    #[must_use]
    pub fn now(name: &str, score: u32) -> Self {
        Self {
            name: normalize_name(name),
            score,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Trims the submitted name, caps it at `MAX_NAME_LEN` characters and
/// substitutes the default name when nothing is left.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_PLAYER_NAME.to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

/// Inserts `entry`, keeping the list ordered by descending score and capped
/// at `LEADERBOARD_CAPACITY`. Ties keep their arrival order.
pub fn record(entries: &mut Vec<Entry>, entry: Entry) {
    entries.push(entry);
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(LEADERBOARD_CAPACITY);
}

/// Durable storage for the ranked list. Failures stay inside the store.
pub trait LeaderboardStore {
    fn load(&self) -> Vec<Entry>;
    fn save(&mut self, entries: &[Entry]);
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LeaderboardFile {
    #[serde(default)]
    entries: Vec<Entry>,
}

#[derive(Debug)]
pub enum LeaderboardError {
    Io(io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardError::Io(e) => write!(f, "leaderboard I/O error: {e}"),
            LeaderboardError::Parse(e) => write!(f, "leaderboard file is corrupt: {e}"),
            LeaderboardError::Serialize(e) => write!(f, "could not encode leaderboard: {e}"),
        }
    }
}

impl std::error::Error for LeaderboardError {}

impl From<io::Error> for LeaderboardError {
    fn from(err: io::Error) -> Self {
        LeaderboardError::Io(err)
    }
}

impl From<toml::de::Error> for LeaderboardError {
    fn from(err: toml::de::Error) -> Self {
        LeaderboardError::Parse(err)
    }
}

impl From<toml::ser::Error> for LeaderboardError {
    fn from(err: toml::ser::Error) -> Self {
        LeaderboardError::Serialize(err)
    }
}

/// Stores the leaderboard as a TOML file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user's data directory, or the working directory when
    /// no data directory is known.
    #[must_use]
    pub fn default_location() -> Self {
        let path = dirs::data_dir().map_or_else(
            || PathBuf::from(LOCAL_LEADERBOARD_PATH),
            |dir| dir.join("stackfall").join(LEADERBOARD_FILE_NAME),
        );
        Self::new(path)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_load(&self) -> Result<Vec<Entry>, LeaderboardError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        let file: LeaderboardFile = toml::from_str(&contents)?;
        Ok(file.entries)
    }

    pub fn try_save(&self, entries: &[Entry]) -> Result<(), LeaderboardError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = LeaderboardFile {
            entries: entries.to_vec(),
        };
        fs::write(&self.path, toml::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl LeaderboardStore for FileStore {
    fn load(&self) -> Vec<Entry> {
        match self.try_load() {
            Ok(entries) => {
                debug!("Loaded {} leaderboard entries", entries.len());
                entries
            }
            Err(e) => {
                warn!("Ignoring leaderboard at {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }

    fn save(&mut self, entries: &[Entry]) {
        if let Err(e) = self.try_save(entries) {
            error!("Failed to save leaderboard to {}: {e}", self.path.display());
        }
    }
}

/// In-process store, used when nothing should touch the disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub entries: Vec<Entry>,
}

impl LeaderboardStore for MemoryStore {
    fn load(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    fn save(&mut self, entries: &[Entry]) {
        self.entries = entries.to_vec();
    }
}
