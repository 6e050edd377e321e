//! SQLite-backed Game Store and Calendar Registry.
//!
//! Every operation opens its own connection, runs one statement (or one
//! small transaction), commits and closes. No transaction spans a
//! reconciliation pass.

mod calendars;
mod games;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::{GameplanError, GameplanResult};

pub use games::UpsertOutcome;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS games (
        id TEXT PRIMARY KEY,
        date TEXT NULL,
        league TEXT NOT NULL,
        home_team TEXT NOT NULL,
        away_team TEXT NOT NULL,
        gym TEXT NOT NULL,
        result TEXT NOT NULL,
        club_calendar_event_id TEXT NULL,
        team_calendar_event_id TEXT NULL,
        team_calendar_id TEXT NULL
    );
    CREATE TABLE IF NOT EXISTS calendars (
        id TEXT PRIMARY KEY,
        google_calendar_id TEXT NOT NULL,
        league TEXT NULL UNIQUE,
        is_club_calendar INTEGER NOT NULL DEFAULT 0,
        is_shared INTEGER NOT NULL DEFAULT 0
    );
    CREATE UNIQUE INDEX IF NOT EXISTS calendars_single_club
        ON calendars(is_club_calendar) WHERE is_club_calendar = 1;
";

/// Handle to the local database file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Open (and if needed create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> GameplanResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                GameplanError::Persistence(format!(
                    "Could not create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let store = Store { path };
        store.connect()?.execute_batch(SCHEMA)?;

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> GameplanResult<Connection> {
        Connection::open(&self.path).map_err(|e| {
            GameplanError::Persistence(format!("Could not open {}: {e}", self.path.display()))
        })
    }
}
