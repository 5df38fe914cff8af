//! Persistent storage using SQLite (rusqlite)
//!
//! This module provides:
//! - OS-standard data directory location (via `directories` crate)
//! - SQLite database with schema versioning
//! - Player profiles, seeded with the family defaults
//! - Finished game results, ranked per mode for the leaderboard
//! - The currently selected profile, remembered between runs

pub mod backend;

pub use backend::{
    default_profiles, leaderboard_or_empty, profiles_or_default, Backend, LeaderboardEntry,
    OfflineBackend, Profile, DEFAULT_PROFILES,
};

use crate::game::round::{GameResult, Mode};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current schema version. Bump this when making schema changes.
const SCHEMA_VERSION: u32 = 1;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("could not determine data directory")]
    NoDataDirectory,

    #[error("failed to create data directory: {0}")]
    CreateDirFailed(std::io::Error),

    #[error("database schema version {found} is newer than supported version {supported}")]
    FutureSchemaVersion { found: u32, supported: u32 },

    #[error("unknown game mode in database: {0}")]
    UnknownMode(String),

    #[error("no profile with id {0}")]
    UnknownProfile(i64),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// The main storage handle for game data.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create the storage database in the OS data directory.
    ///
    /// - Linux: `$XDG_DATA_HOME/mathvibe/` or `~/.local/share/mathvibe/`
    /// - macOS: `~/Library/Application Support/mathvibe/`
    pub fn open() -> Result<Self, StorageError> {
        let data_dir = Self::data_dir()?;
        Self::open_at(&data_dir.join("mathvibe.db"))
    }

    /// Open or create the database at a specific path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::CreateDirFailed)?;
        }

        let conn = Connection::open(path)?;
        let storage = Storage { conn };
        storage.initialize_schema()?;

        tracing::info!(path = %path.display(), "opened database");
        Ok(storage)
    }

    /// Open an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let storage = Storage { conn };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Get the OS-standard data directory.
    pub fn data_dir() -> Result<PathBuf, StorageError> {
        ProjectDirs::from("", "", "mathvibe")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(StorageError::NoDataDirectory)
    }

    /// Insert any default profile that doesn't exist yet.
    ///
    /// Returns the number of profiles inserted.
    pub fn seed_default_profiles(&self) -> Result<usize, StorageError> {
        let now = now_millis();
        let mut inserted = 0;
        for (name, color) in DEFAULT_PROFILES {
            inserted += self.conn.execute(
                "INSERT OR IGNORE INTO profiles (name, avatar_color, created_at) VALUES (?1, ?2, ?3)",
                params![name, color, now],
            )?;
        }
        if inserted > 0 {
            tracing::info!(inserted, "seeded default profiles");
        }
        Ok(inserted)
    }

    /// Create a profile and return it.
    #[cfg(test)]
    pub fn add_profile(&self, name: &str, avatar_color: &str) -> Result<Profile, StorageError> {
        self.conn.execute(
            "INSERT INTO profiles (name, avatar_color, created_at) VALUES (?1, ?2, ?3)",
            params![name, avatar_color, now_millis()],
        )?;
        Ok(Profile {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            avatar_color: avatar_color.to_string(),
        })
    }

    /// Look up a profile by id.
    pub fn profile(&self, id: i64) -> Result<Option<Profile>, StorageError> {
        let result = self.conn.query_row(
            "SELECT id, name, avatar_color FROM profiles WHERE id = ?1",
            params![id],
            |row| {
                Ok(Profile {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    avatar_color: row.get(2)?,
                })
            },
        );

        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Database(e)),
        }
    }

    /// Get the total number of stored results.
    #[cfg(test)]
    pub fn result_count(&self) -> Result<i64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM game_results", [], |row| row.get(0))?;
        Ok(count)
    }

    fn insert_result(
        &self,
        profile_id: i64,
        result: &GameResult,
        created_at: i64,
    ) -> Result<(), StorageError> {
        if self.profile(profile_id)?.is_none() {
            return Err(StorageError::UnknownProfile(profile_id));
        }

        self.conn.execute(
            "INSERT INTO game_results (profile_id, mode, score, total_questions, duration_seconds, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                profile_id,
                result.mode.key(),
                result.score,
                result.total_questions,
                result.duration_seconds,
                created_at
            ],
        )?;
        Ok(())
    }

    // Private helper methods

    fn initialize_schema(&self) -> Result<(), StorageError> {
        let current_version = self.get_schema_version()?;

        if current_version == 0 {
            // Fresh database, create schema
            self.create_schema()?;
        } else if current_version > SCHEMA_VERSION {
            return Err(StorageError::FutureSchemaVersion {
                found: current_version,
                supported: SCHEMA_VERSION,
            });
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Result<u32, StorageError> {
        let table_exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: u32 = self
            .conn
            .query_row("SELECT schema_version FROM meta LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        Ok(version)
    }

    fn create_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            -- Meta table: schema version and selected profile
            CREATE TABLE meta (
                schema_version INTEGER NOT NULL,
                current_profile_id INTEGER,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                avatar_color TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            -- One row per finished ranked round
            CREATE TABLE game_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER NOT NULL REFERENCES profiles (id),
                mode TEXT NOT NULL,
                score INTEGER NOT NULL,
                total_questions INTEGER NOT NULL,
                duration_seconds INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX idx_results_rank ON game_results (mode, score DESC, created_at DESC);
            "#,
        )?;

        self.conn.execute(
            "INSERT INTO meta (schema_version, current_profile_id, created_at) VALUES (?1, NULL, ?2)",
            params![SCHEMA_VERSION, now_millis()],
        )?;

        Ok(())
    }
}

impl Backend for Storage {
    fn list_profiles(&self) -> Result<Vec<Profile>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, avatar_color FROM profiles ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Profile {
                id: row.get(0)?,
                name: row.get(1)?,
                avatar_color: row.get(2)?,
            })
        })?;

        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?);
        }
        Ok(profiles)
    }

    fn top_results(&self, mode: Mode, limit: usize) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.name, p.avatar_color, r.mode, r.score, r.total_questions, r.duration_seconds,
                    r.created_at, strftime('%Y-%m-%d', r.created_at / 1000, 'unixepoch')
             FROM game_results r
             LEFT JOIN profiles p ON p.id = r.profile_id
             WHERE r.mode = ?1
             ORDER BY r.score DESC, r.created_at DESC, r.id DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![mode.key(), limit as i64], |row| {
            let name: Option<String> = row.get(0)?;
            let color: Option<String> = row.get(1)?;
            let mode: String = row.get(2)?;
            Ok((
                name,
                color,
                mode,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (name, color, mode_key, score, total_questions, duration_seconds, created_at, played_on) =
                row?;
            let mode = Mode::from_key(&mode_key).ok_or(StorageError::UnknownMode(mode_key))?;
            entries.push(LeaderboardEntry {
                profile_name: name.unwrap_or_else(|| "?".to_string()),
                avatar_color: color.unwrap_or_default(),
                result: GameResult {
                    mode,
                    score,
                    total_questions,
                    duration_seconds,
                },
                created_at,
                played_on,
            });
        }
        Ok(entries)
    }

    fn current_profile(&self) -> Result<Option<Profile>, StorageError> {
        let id: Option<i64> = self.conn.query_row(
            "SELECT current_profile_id FROM meta LIMIT 1",
            [],
            |row| row.get(0),
        )?;
        match id {
            Some(id) => self.profile(id),
            None => Ok(None),
        }
    }

    fn set_current_profile(&self, id: Option<i64>) -> Result<(), StorageError> {
        self.conn
            .execute("UPDATE meta SET current_profile_id = ?1", params![id])?;
        Ok(())
    }

    fn record_result(&self, profile_id: i64, result: &GameResult) -> Result<(), StorageError> {
        self.insert_result(profile_id, result, now_millis())?;
        tracing::info!(
            profile_id,
            mode = result.mode.key(),
            score = result.score,
            "recorded result"
        );
        Ok(())
    }
}

/// Milliseconds since the Unix epoch.
fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
