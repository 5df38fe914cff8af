//! Profile and leaderboard backend seam
//!
//! The game only talks to a [`Backend`]. When the database can't be opened
//! the app runs against [`OfflineBackend`], and the screens fall back to the
//! default profiles and an empty leaderboard.

use super::StorageError;
use crate::game::round::{GameResult, Mode};

/// Profiles offered when no backend data is available: (name, avatar color)
pub const DEFAULT_PROFILES: [(&str, &str); 3] = [
    ("Hela", "#FF6B9D"),
    ("Tata", "#4ECDC4"),
    ("Mama", "#9B59B6"),
];

/// A player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    /// Hex color, e.g. "#FF6B9D"
    pub avatar_color: String,
}

/// One ranked row of the leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub profile_name: String,
    pub avatar_color: String,
    pub result: GameResult,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    /// Calendar date the round was played on (YYYY-MM-DD, UTC)
    pub played_on: String,
}

/// Persistence for profiles and finished rounds
pub trait Backend {
    fn list_profiles(&self) -> Result<Vec<Profile>, StorageError>;

    /// Best results for `mode`: score descending, newest first among ties.
    fn top_results(&self, mode: Mode, limit: usize) -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// The profile selected last time, if it still exists.
    fn current_profile(&self) -> Result<Option<Profile>, StorageError>;

    /// Remember (or forget) the selected profile.
    fn set_current_profile(&self, id: Option<i64>) -> Result<(), StorageError>;

    fn record_result(&self, profile_id: i64, result: &GameResult) -> Result<(), StorageError>;
}

/// Backend used when storage could not be opened. Every call fails.
#[derive(Debug, Clone)]
pub struct OfflineBackend {
    reason: String,
}

impl OfflineBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Backend for OfflineBackend {
    fn list_profiles(&self) -> Result<Vec<Profile>, StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn top_results(&self, _mode: Mode, _limit: usize) -> Result<Vec<LeaderboardEntry>, StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn current_profile(&self) -> Result<Option<Profile>, StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn set_current_profile(&self, _id: Option<i64>) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn record_result(&self, _profile_id: i64, _result: &GameResult) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }
}

/// The built-in profiles, numbered from 1.
pub fn default_profiles() -> Vec<Profile> {
    DEFAULT_PROFILES
        .iter()
        .zip(1..)
        .map(|((name, color), id)| Profile {
            id,
            name: name.to_string(),
            avatar_color: color.to_string(),
        })
        .collect()
}

/// Profiles from the backend, or the built-in ones if it fails or has none.
pub fn profiles_or_default(backend: &dyn Backend) -> Vec<Profile> {
    match backend.list_profiles() {
        Ok(profiles) if !profiles.is_empty() => profiles,
        Ok(_) => default_profiles(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load profiles, using defaults");
            default_profiles()
        }
    }
}

/// Leaderboard for `mode`, or nothing if the backend fails.
pub fn leaderboard_or_empty(backend: &dyn Backend, mode: Mode, limit: usize) -> Vec<LeaderboardEntry> {
    backend.top_results(mode, limit).unwrap_or_else(|e| {
        tracing::warn!(error = %e, mode = mode.key(), "failed to load leaderboard");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyBackend;

    impl Backend for EmptyBackend {
        fn list_profiles(&self) -> Result<Vec<Profile>, StorageError> {
            Ok(Vec::new())
        }

        fn top_results(&self, _: Mode, _: usize) -> Result<Vec<LeaderboardEntry>, StorageError> {
            Ok(Vec::new())
        }

        fn current_profile(&self) -> Result<Option<Profile>, StorageError> {
            Ok(None)
        }

        fn set_current_profile(&self, _: Option<i64>) -> Result<(), StorageError> {
            Ok(())
        }

        fn record_result(&self, _: i64, _: &GameResult) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_default_profiles() {
        let profiles = default_profiles();
        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].id, 1);
        assert_eq!(profiles[0].name, "Hela");
        assert_eq!(profiles[0].avatar_color, "#FF6B9D");
        assert_eq!(profiles[2].id, 3);
        assert_eq!(profiles[2].name, "Mama");
    }

    #[test]
    fn test_offline_falls_back_to_defaults() {
        let offline = OfflineBackend::new("no database");
        assert_eq!(profiles_or_default(&offline), default_profiles());
        assert!(leaderboard_or_empty(&offline, Mode::Survival, 20).is_empty());
    }

    #[test]
    fn test_offline_record_fails() {
        let offline = OfflineBackend::new("no database");
        let result = GameResult {
            mode: Mode::TimeAttack,
            score: 1,
            total_questions: 1,
            duration_seconds: 60,
        };
        let err = offline.record_result(1, &result).unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(ref reason) if reason == "no database"));
    }

    #[test]
    fn test_empty_backend_uses_defaults() {
        assert_eq!(profiles_or_default(&EmptyBackend), default_profiles());
    }
}
