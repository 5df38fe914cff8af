//! Runtime configuration loaded from environment variables.

use crate::game::round::REVEAL_DELAY;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Rows shown per leaderboard tab unless overridden
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 20;

/// Upper bound for `MATHVIBE_LEADERBOARD_LIMIT`
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// SQLite file; `None` means the OS data directory
    pub db_path: Option<PathBuf>,
    pub log_dir: PathBuf,
    pub leaderboard_limit: usize,
    pub reveal_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            log_dir: default_log_dir(),
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            reveal_delay: REVEAL_DELAY,
        }
    }
}

impl Config {
    /// Construct configuration from process environment variables.
    ///
    /// - `MATHVIBE_DB_PATH`
    /// - `MATHVIBE_LOG_DIR`
    /// - `MATHVIBE_LEADERBOARD_LIMIT`
    /// - `MATHVIBE_REVEAL_MS`
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = read_var::<PathBuf>(&lookup, "MATHVIBE_DB_PATH") {
            config.db_path = Some(path);
        }

        if let Some(dir) = read_var::<PathBuf>(&lookup, "MATHVIBE_LOG_DIR") {
            config.log_dir = dir;
        }

        if let Some(limit) = read_var::<usize>(&lookup, "MATHVIBE_LEADERBOARD_LIMIT") {
            config.leaderboard_limit = limit.clamp(1, MAX_LEADERBOARD_LIMIT);
        }

        if let Some(ms) = read_var::<u64>(&lookup, "MATHVIBE_REVEAL_MS") {
            config.reveal_delay = Duration::from_millis(ms);
        }

        config
    }
}

fn read_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok())
}

/// OS cache directory for log files, or `./logs` if there is none
fn default_log_dir() -> PathBuf {
    ProjectDirs::from("", "", "mathvibe")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]);
        assert_eq!(config.db_path, None);
        assert_eq!(config.leaderboard_limit, 20);
        assert_eq!(config.reveal_delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("MATHVIBE_DB_PATH", "/tmp/scores.db"),
            ("MATHVIBE_LOG_DIR", "/tmp/logs"),
            ("MATHVIBE_LEADERBOARD_LIMIT", "5"),
            ("MATHVIBE_REVEAL_MS", "500"),
        ]);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/scores.db")));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(config.leaderboard_limit, 5);
        assert_eq!(config.reveal_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_limit_clamped() {
        assert_eq!(config_with(&[("MATHVIBE_LEADERBOARD_LIMIT", "0")]).leaderboard_limit, 1);
        assert_eq!(
            config_with(&[("MATHVIBE_LEADERBOARD_LIMIT", "5000")]).leaderboard_limit,
            MAX_LEADERBOARD_LIMIT
        );
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = config_with(&[
            ("MATHVIBE_LEADERBOARD_LIMIT", "lots"),
            ("MATHVIBE_REVEAL_MS", "-1"),
            ("MATHVIBE_DB_PATH", "   "),
        ]);
        assert_eq!(config.leaderboard_limit, DEFAULT_LEADERBOARD_LIMIT);
        assert_eq!(config.reveal_delay, REVEAL_DELAY);
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn test_zero_reveal_delay() {
        let config = config_with(&[("MATHVIBE_REVEAL_MS", "0")]);
        assert_eq!(config.reveal_delay, Duration::ZERO);
    }
}
