//! Process configuration for hosts embedding the note core.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//!
//! # Invariants
//! - Blank values fall back to defaults.
//! - `log_dir` is absolute and `log_level` is a supported level, matching
//!   what `init_logging` accepts.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir};
use std::path::PathBuf;

/// Environment variable holding the SQLite database path.
pub const ENV_DB_PATH: &str = "PLANNOTE_DB_PATH";
/// Environment variable holding the log level.
pub const ENV_LOG_LEVEL: &str = "PLANNOTE_LOG_LEVEL";
/// Environment variable holding the absolute log directory.
pub const ENV_LOG_DIR: &str = "PLANNOTE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "plannote.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "plannote-logs";

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: PathBuf,
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    ///
    /// # Errors
    /// - Unsupported log level.
    /// - Relative log directory.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME));
        let log_level = match read(ENV_LOG_LEVEL) {
            Some(value) => normalize_level(&value)?,
            None => default_log_level(),
        };
        let log_dir = match read(ENV_LOG_DIR) {
            Some(value) => normalize_log_dir(&value)?,
            None => std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}
