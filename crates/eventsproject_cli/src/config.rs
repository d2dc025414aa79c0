//! CLI configuration resolved from the environment.
//!
//! `.env` in the working directory is loaded first when present; real
//! environment variables take precedence over it.

use eventsproject_core::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "EVENTS_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "EVENTS_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "EVENTS_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "eventsproject.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<String>,
}

impl CliConfig {
    pub fn from_env() -> Self {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            db_path: non_blank(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME)),
            log_level: non_blank(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: non_blank(LOG_DIR_VAR),
        }
    }
}
