//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contracts the services depend on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Writes validate the model before any SQL mutation.
//! - Reads reject invalid persisted state instead of masking it.
//! - SQLite repositories only accept fully migrated connections.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::{EventId, LogisticsId, ModelError, ParticipantId};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod event_repo;
pub mod participant_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Model invariant violated on write or on read-back.
    Validation(ModelError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    EventNotFound(EventId),
    ParticipantNotFound(ParticipantId),
    LogisticsNotFound(LogisticsId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::ParticipantNotFound(id) => write!(f, "participant not found: {id}"),
            Self::LogisticsNotFound(id) => write!(f, "logistics not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for RepoError {
    fn from(value: ModelError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Table name plus the columns a repository reads or writes.
pub(crate) type TableContract = (&'static str, &'static [&'static str]);

/// Verifies that `conn` is migrated and exposes every required column.
pub(crate) fn ensure_schema_ready(conn: &Connection, tables: &[TableContract]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
