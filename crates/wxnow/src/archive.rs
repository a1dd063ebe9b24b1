//! Read-only access to the station archive.
//!
//! The archive is the host's SQLite database: one row per archive
//! interval, keyed by `dateTime` (epoch seconds), with one column per
//! observation type. Only sums over time spans are needed here.

use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

/// Errors from archive queries.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Invalid SQL identifier: '{0}'")]
    InvalidIdentifier(String),
    #[error("Timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Open-closed time span `(start, stop]` in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: i64,
    pub stop: i64,
}

impl TimeSpan {
    pub const fn new(start: i64, stop: i64) -> Self {
        Self { start, stop }
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.start < ts && ts <= self.stop
    }
}

/// Historical aggregates over the archive.
pub trait ArchiveSource {
    /// Sum of `obs_type` over every record inside `span`.
    ///
    /// `Ok(None)` means no record carried a value in the span.
    fn sum(&self, obs_type: &str, span: TimeSpan) -> Result<Option<f64>>;
}

impl<T: ArchiveSource + ?Sized> ArchiveSource for &T {
    fn sum(&self, obs_type: &str, span: TimeSpan) -> Result<Option<f64>> {
        (**self).sum(obs_type, span)
    }
}

impl<T: ArchiveSource + ?Sized> ArchiveSource for Box<T> {
    fn sum(&self, obs_type: &str, span: TimeSpan) -> Result<Option<f64>> {
        (**self).sum(obs_type, span)
    }
}

/// SQLite-backed archive.
pub struct SqliteArchive {
    conn: Connection,
    table: String,
}

impl SqliteArchive {
    /// Open the archive database at `path` read-only.
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::from_connection(conn, table)
    }

    /// Wrap an already-open connection.
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self> {
        validate_identifier(table)?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl ArchiveSource for SqliteArchive {
    fn sum(&self, obs_type: &str, span: TimeSpan) -> Result<Option<f64>> {
        validate_identifier(obs_type)?;
        // Identifiers cannot be bound as parameters; both are validated.
        let sql = format!(
            "SELECT SUM({}) FROM {} WHERE dateTime > ?1 AND dateTime <= ?2",
            obs_type, self.table
        );
        let total = self
            .conn
            .query_row(&sql, params![span.start, span.stop], |row| {
                row.get::<_, Option<f64>>(0)
            })?;
        Ok(total)
    }
}

/// Validate a table or column name: 1-64 chars, `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_start || !valid_rest || name.len() > 64 {
        return Err(ArchiveError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}
