//! Database layer for HanapRx.

mod schema;
mod pharmacies;
mod branches;
mod medicines;
mod inventory;

pub use schema::*;
#[allow(unused_imports)]
pub use pharmacies::*;
#[allow(unused_imports)]
pub use branches::*;
#[allow(unused_imports)]
pub use medicines::*;
#[allow(unused_imports)]
pub use inventory::*;

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::models::ValidationError;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Register SQL functions and initialize schema.
    fn initialize(&self) -> DbResult<()> {
        register_functions(&self.conn)?;
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction. Rolls back unless committed.
    pub fn transaction(&self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }
}

/// Register `fold_case(text)`, a Unicode-aware `lower()`.
///
/// SQLite's built-in `lower()` only folds ASCII.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

/// Current time as a fixed-width RFC 3339 string, so text order is time order.
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

/// Read a stock count column; the schema guarantees it is non-negative.
pub(crate) fn stock_count(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Map a UNIQUE violation to `Conflict`, everything else passes through.
pub(crate) fn map_unique_violation(err: rusqlite::Error, message: &str) -> DbError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            DbError::Conflict(message.to_string())
        }
        other => DbError::Sqlite(other),
    }
}
