//! SQLite database connection management for Linkshelf.
//!
//! Provides the [`Database`] struct that wraps a `rusqlite::Connection`,
//! runs schema migrations on open, and scopes multi-statement writes in a
//! unit of work.

use rusqlite::{Connection, Transaction};
use std::path::Path;
use tracing::{debug, info};

use super::migrations;

/// Core database wrapper providing SQLite connection management.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) a SQLite database at the given file path and runs migrations.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        info!(path = %path.as_ref().display(), "opening bookmark database");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    /// Opens an in-memory SQLite database and runs migrations.
    ///
    /// The database is discarded when the `Database` is dropped.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<(), rusqlite::Error> {
        migrations::run_all(&self.conn)
    }

    /// Returns a reference to the underlying `rusqlite::Connection`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `work` inside a single transaction.
    ///
    /// Commits when `work` returns `Ok`. Any `Err`, including an early `?`
    /// exit, drops the transaction, which rolls every statement back.
    pub fn unit_of_work<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<rusqlite::Error>,
    {
        unit_of_work(&self.conn, work)
    }
}

/// Runs `work` inside a transaction on a borrowed connection.
///
/// Managers hold `&Connection`, so the transaction is opened with
/// `unchecked_transaction`; nested use on the same connection fails with a
/// SQLite error instead of silently joining the outer transaction.
pub fn unit_of_work<T, E, F>(conn: &Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    let tx = conn.unchecked_transaction()?;
    match work(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            debug!("unit of work failed, rolling back");
            drop(tx);
            Err(err)
        }
    }
}
