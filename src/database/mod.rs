//! Linkshelf database layer.
//!
//! Provides SQLite connection management, schema migrations, the unit of work
//! and the row-level storage helpers used by the managers.
//!
//! # Usage
//!
//! ```no_run
//! use linkshelf::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("linkshelf.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//!
//! // Group several writes so they commit or roll back together
//! db.unit_of_work(|tx| {
//!     tx.execute("DELETE FROM bookmark_tags", [])?;
//!     Ok::<_, rusqlite::Error>(())
//! })
//! .expect("unit of work failed");
//! ```

pub mod connection;
pub mod migrations;
pub mod store;

pub use connection::{unit_of_work, Database};
