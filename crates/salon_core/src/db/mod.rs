//! SQLite storage for the salon registry.
//!
//! # Responsibility
//! - Open registry databases and bring them to the schema this binary knows.
//! - Check that the `salons(id, record)` table is usable before any repo
//!   reads or writes it.
//!
//! # Invariants
//! - The schema revision lives in `PRAGMA user_version`.
//! - A database stamped with a newer revision is never written to.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{migrate, schema_version, verify_registry_schema, SchemaUpgrade, SCHEMA_VERSION};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer registry build.
    SchemaTooNew { found: u32, supported: u32 },
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "registry schema revision {found} is newer than this build supports ({supported})"
            ),
            Self::MissingTable(table) => write!(f, "registry table `{table}` is missing"),
            Self::MissingColumn { table, column } => {
                write!(f, "registry table `{table}` has no `{column}` column")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
