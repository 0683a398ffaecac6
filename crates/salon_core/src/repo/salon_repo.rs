//! Salon repository contracts and storage implementations.
//!
//! # Responsibility
//! - Provide an ordered key-value map from salon id to salon record.
//! - Keep SQL and serialization details inside the persistence boundary.
//!
//! # Invariants
//! - Listing returns records in ascending id order for every backend.
//! - `insert_salon` replaces the full record (last writer wins).
//! - Read paths reject undecodable persisted state instead of masking it.

use crate::db::{verify_registry_schema, DbError};
use crate::model::salon::{Salon, SalonId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-level failure. Domain outcomes (missing ids, ownership) are not
/// represented here.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "salon record serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted salon data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
        }
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

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Ordered map interface the registry is built on.
pub trait SalonRepository {
    fn get_salon(&self, id: &str) -> RepoResult<Option<Salon>>;
    /// Stores `salon` under its id and returns the record it replaced.
    fn insert_salon(&self, salon: &Salon) -> RepoResult<Option<Salon>>;
    /// Removes the record under `id` and returns it.
    fn remove_salon(&self, id: &str) -> RepoResult<Option<Salon>>;
    fn list_salons(&self) -> RepoResult<Vec<Salon>>;
    fn count_salons(&self) -> RepoResult<u64>;
}

impl<T: SalonRepository + ?Sized> SalonRepository for &T {
    fn get_salon(&self, id: &str) -> RepoResult<Option<Salon>> {
        (**self).get_salon(id)
    }

    fn insert_salon(&self, salon: &Salon) -> RepoResult<Option<Salon>> {
        (**self).insert_salon(salon)
    }

    fn remove_salon(&self, id: &str) -> RepoResult<Option<Salon>> {
        (**self).remove_salon(id)
    }

    fn list_salons(&self) -> RepoResult<Vec<Salon>> {
        (**self).list_salons()
    }

    fn count_salons(&self) -> RepoResult<u64> {
        (**self).count_salons()
    }
}

/// In-process repository over a `BTreeMap`.
///
/// Never fails; single-threaded hosts only.
#[derive(Debug, Default)]
pub struct InMemorySalonRepository {
    salons: RefCell<BTreeMap<SalonId, Salon>>,
}

impl InMemorySalonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SalonRepository for InMemorySalonRepository {
    fn get_salon(&self, id: &str) -> RepoResult<Option<Salon>> {
        Ok(self.salons.borrow().get(id).cloned())
    }

    fn insert_salon(&self, salon: &Salon) -> RepoResult<Option<Salon>> {
        Ok(self
            .salons
            .borrow_mut()
            .insert(salon.id.clone(), salon.clone()))
    }

    fn remove_salon(&self, id: &str) -> RepoResult<Option<Salon>> {
        Ok(self.salons.borrow_mut().remove(id))
    }

    fn list_salons(&self) -> RepoResult<Vec<Salon>> {
        Ok(self.salons.borrow().values().cloned().collect())
    }

    fn count_salons(&self) -> RepoResult<u64> {
        Ok(self.salons.borrow().len() as u64)
    }
}

/// SQLite-backed repository storing each salon as one JSON document.
pub struct SqliteSalonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSalonRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `Db(MissingTable | MissingColumn)` when the connection was not opened
    ///   through [`crate::db::open_db`] and lacks the registry schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        verify_registry_schema(conn)?;
        Ok(Self { conn })
    }
}

impl SalonRepository for SqliteSalonRepository<'_> {
    fn get_salon(&self, id: &str) -> RepoResult<Option<Salon>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, record FROM salons WHERE id = ?1;",
                [id],
                read_record_row,
            )
            .optional()?;

        record
            .map(|(row_id, json)| decode_salon(&row_id, &json))
            .transpose()
    }

    fn insert_salon(&self, salon: &Salon) -> RepoResult<Option<Salon>> {
        let encoded = serde_json::to_string(salon)?;
        let tx = self.conn.unchecked_transaction()?;

        let previous = tx
            .query_row(
                "SELECT id, record FROM salons WHERE id = ?1;",
                [salon.id.as_str()],
                read_record_row,
            )
            .optional()?
            .map(|(row_id, json)| decode_salon(&row_id, &json))
            .transpose()?;

        tx.execute(
            "INSERT INTO salons (id, record) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET record = excluded.record;",
            params![salon.id.as_str(), encoded],
        )?;
        tx.commit()?;

        Ok(previous)
    }

    fn remove_salon(&self, id: &str) -> RepoResult<Option<Salon>> {
        let tx = self.conn.unchecked_transaction()?;

        let removed = tx
            .query_row(
                "SELECT id, record FROM salons WHERE id = ?1;",
                [id],
                read_record_row,
            )
            .optional()?
            .map(|(row_id, json)| decode_salon(&row_id, &json))
            .transpose()?;

        if removed.is_some() {
            tx.execute("DELETE FROM salons WHERE id = ?1;", [id])?;
        }
        tx.commit()?;

        Ok(removed)
    }

    fn list_salons(&self) -> RepoResult<Vec<Salon>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, record FROM salons ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut salons = Vec::new();

        while let Some(row) = rows.next()? {
            let (row_id, json) = read_record_row(row)?;
            salons.push(decode_salon(&row_id, &json)?);
        }

        Ok(salons)
    }

    fn count_salons(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM salons;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative salon count `{count}`")))
    }
}

fn read_record_row(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get("id")?, row.get("record")?))
}

fn decode_salon(row_id: &str, json: &str) -> RepoResult<Salon> {
    let salon: Salon = serde_json::from_str(json).map_err(|err| {
        RepoError::InvalidData(format!("undecodable record for salons.id `{row_id}`: {err}"))
    })?;

    if salon.id != row_id {
        return Err(RepoError::InvalidData(format!(
            "record id `{}` does not match salons.id `{row_id}`",
            salon.id
        )));
    }

    Ok(salon)
}
