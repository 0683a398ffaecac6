//! Registry schema revisions.
//!
//! # Invariants
//! - Revisions are applied in ascending order inside one transaction.
//! - After `migrate` returns `Ok`, `user_version == SCHEMA_VERSION`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Schema revision written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// `(revision, name, sql)`; the last entry must match `SCHEMA_VERSION`.
const REVISIONS: &[(u32, &str, &str)] = &[(1, "salons", include_str!("sql/0001_salons.sql"))];

/// Columns the salon repository reads and writes.
const SALON_COLUMNS: [&str; 2] = ["id", "record"];

/// Revision change performed by [`migrate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaUpgrade {
    pub from: u32,
    pub to: u32,
}

impl SchemaUpgrade {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings the database up to `SCHEMA_VERSION`.
///
/// # Errors
/// - `SchemaTooNew` when the file carries a later revision; nothing is written.
pub fn migrate(conn: &mut Connection) -> DbResult<SchemaUpgrade> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    let upgrade = SchemaUpgrade {
        from: found,
        to: SCHEMA_VERSION,
    };
    if upgrade.is_noop() {
        return Ok(upgrade);
    }

    let tx = conn.transaction()?;
    for (revision, name, sql) in REVISIONS.iter().filter(|(revision, ..)| *revision > found) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", revision)?;
        info!("event=db_migrate module=db status=applied revision={revision} name={name}");
    }
    tx.commit()?;

    Ok(upgrade)
}

/// Checks that the `salons` table exists with every column the repository uses.
pub fn verify_registry_schema(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('salons');")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(DbError::MissingTable("salons"));
    }
    for column in SALON_COLUMNS {
        if !columns.iter().any(|present| present == column) {
            return Err(DbError::MissingColumn {
                table: "salons",
                column,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{REVISIONS, SCHEMA_VERSION};

    #[test]
    fn revisions_ascend_and_end_at_schema_version() {
        assert!(REVISIONS.windows(2).all(|pair| pair[0].0 < pair[1].0));
        assert_eq!(REVISIONS.last().map(|(revision, ..)| *revision), Some(SCHEMA_VERSION));
    }
}
