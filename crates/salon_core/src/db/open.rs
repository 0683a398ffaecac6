//! Registry connection bootstrap.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - Returned connections are at `SCHEMA_VERSION` and pass
//!   `verify_registry_schema`.

use super::schema::{migrate, verify_registry_schema, SchemaUpgrade};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) the registry file at `path`.
///
/// Emits `db_open` events with duration, status and schema revisions.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory registry.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = connect()
        .map_err(DbError::from)
        .and_then(|mut conn| prepare_registry(&mut conn).map(|upgrade| (conn, upgrade)));

    match result {
        Ok((conn, upgrade)) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={} from_version={} to_version={}",
                started_at.elapsed().as_millis(),
                upgrade.from,
                upgrade.to
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn prepare_registry(conn: &mut Connection) -> DbResult<SchemaUpgrade> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let upgrade = migrate(conn)?;
    verify_registry_schema(conn)?;
    Ok(upgrade)
}
