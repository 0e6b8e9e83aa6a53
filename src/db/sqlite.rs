use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection};

use super::DatabaseError;

/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One embedded schema step. Versions are strictly increasing.
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial",
    sql: include_str!("../../resources/migrations/001_initial.sql"),
}];

/// Open the booking database at `path`, creating the directory and
/// bringing the schema up to date.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| DatabaseError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }
    prepare(Connection::open(path)?)
}

/// Fresh in-memory database with the full schema. Used by tests.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> Result<Connection, DatabaseError> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let version = migrate(&conn)?;
    tracing::debug!(version, "Schema ready");
    Ok(conn)
}

/// Apply every migration newer than the recorded version, each in its own
/// transaction together with its `schema_version` row. Returns the version
/// the database ends up at.
fn migrate(conn: &Connection) -> Result<i64, DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             applied_at TEXT NOT NULL DEFAULT (datetime('now'))
         );",
    )?;

    let mut applied = schema_version(conn)?;
    let start = applied;
    for step in MIGRATIONS.iter().filter(move |m| m.version > start) {
        let failed = |e: rusqlite::Error| DatabaseError::MigrationFailed {
            version: step.version,
            reason: e.to_string(),
        };
        let tx = conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(step.sql).map_err(failed)?;
        tx.execute(
            "INSERT INTO schema_version (version, name) VALUES (?1, ?2)",
            params![step.version, step.name],
        )
        .map_err(failed)?;
        tx.commit().map_err(failed)?;

        tracing::info!(version = step.version, name = step.name, "Applied schema migration");
        applied = step.version;
    }
    Ok(applied)
}

fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}
