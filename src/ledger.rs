//! Ledger store adapter: the persisted record of applied migrations.
//!
//! One row per applied migration in the `migrations` table
//! (`version INTEGER, hash TEXT`). The table carries no constraints;
//! uniqueness of versions is guaranteed by construction — every insert goes
//! through a validated chain, inside the same transaction as the script it
//! records.

use rusqlite::{params, Connection};

use crate::errors::MigrateError;
use crate::migration::Version;

pub(crate) const LEDGER_TABLE: &str = "migrations";

const CREATE_LEDGER_SQL: &str = "CREATE TABLE IF NOT EXISTS migrations (
    version INTEGER,
    hash TEXT
)";

const READ_LEDGER_SQL: &str = "SELECT version, hash FROM migrations ORDER BY version ASC";

/// One persisted ledger row: a version and the content fingerprint the
/// migration had when it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub version: Version,
    pub hash: String,
}

/// Read the full ledger in ascending version order.
///
/// Lazily bootstraps the ledger table: if the first read fails because the
/// table does not exist yet, creates it and retries the read once. Any
/// other failure is fatal and propagated as-is.
pub fn read_ledger(conn: &Connection) -> Result<Vec<LedgerRecord>, MigrateError> {
    match read_rows(conn) {
        Ok(rows) => Ok(rows),
        Err(first) => {
            if ledger_exists(conn)? {
                return Err(first.into());
            }
            tracing::debug!(table = LEDGER_TABLE, "creating migration ledger table");
            conn.execute_batch(CREATE_LEDGER_SQL)?;
            Ok(read_rows(conn)?)
        }
    }
}

fn read_rows(conn: &Connection) -> Result<Vec<LedgerRecord>, rusqlite::Error> {
    let mut stmt = conn.prepare(READ_LEDGER_SQL)?;
    let rows = stmt.query_map([], |row| {
        Ok(LedgerRecord {
            version: row.get(0)?,
            hash: row.get(1)?,
        })
    })?;
    rows.collect()
}

fn ledger_exists(conn: &Connection) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![LEDGER_TABLE],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Insert one ledger row. Must run inside the same transaction as the up
/// script it records.
pub fn insert_record(
    conn: &Connection,
    version: Version,
    hash: &str,
) -> Result<(), MigrateError> {
    conn.execute(
        "INSERT INTO migrations (version, hash) VALUES (?1, ?2)",
        params![version, hash],
    )?;
    Ok(())
}

/// Delete one ledger row by version. Must run inside the same transaction
/// as the down script that reverts it.
pub fn delete_record(conn: &Connection, version: Version) -> Result<(), MigrateError> {
    conn.execute("DELETE FROM migrations WHERE version = ?1", params![version])?;
    Ok(())
}

/// Highest recorded version, or `NoVersionFound` on an empty ledger.
/// Boundary signal, not a failure: "nothing applied yet" is a legal state.
pub fn latest_version(conn: &Connection) -> Result<Version, MigrateError> {
    read_ledger(conn)?
        .last()
        .map(|rec| rec.version)
        .ok_or(MigrateError::NoVersionFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_creates_missing_table_and_returns_empty() {
        let conn = Connection::open_in_memory().unwrap();
        let ledger = read_ledger(&conn).unwrap();
        assert!(ledger.is_empty());
        assert!(ledger_exists(&conn).unwrap());
    }

    #[test]
    fn read_is_idempotent_after_bootstrap() {
        let conn = Connection::open_in_memory().unwrap();
        read_ledger(&conn).unwrap();
        read_ledger(&conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'migrations'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn rows_come_back_in_version_order() {
        let conn = Connection::open_in_memory().unwrap();
        read_ledger(&conn).unwrap();
        insert_record(&conn, 4, "h4").unwrap();
        insert_record(&conn, 1, "h1").unwrap();
        insert_record(&conn, 3, "h3").unwrap();

        let versions: Vec<_> = read_ledger(&conn).unwrap().into_iter().map(|r| r.version).collect();
        assert_eq!(versions, vec![1, 3, 4]);
    }

    #[test]
    fn latest_version_tracks_inserts_and_deletes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            latest_version(&conn),
            Err(MigrateError::NoVersionFound)
        ));

        insert_record(&conn, 1, "h1").unwrap();
        insert_record(&conn, 3, "h3").unwrap();
        assert_eq!(latest_version(&conn).unwrap(), 3);

        delete_record(&conn, 3).unwrap();
        assert_eq!(latest_version(&conn).unwrap(), 1);
    }

    #[test]
    fn unrelated_read_failure_is_not_masked_by_bootstrap() {
        let conn = Connection::open_in_memory().unwrap();
        // A table with the right name but a missing column: the read fails,
        // the table exists, so the error must surface instead of a retry.
        conn.execute_batch("CREATE TABLE migrations (version INTEGER)")
            .unwrap();
        assert!(matches!(
            read_ledger(&conn),
            Err(MigrateError::Ledger(_))
        ));
    }
}
