//! Versioned SQLite migration engine with a hash-verified ledger.
//!
//! Callers supply an unordered set of [`Migration`]s (opaque up/down SQL
//! plus a version) and a `rusqlite` connection. The engine keeps a ledger
//! table of applied versions and their content fingerprints, rebuilds a
//! validated chronological chain on every operation, and moves along it
//! one transactional step at a time:
//!
//! - the ledger must always be a hash-verified prefix of the supplied set;
//!   any edit to an already-applied migration is detected as drift and
//!   fails the run before anything mutates;
//! - each step commits the script and its ledger row together, so a failed
//!   multi-step run leaves the database at the last good version and can
//!   be retried from there.
//!
//! ```no_run
//! use sqlmigrate::{up_all, version, Migration};
//!
//! let conn = rusqlite::Connection::open("app.db")?;
//! let migs = vec![
//!     Migration::new(1, "CREATE TABLE users (id INTEGER);", "DROP TABLE users;"),
//!     Migration::new(2, "ALTER TABLE users ADD name TEXT;", "ALTER TABLE users DROP name;"),
//! ];
//! up_all(&conn, &migs)?;
//! assert_eq!(version(&conn)?, 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Single logical migrator per database at a time; concurrent instances
//! are not coordinated and not supported.

pub mod chain;
pub mod errors;
pub mod ledger;
pub mod log;
pub mod migration;

mod executor;

pub use chain::MigrationState;
pub use errors::MigrateError;
pub use executor::{Migrator, Target};
pub use ledger::LedgerRecord;
pub use log::{MigrationLog, NullLog, TracingLog};
pub use migration::{Migration, Version};

use rusqlite::Connection;

/// Apply every pending migration. See [`Migrator::up_all`].
pub fn up_all(conn: &Connection, migs: &[Migration]) -> Result<(), MigrateError> {
    Migrator::new().up_all(conn, migs)
}

/// Apply pending migrations up to and including `version`.
/// See [`Migrator::up_to`].
pub fn up_to(conn: &Connection, migs: &[Migration], version: Version) -> Result<(), MigrateError> {
    Migrator::new().up_to(conn, migs, version)
}

/// Apply exactly one pending migration. See [`Migrator::up`].
pub fn up(conn: &Connection, migs: &[Migration]) -> Result<(), MigrateError> {
    Migrator::new().up(conn, migs)
}

/// Revert exactly one applied migration. See [`Migrator::down`].
pub fn down(conn: &Connection, migs: &[Migration]) -> Result<(), MigrateError> {
    Migrator::new().down(conn, migs)
}

/// Latest applied version, or [`MigrateError::NoVersionFound`] when the
/// ledger is empty. See [`Migrator::version`].
pub fn version(conn: &Connection) -> Result<Version, MigrateError> {
    Migrator::new().version(conn)
}
