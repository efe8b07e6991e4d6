//! Transition executor: transactional single steps along the chain, plus
//! the multi-step operations built on top of them.
//!
//! Each single step is all-or-nothing: the script execution and the ledger
//! mutation share one transaction. Multi-step runs are not atomic as a
//! whole — if step k of n fails, steps 1..k-1 stay committed and the ledger
//! reflects the partial sequence, so a retry resumes from that exact point.

use rusqlite::Connection;

use crate::chain::MigrationState;
use crate::errors::MigrateError;
use crate::ledger;
use crate::log::{MigrationLog, NullLog};
use crate::migration::{Migration, Version};

/// Upper bound for an up run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Apply every pending migration. An explicit marker, not a numeric
    /// ceiling — there is no version this cannot reach.
    Latest,
    /// Apply pending migrations up to and including this version.
    Version(Version),
}

/// The migration engine. Owns a transition log sink; everything else
/// (connection, migration set) is supplied per call.
///
/// Synchronous and single-writer: one statement at a time on the supplied
/// connection, no internal locking. Running concurrent migrators against
/// the same database is unsupported.
pub struct Migrator {
    log: Box<dyn MigrationLog>,
}

impl Migrator {
    /// A migrator with the default no-op log sink.
    pub fn new() -> Self {
        Self {
            log: Box::new(NullLog),
        }
    }

    /// A migrator that reports transitions to the given sink.
    pub fn with_log(log: impl MigrationLog + 'static) -> Self {
        Self { log: Box::new(log) }
    }

    /// Apply every pending migration.
    pub fn up_all(&self, conn: &Connection, migs: &[Migration]) -> Result<(), MigrateError> {
        self.up_until(conn, migs, Target::Latest)
    }

    /// Apply pending migrations up to and including `version`.
    pub fn up_to(
        &self,
        conn: &Connection,
        migs: &[Migration],
        version: Version,
    ) -> Result<(), MigrateError> {
        self.up_until(conn, migs, Target::Version(version))
    }

    /// Apply pending migrations until the target is reached or the chain
    /// runs out. Running out is normal completion, not an error; any step
    /// failure aborts immediately with the failing version named.
    pub fn up_until(
        &self,
        conn: &Connection,
        migs: &[Migration],
        target: Target,
    ) -> Result<(), MigrateError> {
        let ledger = ledger::read_ledger(conn)?;
        let mut state = MigrationState::analyze(migs, &ledger)?;

        while let Some(next) = state.next_pending() {
            if let Target::Version(ceiling) = target {
                if next.version > ceiling {
                    break;
                }
            }
            self.step_up(conn, &mut state)?;
        }
        Ok(())
    }

    /// Apply exactly one pending migration. `NoNewerVersion` signals that
    /// the chain is already at the top; callers loop on it for completion.
    pub fn up(&self, conn: &Connection, migs: &[Migration]) -> Result<(), MigrateError> {
        let ledger = ledger::read_ledger(conn)?;
        let mut state = MigrationState::analyze(migs, &ledger)?;
        self.step_up(conn, &mut state)
    }

    /// Revert exactly one applied migration. `NoOlderVersion` signals that
    /// nothing is applied.
    pub fn down(&self, conn: &Connection, migs: &[Migration]) -> Result<(), MigrateError> {
        let ledger = ledger::read_ledger(conn)?;
        let mut state = MigrationState::analyze(migs, &ledger)?;
        self.step_down(conn, &mut state)
    }

    /// Latest applied version, or `NoVersionFound` on an empty ledger.
    pub fn version(&self, conn: &Connection) -> Result<Version, MigrateError> {
        ledger::latest_version(conn)
    }

    fn step_up(
        &self,
        conn: &Connection,
        state: &mut MigrationState<'_>,
    ) -> Result<(), MigrateError> {
        let next = state.next_pending().ok_or(MigrateError::NoNewerVersion)?;
        let from = state.current_version();

        // RAII transaction — auto-rollback on drop, commit only at the end.
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(&next.up)
            .map_err(|e| MigrateError::UpScript {
                version: next.version,
                source: e,
            })?;
        ledger::insert_record(&tx, next.version, &next.fingerprint())?;
        tx.commit()?;

        state.advance();
        tracing::debug!(version = next.version, "up step committed");
        self.log.up_transition(from, next.version);
        Ok(())
    }

    fn step_down(
        &self,
        conn: &Connection,
        state: &mut MigrationState<'_>,
    ) -> Result<(), MigrateError> {
        let applied = state.current().ok_or(MigrateError::NoOlderVersion)?;

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(&applied.down)
            .map_err(|e| MigrateError::DownScript {
                version: applied.version,
                source: e,
            })?;
        ledger::delete_record(&tx, applied.version)?;
        tx.commit()?;

        state.retreat();
        tracing::debug!(version = applied.version, "down step committed");
        self.log.down_transition(applied.version, state.current_version());
        Ok(())
    }
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}
