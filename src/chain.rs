//! Chain builder/validator: cross-checks the supplied migration set against
//! the persisted ledger and materializes a navigable chronological chain.
//!
//! The chain is arena-style: a sorted slice of migration references plus a
//! cursor index. Index 0 is a sentinel head ("before the first version");
//! index k means "the k-th migration in version order is the newest one
//! applied". Neighbor navigation is k-1 / k+1, no pointer links.
//!
//! A state is rebuilt from scratch on every public operation and never
//! cached — that rebuild is what re-detects drift before any mutation.

use crate::errors::MigrateError;
use crate::ledger::LedgerRecord;
use crate::migration::{Migration, Version};

/// A validated chain with a cursor at the newest applied migration.
///
/// Not safe for concurrent mutation; each logical migration run builds and
/// owns its own state.
#[derive(Debug)]
pub struct MigrationState<'a> {
    /// All supplied migrations, ascending by version. Applied prefix first,
    /// pending suffix after the cursor.
    nodes: Vec<&'a Migration>,
    /// 0 = sentinel head; k = nodes[k-1] is the newest applied migration.
    cur: usize,
}

impl<'a> MigrationState<'a> {
    /// Build and validate a chain from the supplied set and the ledger.
    ///
    /// Sorts defensively, rejects duplicate versions, then walks ledger rows
    /// and sorted migrations in lockstep by position: the ledger must be an
    /// exact hash-verified prefix of the set. Fails fast on the first
    /// disagreement — no partial state, no auto-repair, the engine never
    /// silently adopts a changed migration.
    pub fn analyze(
        migs: &'a [Migration],
        ledger: &[LedgerRecord],
    ) -> Result<Self, MigrateError> {
        let mut nodes: Vec<&Migration> = migs.iter().collect();
        nodes.sort_by_key(|m| m.version);

        for pair in nodes.windows(2) {
            if pair[0].version == pair[1].version {
                return Err(MigrateError::DuplicateVersion(pair[0].version));
            }
        }

        for (i, rec) in ledger.iter().enumerate() {
            let mig = nodes
                .get(i)
                .ok_or(MigrateError::MissingMigration(rec.version))?;
            if mig.version != rec.version {
                return Err(MigrateError::VersionMismatch {
                    supplied: mig.version,
                    recorded: rec.version,
                });
            }
            let computed = mig.fingerprint();
            if computed != rec.hash {
                return Err(MigrateError::ContentDrift {
                    version: mig.version,
                    recorded: rec.hash.clone(),
                    computed,
                });
            }
        }

        tracing::debug!(
            applied = ledger.len(),
            pending = nodes.len() - ledger.len(),
            "migration chain verified against ledger"
        );

        Ok(Self {
            nodes,
            cur: ledger.len(),
        })
    }

    /// The newest applied migration, or `None` at the sentinel head.
    pub fn current(&self) -> Option<&'a Migration> {
        if self.cur == 0 {
            None
        } else {
            Some(self.nodes[self.cur - 1])
        }
    }

    /// Version of the newest applied migration, `None` at the head.
    pub fn current_version(&self) -> Option<Version> {
        self.current().map(|m| m.version)
    }

    /// The next pending migration, or `None` at the top of the chain.
    pub fn next_pending(&self) -> Option<&'a Migration> {
        self.nodes.get(self.cur).copied()
    }

    /// Move the cursor one step toward newer versions.
    /// Caller must have confirmed a pending node exists.
    pub(crate) fn advance(&mut self) {
        debug_assert!(self.cur < self.nodes.len());
        self.cur += 1;
    }

    /// Move the cursor one step toward older versions.
    /// Caller must have confirmed the cursor is not at the head.
    pub(crate) fn retreat(&mut self) {
        debug_assert!(self.cur > 0);
        self.cur -= 1;
    }

    /// Versions in chain order, applied and pending alike.
    pub fn versions(&self) -> impl Iterator<Item = Version> + '_ {
        self.nodes.iter().map(|m| m.version)
    }
}
