//! Error handling for the migration engine.
//! One error enum for the whole subsystem, `thiserror` only, zero `anyhow`.

use crate::migration::Version;

/// Errors produced by the migration engine.
///
/// Three families:
/// - boundary signals (`NoNewerVersion`, `NoOlderVersion`, `NoVersionFound`)
///   that callers use as loop terminators, not real failures;
/// - validation failures that abort before any mutation (the chain is never
///   built from a set that disagrees with the ledger);
/// - execution failures from running scripts or touching the ledger, after
///   the step's transaction has been rolled back.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Already at the top of the chain; nothing pending to apply.
    #[error("no newer version to apply")]
    NoNewerVersion,

    /// Already at the sentinel head; nothing applied to revert.
    #[error("no older version to revert")]
    NoOlderVersion,

    /// The ledger is empty; no migration has ever been applied.
    #[error("no version found")]
    NoVersionFound,

    /// The supplied set contains the same version twice.
    #[error("duplicate migration version {0}")]
    DuplicateVersion(Version),

    /// The supplied set and the ledger disagree on which version comes next.
    #[error("version sequence mismatch: supplied migration {supplied} where ledger records {recorded}")]
    VersionMismatch { supplied: Version, recorded: Version },

    /// A migration's current definition no longer hashes to what the ledger
    /// recorded when it was applied.
    #[error("content drift in migration {version}: ledger recorded hash \"{recorded}\", current definition hashes to \"{computed}\"")]
    ContentDrift {
        version: Version,
        recorded: String,
        computed: String,
    },

    /// The ledger records a version the supplied set does not contain.
    #[error("ledger records version {0} but no such migration was supplied")]
    MissingMigration(Version),

    /// An up script failed; the step's transaction was rolled back.
    #[error("up script for migration {version} failed: {source}")]
    UpScript {
        version: Version,
        #[source]
        source: rusqlite::Error,
    },

    /// A down script failed; the step's transaction was rolled back.
    #[error("down script for migration {version} failed: {source}")]
    DownScript {
        version: Version,
        #[source]
        source: rusqlite::Error,
    },

    /// Reading or writing the ledger itself failed.
    #[error("ledger access failed: {0}")]
    Ledger(#[from] rusqlite::Error),
}

impl MigrateError {
    /// True for the conditions that signal a chain boundary rather than a
    /// failure: callers loop on these to detect completion.
    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            Self::NoNewerVersion | Self::NoOlderVersion | Self::NoVersionFound
        )
    }
}
