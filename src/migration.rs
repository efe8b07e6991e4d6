//! The caller-supplied migration type and its content fingerprint.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

/// Migration version number, stored as SQLite INTEGER.
pub type Version = i64;

/// One versioned schema/data change: a forward script and its inverse.
///
/// The engine never parses or mutates the scripts; they are opaque SQL run
/// verbatim inside the step's transaction. Versions must be unique within a
/// set; gaps are fine (1, 3, 4 is a valid sequence).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub version: Version,
    /// Forward change, executed by an up transition.
    pub up: String,
    /// Inverse change, executed by a down transition.
    pub down: String,
}

impl Migration {
    pub fn new(version: Version, up: impl Into<String>, down: impl Into<String>) -> Self {
        Self {
            version,
            up: up.into(),
            down: down.into(),
        }
    }

    /// Deterministic fingerprint of the full definition: SHA-256 over the
    /// up script, the down script, and the decimal version string, base64
    /// encoded. Changes if and only if one of the three changes. The ledger
    /// stores this next to the version so later runs can detect drift.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.up.as_bytes());
        hasher.update(self.down.as_bytes());
        hasher.update(self.version.to_string().as_bytes());
        STANDARD.encode(hasher.finalize())
    }
}
