//! Transition log sink: an explicitly passed capability, not process-wide
//! state. The default sink discards everything; `TracingLog` forwards to
//! `tracing` for callers that want the standard subscriber pipeline.

use crate::migration::Version;

/// Receives one event per committed transition. `None` stands for the
/// sentinel head, i.e. "no migration applied".
pub trait MigrationLog {
    fn up_transition(&self, from: Option<Version>, to: Version);
    fn down_transition(&self, from: Version, to: Option<Version>);
}

/// Discards all events. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl MigrationLog for NullLog {
    fn up_transition(&self, _from: Option<Version>, _to: Version) {}
    fn down_transition(&self, _from: Version, _to: Option<Version>) {}
}

/// Forwards transitions to `tracing::info!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl MigrationLog for TracingLog {
    fn up_transition(&self, from: Option<Version>, to: Version) {
        tracing::info!(from = ?from, to, "applied up migration");
    }

    fn down_transition(&self, from: Version, to: Option<Version>) {
        tracing::info!(from, to = ?to, "reverted down migration");
    }
}
