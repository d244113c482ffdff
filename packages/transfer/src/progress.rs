//! Progress reporting seam.
//!
//! Operations report coarse per-item progress through this trait so the
//! CLI can render an `indicatif` bar without this crate depending on
//! terminal machinery. Tests and non-interactive callers pass
//! [`NoProgress`].

/// Sink for per-item progress during an operation.
pub trait ProgressSink: Send + Sync {
    /// Announces the total number of items about to be processed.
    fn set_total(&self, total: u64);

    /// Records `delta` items as processed.
    fn inc(&self, delta: u64);

    /// Marks the operation finished.
    fn finish(&self, message: String);
}

/// A [`ProgressSink`] that does nothing.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set_total(&self, _total: u64) {}

    fn inc(&self, _delta: u64) {}

    fn finish(&self, _message: String) {}
}
