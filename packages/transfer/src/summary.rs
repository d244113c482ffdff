//! Per-run accounting.

use std::fmt;

/// One item that failed during a run, kept for the final report.
#[derive(Debug, Clone)]
pub struct FailedItem {
    /// Object key or local path.
    pub item: String,
    /// What went wrong.
    pub message: String,
}

/// Counters accumulated across a whole invocation and printed once at
/// the end. Failures are listed by key/path — never silently swallowed.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Items that completed.
    pub succeeded: u64,
    /// Items skipped as unchanged/unnecessary.
    pub skipped: u64,
    /// Items that failed.
    pub failed: u64,
    /// Bytes transferred (or removed) by successful items.
    pub bytes: u64,
    failures: Vec<FailedItem>,
}

impl RunSummary {
    /// Records one successful item.
    pub const fn record_success(&mut self, bytes: u64) {
        self.succeeded += 1;
        self.bytes += bytes;
    }

    /// Records one skipped item.
    pub const fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Records one failed item, logging it immediately.
    pub fn record_failure(&mut self, item: impl Into<String>, message: impl Into<String>) {
        let item = item.into();
        let message = message.into();
        log::warn!("  failed: {item}: {message}");
        self.failed += 1;
        self.failures.push(FailedItem { item, message });
    }

    /// Folds another summary into this one.
    pub fn merge(&mut self, other: Self) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.bytes += other.bytes;
        self.failures.extend(other.failures);
    }

    /// Whether any item failed.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Every recorded failure, in occurrence order.
    #[must_use]
    pub fn failures(&self) -> &[FailedItem] {
        &self.failures
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} skipped, {} failed ({})",
            self.succeeded,
            self.skipped,
            self.failed,
            format_size(self.bytes)
        )
    }
}

/// Formats a byte count as a human-readable size.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)] // display-only value
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} PB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_accumulates_counters_and_failures() {
        let mut first = RunSummary::default();
        first.record_success(100);
        first.record_skip();

        let mut second = RunSummary::default();
        second.record_success(50);
        second.record_failure("old/x.txt", "AccessDenied");

        first.merge(second);

        assert_eq!(first.succeeded, 2);
        assert_eq!(first.skipped, 1);
        assert_eq!(first.failed, 1);
        assert_eq!(first.bytes, 150);
        assert_eq!(first.failures().len(), 1);
        assert!(first.has_failures());
    }

    #[test]
    fn display_includes_size() {
        let mut summary = RunSummary::default();
        summary.record_success(2048);
        assert_eq!(summary.to_string(), "1 succeeded, 0 skipped, 0 failed (2.00 KB)");
    }

    #[test]
    fn format_size_picks_sensible_units() {
        assert_eq!(format_size(0), "0.00 B");
        assert_eq!(format_size(512), "512.00 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }
}
