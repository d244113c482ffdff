#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the bucket-ops tools.
//!
//! Provides an `indicatif`-backed [`bucket_ops_transfer::progress::ProgressSink`],
//! the [`Gate`] confirmation capability used before destructive
//! operations, and [`init_logger`] which sets up `indicatif-log-bridge`
//! so that `log::info!` and friends are suspended while progress bars
//! redraw.

mod gate;

use std::sync::Arc;

use bucket_ops_transfer::progress::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};

pub use gate::{Gate, token_matches};
pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`ProgressSink`].
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    /// Creates a bar for per-object batch progress. The total is set by
    /// the operation once it knows how many items it will process.
    #[must_use]
    pub fn objects_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressSink> {
        let bar = multi.add(ProgressBar::no_length());
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} {wide_bar:.cyan/dim} {pos}/{len} {percent}% [{eta}]",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
        );
        bar.set_message(message.to_string());

        Arc::new(Self { bar })
    }
}

impl ProgressSink for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so
/// that log output and progress bars never fight for the terminal.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    // Build the pretty-env-logger logger manually so we can wrap it.
    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    multi
}
