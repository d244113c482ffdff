#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch mutation operations for the bucket-ops tools.
//!
//! Everything here works the same way: take a prepared list of work
//! items, walk it sequentially, attribute success/failure per item, and
//! fold the results into a [`summary::RunSummary`]. A failed item never
//! aborts the run — it is recorded and reported at the end, and the
//! operator re-runs the command to retry (uploads are incremental,
//! deletes are idempotent).
//!
//! Batch deletes are partitioned into chunks of
//! [`bucket_ops_client::MAX_BATCH_KEYS`]; a transport failure on one
//! chunk marks every key in that chunk failed and processing continues
//! with the next chunk.

pub mod batch;
pub mod filter;
pub mod migrate;
pub mod progress;
pub mod relocate;
pub mod store;
pub mod summary;
pub mod upload;

/// Errors that can occur while preparing or executing operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Storage API failure.
    #[error(transparent)]
    Client(#[from] bucket_ops_client::ClientError),

    /// Inventory or differ failure.
    #[error(transparent)]
    Inventory(#[from] bucket_ops_inventory::InventoryError),

    /// A wildcard filter failed to parse.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// Underlying glob error.
        source: glob::PatternError,
    },

    /// A move pair was not given as `SOURCE:DEST`.
    #[error("Invalid move pair '{value}' (expected SOURCE:DEST)")]
    InvalidMovePair {
        /// The offending argument.
        value: String,
    },

    /// Migration configuration was invalid.
    #[error("Invalid migration: {message}")]
    InvalidMigration {
        /// Description of what was wrong.
        message: String,
    },
}
