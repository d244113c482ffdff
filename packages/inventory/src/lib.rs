#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Inventories and change detection for bucket uploads.
//!
//! Three pieces feed the upload pipeline:
//!
//! - [`local::scan_dir`] walks a directory tree into a list of
//!   [`local::LocalFile`] records with their intended remote keys;
//! - [`remote::RemoteInventory`] maps what already exists in the bucket
//!   (base filename → most recently listed key);
//! - [`diff::classify`] compares the two, using lazily fetched stored
//!   fingerprints, and emits a [`diff::TransferPlan`] of new/changed files.
//!
//! Fingerprints ([`fingerprint::Fingerprint`]) are fast non-cryptographic
//! 64-bit digests used purely for change detection.

pub mod diff;
pub mod fingerprint;
pub mod local;
pub mod remote;

/// Errors that can occur while building inventories or classifying files.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// Root path is not a directory.
    #[error("Not a directory: {}", path.display())]
    NotADirectory {
        /// The offending path.
        path: std::path::PathBuf,
    },

    /// Storage API failure.
    #[error(transparent)]
    Client(#[from] bucket_ops_client::ClientError),

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
