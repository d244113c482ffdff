//! Local directory scanner.
//!
//! Walks a root directory and pairs every regular file with the remote
//! key it should be uploaded under: the configured destination prefix
//! followed by the file's path relative to the root, `/`-separated.
//!
//! Non-regular entries (symlinks, sockets, devices) are skipped with a
//! warning — that is the single policy, applied deterministically.
//! Unreadable entries are recorded as per-file failures and excluded;
//! the scan continues.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::InventoryError;

/// A local file slated for upload.
#[derive(Debug, Clone)]
pub struct LocalFile {
    /// Absolute (or caller-relative) path on disk.
    pub path: PathBuf,
    /// Remote key this file maps to.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
}

/// A per-file failure recorded during scanning or hashing.
#[derive(Debug, Clone)]
pub struct ScanFailure {
    /// Path of the file that could not be processed.
    pub path: PathBuf,
    /// What went wrong.
    pub message: String,
}

/// Result of walking a directory tree.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Regular files found, in deterministic (name-sorted) order.
    pub files: Vec<LocalFile>,
    /// Count of non-regular entries that were skipped.
    pub skipped: u64,
    /// Entries that could not be read.
    pub failures: Vec<ScanFailure>,
}

/// Walks `root`, producing a [`LocalFile`] for every regular file
/// beneath it.
///
/// `key_prefix` is prepended to each relative path (a `/` separator is
/// inserted unless the prefix is empty or already ends with one).
///
/// # Errors
///
/// Returns [`InventoryError::NotADirectory`] if `root` is not a
/// directory. Per-file errors do not abort the scan; they are recorded
/// in the outcome.
pub fn scan_dir(root: &Path, key_prefix: &str) -> Result<ScanOutcome, InventoryError> {
    if !root.is_dir() {
        return Err(InventoryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut outcome = ScanOutcome::default();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                outcome.failures.push(ScanFailure {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            log::warn!("Skipping non-regular file: {}", entry.path().display());
            outcome.skipped += 1;
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let key = join_key(key_prefix, &key_for_relative_path(relative));

        match entry.metadata() {
            Ok(meta) => outcome.files.push(LocalFile {
                path: entry.path().to_path_buf(),
                key,
                size: meta.len(),
            }),
            Err(e) => outcome.failures.push(ScanFailure {
                path: entry.path().to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    Ok(outcome)
}

/// Joins a key prefix and a relative key, inserting a single `/` between
/// them when needed.
#[must_use]
pub fn join_key(prefix: &str, rest: &str) -> String {
    if prefix.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{rest}", prefix.trim_end_matches('/'))
    }
}

/// Converts a relative filesystem path to a `/`-separated object key.
fn key_for_relative_path(relative: &Path) -> String {
    relative
        .iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
