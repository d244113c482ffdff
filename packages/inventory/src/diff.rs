//! Transfer differ: classifies local files against the bucket inventory.
//!
//! For each local file, look up its base filename in the remote
//! inventory:
//!
//! - no match → [`Decision::New`];
//! - match with fingerprinting disabled → [`Decision::Unchanged`];
//! - match with fingerprinting enabled → fetch the stored fingerprint
//!   for the matched key (one `HeadObject`, lazily), compute the local
//!   fingerprint, and compare. Equal → `Unchanged`; differing or absent
//!   (object predates fingerprinting) → [`Decision::Changed`].
//!
//! Only `Unchanged` files are skipped; `New` and `Changed` both enter
//! the transfer plan. The extra metadata calls are bounded by the number
//! of filename matches, not by the total file count.

use async_trait::async_trait;
use bucket_ops_client::BucketClient;

use crate::InventoryError;
use crate::fingerprint::{self, Fingerprint};
use crate::local::{LocalFile, ScanFailure};
use crate::remote::{RemoteInventory, base_filename};

/// Outcome of comparing one local file against the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No object with this filename exists — upload it.
    New,
    /// An object exists and the content matches — skip it.
    Unchanged,
    /// An object exists but the content differs (or carries no stored
    /// fingerprint) — re-upload it.
    Changed,
}

/// One local file with its classification and computed fingerprint.
#[derive(Debug)]
pub struct PlannedFile {
    /// The local file record.
    pub file: LocalFile,
    /// Transfer decision.
    pub decision: Decision,
    /// Local content fingerprint, when fingerprinting is enabled.
    /// Attached as object metadata at write time.
    pub fingerprint: Option<Fingerprint>,
}

/// The differ's output: per-file decisions plus per-file failures.
#[derive(Debug, Default)]
pub struct TransferPlan {
    /// Classified files, in scan order.
    pub items: Vec<PlannedFile>,
    /// Files excluded because they could not be read or hashed.
    pub failures: Vec<ScanFailure>,
}

impl TransferPlan {
    /// Files that will actually be written (`New` or `Changed`).
    pub fn to_transfer(&self) -> impl Iterator<Item = &PlannedFile> {
        self.items
            .iter()
            .filter(|item| item.decision != Decision::Unchanged)
    }

    /// Counts of (new, changed, unchanged) files.
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut new = 0;
        let mut changed = 0;
        let mut unchanged = 0;
        for item in &self.items {
            match item.decision {
                Decision::New => new += 1,
                Decision::Changed => changed += 1,
                Decision::Unchanged => unchanged += 1,
            }
        }
        (new, changed, unchanged)
    }

    /// Total bytes scheduled for transfer.
    #[must_use]
    pub fn transfer_bytes(&self) -> u64 {
        self.to_transfer().map(|item| item.file.size).sum()
    }
}

/// Lazy access to stored per-object fingerprints.
///
/// Implemented against the live bucket by [`BucketFingerprints`]; tests
/// substitute an in-memory map.
#[async_trait]
pub trait FingerprintLookup: Send + Sync {
    /// Fetches the stored fingerprint for an object key.
    ///
    /// Returns `None` when the object carries no fingerprint metadata
    /// (uploaded before fingerprinting was introduced) or doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Client`] on storage API failures.
    async fn stored_fingerprint(&self, key: &str) -> Result<Option<Fingerprint>, InventoryError>;
}

/// [`FingerprintLookup`] backed by `HeadObject` calls against a bucket.
pub struct BucketFingerprints<'a> {
    /// Client handle.
    pub client: &'a BucketClient,
    /// Bucket to query.
    pub bucket: &'a str,
}

#[async_trait]
impl FingerprintLookup for BucketFingerprints<'_> {
    async fn stored_fingerprint(&self, key: &str) -> Result<Option<Fingerprint>, InventoryError> {
        let meta = self.client.head_object(self.bucket, key).await?;
        // Unparseable metadata is treated the same as absent metadata.
        Ok(meta
            .and_then(|m| m.fingerprint)
            .and_then(|text| text.parse().ok()))
    }
}

/// Knobs for the differ.
#[derive(Debug, Clone, Copy)]
pub struct DiffOptions {
    /// When `false`, a filename match alone marks a file `Unchanged` and
    /// no fingerprints are computed or fetched.
    pub fingerprinting: bool,
    /// Match on the full destination key instead of the base filename
    /// (opts out of the historical filename-only semantics).
    pub match_full_key: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            fingerprinting: true,
            match_full_key: false,
        }
    }
}

/// Classifies every local file against the remote inventory.
///
/// Files that cannot be read or hashed are recorded in the plan's
/// `failures` and excluded; classification continues.
///
/// # Errors
///
/// Returns [`InventoryError::Client`] if a stored-fingerprint lookup
/// fails — that indicates a systemic storage problem, not a per-file
/// condition.
pub async fn classify(
    files: Vec<LocalFile>,
    inventory: &RemoteInventory,
    lookup: &dyn FingerprintLookup,
    options: DiffOptions,
) -> Result<TransferPlan, InventoryError> {
    let mut plan = TransferPlan::default();

    for file in files {
        let matched_key: Option<String> = if options.match_full_key {
            inventory.contains_key(&file.key).then(|| file.key.clone())
        } else {
            inventory
                .match_filename(base_filename(&file.key))
                .map(str::to_string)
        };

        let Some(matched_key) = matched_key else {
            // Nothing with this name exists yet.
            let fingerprint = if options.fingerprinting {
                match fingerprint::compute(&file.path).await {
                    Ok(fp) => Some(fp),
                    Err(e) => {
                        plan.failures.push(ScanFailure {
                            path: file.path,
                            message: e.to_string(),
                        });
                        continue;
                    }
                }
            } else {
                None
            };
            plan.items.push(PlannedFile {
                file,
                decision: Decision::New,
                fingerprint,
            });
            continue;
        };

        if !options.fingerprinting {
            plan.items.push(PlannedFile {
                file,
                decision: Decision::Unchanged,
                fingerprint: None,
            });
            continue;
        }

        let local = match fingerprint::compute(&file.path).await {
            Ok(fp) => fp,
            Err(e) => {
                plan.failures.push(ScanFailure {
                    path: file.path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let stored = lookup.stored_fingerprint(&matched_key).await?;
        let decision = match stored {
            Some(remote) if remote == local => Decision::Unchanged,
            // Differing content, or an object from before fingerprinting
            // was introduced: both need a fresh upload.
            _ => Decision::Changed,
        };

        log::debug!(
            "{} vs {matched_key}: {decision:?}",
            file.path.display()
        );

        plan.items.push(PlannedFile {
            file,
            decision,
            fingerprint: Some(local),
        });
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;

    use bucket_ops_client::RemoteObject;

    use super::*;
    use crate::local::scan_dir;

    /// In-memory stand-in for `HeadObject` fingerprint metadata.
    struct MapLookup(HashMap<String, Fingerprint>);

    #[async_trait]
    impl FingerprintLookup for MapLookup {
        async fn stored_fingerprint(
            &self,
            key: &str,
        ) -> Result<Option<Fingerprint>, InventoryError> {
            Ok(self.0.get(key).copied())
        }
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn objects(keys: &[&str]) -> Vec<RemoteObject> {
        keys.iter()
            .map(|key| RemoteObject {
                key: (*key).to_string(),
                size: 1,
            })
            .collect()
    }

    #[tokio::test]
    async fn unseen_filenames_are_new() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/1.txt", "hello");

        let scan = scan_dir(dir.path(), "src/").unwrap();
        let inventory = RemoteInventory::from_objects(&[]);
        let lookup = MapLookup(HashMap::new());

        let plan = classify(scan.files, &inventory, &lookup, DiffOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].decision, Decision::New);
        assert!(plan.items[0].fingerprint.is_some());
    }

    #[tokio::test]
    async fn matching_fingerprint_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "report.pdf", "contents");
        let expected = Fingerprint::of_file(&dir.path().join("report.pdf")).unwrap();

        let scan = scan_dir(dir.path(), "docs/").unwrap();
        let inventory = RemoteInventory::from_objects(&objects(&["archive/report.pdf"]));
        let lookup = MapLookup(HashMap::from([(
            "archive/report.pdf".to_string(),
            expected,
        )]));

        let plan = classify(scan.files, &inventory, &lookup, DiffOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.items[0].decision, Decision::Unchanged);
        assert_eq!(plan.to_transfer().count(), 0);
    }

    #[tokio::test]
    async fn differing_fingerprint_is_changed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "report.pdf", "new contents");
        let stale = Fingerprint::from_reader(&mut &b"old contents"[..]).unwrap();

        let scan = scan_dir(dir.path(), "docs/").unwrap();
        let inventory = RemoteInventory::from_objects(&objects(&["archive/report.pdf"]));
        let lookup = MapLookup(HashMap::from([("archive/report.pdf".to_string(), stale)]));

        let plan = classify(scan.files, &inventory, &lookup, DiffOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.items[0].decision, Decision::Changed);
        assert_eq!(plan.to_transfer().count(), 1);
    }

    #[tokio::test]
    async fn missing_stored_fingerprint_forces_reupload() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "legacy.bin", "bytes");

        let scan = scan_dir(dir.path(), "").unwrap();
        // Object exists but was uploaded before fingerprinting existed.
        let inventory = RemoteInventory::from_objects(&objects(&["legacy.bin"]));
        let lookup = MapLookup(HashMap::new());

        let plan = classify(scan.files, &inventory, &lookup, DiffOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.items[0].decision, Decision::Changed);
    }

    #[tokio::test]
    async fn fingerprinting_disabled_trusts_filename_match() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "report.pdf", "whatever");

        let scan = scan_dir(dir.path(), "").unwrap();
        let inventory = RemoteInventory::from_objects(&objects(&["old/report.pdf"]));
        let lookup = MapLookup(HashMap::new());
        let options = DiffOptions {
            fingerprinting: false,
            ..DiffOptions::default()
        };

        let plan = classify(scan.files, &inventory, &lookup, options)
            .await
            .unwrap();

        assert_eq!(plan.items[0].decision, Decision::Unchanged);
        assert!(plan.items[0].fingerprint.is_none());
    }

    #[tokio::test]
    async fn full_key_matching_ignores_filename_collisions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "report.pdf", "contents");

        let scan = scan_dir(dir.path(), "docs/").unwrap();
        // Same filename elsewhere in the bucket, but not at docs/report.pdf.
        let inventory = RemoteInventory::from_objects(&objects(&["archive/report.pdf"]));
        let lookup = MapLookup(HashMap::new());
        let options = DiffOptions {
            match_full_key: true,
            ..DiffOptions::default()
        };

        let plan = classify(scan.files, &inventory, &lookup, options)
            .await
            .unwrap();

        assert_eq!(plan.items[0].decision, Decision::New);
    }

    #[tokio::test]
    async fn second_run_plans_zero_writes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/1.txt", "hello");
        write(dir.path(), "a/2.txt", "world");

        let scan = scan_dir(dir.path(), "src/").unwrap();
        let empty_inventory = RemoteInventory::from_objects(&[]);
        let first = classify(
            scan.files,
            &empty_inventory,
            &MapLookup(HashMap::new()),
            DiffOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(first.to_transfer().count(), 2);

        // Simulate the upload: the bucket now holds every planned key with
        // the computed fingerprint as metadata.
        let uploaded: Vec<RemoteObject> = first
            .to_transfer()
            .map(|item| RemoteObject {
                key: item.file.key.clone(),
                size: item.file.size,
            })
            .collect();
        let stored: HashMap<String, Fingerprint> = first
            .to_transfer()
            .map(|item| (item.file.key.clone(), item.fingerprint.unwrap()))
            .collect();

        let rescan = scan_dir(dir.path(), "src/").unwrap();
        let second = classify(
            rescan.files,
            &RemoteInventory::from_objects(&uploaded),
            &MapLookup(stored),
            DiffOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(second.to_transfer().count(), 0);
        let (_, _, unchanged) = second.counts();
        assert_eq!(unchanged, 2);
    }
}
