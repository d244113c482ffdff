//! Remote bucket inventory.
//!
//! Built from a single (paginated) listing pass. Stored fingerprints are
//! NOT fetched here — one `HeadObject` per object would defeat the point
//! of cheap change detection. The differ fetches them lazily, only for
//! filename matches, through [`crate::diff::FingerprintLookup`].

use std::collections::{HashMap, HashSet};

use bucket_ops_client::{BucketClient, RemoteObject};

use crate::InventoryError;

/// What already exists in the bucket, keyed for duplicate lookup.
///
/// Known limitation: matching is by **base filename**. When two keys
/// share a base filename, the one listed later wins — an accepted
/// consequence of filename-only matching, not a guaranteed policy.
/// Callers that need exact semantics match on the full key instead.
#[derive(Debug, Default)]
pub struct RemoteInventory {
    /// Base filename → most recently listed full key.
    by_filename: HashMap<String, String>,
    /// Every full key seen in the listing.
    full_keys: HashSet<String>,
    /// Number of objects listed.
    object_count: usize,
    /// Sum of object sizes.
    total_bytes: u64,
}

impl RemoteInventory {
    /// Builds an inventory from already-listed objects, in listing order.
    #[must_use]
    pub fn from_objects(objects: &[RemoteObject]) -> Self {
        let mut inventory = Self::default();
        for object in objects {
            let filename = base_filename(&object.key);
            inventory
                .by_filename
                .insert(filename.to_string(), object.key.clone());
            inventory.full_keys.insert(object.key.clone());
            inventory.object_count += 1;
            inventory.total_bytes += object.size;
        }
        inventory
    }

    /// Lists the bucket (under `prefix`) and builds the inventory.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Client`] if the listing fails.
    pub async fn scan(
        client: &BucketClient,
        bucket: &str,
        prefix: &str,
    ) -> Result<Self, InventoryError> {
        let objects = client.list_objects(bucket, prefix).await?;
        Ok(Self::from_objects(&objects))
    }

    /// Looks up the existing key for a base filename, if any.
    #[must_use]
    pub fn match_filename(&self, filename: &str) -> Option<&str> {
        self.by_filename.get(filename).map(String::as_str)
    }

    /// Whether an object with exactly this key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.full_keys.contains(key)
    }

    /// Number of objects in the inventory.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.object_count
    }

    /// Whether the inventory is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.object_count == 0
    }

    /// Sum of listed object sizes in bytes.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}

/// Base filename of a key (the segment after the last `/`).
#[must_use]
pub fn base_filename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
