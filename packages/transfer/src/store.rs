//! Storage seam for the operation executors.
//!
//! Executors take `&dyn ObjectStore` instead of the concrete client so
//! the attribution contracts (per-item results, chunk-level transport
//! failures, copied-but-delete-failed accounting) are testable against
//! an in-memory store.

use std::path::Path;

use async_trait::async_trait;
use bucket_ops_client::{BatchResult, BucketClient, ClientError, RemoteObject};

/// The bucket operations the executors need.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists every object under `prefix` (empty prefix lists the bucket).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::List`] on storage failures.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<RemoteObject>, ClientError>;

    /// Uploads a local file, attaching the content type and optional
    /// fingerprint metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Upload`] on storage failures.
    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
        content_type: &str,
        fingerprint: Option<&str>,
    ) -> Result<(), ClientError>;

    /// Server-side copy of a single object.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Copy`] on storage failures.
    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<(), ClientError>;

    /// Deletes a single object.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Delete`] on storage failures.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ClientError>;

    /// Deletes up to [`bucket_ops_client::MAX_BATCH_KEYS`] keys in one
    /// call, reporting per-item results.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DeleteBatch`] if the call fails as a whole.
    async fn delete_batch(&self, bucket: &str, keys: &[String])
    -> Result<BatchResult, ClientError>;
}

#[async_trait]
impl ObjectStore for BucketClient {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<RemoteObject>, ClientError> {
        Self::list_objects(self, bucket, prefix).await
    }

    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
        content_type: &str,
        fingerprint: Option<&str>,
    ) -> Result<(), ClientError> {
        Self::put_file(self, bucket, key, local_path, content_type, fingerprint).await
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<(), ClientError> {
        Self::copy_object(self, source_bucket, source_key, dest_bucket, dest_key).await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        Self::delete_object(self, bucket, key).await
    }

    async fn delete_batch(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<BatchResult, ClientError> {
        Self::delete_batch(self, bucket, keys).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    use bucket_ops_client::BatchItemError;

    use super::*;

    /// In-memory [`ObjectStore`] with injectable failures.
    #[derive(Default)]
    pub(crate) struct FakeStore {
        objects: Mutex<BTreeMap<String, u64>>,
        /// Keys whose upload fails.
        pub fail_put: HashSet<String>,
        /// Source keys whose copy fails.
        pub fail_copy: HashSet<String>,
        /// Keys whose single-object delete fails.
        pub fail_delete: HashSet<String>,
        /// Keys reported as per-item errors in batch responses.
        pub reject_in_batch: HashSet<String>,
        /// A batch containing this key fails as a whole, like a dropped
        /// connection.
        pub poison_batch_key: Option<String>,
    }

    impl FakeStore {
        pub fn with_objects<I, S>(bucket: &str, entries: I) -> Self
        where
            I: IntoIterator<Item = (S, u64)>,
            S: AsRef<str>,
        {
            let objects = entries
                .into_iter()
                .map(|(key, size)| (locator(bucket, key.as_ref()), size))
                .collect();
            Self {
                objects: Mutex::new(objects),
                ..Self::default()
            }
        }

        pub fn contains(&self, bucket: &str, key: &str) -> bool {
            self.objects
                .lock()
                .unwrap()
                .contains_key(&locator(bucket, key))
        }

        pub fn object_count(&self) -> usize {
            self.objects.lock().unwrap().len()
        }
    }

    fn locator(bucket: &str, key: &str) -> String {
        format!("{bucket}/{key}")
    }

    fn unavailable() -> Box<dyn std::error::Error + Send + Sync> {
        Box::new(std::io::Error::other("connection reset"))
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn list_objects(
            &self,
            bucket: &str,
            prefix: &str,
        ) -> Result<Vec<RemoteObject>, ClientError> {
            let bucket_prefix = format!("{bucket}/");
            Ok(self
                .objects
                .lock()
                .unwrap()
                .iter()
                .filter_map(|(loc, size)| {
                    loc.strip_prefix(&bucket_prefix).and_then(|key| {
                        key.starts_with(prefix).then(|| RemoteObject {
                            key: key.to_string(),
                            size: *size,
                        })
                    })
                })
                .collect())
        }

        async fn put_file(
            &self,
            bucket: &str,
            key: &str,
            local_path: &Path,
            _content_type: &str,
            _fingerprint: Option<&str>,
        ) -> Result<(), ClientError> {
            if self.fail_put.contains(key) {
                return Err(ClientError::Upload {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    source: unavailable(),
                });
            }
            let size = std::fs::metadata(local_path).map(|m| m.len()).unwrap_or(0);
            self.objects
                .lock()
                .unwrap()
                .insert(locator(bucket, key), size);
            Ok(())
        }

        async fn copy_object(
            &self,
            source_bucket: &str,
            source_key: &str,
            dest_bucket: &str,
            dest_key: &str,
        ) -> Result<(), ClientError> {
            if self.fail_copy.contains(source_key) {
                return Err(ClientError::Copy {
                    bucket: dest_bucket.to_string(),
                    key: dest_key.to_string(),
                    source: unavailable(),
                });
            }
            let mut objects = self.objects.lock().unwrap();
            let size = objects
                .get(&locator(source_bucket, source_key))
                .copied()
                .unwrap_or(0);
            objects.insert(locator(dest_bucket, dest_key), size);
            Ok(())
        }

        async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
            if self.fail_delete.contains(key) {
                return Err(ClientError::Delete {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    source: unavailable(),
                });
            }
            self.objects.lock().unwrap().remove(&locator(bucket, key));
            Ok(())
        }

        async fn delete_batch(
            &self,
            bucket: &str,
            keys: &[String],
        ) -> Result<BatchResult, ClientError> {
            if let Some(poison) = &self.poison_batch_key
                && keys.contains(poison)
            {
                return Err(ClientError::DeleteBatch {
                    bucket: bucket.to_string(),
                    source: unavailable(),
                });
            }

            let mut result = BatchResult::default();
            let mut objects = self.objects.lock().unwrap();
            for key in keys {
                if self.reject_in_batch.contains(key) {
                    result.errors.push(BatchItemError {
                        key: key.clone(),
                        message: "AccessDenied: access denied".to_string(),
                    });
                } else {
                    objects.remove(&locator(bucket, key));
                    result.deleted.push(key.clone());
                }
            }
            Ok(result)
        }
    }
}
