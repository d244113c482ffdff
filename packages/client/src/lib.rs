#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! S3-compatible storage client for the bucket-ops tools.
//!
//! Wraps `aws-sdk-s3` with the handful of operations the command drivers
//! need: paginated listing, object metadata lookup, upload with user
//! metadata, server-side copy, and batch delete with per-item results.
//!
//! The client is constructed once per invocation from [`ClientConfig`] and
//! passed down to every component that talks to the bucket — there is no
//! process-wide singleton.
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |---|---|---|
//! | `R2_ACCOUNT_ID` | Yes* | Cloudflare account ID (builds the R2 endpoint) |
//! | `R2_ACCESS_KEY_ID` | Yes | S3-compatible access key |
//! | `R2_SECRET_ACCESS_KEY` | Yes | S3-compatible secret key |
//! | `R2_ENDPOINT_URL` | No | Explicit endpoint; overrides `R2_ACCOUNT_ID` |
//!
//! \* not required when `R2_ENDPOINT_URL` is set.

mod config;

pub use config::ClientConfig;

use std::path::Path;

use aws_config::Region;
use aws_sdk_s3::config::{Credentials, StalledStreamProtectionConfig};
use aws_sdk_s3::types::{Delete, ObjectIdentifier};

/// Hard ceiling on keys per `DeleteObjects` call (S3 API limit).
///
/// Never exceeded, and never assumed higher for any provider.
pub const MAX_BATCH_KEYS: usize = 1000;

/// User-metadata key under which the content fingerprint is stored on
/// uploaded objects.
pub const FINGERPRINT_METADATA_KEY: &str = "fingerprint";

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Missing required environment variable.
    #[error("Missing environment variable: {name}")]
    MissingEnv {
        /// Name of the missing environment variable.
        name: String,
    },

    /// Configuration was present but invalid.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what was wrong.
        message: String,
    },

    /// S3 `ListObjectsV2` failed.
    #[error("Failed to list s3://{bucket}/{prefix}: {source}")]
    List {
        /// Bucket name.
        bucket: String,
        /// Key prefix.
        prefix: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// S3 `HeadObject` failed.
    #[error("Failed to head s3://{bucket}/{key}: {source}")]
    Head {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// S3 `PutObject` failed.
    #[error("Failed to upload s3://{bucket}/{key}: {source}")]
    Upload {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// S3 `CopyObject` failed.
    #[error("Failed to copy to s3://{bucket}/{key}: {source}")]
    Copy {
        /// Destination bucket name.
        bucket: String,
        /// Destination object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// S3 `DeleteObject` failed.
    #[error("Failed to delete s3://{bucket}/{key}: {source}")]
    Delete {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// S3 `DeleteObjects` (batch) failed as a whole.
    #[error("Batch delete against s3://{bucket} failed: {source}")]
    DeleteBatch {
        /// Bucket name.
        bucket: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// S3 `DeleteBucket` failed.
    #[error("Failed to delete bucket {bucket}: {source}")]
    DeleteBucket {
        /// Bucket name.
        bucket: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// I/O error reading local files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single object as returned by a bucket listing.
#[derive(Debug, Clone)]
pub struct RemoteObject {
    /// Full object key within the bucket.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
}

/// Object metadata from `HeadObject`.
#[derive(Debug, Clone)]
pub struct ObjectMeta {
    /// Content length in bytes.
    pub size: u64,
    /// Stored content fingerprint, if the object was uploaded by a
    /// fingerprint-aware run. Objects uploaded before fingerprinting was
    /// introduced carry no such metadata.
    pub fingerprint: Option<String>,
}

/// Per-item failure within a batch delete response.
#[derive(Debug, Clone)]
pub struct BatchItemError {
    /// Key that failed to delete.
    pub key: String,
    /// Error code and message reported by the API.
    pub message: String,
}

/// Outcome of a single batch delete call, attributed per item.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Keys confirmed deleted.
    pub deleted: Vec<String>,
    /// Keys the API reported an error for.
    pub errors: Vec<BatchItemError>,
}

/// Client handle for an S3-compatible storage service.
pub struct BucketClient {
    client: aws_sdk_s3::Client,
}

impl BucketClient {
    /// Creates a client from a validated [`ClientConfig`].
    #[must_use]
    pub fn connect(config: &ClientConfig) -> Self {
        let creds = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "bucket-ops",
        );

        let sdk_config = aws_sdk_s3::Config::builder()
            .endpoint_url(&config.endpoint)
            .region(Region::new("auto"))
            .credentials_provider(creds)
            .force_path_style(true)
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(sdk_config),
        }
    }

    /// Lists every object under `prefix`, transparently following
    /// continuation tokens until the listing is exhausted.
    ///
    /// An empty `prefix` lists the entire bucket.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::List`] on S3 failures.
    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<RemoteObject>, ClientError> {
        log::info!("Listing s3://{bucket}/{prefix}*");

        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket);

            if !prefix.is_empty() {
                request = request.prefix(prefix);
            }
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let output = request.send().await.map_err(|e| ClientError::List {
                bucket: bucket.to_string(),
                prefix: prefix.to_string(),
                source: Box::new(e),
            })?;

            for obj in output.contents() {
                if let Some(key) = obj.key() {
                    #[allow(clippy::cast_sign_loss)] // S3 sizes are non-negative
                    let size = obj.size().unwrap_or(0) as u64;
                    objects.push(RemoteObject {
                        key: key.to_string(),
                        size,
                    });
                }
            }

            if output.is_truncated() == Some(true) {
                continuation_token = output.next_continuation_token().map(String::from);
            } else {
                break;
            }
        }

        log::info!("  found {} objects", objects.len());
        Ok(objects)
    }

    /// Fetches object metadata via `HeadObject`.
    ///
    /// Returns `None` if the object doesn't exist (`NotFound`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Head`] on S3 failures other than `NotFound`.
    pub async fn head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectMeta>, ClientError> {
        let result = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let size = output.content_length().unwrap_or(0);
                #[allow(clippy::cast_sign_loss)] // S3 content-length is non-negative
                let size = size as u64;
                let fingerprint = output
                    .metadata()
                    .and_then(|m| m.get(FINGERPRINT_METADATA_KEY))
                    .cloned();
                Ok(Some(ObjectMeta { size, fingerprint }))
            }
            Err(err) => {
                // NotFound is not an error — the object doesn't exist
                let service_err = err.as_service_error();
                if service_err
                    .is_some_and(aws_sdk_s3::operation::head_object::HeadObjectError::is_not_found)
                {
                    return Ok(None);
                }
                Err(ClientError::Head {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    source: Box::new(err),
                })
            }
        }
    }

    /// Uploads a local file to the bucket.
    ///
    /// The fingerprint, when given, is attached as user metadata under
    /// [`FINGERPRINT_METADATA_KEY`] so later runs can compare content
    /// without re-downloading it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Upload`] on S3 failures, [`ClientError::Io`]
    /// if the local file cannot be read.
    pub async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
        content_type: &str,
        fingerprint: Option<&str>,
    ) -> Result<(), ClientError> {
        let body = aws_sdk_s3::primitives::ByteStream::from_path(local_path)
            .await
            .map_err(|e| ClientError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: Box::new(e),
            })?;

        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type);

        if let Some(fp) = fingerprint {
            request = request.metadata(FINGERPRINT_METADATA_KEY, fp);
        }

        request.send().await.map_err(|e| ClientError::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source: Box::new(e),
        })?;

        Ok(())
    }

    /// Server-side copy of a single object. No bytes pass through the
    /// client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Copy`] on S3 failures.
    pub async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<(), ClientError> {
        let copy_source = format!("{source_bucket}/{source_key}");

        self.client
            .copy_object()
            .copy_source(copy_source)
            .bucket(dest_bucket)
            .key(dest_key)
            .send()
            .await
            .map_err(|e| ClientError::Copy {
                bucket: dest_bucket.to_string(),
                key: dest_key.to_string(),
                source: Box::new(e),
            })?;

        Ok(())
    }

    /// Deletes a single object.
    ///
    /// Silently succeeds if the object doesn't exist (S3 `DeleteObject`
    /// is idempotent).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Delete`] on S3 failures.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ClientError::Delete {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: Box::new(e),
            })?;

        Ok(())
    }

    /// Deletes up to [`MAX_BATCH_KEYS`] keys in a single `DeleteObjects`
    /// call, reporting success/failure per item.
    ///
    /// Callers are responsible for partitioning larger key lists; passing
    /// more than [`MAX_BATCH_KEYS`] keys is a caller bug.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DeleteBatch`] if the call fails as a whole
    /// (e.g., a transport error). Per-item failures are reported in the
    /// returned [`BatchResult`], not as an `Err`.
    ///
    /// # Panics
    ///
    /// Debug builds assert that `keys.len() <= MAX_BATCH_KEYS`.
    pub async fn delete_batch(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<BatchResult, ClientError> {
        debug_assert!(keys.len() <= MAX_BATCH_KEYS);

        let identifiers = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ClientError::DeleteBatch {
                bucket: bucket.to_string(),
                source: Box::new(e),
            })?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(false)
            .build()
            .map_err(|e| ClientError::DeleteBatch {
                bucket: bucket.to_string(),
                source: Box::new(e),
            })?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| ClientError::DeleteBatch {
                bucket: bucket.to_string(),
                source: Box::new(e),
            })?;

        let mut result = BatchResult::default();

        for deleted in output.deleted() {
            if let Some(key) = deleted.key() {
                result.deleted.push(key.to_string());
            }
        }

        for error in output.errors() {
            result.errors.push(BatchItemError {
                key: error.key().unwrap_or_default().to_string(),
                message: format!(
                    "{}: {}",
                    error.code().unwrap_or("Unknown"),
                    error.message().unwrap_or_default()
                ),
            });
        }

        Ok(result)
    }

    /// Deletes the bucket itself. The bucket must already be empty.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DeleteBucket`] on S3 failures (including
    /// `BucketNotEmpty`).
    pub async fn delete_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        log::info!("Deleting bucket {bucket}");

        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| ClientError::DeleteBucket {
                bucket: bucket.to_string(),
                source: Box::new(e),
            })?;

        Ok(())
    }
}
