//! Bucket-to-bucket migration via server-side copy.

use bucket_ops_client::RemoteObject;

use crate::TransferError;
use crate::progress::ProgressSink;
use crate::store::ObjectStore;
use crate::summary::RunSummary;

/// Validated migration parameters.
#[derive(Debug, Clone)]
pub struct MigrateSpec {
    /// Bucket to copy from.
    pub source_bucket: String,
    /// Bucket to copy into.
    pub dest_bucket: String,
    /// Optional key prefix limiting which objects migrate.
    pub prefix: String,
    /// Delete each source object after its successful copy.
    pub delete_source: bool,
}

impl MigrateSpec {
    /// Validates the bucket pair.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidMigration`] if either bucket is
    /// missing or if source and destination are the same bucket.
    pub fn validated(
        source_bucket: String,
        dest_bucket: String,
        prefix: String,
        delete_source: bool,
    ) -> Result<Self, TransferError> {
        if source_bucket.is_empty() || dest_bucket.is_empty() {
            return Err(TransferError::InvalidMigration {
                message: "source and destination buckets must both be set".to_string(),
            });
        }
        if source_bucket == dest_bucket {
            return Err(TransferError::InvalidMigration {
                message: "source and destination buckets cannot be the same".to_string(),
            });
        }

        Ok(Self {
            source_bucket,
            dest_bucket,
            prefix,
            delete_source,
        })
    }
}

/// Copies every listed object to the destination bucket under the same
/// key, optionally deleting each source object after its copy succeeds.
///
/// Per-object failures are recorded and the migration continues; a copy
/// failure leaves that source object in place.
pub async fn execute_migrate(
    store: &dyn ObjectStore,
    spec: &MigrateSpec,
    objects: &[RemoteObject],
    progress: &dyn ProgressSink,
) -> RunSummary {
    let mut summary = RunSummary::default();
    progress.set_total(objects.len() as u64);

    for object in objects {
        log::info!(
            "Copying s3://{}/{} -> s3://{}/{}",
            spec.source_bucket,
            object.key,
            spec.dest_bucket,
            object.key
        );

        match store
            .copy_object(
                &spec.source_bucket,
                &object.key,
                &spec.dest_bucket,
                &object.key,
            )
            .await
        {
            Ok(()) => {
                if spec.delete_source {
                    if let Err(e) = store.delete_object(&spec.source_bucket, &object.key).await {
                        summary.record_failure(
                            object.key.clone(),
                            format!("copied, but source delete failed: {e}"),
                        );
                        progress.inc(1);
                        continue;
                    }
                }
                summary.record_success(object.size);
            }
            Err(e) => summary.record_failure(object.key.clone(), e.to_string()),
        }

        progress.inc(1);
    }

    progress.finish(format!("migrated {} objects", summary.succeeded));
    summary
}
