//! Upload executor.

use bucket_ops_inventory::diff::{Decision, TransferPlan};

use crate::progress::ProgressSink;
use crate::store::ObjectStore;
use crate::summary::RunSummary;

/// Executes a transfer plan against the bucket.
///
/// `Unchanged` files are skipped; `New` and `Changed` files are uploaded
/// with their content type inferred from the file extension and the
/// computed fingerprint attached as object metadata. Per-file failures
/// (including the plan's scan/hash failures) are folded into the summary
/// and never abort the run.
pub async fn execute_upload(
    store: &dyn ObjectStore,
    bucket: &str,
    plan: &TransferPlan,
    progress: &dyn ProgressSink,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for failure in &plan.failures {
        summary.record_failure(failure.path.display().to_string(), failure.message.clone());
    }

    progress.set_total(plan.items.len() as u64);

    for item in &plan.items {
        if item.decision == Decision::Unchanged {
            log::debug!("  {}: skipped (unchanged)", item.file.key);
            summary.record_skip();
            progress.inc(1);
            continue;
        }

        let content_type = mime_guess::from_path(&item.file.path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let fingerprint = item.fingerprint.map(|fp| fp.to_string());

        log::info!(
            "Uploading {} -> s3://{bucket}/{}",
            item.file.path.display(),
            item.file.key
        );

        match store
            .put_file(
                bucket,
                &item.file.key,
                &item.file.path,
                &content_type,
                fingerprint.as_deref(),
            )
            .await
        {
            Ok(()) => summary.record_success(item.file.size),
            Err(e) => summary.record_failure(item.file.key.clone(), e.to_string()),
        }

        progress.inc(1);
    }

    progress.finish(format!("uploaded {} files", summary.succeeded));
    summary
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use bucket_ops_inventory::diff::PlannedFile;
    use bucket_ops_inventory::local::{LocalFile, ScanFailure};

    use super::*;
    use crate::progress::NoProgress;
    use crate::store::testing::FakeStore;

    fn planned(dir: &Path, name: &str, content: &str, decision: Decision) -> PlannedFile {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        PlannedFile {
            file: LocalFile {
                path,
                key: name.to_string(),
                size: content.len() as u64,
            },
            decision,
            fingerprint: None,
        }
    }

    #[tokio::test]
    async fn unchanged_files_are_skipped_and_scan_failures_folded() {
        let dir = tempfile::tempdir().unwrap();
        let plan = TransferPlan {
            items: vec![
                planned(dir.path(), "a.txt", "hello", Decision::New),
                planned(dir.path(), "b.txt", "world", Decision::Unchanged),
            ],
            failures: vec![ScanFailure {
                path: PathBuf::from("c.txt"),
                message: "permission denied".to_string(),
            }],
        };
        let store = FakeStore::default();

        let summary = execute_upload(&store, "bucket", &plan, &NoProgress).await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert!(store.contains("bucket", "a.txt"));
        assert!(!store.contains("bucket", "b.txt"));
    }

    #[tokio::test]
    async fn put_failure_is_recorded_and_the_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        let plan = TransferPlan {
            items: vec![
                planned(dir.path(), "first.bin", "1", Decision::New),
                planned(dir.path(), "second.bin", "2", Decision::Changed),
            ],
            failures: Vec::new(),
        };
        let mut store = FakeStore::default();
        store.fail_put.insert("first.bin".to_string());

        let summary = execute_upload(&store, "bucket", &plan, &NoProgress).await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures()[0].item, "first.bin");
        assert!(store.contains("bucket", "second.bin"));
        assert!(!store.contains("bucket", "first.bin"));
    }
}
