//! Batch deletion, bounded by the API's per-call key limit.

use bucket_ops_client::MAX_BATCH_KEYS;

use crate::progress::ProgressSink;
use crate::store::ObjectStore;
use crate::summary::RunSummary;

/// Partitions a key list into chunks no larger than [`MAX_BATCH_KEYS`],
/// preserving order. Each chunk becomes exactly one `DeleteObjects` call.
#[must_use]
pub fn partition_keys(keys: &[String]) -> Vec<&[String]> {
    keys.chunks(MAX_BATCH_KEYS).collect()
}

/// Deletes `keys` in order, one API call per chunk.
///
/// Per-item results from each response are attributed individually; a
/// transport failure on a chunk marks every key in that chunk failed.
/// Either way, processing continues with the next chunk — failures end
/// up in the summary, not in an early return.
pub async fn delete_keys(
    store: &dyn ObjectStore,
    bucket: &str,
    keys: &[String],
    progress: &dyn ProgressSink,
) -> RunSummary {
    let mut summary = RunSummary::default();
    progress.set_total(keys.len() as u64);

    for (index, chunk) in partition_keys(keys).into_iter().enumerate() {
        match store.delete_batch(bucket, chunk).await {
            Ok(result) => {
                log::info!(
                    "  batch {}: deleted {} objects",
                    index + 1,
                    result.deleted.len()
                );
                summary.succeeded += result.deleted.len() as u64;
                for error in result.errors {
                    summary.record_failure(error.key, error.message);
                }
            }
            Err(e) => {
                log::warn!("  batch {} failed outright: {e}", index + 1);
                let message = e.to_string();
                for key in chunk {
                    summary.record_failure(key.clone(), message.clone());
                }
            }
        }
        progress.inc(chunk.len() as u64);
    }

    progress.finish(format!("deleted {} objects", summary.succeeded));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::store::testing::FakeStore;

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("key-{i:04}")).collect()
    }

    #[test]
    fn partitions_2500_keys_into_three_batches() {
        let keys = keys(2500);
        let chunks = partition_keys(&keys);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![1000, 1000, 500]);
    }

    #[test]
    fn exact_multiple_has_no_runt_batch() {
        let keys = keys(2000);
        let sizes: Vec<usize> = partition_keys(&keys).iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![1000, 1000]);
    }

    #[test]
    fn empty_key_list_yields_no_batches() {
        assert!(partition_keys(&[]).is_empty());
    }

    #[test]
    fn partitioning_preserves_order() {
        let keys = keys(1001);
        let chunks = partition_keys(&keys);
        assert_eq!(chunks[0][0], "key-0000");
        assert_eq!(chunks[1][0], "key-1000");
    }

    #[tokio::test]
    async fn per_item_errors_are_attributed_from_the_response() {
        let mut store =
            FakeStore::with_objects("bucket", [("a", 1u64), ("b", 2), ("c", 3)]);
        store.reject_in_batch.insert("b".to_string());

        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let summary = delete_keys(&store, "bucket", &keys, &NoProgress).await;

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures()[0].item, "b");
        // The rejected object survives; the others are gone.
        assert!(store.contains("bucket", "b"));
        assert!(!store.contains("bucket", "a"));
        assert!(!store.contains("bucket", "c"));
    }

    #[tokio::test]
    async fn transport_failure_fails_the_whole_chunk_and_continues() {
        let names = keys(1200);
        let mut store = FakeStore::with_objects(
            "bucket",
            names.iter().map(|name| (name.as_str(), 1u64)),
        );
        // The first chunk of 1000 contains this key and fails outright.
        store.poison_batch_key = Some("key-0000".to_string());

        let summary = delete_keys(&store, "bucket", &names, &NoProgress).await;

        assert_eq!(summary.failed, 1000);
        assert_eq!(summary.succeeded, 200);
        assert_eq!(store.object_count(), 1000);
    }

    #[tokio::test]
    async fn second_delete_run_deletes_nothing() {
        let store = FakeStore::with_objects("bucket", [("x", 1u64), ("y", 2)]);

        let listed = store.list_objects("bucket", "").await.unwrap();
        let keys: Vec<String> = listed.iter().map(|o| o.key.clone()).collect();
        let first = delete_keys(&store, "bucket", &keys, &NoProgress).await;
        assert_eq!(first.succeeded, 2);

        let relisted = store.list_objects("bucket", "").await.unwrap();
        assert!(relisted.is_empty());
        let keys: Vec<String> = relisted.iter().map(|o| o.key.clone()).collect();
        let second = delete_keys(&store, "bucket", &keys, &NoProgress).await;
        assert_eq!(second.succeeded, 0);
        assert!(!second.has_failures());
    }
}
