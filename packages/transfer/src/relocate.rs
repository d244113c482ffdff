//! Moving prefix "directories" within a bucket.
//!
//! S3 has no rename: a move is a server-side copy followed by a delete
//! of the original. Relative structure under the source prefix is
//! preserved under the destination prefix. Sub-prefixes can be excluded
//! from a move, which also covers reorganizations where the destination
//! is nested under the source (already-relocated objects stay put).

use std::str::FromStr;

use bucket_ops_client::RemoteObject;

use crate::TransferError;
use crate::progress::ProgressSink;
use crate::store::ObjectStore;
use crate::summary::RunSummary;

/// One source→destination prefix mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePair {
    /// Source prefix, normalized to end with `/`.
    pub source: String,
    /// Destination prefix, normalized to end with `/`.
    pub dest: String,
}

impl MovePair {
    /// Creates a pair, appending a trailing `/` to either side when
    /// missing (empty strings stay empty — an empty destination moves
    /// objects to the bucket root).
    #[must_use]
    pub fn new(source: &str, dest: &str) -> Self {
        Self {
            source: ensure_trailing_slash(source),
            dest: ensure_trailing_slash(dest),
        }
    }
}

impl FromStr for MovePair {
    type Err = TransferError;

    /// Parses `SOURCE:DEST`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((source, dest)) if !source.is_empty() => Ok(Self::new(source, dest)),
            _ => Err(TransferError::InvalidMovePair {
                value: s.to_string(),
            }),
        }
    }
}

/// Normalizes a non-empty prefix to end with `/`.
#[must_use]
pub fn ensure_trailing_slash(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}

/// One object move, planned but not yet executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// Existing key.
    pub source_key: String,
    /// Key it will live under after the move.
    pub dest_key: String,
    /// Object size in bytes.
    pub size: u64,
}

/// Maps every listed object under the pair's source prefix to its
/// destination key, preserving relative structure. Objects under any of
/// the `excludes` prefixes are left in place.
#[must_use]
pub fn plan_moves(
    objects: &[RemoteObject],
    pair: &MovePair,
    excludes: &[String],
) -> Vec<PlannedMove> {
    objects
        .iter()
        .filter_map(|object| {
            if excludes.iter().any(|ex| object.key.starts_with(ex.as_str())) {
                return None;
            }
            object.key.strip_prefix(&pair.source).map(|rel| PlannedMove {
                source_key: object.key.clone(),
                dest_key: format!("{}{rel}", pair.dest),
                size: object.size,
            })
        })
        .collect()
}

/// Executes planned moves: copy then delete, per object, sequentially.
///
/// A failed copy leaves the source untouched and is recorded; a failed
/// delete after a successful copy is also recorded (the object then
/// exists at both keys until the command is re-run).
pub async fn execute_moves(
    store: &dyn ObjectStore,
    bucket: &str,
    moves: &[PlannedMove],
    progress: &dyn ProgressSink,
) -> RunSummary {
    let mut summary = RunSummary::default();
    progress.set_total(moves.len() as u64);

    for planned in moves {
        log::info!("Moving {} -> {}", planned.source_key, planned.dest_key);

        match store
            .copy_object(bucket, &planned.source_key, bucket, &planned.dest_key)
            .await
        {
            Ok(()) => match store.delete_object(bucket, &planned.source_key).await {
                Ok(()) => summary.record_success(planned.size),
                Err(e) => summary.record_failure(
                    planned.source_key.clone(),
                    format!("copied, but source delete failed: {e}"),
                ),
            },
            Err(e) => summary.record_failure(planned.source_key.clone(), e.to_string()),
        }

        progress.inc(1);
    }

    progress.finish(format!("moved {} objects", summary.succeeded));
    summary
}
