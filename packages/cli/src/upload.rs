//! `upload` — incremental directory upload with duplicate detection.

use std::path::PathBuf;

use bucket_ops_cli_utils::{Gate, IndicatifProgress, MultiProgress};
use bucket_ops_client::{BucketClient, ClientConfig};
use bucket_ops_inventory::diff::{BucketFingerprints, DiffOptions, TransferPlan, classify};
use bucket_ops_inventory::local::{join_key, scan_dir};
use bucket_ops_inventory::remote::RemoteInventory;
use bucket_ops_transfer::summary::{RunSummary, format_size};
use bucket_ops_transfer::upload::execute_upload;

use crate::{Outcome, env, output};

#[derive(clap::Args)]
pub struct UploadArgs {
    /// Local directory to upload (defaults to `R2_SOURCE_DIR`)
    #[arg(long)]
    source: Option<PathBuf>,

    /// Target bucket (defaults to `R2_BUCKET`)
    #[arg(long)]
    bucket: Option<String>,

    /// Destination key prefix (defaults to `R2_PREFIX`)
    #[arg(long)]
    prefix: Option<String>,

    /// Append the source directory's own name to the destination prefix
    #[arg(long)]
    include_root_dir: bool,

    /// Trust filename matches without comparing content fingerprints
    #[arg(long)]
    no_fingerprint: bool,

    /// Match existing objects by full key instead of base filename
    #[arg(long)]
    match_full_key: bool,

    /// Plan and preview only; upload nothing
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
}

pub async fn run(
    args: UploadArgs,
    multi: &MultiProgress,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let bucket = env::require_bucket(args.bucket)?;
    let source = args
        .source
        .or_else(|| env::var("R2_SOURCE_DIR").map(PathBuf::from))
        .ok_or("source directory not set (pass --source or set R2_SOURCE_DIR)")?;

    let mut prefix = env::prefix_or_env(args.prefix);
    if args.include_root_dir
        && let Some(name) = source.file_name()
    {
        prefix = join_key(&prefix, &name.to_string_lossy());
    }

    let config = ClientConfig::from_env()?;
    let client = BucketClient::connect(&config);

    let scan = scan_dir(&source, &prefix)?;
    log::info!(
        "Scanned {} local files under {} ({} skipped)",
        scan.files.len(),
        source.display(),
        scan.skipped
    );

    let inventory = RemoteInventory::scan(&client, &bucket, &prefix).await?;
    log::info!("Bucket '{bucket}' holds {} objects under '{prefix}'", inventory.len());

    let options = DiffOptions {
        fingerprinting: !args.no_fingerprint,
        match_full_key: args.match_full_key,
    };
    let lookup = BucketFingerprints {
        client: &client,
        bucket: &bucket,
    };
    let mut plan = classify(scan.files, &inventory, &lookup, options).await?;
    plan.failures.extend(scan.failures);

    let (new, changed, unchanged) = plan.counts();
    let to_transfer = plan.to_transfer().count();

    output::rule();
    println!("Upload to s3://{bucket}/{prefix}");
    println!("  {new} new, {changed} changed, {unchanged} unchanged");
    println!(
        "  {to_transfer} files to upload ({})",
        format_size(plan.transfer_bytes())
    );
    output::rule();

    if to_transfer == 0 {
        return Ok(finish_without_transfer(&plan));
    }

    if args.dry_run {
        println!("[DRY RUN] Would upload {to_transfer} files. No changes made.");
        return Ok(Outcome::Success);
    }

    let gate = if args.yes { Gate::Assume(true) } else { Gate::Prompt };
    if !gate.confirm_token("yes")? {
        println!("Operation cancelled.");
        return Ok(Outcome::Declined);
    }

    let progress = IndicatifProgress::objects_bar(multi, "Uploading");
    let summary = execute_upload(&client, &bucket, &plan, progress.as_ref()).await;
    output::report("Upload complete", &summary);

    Ok(Outcome::for_summary(&summary))
}

/// Ends a run that has nothing transferable without prompting. Scan and
/// hash failures still surface in the report and the exit code.
fn finish_without_transfer(plan: &TransferPlan) -> Outcome {
    if plan.failures.is_empty() {
        println!("Nothing to upload.");
        return Outcome::Success;
    }

    let mut summary = RunSummary::default();
    summary.skipped = plan.items.len() as u64;
    for failure in &plan.failures {
        summary.record_failure(failure.path.display().to_string(), failure.message.clone());
    }
    output::report("Upload complete", &summary);
    Outcome::PartialFailure
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bucket_ops_inventory::local::ScanFailure;

    use super::*;

    #[test]
    fn no_transferable_files_without_failures_succeeds() {
        let plan = TransferPlan::default();
        assert_eq!(finish_without_transfer(&plan), Outcome::Success);
    }

    #[test]
    fn scan_failures_alone_report_partial_failure() {
        let plan = TransferPlan {
            items: Vec::new(),
            failures: vec![ScanFailure {
                path: PathBuf::from("broken.txt"),
                message: "permission denied".to_string(),
            }],
        };
        assert_eq!(finish_without_transfer(&plan), Outcome::PartialFailure);
    }
}
