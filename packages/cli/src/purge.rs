//! `purge` — targeted deletion by folder, extension, or filename
//! pattern, plus deletion of the (emptied) bucket itself.

use bucket_ops_cli_utils::{Gate, IndicatifProgress, MultiProgress};
use bucket_ops_client::{BucketClient, ClientConfig};
use bucket_ops_transfer::batch::delete_keys;
use bucket_ops_transfer::filter::MatchSpec;
use bucket_ops_transfer::summary::format_size;

use crate::{Outcome, env, output};

#[derive(clap::Args)]
pub struct PurgeArgs {
    /// Only consider keys under this folder path
    #[arg(long)]
    folder: Option<String>,

    /// Comma-separated extension suffixes to delete (e.g. '.tmp,.bak')
    #[arg(long)]
    extensions: Option<String>,

    /// Comma-separated filename patterns; '*' and '?' wildcards, plain
    /// text matches as a substring
    #[arg(long)]
    patterns: Option<String>,

    /// Delete the bucket itself (it must already be empty)
    #[arg(long)]
    delete_bucket: bool,

    /// Target bucket (defaults to `R2_BUCKET`)
    #[arg(long)]
    bucket: Option<String>,

    /// List every affected object instead of the first few
    #[arg(long)]
    show_all: bool,

    /// Preview only; delete nothing
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
}

pub async fn run(
    args: PurgeArgs,
    multi: &MultiProgress,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let bucket = env::require_bucket(args.bucket)?;
    let config = ClientConfig::from_env()?;
    let client = BucketClient::connect(&config);

    if args.delete_bucket {
        return delete_bucket(&client, &bucket, args.dry_run, args.yes).await;
    }

    let extensions = env::parse_list(args.extensions.as_deref());
    let patterns = env::parse_list(args.patterns.as_deref());
    let spec = MatchSpec::new(args.folder.as_deref(), &extensions, &patterns)?;
    if spec.is_empty() {
        return Err("nothing selected: pass --folder, --extensions, or --patterns \
             (or --delete-bucket)"
            .into());
    }

    // The folder scope doubles as the listing prefix, so unscoped
    // filters still require a full-bucket listing.
    let objects = client
        .list_objects(&bucket, spec.folder().unwrap_or(""))
        .await?;
    let selected = spec.select(&objects);
    if selected.is_empty() {
        println!("No matching objects found.");
        return Ok(Outcome::Success);
    }

    let total_bytes: u64 = selected.iter().map(|(object, _)| object.size).sum();
    let lines: Vec<String> = selected
        .iter()
        .map(|(object, reason)| format!("{} ({reason})", object.key))
        .collect();

    output::rule();
    println!(
        "This will PERMANENTLY delete {} objects ({}) from '{bucket}'",
        selected.len(),
        format_size(total_bytes)
    );
    output::preview(&lines, args.show_all);
    output::rule();

    if args.dry_run {
        println!(
            "[DRY RUN] Would delete {} objects. No changes made.",
            selected.len()
        );
        return Ok(Outcome::Success);
    }

    let gate = if args.yes { Gate::Assume(true) } else { Gate::Prompt };
    if !gate.confirm_token("DELETE")? {
        println!("Operation cancelled.");
        return Ok(Outcome::Declined);
    }

    let keys: Vec<String> = selected
        .iter()
        .map(|(object, _)| object.key.clone())
        .collect();
    let progress = IndicatifProgress::objects_bar(multi, "Purging");
    let summary = delete_keys(&client, &bucket, &keys, progress.as_ref()).await;
    output::report("Purge complete", &summary);

    Ok(Outcome::for_summary(&summary))
}

/// Deletes the bucket itself. The storage API refuses unless the bucket
/// is empty, so this is gated behind its own token that names the
/// bucket explicitly.
async fn delete_bucket(
    client: &BucketClient,
    bucket: &str,
    dry_run: bool,
    yes: bool,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    output::rule();
    println!("This will delete the bucket '{bucket}' itself.");
    println!("The bucket must be empty (run delete-all first).");
    output::rule();

    if dry_run {
        println!("[DRY RUN] Would delete bucket '{bucket}'. No changes made.");
        return Ok(Outcome::Success);
    }

    let gate = if yes { Gate::Assume(true) } else { Gate::Prompt };
    if !gate.confirm_token(&format!("DELETE {bucket}"))? {
        println!("Operation cancelled.");
        return Ok(Outcome::Declined);
    }

    client.delete_bucket(bucket).await?;
    println!("Bucket '{bucket}' deleted.");
    Ok(Outcome::Success)
}
