//! `delete-all` — remove every object in a bucket (or under a prefix).

use bucket_ops_cli_utils::{Gate, IndicatifProgress, MultiProgress};
use bucket_ops_client::{BucketClient, ClientConfig};
use bucket_ops_transfer::batch::delete_keys;
use bucket_ops_transfer::summary::format_size;

use crate::{Outcome, env, output};

#[derive(clap::Args)]
pub struct DeleteAllArgs {
    /// Target bucket (defaults to `R2_BUCKET`)
    #[arg(long)]
    bucket: Option<String>,

    /// Only delete objects under this key prefix (defaults to `R2_PREFIX`)
    #[arg(long)]
    prefix: Option<String>,

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
    args: DeleteAllArgs,
    multi: &MultiProgress,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let bucket = env::require_bucket(args.bucket)?;
    let prefix = env::prefix_or_env(args.prefix);

    let config = ClientConfig::from_env()?;
    let client = BucketClient::connect(&config);

    let objects = client.list_objects(&bucket, &prefix).await?;
    if objects.is_empty() {
        // Re-running after a full delete is a no-op, not an error.
        println!("No objects found.");
        return Ok(Outcome::Success);
    }

    let keys: Vec<String> = objects.iter().map(|o| o.key.clone()).collect();
    let total_bytes: u64 = objects.iter().map(|o| o.size).sum();

    output::rule();
    println!(
        "This will PERMANENTLY delete {} objects ({}) from '{bucket}'",
        keys.len(),
        format_size(total_bytes)
    );
    if !prefix.is_empty() {
        println!("  scoped to prefix '{prefix}'");
    }
    output::preview(&keys, args.show_all);
    output::rule();

    if args.dry_run {
        println!("[DRY RUN] Would delete {} objects. No changes made.", keys.len());
        return Ok(Outcome::Success);
    }

    let gate = if args.yes { Gate::Assume(true) } else { Gate::Prompt };
    if !gate.confirm_token("DELETE")? {
        println!("Operation cancelled.");
        return Ok(Outcome::Declined);
    }

    let progress = IndicatifProgress::objects_bar(multi, "Deleting");
    let summary = delete_keys(&client, &bucket, &keys, progress.as_ref()).await;
    output::report("Deletion complete", &summary);

    Ok(Outcome::for_summary(&summary))
}
