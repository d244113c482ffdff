//! `migrate` — server-side copy of a bucket's objects into another
//! bucket, preserving keys.

use bucket_ops_cli_utils::{Gate, IndicatifProgress, MultiProgress};
use bucket_ops_client::{BucketClient, ClientConfig};
use bucket_ops_transfer::migrate::{MigrateSpec, execute_migrate};
use bucket_ops_transfer::summary::format_size;

use crate::{Outcome, env, output};

#[derive(clap::Args)]
pub struct MigrateArgs {
    /// Bucket to copy from (defaults to `MIGRATE_SOURCE_BUCKET`)
    #[arg(long)]
    source_bucket: Option<String>,

    /// Bucket to copy into (defaults to `MIGRATE_DEST_BUCKET`)
    #[arg(long)]
    dest_bucket: Option<String>,

    /// Only migrate keys under this prefix (defaults to `MIGRATE_PREFIX`)
    #[arg(long)]
    prefix: Option<String>,

    /// Delete each source object after its successful copy
    /// (or set `MIGRATE_DELETE_SOURCE=true`)
    #[arg(long)]
    delete_source: bool,

    /// List every affected object instead of the first few
    #[arg(long)]
    show_all: bool,

    /// Preview only; copy nothing
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
}

pub async fn run(
    args: MigrateArgs,
    multi: &MultiProgress,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let spec = MigrateSpec::validated(
        args.source_bucket
            .or_else(|| env::var("MIGRATE_SOURCE_BUCKET"))
            .unwrap_or_default(),
        args.dest_bucket
            .or_else(|| env::var("MIGRATE_DEST_BUCKET"))
            .unwrap_or_default(),
        args.prefix
            .or_else(|| env::var("MIGRATE_PREFIX"))
            .unwrap_or_default(),
        args.delete_source || env::bool_var("MIGRATE_DELETE_SOURCE"),
    )?;

    let config = ClientConfig::from_env()?;
    let client = BucketClient::connect(&config);

    let objects = client.list_objects(&spec.source_bucket, &spec.prefix).await?;
    if objects.is_empty() {
        println!("No objects found in source bucket.");
        return Ok(Outcome::Success);
    }

    let total_bytes: u64 = objects.iter().map(|o| o.size).sum();
    let keys: Vec<String> = objects.iter().map(|o| o.key.clone()).collect();
    let mode = if spec.delete_source { "MOVE" } else { "COPY" };

    output::rule();
    println!(
        "This will {mode} {} objects ({}) from '{}' to '{}'",
        objects.len(),
        format_size(total_bytes),
        spec.source_bucket,
        spec.dest_bucket
    );
    if !spec.prefix.is_empty() {
        println!("  scoped to prefix '{}'", spec.prefix);
    }
    if spec.delete_source {
        println!("  source objects are deleted after each successful copy");
    }
    output::preview(&keys, args.show_all);
    output::rule();

    if args.dry_run {
        println!(
            "[DRY RUN] Would migrate {} objects. No changes made.",
            objects.len()
        );
        return Ok(Outcome::Success);
    }

    let gate = if args.yes { Gate::Assume(true) } else { Gate::Prompt };
    if !gate.confirm_token("MIGRATE")? {
        println!("Operation cancelled.");
        return Ok(Outcome::Declined);
    }

    let progress = IndicatifProgress::objects_bar(multi, "Migrating");
    let summary = execute_migrate(&client, &spec, &objects, progress.as_ref()).await;
    output::report("Migration complete", &summary);

    Ok(Outcome::for_summary(&summary))
}
