//! `move` — relocate prefix "directories" within a bucket.

use bucket_ops_cli_utils::{Gate, IndicatifProgress, MultiProgress};
use bucket_ops_client::{BucketClient, ClientConfig};
use bucket_ops_transfer::relocate::{
    MovePair, PlannedMove, ensure_trailing_slash, execute_moves, plan_moves,
};
use bucket_ops_transfer::summary::RunSummary;

use crate::{Outcome, env, output};

#[derive(clap::Args)]
pub struct MoveArgs {
    /// Prefix mapping as SOURCE:DEST; repeat for multiple moves,
    /// processed in order
    #[arg(long = "pair", value_name = "SOURCE:DEST", required = true)]
    pairs: Vec<String>,

    /// Key prefix to leave in place; repeatable
    #[arg(long = "exclude", value_name = "PREFIX")]
    excludes: Vec<String>,

    /// Target bucket (defaults to `R2_BUCKET`)
    #[arg(long)]
    bucket: Option<String>,

    /// List every affected object instead of the first few
    #[arg(long)]
    show_all: bool,

    /// Preview only; move nothing
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
}

pub async fn run(
    args: MoveArgs,
    multi: &MultiProgress,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let bucket = env::require_bucket(args.bucket)?;
    let pairs = args
        .pairs
        .iter()
        .map(|raw| raw.parse::<MovePair>())
        .collect::<Result<Vec<_>, _>>()?;

    let excludes: Vec<String> = args
        .excludes
        .iter()
        .map(|prefix| ensure_trailing_slash(prefix))
        .collect();

    let config = ClientConfig::from_env()?;
    let client = BucketClient::connect(&config);

    let mut planned: Vec<(MovePair, Vec<PlannedMove>)> = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let objects = client.list_objects(&bucket, &pair.source).await?;
        // A destination nested under the source would re-move objects
        // that are already where they belong; exclude it implicitly.
        let mut pair_excludes = excludes.clone();
        if !pair.dest.is_empty() && pair.dest.starts_with(&pair.source) {
            pair_excludes.push(pair.dest.clone());
        }
        let moves = plan_moves(&objects, &pair, &pair_excludes);
        if moves.is_empty() {
            log::warn!("No objects under '{}'", pair.source);
        }
        planned.push((pair, moves));
    }

    let total: usize = planned.iter().map(|(_, moves)| moves.len()).sum();
    if total == 0 {
        println!("Nothing to move.");
        return Ok(Outcome::Success);
    }

    let lines: Vec<String> = planned
        .iter()
        .flat_map(|(_, moves)| moves.iter())
        .map(|m| format!("{} -> {}", m.source_key, m.dest_key))
        .collect();

    output::rule();
    println!("This will move {total} objects within '{bucket}':");
    if !excludes.is_empty() {
        println!("  preserving: {}", excludes.join(", "));
    }
    output::preview(&lines, args.show_all);
    output::rule();

    if args.dry_run {
        println!("[DRY RUN] Would move {total} objects. No changes made.");
        return Ok(Outcome::Success);
    }

    let gate = if args.yes { Gate::Assume(true) } else { Gate::Prompt };
    if !gate.confirm_token("yes")? {
        println!("Operation cancelled.");
        return Ok(Outcome::Declined);
    }

    let progress = IndicatifProgress::objects_bar(multi, "Moving");
    let mut summary = RunSummary::default();
    for (pair, moves) in &planned {
        log::info!("Moving '{}' -> '{}'", pair.source, pair.dest);
        summary.merge(execute_moves(&client, &bucket, moves, progress.as_ref()).await);
    }
    output::report("Move complete", &summary);

    Ok(Outcome::for_summary(&summary))
}
