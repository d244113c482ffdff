#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `bucket-ops` — bulk object management for S3-compatible buckets.
//!
//! Every subcommand follows the same shape: resolve configuration
//! (flags over environment variables), list or scan, show a preview,
//! ask for typed confirmation, execute sequentially with a progress
//! bar, and print a final summary. Nothing is mutated before the
//! confirmation gate passes.

mod delete_all;
mod env;
mod migrate;
mod move_cmd;
mod output;
mod purge;
mod upload;

use std::process::ExitCode;

use bucket_ops_transfer::summary::RunSummary;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bucket-ops")]
#[command(about = "Bulk object management for S3-compatible buckets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local directory tree, skipping files already present
    Upload(upload::UploadArgs),
    /// Delete every object in a bucket (optionally scoped to a prefix)
    DeleteAll(delete_all::DeleteAllArgs),
    /// Move prefix "directories" within a bucket (copy, then delete)
    Move(move_cmd::MoveArgs),
    /// Delete objects matching folder/extension/pattern filters
    Purge(purge::PurgeArgs),
    /// Copy a bucket's objects into another bucket, key for key
    Migrate(migrate::MigrateArgs),
}

/// Terminal state of a command run, mapped onto the process exit code.
///
/// Fatal errors (bad configuration, listing failures) short-circuit via
/// `Err` in `main` and exit 1 instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Everything requested happened (including "nothing to do").
    Success,
    /// The operator declined the confirmation prompt; nothing mutated.
    Declined,
    /// The run completed but some items failed.
    PartialFailure,
}

impl Outcome {
    const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Declined => 2,
            Self::PartialFailure => 3,
        }
    }

    const fn for_summary(summary: &RunSummary) -> Self {
        if summary.has_failures() {
            Self::PartialFailure
        } else {
            Self::Success
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let multi = bucket_ops_cli_utils::init_logger();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Upload(args) => upload::run(args, &multi).await,
        Commands::DeleteAll(args) => delete_all::run(args, &multi).await,
        Commands::Move(args) => move_cmd::run(args, &multi).await,
        Commands::Purge(args) => purge::run(args, &multi).await,
        Commands::Migrate(args) => migrate::run(args, &multi).await,
    };

    match result {
        Ok(outcome) => ExitCode::from(outcome.code()),
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(1)
        }
    }
}
