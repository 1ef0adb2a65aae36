//! notebridge: keeps a git-hosted markdown tree and a HedgeDoc server in
//! sync.
//!
//! One `sync` invocation runs a single reconciliation pass: list both
//! sides, classify every document, apply the resulting actions, and write
//! the per-run mapping log.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use notebridge::config::Credentials;
use notebridge::github::GitHubRepo;
use notebridge::hedgedoc::HedgeDocNotes;
use notebridge::logs::write_mapping_log;
use notebridge_core::sync::{SyncOptions, SyncRun};

#[derive(Parser, Debug)]
#[command(name = "notebridge")]
#[command(about = "Bidirectional sync between a git document tree and a HedgeDoc server")]
struct Args {
    /// Path to the credential file
    #[arg(short, long, default_value = "credentials.json")]
    config: PathBuf,

    /// URL of the HedgeDoc server
    #[arg(short, long, default_value = "http://localhost/hedgedoc")]
    server: String,

    /// Directory for per-run mapping logs
    #[arg(long, default_value = "logs")]
    logs: PathBuf,

    /// File names to exclude from syncing (repeatable)
    #[arg(long = "ignore", default_values_t = [String::from("README.md")])]
    ignore: Vec<String>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one reconciliation pass
    Sync,
    /// Print the note server's status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging - respects RUST_LOG env var, defaults to info (or
    // debug with --verbose)
    let default_filter = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let credentials = Credentials::load(&args.config)?;
    let notes =
        HedgeDocNotes::login(&args.server, &credentials.hedgedoc_email, &credentials.hedgedoc_password)
            .await?;

    match args.command {
        Command::Status => {
            let status = notes.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Sync => {
            let repo = GitHubRepo::new(
                &credentials.github_owner,
                &credentials.github_repo,
                &credentials.github_token,
            )?;
            let options = SyncOptions { ignore: args.ignore };

            let report = SyncRun::with_options(&repo, &notes, options).run().await?;

            let log_file = write_mapping_log(&args.logs, &report.mappings)?;
            info!(
                "Synced {} document(s), mapping log at {}",
                report.mappings.len(),
                log_file.display()
            );
        }
    }

    Ok(())
}
