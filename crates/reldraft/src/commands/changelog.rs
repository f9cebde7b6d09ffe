//! Changelog command — render the categorized change list on its own.

use camino::Utf8PathBuf;
use clap::Args;
use reldraft_core::changelog;
use reldraft_core::config::Config;
use tracing::{debug, instrument};

/// Arguments for the `changelog` subcommand.
#[derive(Args, Debug)]
pub struct ChangelogArgs {
    /// Path to the repository snapshot (JSON)
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: Utf8PathBuf,

    /// Append the contributors sentence after the change list
    #[arg(long)]
    pub contributors: bool,
}

/// Render the changelog body for a snapshot's merged changes.
#[instrument(name = "cmd_changelog", skip_all, fields(snapshot = %args.snapshot))]
pub fn cmd_changelog(args: ChangelogArgs, config: &Config) -> anyhow::Result<()> {
    let snapshot = super::read_snapshot(&args.snapshot)?;

    let changes = changelog::filter_changes(&snapshot.pull_requests, config);
    debug!(changes = changes.len(), "rendering changelog");

    println!("{}", changelog::render_changelog(&changes, config));

    if args.contributors {
        let sentence = changelog::contributors_sentence(&snapshot.commits, &changes, config);
        println!();
        println!("{sentence}");
    }

    Ok(())
}
