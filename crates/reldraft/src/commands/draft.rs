//! Draft command — compute the next draft release from a snapshot.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use reldraft_core::builder::{self, BuildOptions, ReleaseDescriptor};
use reldraft_core::config::Config;
use tracing::{debug, instrument};

/// Arguments for the `draft` subcommand.
#[derive(Args, Debug)]
pub struct DraftArgs {
    /// Path to the repository snapshot (JSON)
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: Utf8PathBuf,

    /// Render this tag template instead of the configured one
    #[arg(long, value_name = "TEMPLATE")]
    pub tag: Option<String>,

    /// Render this name template instead of the configured one
    #[arg(long, value_name = "TEMPLATE")]
    pub name: Option<String>,

    /// Compute the draft as if this change request triggered the run
    #[arg(long, value_name = "NUMBER")]
    pub pr: Option<u64>,
}

/// Compute and print the release descriptor for one snapshot.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
#[instrument(name = "cmd_draft", skip_all, fields(snapshot = %args.snapshot))]
pub fn cmd_draft(args: DraftArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let mut snapshot = super::read_snapshot(&args.snapshot)?;
    if args.pr.is_some() {
        snapshot.pr_number = args.pr;
    }

    let options = BuildOptions {
        tag_override: args.tag.as_deref(),
        name_override: args.name.as_deref(),
    };
    let descriptor = builder::build_release_info(&snapshot, config, &options)
        .context("failed to compute release draft")?;

    debug!(
        tag = %descriptor.tag,
        prerelease = descriptor.prerelease,
        existing = ?descriptor.existing_draft_tag,
        "draft computed"
    );

    if global_json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
    } else {
        print_descriptor(&descriptor);
    }

    Ok(())
}

fn print_descriptor(descriptor: &ReleaseDescriptor) {
    println!(
        "{} {} {} {} {}",
        "Draft:".bold(),
        descriptor.name.cyan(),
        "as".dimmed(),
        descriptor.tag.cyan(),
        format!("({})", descriptor.target_commitish).dimmed()
    );
    match descriptor.existing_draft_tag {
        Some(ref tag) => println!("  {}: update existing draft {}", "Action".dimmed(), tag.cyan()),
        None => println!("  {}: create new draft", "Action".dimmed()),
    }
    if descriptor.prerelease {
        println!("  {}", "prerelease".yellow());
    }
    println!();
    // Body goes out unstyled so it can be piped into other tools.
    println!("{}", descriptor.body);
}
