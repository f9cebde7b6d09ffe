//! Command implementations

pub mod changelog;

pub mod doctor;

pub mod draft;

use anyhow::Context;
use camino::Utf8Path;
use reldraft_core::matcher::MAX_RELEASES;
use reldraft_core::model::Snapshot;
use tracing::warn;

/// Load a repository snapshot from a JSON file.
///
/// Shared across commands that compute against a snapshot (draft, changelog).
pub fn read_snapshot(path: &Utf8Path) -> anyhow::Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file {path}"))?;
    let snapshot: Snapshot =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse snapshot {path}"))?;

    // All entries still feed the engine; capping the listing is the
    // fetcher's job.
    if snapshot.releases.len() > MAX_RELEASES {
        warn!(
            releases = snapshot.releases.len(),
            cap = MAX_RELEASES,
            "snapshot exceeds the platform's release listing window; the fetcher should stop paging sooner"
        );
    }

    Ok(snapshot)
}
