//! Label-driven version resolution.
//!
//! Each merged change's labels are checked against the configured trigger
//! lists; the highest bump class seen anywhere wins. A single change
//! labeled for a major bump overrides any number of minor/patch requests —
//! deliberate policy, not an ordering accident.

use semver::Version;
use tracing::debug;

use super::{BumpLevel, VersionInfo, VersionResult, next_prerelease, next_version};
use crate::config::VersionResolverConfig;
use crate::model::PullRequest;

/// Determine the bump class implied by the filtered change set.
///
/// Falls back to the configured default when no trigger label is present.
/// Errors with [`super::VersionError::NoBumpClass`] when there is no match
/// and no default either — the caller must abort the run.
pub fn resolve_bump(
    changes: &[&PullRequest],
    config: &VersionResolverConfig,
) -> VersionResult<BumpLevel> {
    let mut resolved: Option<BumpLevel> = None;

    for change in changes {
        for label in &change.labels {
            let level = if config.major.labels.iter().any(|l| l == label) {
                BumpLevel::Major
            } else if config.minor.labels.iter().any(|l| l == label) {
                BumpLevel::Minor
            } else if config.patch.labels.iter().any(|l| l == label) {
                BumpLevel::Patch
            } else {
                continue;
            };
            debug!(number = change.number, %label, %level, "bump trigger label");
            resolved = Some(resolved.map_or(level, |r| r.max(level)));
        }
    }

    resolved
        .or(config.default)
        .ok_or(super::VersionError::NoBumpClass)
}

/// Resolve the full version for a standard (non-reconciled) run.
///
/// `base` is the baseline release's parsed version; `None` means no prior
/// release exists and arithmetic starts from `0.0.0`. When
/// `prerelease_ident` is set this run is a pre-release run and the resolved
/// version carries a fresh `-<ident>.0` suffix.
pub fn resolve_version(
    base: Option<&Version>,
    changes: &[&PullRequest],
    config: &VersionResolverConfig,
    prerelease_ident: Option<&str>,
) -> VersionResult<VersionInfo> {
    let zero = Version::new(0, 0, 0);
    let base = base.unwrap_or(&zero);
    let level = resolve_bump(changes, config)?;

    let resolved = match prerelease_ident {
        Some(ident) => next_prerelease(base, level, ident)?,
        None => next_version(base, level),
    };
    debug!(%base, %level, %resolved, "resolved version");

    Ok(VersionInfo::from_base(base, resolved))
}
