//! Version resolution: bump arithmetic, label-driven resolution, and
//! prerelease draft reconciliation.
//!
//! Two mutually exclusive paths produce the resolved version for a run:
//! [`resolver::resolve_version`] (label scan over merged changes) and
//! [`reconcile::reconcile_prerelease`] (increment the suffix of an existing
//! change-request draft). The caller picks exactly one per run.

pub mod reconcile;
pub mod resolver;

use std::collections::BTreeMap;

use semver::{Prerelease, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    /// Failed to parse a semver string.
    #[error("invalid semver: {0}")]
    InvalidSemver(#[from] semver::Error),

    /// No trigger label matched and no default bump class is configured.
    ///
    /// Fatal: the run must stop before any release is created or updated,
    /// since silently skipping a release would be a correctness hazard.
    #[error("no version bump class could be determined (no label matched, no default configured)")]
    NoBumpClass,
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Semver bump class. Ordering is the resolution priority: major wins
/// over minor wins over patch, regardless of how many changes asked for
/// what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    /// Patch release (x.y.Z).
    Patch,
    /// Minor release (x.Y.0).
    Minor,
    /// Major release (X.0.0).
    Major,
}

impl std::fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// Compute the next version by applying a bump level.
pub const fn next_version(current: &Version, level: BumpLevel) -> Version {
    match level {
        BumpLevel::Patch => Version::new(current.major, current.minor, current.patch + 1),
        BumpLevel::Minor => Version::new(current.major, current.minor + 1, 0),
        BumpLevel::Major => Version::new(current.major + 1, 0, 0),
    }
}

/// Compute the first prerelease of the next version: bump, then seed the
/// suffix at zero under `ident` (e.g. `1.3.0-beta.0`).
pub fn next_prerelease(current: &Version, level: BumpLevel, ident: &str) -> VersionResult<Version> {
    let mut next = next_version(current, level);
    next.pre = Prerelease::new(&format!("{ident}.0"))?;
    Ok(next)
}

/// Parse a release tag into a version, stripping the configured tag prefix
/// and an optional leading `v`.
pub fn parse_tag_version(tag: &str, tag_prefix: &str) -> VersionResult<Version> {
    let s = tag.strip_prefix(tag_prefix).unwrap_or(tag);
    let s = s.strip_prefix('v').unwrap_or(s);
    Ok(Version::parse(s)?)
}

/// The resolved version for a run plus the next-version candidates for each
/// bump class, exposed as template substitution tokens.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VersionInfo {
    /// The version this run resolves to (may carry a prerelease suffix).
    pub version: Version,
    /// Candidate if a major bump were applied to the baseline.
    pub next_major: Version,
    /// Candidate if a minor bump were applied to the baseline.
    pub next_minor: Version,
    /// Candidate if a patch bump were applied to the baseline.
    pub next_patch: Version,
}

impl VersionInfo {
    /// Build the info for a resolved version, deriving the per-class
    /// candidates from `base` (the baseline release's version, or 0.0.0).
    pub const fn from_base(base: &Version, resolved: Version) -> Self {
        Self {
            version: resolved,
            next_major: next_version(base, BumpLevel::Major),
            next_minor: next_version(base, BumpLevel::Minor),
            next_patch: next_version(base, BumpLevel::Patch),
        }
    }

    /// Template tokens contributed by the resolved version.
    pub fn tokens(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        map.insert("RESOLVED_VERSION", self.version.to_string());
        map.insert("MAJOR", self.version.major.to_string());
        map.insert("MINOR", self.version.minor.to_string());
        map.insert("PATCH", self.version.patch.to_string());
        map.insert("NEXT_MAJOR_VERSION", self.next_major.to_string());
        map.insert("NEXT_MINOR_VERSION", self.next_minor.to_string());
        map.insert("NEXT_PATCH_VERSION", self.next_patch.to_string());
        map
    }
}
