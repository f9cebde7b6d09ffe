//! Prerelease draft reconciliation.
//!
//! When a draft for the current change request already exists, its tag is
//! the authoritative version and only the prerelease counter advances:
//! `v1.2.0-beta.3` becomes `v1.2.0-beta.4`. The label-bump logic is never
//! re-run on this path. State lives entirely in the previously published
//! draft's tag, so repeated runs form a small external state machine:
//! absent draft → suffix 0, suffix N → N+1, malformed draft → treated as
//! absent (recoverable, logged).

use semver::{Prerelease, Version};
use tracing::{debug, warn};

use super::{VersionInfo, parse_tag_version};

/// Increment the prerelease suffix of an existing change-request draft.
///
/// Returns `None` when the tag does not parse, its prerelease part has
/// fewer than two segments, its identifier differs from the configured one,
/// or the counter segment is not numeric — in every case the caller falls
/// back to standard version resolution as if no draft existed.
pub fn reconcile_prerelease(draft_tag: &str, tag_prefix: &str, ident: &str) -> Option<VersionInfo> {
    let version = match parse_tag_version(draft_tag, tag_prefix) {
        Ok(v) => v,
        Err(err) => {
            warn!(tag = draft_tag, %err, "draft tag is not semver, falling back");
            return None;
        }
    };

    let mut segments = version.pre.as_str().split('.');
    let (Some(found_ident), Some(counter)) = (segments.next(), segments.next()) else {
        warn!(
            tag = draft_tag,
            pre = version.pre.as_str(),
            "draft prerelease has fewer than two segments, falling back"
        );
        return None;
    };
    if found_ident != ident {
        warn!(
            tag = draft_tag,
            expected = ident,
            found = found_ident,
            "draft prerelease identifier mismatch, falling back"
        );
        return None;
    }
    let Ok(counter) = counter.parse::<u64>() else {
        warn!(
            tag = draft_tag,
            counter, "draft prerelease counter is not numeric, falling back"
        );
        return None;
    };

    // Major/minor/patch stay as the draft recorded them.
    let base = Version::new(version.major, version.minor, version.patch);
    let mut next = base.clone();
    next.pre = Prerelease::new(&format!("{ident}.{}", counter + 1)).ok()?;
    debug!(tag = draft_tag, resolved = %next, "incremented prerelease suffix");

    Some(VersionInfo::from_base(&base, next))
}
