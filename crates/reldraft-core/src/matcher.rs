//! Release matching: baseline selection and change-request draft lookup.
//!
//! The full release list is sorted with a hybrid key — entries whose tags
//! parse as semver order by version ascending, entries that do not parse
//! order by creation time ascending and sort below every parseable entry.
//! Each tag is parsed once, up front, so the ordering is total and a tag
//! that fails to parse never aborts a run (and never outranks a real
//! version). The **baseline** is the highest-sorted non-draft (and, unless
//! configured otherwise, non-prerelease) entry; the **change-request
//! draft** is the highest-sorted release whose body carries a marker
//! comment naming the current change request.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use tracing::debug;

use crate::model::Release;
use crate::version::parse_tag_version;

/// Hard cap on the release listing. The platform's paginated listing API
/// fails beyond this point, so the fetching layer must stop requesting
/// pages once it has this many entries.
pub const MAX_RELEASES: usize = 1000;

/// Marker comment tying a prerelease draft to one change request.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- pr-number: (\d+) -->").expect("marker regex"));

/// Render the marker comment for a change request number.
pub fn marker_for(pr_number: u64) -> String {
    format!("<!-- pr-number: {pr_number} -->")
}

/// Extract the change request number from a release body, if the body
/// carries a marker comment.
pub fn marker_pr_number(body: &str) -> Option<u64> {
    let captures = MARKER.captures(body)?;
    captures[1].parse().ok()
}

/// Selection inputs for [`find_releases`].
#[derive(Debug, Clone)]
pub struct MatchOptions<'a> {
    /// Branch/commitish this run targets.
    pub target_commitish: &'a str,
    /// Whether to drop releases cut from other targets.
    pub filter_by_commitish: bool,
    /// Configured tag prefix; empty means no prefix filtering.
    pub tag_prefix: &'a str,
    /// Whether prereleases may serve as the version baseline.
    pub include_pre_releases: bool,
    /// Prerelease identifier, when this run may reconcile a draft.
    pub prerelease_ident: Option<&'a str>,
    /// Current change request number, when known.
    pub pr_number: Option<u64>,
}

/// The two releases a run cares about.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchedReleases<'a> {
    /// Latest qualifying prior release, the version baseline.
    pub baseline: Option<&'a Release>,
    /// Most recent draft tied to the current change request.
    pub pr_draft: Option<&'a Release>,
}

/// Select the baseline release and any change-request-scoped draft.
///
/// An empty release list yields both absent — that is a first release, not
/// an error. Output is independent of the input list's order.
pub fn find_releases<'a>(releases: &'a [Release], opts: &MatchOptions<'_>) -> MatchedReleases<'a> {
    let target = normalize_ref(opts.target_commitish);

    let mut candidates: Vec<(Option<Version>, &Release)> = releases
        .iter()
        .filter(|r| !opts.filter_by_commitish || normalize_ref(&r.target_commitish) == target)
        .filter(|r| opts.tag_prefix.is_empty() || r.tag_name.starts_with(opts.tag_prefix))
        .map(|r| (parse_tag_version(&r.tag_name, opts.tag_prefix).ok(), r))
        .collect();
    candidates.sort_by(compare_releases);

    let baseline = candidates
        .iter()
        .filter(|(_, r)| !r.draft && (opts.include_pre_releases || !r.prerelease))
        .next_back()
        .map(|(_, r)| *r);

    // Only a prerelease-capable run with a known change request looks for
    // its own draft.
    let pr_draft = match (opts.prerelease_ident, opts.pr_number) {
        (Some(_), Some(number)) => candidates
            .iter()
            .filter(|(_, r)| marker_pr_number(&r.body) == Some(number))
            .next_back()
            .map(|(_, r)| *r),
        _ => None,
    };

    debug!(
        candidates = candidates.len(),
        baseline = baseline.map(|r| r.tag_name.as_str()),
        pr_draft = pr_draft.map(|r| r.tag_name.as_str()),
        pr_number = opts.pr_number,
        "matched releases"
    );

    MatchedReleases { baseline, pr_draft }
}

/// Strip a `refs/heads/` prefix so branch names and full refs compare equal.
fn normalize_ref(commitish: &str) -> &str {
    commitish.strip_prefix("refs/heads/").unwrap_or(commitish)
}

/// Total ordering over pre-parsed candidates: semver between two parseable
/// tags (creation time breaks exact version ties), creation time between
/// two unparseable ones, and an unparseable tag always sorts below a
/// parseable one.
fn compare_releases(a: &(Option<Version>, &Release), b: &(Option<Version>, &Release)) -> Ordering {
    match (&a.0, &b.0) {
        (Some(va), Some(vb)) => va
            .cmp(vb)
            .then_with(|| a.1.created_at.cmp(&b.1.created_at)),
        (None, None) => a.1.created_at.cmp(&b.1.created_at),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}
