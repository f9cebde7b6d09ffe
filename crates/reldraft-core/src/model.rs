//! Input data model: releases, merged changes, and the snapshot envelope.
//!
//! Everything here is read-only input. The engine never mutates a fetched
//! [`Release`] or [`PullRequest`]; it only reads them and produces a new
//! release descriptor. The fetching layer (hosting API client, fixture
//! file, whatever) materializes a complete [`Snapshot`] before the engine
//! runs — partial or streamed delivery is not supported, since release
//! matching sorts over the full candidate set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user or bot account on the hosting platform.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct User {
    /// Account login name.
    pub login: String,
    /// Whether this is a human or an installed app.
    #[serde(default)]
    pub kind: UserKind,
    /// Profile URL, when the fetching layer provides one.
    #[serde(default)]
    pub url: Option<String>,
}

/// Account flavor, used for contributor and author rendering.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    /// A human account.
    #[default]
    User,
    /// An app/bot account (rendered as a link with a `[bot]` suffix).
    Bot,
}

impl User {
    /// True when this account is a bot.
    pub const fn is_bot(&self) -> bool {
        matches!(self.kind, UserKind::Bot)
    }
}

/// An existing release as recorded by the hosting platform.
///
/// Identity is the tag name; uniqueness is the platform's concern.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Release {
    /// The git tag the release points at.
    pub tag_name: String,
    /// Branch or commit the release was cut from.
    #[serde(default)]
    pub target_commitish: String,
    /// When the release object was created.
    pub created_at: DateTime<Utc>,
    /// Unpublished draft flag.
    #[serde(default)]
    pub draft: bool,
    /// Pre-release flag.
    #[serde(default)]
    pub prerelease: bool,
    /// Free-text release body (markdown).
    #[serde(default)]
    pub body: String,
}

/// A merged pull request — the unit the changelog and version scan consume.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PullRequest {
    /// Platform-assigned number.
    pub number: u64,
    /// Title as merged.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub body: String,
    /// Author, absent for e.g. deleted accounts.
    #[serde(default)]
    pub author: Option<User>,
    /// Branch the change was merged into.
    #[serde(default)]
    pub base_ref_name: String,
    /// Branch the change came from.
    #[serde(default)]
    pub head_ref_name: String,
    /// Label names attached at merge time. Order carries no meaning.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Web URL of the pull request.
    #[serde(default)]
    pub url: Option<String>,
    /// Merge timestamp.
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// True when any of this change's labels appears in `wanted`.
    pub fn has_any_label<S: AsRef<str>>(&self, wanted: &[S]) -> bool {
        self.labels
            .iter()
            .any(|l| wanted.iter().any(|w| w.as_ref() == l))
    }
}

/// A commit reachable since the baseline release.
///
/// Commits only feed the contributor sentence; the changelog itself is
/// pull-request based.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Commit {
    /// Commit hash.
    #[serde(default)]
    pub sha: String,
    /// Commit message subject.
    #[serde(default)]
    pub message: String,
    /// Platform account of the author, when resolvable.
    #[serde(default)]
    pub author: Option<User>,
    /// Raw author name from the commit, used when no account matches.
    #[serde(default)]
    pub author_name: Option<String>,
}

/// The complete, stable input set for one engine invocation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Snapshot {
    /// Repository owner login.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Default branch, used as the release target when config sets none.
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// The change request this run previews, when it is a per-PR run.
    #[serde(default)]
    pub pr_number: Option<u64>,
    /// All existing releases, newest or oldest first — order is irrelevant.
    #[serde(default)]
    pub releases: Vec<Release>,
    /// Pull requests merged since the baseline release.
    #[serde(default)]
    pub pull_requests: Vec<PullRequest>,
    /// Commits since the baseline release.
    #[serde(default)]
    pub commits: Vec<Commit>,
}

fn default_branch() -> String {
    "main".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_kind_defaults_to_human() {
        let user: User = serde_json::from_str(r#"{"login": "alice"}"#).unwrap();
        assert!(!user.is_bot());
    }

    #[test]
    fn bot_kind_deserializes() {
        let user: User = serde_json::from_str(r#"{"login": "dep-bot", "kind": "bot"}"#).unwrap();
        assert!(user.is_bot());
    }

    #[test]
    fn pull_request_label_lookup() {
        let pr: PullRequest = serde_json::from_str(
            r#"{"number": 1, "title": "x", "labels": ["bug", "breaking"]}"#,
        )
        .unwrap();
        assert!(pr.has_any_label(&["breaking"]));
        assert!(!pr.has_any_label(&["enhancement"]));
    }

    #[test]
    fn snapshot_minimal_fields() {
        let snap: Snapshot = serde_json::from_str(r#"{"owner": "acme", "repo": "widget"}"#).unwrap();
        assert_eq!(snap.default_branch, "main");
        assert!(snap.releases.is_empty());
        assert!(snap.pr_number.is_none());
    }
}
