//! Release descriptor assembly.
//!
//! Orchestrates matching, version resolution, and changelog rendering into
//! the final [`ReleaseDescriptor`] a publishing layer creates or updates.
//! Exactly one of the two version paths executes per run; the choice is
//! made once, by [`decide_version_path`], never by scattered flags.

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::changelog;
use crate::config::Config;
use crate::matcher::{self, MatchOptions};
use crate::model::{PullRequest, Snapshot};
use crate::template::{self, TemplateError};
use crate::version::{VersionError, VersionInfo, parse_tag_version, reconcile, resolver};
use semver::Version;
use serde::Serialize;

/// Errors from release descriptor assembly.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Version resolution failed; the run must not create or update
    /// anything.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// A configured replacer failed to compile.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Result alias for build operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Per-invocation overrides supplied by the caller (CLI flags, action
/// inputs). An override string is itself a template rendered against the
/// version tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions<'a> {
    /// Override the tag template.
    pub tag_override: Option<&'a str>,
    /// Override the name template.
    pub name_override: Option<&'a str>,
}

/// Which of the two version paths a run took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionPath {
    /// Standard label-driven resolution against the baseline release.
    Standard(VersionInfo),
    /// Suffix increment of an existing change-request draft.
    ReconciledPrerelease(VersionInfo),
}

impl VersionPath {
    /// The resolved version info, whichever path produced it.
    pub const fn info(&self) -> &VersionInfo {
        match self {
            Self::Standard(info) | Self::ReconciledPrerelease(info) => info,
        }
    }
}

/// The final release descriptor, ready for the publishing collaborator.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    /// Display name of the release.
    pub name: String,
    /// Tag to create the release under.
    pub tag: String,
    /// Rendered release body.
    pub body: String,
    /// Branch/commitish the release targets.
    pub target_commitish: String,
    /// Whether the release is a prerelease.
    pub prerelease: bool,
    /// Always drafted; publishing is the consumer's decision.
    pub draft: bool,
    /// Whether the platform should mark this release as latest.
    pub make_latest: bool,
    /// Resolved version components and next-version candidates.
    pub version: VersionInfo,
    /// Tag of the change-request draft this run updates, when one was
    /// found. `None` directs the consumer to create a new release.
    pub existing_draft_tag: Option<String>,
}

/// Compute the release descriptor for one run.
#[instrument(skip_all, fields(owner = %snapshot.owner, repo = %snapshot.repo, pr = snapshot.pr_number))]
pub fn build_release_info(
    snapshot: &Snapshot,
    config: &Config,
    options: &BuildOptions<'_>,
) -> BuildResult<ReleaseDescriptor> {
    let target_commitish = config
        .commitish
        .clone()
        .unwrap_or_else(|| snapshot.default_branch.clone());

    let matched = matcher::find_releases(
        &snapshot.releases,
        &MatchOptions {
            target_commitish: &target_commitish,
            filter_by_commitish: config.filter_by_commitish,
            tag_prefix: &config.tag_prefix,
            include_pre_releases: config.include_pre_releases,
            prerelease_ident: config.prerelease_identifier.as_deref(),
            pr_number: snapshot.pr_number,
        },
    );

    let base_version = matched.baseline.and_then(|release| {
        match parse_tag_version(&release.tag_name, &config.tag_prefix) {
            Ok(version) => Some(version),
            Err(err) => {
                warn!(tag = release.tag_name, %err, "baseline tag is not semver, starting from 0.0.0");
                None
            }
        }
    });

    // One filtered set feeds both the version scan and the changelog.
    let filtered = changelog::filter_changes(&snapshot.pull_requests, config);

    let path = decide_version_path(
        matched.pr_draft.map(|r| r.tag_name.as_str()),
        base_version.as_ref(),
        &filtered,
        config,
    )?;
    let reconciled = matches!(path, VersionPath::ReconciledPrerelease(_));
    info!(
        version = %path.info().version,
        reconciled,
        baseline = matched.baseline.map(|r| r.tag_name.as_str()),
        "version resolved"
    );

    let changes = changelog::render_changelog(&filtered, config);
    let contributors = changelog::contributors_sentence(&snapshot.commits, &filtered, config);

    let mut tokens = path.info().tokens();
    tokens.insert("OWNER", snapshot.owner.clone());
    tokens.insert("REPOSITORY", snapshot.repo.clone());
    tokens.insert("CHANGES", changes);
    tokens.insert("CONTRIBUTORS", contributors);
    tokens.insert(
        "PREVIOUS_TAG",
        matched
            .baseline
            .map(|r| r.tag_name.clone())
            .unwrap_or_default(),
    );

    let mut tag = template::substitute(options.tag_override.unwrap_or(&config.tag_template), &tokens);
    if !config.tag_prefix.is_empty() && !tag.starts_with(&config.tag_prefix) {
        tag = format!("{}{tag}", config.tag_prefix);
    }
    let name = template::substitute(options.name_override.unwrap_or(&config.name_template), &tokens);

    let replacers: Vec<_> = config.replacers.iter().map(|r| r.to_replacer()).collect();
    let full_template = format!("{}{}{}", config.header, config.template, config.footer);
    let mut body = template::render(&full_template, &tokens, &replacers)?;

    // The marker is what lets the next run for this change request find
    // and update the same draft instead of creating another.
    if config.prerelease
        && config.prerelease_identifier.is_some()
        && let Some(number) = snapshot.pr_number
    {
        body.push_str("\n\n");
        body.push_str(&matcher::marker_for(number));
    }

    debug!(%tag, %name, body_len = body.len(), "descriptor assembled");

    Ok(ReleaseDescriptor {
        name,
        tag,
        body,
        target_commitish,
        prerelease: config.prerelease,
        draft: true,
        make_latest: config.latest && !config.prerelease,
        version: path.info().clone(),
        existing_draft_tag: matched.pr_draft.map(|r| r.tag_name.clone()),
    })
}

/// Pick exactly one version path for this run.
///
/// A matched change-request draft routes to reconciliation; a malformed
/// draft tag falls back to the standard path as if no draft existed.
fn decide_version_path(
    draft_tag: Option<&str>,
    base: Option<&Version>,
    filtered: &[&PullRequest],
    config: &Config,
) -> Result<VersionPath, VersionError> {
    if let Some(tag) = draft_tag
        && let Some(ident) = config.prerelease_identifier.as_deref()
        && let Some(info) = reconcile::reconcile_prerelease(tag, &config.tag_prefix, ident)
    {
        return Ok(VersionPath::ReconciledPrerelease(info));
    }

    let suffix_ident = if config.prerelease {
        config.prerelease_identifier.as_deref()
    } else {
        None
    };
    let info = resolver::resolve_version(base, filtered, &config.version_resolver, suffix_ident)?;
    Ok(VersionPath::Standard(info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Release, User, UserKind};
    use chrono::{TimeZone, Utc};

    fn release(tag: &str, days: i64, draft: bool, prerelease: bool, body: &str) -> Release {
        Release {
            tag_name: tag.into(),
            target_commitish: "main".into(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::days(days),
            draft,
            prerelease,
            body: body.into(),
        }
    }

    fn pull(number: u64, title: &str, labels: &[&str]) -> PullRequest {
        PullRequest {
            number,
            title: title.into(),
            body: String::new(),
            author: Some(User {
                login: "alice".into(),
                kind: UserKind::User,
                url: None,
            }),
            base_ref_name: "main".into(),
            head_ref_name: "topic".into(),
            labels: labels.iter().map(ToString::to_string).collect(),
            url: None,
            merged_at: None,
        }
    }

    fn snapshot(releases: Vec<Release>, pulls: Vec<PullRequest>) -> Snapshot {
        Snapshot {
            owner: "acme".into(),
            repo: "widget".into(),
            default_branch: "main".into(),
            pr_number: None,
            releases,
            pull_requests: pulls,
            commits: Vec::new(),
        }
    }

    #[test]
    fn standard_run_bumps_from_baseline() {
        let snap = snapshot(
            vec![release("v1.2.3", 0, false, false, "")],
            vec![pull(1, "feature work", &["minor"])],
        );
        let descriptor =
            build_release_info(&snap, &Config::default(), &BuildOptions::default()).unwrap();

        assert_eq!(descriptor.tag, "v1.3.0");
        assert_eq!(descriptor.name, "v1.3.0");
        assert!(descriptor.draft);
        assert!(descriptor.make_latest);
        assert!(descriptor.existing_draft_tag.is_none());
        assert!(descriptor.body.contains("* feature work (#1) @alice"));
    }

    #[test]
    fn first_release_starts_from_zero() {
        let snap = snapshot(vec![], vec![pull(1, "initial", &[])]);
        let descriptor =
            build_release_info(&snap, &Config::default(), &BuildOptions::default()).unwrap();
        assert_eq!(descriptor.tag, "v0.0.1");
        assert!(descriptor.body.contains("* initial (#1) @alice"));
    }

    #[test]
    fn no_changes_renders_placeholder_body() {
        let snap = snapshot(vec![release("v1.0.0", 0, false, false, "")], vec![]);
        let descriptor =
            build_release_info(&snap, &Config::default(), &BuildOptions::default()).unwrap();
        assert_eq!(descriptor.body, "* No changes");
    }

    #[test]
    fn first_prerelease_run_seeds_suffix_and_marker() {
        let config = Config {
            prerelease: true,
            prerelease_identifier: Some("beta".into()),
            ..Config::default()
        };
        let mut snap = snapshot(
            vec![release("v1.2.0", 0, false, false, "")],
            vec![pull(5, "feature", &["minor"])],
        );
        snap.pr_number = Some(42);

        let descriptor = build_release_info(&snap, &config, &BuildOptions::default()).unwrap();
        assert_eq!(descriptor.tag, "v1.3.0-beta.0");
        assert!(descriptor.prerelease);
        assert!(!descriptor.make_latest);
        assert!(descriptor.body.ends_with("<!-- pr-number: 42 -->"));
        assert!(descriptor.existing_draft_tag.is_none());
    }

    #[test]
    fn second_prerelease_run_increments_suffix() {
        let config = Config {
            prerelease: true,
            prerelease_identifier: Some("beta".into()),
            ..Config::default()
        };
        let draft_body = format!("preview\n\n{}", matcher::marker_for(42));
        let mut snap = snapshot(
            vec![
                release("v1.2.0", 0, false, false, ""),
                release("v1.2.0-beta.3", 1, true, true, &draft_body),
            ],
            vec![pull(5, "feature", &["major"])],
        );
        snap.pr_number = Some(42);

        let descriptor = build_release_info(&snap, &config, &BuildOptions::default()).unwrap();
        // Draft version is authoritative: the major label is ignored.
        assert_eq!(descriptor.tag, "v1.2.0-beta.4");
        assert_eq!(
            descriptor.existing_draft_tag.as_deref(),
            Some("v1.2.0-beta.3")
        );
        assert!(descriptor.body.ends_with("<!-- pr-number: 42 -->"));
    }

    #[test]
    fn malformed_draft_falls_back_to_standard_path() {
        let config = Config {
            prerelease: true,
            prerelease_identifier: Some("beta".into()),
            ..Config::default()
        };
        let draft_body = matcher::marker_for(42);
        let mut snap = snapshot(
            vec![
                release("v1.2.0", 0, false, false, ""),
                release("v1.2.0-nightly", 1, true, true, &draft_body),
            ],
            vec![pull(5, "feature", &["minor"])],
        );
        snap.pr_number = Some(42);

        let descriptor = build_release_info(&snap, &config, &BuildOptions::default()).unwrap();
        // Reconciliation abandoned, standard prerelease resolution instead.
        assert_eq!(descriptor.tag, "v1.3.0-beta.0");
        // The draft is still reported so the caller updates it.
        assert_eq!(
            descriptor.existing_draft_tag.as_deref(),
            Some("v1.2.0-nightly")
        );
    }

    #[test]
    fn no_bump_class_aborts_the_run() {
        let config = Config {
            version_resolver: crate::config::VersionResolverConfig {
                default: None,
                ..Default::default()
            },
            ..Config::default()
        };
        let snap = snapshot(
            vec![release("v1.0.0", 0, false, false, "")],
            vec![pull(1, "unlabeled", &[])],
        );
        let err = build_release_info(&snap, &config, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, BuildError::Version(VersionError::NoBumpClass)));
    }

    #[test]
    fn overrides_render_against_version_tokens() {
        let snap = snapshot(
            vec![release("v1.2.3", 0, false, false, "")],
            vec![pull(1, "fix", &["patch"])],
        );
        let options = BuildOptions {
            tag_override: Some("release/$RESOLVED_VERSION"),
            name_override: Some("Widget $RESOLVED_VERSION"),
        };
        let descriptor = build_release_info(&snap, &Config::default(), &options).unwrap();
        assert_eq!(descriptor.tag, "release/1.2.4");
        assert_eq!(descriptor.name, "Widget 1.2.4");
    }

    #[test]
    fn tag_prefix_is_applied_when_missing() {
        let config = Config {
            tag_prefix: "widget-".into(),
            tag_template: "v$RESOLVED_VERSION".into(),
            ..Config::default()
        };
        let snap = snapshot(
            vec![release("widget-v1.0.0", 0, false, false, "")],
            vec![pull(1, "fix", &["patch"])],
        );
        let descriptor = build_release_info(&snap, &config, &BuildOptions::default()).unwrap();
        assert_eq!(descriptor.tag, "widget-v1.0.1");
    }

    #[test]
    fn header_footer_and_replacers_shape_the_body() {
        let config = Config {
            header: "## What changed\n\n".into(),
            footer: "\n\nSee $PREVIOUS_TAG...$RESOLVED_VERSION".into(),
            replacers: vec![crate::config::ReplacerConfig {
                search: r"JIRA-(\d+)".into(),
                replace: "[JIRA-$1](https://jira.example/browse/JIRA-$1)".into(),
            }],
            ..Config::default()
        };
        let snap = snapshot(
            vec![release("v1.0.0", 0, false, false, "")],
            vec![pull(9, "JIRA-77 fix the flux", &["patch"])],
        );
        let descriptor = build_release_info(&snap, &config, &BuildOptions::default()).unwrap();
        assert!(descriptor.body.starts_with("## What changed"));
        assert!(descriptor
            .body
            .contains("[JIRA-77](https://jira.example/browse/JIRA-77) fix the flux"));
        assert!(descriptor.body.ends_with("See v1.0.0...1.0.1"));
    }

    #[test]
    fn rerun_with_same_snapshot_is_identical() {
        let snap = snapshot(
            vec![release("v1.2.3", 0, false, false, "")],
            vec![pull(1, "fix", &["patch"]), pull(2, "feat", &["minor"])],
        );
        let config = Config::default();
        let first = build_release_info(&snap, &config, &BuildOptions::default()).unwrap();
        let second = build_release_info(&snap, &config, &BuildOptions::default()).unwrap();
        assert_eq!(first, second);
    }
}
