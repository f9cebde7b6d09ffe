//! Changelog assembly: filtering, categorization, and markdown rendering.
//!
//! The exclude/include label filter lives here and is shared with the
//! version scan — a change hidden from the changelog never influences the
//! version bump, and vice versa. Categorization may place one change in
//! several categories when its labels intersect several trigger sets;
//! that duplication is intentional.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::Config;
use crate::model::{Commit, PullRequest, User};
use crate::template;

/// Author name substituted when a change has no resolvable author.
pub const GHOST_AUTHOR: &str = "ghost";

/// Apply the exclude/include label filters to the merged change list.
///
/// The returned references feed both the changelog and the version-bump
/// scan, so the two always see the same set.
pub fn filter_changes<'a>(pulls: &'a [PullRequest], config: &Config) -> Vec<&'a PullRequest> {
    let filtered: Vec<&PullRequest> = pulls
        .iter()
        .filter(|pr| !pr.has_any_label(&config.exclude_labels))
        .filter(|pr| config.include_labels.is_empty() || pr.has_any_label(&config.include_labels))
        .collect();
    debug!(total = pulls.len(), kept = filtered.len(), "filtered changes");
    filtered
}

/// Render the categorized changelog body.
///
/// With zero merged changes this is exactly the configured no-changes
/// placeholder; categorization does not run at all.
pub fn render_changelog(changes: &[&PullRequest], config: &Config) -> String {
    if changes.is_empty() {
        return config.no_changes_template.clone();
    }

    // Deterministic entry order regardless of fetch order.
    let mut ordered: Vec<&PullRequest> = changes.to_vec();
    ordered.sort_by(|a, b| a.merged_at.cmp(&b.merged_at).then(a.number.cmp(&b.number)));

    let (uncategorized, buckets) = categorize(&ordered, config);

    let mut blocks: Vec<String> = Vec::new();
    if !uncategorized.is_empty() {
        blocks.push(render_lines(&uncategorized, config));
    }
    for (category, members) in buckets {
        if members.is_empty() {
            continue;
        }
        let mut heading_tokens = std::collections::BTreeMap::new();
        heading_tokens.insert("TITLE", category.title.clone());
        let heading = template::substitute(&config.category_template, &heading_tokens);

        let lines = render_lines(&members, config);
        let body = if category.collapse_after > 0 && members.len() > category.collapse_after {
            collapse(&lines, members.len())
        } else {
            lines
        };
        blocks.push(format!("{heading}\n\n{body}"));
    }

    blocks.join("\n\n").trim_end().to_string()
}

/// Split the filtered changes into the uncategorized bucket and one bucket
/// per configured category, preserving configured category order.
///
/// A category configured with an empty trigger set absorbs the changes
/// that match nothing; otherwise those land in the untitled bucket that
/// renders before any category.
fn categorize<'a, 'c>(
    changes: &[&'a PullRequest],
    config: &'c Config,
) -> (
    Vec<&'a PullRequest>,
    Vec<(&'c crate::config::CategoryConfig, Vec<&'a PullRequest>)>,
) {
    let mut uncategorized: Vec<&PullRequest> = Vec::new();
    let mut buckets: Vec<Vec<&PullRequest>> = vec![Vec::new(); config.categories.len()];
    let catch_all = config.categories.iter().position(|c| c.labels.is_empty());

    for &pr in changes {
        let mut matched = false;
        for (idx, category) in config.categories.iter().enumerate() {
            if !category.labels.is_empty() && pr.has_any_label(&category.labels) {
                buckets[idx].push(pr);
                matched = true;
            }
        }
        if !matched {
            match catch_all {
                Some(idx) => buckets[idx].push(pr),
                None => uncategorized.push(pr),
            }
        }
    }

    let buckets = config.categories.iter().zip(buckets).collect();
    (uncategorized, buckets)
}

/// Render one line per change and join them.
fn render_lines(changes: &[&PullRequest], config: &Config) -> String {
    changes
        .iter()
        .map(|pr| render_change(pr, config))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a single change through the configured change template.
fn render_change(pr: &PullRequest, config: &Config) -> String {
    let mut tokens = std::collections::BTreeMap::new();
    tokens.insert(
        "TITLE",
        escape_title(&pr.title, &config.change_title_escapes),
    );
    tokens.insert("NUMBER", pr.number.to_string());
    tokens.insert("AUTHOR", author_name(pr.author.as_ref()));
    tokens.insert("BODY", pr.body.clone());
    tokens.insert("URL", pr.url.clone().unwrap_or_default());
    tokens.insert("BASE_REF_NAME", pr.base_ref_name.clone());
    tokens.insert("HEAD_REF_NAME", pr.head_ref_name.clone());
    template::substitute(&config.change_template, &tokens)
}

/// `$AUTHOR` value for a change line.
fn author_name(author: Option<&User>) -> String {
    match author {
        None => GHOST_AUTHOR.to_string(),
        Some(user) if user.is_bot() => bot_link(user),
        Some(user) => user.login.clone(),
    }
}

/// A bot author renders as a link with a `[bot]` suffix (plain text when
/// the snapshot carries no profile URL).
fn bot_link(user: &User) -> String {
    match user.url {
        Some(ref url) => format!("[{}[bot]]({url})", user.login),
        None => format!("{}[bot]", user.login),
    }
}

/// Escape a change title for markdown rendering.
///
/// Each character in `escapes` is backslash-escaped, except `@` and `#`
/// which are followed by a zero-width HTML comment instead, defeating
/// mention and issue-reference auto-linking without altering the visible
/// text. Backtick-delimited code spans pass through verbatim.
pub fn escape_title(title: &str, escapes: &str) -> String {
    if escapes.is_empty() {
        return title.to_string();
    }

    let chars: Vec<char> = title.chars().collect();
    let mut out = String::with_capacity(title.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '`'
            && let Some(span) = chars[i + 1..].iter().position(|&x| x == '`')
        {
            // Inline code span, copied untouched including both backticks.
            let end = i + 1 + span;
            out.extend(&chars[i..=end]);
            i = end + 1;
            continue;
        }
        if escapes.contains(c) {
            if c == '@' || c == '#' {
                out.push(c);
                out.push_str("<!---->");
            } else {
                out.push('\\');
                out.push(c);
            }
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}

/// Wrap rendered entries in a disclosure block labeled with the count.
fn collapse(lines: &str, count: usize) -> String {
    format!("<details>\n<summary>{count} changes</summary>\n\n{lines}\n</details>")
}

/// Build the contributor sentence from commit and pull-request authors.
///
/// Unique contributors, lexicographically sorted, joined as
/// `"a, b and c"`. Bot authors render as links with a `[bot]` suffix;
/// configured logins are excluded entirely.
pub fn contributors_sentence(
    commits: &[Commit],
    pulls: &[&PullRequest],
    config: &Config,
) -> String {
    let excluded = |login: &str| config.exclude_contributors.iter().any(|e| e == login);
    let mut contributors: BTreeSet<String> = BTreeSet::new();

    for commit in commits {
        match (&commit.author, &commit.author_name) {
            (Some(user), _) if !excluded(&user.login) => {
                contributors.insert(contributor_name(user));
            }
            (None, Some(name)) if !excluded(name) => {
                contributors.insert(name.clone());
            }
            _ => {}
        }
    }
    for pr in pulls {
        if let Some(ref user) = pr.author
            && !excluded(&user.login)
        {
            contributors.insert(contributor_name(user));
        }
    }

    let sorted: Vec<String> = contributors.into_iter().collect();
    match sorted.len() {
        0 => config.no_contributors_template.clone(),
        1 => sorted[0].clone(),
        n => format!("{} and {}", sorted[..n - 1].join(", "), sorted[n - 1]),
    }
}

fn contributor_name(user: &User) -> String {
    if user.is_bot() {
        bot_link(user)
    } else {
        format!("@{}", user.login)
    }
}
