//! Literal `$TOKEN` template substitution with optional regex post-passes.
//!
//! Tokens are replaced longest-name-first so that `$NEXT_MAJOR_VERSION`
//! is never clobbered by a shorter token like `$MAJOR` sharing its prefix.
//! No escaping syntax: a `$NAME` sequence with no matching token is left
//! verbatim.

use std::collections::BTreeMap;

use regex::Regex;
use thiserror::Error;

/// Errors from template rendering.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A configured replacer pattern failed to compile.
    #[error("invalid replacer pattern `{pattern}`: {source}")]
    BadReplacer {
        /// The offending regex source.
        pattern: String,
        /// The compile error from the regex engine.
        source: regex::Error,
    },
}

/// A regex find/replace pass applied after token substitution.
#[derive(Debug, Clone)]
pub struct Replacer {
    /// Regex source to search for.
    pub search: String,
    /// Replacement text; `$1`-style capture references are honored.
    pub replace: String,
}

/// Substitute every `$NAME` token from `tokens` into `template`.
pub fn substitute(template: &str, tokens: &BTreeMap<&str, String>) -> String {
    let mut out = template.to_string();

    // Longest token first, so overlapping names substitute correctly.
    let mut names: Vec<&&str> = tokens.keys().collect();
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    for name in names {
        let needle = format!("${name}");
        if out.contains(&needle) {
            out = out.replace(&needle, &tokens[*name]);
        }
    }

    out
}

/// Render `template` by substituting every `$NAME` token from `tokens`,
/// then applying each replacer pass in order.
pub fn render(
    template: &str,
    tokens: &BTreeMap<&str, String>,
    replacers: &[Replacer],
) -> Result<String, TemplateError> {
    let mut out = substitute(template, tokens);

    for replacer in replacers {
        let re = Regex::new(&replacer.search).map_err(|e| TemplateError::BadReplacer {
            pattern: replacer.search.clone(),
            source: e,
        })?;
        out = re.replace_all(&out, replacer.replace.as_str()).into_owned();
    }

    Ok(out)
}
