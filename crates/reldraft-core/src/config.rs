//! Configuration: resolver settings, templates, and file discovery.
//!
//! The engine takes its entire behavior from one [`Config`] value, passed
//! explicitly into every component — nothing here is ambient or global, so
//! each component stays testable in isolation.
//!
//! # Supported formats
//!
//! TOML (`.toml`), YAML (`.yaml`/`.yml`), and JSON (`.json`).
//!
//! # Config file locations (highest precedence first)
//! - explicit files handed to the loader
//! - `.reldraft.<ext>` / `reldraft.<ext>` in the working directory or a parent
//! - `~/.config/reldraft/config.<ext>` (user config)
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use reldraft_core::config::ConfigLoader;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let config = ConfigLoader::new().with_project_search(&cwd).load().unwrap();
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::template::Replacer;
use crate::version::BumpLevel;

/// The full configuration for a drafting run.
///
/// Every field has a usable default, so an absent config file still
/// produces a working (if plain) release draft.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,

    /// Template for the release name, rendered against version tokens.
    pub name_template: String,
    /// Template for the release tag, rendered against version tokens.
    pub tag_template: String,
    /// Fixed prefix expected on release tags (e.g. `app-` in `app-v1.2.0`).
    ///
    /// Used to filter foreign tags during matching, stripped before semver
    /// parsing, and prepended to the rendered tag when missing.
    pub tag_prefix: String,

    /// Body template; `$CHANGES` expands to the categorized changelog.
    pub template: String,
    /// Text prepended to the rendered body.
    pub header: String,
    /// Text appended to the rendered body.
    pub footer: String,
    /// Template for a category heading; `$TITLE` is the category title.
    pub category_template: String,
    /// Template for one changelog line.
    pub change_template: String,
    /// Characters in change titles to escape (backslash, or `<!---->` for
    /// `@` and `#` to defeat auto-linking). Empty disables escaping.
    pub change_title_escapes: String,
    /// Placeholder body when no changes were merged.
    pub no_changes_template: String,
    /// Placeholder for the contributor sentence when nobody contributed.
    pub no_contributors_template: String,

    /// Changes carrying any of these labels are dropped from both the
    /// changelog and the version scan.
    pub exclude_labels: Vec<String>,
    /// When non-empty, only changes carrying one of these labels are kept.
    pub include_labels: Vec<String>,
    /// Logins never listed in the contributor sentence.
    pub exclude_contributors: Vec<String>,

    /// Branch/commitish releases target; defaults to the snapshot's
    /// default branch when unset.
    pub commitish: Option<String>,
    /// Restrict matching to releases cut from the configured commitish.
    pub filter_by_commitish: bool,
    /// Allow prereleases to serve as the version baseline.
    pub include_pre_releases: bool,
    /// Mark the produced release as a prerelease.
    pub prerelease: bool,
    /// Prerelease identifier (e.g. `beta`); required for the per-change-
    /// request draft workflow.
    pub prerelease_identifier: Option<String>,
    /// Mark the produced release as the latest release.
    pub latest: bool,

    /// Version bump trigger labels.
    pub version_resolver: VersionResolverConfig,
    /// Changelog categories, in render order.
    pub categories: Vec<CategoryConfig>,
    /// Regex find/replace passes applied to the rendered body.
    pub replacers: Vec<ReplacerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_dir: None,
            name_template: "v$RESOLVED_VERSION".into(),
            tag_template: "v$RESOLVED_VERSION".into(),
            tag_prefix: String::new(),
            template: "$CHANGES".into(),
            header: String::new(),
            footer: String::new(),
            category_template: "## $TITLE".into(),
            change_template: "* $TITLE (#$NUMBER) @$AUTHOR".into(),
            change_title_escapes: String::new(),
            no_changes_template: "* No changes".into(),
            no_contributors_template: "No contributors".into(),
            exclude_labels: Vec::new(),
            include_labels: Vec::new(),
            exclude_contributors: Vec::new(),
            commitish: None,
            filter_by_commitish: false,
            include_pre_releases: false,
            prerelease: false,
            prerelease_identifier: None,
            latest: true,
            version_resolver: VersionResolverConfig::default(),
            categories: Vec::new(),
            replacers: Vec::new(),
        }
    }
}

/// Trigger-label lists per bump class, plus the fallback class.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct VersionResolverConfig {
    /// Labels demanding a major bump.
    pub major: BumpTriggers,
    /// Labels demanding a minor bump.
    pub minor: BumpTriggers,
    /// Labels demanding a patch bump.
    pub patch: BumpTriggers,
    /// Bump class when no trigger label is present. `None` makes an
    /// unlabeled change set a fatal error.
    pub default: Option<BumpLevel>,
}

impl Default for VersionResolverConfig {
    fn default() -> Self {
        Self {
            major: BumpTriggers::of(&["major"]),
            minor: BumpTriggers::of(&["minor"]),
            patch: BumpTriggers::of(&["patch"]),
            default: Some(BumpLevel::Patch),
        }
    }
}

/// A list of trigger label names.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BumpTriggers {
    /// Label names, matched verbatim.
    pub labels: Vec<String>,
}

impl BumpTriggers {
    fn of(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(ToString::to_string).collect(),
        }
    }
}

/// One changelog category.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CategoryConfig {
    /// Heading text.
    pub title: String,
    /// Trigger labels. An empty list makes this category the catch-all
    /// for unlabeled/unmatched changes.
    pub labels: Vec<String>,
    /// Collapse the rendered entries behind a disclosure block when the
    /// category holds more than this many changes. `0` means never.
    pub collapse_after: usize,
}

/// A configured regex find/replace pass.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReplacerConfig {
    /// Regex to search for.
    pub search: String,
    /// Replacement text (capture references allowed).
    pub replace: String,
}

impl ReplacerConfig {
    /// Convert into the template engine's replacer form.
    pub fn to_replacer(&self) -> Replacer {
        Replacer {
            search: self.search.clone(),
            replace: self.replace.clone(),
        }
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "reldraft";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from XDG directory.
    include_user_config: bool,
    /// Stop searching when we hit a directory containing this file/dir.
    boundary_marker: Option<String>,
    /// Explicit config files to load (for testing or programmatic use).
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default settings.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Set the starting directory for project config search.
    ///
    /// The loader will walk up from this directory looking for config files.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/reldraft/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Set a boundary marker to stop directory traversal.
    ///
    /// When walking up directories, stop if we find a directory containing
    /// this file or directory name. Default is `.git`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Disable boundary marker (search all the way to filesystem root).
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file to load.
    ///
    /// Files are loaded in order, with later files taking precedence.
    /// Explicit files are loaded after discovered files.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    ///
    /// Precedence (highest to lowest):
    /// 1. Explicit files (in order added via `with_file`)
    /// 2. Project config (closest to search root)
    /// 3. User config (`~/.config/reldraft/config.<ext>`)
    /// 4. Default values
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if self.include_user_config
            && let Some(user_config) = self.find_user_config()
        {
            figment = Self::merge_file(figment, &user_config);
        }

        if let Some(ref root) = self.project_search_root
            && let Some(project_config) = self.find_project_config(root)
        {
            figment = Self::merge_file(figment, &project_config);
        }

        for file in &self.explicit_files {
            figment = Self::merge_file(figment, file);
        }

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::debug!(
            log_level = config.log_level.as_str(),
            categories = config.categories.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration, returning an error if no config file is found.
    pub fn load_or_error(self) -> ConfigResult<Config> {
        let has_user = self.include_user_config && self.find_user_config().is_some();
        let has_project = self
            .project_search_root
            .as_ref()
            .and_then(|root| self.find_project_config(root))
            .is_some();
        let has_explicit = !self.explicit_files.is_empty();

        if !has_user && !has_project && !has_explicit {
            return Err(ConfigError::NotFound);
        }

        self.load()
    }

    /// Find project config by walking up from the given directory.
    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            for ext in CONFIG_EXTENSIONS {
                let dotfile = dir.join(format!(".{APP_NAME}.{ext}"));
                if dotfile.is_file() {
                    return Some(dotfile);
                }

                let regular = dir.join(format!("{APP_NAME}.{ext}"));
                if regular.is_file() {
                    return Some(regular);
                }
            }

            // The boundary directory itself is scanned; its parents are not.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
            {
                break;
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        None
    }

    /// Find user config in XDG config directory.
    fn find_user_config(&self) -> Option<Utf8PathBuf> {
        let config_dir = user_config_dir()?;

        for ext in CONFIG_EXTENSIONS {
            let config_path = config_dir.join(format!("config.{ext}"));
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        None
    }

    /// Merge a config file into the figment, detecting format from extension.
    fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
        match path.extension() {
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
            Some("json") => figment.merge(Json::file_exact(path.as_str())),
            _ => figment.merge(Toml::file_exact(path.as_str())),
        }
    }
}

/// Find the project config file for `start`, walking parent directories.
///
/// Discovery only — nothing is loaded. Honors the default `.git` boundary,
/// so diagnostics report exactly what [`ConfigLoader::load`] would pick up.
pub fn find_project_config(start: &Utf8Path) -> Option<Utf8PathBuf> {
    ConfigLoader::new().find_project_config(start)
}

/// Get the project directories for XDG-compliant path resolution.
///
/// Returns `None` if the home directory cannot be determined.
fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Get the user config directory path.
///
/// Returns `~/.config/reldraft/` on Linux, `~/Library/Application Support/reldraft/`
/// on macOS, and equivalent on other platforms.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}

/// Get the local data directory path (machine-specific, not synced).
///
/// Returns `~/.local/share/reldraft/` on Linux and equivalent elsewhere.
pub fn user_data_local_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.data_local_dir().to_path_buf()).ok()
}
