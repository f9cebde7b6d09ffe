//! Core library for reldraft.
//!
//! This crate is the release computation engine used by the `reldraft`
//! CLI and any downstream consumers: given the existing releases and the
//! changes merged since the last one, it resolves the next semantic
//! version, renders a categorized changelog, and produces a release
//! descriptor ready for a publishing layer.
//!
//! The engine is synchronous and performs no network I/O; all input is
//! materialized up front in a [`model::Snapshot`].
//!
//! # Modules
//!
//! - [`builder`] - Release descriptor assembly (the orchestrator)
//! - [`changelog`] - Change filtering, categorization, markdown rendering
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`matcher`] - Baseline and change-request draft selection
//! - [`model`] - Input data model (releases, pull requests, snapshot)
//! - [`template`] - `$TOKEN` substitution and replacer passes
//! - [`version`] - Version resolution and prerelease reconciliation
//!
//! # Quick Start
//!
//! ```
//! use reldraft_core::builder::{BuildOptions, build_release_info};
//! use reldraft_core::{Config, model::Snapshot};
//!
//! let snapshot: Snapshot =
//!     serde_json::from_str(r#"{"owner": "acme", "repo": "widget"}"#).unwrap();
//! let descriptor =
//!     build_release_info(&snapshot, &Config::default(), &BuildOptions::default()).unwrap();
//! assert_eq!(descriptor.body, "* No changes");
//! ```
#![deny(unsafe_code)]

pub mod builder;

pub mod changelog;

pub mod config;

pub mod error;

pub mod matcher;

pub mod model;

pub mod template;

pub mod version;

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult};

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;
