//! Distribution matrix for extension CI
//!
//! `config/distribution_matrix.json` lists, per platform, every DuckDB
//! architecture an extension can be built for. CI narrows that down to the
//! platforms, architectures and opt-ins of one run and hands the result to
//! GitHub Actions as `<platform>_matrix=<json>` output lines.

pub mod github_event;
pub mod output;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

pub use github_event::{detect_event_type, detect_event_type_from_env, GitHubEvent};
pub use output::{
    render_deploy_output_line, render_deploy_readable_lines, render_output_lines, OutputMode,
};

/// Architecture tokens accepted by the `--arch` filter
pub const VALID_ARCH_TOKENS: &[&str] = &["amd64", "arm64"];

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("invalid distribution matrix: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("at least one platform must be provided")]
    NoPlatforms,

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("unknown arch token: {0} (supported: amd64, arm64)")]
    UnknownArch(String),

    #[error("invalid reduced CI mode: {0:?} (must be auto|enabled|disabled)")]
    InvalidReducedCiMode(String),
}

/// The whole matrix file: platform name to its configuration
pub type MatrixFile = BTreeMap<String, PlatformConfig>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    #[serde(default)]
    pub include: Vec<Entry>,
}

/// One buildable architecture as listed in the matrix file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Entry {
    pub duckdb_arch: String,
    pub runner: Option<String>,
    pub osx_build_arch: Option<String>,
    pub vcpkg_target_triplet: String,
    pub vcpkg_host_triplet: String,

    /// Still built when CI runs in reduced mode (e.g. for pull requests)
    pub run_in_reduced_ci_mode: bool,

    /// Only built when explicitly listed in the opt-in list
    pub opt_in: bool,
}

/// The computed matrix of one platform, as handed to GitHub Actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformMatrix {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PlatformOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformOutput {
    pub duckdb_arch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osx_build_arch: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vcpkg_target_triplet: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vcpkg_host_triplet: String,
}

impl From<&Entry> for PlatformOutput {
    fn from(entry: &Entry) -> Self {
        Self {
            duckdb_arch: entry.duckdb_arch.clone(),
            runner: entry.runner.clone(),
            osx_build_arch: entry.osx_build_arch.clone(),
            vcpkg_target_triplet: entry.vcpkg_target_triplet.clone(),
            vcpkg_host_triplet: entry.vcpkg_host_triplet.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReducedCiMode {
    /// Decided by the GitHub event: enabled for pull requests
    #[default]
    Auto,
    Enabled,
    Disabled,
}

impl ReducedCiMode {
    /// Parse a mode name; the empty string means `auto`
    pub fn parse(raw: &str) -> Result<Self, MatrixError> {
        match raw.trim() {
            "" | "auto" => Ok(Self::Auto),
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            other => Err(MatrixError::InvalidReducedCiMode(other.to_string())),
        }
    }

    /// Resolve `auto` against the event that triggered the run
    pub fn for_event(self, event: GitHubEvent) -> Self {
        match (self, event) {
            (Self::Auto, GitHubEvent::PullRequest) => Self::Enabled,
            (mode, _) => mode,
        }
    }

    fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

/// Filters for one CI run. List fields are `;` or `,` separated.
#[derive(Debug, Clone, Default)]
pub struct ComputeOptions {
    /// Platforms to compute; at least one is required
    pub platform: String,

    /// Architecture tokens; empty means all
    pub arch: String,

    /// `duckdb_arch` values to drop
    pub exclude: String,

    /// `duckdb_arch` values of opt-in entries to build
    pub opt_in: String,

    pub reduced_ci_mode: ReducedCiMode,
}

/// Parse a distribution matrix, rejecting unknown fields
pub fn parse_matrix_file(data: &[u8]) -> Result<MatrixFile, MatrixError> {
    Ok(serde_json::from_slice(data)?)
}

/// Compute the filtered matrix of every selected platform
pub fn compute_platform_matrices(
    matrix: &MatrixFile,
    opts: &ComputeOptions,
) -> Result<BTreeMap<String, PlatformMatrix>, MatrixError> {
    let platforms = normalize_values(split_list(&opts.platform));
    if platforms.is_empty() {
        return Err(MatrixError::NoPlatforms);
    }

    let arch_tokens = normalize_arch_tokens(split_list(&opts.arch))?;
    let exclude: BTreeSet<String> = normalize_values(split_list(&opts.exclude)).into_iter().collect();
    let opt_in: BTreeSet<String> = normalize_values(split_list(&opts.opt_in)).into_iter().collect();
    let reduced = opts.reduced_ci_mode.is_enabled();

    let mut results = BTreeMap::new();
    for platform in platforms {
        let config = matrix
            .get(&platform)
            .ok_or_else(|| MatrixError::UnknownPlatform(platform.clone()))?;

        let mut include: Vec<PlatformOutput> = config
            .include
            .iter()
            .filter(|entry| include_entry(entry, &arch_tokens, &exclude, reduced, &opt_in))
            .map(PlatformOutput::from)
            .collect();
        include.sort_by(|a, b| a.duckdb_arch.cmp(&b.duckdb_arch));

        tracing::debug!("{}: {} of {} entries selected", platform, include.len(), config.include.len());
        results.insert(platform, PlatformMatrix { include });
    }

    Ok(results)
}

fn include_entry(
    entry: &Entry,
    arch_tokens: &BTreeSet<String>,
    exclude: &BTreeSet<String>,
    reduced: bool,
    opt_in: &BTreeSet<String>,
) -> bool {
    let arch = entry.duckdb_arch.as_str();
    if arch.is_empty() || exclude.contains(arch) {
        return false;
    }
    if !arch_tokens.is_empty() && !arch_tokens.iter().any(|t| arch.contains(&format!("_{t}"))) {
        return false;
    }
    if reduced && !entry.run_in_reduced_ci_mode {
        return false;
    }
    !entry.opt_in || opt_in.contains(arch)
}

fn normalize_arch_tokens(tokens: Vec<String>) -> Result<BTreeSet<String>, MatrixError> {
    normalize_values(tokens)
        .into_iter()
        .map(|token| {
            if VALID_ARCH_TOKENS.contains(&token.as_str()) {
                Ok(token)
            } else {
                Err(MatrixError::UnknownArch(token))
            }
        })
        .collect()
}

/// Trim, drop empties and duplicates, keep first-seen order
fn normalize_values(values: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

/// Split a `;` or `,` separated list
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
