//! Detect which GitHub event triggered the workflow run.

use crate::paths;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubEvent {
    PullRequest,
    Push,
    Unknown,
}

impl fmt::Display for GitHubEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PullRequest => "pull_request",
            Self::Push => "push",
            Self::Unknown => "unknown",
        })
    }
}

/// Event type from the payload named by `GITHUB_EVENT_PATH`; unknown when unset
pub fn detect_event_type_from_env() -> Result<GitHubEvent> {
    match std::env::var_os(paths::matrix::GITHUB_EVENT_PATH_ENV) {
        Some(path) if !path.is_empty() => {
            let path = Path::new(&path);
            tracing::info!("Using GitHub event payload file {}", path.display());
            detect_event_type(path)
                .with_context(|| format!("Failed to read GitHub event {}", path.display()))
        }
        _ => {
            tracing::info!("GITHUB_EVENT_PATH is not set so event type is unknown");
            Ok(GitHubEvent::Unknown)
        }
    }
}

/// Event type from a webhook payload file
pub fn detect_event_type(path: &Path) -> Result<GitHubEvent> {
    let data = std::fs::read(path)?;
    let payload: Map<String, Value> =
        serde_json::from_slice(&data).context("event payload is not a JSON object")?;

    Ok(if payload.contains_key("pull_request") {
        GitHubEvent::PullRequest
    } else if payload.contains_key("ref") {
        GitHubEvent::Push
    } else {
        GitHubEvent::Unknown
    })
}
