//! Extension version detection from git.
//!
//! All functions shell out to `git` via `std::process::Command`.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Source control queries the version probe depends on
pub trait SourceControl {
    /// Tags pointing at the current revision, in the order git lists them
    fn tags_at_head(&self) -> Result<Vec<String>>;

    /// Abbreviated hash of the current revision
    fn short_hash(&self) -> Result<String>;
}

/// A git work tree, queried through the `git` binary
#[derive(Debug, Clone)]
pub struct Git {
    work_tree: PathBuf,
}

impl Git {
    pub fn new(work_tree: impl Into<PathBuf>) -> Self {
        Self {
            work_tree: work_tree.into(),
        }
    }

    pub fn current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    /// Run a git command and return its stdout as a trimmed `String`.
    /// Returns an error if the command exits with a non-zero status.
    fn output(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.work_tree)
            .args(args)
            .output()
            .context("failed to execute git")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "git {} failed ({}): {}",
                args.join(" "),
                output.status,
                stderr.trim()
            );
        }

        let stdout = String::from_utf8(output.stdout).context("git output was not valid UTF-8")?;
        Ok(stdout.trim().to_string())
    }
}

impl SourceControl for Git {
    fn tags_at_head(&self) -> Result<Vec<String>> {
        let out = self.output(&["tag", "--points-at", "HEAD"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn short_hash(&self) -> Result<String> {
        self.output(&["--no-pager", "log", "-1", "--format=%h"])
    }
}

/// The extension version: an exact tag at HEAD, else the short commit hash.
///
/// With several tags on HEAD the first one git lists wins.
pub fn detect_extension_version(scm: &impl SourceControl) -> Result<String> {
    let tags = scm.tags_at_head().context("failed to list tags at HEAD")?;
    if let Some(tag) = tags.into_iter().next() {
        tracing::debug!("Using tag {} as extension version", tag);
        return Ok(tag);
    }

    let hash = scm.short_hash().context("failed to read the HEAD commit hash")?;
    if hash.is_empty() {
        bail!("git reported an empty commit hash for HEAD");
    }
    tracing::debug!("No tag at HEAD, using commit {} as extension version", hash);
    Ok(hash)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct FakeScm {
        pub tags: Vec<&'static str>,
        pub hash: &'static str,
    }

    impl SourceControl for FakeScm {
        fn tags_at_head(&self) -> Result<Vec<String>> {
            Ok(self.tags.iter().map(|t| t.to_string()).collect())
        }

        fn short_hash(&self) -> Result<String> {
            Ok(self.hash.to_string())
        }
    }

    struct BrokenScm;

    impl SourceControl for BrokenScm {
        fn tags_at_head(&self) -> Result<Vec<String>> {
            bail!("not a git repository")
        }

        fn short_hash(&self) -> Result<String> {
            bail!("not a git repository")
        }
    }

    #[test]
    fn test_prefers_tag() {
        let scm = FakeScm { tags: vec!["v1.0.0"], hash: "abc1234" };
        assert_eq!(detect_extension_version(&scm).unwrap(), "v1.0.0");
    }

    #[test]
    fn test_first_of_several_tags() {
        let scm = FakeScm { tags: vec!["v1.0.0", "v1.0.0-rc1"], hash: "abc1234" };
        assert_eq!(detect_extension_version(&scm).unwrap(), "v1.0.0");
    }

    #[test]
    fn test_falls_back_to_hash() {
        let scm = FakeScm { tags: vec![], hash: "abc1234" };
        assert_eq!(detect_extension_version(&scm).unwrap(), "abc1234");
    }

    #[test]
    fn test_empty_hash_is_error() {
        let scm = FakeScm { tags: vec![], hash: "" };
        assert!(detect_extension_version(&scm).is_err());
    }

    #[test]
    fn test_git_failure_is_error() {
        let err = detect_extension_version(&BrokenScm).unwrap_err();
        assert!(format!("{err:#}").contains("not a git repository"));
    }
}
