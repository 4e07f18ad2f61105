//! Configure step: capture build facts into small text files
//!
//! Each fact is written as the exact string, without a trailing newline, to
//! a well-known file in the output directory (see [`crate::paths::configure`]).
//! Build scripts later hand those files to the metadata appender.

pub mod git;
pub mod platform;
pub mod version;

use crate::paths;
use crate::publish;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub use git::{detect_extension_version, Git, SourceControl};
pub use platform::{platform_for_target, DuckdbCli, HostTarget, PlatformQuery};
pub use version::{parse_semantic_version, version_components, VersionParts};

/// Which facts to write
#[derive(Debug, Clone, Default)]
pub struct ConfigureOptions {
    pub output_dir: PathBuf,
    pub extension_version: bool,
    pub platform: bool,

    /// DuckDB version to split into major/minor/patch files
    pub duckdb_version: Option<String>,
}

/// A fact that was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFact {
    pub path: PathBuf,
    pub value: String,
}

/// Write the requested facts, creating the output directory if needed
pub fn run_configure(
    opts: &ConfigureOptions,
    scm: &impl SourceControl,
    platform: &dyn PlatformQuery,
) -> Result<Vec<WrittenFact>> {
    fs::create_dir_all(&opts.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", opts.output_dir.display())
    })?;

    let mut written = Vec::new();

    if opts.extension_version {
        let version = detect_extension_version(scm)?;
        let path = paths::configure::extension_version_file(&opts.output_dir);
        written.push(write_fact(&path, &version)?);
    }

    if opts.platform {
        let value = platform.platform().context("Failed to detect the DuckDB platform")?;
        let path = paths::configure::platform_file(&opts.output_dir);
        written.push(write_fact(&path, &value)?);
    }

    if let Some(raw) = &opts.duckdb_version {
        let files = paths::configure::duckdb_version_files(&opts.output_dir);
        for (path, value) in files.iter().zip(version_components(raw)) {
            written.push(write_fact(path, &value)?);
        }
    }

    Ok(written)
}

/// Atomically write one fact file
pub fn write_fact(path: &Path, value: &str) -> Result<WrittenFact> {
    publish::write_atomic(path, value.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!("Wrote {:?} to {}", value, path.display());
    Ok(WrittenFact {
        path: path.to_path_buf(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::git::tests::FakeScm;
    use super::*;

    struct FixedPlatform(&'static str);

    impl PlatformQuery for FixedPlatform {
        fn platform(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn options(dir: &Path) -> ConfigureOptions {
        ConfigureOptions {
            output_dir: dir.join("configure"),
            ..Default::default()
        }
    }

    #[test]
    fn test_writes_version_and_platform() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ConfigureOptions {
            extension_version: true,
            platform: true,
            ..options(dir.path())
        };
        let scm = FakeScm { tags: vec![], hash: "3f2a1bc" };

        let written = run_configure(&opts, &scm, &FixedPlatform("linux_amd64")).unwrap();

        assert_eq!(written.len(), 2);
        let out = dir.path().join("configure");
        assert_eq!(fs::read_to_string(out.join("extension_version.txt")).unwrap(), "3f2a1bc");
        assert_eq!(fs::read_to_string(out.join("platform.txt")).unwrap(), "linux_amd64");
    }

    #[test]
    fn test_nothing_requested_only_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let scm = FakeScm { tags: vec!["v1.0.0"], hash: "abc" };

        let written = run_configure(&opts, &scm, &FixedPlatform("osx_arm64")).unwrap();

        assert!(written.is_empty());
        assert!(opts.output_dir.is_dir());
        assert_eq!(fs::read_dir(&opts.output_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_duckdb_version_components() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ConfigureOptions {
            duckdb_version: Some("v1.2.3".to_string()),
            ..options(dir.path())
        };
        let scm = FakeScm { tags: vec![], hash: "abc" };

        run_configure(&opts, &scm, &FixedPlatform("x")).unwrap();

        let read = |name: &str| fs::read_to_string(opts.output_dir.join(name)).unwrap();
        assert_eq!(read("duckdb_version_major.txt"), "1");
        assert_eq!(read("duckdb_version_minor.txt"), "2");
        assert_eq!(read("duckdb_version_patch.txt"), "3");
    }

    #[test]
    fn test_unparseable_duckdb_version_writes_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ConfigureOptions {
            duckdb_version: Some("main".to_string()),
            ..options(dir.path())
        };
        let scm = FakeScm { tags: vec![], hash: "abc" };

        let written = run_configure(&opts, &scm, &FixedPlatform("x")).unwrap();

        assert_eq!(written.len(), 3);
        for fact in written {
            assert_eq!(fs::read_to_string(&fact.path).unwrap(), "");
        }
    }

    #[test]
    fn test_platform_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ConfigureOptions {
            platform: true,
            ..options(dir.path())
        };
        let scm = FakeScm { tags: vec![], hash: "abc" };

        let err = run_configure(&opts, &scm, &HostTarget::new("mips-unknown-linux-gnu"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("DuckDB platform"));
        assert!(!opts.output_dir.join("platform.txt").exists());
    }
}
