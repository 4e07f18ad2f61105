//! DuckDB platform detection
//!
//! The authoritative answer comes from DuckDB itself (`PRAGMA platform`).
//! The host source maps the target triple this tool was compiled for, which
//! is useful on CI images that have no DuckDB binary.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::process::Command;

/// Target triple captured by build.rs
pub const BUILD_TARGET: &str = env!("EXTBUILD_TARGET");

/// Default DuckDB CLI binary name
pub const DEFAULT_DUCKDB_BINARY: &str = "duckdb";

/// Something that can report the DuckDB platform identifier
pub trait PlatformQuery {
    fn platform(&self) -> Result<String>;
}

/// Ask a DuckDB CLI binary for `PRAGMA platform`
#[derive(Debug, Clone)]
pub struct DuckdbCli {
    binary: PathBuf,
}

impl DuckdbCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for DuckdbCli {
    fn default() -> Self {
        Self::new(DEFAULT_DUCKDB_BINARY)
    }
}

impl PlatformQuery for DuckdbCli {
    fn platform(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .args(["-noheader", "-list", "-c", "PRAGMA platform"])
            .output()
            .with_context(|| format!("failed to execute {}", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} failed ({}): {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            );
        }

        let stdout = String::from_utf8(output.stdout).context("duckdb output was not valid UTF-8")?;
        let platform = stdout.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
        if platform.is_empty() {
            bail!("{} reported an empty platform", self.binary.display());
        }
        Ok(platform.to_string())
    }
}

/// Derive the platform from a Rust target triple
#[derive(Debug, Clone)]
pub struct HostTarget {
    triple: String,
}

impl HostTarget {
    pub fn new(triple: impl Into<String>) -> Self {
        Self {
            triple: triple.into(),
        }
    }
}

impl Default for HostTarget {
    fn default() -> Self {
        Self::new(BUILD_TARGET)
    }
}

impl PlatformQuery for HostTarget {
    fn platform(&self) -> Result<String> {
        platform_for_target(&self.triple)
            .map(str::to_string)
            .with_context(|| format!("no DuckDB platform known for target {}", self.triple))
    }
}

/// DuckDB platform identifier for a Rust target triple
pub fn platform_for_target(triple: &str) -> Option<&'static str> {
    let parts: Vec<&str> = triple.split('-').collect();
    let arch = match *parts.first()? {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "wasm32" => return wasm_platform(triple),
        _ => return None,
    };
    let has = |segment: &str| parts.iter().any(|p| *p == segment);
    let env = parts.get(3).copied().unwrap_or("");

    if has("linux") {
        return Some(match (arch, env) {
            ("amd64", e) if e.starts_with("musl") => "linux_amd64_musl",
            ("arm64", e) if e.starts_with("musl") => "linux_arm64_musl",
            ("amd64", _) => "linux_amd64",
            _ => "linux_arm64",
        });
    }
    if has("darwin") {
        return Some(if arch == "amd64" { "osx_amd64" } else { "osx_arm64" });
    }
    if has("windows") {
        return Some(match (arch, env) {
            ("amd64", "gnu") | ("amd64", "gnullvm") => "windows_amd64_mingw",
            ("amd64", _) => "windows_amd64",
            _ => "windows_arm64",
        });
    }
    None
}

fn wasm_platform(triple: &str) -> Option<&'static str> {
    triple.ends_with("emscripten").then_some("wasm_mvp")
}
