//! Centralized Path Definitions
//!
//! File names and default locations shared by the appender, the configure
//! probe and the matrix command, so build scripts and tools agree on them.

use std::path::{Path, PathBuf};

/// Extension artifact naming
pub mod artifact {
    use std::path::PathBuf;

    /// File suffix of a packaged extension
    pub const EXTENSION_SUFFIX: &str = "duckdb_extension";

    /// Default output path: `<extension-name>.duckdb_extension` in the working directory
    pub fn default_output(extension_name: &str) -> PathBuf {
        PathBuf::from(format!("{}.{}", extension_name, EXTENSION_SUFFIX))
    }
}

/// Files written by the configure step
pub mod configure {
    use std::path::{Path, PathBuf};

    /// Default output directory of the configure step
    pub const OUTPUT_DIR: &str = "configure";

    pub const EXTENSION_VERSION_FILE: &str = "extension_version.txt";
    pub const PLATFORM_FILE: &str = "platform.txt";
    pub const DUCKDB_VERSION_MAJOR_FILE: &str = "duckdb_version_major.txt";
    pub const DUCKDB_VERSION_MINOR_FILE: &str = "duckdb_version_minor.txt";
    pub const DUCKDB_VERSION_PATCH_FILE: &str = "duckdb_version_patch.txt";

    pub fn extension_version_file(dir: &Path) -> PathBuf {
        dir.join(EXTENSION_VERSION_FILE)
    }

    pub fn platform_file(dir: &Path) -> PathBuf {
        dir.join(PLATFORM_FILE)
    }

    /// Major, minor and patch files, in that order
    pub fn duckdb_version_files(dir: &Path) -> [PathBuf; 3] {
        [
            dir.join(DUCKDB_VERSION_MAJOR_FILE),
            dir.join(DUCKDB_VERSION_MINOR_FILE),
            dir.join(DUCKDB_VERSION_PATCH_FILE),
        ]
    }
}

/// Distribution matrix locations
pub mod matrix {
    /// Default distribution matrix, relative to the repository root
    pub const DEFAULT_INPUT: &str = "config/distribution_matrix.json";

    /// Environment variable GitHub Actions sets to the event payload file
    pub const GITHUB_EVENT_PATH_ENV: &str = "GITHUB_EVENT_PATH";
}

/// Directory a file should be staged in so a rename onto `path` stays on one filesystem
pub fn staging_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
