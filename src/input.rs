//! Values that come either literally from the command line or from a file
//! written by an earlier build step.

use crate::error::{MetadataError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Where a metadata value comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Given directly, e.g. `--duckdb-platform linux_amd64`
    Literal(String),

    /// Read from a file; surrounding whitespace is trimmed
    File(PathBuf),
}

impl ValueSource {
    /// Pick the source from a literal/file option pair.
    ///
    /// Exactly one of the two must be present. `what` names the value in
    /// error messages, `flags` names the two options (e.g. `["--duckdb-platform", "--duckdb-platform-file"]`).
    pub fn from_options(
        what: &'static str,
        flags: [&str; 2],
        literal: Option<String>,
        file: Option<PathBuf>,
    ) -> Result<Self> {
        match (literal, file) {
            (Some(value), None) => Ok(Self::Literal(value)),
            (None, Some(path)) => Ok(Self::File(path)),
            (Some(_), Some(_)) => Err(MetadataError::configuration(format!(
                "both {} and {} given for the {what}, please specify only one",
                flags[0], flags[1]
            ))),
            (None, None) => Err(MetadataError::configuration(format!(
                "neither {} nor {} found, please specify the {what} using either",
                flags[0], flags[1]
            ))),
        }
    }

    /// Resolve to the plain value, failing on empty results
    pub fn resolve(&self, what: &'static str) -> Result<String> {
        match self {
            Self::Literal(value) => {
                if value.trim().is_empty() {
                    return Err(MetadataError::configuration(format!(
                        "the {what} must not be empty"
                    )));
                }
                Ok(value.clone())
            }
            Self::File(path) => read_value_file(what, path),
        }
    }
}

fn read_value_file(what: &'static str, path: &Path) -> Result<String> {
    let contents = fs::read_to_string(path).map_err(|source| MetadataError::InputIo {
        what,
        path: path.to_path_buf(),
        source,
    })?;

    let value = contents.trim();
    if value.is_empty() {
        return Err(MetadataError::EmptyInput {
            what,
            path: path.to_path_buf(),
        });
    }

    tracing::debug!("Read {} {:?} from {}", what, value, path.display());
    Ok(value.to_string())
}
