//! Error types for building and reading extension artifacts.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by the metadata and append modules
pub type Result<T, E = MetadataError> = std::result::Result<T, E>;

/// Everything that can go wrong while producing or reading an extension artifact.
///
/// None of these are retried: the caller fixes the input and runs again.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A required input is missing, or mutually exclusive inputs were both given
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An input file (library, platform file, version file) could not be read
    #[error("failed to read {what} from {}: {source}", path.display())]
    InputIo {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A value file was readable but held nothing after trimming
    #[error("{what} file is empty: {}", path.display())]
    EmptyInput { what: &'static str, path: PathBuf },

    /// A field value does not fit the fixed 32-byte ASCII slot
    #[error("cannot encode field {field}: {reason}")]
    Encoding { field: &'static str, reason: String },

    /// The destination could not be written or the final rename failed
    #[error("failed to write {}: {source}", path.display())]
    OutputIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The trailing bytes of a file are not an extension metadata footer
    #[error("invalid extension footer: {0}")]
    InvalidFooter(String),
}

impl MetadataError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::OutputIo {
            path: path.into(),
            source,
        }
    }
}
