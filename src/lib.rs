//! extbuild - build tooling for loadable DuckDB extensions
//!
//! This library provides:
//! - The extension metadata footer (layout, encoding, reading back)
//! - Atomic packaging of a raw shared library into a `.duckdb_extension`
//! - The configure probe (extension version, platform, version components)
//! - Distribution matrix computation for CI

pub mod append;
pub mod cli;
pub mod distmatrix;
pub mod error;
pub mod input;
pub mod metadata;
pub mod paths;
pub mod probe;
pub mod publish;
pub mod varint;

pub use append::{append_metadata, read_footer, AppendReport, AppendRequest};
pub use error::MetadataError;
pub use input::ValueSource;
pub use metadata::{ExtensionFooter, ExtensionMetadata, FOOTER_LEN};
