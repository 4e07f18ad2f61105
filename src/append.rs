//! Extension Packaging - append the metadata footer to a raw shared library
//!
//! The library is copied verbatim into a staged file next to the output,
//! the footer is written after it, and the result is renamed into place.
//! All inputs are resolved and validated before anything is created, so a
//! configuration or encoding error never leaves a file behind.

use crate::error::{MetadataError, Result};
use crate::input::ValueSource;
use crate::metadata::{ExtensionMetadata, DEFAULT_ABI_TYPE, FOOTER_LEN};
use crate::paths;
use crate::publish::StagedFile;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// Everything needed to package one extension
#[derive(Debug, Clone)]
pub struct AppendRequest {
    /// Path to the raw shared library
    pub library_file: PathBuf,

    /// Extension name, used for the default output file name
    pub extension_name: String,

    /// Explicit output path (default: `<extension_name>.duckdb_extension`)
    pub output: Option<PathBuf>,

    pub platform: ValueSource,

    /// DuckDB version, or C API version depending on the ABI type
    pub duckdb_version: String,

    pub extension_version: ValueSource,

    pub abi_type: String,
}

impl AppendRequest {
    pub fn new(
        library_file: impl Into<PathBuf>,
        extension_name: impl Into<String>,
        platform: ValueSource,
        duckdb_version: impl Into<String>,
        extension_version: ValueSource,
    ) -> Self {
        Self {
            library_file: library_file.into(),
            extension_name: extension_name.into(),
            output: None,
            platform,
            duckdb_version: duckdb_version.into(),
            extension_version,
            abi_type: DEFAULT_ABI_TYPE.to_string(),
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_abi_type(mut self, abi_type: impl Into<String>) -> Self {
        self.abi_type = abi_type.into();
        self
    }

    /// Path the artifact will be written to
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => paths::artifact::default_output(&self.extension_name),
        }
    }

    /// Resolve the value sources into the metadata to encode
    pub fn resolve_metadata(&self) -> Result<ExtensionMetadata> {
        if self.extension_name.trim().is_empty() {
            return Err(MetadataError::configuration("the extension name must not be empty"));
        }
        if self.duckdb_version.trim().is_empty() {
            return Err(MetadataError::configuration("the DuckDB version must not be empty"));
        }

        let platform = self.platform.resolve("platform")?;
        let extension_version = self.extension_version.resolve("extension version")?;

        let metadata = ExtensionMetadata::new(platform, &self.duckdb_version, extension_version)
            .with_abi_type(&self.abi_type);
        metadata.validate()?;
        Ok(metadata)
    }
}

/// What was written by [`append_metadata`]
#[derive(Debug, Clone)]
pub struct AppendReport {
    pub output: PathBuf,
    pub metadata: ExtensionMetadata,

    /// Size of the raw library
    pub library_len: u64,

    /// Size of the published artifact
    pub total_len: u64,

    /// SHA256 of the published artifact, hex encoded
    pub sha256: String,
}

/// Package the library described by `request` into an extension artifact
pub fn append_metadata(request: &AppendRequest) -> Result<AppendReport> {
    let metadata = request.resolve_metadata()?;
    let footer = metadata.encode_footer()?;
    let output = request.output_path();

    let library = File::open(&request.library_file).map_err(|source| library_error(request, source))?;
    let library_meta = library
        .metadata()
        .map_err(|source| library_error(request, source))?;
    if !library_meta.is_file() {
        return Err(library_error(
            request,
            io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    tracing::info!(
        "Packaging {} from {} into {}",
        request.extension_name,
        request.library_file.display(),
        output.display()
    );

    let mut staged = StagedFile::create(&output)?;
    let mut hasher = Sha256::new();

    let library_len = copy_hashed(
        &mut BufReader::new(library),
        staged.file(),
        &mut hasher,
    )
    .map_err(|e| match e {
        CopyError::Read(source) => library_error(request, source),
        CopyError::Write(source) => MetadataError::output(&output, source),
    })?;

    staged.write_all(&footer)?;
    hasher.update(&footer);

    let output = staged.commit()?;
    let total_len = library_len + FOOTER_LEN as u64;

    tracing::debug!("Published {} ({} bytes)", output.display(), total_len);

    Ok(AppendReport {
        output,
        metadata,
        library_len,
        total_len,
        sha256: hex::encode(hasher.finalize()),
    })
}

fn library_error(request: &AppendRequest, source: io::Error) -> MetadataError {
    MetadataError::InputIo {
        what: "library",
        path: request.library_file.clone(),
        source,
    }
}

enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

/// Copy `reader` into `writer`, feeding every byte to `hasher`
fn copy_hashed(
    reader: &mut impl Read,
    writer: &mut impl Write,
    hasher: &mut Sha256,
) -> std::result::Result<u64, CopyError> {
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        hasher.update(&buf[..n]);
        total += n as u64;
    }
}

/// Read the footer back from a packaged extension
pub fn read_footer(path: &Path) -> Result<crate::metadata::ExtensionFooter> {
    let bytes = std::fs::read(path).map_err(|source| MetadataError::InputIo {
        what: "extension",
        path: path.to_path_buf(),
        source,
    })?;
    crate::metadata::ExtensionFooter::parse(&bytes)
}
