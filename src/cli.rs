//! Command-line arguments shared by the `extbuild` subcommands and the
//! standalone `append-extension-metadata` / `configure-helper` binaries.

use crate::append::{AppendReport, AppendRequest};
use crate::error::MetadataError;
use crate::input::ValueSource;
use crate::metadata::DEFAULT_ABI_TYPE;
use crate::paths;
use crate::probe::{self, ConfigureOptions, DuckdbCli, Git, HostTarget, PlatformQuery, WrittenFact};
use anyhow::Result;
use clap::{Args, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Two-letter short flags used by existing build scripts, and their long forms
const SCRIPT_SHORT_FLAGS: &[(&str, &str)] = &[
    ("-pf", "--duckdb-platform-file"),
    ("-dv", "--duckdb-version"),
    ("-ev", "--extension-version"),
    ("-evf", "--extension-version-file"),
];

/// Rewrite `-pf`, `-dv`, `-ev` and `-evf` (also in `-dv=v1.2.0` form) to their
/// long flags so clap accepts command lines written for the build scripts.
/// Arguments after `--` are passed through untouched.
pub fn expand_script_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut expanded = Vec::new();
    let mut verbatim = false;
    for arg in args {
        let arg: OsString = arg.into();
        if verbatim {
            expanded.push(arg);
            continue;
        }
        if arg == "--" {
            verbatim = true;
            expanded.push(arg);
            continue;
        }
        let long = arg.to_str().and_then(expand_script_flag);
        expanded.push(long.map(OsString::from).unwrap_or(arg));
    }
    expanded
}

fn expand_script_flag(arg: &str) -> Option<String> {
    let (flag, value) = match arg.split_once('=') {
        Some((flag, value)) => (flag, Some(value)),
        None => (arg, None),
    };
    let (_, long) = SCRIPT_SHORT_FLAGS.iter().find(|(short, _)| *short == flag)?;
    Some(match value {
        Some(value) => format!("{long}={value}"),
        None => long.to_string(),
    })
}

/// Options controlling console output
#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub silent: bool,

    /// Verbose output
    #[arg(short, long, global = true, conflicts_with = "silent")]
    pub verbose: bool,
}

impl LogArgs {
    /// Install the tracing subscriber; `RUST_LOG` overrides the level
    pub fn init(&self) {
        let level = if self.silent {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let _ = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }
}

/// Append extension metadata to a loadable DuckDB extension
#[derive(Args, Debug, Clone)]
pub struct AppendMetadataArgs {
    /// Path to the raw shared library
    #[arg(short = 'l', long)]
    pub library_file: PathBuf,

    /// Extension name to use
    #[arg(short = 'n', long)]
    pub extension_name: String,

    /// Explicit path for the output file (default: <extension-name>.duckdb_extension)
    #[arg(short = 'o', long)]
    pub out_file: Option<PathBuf>,

    /// The DuckDB platform to encode
    #[arg(short = 'p', long)]
    pub duckdb_platform: Option<String>,

    /// The file containing the DuckDB platform to encode
    #[arg(long, alias = "pf")]
    pub duckdb_platform_file: Option<PathBuf>,

    /// The DuckDB version to encode; depending on the ABI type this is the
    /// DuckDB version or the C API version
    #[arg(long, alias = "dv")]
    pub duckdb_version: String,

    /// The extension version to encode
    #[arg(long, alias = "ev")]
    pub extension_version: Option<String>,

    /// The file containing the extension version to encode
    #[arg(long, alias = "evf")]
    pub extension_version_file: Option<PathBuf>,

    /// The ABI type to encode
    #[arg(long, default_value = DEFAULT_ABI_TYPE)]
    pub abi_type: String,
}

impl AppendMetadataArgs {
    /// Turn the flags into a request, enforcing the one-of rules
    pub fn into_request(self) -> Result<AppendRequest, MetadataError> {
        let platform = ValueSource::from_options(
            "platform",
            ["--duckdb-platform", "--duckdb-platform-file"],
            self.duckdb_platform,
            self.duckdb_platform_file,
        )?;
        let extension_version = ValueSource::from_options(
            "extension version",
            ["--extension-version", "--extension-version-file"],
            self.extension_version,
            self.extension_version_file,
        )?;

        let mut request = AppendRequest::new(
            self.library_file,
            self.extension_name,
            platform,
            self.duckdb_version,
            extension_version,
        )
        .with_abi_type(self.abi_type);
        request.output = self.out_file;
        Ok(request)
    }
}

/// Print what was packaged, in the order the fields sit in the footer
pub fn print_append_report(request: &AppendRequest, report: &AppendReport) {
    let meta = &report.metadata;
    println!("Creating extension binary:");
    println!(" - Input file: {}", request.library_file.display());
    println!(" - Output file: {}", report.output.display());
    println!(" - Metadata:");
    println!("   - FIELD8 (unused)            = EMPTY");
    println!("   - FIELD7 (unused)            = EMPTY");
    println!("   - FIELD6 (unused)            = EMPTY");
    println!("   - FIELD5 (abi_type)          = {}", meta.abi_type);
    println!("   - FIELD4 (extension_version) = {}", meta.extension_version);
    println!("   - FIELD3 (duckdb_version)    = {}", meta.duckdb_version);
    println!("   - FIELD2 (duckdb_platform)   = {}", meta.duckdb_platform);
    println!("   - FIELD1 (header signature)  = 4 (special value to identify a duckdb extension)");
    println!(" - Size: {} bytes ({} library + footer)", report.total_len, report.library_len);
    println!(" - SHA256: {}", report.sha256);
}

/// Where the DuckDB platform is read from
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlatformSource {
    /// Ask the DuckDB CLI (`PRAGMA platform`)
    #[default]
    Duckdb,
    /// Map the target triple this tool was built for
    Host,
}

/// Write auto-detected build facts for the extension build
#[derive(Args, Debug, Clone)]
pub struct ConfigureArgs {
    /// Output directory for the fact files
    #[arg(short = 'o', long, default_value = paths::configure::OUTPUT_DIR)]
    pub output_directory: PathBuf,

    /// Write the auto-detected extension version
    #[arg(long, alias = "ev")]
    pub extension_version: bool,

    /// Write the auto-detected DuckDB platform
    #[arg(short = 'p', long)]
    pub duckdb_platform: bool,

    /// Split this DuckDB version into major/minor/patch files
    #[arg(long, value_name = "VERSION")]
    pub duckdb_version: Option<String>,

    /// How to detect the platform
    #[arg(long, value_enum, default_value_t = PlatformSource::Duckdb)]
    pub platform_source: PlatformSource,

    /// DuckDB CLI used for platform detection
    #[arg(long, env = "DUCKDB_BINARY", default_value = probe::platform::DEFAULT_DUCKDB_BINARY)]
    pub duckdb_binary: PathBuf,
}

impl ConfigureArgs {
    pub fn options(&self) -> ConfigureOptions {
        ConfigureOptions {
            output_dir: self.output_directory.clone(),
            extension_version: self.extension_version,
            platform: self.duckdb_platform,
            duckdb_version: self.duckdb_version.clone(),
        }
    }

    pub fn platform_query(&self) -> Box<dyn PlatformQuery> {
        match self.platform_source {
            PlatformSource::Duckdb => Box::new(DuckdbCli::new(&self.duckdb_binary)),
            PlatformSource::Host => Box::new(HostTarget::default()),
        }
    }

    /// Run the configure step in the current git work tree
    pub fn run(&self) -> Result<Vec<WrittenFact>> {
        let git = Git::current_dir()?;
        let platform = self.platform_query();
        probe::run_configure(&self.options(), &git, platform.as_ref())
    }
}
