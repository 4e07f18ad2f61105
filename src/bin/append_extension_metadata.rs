//! Append extension metadata to loadable DuckDB extensions
//!
//! Flag-compatible stand-in for the script used by the extension build,
//! including its two-letter short flags:
//! ```bash
//! append-extension-metadata -l build/libgeo.so -n geo \
//!     -pf configure/platform.txt \
//!     -dv v1.2.0 \
//!     -evf configure/extension_version.txt
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use extbuild::append_metadata;
use extbuild::cli::{expand_script_flags, print_append_report, AppendMetadataArgs, LogArgs};

#[derive(Parser, Debug)]
#[command(name = "append-extension-metadata")]
#[command(about = "Append extension metadata to loadable DuckDB extensions")]
#[command(version)]
struct Args {
    #[command(flatten)]
    log: LogArgs,

    #[command(flatten)]
    append: AppendMetadataArgs,
}

fn main() -> Result<()> {
    let args = Args::parse_from(expand_script_flags(std::env::args_os()));
    args.log.init();

    let request = args.append.into_request()?;
    let report = append_metadata(&request)
        .with_context(|| format!("Failed to package {}", request.extension_name))?;

    if !args.log.silent {
        print_append_report(&request, &report);
    }
    Ok(())
}
