//! extbuild - DuckDB extension CI helper
//!
//! Usage:
//!   extbuild append-metadata ...   Package a shared library as a .duckdb_extension
//!   extbuild configure ...         Write extension version / platform facts
//!   extbuild matrix ...            Compute distribution matrices for GitHub Actions
//!   extbuild inspect <file>        Show the metadata footer of an extension

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use extbuild::cli::{print_append_report, AppendMetadataArgs, ConfigureArgs, LogArgs};
use extbuild::distmatrix::{self, ComputeOptions, OutputMode, ReducedCiMode};
use extbuild::{append_metadata, paths, read_footer};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "extbuild")]
#[command(version)]
#[command(about = "DuckDB extension CI helper")]
struct Cli {
    #[command(flatten)]
    log: LogArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append extension metadata to a raw shared library
    AppendMetadata(AppendMetadataArgs),

    /// Write auto-detected build facts (extension version, platform)
    Configure(ConfigureArgs),

    /// Compute distribution matrices and emit GitHub output lines
    Matrix(MatrixArgs),

    /// Print the metadata footer of a packaged extension
    Inspect {
        /// Path to a .duckdb_extension file
        file: PathBuf,
    },
}

#[derive(Args)]
struct MatrixArgs {
    /// Input distribution matrix JSON file
    #[arg(long, default_value = paths::matrix::DEFAULT_INPUT)]
    input: PathBuf,

    /// Comma or semicolon separated list of platforms (at least one)
    #[arg(long, default_value = "")]
    platform: String,

    /// Comma or semicolon separated list of arch tokens (amd64;arm64)
    #[arg(long, default_value = "")]
    arch: String,

    /// Comma or semicolon separated list of duckdb_arch values to exclude
    #[arg(long, default_value = "")]
    exclude: String,

    /// Comma or semicolon separated list of opt-in duckdb_arch values
    #[arg(long, default_value = "")]
    opt_in: String,

    /// Reduced CI mode: auto|enabled|disabled
    #[arg(long, default_value = "")]
    reduced_ci_mode: String,

    /// Path to write GitHub output lines
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also emit the combined deploy_matrix line
    #[arg(long)]
    deploy: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.log.init();

    match cli.command {
        Commands::AppendMetadata(args) => cmd_append(args, &cli.log),
        Commands::Configure(args) => cmd_configure(args),
        Commands::Matrix(args) => cmd_matrix(args),
        Commands::Inspect { file } => cmd_inspect(file),
    }
}

fn cmd_append(args: AppendMetadataArgs, log: &LogArgs) -> Result<()> {
    let request = args.into_request()?;
    let report = append_metadata(&request)
        .with_context(|| format!("Failed to package {}", request.extension_name))?;

    if !log.silent {
        print_append_report(&request, &report);
    }
    Ok(())
}

fn cmd_configure(args: ConfigureArgs) -> Result<()> {
    for fact in args.run()? {
        println!("Wrote {} to {}", fact.value, fact.path.display());
    }
    Ok(())
}

fn cmd_matrix(args: MatrixArgs) -> Result<()> {
    let event = distmatrix::detect_event_type_from_env().context("Failed to detect GitHub event type")?;
    tracing::info!("Detected GitHub event type: {}", event);

    let requested = ReducedCiMode::parse(&args.reduced_ci_mode)?;
    let reduced_ci_mode = requested.for_event(event);
    if reduced_ci_mode != requested {
        tracing::info!("Enabled reduced CI mode for {} event when mode is auto", event);
    }

    let data = fs::read(&args.input)
        .with_context(|| format!("Failed to read input matrix {}", args.input.display()))?;
    let matrix = distmatrix::parse_matrix_file(&data)
        .with_context(|| format!("Failed to parse input matrix {}", args.input.display()))?;

    let result = distmatrix::compute_platform_matrices(
        &matrix,
        &ComputeOptions {
            platform: args.platform,
            arch: args.arch,
            exclude: args.exclude,
            opt_in: args.opt_in,
            reduced_ci_mode,
        },
    )
    .context("Failed to compute platform matrices")?;

    let mut content = distmatrix::render_output_lines(&result, OutputMode::MachineReadable)?;
    let mut readable = distmatrix::render_output_lines(&result, OutputMode::HumanReadable)?;
    if args.deploy {
        content.push_str(&distmatrix::render_deploy_output_line(&result)?);
        readable.push_str(&distmatrix::render_deploy_readable_lines(&result));
    }

    if let Some(out) = &args.out {
        fs::write(out, &content)
            .with_context(|| format!("Failed to write output file {}", out.display()))?;
    }

    print!("{readable}");
    Ok(())
}

fn cmd_inspect(file: PathBuf) -> Result<()> {
    let footer = read_footer(&file)
        .with_context(|| format!("Failed to read extension metadata from {}", file.display()))?;
    let meta = &footer.metadata;

    println!("{}", file.display());
    println!("  Library size:      {} bytes", footer.library_len);
    println!("  ABI type:          {}", meta.abi_type);
    println!("  Extension version: {}", meta.extension_version);
    println!("  DuckDB version:    {}", meta.duckdb_version);
    println!("  DuckDB platform:   {}", meta.duckdb_platform);
    let signed = footer.signature.iter().any(|&b| b != 0);
    println!("  Signature:         {}", if signed { "present" } else { "none" });
    Ok(())
}
