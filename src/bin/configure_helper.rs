//! Configure step of the extension build
//!
//! Writes auto-detected facts for later build steps:
//! ```bash
//! configure-helper -ev -p -o configure
//! ```

use anyhow::Result;
use clap::Parser;
use extbuild::cli::{expand_script_flags, ConfigureArgs, LogArgs};

#[derive(Parser, Debug)]
#[command(name = "configure-helper")]
#[command(about = "Script to aid in running the configure step of the extension build process")]
#[command(version)]
struct Args {
    #[command(flatten)]
    log: LogArgs,

    #[command(flatten)]
    configure: ConfigureArgs,
}

fn main() -> Result<()> {
    let args = Args::parse_from(expand_script_flags(std::env::args_os()));
    args.log.init();

    for fact in args.configure.run()? {
        println!("Writing {} to {}", fact.value, fact.path.display());
    }
    Ok(())
}
