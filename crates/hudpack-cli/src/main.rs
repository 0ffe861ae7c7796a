use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

mod completion;
mod dispatch;
mod logging;
mod prompt;
mod render;

use dispatch::run_cli;
use logging::init_tracing;
use render::format_error_lines;

#[derive(Parser, Debug)]
#[command(name = "hudpack")]
#[command(about = "Install, update and remove a HUD package for an installed game", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file; defaults to $HUDPACK_CONFIG, then ~/.hudpack/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Host install directory to try before the configured candidates
    #[arg(long, global = true)]
    install_dir: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download and install the package
    Install,
    /// Check for a newer package and install it when confirmed
    Update {
        #[arg(short, long)]
        yes: bool,
    },
    /// Compare the installed package with the latest published version
    Check {
        #[arg(long)]
        json: bool,
    },
    /// Delete the installed package
    Remove,
    /// Show where the package lives and which version is installed
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Delete leftover downloads and staging files
    Clean,
    /// Replace this executable with the latest published installer
    SelfUpdate {
        #[arg(short, long)]
        yes: bool,
    },
    /// Print a shell completion script
    Completions { shell: Shell },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            for line in format_error_lines(&err) {
                eprintln!("{line}");
            }
            ExitCode::FAILURE
        }
    }
}
