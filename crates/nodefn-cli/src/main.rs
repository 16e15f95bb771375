#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::needless_pass_by_value)]

mod commands;
mod logging;

use clap::Parser;
use miette::Result;
use nodefn_core::Config;
use std::path::PathBuf;
use tracing::info_span;

#[derive(Parser, Debug)]
#[command(name = "nodefn")]
#[command(author, version, about = "Resolve and plan Node.js serverless functions", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve the handler entry file for a construct
    Resolve {
        /// Construct id (e.g. "Fn" finds `<caller>.Fn.ts`)
        id: String,

        /// File defining the construct; auto-discovery searches next to it
        #[arg(long, value_name = "FILE")]
        caller: PathBuf,

        /// Explicit entry file, relative to the caller's directory
        #[arg(long, value_name = "PATH")]
        entry: Option<PathBuf>,
    },

    /// Locate the dependency lock file and package manager
    Lockfile {
        /// Explicit lock file to validate instead of searching
        #[arg(long, value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Plan functions from nodefn.json (dry run; nothing is bundled)
    Plan {
        /// Only plan these function ids (default: all)
        ids: Vec<String>,

        /// Path to the manifest (overrides auto-discovery)
        #[arg(long, short = 'm', value_name = "FILE")]
        manifest: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let cwd = dunce::canonicalize(&cwd).unwrap_or(cwd);

    let config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Resolve { id, caller, entry }) => {
            let span = info_span!("resolve", cmd = "resolve", cwd = %config.cwd.display());
            let _guard = span.enter();
            commands::resolve::run(&config.cwd, &id, &caller, entry.as_deref(), cli.json)
        }
        Some(Commands::Lockfile { path }) => {
            let span = info_span!("lockfile", cmd = "lockfile", cwd = %config.cwd.display());
            let _guard = span.enter();
            commands::lockfile::run(&config.cwd, path.as_deref(), cli.json)
        }
        Some(Commands::Plan { ids, manifest }) => {
            let span = info_span!("plan", cmd = "plan", cwd = %config.cwd.display());
            let _guard = span.enter();
            commands::plan::run(&config.cwd, &ids, manifest.as_deref(), cli.json)
        }
    }
}
