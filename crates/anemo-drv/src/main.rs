//! The `anemo` compiler binary.
//!
//! Every diagnostic goes to stderr in the
//! `<file>:<line>:<col>: error: <message>` format (or a plain
//! `error: <message>` when no position applies) and the process exits
//! with code 1 on the first failure. Stage logging is off by default;
//! enable it with `--verbose` or the `ANEMO_LOG` environment variable.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use anemo_util::Diagnostic;

/// Anemo - a whole-program compiler for the Anemo language
#[derive(Parser, Debug)]
#[command(name = "anemo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiler for the Anemo language", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose stage logging
    #[arg(short, long, global = true, env = "ANEMO_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a source file to a native executable next to it
    Build {
        /// The .anm source file
        file: PathBuf,
    },

    /// Compile a source file, then run the produced executable
    Run {
        /// The .anm source file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Build { file } => anemo_drv::build(&file).map(|exe| {
            println!("built: {}", exe.display());
        }),
        Commands::Run { file } => anemo_drv::run(&file),
    };

    if let Err(err) = result {
        report(&err);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("ANEMO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // Ignore a second init; only tests construct the CLI twice in one
    // process.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

fn report(err: &anyhow::Error) {
    // Pipeline diagnostics carry their own location-prefixed format;
    // everything else is an environment error.
    if let Some(diag) = err.downcast_ref::<Diagnostic>() {
        eprintln!("{diag}");
    } else {
        eprintln!("error: {err:#}");
    }
}
