//! clair3-build command-line interface
//!
//! Builds the Clair3 native extension and inspects its inputs

use clair3_build::BuildEnv;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process;

mod commands;

use commands::PlanArgs;

/// Display an error with optional backtrace information
fn display_error(err: &anyhow::Error, backtrace_enabled: bool) {
    eprintln!("error: {err}");

    // Show error chain
    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }

    // Show backtrace if enabled
    if backtrace_enabled {
        let backtrace = err.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            eprintln!("\nBacktrace:");
            eprintln!("{backtrace}");
        }
    }
}

#[derive(Parser)]
#[command(name = "clair3-build")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build the Clair3 native extension", long_about = None)]
#[command(disable_version_flag = true)]
pub(crate) struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    _version: Option<bool>,

    /// Enable debug output (also `CLAIR3_BUILD_DEBUG=1`)
    #[arg(long, global = true)]
    debug: bool,

    /// Show a backtrace on error (requires `RUST_BACKTRACE=1`)
    #[arg(long, global = true)]
    backtrace: bool,

    /// Path to a configuration file
    #[arg(long, global = true, env = "CLAIR3_BUILD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve htslib, compile the sources and link the extension module
    Build {
        #[command(flatten)]
        plan: PlanArgs,

        /// Directory the module and its declarations are installed into
        #[arg(long, short = 'o')]
        out_dir: Option<PathBuf>,

        /// Print every toolchain step and its output
        #[arg(long)]
        verbose: bool,

        /// Suppress all output except errors
        #[arg(long, short, conflicts_with = "verbose")]
        quiet: bool,
    },

    /// Print the compile and link flags selected for a platform
    Flags {
        /// Architecture name (e.g. `x86_64`, `arm64`); defaults to the host
        #[arg(long)]
        arch: Option<String>,

        /// Operating system name (e.g. `Linux`, `Darwin`); defaults to the host
        #[arg(long)]
        os: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the declarations the module exposes
    Cdef {
        /// Header to extract from (repeatable); defaults to the configured headers
        #[arg(long = "header", value_name = "PATH")]
        headers: Vec<PathBuf>,
    },

    /// Print the build descriptor as JSON without building
    Descriptor {
        #[command(flatten)]
        plan: PlanArgs,

        /// Operating system name; defaults to the host
        #[arg(long)]
        os: Option<String>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let env = BuildEnv::from_process();

    // Initialize debug mode
    clair3_build::init_debug(cli.debug || env.debug());

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Build {
            plan,
            out_dir,
            verbose,
            quiet,
        } => commands::build::run(&env, config_path, &plan, out_dir.as_deref(), verbose, quiet),
        Commands::Flags { arch, os, json } => {
            commands::flags::run(&env, arch.as_deref(), os.as_deref(), json)
        }
        Commands::Cdef { headers } => commands::cdef::run(&env, config_path, &headers),
        Commands::Descriptor { plan, os } => {
            commands::descriptor::run(&env, config_path, &plan, os.as_deref())
        }
        Commands::Completion { shell } => commands::completion::run(shell),
    };

    if let Err(e) = result {
        // Display error with formatting
        display_error(&e, cli.backtrace);
        process::exit(1);
    }
}
