//! Deptrace CLI - Dependency extraction from the command line.
//!
//! Deptrace reads declaration records produced by a front-end and reports
//! edges, closures, dependents and cycles between the declared symbols.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::OutputFormat;

/// Deptrace: Static dependency extraction for Hack declarations.
#[derive(Parser)]
#[command(name = "deptrace")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to `deptrace.yaml` next to the first input)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every dependency edge
    Edges {
        /// Declaration files or directories of them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Only show edges of this kind (e.g. `extends`, `uses_type`)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Show the transitive dependencies of a symbol
    Closure {
        /// Symbol (`Derived`) or member (`WithConst::CFLOAT`)
        symbol: String,

        /// Declaration files or directories of them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Follow signature edges at member granularity instead of all edges
        #[arg(long)]
        fine: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show symbols that directly depend on a symbol
    Dependents {
        /// Symbol or member to look up
        symbol: String,

        /// Declaration files or directories of them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Detect dependency cycles between symbols
    Cycles {
        /// Declaration files or directories of them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Also report symbols that depend only on themselves
        #[arg(long)]
        self_loops: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show symbol and edge statistics
    Stats {
        /// Declaration files or directories of them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Edges {
            inputs,
            format,
            kind,
        } => cli::edges::run(&inputs, config, format, kind.as_deref()),
        Commands::Closure {
            symbol,
            inputs,
            fine,
            format,
        } => cli::closure::run(&inputs, config, &symbol, fine, format),
        Commands::Dependents {
            symbol,
            inputs,
            format,
        } => cli::dependents::run(&inputs, config, &symbol, format),
        Commands::Cycles {
            inputs,
            self_loops,
            format,
        } => cli::cycles::run(&inputs, config, self_loops, format),
        Commands::Stats { inputs, format } => cli::stats::run(&inputs, config, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
