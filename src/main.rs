//! Disk Trace Studio CLI
//!
//! Imports disk tracepoints from an ftrace text file and writes the
//! correlated slices as a JSON report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use disk_trace_studio::commands::{
    display_events, display_schema, display_version, execute_import, validate_args,
    validate_report_file, ImportArgs,
};

/// Disk Trace Studio - disk I/O slices from ftrace text
#[derive(Parser, Debug)]
#[command(name = "disk-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Import disk events from an ftrace text file
    Import {
        /// ftrace text file (trace or trace_pipe output)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for JSON report
        #[arg(short, long, default_value = "disk-slices.json")]
        output: PathBuf,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Fail if any line produced a warning
        #[arg(long, env = "DISK_TRACE_STRICT")]
        strict: bool,
    },

    /// List recognized disk tracepoints
    Events,

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Import {
            input,
            output,
            summary,
            strict,
        } => {
            let args = ImportArgs {
                input,
                output_json: output,
                print_summary: summary,
                strict,
            };

            validate_args(&args)?;
            execute_import(args)?;
        }

        Commands::Events => {
            display_events();
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
