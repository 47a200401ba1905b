//! # targz Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point of the `targz` command-line tool. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Architecture
//!
//! - Each subcommand is a variant of the `Commands` enum
//! - Variants map to `handle_*` functions in `commands::`
//! - Errors propagate up to `main`, which logs the full chain and exits with status 1
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! targz --help
//!
//! # Pack a directory with debug logging
//! targz -vv pack ./site -o site
//! ```
//!
//! Log level: warn by default, `-v` info, `-vv` debug, `-vvv` trace.
//! `RUST_LOG` takes precedence when set.
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Subcommand handlers
mod common; // Shared utilities (fs, archive glue)
mod core; // Core infrastructure (errors, config)

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "targz",
    about = "Build gzip-compressed tar archives in memory",
    long_about = "Pack files, symlinks and inline text into a .tar.gz archive.\n\
                  The archive can be saved to disk, printed as base64, or printed as\n\
                  a shell command that recreates it on another machine.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Enum defining all available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "p")]
    Pack(commands::pack::PackArgs),
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Pack(args) => commands::pack::handle_pack(args),
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use clap::CommandFactory;
    use predicates::prelude::*;

    fn targz_cmd() -> Command {
        Command::cargo_bin("targz").expect("Failed to find targz binary for testing")
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_main_help_flag() {
        targz_cmd().arg("--help").assert().success();
    }

    #[test]
    fn test_main_version_flag() {
        targz_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
