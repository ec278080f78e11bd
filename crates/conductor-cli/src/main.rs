//! Conductor CLI entry point.
//!
//! Binary name: `conductor`
//!
//! Loads the workspace manifest, initializes the orchestrator with the
//! built-in builder registry, then dispatches to the requested command.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "conductor", about = "Resolve and run project build targets")]
struct Cli {
    /// Path to the workspace manifest.
    #[arg(long, global = true, default_value = "workspace.json")]
    workspace: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the targets a project declares.
    Targets {
        /// Project name.
        project: String,
    },
    /// Run a target: project:target[:configuration].
    Run {
        /// The target to run.
        target: String,
        /// Option overrides, `key=value`; values parse as JSON where
        /// possible and fall back to strings.
        #[arg(short = 'o', long = "option", value_parser = commands::run::parse_override)]
        options: Vec<(String, Value)>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    match cli.command {
        Commands::Targets { project } => {
            commands::targets::targets(&cli.workspace, &project).await
        }
        Commands::Run { target, options } => {
            let success = commands::run::run(&cli.workspace, &target, options).await?;
            if !success {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
