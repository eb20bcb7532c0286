//! exemplar CLI - harvest per-example SDK snippets from aggregated samples
//!
//! Entry point: parse arguments, set up logging, load configuration and
//! dispatch to the command modules.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use exemplar_core::Config;

mod cli;
mod commands;
mod error;
mod output;
mod utils;

use cli::{Cli, Commands};
use error::{CliError, category_of};
use utils::logging::initialize_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_errors = cli.format().is_some_and(|f| f.is_json());

    if let Err(e) = initialize_logging(&cli) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match execute_command(cli).await {
        Ok(code) => code,
        Err(err) => {
            let category = category_of(&err);
            if json_errors {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "failed",
                        "category": category.description(),
                        "error": format!("{err:#}"),
                    })
                );
            } else {
                eprintln!("Error: {err:#}");
            }
            category.as_exit_code()
        },
    }
}

async fn execute_command(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref()).map_err(CliError::usage)?;

    match cli.command {
        Commands::Extract(args) => {
            commands::extract_release(args, &config).await?;
            Ok(ExitCode::SUCCESS)
        },
        Commands::Split {
            file,
            dialect,
            code,
            format,
        } => {
            commands::split_file(&file, dialect, code, format)?;
            Ok(ExitCode::SUCCESS)
        },
        Commands::Ledger { ledger, command } => commands::manage_ledger(ledger, command, &config),
    }
}
