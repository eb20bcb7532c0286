//! Ledger command: inspect and maintain recorded releases.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use exemplar_core::{Config, Ledger, LedgerExport};
use serde_json::json;

use crate::cli::LedgerCommands;
use crate::error::CliError;
use crate::output::{ExportFormat, OutputFormat, print_json};

/// Execute `exemplar ledger <command>`.
///
/// `check` reports a missing release through exit code 1; every other
/// command succeeds with exit code 0.
pub fn execute(
    ledger_path: Option<PathBuf>,
    command: LedgerCommands,
    config: &Config,
) -> Result<ExitCode> {
    let path = ledger_path.unwrap_or_else(|| config.ledger.path.clone());

    match command {
        LedgerCommands::Init => {
            Ledger::open(&path)
                .with_context(|| format!("Failed to initialize ledger {}", path.display()))?;
            println!("{} Ledger ready at {}", "✓".green(), path.display());
        },
        LedgerCommands::List { language, format } => {
            let ledger = open_existing(&path)?;
            list(&ledger, language.as_deref(), format)?;
        },
        LedgerCommands::Check {
            name,
            language,
            format,
        } => {
            let ledger = open_existing(&path)?;
            let recorded = ledger.query_existing(&name, &language)?;
            if format.is_json() {
                print_json(&json!({ "name": name, "language": language, "recorded": recorded }))?;
            } else if recorded {
                println!("{name} ({language}) is recorded");
            } else {
                println!("{name} ({language}) is not recorded");
            }
            if !recorded {
                return Ok(ExitCode::from(1));
            }
        },
        LedgerCommands::Files {
            name,
            language,
            format,
        } => {
            let ledger = open_existing(&path)?;
            let files = ledger.files_for_release(&name, &language)?;
            if format.is_json() {
                print_json(&files)?;
            } else {
                for file in &files {
                    println!("{file}");
                }
            }
        },
        LedgerCommands::Remove { name, language } => {
            let mut ledger = open_existing(&path)?;
            if ledger.remove_release(&name, &language)? {
                println!("{} Removed {name} ({language})", "✓".green());
            } else {
                return Err(CliError::not_found(anyhow::anyhow!(
                    "{name} ({language}) is not recorded"
                ))
                .into());
            }
        },
        LedgerCommands::Export {
            language,
            output,
            prefix,
            format,
        } => {
            let ledger = open_existing(&path)?;
            let export = ledger.export(language.as_deref())?;
            match (format, output) {
                (ExportFormat::Csv, Some(dir)) => export_csv(&export, &dir, &prefix)?,
                (ExportFormat::Csv, None) => {
                    return Err(CliError::usage(anyhow::anyhow!(
                        "--output <DIR> is required for CSV export"
                    ))
                    .into());
                },
                (ExportFormat::Json, Some(target)) => {
                    create_parent(&target)?;
                    let json = serde_json::to_string_pretty(&export)?;
                    fs::write(&target, json)
                        .with_context(|| format!("Failed to write {}", target.display()))?;
                    tracing::info!(
                        releases = export.releases.len(),
                        files = export.files.len(),
                        path = %target.display(),
                        "exported ledger"
                    );
                },
                (ExportFormat::Json, None) => print_json(&export)?,
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// Write `<prefix>-example-index.csv` and `<prefix>-example-list.csv` into `dir`.
fn export_csv(export: &LedgerExport, dir: &Path, prefix: &str) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let index_path = dir.join(format!("{prefix}-example-index.csv"));
    let file = File::create(&index_path)
        .with_context(|| format!("Failed to create {}", index_path.display()))?;
    export.write_release_index(file)?;

    let list_path = dir.join(format!("{prefix}-example-list.csv"));
    let file = File::create(&list_path)
        .with_context(|| format!("Failed to create {}", list_path.display()))?;
    export.write_file_list(file)?;

    tracing::info!(
        releases = export.releases.len(),
        files = export.files.len(),
        index = %index_path.display(),
        list = %list_path.display(),
        "exported ledger as CSV"
    );
    Ok(())
}

fn create_parent(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

fn open_existing(path: &Path) -> Result<Ledger> {
    if !path.exists() {
        return Err(CliError::not_found(anyhow::anyhow!(
            "no ledger at {}; create one with `exemplar ledger init`",
            path.display()
        ))
        .into());
    }
    Ledger::open(path).with_context(|| format!("Failed to open ledger {}", path.display()))
}

fn list(ledger: &Ledger, language: Option<&str>, format: OutputFormat) -> Result<()> {
    let releases = ledger.list_releases(language)?;
    if format.is_json() {
        return print_json(&releases);
    }
    if releases.is_empty() {
        println!("No releases recorded");
        return Ok(());
    }
    for release in &releases {
        println!(
            "{:<5} {} {} {}",
            release.language.cyan(),
            release.package.bold(),
            release.version,
            release.published_at.format("%Y-%m-%d").to_string().dimmed()
        );
    }
    Ok(())
}
