//! Extract command: harvest one release end to end.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use exemplar_core::{
    AcceptAll, CommandOracle, Config, DuplicatePolicy, Harvest, HarvestReport, Harvester, Ledger,
    NewRelease, RecordOutcome, ReleaseInfo, ValidationOracle, write_artifacts,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::ExtractArgs;
use crate::error::CliError;
use crate::output::print_json;
use crate::utils::parsing::parse_published_at;

#[derive(Debug, Serialize)]
struct ExtractSummary<'a> {
    status: &'static str,
    name: &'a str,
    language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<RecordOutcome>,
    dry_run: bool,
    files: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<HarvestReport>,
}

/// Execute `exemplar extract`.
pub async fn execute(args: ExtractArgs, config: &Config) -> Result<()> {
    let dialect = args.dialect;
    let rules = dialect.rules();
    let language = dialect.as_str();

    let mut release = ReleaseInfo::new(dialect, &args.tag, &args.package, &args.release_version);
    if let Some(sdk_name) = &args.sdk_name {
        release = release.with_sdk_name(sdk_name);
    }
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| rules.default_release_name(&args.package, &args.release_version));

    let policy = args.on_duplicate.unwrap_or(config.ledger.on_duplicate);
    let published_at =
        parse_published_at(args.published_at.as_deref()).map_err(CliError::usage)?;
    let concurrency = args.concurrency.unwrap_or(config.validation.concurrency);
    if concurrency == 0 {
        return Err(CliError::usage(anyhow::anyhow!("--concurrency must be at least 1")).into());
    }

    let mut ledger = if args.dry_run {
        None
    } else {
        let path = args.ledger.as_deref().unwrap_or(&config.ledger.path);
        Some(
            Ledger::open(path)
                .with_context(|| format!("Failed to open ledger {}", path.display()))?,
        )
    };

    if policy == DuplicatePolicy::Reject {
        if let Some(ledger) = &ledger {
            if ledger.query_existing(&name, language)? {
                info!(name = %name, language, "release already recorded, skipping");
                return print_summary(
                    &args,
                    &ExtractSummary {
                        status: "skipped",
                        name: &name,
                        language,
                        outcome: Some(RecordOutcome::Duplicate),
                        dry_run: args.dry_run,
                        files: &[],
                        report: None,
                    },
                );
            }
        }
    }

    let mut harvest = match validation_command(&args, config) {
        Some((program, program_args)) => {
            let mut oracle = CommandOracle::new(program, program_args);
            if let Some(secs) = config.validation.timeout_secs {
                oracle = oracle.with_timeout(Duration::from_secs(secs));
            }
            debug!(program = oracle.program(), "validating with external command");
            run_harvest(oracle, &args, &release, config, concurrency).await?
        },
        None => run_harvest(AcceptAll, &args, &release, config, concurrency).await?,
    };

    let files = if args.dry_run {
        harvest
            .artifacts
            .iter()
            .map(exemplar_core::ExampleArtifact::relative_path)
            .collect()
    } else {
        write_artifacts(&harvest.artifacts, &args.output)
            .with_context(|| format!("Failed to write examples below {}", args.output.display()))?
    };
    if !args.dry_run {
        harvest.report.written = files.len();
    }

    let outcome = match ledger.as_mut() {
        Some(ledger) => Some(
            ledger
                .record_release(
                    &NewRelease {
                        name: name.clone(),
                        language: language.to_string(),
                        tag: release.tag.clone(),
                        package: release.package.clone(),
                        version: release.version.clone(),
                        published_at,
                        files: files.clone(),
                    },
                    policy,
                )
                .context("Failed to record release")?,
        ),
        None => None,
    };

    print_summary(
        &args,
        &ExtractSummary {
            status: run_status(outcome),
            name: &name,
            language,
            outcome,
            dry_run: args.dry_run,
            files: &files,
            report: Some(harvest.report),
        },
    )
}

/// Run status reported after recording; a release that another run
/// recorded in the meantime counts as skipped.
fn run_status(outcome: Option<RecordOutcome>) -> &'static str {
    match outcome {
        Some(RecordOutcome::Duplicate) => "skipped",
        _ => "succeeded",
    }
}

/// Validation program and its arguments; the command line wins over config.
fn validation_command(args: &ExtractArgs, config: &Config) -> Option<(String, Vec<String>)> {
    if let Some(program) = &args.validate {
        return Some((program.clone(), args.validate_args.clone()));
    }
    config
        .validation
        .command
        .as_ref()
        .map(|program| (program.clone(), config.validation.args.clone()))
}

async fn run_harvest<O: ValidationOracle>(
    oracle: O,
    args: &ExtractArgs,
    release: &ReleaseInfo,
    config: &Config,
    concurrency: usize,
) -> Result<Harvest> {
    let sources: &Path = &args.sources;
    let harvest = Harvester::new(args.dialect, release, oracle)
        .with_link_template(release, config.docs.link_template(args.dialect))
        .with_concurrency(concurrency)
        .harvest(sources)
        .await
        .with_context(|| format!("Failed to harvest {}", sources.display()))?;
    Ok(harvest)
}

fn print_summary(args: &ExtractArgs, summary: &ExtractSummary<'_>) -> Result<()> {
    if args.format.is_json() {
        return print_json(summary);
    }

    if summary.status == "skipped" && summary.report.is_none() {
        println!(
            "{} {} ({}) is already recorded",
            "Skipped".yellow(),
            summary.name.bold(),
            summary.language
        );
        return Ok(());
    }

    let verb = if summary.dry_run { "Found" } else { "Harvested" };
    println!(
        "{} {} {} example(s) for {} ({})",
        "✓".green(),
        verb,
        summary.files.len(),
        summary.name.bold(),
        summary.language
    );
    if let Some(report) = &summary.report {
        println!(
            "  {} file(s) scanned, {} aggregated, {} unit(s), {} rejected, {} skipped",
            report.files_scanned,
            report.aggregated_files,
            report.units_found,
            report.rejected,
            report.skipped
        );
    }
    match summary.outcome {
        Some(RecordOutcome::Duplicate) => println!(
            "  ledger: {}",
            "duplicate, another run recorded this release first".yellow()
        ),
        Some(outcome) => println!("  ledger: {outcome}"),
        None => {},
    }
    if summary.dry_run {
        for file in summary.files {
            println!("  {}", file.dimmed());
        }
    }
    Ok(())
}
