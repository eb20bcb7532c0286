//! Split command: show how one aggregated sample is segmented.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use exemplar_core::{Dialect, extract_units};
use serde::Serialize;

use crate::error::CliError;
use crate::output::{OutputFormat, print_json};

#[derive(Debug, Serialize)]
struct UnitView<'a> {
    index: usize,
    spec_reference: &'a str,
    target: String,
    /// 1-based, inclusive.
    start_line: usize,
    end_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
}

/// Execute `exemplar split`.
pub fn execute(
    file: &Path,
    dialect: Option<Dialect>,
    show_code: bool,
    format: OutputFormat,
) -> Result<()> {
    let dialect = dialect.or_else(|| Dialect::from_path(file)).ok_or_else(|| {
        CliError::usage(anyhow::anyhow!(
            "cannot tell the dialect of {}; pass --dialect",
            file.display()
        ))
    })?;
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let symbol = file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();

    let units = extract_units(&text, dialect.rules(), symbol);
    let views: Vec<UnitView<'_>> = units
        .iter()
        .map(|unit| UnitView {
            index: unit.unit_index,
            spec_reference: &unit.spec_reference,
            target: unit.target.markdown_path(),
            start_line: unit.start_line + 1,
            end_line: unit.end_line,
            code: show_code.then_some(unit.code.as_str()),
        })
        .collect();

    if format.is_json() {
        return print_json(&views);
    }

    if views.is_empty() {
        println!("No example units found in {}", file.display());
        return Ok(());
    }
    println!(
        "{} unit(s) in {} ({})",
        views.len(),
        file.display(),
        dialect.as_str()
    );
    for view in &views {
        println!(
            "{} lines {}-{} -> {}",
            format!("[{}]", view.index).cyan(),
            view.start_line,
            view.end_line,
            view.target.green()
        );
        if let Some(code) = view.code {
            println!("{code}");
        }
    }
    Ok(())
}
