//! Rebuilding standalone source files from segmented units.

use crate::dialect::{DialectRules, PrologueCut};
use crate::segment::{AggregatedSample, ExampleUnit};

/// Textual rename applied to a reconstructed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRename<'r> {
    /// Symbol as it appears in the aggregated sample.
    pub from: &'r str,
    /// Replacement symbol.
    pub to: &'r str,
}

/// Drop the generated file header up to the dialect's prologue-end line.
///
/// Lines are returned untouched when no prologue-end line exists.
pub fn trim_header<'l, 'a>(lines: &'l [&'a str], rules: &DialectRules) -> &'l [&'a str] {
    match lines.iter().position(|line| rules.is_prologue_end(line)) {
        Some(index) => match rules.prologue_cut {
            PrologueCut::KeepEndLine => &lines[index..],
            PrologueCut::DropEndLine => &lines[index + 1..],
        },
        None => lines,
    }
}

/// Reassemble one unit into a standalone file.
///
/// The result is `prologue ++ unit body`, followed by the epilogue when the
/// dialect needs the enclosing structure closed, with the generated header
/// trimmed and `rename` applied to every line.
pub fn reconstruct(
    sample: &AggregatedSample<'_>,
    unit: &ExampleUnit<'_>,
    rules: &DialectRules,
    rename: Option<SymbolRename<'_>>,
) -> Vec<String> {
    let mut assembled: Vec<&str> = Vec::with_capacity(
        sample.prologue_lines.len() + unit.body_lines.len() + sample.epilogue_lines.len(),
    );
    assembled.extend_from_slice(&sample.prologue_lines);
    assembled.extend_from_slice(&unit.body_lines);
    if rules.requires_epilogue {
        assembled.extend_from_slice(&sample.epilogue_lines);
    }

    trim_header(&assembled, rules)
        .iter()
        .map(|line| match rename {
            Some(SymbolRename { from, to }) if !from.is_empty() => line.replace(from, to),
            _ => (*line).to_string(),
        })
        .collect()
}

/// The dialect's rename for a sample whose shared symbol is `source_symbol`.
///
/// `None` for dialects that keep their symbols.
pub fn dialect_rename<'r>(rules: &'r DialectRules, source_symbol: &'r str) -> Option<SymbolRename<'r>> {
    rules.shared_symbol_rename.then_some(SymbolRename {
        from: source_symbol,
        to: rules.rename_target,
    })
}
