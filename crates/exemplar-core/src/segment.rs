//! Unit segmentation of aggregated samples.
//!
//! Segmentation is a pure function of the line sequence and the dialect
//! rules. [`next_unit`] performs one forward scan from an explicit cursor and
//! hands back the cursor for the following call, so files can be segmented
//! in parallel and any scan can be restarted from scratch.
//!
//! Lines keep their terminators (see [`split_lines`]), which means
//! `prologue ++ units ++ epilogue` concatenates back to the original text when
//! the units are contiguous.

use tracing::debug;

use crate::dialect::DialectRules;
use crate::scan::marker_reference;

/// Split text into lines, keeping each line's `\n` terminator.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// One demonstration routine extracted from an aggregated sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleUnit<'a> {
    /// Path of the specification example this unit demonstrates.
    pub spec_reference: Option<String>,
    /// Lines of the unit, attached leading comments included.
    pub body_lines: Vec<&'a str>,
    /// First line of the unit (inclusive, 0-based).
    pub start_line: usize,
    /// Line after the unit (exclusive, 0-based).
    pub end_line: usize,
}

impl ExampleUnit<'_> {
    /// A unit is valid iff it carries a spec reference.
    pub const fn is_valid(&self) -> bool {
        self.spec_reference.is_some()
    }

    /// Body lines joined back into text.
    pub fn body_text(&self) -> String {
        self.body_lines.concat()
    }
}

/// Unit boundaries found by the forward scan, before comment absorption.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Boundary {
    spec_reference: Option<String>,
    start_line: usize,
    end_line: usize,
}

/// Forward pass: locate the next unit-start and its unit-end.
///
/// Returns `None` when no unit-start exists at or after `start`, or when the
/// last unit-start is never terminated before the end of the file.
fn find_boundary(lines: &[&str], rules: &DialectRules, start: usize) -> Option<Boundary> {
    let mut pending_reference: Option<String> = None;
    let mut unit_start: Option<usize> = None;

    for (index, line) in lines.iter().enumerate().skip(start) {
        match unit_start {
            None => {
                if rules.is_marker(line) {
                    pending_reference = marker_reference(lines, index, rules);
                } else if rules.is_unit_start(line) {
                    unit_start = Some(index);
                }
            },
            Some(start_line) => {
                if rules.is_unit_end(line) {
                    return Some(Boundary {
                        spec_reference: pending_reference,
                        start_line,
                        end_line: index + 1,
                    });
                }
            },
        }
    }

    if let Some(start_line) = unit_start {
        debug!(
            start_line,
            reference = pending_reference.as_deref().unwrap_or("<none>"),
            "unit start without terminator, dropping trailing unit"
        );
    }
    None
}

/// Backward pass: extend `start_line` over the comment block directly above it.
///
/// Never walks above `floor`, the index the forward scan started from.
fn absorb_leading_comments(
    lines: &[&str],
    rules: &DialectRules,
    start_line: usize,
    floor: usize,
) -> usize {
    let mut first = start_line;
    while first > floor && rules.is_comment_line(lines[first - 1]) {
        first -= 1;
    }
    first
}

/// Extract the next unit at or after `start`.
///
/// Returns the unit (valid or not) and the index right after it, or `None`
/// when there are no more units. Invalid units keep their scanned range so
/// the caller can step over them.
pub fn next_unit<'a>(
    lines: &[&'a str],
    rules: &DialectRules,
    start: usize,
) -> Option<(ExampleUnit<'a>, usize)> {
    let boundary = find_boundary(lines, rules, start)?;
    let start_line = if boundary.spec_reference.is_some() {
        absorb_leading_comments(lines, rules, boundary.start_line, start)
    } else {
        boundary.start_line
    };

    let unit = ExampleUnit {
        spec_reference: boundary.spec_reference,
        body_lines: lines[start_line..boundary.end_line].to_vec(),
        start_line,
        end_line: boundary.end_line,
    };
    Some((unit, boundary.end_line))
}

/// An aggregated sample broken down into its units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedSample<'a> {
    /// Shared lines before the first unit.
    pub prologue_lines: Vec<&'a str>,
    /// Shared lines after the last unit.
    pub epilogue_lines: Vec<&'a str>,
    /// Valid units in source order.
    pub units: Vec<ExampleUnit<'a>>,
}

impl<'a> AggregatedSample<'a> {
    /// Segment `lines` into units using `rules`.
    ///
    /// Units without a spec reference are skipped. Prologue and epilogue are
    /// anchored on valid units only, so unmarked helper routines before the
    /// first or after the last valid unit stay shared. When no valid unit is
    /// found the whole file becomes the prologue.
    pub fn from_lines(lines: &[&'a str], rules: &DialectRules) -> Self {
        let mut units = Vec::new();
        let mut first_start: Option<usize> = None;
        let mut last_end = 0;
        let mut cursor = 0;

        while let Some((unit, next)) = next_unit(lines, rules, cursor) {
            cursor = next;

            if unit.is_valid() {
                first_start.get_or_insert(unit.start_line);
                last_end = unit.end_line;
                units.push(unit);
            } else {
                debug!(
                    start_line = unit.start_line,
                    end_line = unit.end_line,
                    "unit without marker reference, skipping"
                );
            }
        }

        match first_start {
            Some(first) => Self {
                prologue_lines: lines[..first].to_vec(),
                epilogue_lines: lines[last_end..].to_vec(),
                units,
            },
            None => Self {
                prologue_lines: lines.to_vec(),
                epilogue_lines: Vec::new(),
                units,
            },
        }
    }

    /// True when no valid unit was found.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Dialect;
    use proptest::prelude::*;

    const GO_SAMPLE: &str = "\
// Copyright (c) Example Corp.

package armwidgets_test

import (
\t\"context\"
\t\"log\"
)

// x-ms-original-file: specification/widgets/examples/Widgets_Get.json
func ExampleWidgetsClient_Get() {
\tctx := context.Background()
\tlog.Println(ctx)
}

// Generated from example definition
// x-ms-original-file: specification/widgets/examples/Widgets_List.json
func ExampleWidgetsClient_List() {
\tlog.Println(\"list\")
}
";

    const JS_SAMPLE: &str = "\
const { WidgetsClient } = require(\"@azure/arm-widgets\");
const { DefaultAzureCredential } = require(\"@azure/identity\");

/**
 * This sample demonstrates how to get a widget.
 *
 * @summary get a widget.
 * x-ms-original-file: specification/widgets/examples/Widgets_Get.json
 */
async function getWidget() {
  const client = new WidgetsClient(new DefaultAzureCredential());
  console.log(await client.widgets.get(\"rg\", \"w1\"));
}

getWidget().catch(console.error);

/**
 * This sample demonstrates how to list widgets.
 *
 * @summary list widgets.
 * x-ms-original-file: specification/widgets/examples/Widgets_List.json
 */
async function listWidgets() {
  const client = new WidgetsClient(new DefaultAzureCredential());
  for await (const item of client.widgets.list()) {
    console.log(item);
  }
}

listWidgets().catch(console.error);
";

    #[test]
    fn test_go_units_in_source_order() {
        let lines = split_lines(GO_SAMPLE);
        let sample = AggregatedSample::from_lines(&lines, Dialect::Go.rules());

        assert_eq!(sample.units.len(), 2);
        assert_eq!(
            sample.units[0].spec_reference.as_deref(),
            Some("specification/widgets/examples/Widgets_Get.json")
        );
        assert_eq!(
            sample.units[1].spec_reference.as_deref(),
            Some("specification/widgets/examples/Widgets_List.json")
        );
        assert!(sample.units[0].end_line <= sample.units[1].start_line);
    }

    #[test]
    fn test_go_backtracking_pulls_in_comments() {
        let lines = split_lines(GO_SAMPLE);
        let sample = AggregatedSample::from_lines(&lines, Dialect::Go.rules());

        let second = &sample.units[1];
        assert_eq!(second.body_lines[0], "// Generated from example definition\n");
        assert_eq!(
            second.body_lines[1],
            "// x-ms-original-file: specification/widgets/examples/Widgets_List.json\n"
        );
        assert_eq!(second.body_lines[2], "func ExampleWidgetsClient_List() {\n");
        assert_eq!(*second.body_lines.last().unwrap(), "}\n");
    }

    #[test]
    fn test_go_prologue_and_epilogue() {
        let lines = split_lines(GO_SAMPLE);
        let sample = AggregatedSample::from_lines(&lines, Dialect::Go.rules());

        let prologue = sample.prologue_lines.concat();
        assert!(prologue.contains("package armwidgets_test"));
        assert!(prologue.ends_with(")\n\n"));
        assert!(sample.epilogue_lines.is_empty());
    }

    #[test]
    fn test_js_units_end_at_invocation() {
        let lines = split_lines(JS_SAMPLE);
        let sample = AggregatedSample::from_lines(&lines, Dialect::JavaScript.rules());

        assert_eq!(sample.units.len(), 2);
        let first = &sample.units[0];
        assert_eq!(first.start_line, 3);
        assert_eq!(first.body_lines[0], "/**\n");
        assert_eq!(
            first.body_lines[1].trim(),
            "* This sample demonstrates how to get a widget."
        );
        assert_eq!(first.body_lines[6].trim(), "async function getWidget() {");
        assert_eq!(
            first.body_lines.last().unwrap().trim(),
            "getWidget().catch(console.error);"
        );

        let second = &sample.units[1];
        assert_eq!(second.body_lines[6].trim(), "async function listWidgets() {");
        assert_eq!(
            second.body_lines.last().unwrap().trim(),
            "listWidgets().catch(console.error);"
        );
        assert!(!second.body_text().contains("getWidget"));
    }

    #[test]
    fn test_zero_units_keeps_whole_file_as_prologue() {
        let text = "package widgets\n\nfunc helper() {\n}\n";
        let lines = split_lines(text);
        let sample = AggregatedSample::from_lines(&lines, Dialect::Go.rules());

        assert!(sample.is_empty());
        assert_eq!(sample.prologue_lines.concat(), text);
        assert!(sample.epilogue_lines.is_empty());
    }

    #[test]
    fn test_marker_without_unit_is_overwritten() {
        let text = "\
// x-ms-original-file: specs/Orphan.json
// x-ms-original-file: specs/Real.json
func ExampleReal() {
}
";
        let lines = split_lines(text);
        let sample = AggregatedSample::from_lines(&lines, Dialect::Go.rules());

        assert_eq!(sample.units.len(), 1);
        assert_eq!(sample.units[0].spec_reference.as_deref(), Some("specs/Real.json"));
    }

    #[test]
    fn test_unterminated_unit_is_dropped() {
        let text = "\
package x
// x-ms-original-file: specs/A.json
func ExampleA() {
}
// x-ms-original-file: specs/B.json
func ExampleB() {
\tlog.Println(\"never closed\")
";
        let lines = split_lines(text);
        let sample = AggregatedSample::from_lines(&lines, Dialect::Go.rules());

        assert_eq!(sample.units.len(), 1);
        assert_eq!(sample.units[0].spec_reference.as_deref(), Some("specs/A.json"));
        assert_eq!(sample.epilogue_lines.len(), 3);
    }

    #[test]
    fn test_unit_without_marker_is_skipped_but_scan_continues() {
        let text = "\
package x

func helper() {
}

// x-ms-original-file: specs/B.json
func ExampleB() {
}
";
        let lines = split_lines(text);
        let sample = AggregatedSample::from_lines(&lines, Dialect::Go.rules());

        assert_eq!(sample.units.len(), 1);
        assert_eq!(sample.units[0].spec_reference.as_deref(), Some("specs/B.json"));
        assert_eq!(
            sample.prologue_lines.concat(),
            "package x\n\nfunc helper() {\n}\n\n"
        );
    }

    #[test]
    fn test_trailing_unmarked_method_stays_in_java_epilogue() {
        let text = "\
package com.example;

public final class WidgetsSamples {
    /*
     * x-ms-original-file: specs/Get.json
     */
    public static void getWidget() {
        helper();
    }

    public static void helper() {
    }
}
";
        let lines = split_lines(text);
        let sample = AggregatedSample::from_lines(&lines, Dialect::Java.rules());

        assert_eq!(sample.units.len(), 1);
        assert_eq!(
            sample.epilogue_lines.concat(),
            "\n    public static void helper() {\n    }\n}\n"
        );
    }

    #[test]
    fn test_next_unit_cursor_passing() {
        let lines = split_lines(GO_SAMPLE);
        let rules = Dialect::Go.rules();

        let (first, next) = next_unit(&lines, rules, 0).unwrap();
        assert_eq!(next, first.end_line);
        let (second, next) = next_unit(&lines, rules, next).unwrap();
        assert!(second.start_line >= first.end_line);
        assert!(next_unit(&lines, rules, next).is_none());
    }

    #[test]
    fn test_backtracking_stops_at_scan_start() {
        let text = "// comment one\n// x-ms-original-file: specs/A.json\nfunc ExampleA() {\n}\n";
        let lines = split_lines(text);
        let rules = Dialect::Go.rules();

        let (unit, _) = next_unit(&lines, rules, 1).unwrap();
        assert_eq!(unit.start_line, 1);
        let (unit, _) = next_unit(&lines, rules, 0).unwrap();
        assert_eq!(unit.start_line, 0);
    }

    fn go_unit(name: &str, body_lines: usize, comment_lines: usize) -> String {
        let mut out = String::new();
        for i in 0..comment_lines {
            out.push_str(&format!("// note {i}\n"));
        }
        out.push_str(&format!("// x-ms-original-file: specs/{name}.json\n"));
        out.push_str(&format!("func Example{name}() {{\n"));
        for i in 0..body_lines {
            out.push_str(&format!("\tstep{i}()\n"));
        }
        out.push_str("}\n\n");
        out
    }

    proptest! {
        #[test]
        fn prop_well_formed_units_are_all_found(
            shapes in prop::collection::vec((0usize..5, 0usize..3), 0..8)
        ) {
            let mut text = String::from("package widgets\n\nimport \"log\"\n\n");
            for (i, (body, comments)) in shapes.iter().enumerate() {
                text.push_str(&go_unit(&format!("U{i}"), *body, *comments));
            }
            let lines = split_lines(&text);
            let sample = AggregatedSample::from_lines(&lines, Dialect::Go.rules());

            prop_assert_eq!(sample.units.len(), shapes.len());
            for (i, unit) in sample.units.iter().enumerate() {
                let expected = format!("specs/U{i}.json");
                prop_assert_eq!(unit.spec_reference.as_deref(), Some(expected.as_str()));
                prop_assert_eq!(unit.body_lines.len(), unit.end_line - unit.start_line);
                prop_assert!(unit.body_lines[0].starts_with("//"));
            }
            for pair in sample.units.windows(2) {
                prop_assert!(pair[0].end_line <= pair[1].start_line);
            }
        }

        #[test]
        fn prop_contiguous_units_round_trip(
            bodies in prop::collection::vec(0usize..4, 1..6)
        ) {
            let mut text = String::from("package widgets\n\n");
            for (i, body) in bodies.iter().enumerate() {
                text.push_str(&format!("// x-ms-original-file: specs/C{i}.json\nfunc ExampleC{i}() {{\n"));
                for j in 0..*body {
                    text.push_str(&format!("\tcall{j}()\n"));
                }
                text.push_str("}\n");
            }
            text.push_str("\n// trailing\n");
            let lines = split_lines(&text);
            let sample = AggregatedSample::from_lines(&lines, Dialect::Go.rules());

            let mut rebuilt = sample.prologue_lines.concat();
            for unit in &sample.units {
                rebuilt.push_str(&unit.body_text());
            }
            rebuilt.push_str(&sample.epilogue_lines.concat());
            prop_assert_eq!(rebuilt, text);
        }
    }
}
