//! Annotation scanning: finding marker comments in generated sources.
//!
//! A marker comment carries the path of the specification example that the
//! following routine demonstrates:
//!
//! ```text
//! // x-ms-original-file: specification/widgets/examples/Widgets_Get.json
//! ```
//!
//! Generators sometimes wrap long references, leaving the marker line empty
//! and continuing the path on the following comment lines:
//!
//! ```text
//! /*
//!  * x-ms-original-file:
//!  * specification/widgets/resource-manager/stable/2024-01-01/examples/
//!  * Widgets_Get.json
//!  */
//! ```

use crate::dialect::DialectRules;

/// Returns true when any line carries a marker comment for this dialect.
///
/// Used as a cheap pre-filter so files without markers are never segmented.
pub fn is_aggregated_sample(lines: &[&str], rules: &DialectRules) -> bool {
    lines.iter().any(|line| rules.is_marker(line))
}

/// Resolves the spec reference of the marker at `index`, if that line is one.
///
/// An empty marker value is completed from the continuation lines below it.
/// Returns `None` when the line is not a marker or no reference text is found.
pub fn marker_reference(lines: &[&str], index: usize, rules: &DialectRules) -> Option<String> {
    let value = rules.marker_value(lines.get(index)?)?;
    if !value.is_empty() {
        return Some(value.to_string());
    }

    let mut reference = String::new();
    for line in &lines[index + 1..] {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("*/") || !rules.is_comment_line(line) {
            break;
        }
        let piece = trimmed
            .strip_prefix("//")
            .or_else(|| trimmed.strip_prefix('*'))
            .unwrap_or(trimmed)
            .trim();
        reference.push_str(piece);
    }

    (!reference.is_empty()).then_some(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;
    use crate::segment::split_lines;

    #[test]
    fn test_detects_marker_anywhere() {
        let text = "package widgets\n\nimport \"fmt\"\n\n// x-ms-original-file: specs/A.json\nfunc Example() {\n}\n";
        let lines = split_lines(text);
        assert!(is_aggregated_sample(&lines, Dialect::Go.rules()));
    }

    #[test]
    fn test_ignores_files_without_marker() {
        let text = "package widgets\n\nfunc helper() {\n}\n";
        let lines = split_lines(text);
        assert!(!is_aggregated_sample(&lines, Dialect::Go.rules()));
        assert!(!is_aggregated_sample(&[], Dialect::Go.rules()));
    }

    #[test]
    fn test_marker_of_other_dialect_is_not_detected() {
        let lines = split_lines("// x-ms-original-file: specs/A.json\n");
        assert!(!is_aggregated_sample(&lines, Dialect::JavaScript.rules()));
    }

    #[test]
    fn test_inline_reference() {
        let lines = split_lines(" * x-ms-original-file: specs/widgets/examples/Get.json\n");
        assert_eq!(
            marker_reference(&lines, 0, Dialect::JavaScript.rules()).as_deref(),
            Some("specs/widgets/examples/Get.json")
        );
    }

    #[test]
    fn test_wrapped_reference_is_joined() {
        let text = "    /*\n     * x-ms-original-file:\n     * specification/widgets/preview/2020-03-01-preview/examples/\n     * Cluster_Create.json\n     */\n";
        let lines = split_lines(text);
        assert_eq!(
            marker_reference(&lines, 1, Dialect::Java.rules()).as_deref(),
            Some("specification/widgets/preview/2020-03-01-preview/examples/Cluster_Create.json")
        );
    }

    #[test]
    fn test_empty_marker_without_continuation() {
        let lines = split_lines("     * x-ms-original-file:\n     */\n");
        assert_eq!(marker_reference(&lines, 0, Dialect::Java.rules()), None);
    }

    #[test]
    fn test_non_marker_line() {
        let lines = split_lines("func Example() {\n");
        assert_eq!(marker_reference(&lines, 0, Dialect::Go.rules()), None);
        assert_eq!(marker_reference(&lines, 5, Dialect::Go.rules()), None);
    }
}
