//! Mapping spec references to output locations.
//!
//! A unit demonstrating `specification/widgets/examples/Widgets_Get.json`
//! is published as `specification/widgets/examples-go/Widgets_Get.md`, next
//! to the examples of every other dialect.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// Name of the directory segment that holds specification examples.
const EXAMPLES_SEGMENT: &str = "examples";

/// Output directory and file stem derived from a spec reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TargetPath {
    /// Directory relative to the output root, `/`-separated.
    pub dir: String,
    /// File name without extension.
    pub stem: String,
}

impl TargetPath {
    /// Relative path of the markdown artifact, `/`-separated.
    pub fn markdown_path(&self) -> String {
        if self.dir.is_empty() {
            format!("{}.md", self.stem)
        } else {
            format!("{}/{}.md", self.dir, self.stem)
        }
    }

    /// Join the markdown path onto `root`.
    ///
    /// Returns `None` when the relative path would escape `root` (absolute
    /// paths, `..` segments) or the stem is empty.
    pub fn resolve_under(&self, root: &Path) -> Option<PathBuf> {
        self.is_contained()
            .then(|| root.join(self.markdown_path()))
    }

    /// True when the markdown path is relative and stays below its root.
    pub fn is_contained(&self) -> bool {
        !self.stem.is_empty()
            && Path::new(&self.markdown_path())
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
    }
}

/// Derive the output directory and stem for `spec_reference`.
///
/// Every `examples` segment of the directory becomes `examples<suffix>`; when
/// there is none the suffix is appended to the last segment. The stem is the
/// file name up to its first `.`.
pub fn map_target(spec_reference: &str, suffix: &str) -> TargetPath {
    let normalized = spec_reference.trim().replace('\\', "/");
    let (dir, file_name) = normalized
        .rsplit_once('/')
        .unwrap_or(("", normalized.as_str()));

    let stem = file_name.split('.').next().unwrap_or_default().to_string();

    let mut segments: Vec<String> = dir
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let mut replaced = false;
    for segment in &mut segments {
        if segment == EXAMPLES_SEGMENT {
            segment.push_str(suffix);
            replaced = true;
        }
    }
    if !replaced {
        if let Some(last) = segments.last_mut() {
            last.push_str(suffix);
        }
    }

    TargetPath {
        dir: segments.join("/"),
        stem,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_directory_gets_suffix() {
        let target = map_target("a/b/examples/Foo.json", "-X");
        assert_eq!(target.dir, "a/b/examples-X");
        assert_eq!(target.stem, "Foo");
        assert_eq!(target.markdown_path(), "a/b/examples-X/Foo.md");
    }

    #[test]
    fn test_nested_examples_segment_is_substituted() {
        let target = map_target(
            "specification/widgets/stable/2024-01-01/examples/widgets/Widgets_Get.json",
            "-go",
        );
        assert_eq!(target.dir, "specification/widgets/stable/2024-01-01/examples-go/widgets");
        assert_eq!(target.stem, "Widgets_Get");
    }

    #[test]
    fn test_missing_examples_segment_appends_to_last() {
        let target = map_target("specs/widgets/samples/Get.json", "-java");
        assert_eq!(target.dir, "specs/widgets/samples-java");
        assert_eq!(target.stem, "Get");
    }

    #[test]
    fn test_stem_stops_at_first_dot() {
        let target = map_target("x/examples/Widgets.Get.v2.json", "-js");
        assert_eq!(target.stem, "Widgets");
    }

    #[test]
    fn test_bare_file_name() {
        let target = map_target("Foo.json", "-go");
        assert_eq!(target.dir, "");
        assert_eq!(target.markdown_path(), "Foo.md");
    }

    #[test]
    fn test_backslashes_are_normalized() {
        let target = map_target("a\\examples\\Foo.json", "-go");
        assert_eq!(target.dir, "a/examples-go");
    }

    #[test]
    fn test_resolve_under_rejects_escapes() {
        let root = Path::new("/out");
        let ok = map_target("a/examples/Foo.json", "-go");
        assert_eq!(
            ok.resolve_under(root).unwrap(),
            PathBuf::from("/out/a/examples-go/Foo.md")
        );

        let escaping = map_target("../../etc/examples/passwd.json", "-go");
        assert!(escaping.resolve_under(root).is_none());

        let empty = map_target("a/examples/.json", "-go");
        assert!(empty.resolve_under(root).is_none());
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let a = map_target("a/b/examples/Foo.json", "-X");
        let b = map_target("a/b/examples/Foo.json", "-X");
        assert_eq!(a, b);
    }
}
