//! Per-dialect rule sets for aggregated sample segmentation.
//!
//! Each supported source dialect is described once by an immutable
//! [`DialectRules`] value. The segmenter and reconstructor only ever see the
//! rules, so no dialect branching happens inside the scanning loops.
//!
//! ```rust
//! use exemplar_core::Dialect;
//! use std::path::Path;
//!
//! let dialect = Dialect::from_path(Path::new("samples/widgets_client_test.go")).unwrap();
//! let rules = dialect.rules();
//! assert!(rules.is_unit_start("func ExampleWidgetsClient_Get() {\n"));
//! assert!(rules.is_unit_end("}\n"));
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The closed set of source dialects the segmenter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Go example tests (`*_test.go`), one free function per unit.
    Go,
    /// JavaScript samples, an async function plus its own invocation per unit.
    #[serde(rename = "js", alias = "javascript")]
    JavaScript,
    /// Java samples, static methods inside one shared class.
    Java,
}

/// How the leading prologue is trimmed once a prologue-end line is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrologueCut {
    /// Drop everything before the prologue-end line, keep the line itself.
    KeepEndLine,
    /// Drop everything up to and including the prologue-end line.
    DropEndLine,
}

/// Immutable rule set for one dialect.
#[derive(Debug)]
pub struct DialectRules {
    /// Dialect these rules describe.
    pub dialect: Dialect,
    /// Prefix of a trimmed marker-comment line; the rest is the spec reference.
    pub marker_prefix: &'static str,
    /// Whether units need the shared closing structure appended.
    pub requires_epilogue: bool,
    /// Whether the shared type is renamed so each file holds one symbol.
    pub shared_symbol_rename: bool,
    /// Name the shared symbol is renamed to when `shared_symbol_rename` holds.
    pub rename_target: &'static str,
    /// What happens to the prologue-end line itself.
    pub prologue_cut: PrologueCut,
    /// Suffix appended to the `examples` directory of the spec reference.
    pub dir_suffix: &'static str,
    /// Info string of the fenced markdown block.
    pub fence_tag: &'static str,
    /// Source file extension, without the dot.
    pub extension: &'static str,
    /// Default documentation link template.
    pub link_template: &'static str,
    unit_start: fn(&str) -> bool,
    unit_end: fn(&str) -> bool,
    comment_line: fn(&str) -> bool,
    prologue_end: fn(&str) -> bool,
    source_filter: fn(&str) -> bool,
    default_release_name: fn(&str, &str) -> String,
}

impl DialectRules {
    /// Returns the marker value when `line` is a marker comment.
    ///
    /// The value is trimmed; it is empty when the generator wrapped the
    /// reference onto the following comment lines.
    pub fn marker_value<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.trim()
            .strip_prefix(self.marker_prefix)
            .map(str::trim)
    }

    /// True when `line` is a marker comment.
    pub fn is_marker(&self, line: &str) -> bool {
        self.marker_value(line).is_some()
    }

    /// True when `line` opens a unit.
    pub fn is_unit_start(&self, line: &str) -> bool {
        (self.unit_start)(line)
    }

    /// True when `line` closes the current unit.
    pub fn is_unit_end(&self, line: &str) -> bool {
        (self.unit_end)(line)
    }

    /// True when `line` is part of a comment block attached to a unit.
    pub fn is_comment_line(&self, line: &str) -> bool {
        (self.comment_line)(line)
    }

    /// True when `line` terminates the leading file header.
    pub fn is_prologue_end(&self, line: &str) -> bool {
        (self.prologue_end)(line)
    }

    /// True when a file with this name is a candidate aggregated sample.
    pub fn accepts_file_name(&self, file_name: &str) -> bool {
        (self.source_filter)(file_name)
    }

    /// Ledger name of a release when the caller does not supply one.
    pub fn default_release_name(&self, package: &str, version: &str) -> String {
        (self.default_release_name)(package, version)
    }
}

fn slash_comment(line: &str) -> bool {
    line.trim().starts_with("//")
}

fn block_or_slash_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('*') || trimmed.starts_with("/*") || trimmed.starts_with("//")
}

fn package_line(line: &str) -> bool {
    line.starts_with("package")
}

static GO_RULES: DialectRules = DialectRules {
    dialect: Dialect::Go,
    marker_prefix: "// x-ms-original-file:",
    requires_epilogue: false,
    shared_symbol_rename: false,
    rename_target: "",
    prologue_cut: PrologueCut::KeepEndLine,
    dir_suffix: "-go",
    fence_tag: "go",
    extension: "go",
    link_template: "https://github.com/Azure/azure-sdk-for-go/blob/{tag}/{package}/README.md",
    unit_start: |line| line.starts_with("func "),
    unit_end: |line| line.starts_with('}'),
    comment_line: slash_comment,
    prologue_end: package_line,
    source_filter: |name| name.ends_with("_test.go"),
    default_release_name: |package, version| {
        format!("github.com/Azure/azure-sdk-for-go/{package}@{version}")
    },
};

static JS_RULES: DialectRules = DialectRules {
    dialect: Dialect::JavaScript,
    marker_prefix: "* x-ms-original-file:",
    requires_epilogue: false,
    shared_symbol_rename: false,
    rename_target: "",
    prologue_cut: PrologueCut::KeepEndLine,
    dir_suffix: "-js",
    fence_tag: "javascript",
    extension: "js",
    link_template: "https://github.com/Azure/azure-sdk-for-js/blob/{tag}/sdk/{sdk_name}/arm-{sdk_name}/README.md",
    unit_start: |line| line.starts_with("async function "),
    unit_end: |line| line.contains(".catch(console.error);"),
    comment_line: block_or_slash_comment,
    prologue_end: |line| !line.trim().is_empty() && !block_or_slash_comment(line),
    source_filter: |name| name.ends_with(".js"),
    default_release_name: |package, version| format!("{package}@{version}"),
};

static JAVA_RULES: DialectRules = DialectRules {
    dialect: Dialect::Java,
    marker_prefix: "* x-ms-original-file:",
    requires_epilogue: true,
    shared_symbol_rename: true,
    rename_target: "Main",
    prologue_cut: PrologueCut::DropEndLine,
    dir_suffix: "-java",
    fence_tag: "java",
    extension: "java",
    link_template: "https://github.com/Azure/azure-sdk-for-java/blob/{raw_tag}/sdk/{sdk_name}/{package}/README.md",
    unit_start: |line| line.starts_with("    public static void "),
    unit_end: |line| line.starts_with("    }"),
    comment_line: block_or_slash_comment,
    prologue_end: package_line,
    source_filter: |name| name.ends_with(".java"),
    default_release_name: |package, version| {
        format!("com.azure.resourcemanager:{package}:{version}")
    },
};

impl Dialect {
    /// All supported dialects.
    pub const ALL: [Self; 3] = [Self::Go, Self::JavaScript, Self::Java];

    /// The immutable rule set of this dialect.
    #[must_use]
    pub fn rules(self) -> &'static DialectRules {
        match self {
            Self::Go => &GO_RULES,
            Self::JavaScript => &JS_RULES,
            Self::Java => &JAVA_RULES,
        }
    }

    /// Select a dialect from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|d| d.rules().extension == ext)
    }

    /// Short name used in the ledger `language` column and on the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::JavaScript => "js",
            Self::Java => "java",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go" | "golang" => Ok(Self::Go),
            "js" | "javascript" => Ok(Self::JavaScript),
            "java" => Ok(Self::Java),
            other => Err(Error::Parse(format!("unknown dialect '{other}'"))),
        }
    }
}
