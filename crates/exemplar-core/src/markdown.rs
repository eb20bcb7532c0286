//! Markdown rendering of reconstructed units.
//!
//! Every artifact has the same shape:
//!
//! ````text
//! Read the [SDK documentation](https://...) on how to add the SDK to your project and authenticate.
//!
//! ```go
//! package armwidgets_test
//! ...
//! ```
//! ````
//!
//! The code is written verbatim, nothing inside the fence is escaped.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::dialect::DialectRules;
use crate::types::ReleaseInfo;

/// Bytes escaped in a tag used as a URL path segment; unreserved characters stay.
const TAG_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Expand a documentation link template for `release`.
///
/// Supported placeholders are `{tag}` (URL-encoded), `{raw_tag}`,
/// `{package}`, `{version}` and `{sdk_name}`. Unknown text is kept as is.
pub fn render_doc_link(template: &str, release: &ReleaseInfo) -> String {
    let encoded_tag = utf8_percent_encode(&release.tag, TAG_SEGMENT).to_string();
    template
        .replace("{tag}", &encoded_tag)
        .replace("{raw_tag}", &release.tag)
        .replace("{package}", &release.package)
        .replace("{version}", &release.version)
        .replace("{sdk_name}", &release.sdk_name)
}

/// The sentence placed above every code block.
pub fn reference_line(doc_link: &str) -> String {
    format!(
        "Read the [SDK documentation]({doc_link}) on how to add the SDK to your project and authenticate."
    )
}

/// Render one artifact.
pub fn render(reference: &str, rules: &DialectRules, code: &str) -> String {
    let mut out = String::with_capacity(reference.len() + code.len() + 32);
    out.push_str(reference);
    out.push_str("\n\n```");
    out.push_str(rules.fence_tag);
    out.push('\n');
    out.push_str(code);
    if !code.is_empty() && !code.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("```\n");
    out
}

/// Markdown renderer bound to one dialect and release.
#[derive(Debug, Clone)]
pub struct MarkdownEmitter {
    rules: &'static DialectRules,
    reference: String,
}

impl MarkdownEmitter {
    /// Build an emitter; `link_template` overrides the dialect's default.
    pub fn new(rules: &'static DialectRules, release: &ReleaseInfo, link_template: Option<&str>) -> Self {
        let template = link_template.unwrap_or(rules.link_template);
        Self {
            rules,
            reference: reference_line(&render_doc_link(template, release)),
        }
    }

    /// The reference line shared by every artifact of this release.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Render `code` as a complete markdown document.
    pub fn emit(&self, code: &str) -> String {
        render(&self.reference, self.rules, code)
    }
}
