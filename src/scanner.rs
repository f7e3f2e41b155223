//! Raw-markup scanner: separates literal HTML regions from dialect text.
//!
//! Two mutually recursive halves walk the document. The dialect-mode half
//! ([`dialect`]) owns Markdown text and hands off to the raw-mode half
//! whenever a block-level or clean HTML element opens; the raw-mode half
//! ([`raw`]) consumes the element through its matching close tag and, when
//! it finds a `markdown="1"` attribute, hands the element's interior right
//! back to the dialect half. Finalized HTML lands in the placeholder store
//! so no later pass re-interprets it.
//!
//! Both halves are explicit scanners over a "next interesting token"
//! stream (tag open/close, comment, processing instruction, CDATA, code
//! span marker, indented code, fence marker) with explicit depth counters.
//! Every step consumes at least one byte of input, which is the whole
//! termination argument: malformed or unbalanced markup degrades to
//! literal text instead of looping or failing.

pub(crate) mod dialect;
pub(crate) mod raw;
pub(crate) mod tags;

use tracing::trace;

use crate::engine::Transform;

/// Tags always treated as block-level.
pub(crate) const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "table", "dl", "ol",
    "ul", "address", "form", "fieldset", "iframe", "hr", "legend",
];

/// Tags treated as block-level only when the opening tag sits alone on its
/// line.
pub(crate) const CONTEXT_BLOCK_TAGS: &[&str] = &["script", "noscript", "math", "ins", "del"];

/// Tags whose contents must never be reinterpreted, wherever they appear.
pub(crate) const CLEAN_TAGS: &[&str] = &["script", "math"];

/// Containers whose `markdown` attribute defaults to span mode. Kept as
/// data; a tag outside this list defaults to block mode rather than being
/// guessed at.
pub(crate) const SPAN_CONTAINER_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "dd", "dt", "td", "th", "legend", "address",
];

/// Void tags that never need a close tag.
pub(crate) const AUTO_CLOSE_TAGS: &[&str] = &["hr", "img"];

/// Ambient scanner state, passed explicitly through every recursive step.
#[derive(Debug, Clone)]
pub(crate) struct ScanContext {
    /// Indentation baseline: spaces to ignore before code-block detection,
    /// so an indented `markdown="1"` element does not turn its whole
    /// interior into a code block.
    pub indent: usize,
    /// When set, scanning stops at the first unmatched closing tag with
    /// this name (nesting tracked).
    pub enclosing_tag: Option<String>,
    /// Inside an inline container: indented code and fences are off, and
    /// double line breaks must not open a new paragraph.
    pub span_mode: bool,
}

impl ScanContext {
    pub fn document() -> Self {
        ScanContext {
            indent: 0,
            enclosing_tag: None,
            span_mode: false,
        }
    }
}

/// Scan a document (or block-gamut re-entry region) for raw HTML blocks,
/// sealing each one behind a placeholder token.
pub(crate) fn scan_blocks(transform: &mut Transform<'_>, text: &str) -> String {
    trace!(len = text.len(), "raw-markup block scan");
    let ctx = ScanContext::document();
    let (parsed, consumed) = dialect::scan(transform, text, &ctx);
    if consumed < text.len() {
        // No enclosing tag at the top level, so this only happens on a
        // pathological depth underflow; keep the remainder as-is.
        let mut out = parsed;
        out.push_str(&text[consumed..]);
        out
    } else {
        parsed
    }
}
