//! Header passes: setext underlines and atx hash prefixes, both with the
//! optional trailing `{#id}` attribute.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::engine::Transform;
use crate::hashing::ProtectKind;

/// Setext form: a text line, an optional `{#id}`, then a line of `=` or `-`.
static SETEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(.+?)(?: +\{#([-_:a-zA-Z0-9]+)\})? *\n(=+|-+) *\n+").unwrap()
});

/// Atx form: one to six `#`, text, optional closing hashes, optional `{#id}`.
static ATX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(#{1,6}) *(.+?) *#*(?: +\{#([-_:a-zA-Z0-9]+)\})? *\n+").unwrap()
});

impl Transform<'_> {
    pub(crate) fn do_headers(&mut self, text: &str) -> String {
        let text = SETEXT_RE
            .replace_all(text, |caps: &Captures| {
                let content = caps.get(1).unwrap().as_str();
                let underline = caps.get(3).unwrap().as_str();
                // A dash underline right below a list-looking line is a list,
                // not a header.
                if underline.starts_with('-') && content.starts_with("- ") {
                    return caps.get(0).unwrap().as_str().to_string();
                }
                let level = if underline.starts_with('=') { 1 } else { 2 };
                let id = caps.get(2).map(|m| m.as_str());
                self.header_block(level, content, id)
            })
            .into_owned();

        ATX_RE
            .replace_all(&text, |caps: &Captures| {
                let level = caps.get(1).unwrap().as_str().len();
                let content = caps.get(2).unwrap().as_str();
                let id = caps.get(3).map(|m| m.as_str());
                self.header_block(level, content, id)
            })
            .into_owned()
    }

    fn header_block(&mut self, level: usize, content: &str, id: Option<&str>) -> String {
        let attr = match id {
            Some(id) if !id.is_empty() => format!(" id=\"{id}\""),
            _ => String::new(),
        };
        let span = self.run_span_gamut(content);
        let block = format!("<h{level}{attr}>{span}</h{level}>");
        format!("\n{}\n\n", self.hashes.protect(&block, ProtectKind::Block))
    }
}
