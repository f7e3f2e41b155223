//! Footnotes: definition stripping, inline reference markers, and the
//! rendered list appended at the end of the document.
//!
//! References turn into interim tokens carrying the sentinel byte, so no
//! other pass can touch them; the append pass resolves them to numbered
//! markers and renders the referenced bodies in first-reference order.
//! A repeated reference reuses its footnote's visible number.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::engine::Transform;
use crate::escape::{encode_attribute, is_blank, leading_spaces, outdent};

static FN_DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}\[\^(.+?)\] ?:[ ]*(.*)$").unwrap());
static FN_REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\^(.+?)\]").unwrap());
static FN_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("F\u{1A}fn:(.*?)\u{1A}:").unwrap());

fn trim_newline(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

impl Transform<'_> {
    /// Remove `[^id]: body` definitions into the footnote table. A body may
    /// continue over following lines; a blank line only stays inside the
    /// body when indented content follows it.
    pub(crate) fn strip_footnotes(&mut self, text: &str) -> String {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < lines.len() {
            let line = trim_newline(lines[i]);
            let Some(caps) = FN_DEF_RE.captures(line) else {
                out.push_str(lines[i]);
                i += 1;
                continue;
            };
            let id = caps.get(1).unwrap().as_str().to_string();
            let first = caps.get(2).unwrap().as_str();

            let mut body = String::new();
            if !first.trim().is_empty() {
                body.push_str(first);
                body.push('\n');
            }
            let mut j = i + 1;
            while j < lines.len() {
                let current = trim_newline(lines[j]);
                if is_blank(current) {
                    // Only indented continuation keeps the body open.
                    let mut k = j;
                    while k < lines.len() && is_blank(trim_newline(lines[k])) {
                        k += 1;
                    }
                    if k < lines.len() && leading_spaces(trim_newline(lines[k])) >= 4 {
                        for line in &lines[j..k] {
                            body.push_str(line);
                        }
                        j = k;
                        continue;
                    }
                    break;
                }
                if FN_DEF_RE.is_match(current) {
                    break;
                }
                body.push_str(lines[j]);
                j += 1;
            }

            self.footnotes.insert(id, outdent(&body));
            i = j;
        }
        out
    }

    /// Replace `[^id]` references with interim tokens. Runs early in the
    /// span gamut so the link passes never see the brackets.
    pub(crate) fn do_footnote_refs(&mut self, text: &str) -> String {
        if self.in_anchor {
            return text.to_string();
        }
        FN_REF_RE
            .replace_all(text, "F\u{1A}fn:${1}\u{1A}:")
            .into_owned()
    }

    /// Resolve reference tokens to numbered markers and append the rendered
    /// footnote list. Bodies go back through the block gamut and may
    /// themselves reference further footnotes.
    pub(crate) fn append_footnotes(&mut self, text: &str) -> String {
        let mut text = FN_TOKEN_RE
            .replace_all(text, |caps: &Captures| self.footnote_marker(&caps[1]))
            .into_owned();

        if self.footnotes_ordered.is_empty() {
            return text;
        }

        let options = self.options();
        let suffix = options.empty_element_suffix.clone();
        let prefix = options.footnote_id_prefix.clone();
        let backlink_class = options.footnote_backlink_class.clone();
        let backlink_title = options.footnote_backlink_title.clone();

        text.push_str("\n\n<div class=\"footnotes\">\n");
        text.push_str(&format!("<hr{suffix}\n"));
        text.push_str("<ol>\n\n");

        let mut index = 0;
        while index < self.footnotes_ordered.len() {
            let (id, body) = self.footnotes_ordered[index].clone();
            index += 1;
            let num = self.footnote_numbers.get(&id).copied().unwrap_or(index);

            let rendered = self.run_block_gamut(&format!("{body}\n\n"));
            let mut footnote = FN_TOKEN_RE
                .replace_all(&rendered, |caps: &Captures| self.footnote_marker(&caps[1]))
                .into_owned();

            let mut attr = String::from(" rev=\"footnote\"");
            if !backlink_class.is_empty() {
                attr.push_str(&format!(" class=\"{}\"", encode_attribute(&backlink_class)));
            }
            if !backlink_title.is_empty() {
                attr.push_str(&format!(" title=\"{}\"", encode_attribute(&backlink_title)));
            }
            let attr = attr.replace("%%", &num.to_string());

            let anchor_id = format!("{prefix}{}", encode_attribute(&id));
            let backlink = format!("<a href=\"#fnref:{anchor_id}\"{attr}>&#8617;</a>");
            if let Some(stripped) = footnote.strip_suffix("</p>") {
                footnote = format!("{stripped}&#160;{backlink}</p>");
            } else {
                footnote.push_str(&format!("\n\n<p>{backlink}</p>"));
            }

            text.push_str(&format!("<li id=\"fn:{anchor_id}\">\n{footnote}\n</li>\n\n"));
        }

        text.push_str("</ol>\n</div>");
        text
    }

    /// The inline marker for one reference. The first reference assigns the
    /// next visible number and queues the body for rendering; later
    /// references reuse the number; an unknown id stays literal.
    fn footnote_marker(&mut self, raw_id: &str) -> String {
        let options = self.options();
        let prefix = options.footnote_id_prefix.clone();
        let link_class = options.footnote_link_class.clone();
        let link_title = options.footnote_link_title.clone();

        let known = self.footnote_numbers.contains_key(raw_id);
        if !known && !self.footnotes.contains_key(raw_id) {
            return format!("[^{raw_id}]");
        }

        let (num, first) = if known {
            (self.footnote_numbers[raw_id], false)
        } else {
            let num = self.footnote_numbers.len() + 1;
            let body = self.footnotes.remove(raw_id).unwrap();
            self.footnote_numbers.insert(raw_id.to_string(), num);
            self.footnotes_ordered.push((raw_id.to_string(), body));
            (num, true)
        };

        let mut attr = String::from(" rel=\"footnote\"");
        if !link_class.is_empty() {
            attr.push_str(&format!(" class=\"{}\"", encode_attribute(&link_class)));
        }
        if !link_title.is_empty() {
            attr.push_str(&format!(" title=\"{}\"", encode_attribute(&link_title)));
        }
        let attr = attr.replace("%%", &num.to_string());

        let anchor_id = format!("{prefix}{}", encode_attribute(raw_id));
        if first {
            format!("<sup id=\"fnref:{anchor_id}\"><a href=\"#fn:{anchor_id}\"{attr}>{num}</a></sup>")
        } else {
            // Repeat reference: same number, no second anchor id.
            format!("<sup><a href=\"#fn:{anchor_id}\"{attr}>{num}</a></sup>")
        }
    }
}
