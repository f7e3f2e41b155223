//! Raw-mode scanner half.
//!
//! Consumes one raw HTML element from its opening tag through the matching
//! close tag, tracking nesting depth only for tags whose name equals the
//! starting tag's. When a `markdown` attribute allows it, the element's
//! interior is handed back to the dialect-mode half, with the indentation
//! in front of the tag as the new baseline so nested indentation is not
//! mistaken for a code block.

use crate::engine::Transform;
use crate::escape::{leading_spaces, outdent_by};
use crate::hashing::ProtectKind;
use crate::scanner::tags::{self, Tag};
use crate::scanner::{dialect, ScanContext, AUTO_CLOSE_TAGS, SPAN_CONTAINER_TAGS};

use once_cell::sync::Lazy;
use regex::Regex;

/// The `markdown` attribute in its three quoting forms. Tried in order;
/// the first match wins.
static MD_ATTR_DOUBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\smarkdown\s*=\s*"([^"]*)""#).unwrap());
static MD_ATTR_SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\smarkdown\s*=\s*'([^']*)'").unwrap());
static MD_ATTR_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\smarkdown\s*=\s*([^\s>'"]*)"#).unwrap());

enum RawToken {
    Opaque(usize),
    Tag(Tag),
}

/// Scan one raw element starting at the opening tag of `input`.
///
/// Returns the processed text (fragments sealed behind `kind` tokens, any
/// `markdown="1"` interiors re-parsed and spliced back) and the number of
/// bytes consumed. On unbalanced markup the very first character is
/// returned as "safely consumed" so the caller always makes progress.
pub(crate) fn scan(
    transform: &mut Transform<'_>,
    input: &str,
    kind: ProtectKind,
    md_attr: bool,
) -> (String, usize) {
    if input.is_empty() {
        return (String::new(), 0);
    }
    let base_name = tags::match_tag(input).map(|tag| tag.name);

    let mut parsed = String::new();
    let mut block_text = String::new();
    let mut offset = 0usize;
    let mut depth: i32 = 0;

    loop {
        let rest = &input[offset..];
        let Some((pos, token)) = find_raw_token(rest) else {
            // End of input with unresolved nesting: degrade to literal text,
            // one character at a time.
            let first_len = input.chars().next().map(char::len_utf8).unwrap_or(0);
            return (input[..first_len].to_string(), first_len);
        };
        block_text.push_str(&rest[..pos]);
        offset += pos;
        let after = &input[offset..];

        match token {
            RawToken::Opaque(len) => {
                block_text.push_str(&after[..len]);
                offset += len;
            }
            RawToken::Tag(tag) => {
                let name = tag.name.as_str();
                if AUTO_CLOSE_TAGS.contains(&name) {
                    block_text.push_str(&after[..tag.len]);
                    offset += tag.len;
                } else {
                    if base_name.as_deref() == Some(name) {
                        if tag.closing {
                            depth -= 1;
                        } else if !tag.self_closing {
                            depth += 1;
                        }
                    }
                    let reentry = if md_attr && !tag.closing {
                        markdown_attribute(&after[..tag.len])
                    } else {
                        None
                    };
                    match reentry {
                        Some((cleaned_tag, mode)) => {
                            let span_mode = mode == "span"
                                || (mode != "block" && SPAN_CONTAINER_TAGS.contains(&name));
                            // Indentation in front of the tag becomes the
                            // baseline for the re-entered interior.
                            let last_line = block_text.rsplit('\n').next().unwrap_or("");
                            let indent = leading_spaces(last_line);

                            block_text.push_str(&cleaned_tag);
                            let sealed = transform.hashes.protect(&block_text, kind);
                            parsed.push_str(&sealed);
                            block_text.clear();
                            offset += tag.len;

                            let ctx = ScanContext {
                                indent,
                                enclosing_tag: Some(tag.name.clone()),
                                span_mode,
                            };
                            let (inner, consumed) =
                                dialect::scan(transform, &input[offset..], &ctx);
                            offset += consumed;
                            let inner = outdent_by(&inner, indent);
                            if span_mode {
                                parsed.push_str(&inner);
                            } else {
                                parsed.push_str("\n\n");
                                parsed.push_str(&inner);
                                parsed.push_str("\n\n");
                            }
                        }
                        None => {
                            block_text.push_str(&after[..tag.len]);
                            offset += tag.len;
                        }
                    }
                }
            }
        }

        if depth <= 0 {
            break;
        }
    }

    let sealed = transform.hashes.protect(&block_text, kind);
    parsed.push_str(&sealed);
    (parsed, offset)
}

/// Extract and remove a `markdown` attribute whose value enables re-entry.
/// Returns the cleaned tag text and the attribute value.
fn markdown_attribute(tag_text: &str) -> Option<(String, String)> {
    for re in [&*MD_ATTR_DOUBLE, &*MD_ATTR_SINGLE, &*MD_ATTR_BARE] {
        if let Some(caps) = re.captures(tag_text) {
            let value = caps.get(1).unwrap().as_str().to_string();
            if value == "1" || value == "block" || value == "span" {
                let whole = caps.get(0).unwrap();
                let mut cleaned = String::with_capacity(tag_text.len());
                cleaned.push_str(&tag_text[..whole.start()]);
                cleaned.push_str(&tag_text[whole.end()..]);
                return Some((cleaned, value));
            }
        }
    }
    None
}

/// The earliest construct the raw half cares about: any tag, or an opaque
/// comment / processing instruction / CDATA section.
fn find_raw_token(rest: &str) -> Option<(usize, RawToken)> {
    let mut from = 0;
    while let Some(off) = rest[from..].find('<') {
        let i = from + off;
        let s = &rest[i..];
        if let Some(len) = tags::match_comment(s) {
            return Some((i, RawToken::Opaque(len)));
        }
        if let Some(len) = tags::match_instruction(s) {
            return Some((i, RawToken::Opaque(len)));
        }
        if let Some(len) = tags::match_cdata(s) {
            return Some((i, RawToken::Opaque(len)));
        }
        if let Some(tag) = tags::match_tag(s) {
            return Some((i, RawToken::Tag(tag)));
        }
        from = i + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_attribute_forms() {
        let (cleaned, value) = markdown_attribute(r#"<div markdown="1" class="x">"#).unwrap();
        assert_eq!(cleaned, r#"<div class="x">"#);
        assert_eq!(value, "1");

        let (cleaned, value) = markdown_attribute("<div markdown='span'>").unwrap();
        assert_eq!(cleaned, "<div>");
        assert_eq!(value, "span");

        let (cleaned, value) = markdown_attribute("<div markdown=block>").unwrap();
        assert_eq!(cleaned, "<div>");
        assert_eq!(value, "block");
    }

    #[test]
    fn test_markdown_attribute_rejects_other_values() {
        assert!(markdown_attribute(r#"<div markdown="0">"#).is_none());
        assert!(markdown_attribute("<div class='markdown'>").is_none());
    }
}
