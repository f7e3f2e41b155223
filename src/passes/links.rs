//! Link passes: definition stripping, inline / reference / shortcut links,
//! images, autolinks and the obfuscated mailto form.
//!
//! Bracketed constructs are parsed with explicit little scanners (nesting
//! depth capped) instead of patterns, so unbalanced input degrades to
//! literal text without any backtracking cliffs.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::engine::Transform;
use crate::escape::{crc32, encode_attribute};
use crate::hashing::ProtectKind;

/// Most brackets may nest inside link text.
const BRACKET_DEPTH: usize = 6;
/// Parentheses may nest inside inline destinations.
const PAREN_DEPTH: usize = 4;

static LINK_DEF_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}\[(.+)\] ?:[ \t]*(.*)$").unwrap());
static TITLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[ \t]*["(](.*)[")][ \t]*$"#).unwrap());
static AUTO_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<((?:https?|ftp|dict):[^'">\s]+)>"#).unwrap());
static AUTO_EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:mailto:)?([-.\w]+@[-a-z0-9]+(?:\.[-a-z0-9]+)*\.[a-z]+)>").unwrap()
});

/// Case-fold a reference id and collapse line breaks to single spaces.
fn normalize_ref_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut chars = id.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\n' || (ch == ' ' && chars.peek() == Some(&'\n')) {
            if ch == ' ' {
                chars.next();
            }
            out.push(' ');
        } else {
            out.push(ch.to_ascii_lowercase());
        }
    }
    out
}

fn strip_angles(url: &str) -> &str {
    url.strip_prefix('<')
        .and_then(|u| u.strip_suffix('>'))
        .unwrap_or(url)
}

/// Find the matching `]` for the bracket at `open`, allowing limited
/// nesting. Returns the inner text and the index just past the bracket.
fn match_bracketed(text: &str, open: usize, max_depth: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    debug_assert_eq!(bytes[open], b'[');
    let mut depth = 0usize;
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                depth += 1;
                if depth > max_depth {
                    return None;
                }
            }
            b']' => {
                if depth == 0 {
                    return Some((&text[open + 1..i], i + 1));
                }
                depth -= 1;
            }
            b'\n' if bytes.get(i + 1) == Some(&b'\n') => return None,
            _ => {}
        }
        i += 1;
    }
    None
}

/// `[id]` right after link text, allowing one space or a line break in
/// between. Returns the raw id and the offset past the closing bracket.
fn match_ref_id(rest: &str) -> Option<(&str, usize)> {
    let bytes = rest.as_bytes();
    let mut i = 0usize;
    if bytes.get(i) == Some(&b' ') {
        i += 1;
    }
    if bytes.get(i) == Some(&b'\n') {
        i += 1;
        while bytes.get(i) == Some(&b' ') {
            i += 1;
        }
    }
    if bytes.get(i) != Some(&b'[') {
        return None;
    }
    let close = rest[i + 1..].find(']')? + i + 1;
    Some((&rest[i + 1..close], close + 1))
}

/// Parse `(url "title")` starting at the opening parenthesis. Returns the
/// url, the optional title, and the bytes consumed.
fn parse_inline_destination(s: &str) -> Option<(String, Option<String>, usize)> {
    let bytes = s.as_bytes();
    debug_assert_eq!(bytes[0], b'(');
    let mut i = 1usize;
    while matches!(bytes.get(i), Some(b' ') | Some(b'\n')) {
        i += 1;
    }

    let url: String;
    if bytes.get(i) == Some(&b'<') {
        let close = s[i..].find('>')? + i;
        url = s[i + 1..close].to_string();
        i = close + 1;
    } else {
        let start = i;
        let mut depth = 0usize;
        loop {
            match bytes.get(i) {
                None => return None,
                Some(b'(') => {
                    depth += 1;
                    if depth > PAREN_DEPTH {
                        return None;
                    }
                    i += 1;
                }
                Some(b')') => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    i += 1;
                }
                Some(b' ') | Some(b'\n') => break,
                Some(_) => i += 1,
            }
        }
        url = s[start..i].to_string();
    }

    while matches!(bytes.get(i), Some(b' ') | Some(b'\n')) {
        i += 1;
    }

    let mut title = None;
    if let Some(&quote) = bytes.get(i).filter(|b| matches!(b, b'"' | b'\'')) {
        // The closing quote is the one followed by only whitespace and `)`.
        let mut k = i + 1;
        while k < bytes.len() {
            if bytes[k] == quote {
                let mut rest = k + 1;
                while matches!(bytes.get(rest), Some(b' ') | Some(b'\n')) {
                    rest += 1;
                }
                if bytes.get(rest) == Some(&b')') {
                    title = Some(s[i + 1..k].to_string());
                    i = rest;
                    break;
                }
            }
            k += 1;
        }
        title.as_ref()?;
    }

    if bytes.get(i) != Some(&b')') {
        return None;
    }
    Some((url, title, i + 1))
}

impl Transform<'_> {
    /// Strip `[id]: url "optional title"` definitions into the reference
    /// tables. The title may sit on its own line.
    pub(crate) fn strip_link_definitions(&mut self, text: &str) -> String {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].strip_suffix('\n').unwrap_or(lines[i]);
            let Some(caps) = LINK_DEF_LINE.captures(line) else {
                out.push_str(lines[i]);
                i += 1;
                continue;
            };
            let id = normalize_ref_id(caps.get(1).unwrap().as_str());
            let mut rest = caps.get(2).unwrap().as_str().trim().to_string();
            let mut consumed = 1usize;
            if rest.is_empty() {
                // Url on the following line.
                match lines.get(i + 1) {
                    Some(next) if !next.trim().is_empty() => {
                        rest = next.trim().to_string();
                        consumed = 2;
                    }
                    _ => {
                        out.push_str(lines[i]);
                        i += 1;
                        continue;
                    }
                }
            }

            let (url_part, tail) = match rest.find(char::is_whitespace) {
                Some(pos) => (&rest[..pos], rest[pos..].trim()),
                None => (rest.as_str(), ""),
            };
            let url = strip_angles(url_part).to_string();

            let mut title = None;
            if !tail.is_empty() {
                match TITLE_LINE.captures(tail) {
                    Some(title_caps) => title = Some(title_caps.get(1).unwrap().as_str().to_string()),
                    None => {
                        // Junk after the url: not a definition after all.
                        out.push_str(lines[i]);
                        i += 1;
                        continue;
                    }
                }
            } else if let Some(next) = lines.get(i + consumed) {
                if let Some(title_caps) = TITLE_LINE.captures(next.strip_suffix('\n').unwrap_or(next))
                {
                    title = Some(title_caps.get(1).unwrap().as_str().to_string());
                    consumed += 1;
                }
            }

            if let Some(title) = title {
                self.titles.insert(id.clone(), title);
            }
            self.urls.insert(id, url);
            i += consumed;
        }
        out
    }

    /// Inline, reference and shortcut links.
    pub(crate) fn do_anchors(&mut self, text: &str) -> String {
        if self.in_anchor {
            return text.to_string();
        }
        self.in_anchor = true;

        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut plain = 0usize;
        let mut i = 0usize;
        while i < bytes.len() {
            if bytes[i] != b'[' {
                i += 1;
                continue;
            }
            match self.try_link_at(text, i) {
                Some((replacement, end)) => {
                    out.push_str(&text[plain..i]);
                    out.push_str(&replacement);
                    i = end;
                    plain = i;
                }
                None => i += 1,
            }
        }
        out.push_str(&text[plain..]);
        self.in_anchor = false;
        out
    }

    fn try_link_at(&mut self, text: &str, open: usize) -> Option<(String, usize)> {
        let features = self.features();
        let (link_text, after) = match_bracketed(text, open, BRACKET_DEPTH)?;
        let rest = &text[after..];

        if rest.starts_with('(') {
            if !features.inline_link {
                return None;
            }
            let (url, title, consumed) = parse_inline_destination(rest)?;
            let anchor = self.build_anchor(link_text, strip_angles(&url), title.as_deref());
            return Some((anchor, after + consumed));
        }

        if let Some((raw_id, id_len)) = match_ref_id(rest) {
            if !features.reference_link {
                return None;
            }
            let id = if raw_id.trim().is_empty() {
                normalize_ref_id(link_text)
            } else {
                normalize_ref_id(raw_id)
            };
            let end = after + id_len;
            return match self.urls.get(&id).cloned() {
                Some(url) => {
                    let title = self.titles.get(&id).cloned();
                    let anchor = self.build_anchor(link_text, &url, title.as_deref());
                    Some((anchor, end))
                }
                // No such definition: the whole construct stays literal.
                None => Some((text[open..end].to_string(), end)),
            };
        }

        if !features.shortcut_link || link_text.contains('[') {
            return None;
        }
        let id = normalize_ref_id(link_text);
        let url = self.urls.get(&id).cloned()?;
        let title = self.titles.get(&id).cloned();
        let anchor = self.build_anchor(link_text, &url, title.as_deref());
        Some((anchor, after))
    }

    fn build_anchor(&mut self, link_text: &str, url: &str, title: Option<&str>) -> String {
        let mut result = format!("<a href=\"{}\"", encode_attribute(url));
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            result.push_str(&format!(" title=\"{}\"", encode_attribute(title.trim())));
        }
        let inner = self.run_span_gamut(link_text);
        result.push_str(&format!(">{inner}</a>"));
        self.hashes.protect(&result, ProtectKind::Span)
    }

    /// `![alt](url "title")` and `![alt][id]` images.
    pub(crate) fn do_images(&mut self, text: &str) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut plain = 0usize;
        let mut i = 0usize;
        while i + 1 < bytes.len() {
            if bytes[i] != b'!' || bytes[i + 1] != b'[' {
                i += 1;
                continue;
            }
            match self.try_image_at(text, i) {
                Some((replacement, end)) => {
                    out.push_str(&text[plain..i]);
                    out.push_str(&replacement);
                    i = end;
                    plain = i;
                }
                None => i += 2,
            }
        }
        out.push_str(&text[plain..]);
        out
    }

    fn try_image_at(&mut self, text: &str, bang: usize) -> Option<(String, usize)> {
        let features = self.features();
        let (alt, after) = match_bracketed(text, bang + 1, BRACKET_DEPTH)?;
        let rest = &text[after..];

        if rest.starts_with('(') {
            if !features.inline_link {
                return None;
            }
            let (url, title, consumed) = parse_inline_destination(rest)?;
            let img = self.build_image(alt, strip_angles(&url), title.as_deref());
            return Some((img, after + consumed));
        }

        if let Some((raw_id, id_len)) = match_ref_id(rest) {
            if !features.reference_link {
                return None;
            }
            let id = if raw_id.trim().is_empty() {
                normalize_ref_id(alt)
            } else {
                normalize_ref_id(raw_id)
            };
            let end = after + id_len;
            return match self.urls.get(&id).cloned() {
                Some(url) => {
                    let title = self.titles.get(&id).cloned();
                    let img = self.build_image(alt, &url, title.as_deref());
                    Some((img, end))
                }
                None => Some((text[bang..end].to_string(), end)),
            };
        }
        None
    }

    fn build_image(&mut self, alt: &str, url: &str, title: Option<&str>) -> String {
        let mut result = format!(
            "<img src=\"{}\" alt=\"{}\"",
            encode_attribute(url),
            encode_attribute(alt)
        );
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            result.push_str(&format!(" title=\"{}\"", encode_attribute(title.trim())));
        }
        result.push_str(&self.options().empty_element_suffix);
        self.hashes.protect(&result, ProtectKind::Span)
    }

    /// `<https://…>` autolinks and `<addr@host>` mailto links.
    pub(crate) fn do_auto_links(&mut self, text: &str) -> String {
        let features = self.features();
        let mut text = text.to_string();
        if features.auto_link {
            text = AUTO_URL_RE
                .replace_all(&text, |caps: &Captures| {
                    let url = encode_attribute(caps.get(1).unwrap().as_str());
                    let link = format!("<a href=\"{url}\">{url}</a>");
                    self.hashes.protect(&link, ProtectKind::Span)
                })
                .into_owned();
        }
        if features.auto_mailto {
            text = AUTO_EMAIL_RE
                .replace_all(&text, |caps: &Captures| {
                    let link = encode_email_address(caps.get(1).unwrap().as_str());
                    self.hashes.protect(&link, ProtectKind::Span)
                })
                .into_owned();
        }
        text
    }
}

/// Deterministic per-character entity obfuscation of a mailto link. The
/// address itself seeds the choice between hex, decimal and literal, so
/// output is stable across runs while still mixing encodings.
fn encode_email_address(addr: &str) -> String {
    let full = format!("mailto:{addr}");
    let seed = (crc32(full.as_bytes()) / full.len().max(1) as u32) as u64;

    let mut href = String::new();
    let mut display = String::new();
    for (key, ch) in full.chars().enumerate() {
        let encoded = if ch.is_ascii() {
            let r = (seed * (1 + key as u64)) % 100;
            let ord = ch as u32;
            if r > 90 && ch != '@' {
                ch.to_string()
            } else if r < 45 {
                format!("&#x{ord:x};")
            } else {
                format!("&#{ord};")
            }
        } else {
            ch.to_string()
        };
        href.push_str(&encoded);
        if key >= 7 {
            // Skip the `mailto:` prefix in the visible text.
            display.push_str(&encoded);
        }
    }
    format!("<a href=\"{href}\">{display}</a>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_bracketed_nesting() {
        let (inner, end) = match_bracketed("[a [b] c] d", 0, 6).unwrap();
        assert_eq!(inner, "a [b] c");
        assert_eq!(end, 9);
    }

    #[test]
    fn test_match_bracketed_unbalanced() {
        assert!(match_bracketed("[never closed", 0, 6).is_none());
    }

    #[test]
    fn test_parse_inline_destination() {
        let (url, title, consumed) = parse_inline_destination(r#"(/x "hi") tail"#).unwrap();
        assert_eq!(url, "/x");
        assert_eq!(title.as_deref(), Some("hi"));
        assert_eq!(consumed, 9);
    }

    #[test]
    fn test_parse_inline_destination_angle_form() {
        let (url, title, _) = parse_inline_destination("(<http://a(b)>)").unwrap();
        assert_eq!(url, "http://a(b)");
        assert!(title.is_none());
    }

    #[test]
    fn test_parse_inline_destination_balanced_parens() {
        let (url, _, _) = parse_inline_destination("(http://x/(v)/y)").unwrap();
        assert_eq!(url, "http://x/(v)/y");
    }

    #[test]
    fn test_normalize_ref_id() {
        assert_eq!(normalize_ref_id("An ID"), "an id");
        assert_eq!(normalize_ref_id("two \nlines"), "two lines");
    }

    #[test]
    fn test_encode_email_is_deterministic() {
        let a = encode_email_address("a@b.com");
        let b = encode_email_address("a@b.com");
        assert_eq!(a, b);
        assert!(a.starts_with("<a href=\""));
        // The `@` is always encoded.
        assert!(!a.contains('@'));
    }
}
