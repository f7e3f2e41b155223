//! Span passes that are always active: the protective tokenizer (code
//! spans, backslash escapes, inline raw tags), entity-aware escaping,
//! emphasis, and hard line breaks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::engine::Transform;
use crate::escape::{encode_amps_and_angles, escape_code};
use crate::hashing::ProtectKind;
use crate::scanner::dialect::find_code_span_close;
use crate::scanner::tags;

/// Characters a backslash may escape. The colon and pipe keep definition
/// lists and tables from firing on literal text.
const ESCAPE_CHARS: &[u8] = br"\`*_{}[]()>#+-.!:|";

static BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}\n").unwrap());

impl Transform<'_> {
    /// Walk span text and seal everything that is already final: escaped
    /// characters become numeric references, code spans become `<code>`
    /// elements, inline raw tags and comments pass through opaquely.
    pub(crate) fn parse_span(&mut self, text: &str) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut plain = 0usize;
        let mut i = 0usize;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' if i + 1 < bytes.len() && ESCAPE_CHARS.contains(&bytes[i + 1]) => {
                    out.push_str(&text[plain..i]);
                    let entity = format!("&#{};", bytes[i + 1]);
                    out.push_str(&self.hashes.protect(&entity, ProtectKind::Span));
                    i += 2;
                    plain = i;
                }
                b'`' => {
                    let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
                    match find_code_span_close(&text[i + run..], run) {
                        Some(end) => {
                            out.push_str(&text[plain..i]);
                            let content = &text[i + run..i + run + end - run];
                            let span = format!("<code>{}</code>", escape_code(content.trim()));
                            out.push_str(&self.hashes.protect(&span, ProtectKind::Span));
                            i += run + end;
                            plain = i;
                        }
                        None => {
                            i += run;
                        }
                    }
                }
                b'<' => {
                    let s = &text[i..];
                    let len = tags::match_comment(s)
                        .or_else(|| tags::match_instruction(s))
                        .or_else(|| match_span_tag(s));
                    match len {
                        Some(len) => {
                            out.push_str(&text[plain..i]);
                            out.push_str(&self.hashes.protect(&s[..len], ProtectKind::Span));
                            i += len;
                            plain = i;
                        }
                        None => i += 1,
                    }
                }
                _ => i += 1,
            }
        }
        out.push_str(&text[plain..]);
        out
    }

    pub(crate) fn do_amps_and_angles(&mut self, text: &str) -> String {
        encode_amps_and_angles(text)
    }

    pub(crate) fn do_hard_breaks(&mut self, text: &str) -> String {
        BREAK_RE
            .replace_all(text, |_: &regex::Captures| {
                let br = format!("<br{}\n", self.options().empty_element_suffix);
                self.hashes.protect(&br, ProtectKind::Span)
            })
            .into_owned()
    }

    /// Emphasis and strong emphasis with an explicit token stack.
    ///
    /// Delimiter runs of one, two or three `*`/`_` open or close spans
    /// depending on what is currently open; underscores inside words never
    /// count. Unmatched markers unwind to literal text.
    pub(crate) fn do_emphasis(&mut self, text: &str) -> String {
        let mut token_stack: Vec<String> = Vec::new();
        let mut text_stack: Vec<String> = vec![String::new()];
        let mut em = String::new();
        let mut strong = String::new();
        let mut tree_char_em = false;
        let mut rest: &str = text;

        loop {
            let Some((pos, len)) = find_emphasis_token(rest, &em, &strong) else {
                // End of span text: unwind open markers as literal text.
                text_stack.last_mut().unwrap().push_str(rest);
                while let Some(token) = token_stack.pop() {
                    let inner = text_stack.pop().unwrap();
                    let outer = text_stack.last_mut().unwrap();
                    outer.push_str(&token);
                    outer.push_str(&inner);
                }
                break;
            };
            let token = rest[pos..pos + len].to_string();
            let token_char = token.as_bytes()[0] as char;
            text_stack.last_mut().unwrap().push_str(&rest[..pos]);
            rest = &rest[pos + len..];

            if tree_char_em {
                // Inside a `***` opening; whatever closes first decides how
                // the three characters split.
                if len == 3 {
                    token_stack.pop();
                    let inner = text_stack.pop().unwrap();
                    let hashed = self.wrap_emphasis(&inner, "<strong><em>", "</em></strong>");
                    text_stack.last_mut().unwrap().push_str(&hashed);
                    em.clear();
                    strong.clear();
                } else {
                    *token_stack.last_mut().unwrap() = token_char.to_string().repeat(3 - len);
                    let (open, close) = if len == 2 {
                        ("<strong>", "</strong>")
                    } else {
                        ("<em>", "</em>")
                    };
                    let inner = std::mem::take(text_stack.last_mut().unwrap());
                    let hashed = self.wrap_emphasis(&inner, open, close);
                    *text_stack.last_mut().unwrap() = hashed;
                    if len == 2 {
                        strong.clear();
                    } else {
                        em.clear();
                    }
                }
                tree_char_em = false;
            } else if len == 3 {
                if !em.is_empty() {
                    if token_stack.is_empty() {
                        // A leftover open state with no marker on the stack:
                        // nothing to close, keep the run literal.
                        text_stack.last_mut().unwrap().push_str(&token);
                        em.clear();
                        strong.clear();
                        continue;
                    }
                    // Closing both spans, innermost first.
                    for _ in 0..2 {
                        if token_stack.is_empty() {
                            break;
                        }
                        let shifted = token_stack.pop().unwrap_or_default();
                        let inner = text_stack.pop().unwrap_or_default();
                        let (open, close) = if shifted.len() == 2 {
                            strong.clear();
                            ("<strong>", "</strong>")
                        } else {
                            em.clear();
                            ("<em>", "</em>")
                        };
                        let hashed = self.wrap_emphasis(&inner, open, close);
                        text_stack.last_mut().unwrap().push_str(&hashed);
                    }
                } else {
                    em = token_char.to_string();
                    strong = format!("{token_char}{token_char}");
                    token_stack.push(token);
                    text_stack.push(String::new());
                    tree_char_em = true;
                }
            } else if len == 2 {
                if !strong.is_empty() {
                    // A dangling single-char marker cannot close anymore.
                    if token_stack.last().map(String::len) == Some(1) {
                        let tok = token_stack.pop().unwrap();
                        let inner = text_stack.pop().unwrap();
                        let outer = text_stack.last_mut().unwrap();
                        outer.push_str(&tok);
                        outer.push_str(&inner);
                    }
                    if token_stack.is_empty() {
                        text_stack.last_mut().unwrap().push_str(&token);
                        strong.clear();
                        continue;
                    }
                    token_stack.pop();
                    let inner = text_stack.pop().unwrap_or_default();
                    let hashed = self.wrap_emphasis(&inner, "<strong>", "</strong>");
                    text_stack.last_mut().unwrap().push_str(&hashed);
                    strong.clear();
                } else {
                    strong = token.clone();
                    token_stack.push(token);
                    text_stack.push(String::new());
                }
            } else if !em.is_empty() {
                if token_stack.last().map(String::len) == Some(1) {
                    token_stack.pop();
                    let inner = text_stack.pop().unwrap();
                    let hashed = self.wrap_emphasis(&inner, "<em>", "</em>");
                    text_stack.last_mut().unwrap().push_str(&hashed);
                    em.clear();
                } else {
                    text_stack.last_mut().unwrap().push_str(&token);
                }
            } else {
                em = token.clone();
                token_stack.push(token);
                text_stack.push(String::new());
            }
        }

        text_stack.pop().unwrap_or_default()
    }

    fn wrap_emphasis(&mut self, inner: &str, open: &str, close: &str) -> String {
        let span = self.run_span_gamut(inner);
        let span = format!("{open}{span}{close}");
        self.hashes.protect(&span, ProtectKind::Span)
    }
}

/// Span-level tag: `<`, optional `/`, `!` or `$`, a name, then either `>`
/// directly or whitespace-introduced attributes. The whitespace requirement
/// keeps autolinks like `<https://…>` out of this branch.
fn match_span_tag(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }
    let mut i = 1;
    if matches!(bytes.get(i), Some(b'/') | Some(b'!') | Some(b'$')) {
        i += 1;
    }
    let name_start = i;
    while i < bytes.len()
        && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'-' | b':'))
    {
        i += 1;
    }
    if i == name_start {
        return None;
    }
    match bytes.get(i) {
        Some(b'>') => return Some(i + 1),
        Some(b) if b.is_ascii_whitespace() => {}
        _ => return None,
    }
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                if i >= bytes.len() {
                    return None;
                }
                i += 1;
            }
            b'>' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Find the next emphasis token in `rest` given the currently open markers.
///
/// Returns `(position, length)`. Eligibility mirrors the classic rules:
/// a run longer than three characters is literal; an opening marker must be
/// followed by non-whitespace and not by punctuation-then-space; a closing
/// marker must be preceded by non-whitespace; underscores never open or
/// close against a word character.
fn find_emphasis_token(rest: &str, em: &str, strong: &str) -> Option<(usize, usize)> {
    let bytes = rest.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if b != b'*' && b != b'_' {
            i += 1;
            continue;
        }
        let run = bytes[i..].iter().take_while(|&&x| x == b).count();
        let c = b as char;
        let prev = rest[..i].chars().next_back();
        let next = rest[i + run..].chars().next();
        let after_next = next.map(|n| rest[i + run + n.len_utf8()..].chars().next());

        let eligible = match run {
            1 => {
                if em.is_empty() {
                    open_eligible(c, prev, next, after_next.flatten())
                } else {
                    em == c.to_string() && close_eligible(prev) && !(c == '_' && next_is_word(next))
                }
            }
            2 => {
                if strong.is_empty() {
                    open_eligible(c, prev, next, after_next.flatten())
                } else {
                    strong.as_bytes()[0] == b && close_eligible(prev)
                }
            }
            3 => {
                let both_open = !em.is_empty() && !strong.is_empty();
                if em.is_empty() && strong.is_empty() {
                    open_eligible(c, prev, next, after_next.flatten())
                } else {
                    both_open
                        && em.as_bytes()[0] == b
                        && strong.as_bytes()[0] == b
                        && close_eligible(prev)
                }
            }
            _ => false,
        };
        if eligible {
            return Some((i, run));
        }
        i += run;
    }
    None
}

fn next_is_word(next: Option<char>) -> bool {
    matches!(next, Some(c) if c.is_ascii() && is_word_byte(c as u8))
}

fn open_eligible(c: char, prev: Option<char>, next: Option<char>, after_next: Option<char>) -> bool {
    if c == '_' && matches!(prev, Some(p) if p.is_ascii() && is_word_byte(p as u8)) {
        return false;
    }
    match next {
        None => true,
        Some(n) if n.is_whitespace() => false,
        Some(n) => {
            // Not punctuation followed by whitespace.
            !(matches!(n, '.' | ',' | ':' | ';')
                && matches!(after_next, Some(a) if a.is_whitespace()))
        }
    }
}

fn close_eligible(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(p) => !p.is_whitespace(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_tag_requires_space_before_attrs() {
        assert!(match_span_tag("<em>").is_some());
        assert!(match_span_tag(r#"<a href="x">"#).is_some());
        assert!(match_span_tag("<https://example.com>").is_none());
    }

    #[test]
    fn test_emphasis_token_open() {
        assert_eq!(find_emphasis_token("a *b*", "", ""), Some((2, 1)));
        // Underscore inside a word does not open.
        assert_eq!(find_emphasis_token("snake_case_name", "", ""), None);
    }

    #[test]
    fn test_emphasis_token_close() {
        // With `*` open, the next single star preceded by non-space closes.
        assert_eq!(find_emphasis_token("b* c", "*", ""), Some((1, 1)));
        // Preceded by whitespace: not a closer, and not an opener either
        // (already open), so the run is skipped.
        assert_eq!(find_emphasis_token("b * c*", "*", ""), Some((5, 1)));
    }

    #[test]
    fn test_long_runs_are_literal() {
        assert_eq!(find_emphasis_token("a ****b**** c", "", ""), None);
    }
}
