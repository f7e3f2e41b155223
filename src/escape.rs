//! Shared text utilities: HTML escaping, attribute encoding, indentation.
//!
//! Everything here operates on plain strings and carries no per-call state;
//! the passes call into these helpers whenever text crosses from "dialect"
//! to "finalized HTML".

use once_cell::sync::Lazy;
use regex::Regex;

/// Width of one indentation level. Tabs are expanded to this stop width
/// during normalization, and `outdent` removes one level per call.
pub(crate) const TAB_WIDTH: usize = 4;

/// Matches a character reference right after a `&`: `#34;`, `#x1F;`, `amp;`.
static ENTITY_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?[xX]?(?:[0-9a-fA-F]+|\w+);").unwrap());

/// Escape `&`, `<` and `>` for literal display inside code elements.
/// Quotes are left alone; code content never lands in an attribute.
pub(crate) fn escape_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Smart ampersand and angle-bracket encoding.
///
/// An `&` that already begins a character reference is preserved, which
/// also makes the encoding idempotent: text may safely pass through more
/// than once. A `<` is kept only where it could open a tag (letter, `/`,
/// `?`, `$`, `!` follows); anywhere else it is escaped.
pub(crate) fn encode_amps_and_angles(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'&' => {
                if ENTITY_TAIL.is_match(&text[i + 1..]) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
                i += 1;
            }
            b'<' => {
                let keep = matches!(
                    bytes.get(i + 1),
                    Some(b'a'..=b'z') | Some(b'/') | Some(b'?') | Some(b'$') | Some(b'!')
                );
                if keep {
                    out.push('<');
                } else {
                    out.push_str("&lt;");
                }
                i += 1;
            }
            _ => {
                let ch = text[i..].chars().next().unwrap();
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    out
}

/// Encode an attribute value: amps and angles plus double quotes.
pub(crate) fn encode_attribute(text: &str) -> String {
    encode_amps_and_angles(text).replace('"', "&quot;")
}

/// Expand tabs to the next `TAB_WIDTH` column stop, line by line.
pub(crate) fn detab(text: &str) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = TAB_WIDTH - (column % TAB_WIDTH);
                for _ in 0..pad {
                    out.push(' ');
                }
                column += pad;
            }
            '\n' => {
                out.push('\n');
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

/// Remove one level of indentation: up to `TAB_WIDTH` leading spaces per line.
pub(crate) fn outdent(text: &str) -> String {
    static OUTDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^ {1,4}").unwrap());
    OUTDENT_RE.replace_all(text, "").into_owned()
}

/// Remove up to `width` leading spaces from every line.
pub(crate) fn outdent_by(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let leading = line.len() - line.trim_start_matches(' ').len();
        out.push_str(&line[leading.min(width)..]);
    }
    out
}

/// Count the display width of the leading spaces of `line`.
pub(crate) fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// True for lines containing nothing but spaces.
pub(crate) fn is_blank(line: &str) -> bool {
    line.trim_matches(' ').is_empty()
}

/// CRC-32 (IEEE), bitwise variant. Seeds the deterministic mailto
/// obfuscation so the same address always encodes the same way.
pub(crate) fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_code_leaves_quotes() {
        assert_eq!(escape_code(r#"a < b & "c""#), r#"a &lt; b &amp; "c""#);
    }

    #[test]
    fn test_amps_keeps_entities() {
        assert_eq!(encode_amps_and_angles("&amp; & &#34;"), "&amp; &amp; &#34;");
    }

    #[test]
    fn test_amps_is_idempotent() {
        let once = encode_amps_and_angles("AT&T < x");
        assert_eq!(encode_amps_and_angles(&once), once);
    }

    #[test]
    fn test_angles_keep_tag_starts() {
        assert_eq!(encode_amps_and_angles("< 3 <b>"), "&lt; 3 <b>");
    }

    #[test]
    fn test_detab_column_stops() {
        assert_eq!(detab("a\tb\n\tc"), "a   b\n    c");
    }

    #[test]
    fn test_outdent_one_level() {
        assert_eq!(outdent("    code\n      more"), "code\n  more");
    }

    #[test]
    fn test_outdent_by_width() {
        assert_eq!(outdent_by("   a\n        b", 3), "a\n     b");
    }

    #[test]
    fn test_crc32_known_value() {
        // Standard check value for the IEEE polynomial.
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }
}
