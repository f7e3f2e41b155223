//! Low-level tag token matching.
//!
//! Each matcher tries to recognize one construct at the very start of its
//! input and reports the matched byte length; no allocation happens unless
//! a tag actually matches. Quoted attribute values may contain `>` and
//! newlines, mirroring how real-world HTML is written.

/// A matched opening or closing tag.
#[derive(Debug, Clone)]
pub(crate) struct Tag {
    /// Byte length of the full tag text.
    pub len: usize,
    /// Lowercased tag name.
    pub name: String,
    pub closing: bool,
    pub self_closing: bool,
}

/// `<!--` … `-->`
pub(crate) fn match_comment(s: &str) -> Option<usize> {
    let rest = s.strip_prefix("<!--")?;
    let end = rest.find("-->")?;
    Some(4 + end + 3)
}

/// `<?` … `?>` or `<%` … `%>`
pub(crate) fn match_instruction(s: &str) -> Option<usize> {
    if let Some(rest) = s.strip_prefix("<?") {
        let end = rest.find("?>")?;
        return Some(2 + end + 2);
    }
    if let Some(rest) = s.strip_prefix("<%") {
        let end = rest.find("%>")?;
        return Some(2 + end + 2);
    }
    None
}

/// `<![CDATA[` … `]]>`
pub(crate) fn match_cdata(s: &str) -> Option<usize> {
    let rest = s.strip_prefix("<![CDATA[")?;
    let end = rest.find("]]>")?;
    Some(9 + end + 3)
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'$')
}

/// Match a regular tag at the start of `s`: `<name …>` or `</name …>`.
pub(crate) fn match_tag(s: &str) -> Option<Tag> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }
    let mut i = 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }
    let name_start = i;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    if i == name_start {
        return None;
    }
    let name = s[name_start..i].to_ascii_lowercase();
    match bytes.get(i) {
        Some(b'>') => {
            return Some(Tag {
                len: i + 1,
                name,
                closing,
                self_closing: false,
            });
        }
        // Characters allowed right after a tag name.
        Some(b) if b.is_ascii_whitespace() || matches!(b, b'"' | b'\'' | b'/') => {}
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
            b'>' => {
                let self_closing = bytes[i - 1] == b'/';
                return Some(Tag {
                    len: i + 1,
                    name,
                    closing,
                    self_closing,
                });
            }
            _ => i += 1,
        }
    }
    None
}

/// Span-level variant that also accepts `<!…>` and `<$…>` forms so stray
/// declarations survive as opaque inline runs.
pub(crate) fn match_loose_tag(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }
    if matches!(bytes.get(1), Some(b'!') | Some(b'$')) {
        let mut i = 2;
        if i >= bytes.len() || !is_name_byte(bytes[i]) {
            return None;
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
        return None;
    }
    match_tag(s).map(|tag| tag.len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tag() {
        let tag = match_tag("<div>rest").unwrap();
        assert_eq!(tag.len, 5);
        assert_eq!(tag.name, "div");
        assert!(!tag.closing);
        assert!(!tag.self_closing);
    }

    #[test]
    fn test_closing_and_self_closing() {
        assert!(match_tag("</div>").unwrap().closing);
        assert!(match_tag("<hr />").unwrap().self_closing);
    }

    #[test]
    fn test_quoted_attribute_with_angle() {
        let tag = match_tag(r#"<a title="a > b">x"#).unwrap();
        assert_eq!(&r#"<a title="a > b">x"#[..tag.len], r#"<a title="a > b">"#);
    }

    #[test]
    fn test_unterminated_tag_fails() {
        assert!(match_tag("<div").is_none());
        assert!(match_tag(r#"<div class="x"#).is_none());
    }

    #[test]
    fn test_name_case_folded() {
        assert_eq!(match_tag("<DIV>").unwrap().name, "div");
    }

    #[test]
    fn test_comment_and_instruction() {
        assert_eq!(match_comment("<!-- c -->tail"), Some(10));
        assert_eq!(match_instruction("<?php ?>x"), Some(8));
        assert_eq!(match_instruction("<% x %>y"), Some(7));
    }

    #[test]
    fn test_cdata() {
        assert_eq!(match_cdata("<![CDATA[x]]>y"), Some(13));
    }

    #[test]
    fn test_loose_tag_declaration() {
        assert_eq!(match_loose_tag("<!DOCTYPE html>x"), Some(15));
    }

    #[test]
    fn test_not_a_tag() {
        assert!(match_tag("< div>").is_none());
        assert!(match_tag("a<b").is_none());
    }
}
