//! Base block passes: horizontal rules, lists, indented code blocks, block
//! quotes, and the paragraph formation that closes every block gamut.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::engine::Transform;
use crate::escape::{escape_code, is_blank, leading_spaces, outdent};
use crate::hashing::{PlaceholderStore, ProtectKind};

static HR_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["-", r"\*", "_"]
        .iter()
        .map(|marker| {
            Regex::new(&format!(r"(?m)^ {{0,3}}{marker}(?: {{0,2}}{marker}){{2,}} *$")).unwrap()
        })
        .collect()
});

static QUOTE_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^ *> ?").unwrap());
static SPACE_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^ +$").unwrap());
static LINE_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^").unwrap());
static PRE_SPAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\s*<pre>.*?</pre>").unwrap());
static PRE_OUTDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^  ").unwrap());
static PARAGRAPH_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static TRAILING_BLANKS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}\z").unwrap());

/// A list item marker at the start of a (whitespace-trimmed) line.
struct Marker {
    indent: usize,
    /// Bytes covered by indent, marker and the spaces after it.
    content_start: usize,
    ordered: bool,
}

fn list_marker(line: &str) -> Option<Marker> {
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let bytes = rest.as_bytes();
    let marker_len = match bytes.first() {
        Some(b'*') | Some(b'+') | Some(b'-') => 1,
        Some(b'0'..=b'9') => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if bytes.get(digits) == Some(&b'.') {
                digits + 1
            } else {
                return None;
            }
        }
        _ => return None,
    };
    let spaces = bytes[marker_len..].iter().take_while(|&&b| b == b' ').count();
    if spaces == 0 {
        return None;
    }
    Some(Marker {
        indent,
        content_start: indent + marker_len + spaces,
        ordered: bytes[0].is_ascii_digit(),
    })
}

fn trim_newline(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

fn blank(line: &str) -> bool {
    is_blank(trim_newline(line))
}

impl Transform<'_> {
    pub(crate) fn do_horizontal_rules(&mut self, text: &str) -> String {
        let mut text = text.to_string();
        for re in HR_RES.iter() {
            text = re
                .replace_all(&text, |_: &Captures| {
                    let hr = format!("<hr{}", self.options().empty_element_suffix);
                    format!("\n{}\n", self.hashes.protect(&hr, ProtectKind::Block))
                })
                .into_owned();
        }
        text
    }

    /// Ordered and unordered lists. A top-level list needs a blank line (or
    /// the start of the text) in front of its first marker; inside a list
    /// any marker line opens a sublist.
    pub(crate) fn do_lists(&mut self, text: &str) -> String {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        let mut prev_blank = true;

        while i < lines.len() {
            let marker = list_marker(trim_newline(lines[i]));
            let allowed = self.list_level > 0 || prev_blank;
            let Some(marker) = marker.filter(|_| allowed) else {
                prev_blank = blank(lines[i]);
                out.push_str(lines[i]);
                i += 1;
                continue;
            };

            // The region runs until blank line(s) followed by a non-indented
            // line that is not another marker, or to the end of the text.
            let mut j = i + 1;
            while j < lines.len() {
                if !blank(lines[j]) {
                    j += 1;
                    continue;
                }
                let mut k = j;
                while k < lines.len() && blank(lines[k]) {
                    k += 1;
                }
                if k == lines.len() {
                    j = k;
                    break;
                }
                let next = trim_newline(lines[k]);
                if leading_spaces(next) == 0 && list_marker(next).is_none() {
                    j = k; // the blank lines are consumed with the list
                    break;
                }
                j = k;
            }

            let region: String = lines[i..j].concat();
            let items = self.process_list_items(&region, marker.indent);
            let tag = if marker.ordered { "ol" } else { "ul" };
            let block = format!("<{tag}>\n{items}</{tag}>");
            out.push('\n');
            out.push_str(&self.hashes.protect(&block, ProtectKind::Block));
            out.push_str("\n\n");
            i = j;
            prev_blank = true;
        }
        out
    }

    /// Split a list region into `<li>` items. Loose items (set apart by
    /// blank lines) go back through the block gamut; tight items only get
    /// sublist recursion and the span gamut.
    fn process_list_items(&mut self, region: &str, base_indent: usize) -> String {
        self.list_level += 1;
        let region = TRAILING_BLANKS_RE.replace(region, "\n").into_owned();
        let lines: Vec<&str> = region.split_inclusive('\n').collect();

        // Collect (start line, leading_line) pairs for every item boundary.
        let mut starts: Vec<(usize, bool)> = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            let trimmed = trim_newline(line);
            if let Some(marker) = list_marker(trimmed) {
                if marker.indent == base_indent {
                    let leading_line = idx > 0 && blank(lines[idx - 1]);
                    starts.push((idx, leading_line));
                }
            }
        }

        let mut out = String::new();
        for (n, &(start, leading_line)) in starts.iter().enumerate() {
            let end = starts.get(n + 1).map(|&(next, _)| next).unwrap_or(lines.len());
            let marker = list_marker(trim_newline(lines[start])).unwrap();

            // Item content: first line minus the marker, then the raw
            // continuation lines with trailing blank lines set aside.
            let mut body_lines: Vec<&str> = Vec::new();
            body_lines.push(&lines[start][marker.content_start..]);
            body_lines.extend(&lines[start + 1..end]);
            let mut tailing_blank = false;
            while body_lines.len() > 1 && blank(body_lines[body_lines.len() - 1]) {
                body_lines.pop();
                tailing_blank = true;
            }
            let body: String = body_lines.concat();

            let loose = leading_line || tailing_blank || body.contains("\n\n");
            let item = if loose {
                let padded = format!(
                    "{}{}{}",
                    " ".repeat(base_indent),
                    " ".repeat(marker.content_start - base_indent),
                    body
                );
                let mut html = self.run_block_gamut(&format!("{}\n", outdent(&padded)));
                while html.ends_with('\n') {
                    html.pop();
                }
                html
            } else {
                let item = outdent(&body);
                let item = self.do_lists(&item);
                let item = item.trim_end_matches('\n');
                self.run_span_gamut(item)
            };
            out.push_str("<li>");
            out.push_str(&item);
            out.push_str("</li>\n");
        }

        self.list_level -= 1;
        out
    }

    /// Four-space indented code blocks.
    pub(crate) fn do_code_blocks(&mut self, text: &str) -> String {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        let mut prev_blank = true;

        while i < lines.len() {
            let line = lines[i];
            let code_line = line.ends_with('\n')
                && !blank(line)
                && leading_spaces(trim_newline(line)) >= 4;
            if !(prev_blank && code_line) {
                prev_blank = blank(line);
                out.push_str(line);
                i += 1;
                continue;
            }

            let mut j = i;
            let mut last_code = i;
            while j < lines.len() && lines[j].ends_with('\n') {
                if blank(lines[j]) {
                    j += 1;
                } else if leading_spaces(trim_newline(lines[j])) >= 4 {
                    last_code = j;
                    j += 1;
                } else {
                    break;
                }
            }
            let region: String = lines[i..j].concat();
            let mut code = escape_code(&outdent(&region));
            code = code.trim_start_matches('\n').trim_end().to_string();
            let block = format!("<pre><code>{code}\n</code></pre>");
            out.push_str("\n\n");
            out.push_str(&self.hashes.protect(&block, ProtectKind::Block));
            out.push_str("\n\n");
            prev_blank = j > last_code + 1 || j >= lines.len();
            i = j;
        }
        out
    }

    /// `>` block quotes with lazy continuation lines; the quoted content
    /// goes back through the whole block gamut.
    pub(crate) fn do_block_quotes(&mut self, text: &str) -> String {
        fn quote_start(line: &str) -> bool {
            let trimmed = line.trim_start_matches(' ');
            let Some(rest) = trimmed.strip_prefix('>') else {
                return false;
            };
            !rest.strip_prefix(' ').unwrap_or(rest).is_empty()
        }

        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < lines.len() {
            if !quote_start(trim_newline(lines[i])) {
                out.push_str(lines[i]);
                i += 1;
                continue;
            }
            let mut j = i;
            loop {
                while j < lines.len() && !blank(lines[j]) {
                    j += 1;
                }
                while j < lines.len() && blank(lines[j]) {
                    j += 1;
                }
                if j < lines.len() && quote_start(trim_newline(lines[j])) {
                    continue;
                }
                break;
            }
            let region: String = lines[i..j].concat();
            let stripped = QUOTE_MARKER_RE.replace_all(&region, "").into_owned();
            let stripped = SPACE_LINES_RE.replace_all(&stripped, "").into_owned();
            let inner = self.run_block_gamut(&stripped);
            let indented = LINE_START_RE.replace_all(&inner, "  ").into_owned();
            // Keep `<pre>` content flush: the two-space inset must not leak
            // into literal code.
            let indented = PRE_SPAN_RE
                .replace_all(&indented, |caps: &Captures| {
                    PRE_OUTDENT_RE
                        .replace_all(caps.get(0).unwrap().as_str(), "")
                        .into_owned()
                })
                .into_owned();
            let block = format!("<blockquote>\n{indented}\n</blockquote>");
            out.push('\n');
            out.push_str(&self.hashes.protect(&block, ProtectKind::Block));
            out.push_str("\n\n");
            i = j;
        }
        out
    }

    /// Wrap what is left in paragraphs, skipping block placeholders, then
    /// restore placeholders for this recursion level.
    pub(crate) fn form_paragraphs(&mut self, text: &str) -> String {
        let text = text.trim_matches('\n');
        let mut grafs = Vec::new();
        for graf in PARAGRAPH_SPLIT_RE.split(text) {
            if graf.is_empty() {
                continue;
            }
            let value = self.run_span_gamut(graf);
            let value = value.trim().to_string();
            if PlaceholderStore::is_block_placeholder(&value) {
                grafs.push(value);
            } else {
                grafs.push(format!("<p>{value}</p>"));
            }
        }
        self.hashes.restore_all(&grafs.join("\n\n"))
    }
}
