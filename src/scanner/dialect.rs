//! Dialect-mode scanner half.
//!
//! Walks Markdown text looking for the next interesting token: an eligible
//! raw tag, a comment / processing instruction / CDATA section, a code-span
//! marker, or (outside span mode) an indented code block or fence marker.
//! Literal code regions pass through verbatim so later passes interpret
//! them; raw elements are handed to the raw-mode half and the result is
//! spliced back in, blank-line-wrapped for block elements.

use crate::engine::Transform;
use crate::escape::{is_blank, leading_spaces, TAB_WIDTH};
use crate::hashing::ProtectKind;
use crate::scanner::tags::{self, Tag};
use crate::scanner::{raw, ScanContext, BLOCK_TAGS, CLEAN_TAGS, CONTEXT_BLOCK_TAGS};

use once_cell::sync::Lazy;
use regex::Regex;

/// Only spaces, an optional comment, then the end of the line: the check
/// that a context-block tag has nothing after it.
static NEWLINE_AFTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?: *<!--(?s:.*?)-->)? *\n").unwrap());

enum Token {
    Backticks(usize),
    IndentedCode(usize),
    Fence { len: usize, run: usize },
    Comment(usize),
    Instruction(usize),
    Cdata(usize),
    Tag(Tag),
}

/// Scan `input`, returning the processed text and the number of bytes
/// consumed. Consumption stops early only when an unmatched closing tag of
/// `ctx.enclosing_tag` is reached; the tag itself is left unconsumed for
/// the caller.
///
/// Termination: every loop iteration consumes at least the matched token,
/// and the no-token case consumes the whole remainder.
pub(crate) fn scan(
    transform: &mut Transform<'_>,
    input: &str,
    ctx: &ScanContext,
) -> (String, usize) {
    let mut parsed = String::new();
    let mut offset = 0usize;
    let mut depth: i32 = 0;

    while offset < input.len() {
        let rest = &input[offset..];
        let Some((pos, token)) = find_token(rest, ctx) else {
            push_guarded(transform, &mut parsed, rest, ctx);
            offset = input.len();
            break;
        };
        push_guarded(transform, &mut parsed, &rest[..pos], ctx);
        offset += pos;
        let after = &input[offset..];

        match token {
            Token::Backticks(run) => {
                match find_code_span_close(&after[run..], run) {
                    Some(end) => {
                        // Pass the span through unchanged; the span gamut
                        // interprets it later.
                        parsed.push_str(&after[..run + end]);
                        offset += run + end;
                    }
                    None => {
                        parsed.push_str(&after[..run]);
                        offset += run;
                    }
                }
            }
            Token::IndentedCode(len) => {
                parsed.push_str(&after[..len]);
                offset += len;
            }
            Token::Fence { len, run } => match find_fence_close(&after[len..], run) {
                Some(end) => {
                    parsed.push_str(&after[..len + end]);
                    offset += len + end;
                }
                None => {
                    parsed.push_str(&after[..len]);
                    offset += len;
                }
            },
            Token::Comment(len) | Token::Instruction(len) | Token::Cdata(len) => {
                let hashed = transform.hashes.protect(&after[..len], ProtectKind::Clean);
                parsed.push_str(&hashed);
                offset += len;
            }
            Token::Tag(tag) => {
                let tag_text = &after[..tag.len];
                let name = tag.name.as_str();
                if !tag.closing && BLOCK_TAGS.contains(&name)
                    || !tag.closing
                        && CONTEXT_BLOCK_TAGS.contains(&name)
                        && newline_before(&parsed)
                        && NEWLINE_AFTER.is_match(&after[tag.len..])
                {
                    let (block, consumed) = raw::scan(transform, after, ProtectKind::Block, true);
                    parsed.push_str("\n\n");
                    parsed.push_str(&block);
                    parsed.push_str("\n\n");
                    offset += consumed;
                } else if !tag.closing && CLEAN_TAGS.contains(&name) {
                    let (block, consumed) = raw::scan(transform, after, ProtectKind::Clean, false);
                    parsed.push_str(&block);
                    offset += consumed;
                } else if ctx.enclosing_tag.as_deref() == Some(name) {
                    if tag.closing {
                        depth -= 1;
                    } else if !tag.self_closing {
                        depth += 1;
                    }
                    if depth < 0 {
                        // Leaving the enclosing element: hand the closing
                        // tag back to the caller.
                        return (parsed, offset);
                    }
                    parsed.push_str(tag_text);
                    offset += tag.len;
                } else {
                    parsed.push_str(tag_text);
                    offset += tag.len;
                }
            }
        }
    }

    (parsed, offset)
}

/// Append text, inserting an empty span placeholder around every line break
/// in span mode so a double line break inside an inline container never
/// starts a new paragraph.
fn push_guarded(transform: &mut Transform<'_>, parsed: &mut String, text: &str, ctx: &ScanContext) {
    if !ctx.span_mode {
        parsed.push_str(text);
        return;
    }
    let void = transform.hashes.protect("", ProtectKind::Span);
    parsed.push_str(&void);
    for (idx, part) in text.split('\n').enumerate() {
        if idx > 0 {
            parsed.push_str(&void);
            parsed.push('\n');
        }
        parsed.push_str(part);
    }
    parsed.push_str(&void);
}

fn newline_before(parsed: &str) -> bool {
    parsed.is_empty() || parsed.ends_with("\n\n") || parsed.chars().all(|c| c == '\n')
}

/// Find the earliest candidate token in `rest`. Ties keep the earlier
/// candidate kind (tags before code spans before code regions).
fn find_token(rest: &str, ctx: &ScanContext) -> Option<(usize, Token)> {
    fn earlier(
        best: Option<(usize, Token)>,
        candidate: Option<(usize, Token)>,
    ) -> Option<(usize, Token)> {
        match (best, candidate) {
            (None, candidate) => candidate,
            (best, None) => best,
            (Some(best), Some(candidate)) => {
                if candidate.0 < best.0 {
                    Some(candidate)
                } else {
                    Some(best)
                }
            }
        }
    }

    let mut best = find_angle(rest, ctx);
    best = earlier(best, find_backticks(rest));
    if !ctx.span_mode {
        best = earlier(best, find_indented_code(rest, ctx.indent));
        best = earlier(best, find_fence(rest, ctx.indent));
    }
    best
}

fn is_candidate_name(name: &str, ctx: &ScanContext) -> bool {
    BLOCK_TAGS.contains(&name)
        || CONTEXT_BLOCK_TAGS.contains(&name)
        || CLEAN_TAGS.contains(&name)
        || ctx.enclosing_tag.as_deref() == Some(name)
}

fn find_angle(rest: &str, ctx: &ScanContext) -> Option<(usize, Token)> {
    let mut from = 0;
    while let Some(off) = rest[from..].find('<') {
        let i = from + off;
        let s = &rest[i..];
        if let Some(len) = tags::match_comment(s) {
            return Some((i, Token::Comment(len)));
        }
        if let Some(len) = tags::match_instruction(s) {
            return Some((i, Token::Instruction(len)));
        }
        if let Some(len) = tags::match_cdata(s) {
            return Some((i, Token::Cdata(len)));
        }
        if let Some(tag) = tags::match_tag(s) {
            if is_candidate_name(&tag.name, ctx) {
                return Some((i, Token::Tag(tag)));
            }
        }
        from = i + 1;
    }
    None
}

fn find_backticks(rest: &str) -> Option<(usize, Token)> {
    let pos = rest.find('`')?;
    let run = rest[pos..].bytes().take_while(|&b| b == b'`').count();
    Some((pos, Token::Backticks(run)))
}

/// Closing run of exactly `run` backticks, not adjacent to more backticks,
/// reachable without crossing a blank line. Shared with the span tokenizer,
/// which applies the same rule.
pub(crate) fn find_code_span_close(s: &str, run: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' if bytes.get(i + 1) == Some(&b'\n') => return None,
            b'`' => {
                let r = bytes[i..].iter().take_while(|&&b| b == b'`').count();
                if r == run {
                    return Some(i + r);
                }
                i += r;
            }
            _ => i += 1,
        }
    }
    None
}

/// An indented code region: a line indented past the baseline plus four,
/// sitting at the start of the scan window or after a blank line, extended
/// over further indented or blank lines. The whole region (including the
/// introducing blank line) is one token, passed through verbatim.
fn find_indented_code(rest: &str, indent: usize) -> Option<(usize, Token)> {
    let min_indent = indent + TAB_WIDTH;
    let mut line_start = 0usize;
    let mut prev: Option<(usize, bool)> = None; // (start, is_blank)
    let bytes = rest.as_bytes();

    while line_start < rest.len() {
        let line_end = match rest[line_start..].find('\n') {
            Some(off) => line_start + off,
            None => break, // an unterminated final line cannot open a region
        };
        let line = &rest[line_start..line_end];
        let blank = is_blank(line);
        if !blank && leading_spaces(line) >= min_indent {
            let token_start = match prev {
                None => Some(0),
                Some((prev_start, true)) => {
                    if prev_start == 0 {
                        Some(0)
                    } else {
                        Some(prev_start - 1)
                    }
                }
                Some((_, false)) => None,
            };
            if let Some(start) = token_start {
                let mut end = line_end + 1;
                // Extend over further indented or blank lines.
                let mut cursor = end;
                while cursor < rest.len() {
                    let next_end = match rest[cursor..].find('\n') {
                        Some(off) => cursor + off,
                        None => break,
                    };
                    let next_line = &rest[cursor..next_end];
                    if is_blank(next_line) || leading_spaces(next_line) >= min_indent {
                        cursor = next_end + 1;
                        end = cursor;
                    } else {
                        break;
                    }
                }
                debug_assert!(bytes[end - 1] == b'\n');
                return Some((start, Token::IndentedCode(end - start)));
            }
        }
        prev = Some((line_start, blank));
        line_start = line_end + 1;
    }
    None
}

/// A fence marker line: exactly the baseline indent, three or more tildes,
/// trailing spaces only. The token includes the preceding newline when the
/// line is not at the start of the scan window.
fn find_fence(rest: &str, indent: usize) -> Option<(usize, Token)> {
    let mut line_start = 0usize;
    while line_start < rest.len() {
        let line_end = match rest[line_start..].find('\n') {
            Some(off) => line_start + off,
            None => break,
        };
        let line = &rest[line_start..line_end];
        if let Some(run) = fence_run(line, indent) {
            let start = if line_start == 0 { 0 } else { line_start - 1 };
            return Some((
                start,
                Token::Fence {
                    len: line_end + 1 - start,
                    run,
                },
            ));
        }
        line_start = line_end + 1;
    }
    None
}

fn fence_run(line: &str, indent: usize) -> Option<usize> {
    let lead = leading_spaces(line);
    if lead != indent {
        return None;
    }
    let body = &line[lead..];
    let run = body.bytes().take_while(|&b| b == b'~').count();
    if run >= 3 && body[run..].trim_matches(' ').is_empty() {
        Some(run)
    } else {
        None
    }
}

/// Closing fence: a run of tildes at least as long as the opener at line
/// start, trailing spaces only. Returns the byte offset just past the
/// closing line.
fn find_fence_close(s: &str, run: usize) -> Option<usize> {
    let mut line_start = 0usize;
    while line_start < s.len() {
        let line_end = match s[line_start..].find('\n') {
            Some(off) => line_start + off,
            None => break,
        };
        let line = &s[line_start..line_end];
        let r = line.bytes().take_while(|&b| b == b'~').count();
        if r >= run && line[r..].trim_matches(' ').is_empty() {
            return Some(line_end + 1);
        }
        line_start = line_end + 1;
    }
    None
}
