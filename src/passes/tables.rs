//! Pipe tables, in both the leading-pipe and bare forms. Colons in the
//! underline row encode per-column alignment. Rows are span-scanned before
//! cell splitting so pipes inside code spans or raw tags never split cells.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::engine::Transform;
use crate::escape::{is_blank, leading_spaces};
use crate::hashing::ProtectKind;

static UNDERLINE_LEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}\| *[-:]+[-| :]*$").unwrap());
static UNDERLINE_PLAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}[-:]+ *\|[-| :]*$").unwrap());
static TRAILING_PIPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\| *$").unwrap());
static CELL_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" *\| *").unwrap());
static ALIGN_RIGHT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *-+: *$").unwrap());
static ALIGN_CENTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *:-+: *$").unwrap());
static ALIGN_LEFT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *:-+ *$").unwrap());

fn trim_newline(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

fn strip_lead_pipe(line: &str) -> &str {
    let trimmed = line.trim_start_matches(' ');
    trimmed.strip_prefix('|').unwrap_or(trimmed)
}

impl Transform<'_> {
    pub(crate) fn do_tables(&mut self, text: &str) -> String {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < lines.len() {
            if let Some((block, consumed)) = self.try_table_at(&lines, i) {
                out.push_str(&block);
                i = consumed;
            } else {
                out.push_str(lines[i]);
                i += 1;
            }
        }
        out
    }

    fn try_table_at(&mut self, lines: &[&str], i: usize) -> Option<(String, usize)> {
        let header = trim_newline(lines[i]);
        if leading_spaces(header) > 3 || is_blank(header) {
            return None;
        }
        let underline = trim_newline(lines.get(i + 1)?);

        let leading_pipe = header.trim_start_matches(' ').starts_with('|');
        let valid = if leading_pipe {
            UNDERLINE_LEAD_RE.is_match(underline)
        } else {
            header.contains('|') && UNDERLINE_PLAIN_RE.is_match(underline)
        };
        if !valid {
            return None;
        }

        // Body rows run until a blank line; a stray non-row line in between
        // means this is not a table at all.
        let mut j = i + 2;
        let mut rows: Vec<&str> = Vec::new();
        while j < lines.len() && !is_blank(trim_newline(lines[j])) {
            let row = trim_newline(lines[j]);
            let row_ok = if leading_pipe {
                row.trim_start_matches(' ').starts_with('|')
            } else {
                row.contains('|')
            };
            if !row_ok {
                return None;
            }
            rows.push(row);
            j += 1;
        }

        let (header, underline, rows): (String, String, Vec<String>) = if leading_pipe {
            (
                strip_lead_pipe(header).to_string(),
                strip_lead_pipe(underline).to_string(),
                rows.iter().map(|r| strip_lead_pipe(r).to_string()).collect(),
            )
        } else {
            (
                header.to_string(),
                underline.to_string(),
                rows.iter().map(|r| r.to_string()).collect(),
            )
        };

        let block = self.table_block(&header, &underline, &rows);
        let token = self.hashes.protect(&block, ProtectKind::Block);
        Some((format!("{token}\n"), j))
    }

    fn table_block(&mut self, header: &str, underline: &str, rows: &[String]) -> String {
        let header = TRAILING_PIPE_RE.replace(header, "").into_owned();
        let underline = TRAILING_PIPE_RE.replace(underline, "").into_owned();

        // Colon placement encodes alignment, column by column.
        let attrs: Vec<&'static str> = CELL_SPLIT_RE
            .split(&underline)
            .map(|sep| {
                if ALIGN_RIGHT_RE.is_match(sep) {
                    " align=\"right\""
                } else if ALIGN_CENTER_RE.is_match(sep) {
                    " align=\"center\""
                } else if ALIGN_LEFT_RE.is_match(sep) {
                    " align=\"left\""
                } else {
                    ""
                }
            })
            .collect();

        // Span-scan first so protected pipes disappear before splitting.
        let header = self.parse_span(&header);
        let headers: Vec<&str> = CELL_SPLIT_RE.split(&header).collect();
        let col_count = headers.len();

        let mut html = String::from("<table>\n<thead>\n<tr>\n");
        for (n, cell) in headers.iter().enumerate() {
            let attr = attrs.get(n).copied().unwrap_or("");
            let content = self.run_span_gamut(cell.trim());
            html.push_str(&format!("  <th{attr}>{content}</th>\n"));
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");

        for row in rows {
            let row = TRAILING_PIPE_RE.replace(row, "").into_owned();
            let row = self.parse_span(&row);
            let mut cells: Vec<String> = CELL_SPLIT_RE
                .splitn(&row, col_count)
                .map(|c| c.to_string())
                .collect();
            cells.resize(col_count, String::new());

            html.push_str("<tr>\n");
            for (n, cell) in cells.iter().enumerate() {
                let attr = attrs.get(n).copied().unwrap_or("");
                let content = self.run_span_gamut(cell.trim());
                html.push_str(&format!("  <td{attr}>{content}</td>\n"));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>");
        html
    }
}
