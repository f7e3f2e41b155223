//! Definition lists: term lines followed by `:`-introduced definitions.
//! A definition set apart by blank lines renders as block content through
//! the full block gamut; a tight one stays inline.

use crate::engine::Transform;
use crate::escape::{is_blank, leading_spaces, outdent};
use crate::hashing::ProtectKind;

fn trim_newline(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

/// `: definition` with at most three leading spaces. Returns the byte
/// offset of the content and the width of the marker prefix.
fn def_start(line: &str) -> Option<(usize, usize)> {
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = line[indent..].strip_prefix(':')?;
    let spaces = rest.len() - rest.trim_start_matches(' ').len();
    if spaces == 0 {
        return None;
    }
    Some((indent + 1 + spaces, indent + 1 + spaces))
}

fn term_line(line: &str) -> bool {
    !is_blank(line) && leading_spaces(line) <= 3 && def_start(line).is_none()
}

/// One or more term lines, an optional blank line, then a definition line.
fn term_group_at(lines: &[&str], mut i: usize) -> bool {
    let mut terms = 0;
    while i < lines.len() && term_line(trim_newline(lines[i])) {
        terms += 1;
        i += 1;
    }
    if terms == 0 {
        return false;
    }
    if i < lines.len() && is_blank(trim_newline(lines[i])) {
        i += 1;
    }
    i < lines.len() && def_start(trim_newline(lines[i])).is_some()
}

impl Transform<'_> {
    pub(crate) fn do_def_lists(&mut self, text: &str) -> String {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        let mut prev_blank = true;

        while i < lines.len() {
            if !(prev_blank && term_group_at(&lines, i)) {
                prev_blank = is_blank(trim_newline(lines[i]));
                out.push_str(lines[i]);
                i += 1;
                continue;
            }

            // Region: runs until blank line(s) followed by a non-indented
            // line that starts neither a definition nor another term group.
            let mut j = i;
            while j < lines.len() {
                if !is_blank(trim_newline(lines[j])) {
                    j += 1;
                    continue;
                }
                let mut k = j;
                while k < lines.len() && is_blank(trim_newline(lines[k])) {
                    k += 1;
                }
                if k == lines.len() {
                    j = k;
                    break;
                }
                let next = trim_newline(lines[k]);
                if leading_spaces(next) == 0
                    && def_start(next).is_none()
                    && !term_group_at(&lines, k)
                {
                    j = k;
                    break;
                }
                j = k;
            }

            let region: Vec<&str> = lines[i..j].to_vec();
            let items = self.process_def_list_items(&region);
            let block = format!("<dl>\n{}\n</dl>", items.trim_matches('\n'));
            out.push_str(&self.hashes.protect(&block, ProtectKind::Block));
            out.push_str("\n\n");
            i = j;
            prev_blank = true;
        }
        out
    }

    fn process_def_list_items(&mut self, lines: &[&str]) -> String {
        let mut html = String::new();
        let mut i = 0;
        let mut blanks_before = 0usize;

        while i < lines.len() {
            let line = trim_newline(lines[i]);
            if is_blank(line) {
                blanks_before += 1;
                i += 1;
                continue;
            }

            if let Some((content_start, marker_width)) = def_start(line) {
                let leading_line = blanks_before > 0;
                blanks_before = 0;

                // Collect the definition body: the rest of this line plus
                // every following line up to the next definition, term
                // group, or region end. Blank lines stay inside the body
                // when more definition content follows.
                let mut body = String::new();
                body.push_str(&lines[i][content_start..]);
                let mut j = i + 1;
                loop {
                    if j >= lines.len() {
                        break;
                    }
                    let current = trim_newline(lines[j]);
                    if is_blank(current) {
                        let mut k = j;
                        while k < lines.len() && is_blank(trim_newline(lines[k])) {
                            k += 1;
                        }
                        if k == lines.len()
                            || def_start(trim_newline(lines[k])).is_some()
                            || term_group_at(lines, k)
                        {
                            break;
                        }
                        for blank_line in &lines[j..k] {
                            body.push_str(blank_line);
                        }
                        j = k;
                        continue;
                    }
                    if def_start(current).is_some() || term_group_at(lines, j) {
                        break;
                    }
                    body.push_str(lines[j]);
                    j += 1;
                }
                i = j;

                let block_mode = leading_line || body.contains("\n\n");
                if block_mode {
                    let padded = format!("{}{}", " ".repeat(marker_width), body);
                    let rendered = self.run_block_gamut(&format!("{}\n\n", outdent(&padded)));
                    html.push_str(&format!("\n<dd>\n{}\n</dd>\n", rendered.trim_matches('\n')));
                } else {
                    let rendered = self.run_span_gamut(outdent(body.trim_end()).as_str());
                    html.push_str(&format!("\n<dd>{rendered}</dd>\n"));
                }
            } else {
                // Term lines up to the next definition or blank line.
                blanks_before = 0;
                while i < lines.len() {
                    let term = trim_newline(lines[i]);
                    if is_blank(term) || def_start(term).is_some() {
                        break;
                    }
                    let rendered = self.run_span_gamut(term.trim());
                    html.push_str(&format!("\n<dt>{rendered}</dt>"));
                    i += 1;
                }
                html.push('\n');
            }
        }
        html
    }
}
