//! Tilde-fenced code blocks. A closing fence must use the same character
//! and be at least as long as the opener; content is escaped for literal
//! display and never re-enters any other pass.

use crate::engine::Transform;
use crate::escape::escape_code;
use crate::hashing::ProtectKind;

fn fence_run(line: &str) -> Option<usize> {
    let run = line.bytes().take_while(|&b| b == b'~').count();
    if run >= 3 && line[run..].trim_matches(' ').is_empty() {
        Some(run)
    } else {
        None
    }
}

impl Transform<'_> {
    pub(crate) fn do_fenced_code_blocks(&mut self, text: &str) -> String {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].strip_suffix('\n').unwrap_or(lines[i]);
            let Some(open_run) = fence_run(line) else {
                out.push_str(lines[i]);
                i += 1;
                continue;
            };

            // Find the closing fence; without one the marker stays literal.
            let mut close = None;
            for (offset, candidate) in lines[i + 1..].iter().enumerate() {
                let candidate = candidate.strip_suffix('\n').unwrap_or(candidate);
                if let Some(run) = fence_run(candidate) {
                    if run >= open_run {
                        close = Some(i + 1 + offset);
                        break;
                    }
                }
            }
            let Some(close) = close else {
                out.push_str(lines[i]);
                i += 1;
                continue;
            };

            let content: String = lines[i + 1..close].concat();
            let mut code = escape_code(&content);
            // Leading blank lines inside the fence become explicit breaks;
            // a plain newline would be swallowed by the `<pre>` opening.
            let blanks = code.len() - code.trim_start_matches('\n').len();
            if blanks > 0 {
                let br = format!("<br{}", self.options().empty_element_suffix);
                code = format!("{}{}", br.repeat(blanks), &code[blanks..]);
            }
            let block = format!("<pre><code>{code}</code></pre>");
            out.push_str("\n\n");
            out.push_str(&self.hashes.protect(&block, ProtectKind::Block));
            out.push_str("\n\n");
            i = close + 1;
        }
        out
    }
}
