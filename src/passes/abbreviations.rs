//! Abbreviations: `*[word]: description` definitions stripped into the
//! abbreviation table, and a wrapping pass that marks up every standalone
//! occurrence of a known word.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::engine::Transform;
use crate::escape::encode_attribute;
use crate::hashing::ProtectKind;

static ABBR_DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^ {0,3}\*\[([^\n\]]*)\] ?:[ ]*(.*)\n?").unwrap());

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

impl Transform<'_> {
    /// Remove definitions and build the single alternation matcher over all
    /// known words, predefined ones included. Longer words take precedence
    /// so one abbreviation can extend another.
    pub(crate) fn strip_abbreviations(&mut self, text: &str) -> String {
        let text = ABBR_DEF_RE
            .replace_all(text, |caps: &regex::Captures| {
                let word = caps.get(1).unwrap().as_str().to_string();
                let description = caps.get(2).unwrap().as_str().trim().to_string();
                if !word.is_empty() {
                    self.abbr_descriptions.insert(word, description);
                }
                String::new()
            })
            .into_owned();

        if !self.abbr_descriptions.is_empty() {
            let mut words: Vec<&String> = self.abbr_descriptions.keys().collect();
            words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            let pattern = words
                .iter()
                .map(|word| regex::escape(word))
                .collect::<Vec<_>>()
                .join("|");
            self.abbr_matcher = Regex::new(&pattern).ok();
        }
        text
    }

    /// Wrap every standalone occurrence of a known word in `<abbr>`, with a
    /// title attribute when a description was given. Word boundaries are
    /// checked by hand, and a match adjacent to the placeholder sentinel is
    /// skipped so partial tokens are never wrapped.
    pub(crate) fn do_abbreviations(&mut self, text: &str) -> String {
        let Some(matcher) = self.abbr_matcher.clone() else {
            return text.to_string();
        };

        let mut out = String::with_capacity(text.len());
        let mut plain = 0usize;
        for found in matcher.find_iter(text) {
            if found.start() < plain {
                continue; // overlapped a previous replacement
            }
            let before = text[..found.start()].chars().next_back();
            let after = text[found.end()..].chars().next();
            let bounded = !matches!(before, Some(c) if is_word_char(c) || c == '\u{1A}')
                && !matches!(after, Some(c) if is_word_char(c) || c == '\u{1A}');
            if !bounded {
                continue;
            }
            let word = found.as_str();
            let Some(description) = self.abbr_descriptions.get(word).cloned() else {
                continue;
            };
            let element = if description.is_empty() {
                format!("<abbr>{word}</abbr>")
            } else {
                format!("<abbr title=\"{}\">{word}</abbr>", encode_attribute(&description))
            };
            out.push_str(&text[plain..found.start()]);
            out.push_str(&self.hashes.protect(&element, ProtectKind::Span));
            plain = found.end();
        }
        out.push_str(&text[plain..]);
        out
    }
}
