//! Engine facade and the call-scoped transform context.
//!
//! An [`Engine`] owns the configuration and the pre-built pass tables,
//! nothing else. Every `transform` call creates a fresh [`Transform`]
//! context holding all mutable per-call state (placeholder table,
//! reference tables, counters, scanner flags), so a single configured
//! engine can be shared freely between callers.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::escape;
use crate::gamut::{self, Pass, SCAN_PASS_NAME};
use crate::hashing::PlaceholderStore;
use crate::options::{Features, Options};
use crate::scanner;

/// A configured Markdown Extra transformation engine.
pub struct Engine {
    options: Options,
    document_gamut: Vec<Pass>,
    block_gamut: Vec<Pass>,
    span_gamut: Vec<Pass>,
}

impl Engine {
    /// Build an engine for the given options. The pass tables are laid out
    /// here, once; `transform` only ever iterates them.
    pub fn new(options: Options) -> Self {
        let features = options.features;
        Engine {
            document_gamut: gamut::document_gamut(&features),
            block_gamut: gamut::block_gamut(&features),
            span_gamut: gamut::span_gamut(&features),
            options,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Convert one document of Markdown Extra text to HTML.
    ///
    /// Total: every input produces some output, malformed constructs
    /// degrade to literal text. The call allocates its own working tables,
    /// so overlapping calls on one shared engine do not interfere.
    pub fn transform(&self, text: &str) -> String {
        let mut transform = Transform::new(self);
        transform.run(text)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Options::default())
    }
}

static SPACE_ONLY_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^ +$").unwrap());

/// All mutable state for one transform call.
///
/// Passed down through every pass and scanner step; dropped when the call
/// returns. Holding this on the engine instead would leak state between
/// calls and rule out shared-reference use.
pub(crate) struct Transform<'e> {
    pub(crate) engine: &'e Engine,
    pub(crate) hashes: PlaceholderStore,
    /// Link definitions: normalized id → url / optional title.
    pub(crate) urls: HashMap<String, String>,
    pub(crate) titles: HashMap<String, String>,
    /// Footnote bodies not yet referenced.
    pub(crate) footnotes: HashMap<String, String>,
    /// Referenced footnotes in first-reference order: (id, body).
    pub(crate) footnotes_ordered: Vec<(String, String)>,
    /// Visible number assigned at first reference.
    pub(crate) footnote_numbers: HashMap<String, usize>,
    pub(crate) abbr_descriptions: HashMap<String, String>,
    pub(crate) abbr_matcher: Option<Regex>,
    /// Set while link text is being processed, to keep anchor and footnote
    /// passes from nesting inside one.
    pub(crate) in_anchor: bool,
    /// List nesting depth; a top-level list must sit after a blank line,
    /// a nested one may start anywhere.
    pub(crate) list_level: usize,
}

impl<'e> Transform<'e> {
    pub(crate) fn new(engine: &'e Engine) -> Self {
        let mut abbr_descriptions = HashMap::new();
        for (word, description) in &engine.options.predefined_abbreviations {
            abbr_descriptions.insert(word.clone(), description.trim().to_string());
        }
        Transform {
            engine,
            hashes: PlaceholderStore::new(),
            urls: HashMap::new(),
            titles: HashMap::new(),
            footnotes: HashMap::new(),
            footnotes_ordered: Vec::new(),
            footnote_numbers: HashMap::new(),
            abbr_descriptions,
            abbr_matcher: None,
            in_anchor: false,
            list_level: 0,
        }
    }

    pub(crate) fn options(&self) -> &'e Options {
        &self.engine.options
    }

    pub(crate) fn features(&self) -> &'e Features {
        &self.engine.options.features
    }

    fn run(&mut self, input: &str) -> String {
        debug!(len = input.len(), "transform start");
        let mut text = normalize(input);
        if self.features().html_block {
            text = scanner::scan_blocks(self, &text);
        }
        text = SPACE_ONLY_LINES.replace_all(&text, "").into_owned();

        let engine = self.engine;
        for pass in &engine.document_gamut {
            trace!(pass = pass.name, "document pass");
            text = (pass.run)(self, &text);
        }

        let mut output = self.hashes.restore_all(&text);
        output.push('\n');
        debug!(len = output.len(), "transform done");
        output
    }

    /// Block gamut for recursive consumers (quotes, loose list items,
    /// multi-paragraph definitions, footnote bodies, `markdown="1"`
    /// re-entry): re-scans raw blocks first, ends with paragraph formation.
    pub(crate) fn run_block_gamut(&mut self, text: &str) -> String {
        self.run_block_passes(text, true)
    }

    /// Block gamut without the raw-markup scan; the document-level entry,
    /// since the engine scans once up front during normalization.
    pub(crate) fn run_basic_block_gamut(&mut self, text: &str) -> String {
        self.run_block_passes(text, false)
    }

    fn run_block_passes(&mut self, text: &str, with_scan: bool) -> String {
        let engine = self.engine;
        let mut text = text.to_string();
        for pass in &engine.block_gamut {
            if !with_scan && pass.name == SCAN_PASS_NAME {
                continue;
            }
            trace!(pass = pass.name, "block pass");
            text = (pass.run)(self, &text);
        }
        text
    }

    pub(crate) fn run_span_gamut(&mut self, text: &str) -> String {
        let engine = self.engine;
        let mut text = text.to_string();
        for pass in &engine.span_gamut {
            text = (pass.run)(self, &text);
        }
        text
    }

    /// The raw-markup block scan as a gamut pass.
    pub(crate) fn scan_raw_blocks(&mut self, text: &str) -> String {
        scanner::scan_blocks(self, text)
    }
}

/// Input normalization: strip the byte-order mark and every U+001A
/// (reserving it as the placeholder sentinel), unify line endings, append
/// two newlines so every block pattern can assume a trailing blank line,
/// and expand tabs.
fn normalize(input: &str) -> String {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    let mut text = String::with_capacity(input.len() + 2);
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\u{1A}' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                text.push('\n');
            }
            _ => text.push(ch),
        }
    }
    text.push_str("\n\n");
    escape::detab(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize("a\r\nb\rc"), "a\nb\nc\n\n");
    }

    #[test]
    fn test_normalize_strips_sentinel_and_bom() {
        assert_eq!(normalize("\u{FEFF}a\u{1A}b"), "ab\n\n");
    }

    #[test]
    fn test_transform_is_reusable() {
        let engine = Engine::default();
        let first = engine.transform("one");
        let second = engine.transform("one");
        assert_eq!(first, second);
    }

    #[test]
    fn test_transform_trailing_newline() {
        let engine = Engine::default();
        assert!(engine.transform("x").ends_with('\n'));
    }
}
