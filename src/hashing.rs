//! Placeholder store: protects finalized fragments from re-processing.
//!
//! Once a pass has produced its final HTML for some region (a code span, a
//! raw HTML block, an escaped character), the fragment is swapped for a
//! short synthetic token and parked in a per-call table. No later pass can
//! re-interpret what it cannot see; the tokens are resolved back to their
//! fragments once, at the very end of the transform.
//!
//! Token format: `{kind}\u{1A}{counter}{kind}`. The U+001A (SUB) control
//! character is the sentinel that makes tokens unambiguous with user
//! content: input normalization strips every occurrence of it before any
//! pass runs, so a well-formed token can only have been produced by this
//! store. The kind discriminator letter lets the paragraph-formation pass
//! decide, without resolving anything, whether a chunk is a block-level
//! placeholder (left unwrapped) or ordinary text (wrapped in `<p>`).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// What the protected fragment may be used as after restoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProtectKind {
    /// A block-level sibling: headers, tables, `<pre>` blocks, raw HTML
    /// blocks. Paragraph formation skips chunks holding one of these.
    Block,
    /// Content that must never be wrapped in a paragraph but is not a
    /// block element either: comments, processing instructions, scripts.
    Clean,
    /// An inline run: code spans, escaped characters, produced tags.
    Span,
}

impl ProtectKind {
    fn discriminator(self) -> char {
        match self {
            ProtectKind::Block => 'B',
            ProtectKind::Clean => 'C',
            ProtectKind::Span => 'X',
        }
    }
}

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new("[BCX]\u{1A}[0-9]+[BCX]").unwrap());
static BLOCK_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^B\u{1A}[0-9]+B|^C\u{1A}[0-9]+C$").unwrap());

/// Per-call table of token → finalized fragment.
#[derive(Debug, Default)]
pub(crate) struct PlaceholderStore {
    fragments: HashMap<String, String>,
    counter: usize,
}

impl PlaceholderStore {
    pub fn new() -> Self {
        PlaceholderStore::default()
    }

    /// Park `fragment` behind a fresh token and return the token.
    ///
    /// Any tokens already embedded in the fragment are resolved first, so
    /// stored fragments never nest and a single restoration pass suffices.
    pub fn protect(&mut self, fragment: &str, kind: ProtectKind) -> String {
        let fragment = self.restore_all(fragment);
        self.counter += 1;
        let c = kind.discriminator();
        let token = format!("{c}\u{1A}{}{c}", self.counter);
        self.fragments.insert(token.clone(), fragment);
        token
    }

    /// Replace every token occurrence with its stored fragment.
    ///
    /// Idempotent: restored text contains no tokens, so a second call finds
    /// nothing left to replace. A token-shaped sequence with no table entry
    /// is left untouched.
    pub fn restore_all(&self, text: &str) -> String {
        if !text.contains('\u{1A}') {
            return text.to_string();
        }
        TOKEN_RE
            .replace_all(text, |caps: &regex::Captures| {
                let token = caps.get(0).unwrap().as_str();
                match self.fragments.get(token) {
                    Some(fragment) => fragment.clone(),
                    None => token.to_string(),
                }
            })
            .into_owned()
    }

    /// True when `chunk` opens with a block token or consists of a single
    /// clean token, meaning the paragraph-formation pass must not wrap it.
    pub fn is_block_placeholder(chunk: &str) -> bool {
        BLOCK_TOKEN_RE.is_match(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protect_and_restore() {
        let mut store = PlaceholderStore::new();
        let token = store.protect("<hr />", ProtectKind::Block);
        let text = format!("before\n\n{token}\n\nafter");
        let restored = store.restore_all(&text);
        assert_eq!(restored, "before\n\n<hr />\n\nafter");
    }

    #[test]
    fn test_restore_is_idempotent() {
        let mut store = PlaceholderStore::new();
        let token = store.protect("<p>x</p>", ProtectKind::Block);
        let once = store.restore_all(&token);
        let twice = store.restore_all(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_tokens_are_distinct() {
        let mut store = PlaceholderStore::new();
        let a = store.protect("a", ProtectKind::Span);
        let b = store.protect("b", ProtectKind::Span);
        assert_ne!(a, b);
    }

    #[test]
    fn test_nested_fragments_are_flattened() {
        let mut store = PlaceholderStore::new();
        let inner = store.protect("<code>x</code>", ProtectKind::Span);
        let outer = store.protect(&format!("<p>{inner}</p>"), ProtectKind::Block);
        assert_eq!(store.restore_all(&outer), "<p><code>x</code></p>");
    }

    #[test]
    fn test_block_placeholder_detection() {
        let mut store = PlaceholderStore::new();
        let block = store.protect("<hr />", ProtectKind::Block);
        let span = store.protect("<code>x</code>", ProtectKind::Span);
        assert!(PlaceholderStore::is_block_placeholder(&block));
        assert!(!PlaceholderStore::is_block_placeholder(&span));
        assert!(!PlaceholderStore::is_block_placeholder(&format!("x {block}")));
    }

    #[test]
    fn test_unknown_token_left_alone() {
        let store = PlaceholderStore::new();
        let stray = "B\u{1A}42B";
        assert_eq!(store.restore_all(stray), stray);
    }
}
