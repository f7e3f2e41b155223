//! Engine configuration: the feature-toggle set and construction options.
//!
//! Both types are plain data with `serde` derives so feature files can be
//! loaded from JSON or YAML by the command-line front end. An [`Options`]
//! value is handed to [`crate::Engine::new`] once and never mutated
//! afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The fixed set of named feature switches.
///
/// Every switch gates one syntax family; a disabled switch removes the
/// corresponding pass(es) from the pipeline, so the syntax falls through to
/// ordinary paragraph text. Fields missing from a deserialized feature file
/// keep their default (enabled) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Setext (`===`/`---` underline) and atx (`#`) headers.
    pub header: bool,
    /// Ordered and unordered lists.
    pub list: bool,
    /// `---`, `***`, `___` horizontal rules.
    pub horizontal_rule: bool,
    /// Pipe-delimited tables with alignment rows.
    pub table: bool,
    /// `[^id]` footnote references and definitions.
    pub foot_note: bool,
    /// `~~~` fenced code blocks.
    pub fenced_code_block: bool,
    /// `*[word]: description` abbreviation definitions.
    pub abbreviation: bool,
    /// `Term` / `: definition` lists.
    pub definition_list: bool,
    /// `[link text](url "optional title")`
    pub inline_link: bool,
    /// `[link text][id]` with a matching `[id]: url` definition.
    pub reference_link: bool,
    /// `[link text]` resolving through the definition table.
    pub shortcut_link: bool,
    /// Raw HTML block passthrough (with `markdown="1"` re-entry).
    pub html_block: bool,
    /// `>` block quotes.
    pub block_quote: bool,
    /// Four-space indented code blocks.
    pub code_block: bool,
    /// `<https://example.com>` autolinks.
    pub auto_link: bool,
    /// `<user@example.com>` obfuscated mailto links.
    pub auto_mailto: bool,
    /// Entity-aware escaping of ampersands and angle brackets. Off, both
    /// pass through untouched.
    pub entities: bool,
}

impl Features {
    /// Every switch enabled.
    pub fn all() -> Self {
        Features {
            header: true,
            list: true,
            horizontal_rule: true,
            table: true,
            foot_note: true,
            fenced_code_block: true,
            abbreviation: true,
            definition_list: true,
            inline_link: true,
            reference_link: true,
            shortcut_link: true,
            html_block: true,
            block_quote: true,
            code_block: true,
            auto_link: true,
            auto_mailto: true,
            entities: true,
        }
    }

    /// Every switch disabled.
    pub fn none() -> Self {
        Features {
            header: false,
            list: false,
            horizontal_rule: false,
            table: false,
            foot_note: false,
            fenced_code_block: false,
            abbreviation: false,
            definition_list: false,
            inline_link: false,
            reference_link: false,
            shortcut_link: false,
            html_block: false,
            block_quote: false,
            code_block: false,
            auto_link: false,
            auto_mailto: false,
            entities: false,
        }
    }
}

impl Default for Features {
    fn default() -> Self {
        Features::all()
    }
}

/// Construction-time configuration for an engine.
///
/// Only the feature set and the pre-supplied reference data live here; every
/// table that grows during a transform is call-scoped and discarded when the
/// call returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub features: Features,
    /// Abbreviations known before any `*[word]: description` is seen.
    pub predefined_abbreviations: BTreeMap<String, String>,
    /// Prefix for footnote ids, useful when several documents share a page.
    pub footnote_id_prefix: String,
    /// Optional `title` attribute for footnote links; `%%` is replaced by
    /// the visible footnote number.
    pub footnote_link_title: String,
    /// Optional `title` attribute for footnote backlinks.
    pub footnote_backlink_title: String,
    /// Optional `class` attribute for footnote links.
    pub footnote_link_class: String,
    /// Optional `class` attribute for footnote backlinks.
    pub footnote_backlink_class: String,
    /// Closing suffix for void elements: `" />"` (XHTML style) or `">"`.
    pub empty_element_suffix: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            features: Features::default(),
            predefined_abbreviations: BTreeMap::new(),
            footnote_id_prefix: String::new(),
            footnote_link_title: String::new(),
            footnote_backlink_title: String::new(),
            footnote_link_class: String::new(),
            footnote_backlink_class: String::new(),
            empty_element_suffix: " />".to_string(),
        }
    }
}

impl Options {
    /// Options with the given feature set and everything else default.
    pub fn with_features(features: Features) -> Self {
        Options {
            features,
            ..Options::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full() {
        assert_eq!(Features::default(), Features::all());
        assert!(Options::default().features.table);
    }

    #[test]
    fn test_feature_file_partial_deserialize() {
        // Missing switches keep their default (enabled) value.
        let features: Features = serde_json::from_str(r#"{"table": false}"#).unwrap();
        assert!(!features.table);
        assert!(features.header);
    }

    #[test]
    fn test_options_roundtrip_yaml() {
        let mut options = Options::default();
        options.footnote_id_prefix = "doc1-".to_string();
        let yaml = serde_yaml::to_string(&options).unwrap();
        let back: Options = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, options);
    }
}
