//! Ordered pass tables for the three transformation granularities.
//!
//! A gamut is a list of `(name, priority, handler)` entries executed in
//! ascending priority order, each pass receiving the previous pass's
//! output. The tables are built once at engine construction from the
//! active feature set and never change afterwards; a disabled feature's
//! passes are simply absent, not invoked as no-ops, so running a gamut is
//! a plain slice iteration with no name lookups.

use crate::engine::Transform;
use crate::options::Features;

/// A single transformation pass.
pub(crate) type PassFn = fn(&mut Transform<'_>, &str) -> String;

pub(crate) struct Pass {
    pub name: &'static str,
    pub priority: i32,
    pub run: PassFn,
}

impl Pass {
    fn new(name: &'static str, priority: i32, run: PassFn) -> Self {
        Pass { name, priority, run }
    }
}

/// Sort ascending by priority; the stable sort keeps declaration order for
/// equal priorities.
fn sorted(mut passes: Vec<Pass>) -> Vec<Pass> {
    passes.sort_by_key(|pass| pass.priority);
    passes
}

/// Document-level passes: definition stripping, the block gamut over the
/// document body, and the appended footnote list.
pub(crate) fn document_gamut(features: &Features) -> Vec<Pass> {
    let mut passes = Vec::new();
    if features.fenced_code_block {
        passes.push(Pass::new("fenced_code_blocks", 5, |t, s| t.do_fenced_code_blocks(s)));
    }
    if features.foot_note {
        passes.push(Pass::new("strip_footnotes", 15, |t, s| t.strip_footnotes(s)));
    }
    if features.reference_link || features.shortcut_link {
        passes.push(Pass::new(
            "strip_link_definitions",
            20,
            |t, s| t.strip_link_definitions(s),
        ));
    }
    if features.abbreviation {
        passes.push(Pass::new("strip_abbreviations", 25, |t, s| t.strip_abbreviations(s)));
    }
    passes.push(Pass::new("basic_block_gamut", 30, |t, s| t.run_basic_block_gamut(s)));
    if features.foot_note {
        passes.push(Pass::new("append_footnotes", 50, |t, s| t.append_footnotes(s)));
    }
    sorted(passes)
}

/// Block-level passes. The raw-markup scan sits at a fixed low priority and
/// paragraph formation at a fixed high one; both are managed by the gamut
/// runner (the document-level entry skips the scan because the engine scans
/// once up front).
pub(crate) const SCAN_PASS_NAME: &str = "scan_raw_blocks";

pub(crate) fn block_gamut(features: &Features) -> Vec<Pass> {
    let mut passes = Vec::new();
    if features.html_block {
        passes.push(Pass::new(SCAN_PASS_NAME, -100, |t, s| t.scan_raw_blocks(s)));
    }
    if features.fenced_code_block {
        passes.push(Pass::new("fenced_code_blocks", 5, |t, s| t.do_fenced_code_blocks(s)));
    }
    if features.header {
        passes.push(Pass::new("headers", 10, |t, s| t.do_headers(s)));
    }
    if features.table {
        passes.push(Pass::new("tables", 15, |t, s| t.do_tables(s)));
    }
    if features.horizontal_rule {
        passes.push(Pass::new("horizontal_rules", 20, |t, s| t.do_horizontal_rules(s)));
    }
    if features.list {
        passes.push(Pass::new("lists", 40, |t, s| t.do_lists(s)));
    }
    if features.definition_list {
        passes.push(Pass::new("definition_lists", 45, |t, s| t.do_def_lists(s)));
    }
    if features.code_block {
        passes.push(Pass::new("code_blocks", 50, |t, s| t.do_code_blocks(s)));
    }
    if features.block_quote {
        passes.push(Pass::new("block_quotes", 60, |t, s| t.do_block_quotes(s)));
    }
    passes.push(Pass::new("form_paragraphs", 100, |t, s| t.form_paragraphs(s)));
    sorted(passes)
}

/// Span-level passes. The protective tokenizer runs first; emphasis runs
/// after the link forms so bracketed link text is never mistaken for
/// emphasis delimiters; abbreviation wrapping runs last so it never touches
/// text already inside a produced tag.
pub(crate) fn span_gamut(features: &Features) -> Vec<Pass> {
    let mut passes = vec![Pass::new("parse_span", -30, |t, s| t.parse_span(s))];
    if features.foot_note {
        passes.push(Pass::new("footnote_refs", 5, |t, s| t.do_footnote_refs(s)));
    }
    if features.inline_link || features.reference_link {
        passes.push(Pass::new("images", 10, |t, s| t.do_images(s)));
    }
    if features.inline_link || features.reference_link || features.shortcut_link {
        passes.push(Pass::new("anchors", 20, |t, s| t.do_anchors(s)));
    }
    if features.auto_link || features.auto_mailto {
        passes.push(Pass::new("auto_links", 30, |t, s| t.do_auto_links(s)));
    }
    if features.entities {
        passes.push(Pass::new("amps_and_angles", 40, |t, s| t.do_amps_and_angles(s)));
    }
    passes.push(Pass::new("emphasis", 50, |t, s| t.do_emphasis(s)));
    passes.push(Pass::new("hard_breaks", 60, |t, s| t.do_hard_breaks(s)));
    if features.abbreviation {
        passes.push(Pass::new("abbreviations", 70, |t, s| t.do_abbreviations(s)));
    }
    sorted(passes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_gamut_order() {
        let passes = block_gamut(&Features::all());
        let names: Vec<_> = passes.iter().map(|pass| pass.name).collect();
        assert_eq!(names.first(), Some(&"scan_raw_blocks"));
        assert_eq!(names.last(), Some(&"form_paragraphs"));
        let headers = names.iter().position(|n| *n == "headers").unwrap();
        let lists = names.iter().position(|n| *n == "lists").unwrap();
        assert!(headers < lists);
    }

    #[test]
    fn test_disabled_feature_absent() {
        let mut features = Features::all();
        features.table = false;
        let names: Vec<_> = block_gamut(&features).iter().map(|pass| pass.name).collect();
        assert!(!names.contains(&"tables"));
    }

    #[test]
    fn test_span_gamut_constraints() {
        let names: Vec<_> = span_gamut(&Features::all()).iter().map(|pass| pass.name).collect();
        let anchors = names.iter().position(|n| *n == "anchors").unwrap();
        let emphasis = names.iter().position(|n| *n == "emphasis").unwrap();
        assert!(anchors < emphasis);
        assert_eq!(names.last(), Some(&"abbreviations"));
    }
}
