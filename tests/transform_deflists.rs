//! Definition lists: tight and multi-paragraph definitions.

use extramark::{to_html, Engine, Features, Options};

#[test]
fn test_simple_definition() {
    assert_eq!(
        to_html("Term\n: definition\n"),
        "<dl>\n<dt>Term</dt>\n\n<dd>definition</dd>\n</dl>\n"
    );
}

#[test]
fn test_multiple_terms_share_definition() {
    let html = to_html("Apple\nPomme\n: a fruit\n");
    assert!(html.contains("<dt>Apple</dt>"));
    assert!(html.contains("<dt>Pomme</dt>"));
    assert!(html.contains("<dd>a fruit</dd>"));
}

#[test]
fn test_multiple_definitions_per_term() {
    let html = to_html("T\n: one\n: two\n");
    assert!(html.contains("<dd>one</dd>"));
    assert!(html.contains("<dd>two</dd>"));
}

#[test]
fn test_terms_run_span_gamut() {
    let html = to_html("*T*\n: def\n");
    assert!(html.contains("<dt><em>T</em></dt>"));
}

#[test]
fn test_block_definition_gets_paragraphs() {
    let html = to_html("T\n\n: para one\n\n    para two\n");
    assert!(html.contains("<dt>T</dt>"));
    assert!(html.contains("<p>para one</p>"));
    assert!(html.contains("<p>para two</p>"));
    assert!(html.contains("<dd>\n"));
}

#[test]
fn test_definition_list_feature_disabled() {
    let features = Features {
        definition_list: false,
        ..Features::all()
    };
    let engine = Engine::new(Options::with_features(features));
    assert_eq!(engine.transform("T\n: def\n"), "<p>T\n: def</p>\n");
}
