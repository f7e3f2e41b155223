//! Links and images: inline, reference and shortcut forms, autolinks,
//! obfuscated mailto, and feature gating per form.

use extramark::{to_html, Engine, Features, Options};

#[test]
fn test_inline_link() {
    assert_eq!(
        to_html("[text](/url)"),
        "<p><a href=\"/url\">text</a></p>\n"
    );
}

#[test]
fn test_inline_link_with_title() {
    assert_eq!(
        to_html("[t](/u \"T\")"),
        "<p><a href=\"/u\" title=\"T\">t</a></p>\n"
    );
}

#[test]
fn test_inline_link_amp_in_url() {
    assert_eq!(
        to_html("[a](/u?x=1&y=2)"),
        "<p><a href=\"/u?x=1&amp;y=2\">a</a></p>\n"
    );
}

#[test]
fn test_reference_link() {
    assert_eq!(
        to_html("[text][id]\n\n[id]: http://example.com \"Title\"\n"),
        "<p><a href=\"http://example.com\" title=\"Title\">text</a></p>\n"
    );
}

#[test]
fn test_reference_link_implicit_id() {
    assert_eq!(
        to_html("[id][]\n\n[id]: /x\n"),
        "<p><a href=\"/x\">id</a></p>\n"
    );
}

#[test]
fn test_reference_ids_are_case_folded() {
    assert_eq!(
        to_html("[text][An ID]\n\n[an id]: /x\n"),
        "<p><a href=\"/x\">text</a></p>\n"
    );
}

#[test]
fn test_shortcut_link() {
    assert_eq!(to_html("[id]\n\n[id]: /x\n"), "<p><a href=\"/x\">id</a></p>\n");
}

#[test]
fn test_missing_reference_stays_literal() {
    assert_eq!(to_html("[a][nope]"), "<p>[a][nope]</p>\n");
}

#[test]
fn test_link_text_runs_span_gamut() {
    assert_eq!(
        to_html("[*a*](/b)"),
        "<p><a href=\"/b\"><em>a</em></a></p>\n"
    );
}

#[test]
fn test_emphasis_does_not_break_links() {
    assert_eq!(
        to_html("*[a](/b)*"),
        "<p><em><a href=\"/b\">a</a></em></p>\n"
    );
}

#[test]
fn test_nested_brackets_in_link_text() {
    assert_eq!(
        to_html("[a [b]](/c)"),
        "<p><a href=\"/c\">a [b]</a></p>\n"
    );
}

#[test]
fn test_image_inline() {
    assert_eq!(
        to_html("![alt](/img.png)"),
        "<p><img src=\"/img.png\" alt=\"alt\" /></p>\n"
    );
}

#[test]
fn test_image_with_title() {
    assert_eq!(
        to_html("![a](/i.png \"t\")"),
        "<p><img src=\"/i.png\" alt=\"a\" title=\"t\" /></p>\n"
    );
}

#[test]
fn test_image_reference() {
    assert_eq!(
        to_html("![a][pic]\n\n[pic]: /p.png\n"),
        "<p><img src=\"/p.png\" alt=\"a\" /></p>\n"
    );
}

#[test]
fn test_autolink_url() {
    assert_eq!(
        to_html("<http://example.com/>"),
        "<p><a href=\"http://example.com/\">http://example.com/</a></p>\n"
    );
}

#[test]
fn test_mailto_is_obfuscated_and_deterministic() {
    let first = to_html("<user@example.com>");
    let second = to_html("<user@example.com>");
    assert_eq!(first, second);
    assert!(first.starts_with("<p><a href=\""));
    // The at sign is always encoded.
    assert!(!first.contains('@'));
    assert!(first.contains("&#"));
}

#[test]
fn test_inline_link_feature_disabled() {
    let features = Features {
        inline_link: false,
        ..Features::all()
    };
    let engine = Engine::new(Options::with_features(features));
    assert_eq!(engine.transform("[a](/b)"), "<p>[a](/b)</p>\n");
}

#[test]
fn test_shortcut_needs_its_feature() {
    let features = Features {
        shortcut_link: false,
        ..Features::all()
    };
    let engine = Engine::new(Options::with_features(features));
    assert_eq!(
        engine.transform("[id]\n\n[id]: /x\n"),
        "<p>[id]</p>\n"
    );
}
