//! Fenced code blocks: tilde fences, closing-run length, protection from
//! every other pass.

use extramark::{to_html, Engine, Features, Options};

#[test]
fn test_basic_fence() {
    assert_eq!(
        to_html("~~~\ncode\n~~~\n"),
        "<pre><code>code\n</code></pre>\n"
    );
}

#[test]
fn test_content_is_escaped_verbatim() {
    assert_eq!(
        to_html("~~~\na < b\n~~~\n"),
        "<pre><code>a &lt; b\n</code></pre>\n"
    );
}

#[test]
fn test_content_is_never_reinterpreted() {
    let html = to_html("~~~\n# not a header\n*not em*\n- not a list\n~~~\n");
    assert!(!html.contains("<h1>"));
    assert!(!html.contains("<em>"));
    assert!(!html.contains("<li>"));
    assert!(html.contains("# not a header"));
}

#[test]
fn test_closing_fence_may_be_longer() {
    assert_eq!(
        to_html("~~~\ncode\n~~~~~\n"),
        "<pre><code>code\n</code></pre>\n"
    );
}

#[test]
fn test_shorter_run_does_not_close() {
    let html = to_html("~~~~\ncode\n~~~\nmore\n~~~~\n");
    // The three-tilde line is content, not a closer.
    assert!(html.contains("~~~\n"));
    assert!(html.contains("more"));
}

#[test]
fn test_unclosed_fence_is_literal() {
    assert_eq!(to_html("~~~\ncode\n"), "<p>~~~\ncode</p>\n");
}

#[test]
fn test_leading_blank_lines_become_breaks() {
    assert_eq!(
        to_html("~~~\n\ncode\n~~~\n"),
        "<pre><code><br />code\n</code></pre>\n"
    );
}

#[test]
fn test_fence_feature_disabled() {
    let features = Features {
        fenced_code_block: false,
        ..Features::all()
    };
    let engine = Engine::new(Options::with_features(features));
    let html = engine.transform("~~~\ncode\n~~~\n");
    assert!(!html.contains("<pre>"));
}
