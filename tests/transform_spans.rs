//! Span elements: emphasis, code spans, escapes, entity handling.

use extramark::to_html;
use rstest::rstest;

#[rstest]
#[case("*hi*", "<p><em>hi</em></p>\n")]
#[case("_hi_", "<p><em>hi</em></p>\n")]
#[case("**hi**", "<p><strong>hi</strong></p>\n")]
#[case("__hi__", "<p><strong>hi</strong></p>\n")]
#[case("***hi***", "<p><strong><em>hi</em></strong></p>\n")]
fn test_emphasis_forms(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(to_html(source), expected);
}

#[test]
fn test_emphasis_nesting() {
    assert_eq!(
        to_html("*a **b** c*"),
        "<p><em>a <strong>b</strong> c</em></p>\n"
    );
}

#[test]
fn test_underscore_inside_word_is_literal() {
    assert_eq!(to_html("snake_case_name"), "<p>snake_case_name</p>\n");
}

#[test]
fn test_unmatched_marker_stays_literal() {
    assert_eq!(to_html("*a"), "<p>*a</p>\n");
    assert_eq!(to_html("a ** b"), "<p>a ** b</p>\n");
}

#[test]
fn test_long_runs_are_literal() {
    assert_eq!(to_html("****x****"), "<p>****x****</p>\n");
}

#[test]
fn test_code_span_escapes_content() {
    assert_eq!(to_html("`a > b`"), "<p><code>a &gt; b</code></p>\n");
}

#[test]
fn test_code_span_with_backtick_inside() {
    assert_eq!(to_html("``a ` b``"), "<p><code>a ` b</code></p>\n");
}

#[test]
fn test_code_span_protects_emphasis() {
    assert_eq!(to_html("`*not em*`"), "<p><code>*not em*</code></p>\n");
}

#[test]
fn test_unclosed_code_span_is_literal() {
    assert_eq!(to_html("a ` b"), "<p>a ` b</p>\n");
}

#[test]
fn test_backslash_escapes() {
    assert_eq!(to_html(r"\*lit\*"), "<p>&#42;lit&#42;</p>\n");
    assert_eq!(to_html(r"a \| b"), "<p>a &#124; b</p>\n");
}

#[test]
fn test_ampersand_encoding() {
    assert_eq!(to_html("AT&T & &copy;"), "<p>AT&amp;T &amp; &copy;</p>\n");
}

#[test]
fn test_angle_encoding() {
    assert_eq!(to_html("1 < 2"), "<p>1 &lt; 2</p>\n");
}

#[test]
fn test_inline_html_passthrough() {
    assert_eq!(to_html("a <b>bold</b> c"), "<p>a <b>bold</b> c</p>\n");
}

#[test]
fn test_inline_html_protects_content() {
    // Attribute text must not grow emphasis markup.
    assert_eq!(
        to_html(r#"<span title="*x*">y</span>"#),
        "<p><span title=\"*x*\">y</span></p>\n"
    );
}
