//! Header syntax: atx and setext forms, id attributes, feature gating.

use extramark::{to_html, Engine, Features, Options};
use rstest::rstest;

#[rstest]
#[case(1, "# One")]
#[case(2, "## Two")]
#[case(3, "### Three")]
#[case(6, "###### Six")]
fn test_atx_levels(#[case] level: usize, #[case] source: &str) {
    let text = source.trim_start_matches('#').trim();
    assert_eq!(to_html(source), format!("<h{level}>{text}</h{level}>\n"));
}

#[test]
fn test_atx_with_id_attribute() {
    assert_eq!(to_html("# Title {#x}"), "<h1 id=\"x\">Title</h1>\n");
}

#[test]
fn test_atx_closing_hashes_stripped() {
    assert_eq!(to_html("## Two ##"), "<h2>Two</h2>\n");
    assert_eq!(to_html("## Two ## {#t}"), "<h2 id=\"t\">Two</h2>\n");
}

#[test]
fn test_setext_levels() {
    assert_eq!(to_html("Title\n====="), "<h1>Title</h1>\n");
    assert_eq!(to_html("Title\n-----"), "<h2>Title</h2>\n");
}

#[test]
fn test_setext_with_id_attribute() {
    assert_eq!(to_html("Title {#t}\n-----"), "<h2 id=\"t\">Title</h2>\n");
}

#[test]
fn test_header_text_runs_span_gamut() {
    assert_eq!(to_html("# A *b*"), "<h1>A <em>b</em></h1>\n");
}

#[test]
fn test_header_feature_disabled() {
    let features = Features {
        header: false,
        ..Features::all()
    };
    let engine = Engine::new(Options::with_features(features));
    assert_eq!(engine.transform("# Title"), "<p># Title</p>\n");
    assert_eq!(engine.transform("Title\n====="), "<p>Title\n=====</p>\n");
}
