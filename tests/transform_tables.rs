//! Pipe tables: both header forms, alignment, padding, protected pipes.

use extramark::{to_html, Engine, Features, Options};

#[test]
fn test_bare_table_with_alignment() {
    let expected = "<table>\n\
                    <thead>\n\
                    <tr>\n\
                    \x20 <th align=\"right\">a</th>\n\
                    \x20 <th align=\"left\">b</th>\n\
                    </tr>\n\
                    </thead>\n\
                    <tbody>\n\
                    <tr>\n\
                    \x20 <td align=\"right\">1</td>\n\
                    \x20 <td align=\"left\">2</td>\n\
                    </tr>\n\
                    </tbody>\n\
                    </table>\n";
    assert_eq!(to_html("a|b\n--:|:--\n1|2\n"), expected);
}

#[test]
fn test_center_alignment() {
    let html = to_html("a|b\n:-:|---\nx|y\n");
    assert!(html.contains("<th align=\"center\">a</th>"));
    assert!(html.contains("<th>b</th>"));
}

#[test]
fn test_leading_pipe_form() {
    let html = to_html("| a | b |\n| --- | --- |\n| 1 | 2 |\n");
    assert!(html.starts_with("<table>"));
    assert!(html.contains("  <th>a</th>"));
    assert!(html.contains("  <td>2</td>"));
}

#[test]
fn test_short_rows_are_padded() {
    let html = to_html("a|b|c\n--|--|--\n1|2\n");
    assert!(html.contains("  <td>2</td>"));
    // Third cell exists but is empty.
    assert!(html.contains("  <td></td>"));
}

#[test]
fn test_pipes_inside_code_spans_do_not_split() {
    let html = to_html("a|`b|c`\n--|--\n1|`2|3`\n");
    assert!(html.contains("<th><code>b|c</code></th>"));
    assert!(html.contains("<td><code>2|3</code></td>"));
}

#[test]
fn test_cells_run_span_gamut() {
    let html = to_html("a|b\n--|--\n*x*|y\n");
    assert!(html.contains("<td><em>x</em></td>"));
}

#[test]
fn test_table_feature_disabled() {
    let features = Features {
        table: false,
        ..Features::all()
    };
    let engine = Engine::new(Options::with_features(features));
    assert_eq!(
        engine.transform("a|b\n--:|:--\n1|2\n"),
        "<p>a|b\n--:|:--\n1|2</p>\n"
    );
}

#[test]
fn test_table_needs_terminating_blank_or_end() {
    // A non-row line glued to the body means no table was there.
    let html = to_html("a|b\n--|--\n1|2\nplain text\n");
    assert!(!html.contains("<table>"));
}
