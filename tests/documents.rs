//! Whole-document snapshots covering several passes at once.

use extramark::to_html;

#[test]
fn test_small_document() {
    let source = "# Doc {#top}\n\nSome *text* with `code`.\n\n- one\n- two\n";
    insta::assert_snapshot!(to_html(source), @r###"
    <h1 id="top">Doc</h1>

    <p>Some <em>text</em> with <code>code</code>.</p>

    <ul>
    <li>one</li>
    <li>two</li>
    </ul>
    "###);
}

#[test]
fn test_document_with_rule_and_quote() {
    let source = "intro\n\n---\n\n> quoted\n";
    insta::assert_snapshot!(to_html(source), @r###"
    <p>intro</p>

    <hr />

    <blockquote>
      <p>quoted</p>
    </blockquote>
    "###);
}
