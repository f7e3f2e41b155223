//! Abbreviations: definitions, predefined words, word-boundary rules.

use std::collections::BTreeMap;

use extramark::{to_html, Engine, Features, Options};

fn engine_with_predef(word: &str, description: &str) -> Engine {
    let mut options = Options::default();
    options.predefined_abbreviations =
        BTreeMap::from([(word.to_string(), description.to_string())]);
    Engine::new(options)
}

#[test]
fn test_definition_is_stripped_and_applied() {
    assert_eq!(
        to_html("The HTML spec.\n\n*[HTML]: HyperText Markup Language\n"),
        "<p>The <abbr title=\"HyperText Markup Language\">HTML</abbr> spec.</p>\n"
    );
}

#[test]
fn test_predefined_abbreviation() {
    let engine = engine_with_predef("HTML", "HyperText Markup Language");
    assert_eq!(
        engine.transform("HTML is great"),
        "<p><abbr title=\"HyperText Markup Language\">HTML</abbr> is great</p>\n"
    );
}

#[test]
fn test_partial_word_is_not_wrapped() {
    let engine = engine_with_predef("HTML", "HyperText Markup Language");
    assert_eq!(engine.transform("HTMLish stuff"), "<p>HTMLish stuff</p>\n");
    assert_eq!(engine.transform("xHTML"), "<p>xHTML</p>\n");
}

#[test]
fn test_empty_description_gives_bare_element() {
    let html = to_html("NASA rocks.\n\n*[NASA]:\n");
    assert_eq!(html, "<p><abbr>NASA</abbr> rocks.</p>\n");
}

#[test]
fn test_description_is_attribute_encoded() {
    let html = to_html("ATT corp\n\n*[ATT]: American Telephone \"and\" Telegraph\n");
    assert!(html.contains("title=\"American Telephone &quot;and&quot; Telegraph\""));
}

#[test]
fn test_every_occurrence_is_wrapped() {
    let engine = engine_with_predef("SQL", "Structured Query Language");
    let html = engine.transform("SQL here, SQL there");
    assert_eq!(html.matches("<abbr").count(), 2);
}

#[test]
fn test_abbreviation_feature_disabled() {
    let features = Features {
        abbreviation: false,
        ..Features::all()
    };
    let mut options = Options::with_features(features);
    options.predefined_abbreviations =
        BTreeMap::from([("HTML".to_string(), "HyperText Markup Language".to_string())]);
    let engine = Engine::new(options);
    assert_eq!(engine.transform("HTML stays"), "<p>HTML stays</p>\n");
}
