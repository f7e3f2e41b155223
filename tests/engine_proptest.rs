//! Property tests: the engine is total. Every input terminates and
//! produces output, even on malformed, unbalanced or adversarial markup.

use extramark::{to_html, Engine, Options, presets};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn transform_is_total(input in "\\PC{0,200}") {
        let html = to_html(&input);
        prop_assert!(html.ends_with('\n'));
    }

    #[test]
    fn transform_is_total_on_markup_soup(
        input in "[a-z \n<>/*_`~#|:.!\\[\\]()\"'=-]{0,160}"
    ) {
        let html = to_html(&input);
        prop_assert!(html.ends_with('\n'));
    }

    #[test]
    fn transform_is_deterministic(input in "[a-z \n<>*_`#\\[\\]-]{0,120}") {
        prop_assert_eq!(to_html(&input), to_html(&input));
    }

    #[test]
    fn unterminated_markers_never_loop(
        prefix in "[a-z ]{0,20}",
        marker in prop::sample::select(vec!["`", "```", "~~~", "<div>", "<p markdown=\"1\">", "[", "![", "**"])
    ) {
        let input = format!("{prefix}{marker}");
        let html = to_html(&input);
        prop_assert!(html.ends_with('\n'));
    }

    #[test]
    fn sentinel_bytes_are_stripped(input in "[a-zB\u{1A}0-9]{0,60}") {
        let html = to_html(&input);
        let sentinel = '\u{1A}';
        prop_assert!(!html.contains(sentinel));
    }

    #[test]
    fn minimal_preset_is_total(input in "\\PC{0,120}") {
        let engine = Engine::new(Options::with_features(presets::minimal()));
        let html = engine.transform(&input);
        prop_assert!(html.ends_with('\n'));
    }
}
