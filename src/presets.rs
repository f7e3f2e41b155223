//! Named feature presets.
//!
//! Three fixed combinations cover the common deployments: `full` for trusted
//! authors, `light` for comment-style input where raw HTML and footnote
//! machinery are unwanted, and `minimal` for plain paragraphs with emphasis
//! only. Anything in between is built by editing a [`Features`] value
//! directly or loading one from a feature file.

use crate::options::Features;

/// Every feature enabled. This is also `Features::default()`.
pub fn full() -> Features {
    Features::all()
}

/// A reduced set for lightly-marked-up text: headers, lists, horizontal
/// rules, inline/reference links, URL autolinks and entity preservation.
/// Raw HTML, tables, footnotes and the other block extensions stay off.
pub fn light() -> Features {
    Features {
        header: true,
        list: true,
        horizontal_rule: true,
        inline_link: true,
        reference_link: true,
        auto_link: true,
        entities: true,
        ..Features::none()
    }
}

/// Everything off: paragraphs, emphasis, code spans and escapes only.
pub fn minimal() -> Features {
    Features::none()
}

/// Look a preset up by name.
pub fn by_name(name: &str) -> Option<Features> {
    match name {
        "full" => Some(full()),
        "light" => Some(light()),
        "minimal" | "min" => Some(minimal()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_disables_html() {
        let features = light();
        assert!(features.header);
        assert!(!features.html_block);
        assert!(!features.foot_note);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("light"), Some(light()));
        assert_eq!(by_name("min"), Some(minimal()));
        assert_eq!(by_name("bogus"), None);
    }
}
