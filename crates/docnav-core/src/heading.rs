use std::collections::{HashMap, HashSet};

const FALLBACK_ID: &str = "heading";

/// Non-Latin blocks kept verbatim in ids even where they are not alphanumeric
/// (e.g. the katakana prolonged sound mark).
const PERMITTED_RANGES: [(char, char); 5] = [
    ('\u{3040}', '\u{309F}'), // hiragana
    ('\u{30A0}', '\u{30FF}'), // katakana
    ('\u{3400}', '\u{4DBF}'), // CJK extension A
    ('\u{4E00}', '\u{9FFF}'), // CJK unified ideographs
    ('\u{AC00}', '\u{D7AF}'), // hangul syllables
];

/// Maps a heading title to a slug id. Never returns an empty string.
#[must_use]
pub fn generate_heading_id(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.to_lowercase().chars() {
        if is_id_char(ch) {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        return FALLBACK_ID.to_string();
    }
    out
}

fn is_id_char(ch: char) -> bool {
    ch.is_alphanumeric()
        || ch == '_'
        || PERMITTED_RANGES
            .iter()
            .any(|(start, end)| (*start..=*end).contains(&ch))
}

/// Hands out ids unique within one document: `setup`, `setup-1`, `setup-2`, ...
#[derive(Debug, Default)]
pub struct HeadingIdAllocator {
    used: HashSet<String>,
    suffixes: HashMap<String, usize>,
}

impl HeadingIdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, title: &str) -> String {
        let base = generate_heading_id(title);
        if self.used.insert(base.clone()) {
            return base;
        }
        let counter = self.suffixes.entry(base.clone()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{base}-{counter}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_titles_are_lowercased_and_hyphenated() {
        assert_eq!(generate_heading_id("Getting Started"), "getting-started");
        assert_eq!(generate_heading_id("  What's new?  "), "what-s-new");
        assert_eq!(generate_heading_id("a -- b"), "a-b");
        assert_eq!(generate_heading_id("snake_case_name"), "snake_case_name");
    }

    #[test]
    fn japanese_title_keeps_script_characters_without_hyphens() {
        let id = generate_heading_id("データベース設計");
        assert_eq!(id, "データベース設計");
        assert!(!id.contains('-'));
    }

    #[test]
    fn mixed_script_title_joins_runs_with_single_hyphen() {
        assert_eq!(
            generate_heading_id("Snowflake と Slack の連携!"),
            "snowflake-と-slack-の連携"
        );
    }

    #[test]
    fn punctuation_only_title_falls_back() {
        assert_eq!(generate_heading_id("!!! ??? ..."), "heading");
        assert_eq!(generate_heading_id(""), "heading");
    }

    #[test]
    fn generation_is_deterministic() {
        for title in ["Intro", "データ", "", "--x--", "Ünïcödé Title"] {
            assert_eq!(generate_heading_id(title), generate_heading_id(title));
            assert!(!generate_heading_id(title).is_empty());
        }
    }

    #[test]
    fn allocator_suffixes_repeated_titles() {
        let mut ids = HeadingIdAllocator::new();
        assert_eq!(ids.allocate("Setup"), "setup");
        assert_eq!(ids.allocate("Setup"), "setup-1");
        assert_eq!(ids.allocate("setup"), "setup-2");
    }

    #[test]
    fn allocator_skips_suffix_taken_by_literal_heading() {
        let mut ids = HeadingIdAllocator::new();
        assert_eq!(ids.allocate("Setup 1"), "setup-1");
        assert_eq!(ids.allocate("Setup"), "setup");
        assert_eq!(ids.allocate("Setup"), "setup-2");
    }
}
