//! Approximate substring matching over case-folded text.
//!
//! Uses Sellers' variant of the Levenshtein recurrence: the pattern may start
//! anywhere in the text at no cost, so the result is the cheapest edit
//! distance between the pattern and any window of the text. Start positions
//! are carried through the table so the window can be highlighted.

use std::ops::Range;

/// Lower-cased characters of a field, each mapped back to the byte range of
/// the original character it came from.
#[derive(Debug, Clone, Default)]
pub(crate) struct FoldedText {
    chars: Vec<char>,
    origins: Vec<Range<usize>>,
}

impl FoldedText {
    pub(crate) fn new(text: &str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut origins = Vec::with_capacity(text.len());
        for (idx, ch) in text.char_indices() {
            let origin = idx..idx + ch.len_utf8();
            for lower in ch.to_lowercase() {
                chars.push(lower);
                origins.push(origin.clone());
            }
        }
        Self { chars, origins }
    }

    pub(crate) fn chars(&self) -> &[char] {
        &self.chars
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Byte range in the original text covering folded chars `start..end`.
    pub(crate) fn byte_range(&self, start: usize, end: usize) -> Option<Range<usize>> {
        if start >= end {
            return None;
        }
        let first = self.origins.get(start)?;
        let last = self.origins.get(end - 1)?;
        Some(first.start..last.end)
    }

    /// Every non-overlapping exact occurrence of `needle`, as folded char ranges.
    pub(crate) fn find_all(&self, needle: &[char]) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        if needle.is_empty() || needle.len() > self.chars.len() {
            return out;
        }
        let mut pos = 0usize;
        while pos + needle.len() <= self.chars.len() {
            if self.chars[pos..pos + needle.len()] == *needle {
                out.push(pos..pos + needle.len());
                pos += needle.len();
            } else {
                pos += 1;
            }
        }
        out
    }
}

pub(crate) fn fold(text: &str) -> Vec<char> {
    text.chars().flat_map(char::to_lowercase).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Window {
    pub(crate) distance: usize,
    /// Folded char range of the best-matching window.
    pub(crate) range: Range<usize>,
}

/// Cheapest window of `text` matching `pattern`. The earliest window wins ties.
pub(crate) fn best_window(pattern: &[char], text: &[char]) -> Option<Window> {
    if pattern.is_empty() || text.is_empty() {
        return None;
    }
    let rows = pattern.len() + 1;
    let mut dist: Vec<usize> = (0..rows).collect();
    let mut start: Vec<usize> = vec![0; rows];
    let mut next_dist = vec![0usize; rows];
    let mut next_start = vec![0usize; rows];
    let mut best: Option<Window> = None;

    for (col, text_ch) in text.iter().enumerate() {
        next_dist[0] = 0;
        next_start[0] = col + 1;
        for row in 1..rows {
            let cost = usize::from(pattern[row - 1] != *text_ch);
            let mut value = dist[row - 1] + cost;
            let mut origin = start[row - 1];
            if dist[row] + 1 < value {
                value = dist[row] + 1;
                origin = start[row];
            }
            if next_dist[row - 1] + 1 < value {
                value = next_dist[row - 1] + 1;
                origin = next_start[row - 1];
            }
            next_dist[row] = value;
            next_start[row] = origin;
        }

        let distance = next_dist[rows - 1];
        if best.as_ref().is_none_or(|current| distance < current.distance) {
            best = Some(Window {
                distance,
                range: next_start[rows - 1]..col + 1,
            });
        }
        std::mem::swap(&mut dist, &mut next_dist);
        std::mem::swap(&mut start, &mut next_start);
    }
    best
}

/// Normalised distance in `[0, 1]`: edits divided by pattern length.
pub(crate) fn ratio(window: &Window, pattern_len: usize) -> f32 {
    if pattern_len == 0 {
        return 1.0;
    }
    (usize_to_f32(window.distance) / usize_to_f32(pattern_len)).min(1.0)
}

#[allow(
    clippy::cast_precision_loss,
    reason = "edit counts are small and ranking tolerates lossy f32"
)]
pub(crate) const fn usize_to_f32(value: usize) -> f32 {
    value as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(pattern: &str, text: &str) -> Window {
        best_window(&fold(pattern), &fold(text)).expect("window")
    }

    #[test]
    fn exact_substring_has_zero_distance() {
        let found = window("flake", "Snowflake setup");
        assert_eq!(found.distance, 0);
        assert_eq!(found.range, 4..9);
    }

    #[test]
    fn single_typo_costs_one_edit() {
        let found = window("snowflak", "intro to snowflake");
        assert_eq!(found.distance, 0);
        let typo = window("snowfleke", "intro to snowflake");
        assert_eq!(typo.distance, 1);
        assert_eq!(typo.range, 9..18);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(window("RUST", "learning rust").distance, 0);
    }

    #[test]
    fn earliest_window_wins_ties() {
        let found = window("ab", "ab ab");
        assert_eq!(found.range, 0..2);
    }

    #[test]
    fn unrelated_text_costs_close_to_pattern_length() {
        let found = window("xyz", "abc");
        assert_eq!(found.distance, 3);
        assert!((ratio(&found, 3) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn byte_ranges_stay_on_char_boundaries() {
        let text = "データベース設計";
        let folded = FoldedText::new(text);
        let found = best_window(&fold("ベース"), folded.chars()).expect("window");
        assert_eq!(found.distance, 0);
        let range = folded.byte_range(found.range.start, found.range.end).expect("range");
        assert_eq!(&text[range], "ベース");
    }

    #[test]
    fn expanding_lowercase_maps_back_to_whole_char() {
        let text = "İstanbul";
        let folded = FoldedText::new(text);
        assert!(folded.chars().len() > text.chars().count());
        let range = folded.byte_range(0, 1).expect("range");
        assert_eq!(&text[range], "İ");
    }

    #[test]
    fn find_all_returns_non_overlapping_occurrences() {
        let folded = FoldedText::new("aaa Rust rust");
        assert_eq!(folded.find_all(&fold("aa")), vec![0..2]);
        assert_eq!(folded.find_all(&fold("rust")), vec![4..8, 9..13]);
        assert!(folded.find_all(&fold("go")).is_empty());
    }

    #[test]
    fn empty_inputs_have_no_window() {
        assert!(best_window(&[], &fold("abc")).is_none());
        assert!(best_window(&fold("abc"), &[]).is_none());
    }
}
