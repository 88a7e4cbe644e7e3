//! `[[path]]` cross-document references.
//!
//! Matching follows a single left-to-right pass: `[[`, one or more characters
//! other than `]`, then `]]`. Matches never overlap. The path is trimmed and
//! compared against the known set by exact string equality.

use std::collections::HashSet;
use std::ops::Range;

use crate::models::WikiLinkReference;
use crate::text::{escape_html_attribute, escape_html_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawLink<'a> {
    pub(crate) range: Range<usize>,
    pub(crate) inner: &'a str,
}

pub(crate) fn scan_links(body: &str) -> Vec<RawLink<'_>> {
    let bytes = body.as_bytes();
    let mut out = Vec::new();
    let mut cursor = 0usize;

    while let Some(found) = body[cursor..].find("[[") {
        let open = cursor + found;
        let inner_start = open + 2;
        let inner_len = bytes[inner_start..]
            .iter()
            .take_while(|b| **b != b']')
            .count();
        let close = inner_start + inner_len;
        if inner_len > 0 && bytes.get(close..close + 2) == Some(b"]]".as_slice()) {
            out.push(RawLink {
                range: open..close + 2,
                inner: &body[inner_start..close],
            });
            cursor = close + 2;
        } else {
            cursor = open + 1;
        }
    }
    out
}

pub(crate) fn to_reference(raw: &RawLink<'_>, known_paths: &HashSet<String>) -> WikiLinkReference {
    let target = raw.inner.trim();
    WikiLinkReference {
        raw: raw.inner.to_string(),
        target: target.to_string(),
        resolved: known_paths.contains(target),
    }
}

/// Every `[[...]]` occurrence, in order, with its resolution status.
#[must_use]
pub fn find_links(body: &str, known_paths: &HashSet<String>) -> Vec<WikiLinkReference> {
    scan_links(body)
        .iter()
        .map(|raw| to_reference(raw, known_paths))
        .collect()
}

/// HTML annotation for one reference.
#[must_use]
pub fn render_link(reference: &WikiLinkReference, route_prefix: &str) -> String {
    let text = escape_html_text(&reference.target);
    let attr = escape_html_attribute(&reference.target);
    if reference.resolved {
        let href = escape_html_attribute(&format!("{route_prefix}{}", reference.target));
        format!(r#"<a href="{href}" class="wiki-link wiki-link-exists" title="{attr}">{text}</a>"#)
    } else {
        format!(
            r#"<span class="wiki-link wiki-link-missing" title="missing: {attr}">{text}</span>"#
        )
    }
}

/// Replaces each `[[...]]` with its annotation; text between links is kept verbatim.
#[must_use]
pub fn resolve_links(body: &str, known_paths: &HashSet<String>, route_prefix: &str) -> String {
    let links = scan_links(body);
    if links.is_empty() {
        return body.to_string();
    }
    let mut out = String::with_capacity(body.len() + links.len() * 64);
    let mut last = 0usize;
    for raw in &links {
        out.push_str(&body[last..raw.range.start]);
        out.push_str(&render_link(&to_reference(raw, known_paths), route_prefix));
        last = raw.range.end;
    }
    out.push_str(&body[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn marks_known_and_unknown_targets() {
        let refs = find_links("see [[x/y]] and [[x/z]]", &known(&["x/y"]));
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].target, "x/y");
        assert!(refs[0].resolved);
        assert_eq!(refs[1].target, "x/z");
        assert!(!refs[1].resolved);
    }

    #[test]
    fn trims_path_before_lookup() {
        let refs = find_links("[[  x/y  ]]", &known(&["x/y"]));
        assert_eq!(refs[0].raw, "  x/y  ");
        assert_eq!(refs[0].target, "x/y");
        assert!(refs[0].resolved);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let refs = find_links("[[X/Y]]", &known(&["x/y"]));
        assert!(!refs[0].resolved);
    }

    #[test]
    fn matches_are_non_overlapping_and_ordered() {
        let refs = find_links("[[a]][[b]] [[c]", &HashSet::new());
        let targets: Vec<&str> = refs.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["a", "b"]);
    }

    #[test]
    fn extra_opening_bracket_becomes_part_of_path() {
        let refs = find_links("[[[a]]", &HashSet::new());
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "[a");
    }

    #[test]
    fn empty_brackets_are_not_links() {
        assert!(find_links("[[]] and [[", &HashSet::new()).is_empty());
    }

    #[test]
    fn whitespace_only_link_is_reported_as_missing() {
        let refs = find_links("[[ ]]", &known(&["x"]));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target, "");
        assert!(!refs[0].resolved);
    }

    #[test]
    fn resolve_links_annotates_every_match_once() {
        let out = resolve_links(
            "see [[x/y]] and [[x/z]].",
            &known(&["x/y"]),
            "/articles/",
        );
        assert_eq!(
            out,
            concat!(
                r#"see <a href="/articles/x/y" class="wiki-link wiki-link-exists" title="x/y">x/y</a>"#,
                r#" and <span class="wiki-link wiki-link-missing" title="missing: x/z">x/z</span>."#
            )
        );
        assert_eq!(out.matches("wiki-link ").count(), 2);
    }

    #[test]
    fn resolve_links_escapes_targets() {
        let out = resolve_links("[[<b>\"x\"</b>]]", &HashSet::new(), "/a/");
        assert!(out.contains("&lt;b&gt;"));
        assert!(out.contains("&quot;x&quot;"));
        assert!(!out.contains("<b>"));
    }

    #[test]
    fn body_without_links_is_unchanged() {
        let body = "plain [text] with [single] brackets";
        assert_eq!(resolve_links(body, &HashSet::new(), "/"), body);
    }

    #[test]
    fn handles_multibyte_text_around_links() {
        let refs = find_links("参照 [[データ/設計]] です", &known(&["データ/設計"]));
        assert_eq!(refs.len(), 1);
        assert!(refs[0].resolved);
    }
}
