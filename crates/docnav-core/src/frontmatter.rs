//! YAML front matter at the head of a document file.

use serde::Deserialize;
use serde_norway::{Mapping, Value};
use tracing::debug;

use crate::config::UnknownFieldPolicy;
use crate::error::{DocnavError, Result};
use crate::text::normalize_slash_path;

const BOM: char = '\u{feff}';
const OPEN_DELIMITER: &str = "---";
const CLOSE_DELIMITERS: [&str; 2] = ["---", "..."];
const KNOWN_KEYS: [&str; 5] = ["title", "description", "published", "category", "tags"];

/// Validated document metadata. `title` is the only required key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub description: Option<String>,
    pub published: bool,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawFrontMatter {
    title: Option<Scalar>,
    description: Option<Scalar>,
    published: Option<bool>,
    category: Option<Scalar>,
    tags: Option<TagList>,
}

/// A YAML scalar read as text: `title: 1984` and `tags: [2024]` are strings here.
/// Sequences and mappings do not match any variant.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Flag(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Integer(value) => value.to_string(),
            Self::Unsigned(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Flag(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagList {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl TagList {
    fn into_tags(self) -> Vec<String> {
        let raw = match self {
            Self::One(tag) => vec![tag],
            Self::Many(tags) => tags,
        };
        let mut out: Vec<String> = Vec::with_capacity(raw.len());
        for tag in raw {
            let tag = tag.into_text();
            let tag = tag.trim();
            if tag.is_empty() || out.iter().any(|seen| seen == tag) {
                continue;
            }
            out.push(tag.to_string());
        }
        out
    }
}

/// Splits `raw` into the front matter block (without delimiters) and the body.
///
/// Returns `Ok(None)` when the text does not open with a `---` line.
pub(crate) fn split_front_matter<'a>(path: &str, raw: &'a str) -> Result<Option<(&'a str, &'a str)>> {
    let text = raw.strip_prefix(BOM).unwrap_or(raw);
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if first.trim_end() != OPEN_DELIMITER {
        return Ok(None);
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        let line_start = offset;
        offset += line.len();
        if CLOSE_DELIMITERS.contains(&line.trim_end()) {
            return Ok(Some((&text[block_start..line_start], &text[offset..])));
        }
    }
    Err(DocnavError::malformed(path, "front matter is not terminated"))
}

fn check_keys(path: &str, mapping: &Mapping, policy: UnknownFieldPolicy) -> Result<()> {
    for key in mapping.keys() {
        let name = match key {
            Value::String(name) => name.clone(),
            other => format!("{other:?}"),
        };
        if KNOWN_KEYS.contains(&name.as_str()) {
            continue;
        }
        match policy {
            UnknownFieldPolicy::Reject => {
                return Err(DocnavError::malformed(
                    path,
                    format!("unknown front matter key: {name}"),
                ));
            }
            UnknownFieldPolicy::Ignore => {
                debug!(path, key = %name, "ignoring unknown front matter key");
            }
        }
    }
    Ok(())
}

fn non_empty(value: Option<Scalar>) -> Option<String> {
    value
        .map(|value| value.into_text().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses a YAML block into validated metadata.
pub fn parse_front_matter(
    path: &str,
    block: &str,
    policy: UnknownFieldPolicy,
) -> Result<FrontMatter> {
    let value: Value = serde_norway::from_str(block)
        .map_err(|err| DocnavError::malformed(path, format!("invalid yaml: {err}")))?;
    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        _ => {
            return Err(DocnavError::malformed(
                path,
                "front matter must be a key-value mapping",
            ));
        }
    };
    check_keys(path, &mapping, policy)?;

    let raw: RawFrontMatter = serde_norway::from_value(Value::Mapping(mapping))
        .map_err(|err| DocnavError::malformed(path, err.to_string()))?;
    let title = non_empty(raw.title).ok_or_else(|| DocnavError::malformed(path, "missing title"))?;

    Ok(FrontMatter {
        title,
        description: non_empty(raw.description),
        published: raw.published.unwrap_or(true),
        category: raw
            .category
            .map(|category| normalize_slash_path(&category.into_text()))
            .filter(|category| !category.is_empty()),
        tags: raw.tags.map(TagList::into_tags).unwrap_or_default(),
    })
}

/// Front matter plus the body that follows it.
pub fn parse_document(
    path: &str,
    raw: &str,
    policy: UnknownFieldPolicy,
) -> Result<(FrontMatter, String)> {
    let Some((block, body)) = split_front_matter(path, raw)? else {
        return Err(DocnavError::malformed(path, "missing front matter (title is required)"));
    };
    let front_matter = parse_front_matter(path, block, policy)?;
    Ok((front_matter, body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_front_matter_and_body() {
        let raw = "---\ntitle: Snowflake setup\ndescription: How to connect\npublished: true\ncategory: /db/snowflake/\ntags: [db, snowflake]\n---\n# Intro\nbody\n";
        let (meta, body) =
            parse_document("db/setup", raw, UnknownFieldPolicy::Ignore).expect("parse");
        assert_eq!(meta.title, "Snowflake setup");
        assert_eq!(meta.description.as_deref(), Some("How to connect"));
        assert!(meta.published);
        assert_eq!(meta.category.as_deref(), Some("db/snowflake"));
        assert_eq!(meta.tags, vec!["db", "snowflake"]);
        assert_eq!(body, "# Intro\nbody\n");
    }

    #[test]
    fn defaults_apply_when_optional_keys_are_absent() {
        let (meta, body) = parse_document("a", "---\ntitle: Only title\n---\n", UnknownFieldPolicy::Ignore)
            .expect("parse");
        assert!(meta.published);
        assert!(meta.description.is_none());
        assert!(meta.category.is_none());
        assert!(meta.tags.is_empty());
        assert!(body.is_empty());
    }

    #[test]
    fn single_string_tag_and_duplicate_tags_are_normalized() {
        let one = parse_front_matter("a", "title: t\ntags: rust\n", UnknownFieldPolicy::Ignore)
            .expect("single tag");
        assert_eq!(one.tags, vec!["rust"]);

        let many = parse_front_matter(
            "a",
            "title: t\ntags: [' rust ', go, rust, '']\n",
            UnknownFieldPolicy::Ignore,
        )
        .expect("tag list");
        assert_eq!(many.tags, vec!["rust", "go"]);
    }

    #[test]
    fn published_false_is_kept() {
        let meta = parse_front_matter("a", "title: t\npublished: false\n", UnknownFieldPolicy::Ignore)
            .expect("parse");
        assert!(!meta.published);
    }

    #[test]
    fn missing_title_is_malformed() {
        let err = parse_front_matter("guides/x", "description: d\n", UnknownFieldPolicy::Ignore)
            .expect_err("title required");
        assert_eq!(err.code(), "MALFORMED_METADATA");
        assert!(err.to_string().contains("guides/x"));

        let err = parse_document("guides/y", "no front matter here\n", UnknownFieldPolicy::Ignore)
            .expect_err("front matter required");
        assert_eq!(err.code(), "MALFORMED_METADATA");
    }

    #[test]
    fn invalid_yaml_and_wrong_types_are_malformed() {
        let err = parse_front_matter("a", "title: [unclosed\n", UnknownFieldPolicy::Ignore)
            .expect_err("yaml error");
        assert_eq!(err.code(), "MALFORMED_METADATA");

        let err = parse_front_matter("a", "title: t\npublished: maybe\n", UnknownFieldPolicy::Ignore)
            .expect_err("type error");
        assert_eq!(err.code(), "MALFORMED_METADATA");

        let err = parse_front_matter("a", "- just\n- a list\n", UnknownFieldPolicy::Ignore)
            .expect_err("not a mapping");
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn numeric_and_boolean_scalars_become_text() {
        let meta = parse_front_matter(
            "books/1984",
            "title: 1984\ndescription: 2.5\ncategory: 2024\ntags: [2024, rust, true, 2024]\n",
            UnknownFieldPolicy::Ignore,
        )
        .expect("scalars");
        assert_eq!(meta.title, "1984");
        assert_eq!(meta.description.as_deref(), Some("2.5"));
        assert_eq!(meta.category.as_deref(), Some("2024"));
        assert_eq!(meta.tags, vec!["2024", "rust", "true"]);

        let single = parse_front_matter("a", "title: yes please\ntags: 7\n", UnknownFieldPolicy::Ignore)
            .expect("single numeric tag");
        assert_eq!(single.tags, vec!["7"]);
    }

    #[test]
    fn collections_are_rejected_where_text_is_expected() {
        let err = parse_front_matter("a", "title: [a, b]\n", UnknownFieldPolicy::Ignore)
            .expect_err("list title");
        assert_eq!(err.code(), "MALFORMED_METADATA");

        let err = parse_front_matter("a", "title: t\ntags: [[nested]]\n", UnknownFieldPolicy::Ignore)
            .expect_err("nested tag list");
        assert_eq!(err.code(), "MALFORMED_METADATA");

        let err = parse_front_matter("a", "title: t\ntags: {k: v}\n", UnknownFieldPolicy::Ignore)
            .expect_err("tag map");
        assert_eq!(err.code(), "MALFORMED_METADATA");
    }

    #[test]
    fn unknown_keys_follow_policy() {
        let block = "title: t\nlayout: wide\n";
        parse_front_matter("a", block, UnknownFieldPolicy::Ignore).expect("ignored");
        let err = parse_front_matter("a", block, UnknownFieldPolicy::Reject).expect_err("rejected");
        assert!(err.to_string().contains("layout"));
    }

    #[test]
    fn unterminated_block_is_malformed() {
        let err = parse_document("a", "---\ntitle: t\nbody\n", UnknownFieldPolicy::Ignore)
            .expect_err("unterminated");
        assert!(err.to_string().contains("not terminated"));
    }

    #[test]
    fn accepts_bom_crlf_and_dots_terminator() {
        let raw = "\u{feff}---\r\ntitle: t\r\n...\r\nbody\r\n";
        let (meta, body) = parse_document("a", raw, UnknownFieldPolicy::Ignore).expect("parse");
        assert_eq!(meta.title, "t");
        assert_eq!(body, "body\r\n");
    }
}
