use std::borrow::Cow;

/// Where escaped text lands. Attribute values also need quotes escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HtmlContext {
    Text,
    Attribute,
}

const fn entity(ch: char, context: HtmlContext) -> Option<&'static str> {
    match (ch, context) {
        ('&', _) => Some("&amp;"),
        ('<', _) => Some("&lt;"),
        ('>', _) => Some("&gt;"),
        ('"', HtmlContext::Attribute) => Some("&quot;"),
        ('\'', HtmlContext::Attribute) => Some("&#39;"),
        _ => None,
    }
}

/// Borrows `text` untouched when nothing in it needs an entity.
fn escape(text: &str, context: HtmlContext) -> Cow<'_, str> {
    let Some(first) = text.find(|ch| entity(ch, context).is_some()) else {
        return Cow::Borrowed(text);
    };
    let mut out = String::with_capacity(text.len() + 16);
    out.push_str(&text[..first]);
    for ch in text[first..].chars() {
        match entity(ch, context) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}

#[must_use]
pub fn escape_html_text(text: &str) -> String {
    escape(text, HtmlContext::Text).into_owned()
}

#[must_use]
pub fn escape_html_attribute(text: &str) -> String {
    escape(text, HtmlContext::Attribute).into_owned()
}

/// Normalizes a slash-delimited path: trims whitespace and outer slashes,
/// drops empty segments.
#[must_use]
pub(crate) fn normalize_slash_path(raw: &str) -> String {
    raw.trim()
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
