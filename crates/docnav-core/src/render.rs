use std::collections::{HashMap, HashSet};

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::toc::scan_headings_with_offsets;
use crate::wikilink::{render_link, scan_links, to_reference};

#[derive(Debug, Clone, Copy)]
struct LinkContext<'a> {
    known_paths: &'a HashSet<String>,
    route_prefix: &'a str,
}

/// Markdown to HTML with raw HTML neutralised, unsafe URLs dropped and
/// heading ids matching the table of contents.
#[must_use]
pub fn render_markdown_html(content: &str) -> String {
    render(content, None)
}

/// Like [`render_markdown_html`], with `[[path]]` references outside code and
/// links turned into wikilink annotations.
#[must_use]
pub fn render_article_html(
    content: &str,
    known_paths: &HashSet<String>,
    route_prefix: &str,
) -> String {
    render(
        content,
        Some(LinkContext {
            known_paths,
            route_prefix,
        }),
    )
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

fn render(content: &str, links: Option<LinkContext<'_>>) -> String {
    let heading_ids: HashMap<usize, String> = scan_headings_with_offsets(content)
        .into_iter()
        .map(|scanned| (scanned.line_start, scanned.entry.id))
        .collect();

    let mut events: Vec<Event<'_>> = Vec::new();
    let mut pending = String::new();
    let mut verbatim_depth = 0usize;

    for (event, range) in Parser::new_ext(content, options()).into_offset_iter() {
        let event = sanitize(event);
        if let Event::Text(text) = &event
            && verbatim_depth == 0
        {
            pending.push_str(text);
            continue;
        }
        flush_text(&mut pending, links, &mut events);

        let event = match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let line_start = content[..range.start].rfind('\n').map_or(0, |idx| idx + 1);
                let id = heading_ids
                    .get(&line_start)
                    .map(|id| CowStr::from(id.clone()))
                    .or(id);
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                })
            }
            other => other,
        };
        match &event {
            Event::Start(Tag::CodeBlock(_) | Tag::Link { .. } | Tag::Image { .. }) => {
                verbatim_depth += 1;
            }
            Event::End(TagEnd::CodeBlock | TagEnd::Link | TagEnd::Image) => {
                verbatim_depth = verbatim_depth.saturating_sub(1);
            }
            _ => {}
        }
        events.push(event);
    }
    flush_text(&mut pending, links, &mut events);

    let mut output = String::new();
    html::push_html(&mut output, events.into_iter());
    output
}

fn flush_text(pending: &mut String, links: Option<LinkContext<'_>>, out: &mut Vec<Event<'_>>) {
    if pending.is_empty() {
        return;
    }
    let text = std::mem::take(pending);
    let Some(links) = links else {
        out.push(Event::Text(CowStr::from(text)));
        return;
    };

    let mut last = 0usize;
    for raw in scan_links(&text) {
        if raw.range.start > last {
            out.push(Event::Text(CowStr::from(text[last..raw.range.start].to_string())));
        }
        let reference = to_reference(&raw, links.known_paths);
        out.push(Event::InlineHtml(CowStr::from(render_link(
            &reference,
            links.route_prefix,
        ))));
        last = raw.range.end;
    }
    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Raw HTML is shown as text; link and image targets with a disallowed scheme
/// are replaced.
fn sanitize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: clean_destination(dest_url, true, "#"),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: clean_destination(dest_url, false, ""),
            title,
            id,
        }),
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    }
}

fn clean_destination<'a>(
    dest_url: CowStr<'a>,
    allow_mailto: bool,
    fallback: &'static str,
) -> CowStr<'a> {
    if destination_allowed(&dest_url, allow_mailto) {
        dest_url
    } else {
        CowStr::Borrowed(fallback)
    }
}

/// Lowercased scheme of an absolute URL, if the value has one.
fn url_scheme(value: &str) -> Option<String> {
    let end = value.find([':', '/', '?', '#'])?;
    (end > 0 && value[end..].starts_with(':')).then(|| value[..end].to_ascii_lowercase())
}

fn destination_allowed(value: &str, allow_mailto: bool) -> bool {
    let value = value.trim();
    // Protocol-relative URLs leave the site.
    if value.starts_with("//") {
        return false;
    }
    match url_scheme(value).as_deref() {
        None | Some("http" | "https") => true,
        Some("mailto") => allow_mailto,
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn render_markdown_html_strips_raw_html() {
        let rendered = render_markdown_html("Hello<script>alert(1)</script>");
        assert!(!rendered.contains("<script>"));
        assert!(rendered.contains("alert(1)"));
    }

    #[test]
    fn render_markdown_html_sanitizes_javascript_links() {
        let rendered = render_markdown_html("[bad](javascript:alert(1))");
        assert!(rendered.contains("href=\"#\""));
        assert!(!rendered.contains("javascript:"));
    }

    #[test]
    fn render_markdown_html_preserves_safe_links() {
        let rendered = render_markdown_html("[ok](https://example.com)");
        assert!(rendered.contains("href=\"https://example.com\""));
    }

    #[test]
    fn destinations_are_checked_by_scheme() {
        assert!(destination_allowed("", true));
        assert!(destination_allowed("/articles/db/intro", true));
        assert!(destination_allowed("../sibling#setup", true));
        assert!(destination_allowed("HTTPS://example.com", false));
        assert!(destination_allowed("mailto:team@example.com", true));
        assert!(!destination_allowed("mailto:team@example.com", false));
        assert!(!destination_allowed(" JavaScript:alert(1)", true));
        assert!(!destination_allowed("data:image/png;base64,AAAA", false));
        assert!(!destination_allowed("//evil.example/x.png", false));
    }

    #[test]
    fn unsafe_image_sources_are_emptied() {
        let rendered = render_markdown_html("![x](data:text/html;base64,AAAA)");
        assert!(rendered.contains("src=\"\""));
        assert!(!rendered.contains("data:"));
    }

    #[test]
    fn toc_ids_all_land_when_html_blocks_are_present() {
        let body = "<div>\n# Inside html\n</div>\n\n# Real\n\n> # Quoted\n\n## Setup\n";
        let rendered = render_markdown_html(body);
        for entry in crate::toc::scan_headings(body) {
            assert!(rendered.contains(&format!("id=\"{}\"", entry.id)), "{}", entry.id);
        }
        assert!(!rendered.contains("id=\"inside-html\""));
    }

    #[test]
    fn heading_ids_match_toc_ids() {
        let rendered = render_markdown_html("# Intro\n\n## Setup\n\n## Setup\n\n## データベース設計\n");
        assert!(rendered.contains("<h1 id=\"intro\">Intro</h1>"));
        assert!(rendered.contains("<h2 id=\"setup\">Setup</h2>"));
        assert!(rendered.contains("<h2 id=\"setup-1\">Setup</h2>"));
        assert!(rendered.contains("<h2 id=\"データベース設計\">"));
    }

    #[test]
    fn fenced_code_does_not_shift_heading_ids() {
        let rendered = render_markdown_html("```\n# not a heading\n```\n\n# Real\n");
        assert!(rendered.contains("<h1 id=\"real\">Real</h1>"));
        assert!(rendered.contains("# not a heading"));
    }

    #[test]
    fn wikilinks_become_annotations() {
        let rendered = render_article_html(
            "see [[x/y]] and [[x/z]]",
            &known(&["x/y"]),
            "/articles/",
        );
        assert!(rendered.contains(
            r#"<a href="/articles/x/y" class="wiki-link wiki-link-exists" title="x/y">x/y</a>"#
        ));
        assert!(rendered.contains(
            r#"<span class="wiki-link wiki-link-missing" title="missing: x/z">x/z</span>"#
        ));
        assert!(rendered.starts_with("<p>see "));
    }

    #[test]
    fn wikilinks_in_code_are_left_alone() {
        let rendered = render_article_html(
            "`[[x/y]]`\n\n```\n[[x/y]]\n```\n",
            &known(&["x/y"]),
            "/articles/",
        );
        assert!(!rendered.contains("wiki-link"));
        assert!(rendered.contains("<code>[[x/y]]</code>"));
    }

    #[test]
    fn text_around_wikilinks_is_still_escaped() {
        let rendered = render_article_html("a < b [[x/y]] <i>", &known(&["x/y"]), "/");
        assert!(rendered.contains("a &lt; b <a href=\"/x/y\""));
        assert!(!rendered.contains("<i>"));
    }

    #[test]
    fn plain_render_keeps_wikilink_text() {
        let rendered = render_markdown_html("see [[x/y]]");
        assert!(rendered.contains("[[x/y]]"));
        assert!(!rendered.contains("wiki-link"));
    }
}
