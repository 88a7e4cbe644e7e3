//! Table-of-contents extraction from raw markdown bodies.
//!
//! Headings are ATX lines (`#` to `######`, at most three spaces of indent,
//! then whitespace and text). Lines inside fenced code blocks and raw HTML
//! blocks are ignored. Headings nested in block quotes are not collected.
//! Ids come from [`HeadingIdAllocator`], so they are unique per document.
//!
//! The flat list ([`scan_headings`]) is the single source of truth; the tree
//! ([`build_toc`]) is always obtained by folding it, so the two views agree.

use crate::heading::HeadingIdAllocator;
use crate::models::{HeadingNode, TocEntry};

const MAX_LEVEL: usize = 6;

/// Tags that open an HTML block even in the middle of a paragraph.
const BLOCK_TAGS: [&str; 62] = [
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];
const VERBATIM_TAGS: [&str; 4] = ["pre", "script", "style", "textarea"];

/// How an open raw HTML block ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HtmlBlock {
    BlankLine,
    Marker(&'static str),
}

#[derive(Debug, Clone)]
pub(crate) struct ScannedHeading {
    /// Byte offset of the heading line within the body.
    pub(crate) line_start: usize,
    pub(crate) entry: TocEntry,
}

/// All headings in document order, ids already disambiguated.
#[must_use]
pub fn scan_headings(body: &str) -> Vec<TocEntry> {
    scan_headings_with_offsets(body)
        .into_iter()
        .map(|scanned| scanned.entry)
        .collect()
}

pub(crate) fn scan_headings_with_offsets(body: &str) -> Vec<ScannedHeading> {
    let mut ids = HeadingIdAllocator::new();
    let mut out = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    let mut html: Option<HtmlBlock> = None;
    let mut paragraph_open = false;
    let mut offset = 0usize;

    for raw_line in body.split_inclusive('\n') {
        let line_start = offset;
        offset += raw_line.len();
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let blank = line.trim().is_empty();

        if let Some(block) = html {
            html = match block {
                HtmlBlock::BlankLine if blank => None,
                HtmlBlock::Marker(end) if line.to_ascii_lowercase().contains(end) => None,
                open => Some(open),
            };
            continue;
        }
        if fence.is_none()
            && let Some(block) = html_block_start(line, !paragraph_open)
        {
            paragraph_open = false;
            let closes_here = match block {
                HtmlBlock::BlankLine => false,
                HtmlBlock::Marker(end) => line.to_ascii_lowercase().contains(end),
            };
            if !closes_here {
                html = Some(block);
            }
            continue;
        }

        if let Some(marker) = fence_marker(line) {
            paragraph_open = false;
            fence = match fence {
                None => Some(marker),
                Some((ch, len)) if ch == marker.0 && marker.1 >= len => None,
                open => open,
            };
            continue;
        }
        if fence.is_some() {
            continue;
        }

        let Some((level, title)) = parse_atx_heading(line) else {
            paragraph_open = !blank;
            continue;
        };
        paragraph_open = false;
        let id = ids.allocate(title);
        out.push(ScannedHeading {
            line_start,
            entry: TocEntry {
                level,
                title: title.to_string(),
                id,
            },
        });
    }
    out
}

fn leading_indent(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    (indent <= 3).then(|| &line[indent..])
}

fn fence_marker(line: &str) -> Option<(char, usize)> {
    let rest = leading_indent(line)?;
    let ch = rest.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let len = rest.chars().take_while(|c| *c == ch).count();
    (len >= 3).then_some((ch, len))
}

fn tag_name_ends(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with([' ', '\t', '>']) || rest.starts_with("/>")
}

/// Start of a raw HTML block. Generic tags cannot interrupt a paragraph.
fn html_block_start(line: &str, outside_paragraph: bool) -> Option<HtmlBlock> {
    let rest = leading_indent(line)?;
    if !rest.starts_with('<') {
        return None;
    }
    let lower = rest.to_ascii_lowercase();
    if lower.starts_with("<!--") {
        return Some(HtmlBlock::Marker("-->"));
    }
    if lower.starts_with("<![cdata[") {
        return Some(HtmlBlock::Marker("]]>"));
    }
    if lower.starts_with("<?") {
        return Some(HtmlBlock::Marker("?>"));
    }
    if lower
        .strip_prefix("<!")
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_alphabetic()))
    {
        return Some(HtmlBlock::Marker(">"));
    }
    for (tag, end) in VERBATIM_TAGS
        .iter()
        .zip(["</pre>", "</script>", "</style>", "</textarea>"])
    {
        if lower[1..].strip_prefix(tag).is_some_and(tag_name_ends) {
            return Some(HtmlBlock::Marker(end));
        }
    }

    let name_start = if lower.starts_with("</") { 2 } else { 1 };
    let name: String = lower[name_start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let after_name = &lower[name_start + name.len()..];
    if BLOCK_TAGS.contains(&name.as_str()) && tag_name_ends(after_name) {
        return Some(HtmlBlock::BlankLine);
    }
    // A generic tag must stand alone on its line.
    let trimmed = rest.trim_end();
    let lone_tag = trimmed.find('>') == Some(trimmed.len() - 1);
    (outside_paragraph && lone_tag).then_some(HtmlBlock::BlankLine)
}

fn parse_atx_heading(line: &str) -> Option<(u8, &str)> {
    let rest = leading_indent(line)?;
    let level = rest.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > MAX_LEVEL {
        return None;
    }
    let after = &rest[level..];
    if !after.starts_with([' ', '\t']) {
        return None;
    }
    let mut title = after.trim();
    let closed = title.trim_end_matches('#');
    if closed.len() != title.len() && (closed.is_empty() || closed.ends_with([' ', '\t'])) {
        title = closed.trim_end();
    }
    if title.is_empty() {
        return None;
    }
    u8::try_from(level).ok().map(|level| (level, title))
}

/// Nests a flat heading list: each heading becomes the last child of the
/// nearest preceding heading with a strictly smaller level.
#[must_use]
pub fn fold(entries: impl IntoIterator<Item = TocEntry>) -> Vec<HeadingNode> {
    let mut root = HeadingNode {
        level: 0,
        title: String::new(),
        id: String::new(),
        children: Vec::new(),
    };
    let mut stack: Vec<HeadingNode> = Vec::new();

    for entry in entries {
        while stack.last().is_some_and(|top| top.level >= entry.level) {
            close_top(&mut stack, &mut root);
        }
        stack.push(HeadingNode::from(entry));
    }
    while !stack.is_empty() {
        close_top(&mut stack, &mut root);
    }
    root.children
}

fn close_top(stack: &mut Vec<HeadingNode>, root: &mut HeadingNode) {
    let Some(node) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.children.push(node),
    }
}

/// Pre-order traversal back to document order.
#[must_use]
pub fn flatten(tree: &[HeadingNode]) -> Vec<TocEntry> {
    fn walk(nodes: &[HeadingNode], out: &mut Vec<TocEntry>) {
        for node in nodes {
            out.push(TocEntry::from(node));
            walk(&node.children, out);
        }
    }
    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}

/// Full heading tree of a body.
#[must_use]
pub fn build_toc(body: &str) -> Vec<HeadingNode> {
    fold(scan_headings(body))
}

/// Drops every node deeper than `max_depth`, together with its subtree.
#[must_use]
pub fn filter_depth(tree: &[HeadingNode], max_depth: u8) -> Vec<HeadingNode> {
    tree.iter()
        .filter(|node| node.level <= max_depth)
        .map(|node| HeadingNode {
            level: node.level,
            title: node.title.clone(),
            id: node.id.clone(),
            children: filter_depth(&node.children, max_depth),
        })
        .collect()
}

/// Display tree: the full tree is built first, then pruned to `max_depth`.
#[must_use]
pub fn table_of_contents(body: &str, max_depth: u8) -> Vec<HeadingNode> {
    filter_depth(&build_toc(body), max_depth.clamp(1, 6))
}

/// Display list in document order, derived from the same scan as the tree.
#[must_use]
pub fn flat_table_of_contents(body: &str, max_depth: u8) -> Vec<TocEntry> {
    flatten(&table_of_contents(body, max_depth))
}
