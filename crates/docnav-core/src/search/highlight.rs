use crate::models::MatchSpan;

/// Sorts spans and merges overlapping or touching ones.
pub(crate) fn merge_spans(mut spans: Vec<MatchSpan>) -> Vec<MatchSpan> {
    spans.retain(|span| span.start < span.end);
    spans.sort_by_key(|span| (span.start, span.end));
    let mut out: Vec<MatchSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match out.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => out.push(span),
        }
    }
    out
}

/// Wraps every span of `text` in `open` / `close`.
///
/// Spans that fall outside `text` or off a char boundary are skipped. Text is
/// copied verbatim; escape it first if the output is HTML.
#[must_use]
pub fn highlight(text: &str, spans: &[MatchSpan], open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * (open.len() + close.len()));
    let mut cursor = 0usize;
    for span in merge_spans(spans.to_vec()) {
        if span.start < cursor || text.get(span.range()).is_none() {
            continue;
        }
        out.push_str(&text[cursor..span.start]);
        out.push_str(open);
        out.push_str(&text[span.range()]);
        out.push_str(close);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}
