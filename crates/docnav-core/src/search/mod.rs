//! Weighted multi-field search over published documents.
//!
//! Fuzzy mode splits the query on whitespace. Each token is matched as an
//! approximate substring of every field and keeps its best weighted score; a
//! document matches only when every token matches some field. Scores are in
//! `[0, 1]`, lower is better, and `0.0` means an exact hit in the
//! highest-weighted field.

mod fuzzy;
mod highlight;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::models::{
    Document, FieldMatch, MatchMode, MatchSpan, SearchField, SearchHit, SearchOptions, TagStat,
};
use crate::repository::DocumentRepository;

use fuzzy::{FoldedText, best_window, fold, ratio, usize_to_f32};

pub use highlight::highlight;

const SUBSTRING_FIELDS: [SearchField; 3] =
    [SearchField::Title, SearchField::Description, SearchField::Tags];

#[derive(Debug, Clone)]
struct FieldText {
    field: SearchField,
    text: String,
    folded: FoldedText,
}

impl FieldText {
    fn new(field: SearchField, text: String) -> Self {
        let folded = FoldedText::new(&text);
        Self {
            field,
            text,
            folded,
        }
    }
}

/// Search-ready projection of one published document.
#[derive(Debug, Clone)]
pub struct SearchRecord {
    document: Arc<Document>,
    fields: [FieldText; 4],
}

impl SearchRecord {
    fn new(document: Arc<Document>) -> Self {
        let fields = SearchField::ALL.map(|field| {
            let text = match field {
                SearchField::Title => document.title.clone(),
                SearchField::Description => document.description.clone().unwrap_or_default(),
                SearchField::Tags => document.tags.join(" "),
                SearchField::Category => document.category.clone().unwrap_or_default(),
            };
            FieldText::new(field, text)
        });
        Self { document, fields }
    }

    #[must_use]
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// Field text as matched; tags are space-joined.
    #[must_use]
    pub fn text(&self, field: SearchField) -> &str {
        self.fields
            .iter()
            .find(|entry| entry.field == field)
            .map_or("", |entry| entry.text.as_str())
    }

    fn field_matches(&self, spans: [Vec<MatchSpan>; 4]) -> Vec<FieldMatch> {
        self.fields
            .iter()
            .zip(spans)
            .filter(|(_, spans)| !spans.is_empty())
            .map(|(entry, spans)| FieldMatch {
                field: entry.field,
                text: entry.text.clone(),
                spans: highlight::merge_spans(spans),
            })
            .collect()
    }
}

fn span_of(folded: &FoldedText, start: usize, end: usize) -> Option<MatchSpan> {
    folded
        .byte_range(start, end)
        .map(|range| MatchSpan {
            start: range.start,
            end: range.end,
        })
}

fn rank(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
}

/// Immutable index built once per pass. Records keep feed order (newest first),
/// which is also the tie-break for equal scores.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    records: Vec<SearchRecord>,
    tag_stats: Vec<TagStat>,
    config: SearchConfig,
}

impl SearchIndex {
    /// Unpublished documents are dropped here, so no query can return them.
    #[must_use]
    pub fn build(documents: impl IntoIterator<Item = Arc<Document>>, config: &SearchConfig) -> Self {
        let records: Vec<SearchRecord> = documents
            .into_iter()
            .filter(|doc| doc.published)
            .map(SearchRecord::new)
            .collect();
        let tag_stats = count_tags(&records);
        Self {
            records,
            tag_stats,
            config: config.clone(),
        }
    }

    #[must_use]
    pub fn from_repository(repository: &DocumentRepository, config: &SearchConfig) -> Self {
        Self::build(repository.published().cloned(), config)
    }

    #[must_use]
    pub fn records(&self) -> &[SearchRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fuzzy search, best hits first, at most `limit` of them.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        self.run(query, MatchMode::Fuzzy, limit)
    }

    /// Case-insensitive containment of the whole query in title, description
    /// or tags. Title hits rank first; otherwise feed order is kept.
    #[must_use]
    pub fn search_substring(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        self.run(query, MatchMode::Substring, limit)
    }

    #[must_use]
    pub fn search_with(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        let limit = options.limit.unwrap_or(self.config.default_limit);
        self.run(query, options.mode, limit)
    }

    fn run(&self, query: &str, mode: MatchMode, limit: usize) -> Vec<SearchHit> {
        let query = query.trim();
        if limit == 0 || query.chars().count() < self.config.min_query_chars {
            return Vec::new();
        }
        let mut hits = match mode {
            MatchMode::Fuzzy => self.fuzzy_hits(query),
            MatchMode::Substring => self.substring_hits(query),
        };
        rank(&mut hits);
        hits.truncate(limit);
        hits
    }

    fn fuzzy_hits(&self, query: &str) -> Vec<SearchHit> {
        let tokens: Vec<Vec<char>> = query.split_whitespace().map(fold).collect();
        if tokens.is_empty() {
            return Vec::new();
        }
        let weights = self.config.weights;
        let max_weight = weights.max();
        if max_weight <= 0.0 {
            return Vec::new();
        }

        let mut hits = Vec::new();
        'records: for record in &self.records {
            let mut spans: [Vec<MatchSpan>; 4] = Default::default();
            let mut total = 0.0f32;
            for token in &tokens {
                let mut best: Option<f32> = None;
                for (slot, entry) in record.fields.iter().enumerate() {
                    let weight = weights.get(entry.field);
                    if weight <= 0.0 || entry.folded.is_empty() {
                        continue;
                    }
                    let Some(window) = best_window(token, entry.folded.chars()) else {
                        continue;
                    };
                    let distance = ratio(&window, token.len());
                    if distance > self.config.threshold {
                        continue;
                    }
                    if let Some(span) = span_of(&entry.folded, window.range.start, window.range.end) {
                        spans[slot].push(span);
                    }
                    let weighted = 1.0 - (1.0 - distance) * (weight / max_weight);
                    best = Some(best.map_or(weighted, |current| current.min(weighted)));
                }
                let Some(score) = best else {
                    continue 'records;
                };
                total += score;
            }
            hits.push(SearchHit {
                document: Arc::clone(&record.document),
                score: total / usize_to_f32(tokens.len()),
                matches: record.field_matches(spans),
            });
        }
        hits
    }

    fn substring_hits(&self, query: &str) -> Vec<SearchHit> {
        let needle = fold(query);
        let mut hits = Vec::new();
        for record in &self.records {
            let mut spans: [Vec<MatchSpan>; 4] = Default::default();
            let mut in_title = false;
            for (slot, entry) in record.fields.iter().enumerate() {
                if !SUBSTRING_FIELDS.contains(&entry.field) {
                    continue;
                }
                for found in entry.folded.find_all(&needle) {
                    if let Some(span) = span_of(&entry.folded, found.start, found.end) {
                        spans[slot].push(span);
                        in_title |= entry.field == SearchField::Title;
                    }
                }
            }
            if spans.iter().all(Vec::is_empty) {
                continue;
            }
            hits.push(SearchHit {
                document: Arc::clone(&record.document),
                score: if in_title { 0.0 } else { 1.0 },
                matches: record.field_matches(spans),
            });
        }
        hits
    }

    /// Tag counts over published documents, most used first; ties keep the
    /// order in which tags were first seen in the feed.
    #[must_use]
    pub fn tag_stats(&self) -> &[TagStat] {
        &self.tag_stats
    }

    #[must_use]
    pub fn popular_tags(&self, limit: usize) -> Vec<TagStat> {
        self.tag_stats.iter().take(limit).cloned().collect()
    }

    #[must_use]
    pub fn by_tag(&self, tag: &str) -> Vec<Arc<Document>> {
        self.records
            .iter()
            .filter(|record| record.document.has_tag(tag))
            .map(|record| Arc::clone(&record.document))
            .collect()
    }

    #[must_use]
    pub fn by_category(&self, key: &str) -> Vec<Arc<Document>> {
        let key = crate::text::normalize_slash_path(key);
        self.records
            .iter()
            .filter(|record| record.document.in_category(&key))
            .map(|record| Arc::clone(&record.document))
            .collect()
    }
}

fn count_tags(records: &[SearchRecord]) -> Vec<TagStat> {
    let mut order: Vec<TagStat> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for tag in &record.document.tags {
            match slots.get(tag.as_str()) {
                Some(idx) => order[*idx].count += 1,
                None => {
                    slots.insert(tag.as_str(), order.len());
                    order.push(TagStat {
                        tag: tag.clone(),
                        count: 1,
                    });
                }
            }
        }
    }
    order.sort_by(|a, b| b.count.cmp(&a.count));
    order
}
