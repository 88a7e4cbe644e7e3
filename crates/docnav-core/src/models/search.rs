use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Title,
    Description,
    Tags,
    Category,
}

impl SearchField {
    pub const ALL: [Self; 4] = [Self::Title, Self::Description, Self::Tags, Self::Category];
}

/// Byte range into the original field text; both ends sit on char boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    #[must_use]
    pub const fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMatch {
    pub field: SearchField,
    /// The field text the spans point into (tags are space-joined).
    pub text: String,
    pub spans: Vec<MatchSpan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub document: Arc<Document>,
    /// Lower is better; `0.0` is a perfect title match.
    pub score: f32,
    pub matches: Vec<FieldMatch>,
}

impl SearchHit {
    #[must_use]
    pub fn field(&self, field: SearchField) -> Option<&FieldMatch> {
        self.matches.iter().find(|entry| entry.field == field)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Fuzzy,
    Substring,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub mode: MatchMode,
    /// Falls back to the configured default limit when unset.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagStat {
    pub tag: String,
    pub count: usize,
}
