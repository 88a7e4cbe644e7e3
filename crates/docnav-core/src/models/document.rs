use chrono::{DateTime, Utc};
use serde::Serialize;

/// Raw document as read from a store, before front matter is parsed.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: String,
    pub raw: String,
    pub published_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub path: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(skip)]
    pub body: String,
}

impl Document {
    /// Equal to `key` or nested below it; `db` contains `db/snowflake` but not `dbx`.
    #[must_use]
    pub fn in_category(&self, key: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|category| crate::category::is_within(category, key))
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }
}
