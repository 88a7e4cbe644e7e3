use serde::Deserialize;

use crate::error::{DocnavError, Result};
use crate::models::SearchField;

use super::env::{read_env_f32, read_env_usize};

const ENV_SEARCH_THRESHOLD: &str = "DOCNAV_SEARCH_THRESHOLD";
const ENV_SEARCH_DEFAULT_LIMIT: &str = "DOCNAV_SEARCH_DEFAULT_LIMIT";
const ENV_SEARCH_MIN_QUERY_CHARS: &str = "DOCNAV_SEARCH_MIN_QUERY_CHARS";

const DEFAULT_THRESHOLD: f32 = 0.3;
const DEFAULT_LIMIT: usize = 10;
const DEFAULT_MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldWeights {
    pub title: f32,
    pub description: f32,
    pub tags: f32,
    pub category: f32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 0.7,
            description: 0.5,
            tags: 0.3,
            category: 0.2,
        }
    }
}

impl FieldWeights {
    #[must_use]
    pub const fn get(&self, field: SearchField) -> f32 {
        match field {
            SearchField::Title => self.title,
            SearchField::Description => self.description,
            SearchField::Tags => self.tags,
            SearchField::Category => self.category,
        }
    }

    #[must_use]
    pub fn max(&self) -> f32 {
        self.title
            .max(self.description)
            .max(self.tags)
            .max(self.category)
    }

    fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("title", self.title),
            ("description", self.description),
            ("tags", self.tags),
            ("category", self.category),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DocnavError::Validation(format!(
                    "search.weights.{name} must be a finite value >= 0 (got {weight})"
                )));
            }
        }
        if self.max() <= 0.0 {
            return Err(DocnavError::Validation(
                "search.weights must give at least one field a positive weight".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Maximum tolerated edit distance per query token, as a fraction of the token length.
    pub threshold: f32,
    pub default_limit: usize,
    pub min_query_chars: usize,
    pub weights: FieldWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            default_limit: DEFAULT_LIMIT,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            weights: FieldWeights::default(),
        }
    }
}

impl SearchConfig {
    pub(super) fn apply_env(&mut self) {
        if let Some(threshold) = read_env_f32(ENV_SEARCH_THRESHOLD) {
            self.threshold = threshold;
        }
        if let Some(limit) = read_env_usize(ENV_SEARCH_DEFAULT_LIMIT) {
            self.default_limit = limit;
        }
        if let Some(min_chars) = read_env_usize(ENV_SEARCH_MIN_QUERY_CHARS) {
            self.min_query_chars = min_chars;
        }
    }

    pub(super) fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(DocnavError::Validation(format!(
                "search.threshold must be in [0.0, 1.0] (got {})",
                self.threshold
            )));
        }
        if self.min_query_chars < DEFAULT_MIN_QUERY_CHARS {
            return Err(DocnavError::Validation(format!(
                "search.min_query_chars must be >= {DEFAULT_MIN_QUERY_CHARS} (got {})",
                self.min_query_chars
            )));
        }
        if self.default_limit == 0 {
            return Err(DocnavError::Validation(
                "search.default_limit must be >= 1".to_string(),
            ));
        }
        self.weights.validate()
    }
}
