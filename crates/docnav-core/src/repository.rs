use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{DocnavError, Result};
use crate::frontmatter::parse_document;
use crate::models::{Document, SourceDocument};
use crate::store::read_sources;
use crate::text::normalize_slash_path;

/// Every document of one build pass, newest first.
///
/// Listings only ever yield published documents. Direct lookup also sees
/// unpublished ones when `lookup_unpublished` is set.
#[derive(Debug, Clone, Default)]
pub struct DocumentRepository {
    documents: Vec<Arc<Document>>,
    by_path: HashMap<String, usize>,
    lookup_unpublished: bool,
}

impl DocumentRepository {
    pub fn load(config: &StoreConfig) -> Result<Self> {
        let sources = read_sources(config)?;
        Self::from_sources(sources, config)
    }

    /// Builds from already-read sources. Source order is the tie-break for
    /// equal publication timestamps.
    pub fn from_sources(sources: Vec<SourceDocument>, config: &StoreConfig) -> Result<Self> {
        let mut documents = Vec::with_capacity(sources.len());
        let mut seen = HashSet::with_capacity(sources.len());
        for source in sources {
            let path = normalize_slash_path(&source.path);
            if path.is_empty() {
                return Err(DocnavError::Validation(format!(
                    "document path must not be empty: {:?}",
                    source.path
                )));
            }
            if !seen.insert(path.clone()) {
                return Err(DocnavError::Validation(format!(
                    "duplicate document path: {path}"
                )));
            }

            let (meta, body) = parse_document(&path, &source.raw, config.unknown_fields)?;
            if !meta.published {
                debug!(path = %path, "document is unpublished");
            }
            documents.push(Arc::new(Document {
                path,
                title: meta.title,
                description: meta.description,
                published: meta.published,
                category: meta.category,
                tags: meta.tags,
                published_at: source.published_at,
                modified_at: source.modified_at,
                body,
            }));
        }

        documents.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        let by_path = documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| (doc.path.clone(), idx))
            .collect();

        Ok(Self {
            documents,
            by_path,
            lookup_unpublished: config.lookup_unpublished,
        })
    }

    /// Published documents, newest first.
    pub fn published(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.iter().filter(|doc| doc.published)
    }

    #[must_use]
    pub fn list_documents(&self) -> Vec<Arc<Document>> {
        self.published().cloned().collect()
    }

    pub fn get_document(&self, path: &str) -> Result<Arc<Document>> {
        let key = normalize_slash_path(path);
        self.by_path
            .get(&key)
            .map(|idx| &self.documents[*idx])
            .filter(|doc| doc.published || self.lookup_unpublished)
            .cloned()
            .ok_or_else(|| DocnavError::NotFound(path.to_string()))
    }

    /// Documents whose category equals `key` or sits below it.
    #[must_use]
    pub fn list_by_category(&self, key: &str) -> Vec<Arc<Document>> {
        let key = normalize_slash_path(key);
        self.published()
            .filter(|doc| doc.in_category(&key))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn list_by_tag(&self, tag: &str) -> Vec<Arc<Document>> {
        self.published()
            .filter(|doc| doc.has_tag(tag))
            .cloned()
            .collect()
    }

    /// Every path in the store, unpublished included, newest first.
    #[must_use]
    pub fn all_paths(&self) -> Vec<String> {
        self.documents.iter().map(|doc| doc.path.clone()).collect()
    }

    /// Paths a wikilink may resolve to.
    #[must_use]
    pub fn known_paths(&self) -> HashSet<String> {
        self.published().map(|doc| doc.path.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
