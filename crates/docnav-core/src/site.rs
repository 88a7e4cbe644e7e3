//! One complete build pass and the handle that publishes it.
//!
//! A [`Site`] is immutable once built. [`SiteHandle`] swaps whole sites, so a
//! reader sees either the previous snapshot or the next one, never a mix.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::{Level, info, warn};

use crate::category::CategoryTree;
use crate::config::CoreConfig;
use crate::error::{DocnavError, Result};
use crate::models::{
    Breadcrumb, Document, HeadingNode, LinkReport, TocEntry, WikiLinkReference,
};
use crate::repository::DocumentRepository;
use crate::search::SearchIndex;
use crate::toc::{flatten, table_of_contents};
use crate::wikilink::{find_links, resolve_links};

/// Everything a page needs for one document.
#[derive(Debug, Clone)]
pub struct Article {
    pub document: Arc<Document>,
    /// Heading tree pruned to the configured depth.
    pub toc: Vec<HeadingNode>,
    pub flat_toc: Vec<TocEntry>,
    pub links: Vec<WikiLinkReference>,
    /// Raw body with every `[[path]]` replaced by its annotation.
    pub linked_body: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    #[cfg(feature = "markdown-preview")]
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct Site {
    config: CoreConfig,
    repository: DocumentRepository,
    categories: CategoryTree,
    index: SearchIndex,
    known_paths: HashSet<String>,
}

impl Site {
    /// Reads the store and manifest once and derives every structure.
    pub fn build(config: &CoreConfig) -> Result<Self> {
        let start = Instant::now();
        let span = tracing::span!(
            Level::INFO,
            "site.build",
            root = %config.store.root.display()
        );
        let _guard = span.enter();

        match Self::build_inner(config) {
            Ok(site) => {
                let elapsed_micros = start.elapsed().as_micros();
                info!(
                    documents = site.repository.len(),
                    published = site.index.len(),
                    categories = site.categories.all_paths().len(),
                    tags = site.index.tag_stats().len(),
                    elapsed_micros,
                    "site_build_success"
                );
                Ok(site)
            }
            Err(err) => {
                let elapsed_micros = start.elapsed().as_micros();
                warn!(
                    code = err.code(),
                    error = %err,
                    elapsed_micros,
                    "site_build_failure"
                );
                Err(err)
            }
        }
    }

    fn build_inner(config: &CoreConfig) -> Result<Self> {
        config.validate()?;
        let repository = DocumentRepository::load(&config.store)?;
        let categories = CategoryTree::load(&config.store)?;
        Ok(Self::from_parts(config, repository, categories))
    }

    /// Assembles a site from parts that were loaded elsewhere.
    #[must_use]
    pub fn from_parts(
        config: &CoreConfig,
        repository: DocumentRepository,
        categories: CategoryTree,
    ) -> Self {
        let index = SearchIndex::from_repository(&repository, &config.search);
        let known_paths = repository.known_paths();
        Self {
            config: config.clone(),
            repository,
            categories,
            index,
            known_paths,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    #[must_use]
    pub fn repository(&self) -> &DocumentRepository {
        &self.repository
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryTree {
        &self.categories
    }

    #[must_use]
    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    #[must_use]
    pub fn known_paths(&self) -> &HashSet<String> {
        &self.known_paths
    }

    pub fn article(&self, path: &str) -> Result<Article> {
        let document = self.repository.get_document(path)?;
        let body = document.body.as_str();
        let route_prefix = self.config.links.route_prefix.as_str();

        let toc = table_of_contents(body, self.config.toc.max_depth);
        let flat_toc = flatten(&toc);
        let breadcrumbs = document
            .category
            .as_deref()
            .map(|category| self.categories.breadcrumbs(category))
            .unwrap_or_default();

        Ok(Article {
            links: find_links(body, &self.known_paths),
            linked_body: resolve_links(body, &self.known_paths, route_prefix),
            #[cfg(feature = "markdown-preview")]
            html: crate::render::render_article_html(body, &self.known_paths, route_prefix),
            toc,
            flat_toc,
            breadcrumbs,
            document,
        })
    }

    pub fn link_report(&self, path: &str) -> Result<LinkReport> {
        let document = self.repository.get_document(path)?;
        let references = find_links(&document.body, &self.known_paths);
        Ok(LinkReport::from_references(&document.path, &references))
    }

    /// Published documents with at least one unresolved reference, in feed order.
    #[must_use]
    pub fn dangling_links(&self) -> Vec<LinkReport> {
        self.repository
            .published()
            .map(|doc| {
                LinkReport::from_references(&doc.path, &find_links(&doc.body, &self.known_paths))
            })
            .filter(|report| !report.is_clean())
            .collect()
    }
}

/// Shared, swappable reference to the current [`Site`].
#[derive(Debug, Clone)]
pub struct SiteHandle {
    inner: Arc<RwLock<Arc<Site>>>,
}

impl SiteHandle {
    #[must_use]
    pub fn new(site: Site) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(site))),
        }
    }

    pub fn build(config: &CoreConfig) -> Result<Self> {
        Site::build(config).map(Self::new)
    }

    /// The snapshot visible right now. Callers keep it as long as they like.
    pub fn current(&self) -> Result<Arc<Site>> {
        let guard = self
            .inner
            .read()
            .map_err(|_| DocnavError::Internal("site lock poisoned".to_string()))?;
        Ok(Arc::clone(&guard))
    }

    /// Publishes `site` and returns the snapshot it replaced.
    pub fn replace(&self, site: Site) -> Result<Arc<Site>> {
        self.publish(Arc::new(site))
    }

    fn publish(&self, next: Arc<Site>) -> Result<Arc<Site>> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| DocnavError::Internal("site lock poisoned".to_string()))?;
        Ok(std::mem::replace(&mut *guard, next))
    }

    /// Builds a new site off-lock, publishes it only if the build succeeds and
    /// returns exactly the snapshot this call built.
    pub fn rebuild(&self, config: &CoreConfig) -> Result<Arc<Site>> {
        let built = Arc::new(Site::build(config)?);
        self.publish(Arc::clone(&built))?;
        Ok(built)
    }
}
