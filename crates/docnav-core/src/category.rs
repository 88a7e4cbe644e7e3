//! Category tree built from the JSON manifest at the store root.
//!
//! The manifest looks like
//! `{"categories": {"db": {"title": "...", "icon": "...", "subcategories": {...}}}}`
//! and declaration order is kept everywhere. Nodes own their children; the
//! flat path table next to the tree answers lookups without parent pointers.

use std::collections::HashMap;
use std::io;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{DocnavError, Result};
use crate::models::{Breadcrumb, CategoryNode};
use crate::repository::DocumentRepository;
use crate::text::normalize_slash_path;

/// `true` when `path` equals `ancestor` or is nested below it.
///
/// `db` contains `db/snowflake` but not `dbx`. An empty ancestor contains nothing.
#[must_use]
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return false;
    }
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Read-only structure a presentation layer needs to keep its own
/// expanded/collapsed/active state.
pub trait CategoryNavigation {
    fn contains_path(&self, path: &str) -> bool;
    fn child_paths(&self, path: &str) -> Vec<String>;
    /// Known ancestors of `path`, root first, excluding `path` itself.
    fn ancestor_paths(&self, path: &str) -> Vec<String>;
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    categories: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    title: Option<String>,
    description: Option<String>,
    icon: Option<String>,
    subcategories: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    roots: Vec<CategoryNode>,
    /// Path to child-index route from the roots.
    index: HashMap<String, Vec<usize>>,
}

impl CategoryTree {
    /// Reads `<root>/<manifest_file>`. An absent manifest is an empty tree.
    pub fn load(config: &StoreConfig) -> Result<Self> {
        let path = config.manifest_path();
        match std::fs::read_to_string(&path) {
            Ok(raw) => Self::from_json_str(&raw).map_err(|err| match err {
                DocnavError::MalformedManifest(reason) => {
                    DocnavError::MalformedManifest(format!("{}: {reason}", path.display()))
                }
                other => other,
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(manifest = %path.display(), "category manifest absent; empty tree");
                Ok(Self::default())
            }
            Err(err) => Err(DocnavError::store_unavailable(path, err)),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let manifest: ManifestFile = serde_json::from_str(raw)
            .map_err(|err| DocnavError::MalformedManifest(err.to_string()))?;
        let roots = build_level(manifest.categories, "")?;
        let mut index = HashMap::new();
        index_level(&roots, &mut Vec::new(), &mut index);
        Ok(Self { roots, index })
    }

    /// Root categories in manifest order, each fully populated.
    #[must_use]
    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    #[must_use]
    pub fn find(&self, path: &str) -> Option<&CategoryNode> {
        let route = self.index.get(&normalize_slash_path(path))?;
        let (first, rest) = route.split_first()?;
        let mut node = self.roots.get(*first)?;
        for idx in rest {
            node = node.children.get(*idx)?;
        }
        Some(node)
    }

    pub fn get_node(&self, path: &str) -> Result<&CategoryNode> {
        self.find(path)
            .ok_or_else(|| DocnavError::NotFound(format!("category {path}")))
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(&normalize_slash_path(path))
    }

    /// Direct children of `path`; unknown paths have none.
    #[must_use]
    pub fn children(&self, path: &str) -> &[CategoryNode] {
        self.find(path)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Root-to-node trail. Stops at the first segment the manifest does not know.
    #[must_use]
    pub fn breadcrumbs(&self, path: &str) -> Vec<Breadcrumb> {
        let path = normalize_slash_path(path);
        let mut out = Vec::new();
        let mut level = self.roots.as_slice();
        for segment in path.split('/') {
            let Some(node) = level.iter().find(|node| node.key == segment) else {
                break;
            };
            out.push(Breadcrumb {
                path: node.path.clone(),
                title: node.title.clone(),
                icon: node.icon.clone(),
            });
            level = &node.children;
        }
        out
    }

    /// Every category path in pre-order.
    #[must_use]
    pub fn all_paths(&self) -> Vec<String> {
        fn walk(nodes: &[CategoryNode], out: &mut Vec<String>) {
            for node in nodes {
                out.push(node.path.clone());
                walk(&node.children, out);
            }
        }
        let mut out = Vec::with_capacity(self.index.len());
        walk(&self.roots, &mut out);
        out
    }

    /// Published documents per category path, counting nested categories too.
    #[must_use]
    pub fn document_counts(&self, repository: &DocumentRepository) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> =
            self.index.keys().map(|path| (path.clone(), 0)).collect();
        for doc in repository.published() {
            let Some(category) = doc.category.as_deref() else {
                continue;
            };
            for (path, count) in &mut counts {
                if is_within(category, path) {
                    *count += 1;
                }
            }
        }
        counts
    }
}

impl CategoryNavigation for CategoryTree {
    fn contains_path(&self, path: &str) -> bool {
        self.contains(path)
    }

    fn child_paths(&self, path: &str) -> Vec<String> {
        self.children(path)
            .iter()
            .map(|node| node.path.clone())
            .collect()
    }

    fn ancestor_paths(&self, path: &str) -> Vec<String> {
        let path = normalize_slash_path(path);
        self.breadcrumbs(&path)
            .into_iter()
            .map(|crumb| crumb.path)
            .filter(|crumb| *crumb != path)
            .collect()
    }
}

fn build_level(entries: Map<String, Value>, parent: &str) -> Result<Vec<CategoryNode>> {
    let mut out = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        if key.trim().is_empty() || key.contains('/') {
            return Err(DocnavError::MalformedManifest(format!(
                "invalid category key {key:?} under {parent:?}"
            )));
        }
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}/{key}")
        };
        let entry: ManifestEntry = serde_json::from_value(value)
            .map_err(|err| DocnavError::MalformedManifest(format!("category {path}: {err}")))?;
        let children = match entry.subcategories {
            Some(subcategories) => build_level(subcategories, &path)?,
            None => Vec::new(),
        };
        out.push(CategoryNode {
            title: entry.title.unwrap_or_else(|| key.clone()),
            key,
            path,
            description: entry.description,
            icon: entry.icon,
            children,
        });
    }
    Ok(out)
}

fn index_level(nodes: &[CategoryNode], route: &mut Vec<usize>, index: &mut HashMap<String, Vec<usize>>) {
    for (idx, node) in nodes.iter().enumerate() {
        route.push(idx);
        index.insert(node.path.clone(), route.clone());
        index_level(&node.children, route, index);
        route.pop();
    }
}
