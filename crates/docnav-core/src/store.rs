//! Filesystem document store: `<root>/<path>/<entry_file>` files become
//! [`SourceDocument`]s.

use std::fs;
use std::io;
use std::path::{Component, Path};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::StoreConfig;
use crate::error::{DocnavError, Result};
use crate::models::SourceDocument;

pub(crate) fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| DocnavError::Validation(format!("invalid exclude glob {pattern}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| DocnavError::Validation(e.to_string()))
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_excluded(root: &Path, entry: &DirEntry, entry_file: &str, excludes: &GlobSet) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let rel = relative_slash_path(root, entry.path());
    if excludes.is_match(&rel) {
        return true;
    }
    // A directory is pruned when its own entry file would be excluded.
    entry.file_type().is_dir() && excludes.is_match(format!("{rel}/{entry_file}"))
}

/// Sorting sees entries before links are resolved, so a linked directory is
/// checked through the link.
fn sorts_as_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

/// Symlinks are followed; one that points back at an ancestor or at nothing is
/// skipped rather than failing the walk.
fn is_skippable_link(err: &walkdir::Error) -> bool {
    err.loop_ancestor().is_some()
        || err
            .io_error()
            .is_some_and(|io_err| io_err.kind() == io::ErrorKind::NotFound)
}

fn timestamps(meta: &fs::Metadata) -> (DateTime<Utc>, DateTime<Utc>) {
    let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    let created = meta.created().unwrap_or(modified);
    (DateTime::<Utc>::from(created), DateTime::<Utc>::from(modified))
}

fn read_entry(path: &Path, doc_path: &str) -> Result<SourceDocument> {
    let raw = fs::read_to_string(path).map_err(|err| {
        if err.kind() == io::ErrorKind::InvalidData {
            DocnavError::malformed(doc_path, "document is not valid UTF-8")
        } else {
            DocnavError::store_unavailable(path, err)
        }
    })?;
    let meta = fs::metadata(path).map_err(|err| DocnavError::store_unavailable(path, err))?;
    let (published_at, modified_at) = timestamps(&meta);
    Ok(SourceDocument {
        path: doc_path.to_string(),
        raw,
        published_at,
        modified_at,
    })
}

/// Walks the store root and reads every entry file. Within a directory, files
/// come before subdirectories and both are in file-name order. Symlinked
/// article directories are followed.
///
/// An absent root yields no documents. A root that exists but cannot be
/// listed fails with [`DocnavError::StoreUnavailable`].
pub fn read_sources(config: &StoreConfig) -> Result<Vec<SourceDocument>> {
    let root = config.root.as_path();
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DocnavError::store_unavailable(
                root,
                io::Error::other("store root is not a directory"),
            ));
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(root = %root.display(), "store root absent; no documents");
            return Ok(Vec::new());
        }
        Err(err) => return Err(DocnavError::store_unavailable(root, err)),
    }
    fs::read_dir(root).map_err(|err| DocnavError::store_unavailable(root, err))?;

    let excludes = build_globset(&config.exclude_globs)?;
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by(|a, b| {
            sorts_as_dir(a)
                .cmp(&sorts_as_dir(b))
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(|entry| {
            let excluded = is_excluded(root, entry, &config.entry_file, &excludes);
            if excluded {
                debug!(path = %entry.path().display(), "excluded from store walk");
            }
            !excluded
        });

    let mut out = Vec::new();
    for item in walker {
        let item = match item {
            Ok(item) => item,
            Err(err) if is_skippable_link(&err) => {
                debug!(
                    path = %err.path().unwrap_or(root).display(),
                    error = %err,
                    "skipping looping or dangling symlink"
                );
                continue;
            }
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                return Err(DocnavError::store_unavailable(path, io::Error::from(err)));
            }
        };
        if !item.file_type().is_file() || item.file_name() != config.entry_file.as_str() {
            continue;
        }
        let Some(dir) = item.path().parent() else {
            continue;
        };
        let doc_path = relative_slash_path(root, dir);
        if doc_path.is_empty() {
            debug!(file = %item.path().display(), "skipping entry file at store root");
            continue;
        }
        out.push(read_entry(item.path(), &doc_path)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, text).expect("write");
    }

    #[test]
    fn absent_root_yields_no_documents() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = StoreConfig::with_root(temp.path().join("missing"));
        assert!(read_sources(&config).expect("read").is_empty());
    }

    #[test]
    fn root_that_is_a_file_is_unavailable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("articles");
        fs::write(&file, "x").expect("write");
        let err = read_sources(&StoreConfig::with_root(&file)).expect_err("not a dir");
        assert_eq!(err.code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn finds_entry_files_in_nested_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        write(root, "index.md", "root");
        write(root, "categories.json", "{}");
        write(root, "b/index.md", "b");
        write(root, "a/index.md", "a");
        write(root, "a/deep/er/index.md", "deep");
        write(root, "a/notes.md", "not an entry");
        write(root, "empty/readme.txt", "no entry");

        let sources = read_sources(&StoreConfig::with_root(root)).expect("read");
        let paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "a/deep/er", "b"]);
        assert_eq!(sources[0].raw, "a");
    }

    #[test]
    fn exclude_globs_prune_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        write(root, "keep/index.md", "k");
        write(root, "node_modules/pkg/index.md", "x");
        write(root, "drafts/wip/index.md", "x");

        let mut config = StoreConfig::with_root(root);
        config.exclude_globs.push("drafts/**".to_string());
        let sources = read_sources(&config).expect("read");
        let paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["keep"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_followed_and_loops_skipped() {
        use std::os::unix::fs::symlink;

        let store = tempfile::tempdir().expect("store");
        let shared = tempfile::tempdir().expect("shared");
        write(store.path(), "a/index.md", "a");
        write(shared.path(), "guide/index.md", "guide");
        symlink(shared.path().join("guide"), store.path().join("linked")).expect("dir link");
        symlink(store.path().join("a"), store.path().join("a/back")).expect("loop link");
        symlink(store.path().join("gone"), store.path().join("dangling")).expect("dangling link");

        let sources = read_sources(&StoreConfig::with_root(store.path())).expect("read");
        let paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "linked"]);
        assert_eq!(sources[1].raw, "guide");
    }

    #[test]
    fn invalid_glob_is_a_validation_error() {
        let err = build_globset(&["a/[".to_string()]).expect_err("bad glob");
        assert_eq!(err.code(), "VALIDATION_FAILED");
    }
}
