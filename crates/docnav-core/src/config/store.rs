use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{DocnavError, Result};

use super::env::{read_env_bool, read_env_list, read_non_empty_env};

const ENV_CONTENT_ROOT: &str = "DOCNAV_CONTENT_ROOT";
const ENV_ENTRY_FILE: &str = "DOCNAV_ENTRY_FILE";
const ENV_MANIFEST_FILE: &str = "DOCNAV_MANIFEST_FILE";
const ENV_EXCLUDE_GLOBS: &str = "DOCNAV_EXCLUDE_GLOBS";
const ENV_LOOKUP_UNPUBLISHED: &str = "DOCNAV_LOOKUP_UNPUBLISHED";
const ENV_UNKNOWN_FIELDS: &str = "DOCNAV_UNKNOWN_FIELDS";

const DEFAULT_CONTENT_ROOT: &str = "articles";
const DEFAULT_ENTRY_FILE: &str = "index.md";
const DEFAULT_MANIFEST_FILE: &str = "categories.json";

/// What to do with front-matter keys the document schema does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    #[default]
    Ignore,
    Reject,
}

impl UnknownFieldPolicy {
    pub(crate) fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(DocnavError::Validation(format!(
                "invalid {ENV_UNKNOWN_FIELDS}: {other} (expected ignore|reject)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub entry_file: String,
    pub manifest_file: String,
    pub exclude_globs: Vec<String>,
    /// Direct path lookup may return unpublished documents; listings never do.
    pub lookup_unpublished: bool,
    pub unknown_fields: UnknownFieldPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_CONTENT_ROOT),
            entry_file: DEFAULT_ENTRY_FILE.to_string(),
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            exclude_globs: default_exclude_globs(),
            lookup_unpublished: true,
            unknown_fields: UnknownFieldPolicy::Ignore,
        }
    }
}

fn default_exclude_globs() -> Vec<String> {
    vec!["**/.git/**".to_string(), "**/node_modules/**".to_string()]
}

impl StoreConfig {
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest_file)
    }

    pub(super) fn apply_env(&mut self) -> Result<()> {
        if let Some(root) = read_non_empty_env(ENV_CONTENT_ROOT) {
            self.root = PathBuf::from(root);
        }
        if let Some(entry) = read_non_empty_env(ENV_ENTRY_FILE) {
            self.entry_file = entry;
        }
        if let Some(manifest) = read_non_empty_env(ENV_MANIFEST_FILE) {
            self.manifest_file = manifest;
        }
        if let Some(globs) = read_env_list(ENV_EXCLUDE_GLOBS) {
            self.exclude_globs = globs;
        }
        if let Some(flag) = read_env_bool(ENV_LOOKUP_UNPUBLISHED) {
            self.lookup_unpublished = flag;
        }
        if let Some(policy) = read_non_empty_env(ENV_UNKNOWN_FIELDS) {
            self.unknown_fields = UnknownFieldPolicy::parse(&policy)?;
        }
        Ok(())
    }

    pub(super) fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("store.entry_file", &self.entry_file),
            ("store.manifest_file", &self.manifest_file),
        ] {
            if value.trim().is_empty() {
                return Err(DocnavError::Validation(format!("{name} must not be empty")));
            }
            if value.contains('/') || value.contains('\\') {
                return Err(DocnavError::Validation(format!(
                    "{name} must be a bare file name: {value}"
                )));
            }
        }
        if self.entry_file == self.manifest_file {
            return Err(DocnavError::Validation(
                "store.entry_file and store.manifest_file must differ".to_string(),
            ));
        }
        Ok(())
    }
}
