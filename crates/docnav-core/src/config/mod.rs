use std::path::Path;

use serde::Deserialize;

use crate::error::{DocnavError, Result};

mod env;
mod search;
mod store;

pub use search::{FieldWeights, SearchConfig};
pub use store::{StoreConfig, UnknownFieldPolicy};

const ENV_TOC_MAX_DEPTH: &str = "DOCNAV_TOC_MAX_DEPTH";
const ENV_LINK_ROUTE_PREFIX: &str = "DOCNAV_LINK_ROUTE_PREFIX";

const DEFAULT_TOC_MAX_DEPTH: u8 = 3;
const DEFAULT_ROUTE_PREFIX: &str = "/articles/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    pub max_depth: u8,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_TOC_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    pub route_prefix: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub store: StoreConfig,
    pub search: SearchConfig,
    pub toc: TocConfig,
    pub links: LinkConfig,
}

impl CoreConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Result<Self> {
        self.store.apply_env()?;
        self.search.apply_env();
        if let Some(depth) = env::read_env_usize(ENV_TOC_MAX_DEPTH) {
            self.toc.max_depth = u8::try_from(depth).map_err(|_| {
                DocnavError::Validation(format!("invalid {ENV_TOC_MAX_DEPTH}: {depth}"))
            })?;
        }
        if let Some(prefix) = env::read_non_empty_env(ENV_LINK_ROUTE_PREFIX) {
            self.links.route_prefix = prefix;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;
        self.search.validate()?;
        if !(1..=6).contains(&self.toc.max_depth) {
            return Err(DocnavError::Validation(format!(
                "toc.max_depth must be in 1..=6 (got {})",
                self.toc.max_depth
            )));
        }
        Ok(())
    }
}
