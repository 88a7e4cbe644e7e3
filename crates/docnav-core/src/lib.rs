// Public fallible APIs in this crate share one concrete error contract (`DocnavError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod category;
pub mod config;
pub mod error;
pub(crate) mod frontmatter;
pub mod heading;
pub mod models;
#[cfg(feature = "markdown-preview")]
pub mod render;
pub mod repository;
pub mod search;
pub mod site;
pub mod store;
pub(crate) mod text;
pub mod toc;
pub mod wikilink;

pub use category::{CategoryNavigation, CategoryTree};
pub use config::CoreConfig;
pub use error::{DocnavError, Result};
pub use frontmatter::{FrontMatter, parse_document, parse_front_matter};
pub use heading::{HeadingIdAllocator, generate_heading_id};
pub use repository::DocumentRepository;
pub use search::{SearchIndex, SearchRecord, highlight};
pub use site::{Article, Site, SiteHandle};
pub use text::{escape_html_attribute, escape_html_text};
pub use wikilink::{find_links, render_link, resolve_links};
