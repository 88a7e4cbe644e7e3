mod category;
mod document;
mod links;
mod search;
mod toc;

pub use category::{Breadcrumb, CategoryNode};
pub use document::{Document, SourceDocument};
pub use links::{LinkReport, WikiLinkReference};
pub use search::{FieldMatch, MatchMode, MatchSpan, SearchField, SearchHit, SearchOptions, TagStat};
pub use toc::{HeadingNode, TocEntry};
