use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingNode {
    pub level: u8,
    pub title: String,
    pub id: String,
    pub children: Vec<HeadingNode>,
}

/// One heading in document order, without nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: u8,
    pub title: String,
    pub id: String,
}

impl From<&HeadingNode> for TocEntry {
    fn from(node: &HeadingNode) -> Self {
        Self {
            level: node.level,
            title: node.title.clone(),
            id: node.id.clone(),
        }
    }
}

impl From<TocEntry> for HeadingNode {
    fn from(entry: TocEntry) -> Self {
        Self {
            level: entry.level,
            title: entry.title,
            id: entry.id,
            children: Vec::new(),
        }
    }
}
