//! Container markup and its anchor regions.
//!
//! A list renders as a container holding a top sentinel, the scrollable
//! content region and a bottom sentinel. The ids are handed back as values
//! so nothing ever has to look them up in an ambient document.

use crate::trigger::Edge;

pub const DEFAULT_CONTAINER_ID: &str = "container";
pub const DEFAULT_TOP_SENTINEL_ID: &str = "top-observer";
pub const DEFAULT_CONTENT_ID: &str = "virtual-list";
pub const DEFAULT_BOTTOM_SENTINEL_ID: &str = "bottom-observer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarkup {
    pub container_id: String,
    pub top_sentinel_id: String,
    pub content_id: String,
    pub bottom_sentinel_id: String,
}

impl Default for ListMarkup {
    fn default() -> Self {
        Self {
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            top_sentinel_id: DEFAULT_TOP_SENTINEL_ID.to_string(),
            content_id: DEFAULT_CONTENT_ID.to_string(),
            bottom_sentinel_id: DEFAULT_BOTTOM_SENTINEL_ID.to_string(),
        }
    }
}

impl ListMarkup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup with every id prefixed, for hosting several lists in one document.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            container_id: format!("{prefix}-{DEFAULT_CONTAINER_ID}"),
            top_sentinel_id: format!("{prefix}-{DEFAULT_TOP_SENTINEL_ID}"),
            content_id: format!("{prefix}-{DEFAULT_CONTENT_ID}"),
            bottom_sentinel_id: format!("{prefix}-{DEFAULT_BOTTOM_SENTINEL_ID}"),
        }
    }

    /// Sentinel ids in top, bottom order.
    pub fn sentinels(&self) -> [&str; 2] {
        [self.top_sentinel_id.as_str(), self.bottom_sentinel_id.as_str()]
    }

    /// Which edge a sentinel id belongs to, if any.
    pub fn edge_of(&self, target: &str) -> Option<Edge> {
        if target == self.top_sentinel_id {
            Some(Edge::Top)
        } else if target == self.bottom_sentinel_id {
            Some(Edge::Bottom)
        } else {
            None
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div id=\"{}\">\n  <div id=\"{}\"></div>\n  <div id=\"{}\"></div>\n  <div id=\"{}\"></div>\n</div>",
            self.container_id, self.top_sentinel_id, self.content_id, self.bottom_sentinel_id
        )
    }
}
