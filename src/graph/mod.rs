//! Read-side queries over the stored link graphs.
//!
//! Document→document edges come from `links_docs_docs`, document→date edges
//! from `links_docs_dates`. Documents are addressed by relative path.

mod queries;
mod traversal;

pub use queries::{backlinks, document_entries, documents_for_date, outgoing_links};
pub use traversal::traverse_links;

use serde::{Deserialize, Serialize};

/// One document→document edge found during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEdge {
    /// Relative path of the linking document.
    pub from_path: String,
    /// Relative path of the linked document.
    pub to_path: String,
    /// Hop count from the start document, starting at 1.
    pub depth: usize,
}

/// An entry as stored, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub id: i64,
    pub heading: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
}
