//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One crawled page: its URL and the visible text extracted from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub text: String,
}

impl Document {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// A chunked, independently embeddable slice of a crawled document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// `id_<document sequence>_<chunk sequence>`, unique within one indexing run
    pub id: String,

    /// Text content
    pub text: String,

    /// URL of the page the fragment was cut from
    pub source_url: String,
}

impl Fragment {
    /// Build the fragment id for chunk `chunk_seq` of document `doc_seq`.
    pub fn make_id(doc_seq: usize, chunk_seq: usize) -> String {
        format!("id_{}_{}", doc_seq, chunk_seq)
    }
}

/// A query hit: the fragment and its cosine distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFragment {
    pub fragment: Fragment,

    /// Cosine distance; smaller is more similar
    pub distance: f32,
}

/// Statistics from an indexing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexReport {
    /// Fragments written to the collection
    pub fragment_count: usize,

    /// Documents read from the crawl snapshot
    pub document_count: usize,

    /// Fragments deleted from the previous generation
    pub removed_count: usize,

    /// Insert requests issued
    pub batches: usize,

    /// Duration in seconds
    pub duration_secs: f64,

    /// False when there was no crawl snapshot to index
    pub snapshot_available: bool,
}

/// Outcome of one crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub start_url: String,
    pub pages: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
