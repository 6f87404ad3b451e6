//! Website knowledge: crawling, indexing and grounded question answering.
//!
//! The indexing pipeline turns the crawl snapshot into a fully replaced
//! vector collection; the QA engine answers questions from it.

pub mod chunker;
pub mod crawl;
pub mod embeddings;
pub mod html;
pub mod indexer;
pub mod lancedb_index;
pub mod memory_index;
pub mod progress;
pub mod rag;
pub mod services;
pub mod snapshot;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use crawl::{spawn_crawl, CrawlRequest, SiteCrawler};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use indexer::Indexer;
pub use lancedb_index::LanceDbIndex;
pub use memory_index::MemoryIndex;
pub use progress::{Phase, ProgressCallback, ProgressEvent, ProgressReporter};
pub use rag::{AnswerRecord, GroundedAnswer, QaEngine, Source, Timings};
pub use services::Services;
pub use snapshot::CrawlSnapshot;
pub use types::{CrawlReport, Document, Fragment, IndexReport, ScoredFragment};
pub use vector_index::VectorIndex;
