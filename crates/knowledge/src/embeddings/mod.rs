//! Embedding providers for fragments and questions.
//!
//! The same provider must embed both sides of a query, so one instance is
//! built from configuration and shared by the vector index.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{OllamaEmbeddingProvider, TrigramProvider};
