//! In-process vector index.
//!
//! Backs the CLI's `--ephemeral` mode and the test suite. Fragments live in a
//! `Vec` in insertion order and queries are brute-force cosine scans.

use crate::embeddings::EmbeddingProvider;
use crate::types::{Fragment, ScoredFragment};
use crate::vector_index::{cosine_distance, rank, VectorIndex};
use siteqa_core::{AppError, AppResult};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Entry {
    fragment: Fragment,
    embedding: Vec<f32>,
}

/// Vector index held entirely in memory.
pub struct MemoryIndex {
    name: String,
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<Entry>>,
}

impl MemoryIndex {
    pub fn new(name: impl Into<String>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            name: name.into(),
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl VectorIndex for MemoryIndex {
    fn collection_name(&self) -> &str {
        &self.name
    }

    async fn add(&self, fragments: &[Fragment]) -> AppResult<()> {
        if fragments.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = fragments.iter().map(|f| f.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != fragments.len() {
            return Err(AppError::UpstreamUnavailable(format!(
                "Embedding provider returned {} vectors for {} fragments",
                embeddings.len(),
                fragments.len()
            )));
        }

        let mut entries = self.entries.write().await;
        for (fragment, embedding) in fragments.iter().zip(embeddings) {
            // Re-adding an id replaces the stored fragment in place
            match entries.iter_mut().find(|e| e.fragment.id == fragment.id) {
                Some(existing) => {
                    existing.fragment = fragment.clone();
                    existing.embedding = embedding;
                }
                None => entries.push(Entry {
                    fragment: fragment.clone(),
                    embedding,
                }),
            }
        }

        tracing::debug!("Added {} fragments to '{}'", fragments.len(), self.name);
        Ok(())
    }

    async fn get_all_ids(&self) -> AppResult<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().map(|e| e.fragment.id.clone()).collect())
    }

    async fn delete(&self, ids: &[String]) -> AppResult<()> {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut entries = self.entries.write().await;
        entries.retain(|e| !doomed.contains(e.fragment.id.as_str()));
        Ok(())
    }

    async fn query(&self, text: &str, top_k: usize) -> AppResult<Vec<ScoredFragment>> {
        let query_embedding = self.embedder.embed(text).await?;

        let entries = self.entries.read().await;
        let mut hits: Vec<ScoredFragment> = entries
            .iter()
            .map(|e| ScoredFragment {
                fragment: e.fragment.clone(),
                distance: cosine_distance(&query_embedding, &e.embedding),
            })
            .collect();
        drop(entries);

        rank(&mut hits, top_k);
        Ok(hits)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::TrigramProvider;

    fn fragment(id: &str, text: &str, url: &str) -> Fragment {
        Fragment {
            id: id.to_string(),
            text: text.to_string(),
            source_url: url.to_string(),
        }
    }

    fn index() -> MemoryIndex {
        MemoryIndex::new("website_content", Arc::new(TrigramProvider::new(384)))
    }

    #[tokio::test]
    async fn test_add_count_and_ids() {
        let index = index();
        index
            .add(&[
                fragment("id_0_0", "Alpha library docs about widgets.", "https://a.test/1"),
                fragment("id_1_0", "Beta pricing page lists plans.", "https://a.test/2"),
            ])
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 2);
        assert_eq!(index.get_all_ids().await.unwrap(), vec!["id_0_0", "id_1_0"]);
        assert_eq!(index.collection_name(), "website_content");
    }

    #[tokio::test]
    async fn test_delete_ignores_unknown_ids() {
        let index = index();
        index
            .add(&[
                fragment("id_0_0", "Alpha", "https://a.test/1"),
                fragment("id_0_1", "Beta", "https://a.test/1"),
            ])
            .await
            .unwrap();

        index
            .delete(&["id_0_0".to_string(), "id_9_9".to_string()])
            .await
            .unwrap();
        assert_eq!(index.get_all_ids().await.unwrap(), vec!["id_0_1"]);
    }

    #[tokio::test]
    async fn test_query_ranks_by_distance() {
        let index = index();
        index
            .add(&[
                fragment("id_1_0", "Beta pricing page lists plans.", "https://a.test/2"),
                fragment("id_0_0", "Alpha library docs about widgets.", "https://a.test/1"),
            ])
            .await
            .unwrap();

        let hits = index.query("Which library has widgets?", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].fragment.id, "id_0_0");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn test_query_caps_at_collection_size() {
        let index = index();
        index
            .add(&[fragment("id_0_0", "Alpha widgets", "https://a.test/1")])
            .await
            .unwrap();

        assert_eq!(index.query("widgets", 5).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_query_empty_collection() {
        assert!(index().query("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_readd_replaces() {
        let index = index();
        index
            .add(&[fragment("id_0_0", "old text", "https://a.test/1")])
            .await
            .unwrap();
        index
            .add(&[fragment("id_0_0", "new text", "https://a.test/1")])
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 1);
        let hits = index.query("new text", 1).await.unwrap();
        assert_eq!(hits[0].fragment.text, "new text");
    }
}
