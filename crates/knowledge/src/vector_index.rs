//! Vector index abstraction for website fragments.
//!
//! An index owns one named collection and the embedding provider used for
//! both fragments and questions, so callers only ever hand it text.

use crate::types::{Fragment, ScoredFragment};
use siteqa_core::AppResult;

/// Trait for vector index backends.
///
/// Implementations must support:
/// - Adding fragments (embedded on the way in)
/// - Listing and deleting fragments by id
/// - Nearest-neighbour queries by cosine distance
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Name of the collection this index reads and writes.
    fn collection_name(&self) -> &str;

    /// Embed and store `fragments`.
    async fn add(&self, fragments: &[Fragment]) -> AppResult<()>;

    /// Ids of every fragment currently stored.
    async fn get_all_ids(&self) -> AppResult<Vec<String>>;

    /// Remove the fragments with the given ids. Unknown ids are ignored.
    async fn delete(&self, ids: &[String]) -> AppResult<()>;

    /// The `top_k` fragments nearest to `text`, ordered by ascending distance.
    ///
    /// Returns fewer than `top_k` results when the collection is smaller, and
    /// an empty list when it is empty.
    async fn query(&self, text: &str, top_k: usize) -> AppResult<Vec<ScoredFragment>>;

    /// Number of fragments stored.
    async fn count(&self) -> AppResult<usize>;
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance, `1 - similarity`. Zero vectors sit at distance 1.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Sort hits by ascending distance, keeping insertion order on ties.
pub(crate) fn rank(hits: &mut Vec<ScoredFragment>, top_k: usize) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits.truncate(top_k);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_distance_bounds() {
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_distance() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn test_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let hit = |id: &str, distance: f32| ScoredFragment {
            fragment: Fragment {
                id: id.to_string(),
                text: id.to_string(),
                source_url: "https://a.test/".to_string(),
            },
            distance,
        };
        let mut hits = vec![hit("c", 0.9), hit("a", 0.1), hit("b", 0.5), hit("a2", 0.1)];
        rank(&mut hits, 3);

        let ids: Vec<&str> = hits.iter().map(|h| h.fragment.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a2", "b"]);
    }
}
