//! Deterministic offline embeddings from hashed character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use siteqa_core::AppResult;
use std::collections::BTreeMap;

const MODEL_NAME: &str = "trigram-v1";

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "how", "who", "does", "do",
];

/// Embeds text as a hashed bag of word trigrams plus whole words, scaled to
/// unit length.
///
/// Not semantic, but stable across runs and platforms, and texts sharing
/// vocabulary land close together. That is enough for development without a
/// model server and for tests that need reproducible rankings.
#[derive(Debug, Clone)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        let lower = text.to_lowercase();

        for (word, freq) in word_frequencies(&lower) {
            let chars: Vec<char> = word.chars().collect();
            for trigram in chars.windows(3) {
                let hash = trigram
                    .iter()
                    .fold(0u64, |acc, c| acc.wrapping_mul(37).wrapping_add(*c as u64));
                vector[self.bucket(hash)] += (freq as f32).sqrt();
            }

            let hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            vector[self.bucket(hash)] += freq as f32;
        }

        normalize(&mut vector);
        vector
    }

    fn bucket(&self, hash: u64) -> usize {
        (hash % self.dimensions as u64) as usize
    }
}

/// Content words of an already lowercased text with their counts.
///
/// Any non-alphanumeric character separates words, so "widgets." and
/// "widgets?" count as the same word. Ordered so the float sums are
/// reproducible.
fn word_frequencies(lower: &str) -> BTreeMap<&str, usize> {
    let mut freq = BTreeMap::new();
    for word in lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
    {
        *freq.entry(word).or_insert(0) += 1;
    }
    freq
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_index::cosine_similarity;

    fn unit_length(v: &[f32]) -> bool {
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        (norm - 1.0).abs() < 1e-3
    }

    #[test]
    fn test_word_frequencies_drop_stop_words_and_short_tokens() {
        let freq = word_frequencies("what is alpha? alpha is a widget library, ok");
        assert_eq!(freq.get("alpha"), Some(&2));
        assert_eq!(freq.get("widget"), Some(&1));
        assert!(!freq.contains_key("what"));
        assert!(!freq.contains_key("ok"));
    }

    #[tokio::test]
    async fn test_batch_vectors_are_unit_length() {
        let provider = TrigramProvider::new(384);
        let texts = vec![
            "Alpha library docs about widgets.".to_string(),
            "Página de preços com descrições em português!".to_string(),
        ];

        let vectors = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == 384 && unit_length(v)));
    }

    #[tokio::test]
    async fn test_same_text_same_vector() {
        let provider = TrigramProvider::new(64);
        let a = provider.embed("Beta pricing page lists plans").await.unwrap();
        let b = provider.embed("Beta pricing page lists plans").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, provider.embed("Gamma support portal").await.unwrap());
    }

    #[tokio::test]
    async fn test_text_without_content_words_is_zero() {
        let provider = TrigramProvider::new(16);
        for text in ["", "   ", "it is a"] {
            let v = provider.embed(text).await.unwrap();
            assert!(v.iter().all(|&x| x == 0.0), "{:?}", text);
        }
    }

    #[tokio::test]
    async fn test_shared_vocabulary_ranks_closer() {
        let provider = TrigramProvider::new(384);
        let question = provider.embed("What does Alpha provide?").await.unwrap();
        let alpha = provider
            .embed("Alpha library docs about widgets. Alpha provides widgets.")
            .await
            .unwrap();
        let beta = provider.embed("Beta pricing page lists plans.").await.unwrap();

        assert!(cosine_similarity(&question, &alpha) > cosine_similarity(&question, &beta));
    }

    #[tokio::test]
    async fn test_punctuation_does_not_split_vocabulary() {
        let provider = TrigramProvider::new(384);
        let a = provider.embed("widgets.").await.unwrap();
        let b = provider.embed("widgets?").await.unwrap();
        assert_eq!(a, b);
    }
}
