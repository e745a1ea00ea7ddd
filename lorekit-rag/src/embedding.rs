//! Embedding provider trait and the deterministic hash fallback.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::error::Result;

/// A provider that turns text into a fixed-length embedding vector.
///
/// Every vector produced by one provider instance has the same
/// dimensionality, reported by [`dimensions`](EmbeddingProvider::dimensions).
/// Mixing providers of different dimensionality against one store is a
/// misconfiguration the store rejects.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Deterministic word-hash embedding, the always-available fallback.
///
/// Each distinct lowercase word hashes to one slot of the vector, and that
/// slot is set to the word's raw frequency in the text. Colliding words
/// overwrite rather than accumulate; that last-write-wins behavior is a
/// defined contract, not additive bag-of-words. The populated vector is
/// L2-normalized; an all-zero vector (empty text) is left as-is.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Create a hash embedder producing vectors of the given dimensionality.
    ///
    /// # Panics
    ///
    /// Panics if `dimensions` is zero; a zero-dimensional embedding space
    /// has no slots to hash into.
    pub fn new(dimensions: usize) -> Self {
        assert!(dimensions > 0, "dimensions must be greater than zero");
        Self { dimensions }
    }

    /// Compute the embedding synchronously.
    ///
    /// Exposed so the remote delegate can fall back without going through
    /// the async trait.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();

        let mut frequencies: HashMap<&str, f32> = HashMap::new();
        for &word in &words {
            *frequencies.entry(word).or_insert(0.0) += 1.0;
        }

        // Walk the text in order so the later of two slot-colliding words
        // wins deterministically.
        let mut embedding = vec![0.0f32; self.dimensions];
        for &word in &words {
            let slot = word_slot(word, self.dimensions);
            embedding[slot] = frequencies[word];
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

/// Reduce a word's stable 64-bit hash to a slot index.
fn word_slot(word: &str, dimensions: usize) -> usize {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    word.hash(&mut hasher);
    (hasher.finish() % dimensions as u64) as usize
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIM: usize = 64;

    #[test]
    #[should_panic(expected = "dimensions must be greater than zero")]
    fn zero_dimensions_rejected() {
        HashEmbedder::new(0);
    }

    #[test]
    fn produces_fixed_dimensionality() {
        let embedder = HashEmbedder::new(DIM);
        assert_eq!(embedder.embed_text("hello world").len(), DIM);
        assert_eq!(embedder.dimensions(), DIM);
    }

    #[test]
    fn non_empty_text_is_unit_norm() {
        let embedder = HashEmbedder::new(DIM);
        let embedding = embedder.embed_text("the quick brown fox jumps over the lazy dog");
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6, "norm was {norm}");
    }

    #[test]
    fn empty_text_is_all_zeros() {
        let embedder = HashEmbedder::new(DIM);
        let embedding = embedder.embed_text("");
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn embedding_is_deterministic() {
        let embedder = HashEmbedder::new(DIM);
        let text = "some repeated words some repeated words";
        assert_eq!(embedder.embed_text(text), embedder.embed_text(text));
    }

    #[test]
    fn case_insensitive_tokenization() {
        let embedder = HashEmbedder::new(DIM);
        assert_eq!(embedder.embed_text("Hello World"), embedder.embed_text("hello world"));
    }

    #[test]
    fn identical_texts_have_identical_embeddings_across_instances() {
        let a = HashEmbedder::new(DIM);
        let b = HashEmbedder::new(DIM);
        assert_eq!(a.embed_text("stable hashing"), b.embed_text("stable hashing"));
    }

    #[tokio::test]
    async fn trait_embed_matches_sync_path() {
        let embedder = HashEmbedder::new(DIM);
        let via_trait = embedder.embed("hello world").await.unwrap();
        assert_eq!(via_trait, embedder.embed_text("hello world"));
    }
}
