//! Word-bounded document chunking.

use crate::error::{KbError, Result};

/// A strategy for splitting raw text into chunks.
///
/// Implementations must be deterministic: identical input always yields an
/// identical chunk sequence, so re-indexing is reproducible.
pub trait Chunker: Send + Sync {
    /// Split text into an ordered sequence of chunks.
    ///
    /// Always returns at least one chunk. If the text contains no words the
    /// original (possibly empty) text is returned as a single chunk.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text into overlapping windows of whole words.
///
/// Successive windows hold up to `chunk_size` words and start `chunk_size -
/// overlap` words apart; the window that reaches the final word ends the
/// sequence and may be shorter than `chunk_size`.
///
/// # Example
///
/// ```
/// use lorekit_rag::chunking::{Chunker, WordChunker};
///
/// let chunker = WordChunker::new(2, 0).unwrap();
/// let chunks = chunker.chunk("the quick brown fox");
/// assert_eq!(chunks, vec!["the quick", "brown fox"]);
/// ```
#[derive(Debug, Clone)]
pub struct WordChunker {
    chunk_size: usize,
    overlap: usize,
}

impl WordChunker {
    /// Create a new `WordChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Config`] if `chunk_size` is zero or if `overlap`
    /// is not strictly less than `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(KbError::Config("chunk_size must be greater than zero".to_string()));
        }
        if overlap >= chunk_size {
            return Err(KbError::Config(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }
}

impl Chunker for WordChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return vec![text.to_string()];
        }

        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            chunks.push(words[start..end].join(" "));
            // Once a window reaches the final word, stop: advancing by less
            // than chunk_size would only re-emit a suffix of this window.
            if end == words.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}
