//! Data types for documents and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chunking::Chunker;

/// A source document held by the knowledge base.
///
/// Chunks are computed once at construction and never recomputed in place;
/// changing chunking parameters requires re-indexing the content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier, assigned at index time.
    pub id: String,
    /// The full original text, immutable after creation.
    pub content: String,
    /// Opaque origin identifier (a path, URL, etc.).
    pub source: String,
    /// Free-form key-value metadata.
    pub metadata: HashMap<String, String>,
    /// Ordered word-bounded chunks derived from `content`.
    ///
    /// Non-empty whenever `content` is non-empty; when chunking would yield
    /// nothing the whole content stands as a single chunk.
    pub chunks: Vec<String>,
}

impl Document {
    /// Create a document, deriving its chunks with the given chunker.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
        metadata: HashMap<String, String>,
        chunker: &dyn Chunker,
    ) -> Self {
        let content = content.into();
        let chunks = chunker.chunk(&content);
        Self { id: id.into(), content, source: source.into(), metadata, chunks }
    }
}

/// A retrieved [`Document`] paired with a relevance score.
///
/// The store is chunk-level, so a multi-chunk document can surface once per
/// matching chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The parent document of the matching chunk.
    pub document: Document,
    /// Cosine similarity against the query (higher is more relevant).
    pub score: f32,
}
