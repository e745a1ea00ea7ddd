//! Indexing and retrieval orchestration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::Chunker;
use crate::document::{Document, SearchHit};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::store::VectorStore;

/// Orchestrates chunking, embedding, and store insertion on index, and
/// embedding plus similarity search on query.
pub struct Retriever {
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<VectorStore>,
    snapshot_path: Option<PathBuf>,
}

impl Retriever {
    /// Create a retriever over the given components.
    ///
    /// When `snapshot_path` is set, every successful insert is followed by a
    /// full-state snapshot write.
    pub fn new(
        chunker: Arc<dyn Chunker>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<VectorStore>,
        snapshot_path: Option<PathBuf>,
    ) -> Self {
        Self { chunker, embedder, store, snapshot_path }
    }

    /// Index a document: chunk, embed each chunk, insert, persist.
    ///
    /// Returns the assigned document id. Identical content indexed twice
    /// yields two independent documents.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::DimensionMismatch`](crate::KbError::DimensionMismatch)
    /// on a misconfigured provider and [`KbError::Storage`](crate::KbError::Storage)
    /// when the snapshot write fails. After a storage error the in-memory
    /// index still holds the document.
    pub async fn index(
        &self,
        source: impl Into<String>,
        content: impl Into<String>,
        metadata: HashMap<String, String>,
    ) -> Result<String> {
        let doc_id = format!("doc_{}", self.store.document_count().await);
        let document =
            Document::new(doc_id.clone(), content, source, metadata, self.chunker.as_ref());

        let texts: Vec<&str> = document.chunks.iter().map(|c| c.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let chunk_count = document.chunks.len();
        self.store.insert(document, embeddings).await?;
        info!(document.id = %doc_id, chunk_count, "indexed document");

        if let Some(path) = &self.snapshot_path {
            self.store.save(path).await.inspect_err(|e| {
                error!(path = %path.display(), error = %e, "snapshot write failed after index");
            })?;
        }

        Ok(doc_id)
    }

    /// Embed the query once and return the `top_k` most similar hits.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let query_embedding = self.embedder.embed(query).await?;
        self.store.search(&query_embedding, top_k).await
    }
}
