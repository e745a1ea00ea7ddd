//! Top-level knowledge-base façade.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chunking::WordChunker;
use crate::composer::AnswerComposer;
use crate::config::KbConfig;
use crate::document::SearchHit;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::generation::GenerationProvider;
use crate::retriever::Retriever;
use crate::store::VectorStore;

/// Aggregate statistics over a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KbStats {
    /// Number of indexed documents.
    pub documents: usize,
    /// Total chunk count across all documents.
    pub chunks: usize,
    /// Sorted distinct source identifiers.
    pub sources: Vec<String>,
}

/// A retrieval-augmented knowledge base.
///
/// Composes the retriever and answer composer over a shared vector store and
/// owns the persistence lifecycle: opening loads the snapshot (or starts
/// empty), and every successful index writes it back in full.
///
/// One logical owner per instance: concurrent queries are fine, but callers
/// must serialize `index` calls externally.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use lorekit_rag::{HashEmbedder, KbConfig, KnowledgeBase};
///
/// let config = KbConfig::builder().snapshot_path("./kb/index.json").build()?;
/// let embedder = Arc::new(HashEmbedder::new(config.dimensions));
/// let kb = KnowledgeBase::open(config, embedder, None)?;
///
/// kb.index("notes.txt", "the quick brown fox", Default::default()).await?;
/// let answer = kb.query("what is quick?").await?;
/// ```
pub struct KnowledgeBase {
    config: KbConfig,
    store: Arc<VectorStore>,
    retriever: Retriever,
    composer: AnswerComposer,
}

impl KnowledgeBase {
    /// Open a knowledge base with the given configuration and capabilities.
    ///
    /// Loads the snapshot at `config.snapshot_path` when one is configured;
    /// a missing or corrupt snapshot means starting with no prior knowledge.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Config`](crate::KbError::Config) if the chunking
    /// parameters are invalid.
    pub fn open(
        config: KbConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Option<Arc<dyn GenerationProvider>>,
    ) -> Result<Self> {
        let chunker = Arc::new(WordChunker::new(config.chunk_size, config.chunk_overlap)?);

        let store = Arc::new(match &config.snapshot_path {
            Some(path) => VectorStore::load(path),
            None => VectorStore::new(),
        });

        let retriever =
            Retriever::new(chunker, embedder, Arc::clone(&store), config.snapshot_path.clone());
        let composer = AnswerComposer::new(generator);

        Ok(Self { config, store, retriever, composer })
    }

    /// Index a document and return its assigned id.
    ///
    /// # Errors
    ///
    /// Surfaces [`KbError::Storage`](crate::KbError::Storage) when the
    /// snapshot write fails; the document remains indexed in memory.
    pub async fn index(
        &self,
        source: impl Into<String>,
        content: impl Into<String>,
        metadata: HashMap<String, String>,
    ) -> Result<String> {
        self.retriever.index(source, content, metadata).await
    }

    /// Retrieve the `top_k` most similar documents for a query.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        self.retriever.search(query, top_k).await
    }

    /// Answer a question grounded in retrieved context.
    ///
    /// Always produces an answer string; a cold or irrelevant store yields
    /// the fixed insufficient-information message.
    pub async fn query(&self, question: &str) -> Result<String> {
        let results = self.retriever.search(question, self.config.top_k).await?;
        Ok(self.composer.answer(question, &results).await)
    }

    /// Report document count, total chunk count, and distinct sources.
    pub async fn stats(&self) -> KbStats {
        KbStats {
            documents: self.store.document_count().await,
            chunks: self.store.chunk_count().await,
            sources: self.store.sources().await,
        }
    }
}
