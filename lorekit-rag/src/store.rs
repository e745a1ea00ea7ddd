//! In-memory chunk-level vector store with full-state persistence.
//!
//! The store holds every indexed [`Document`] once and one [`VectorRecord`]
//! per chunk embedding. Records reference their owning document by position
//! in the document list, so document text is never duplicated per chunk.
//! State is guarded by a `tokio::sync::RwLock`: searches run concurrently,
//! inserts take the write lock.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::document::{Document, SearchHit};
use crate::error::{KbError, Result};

/// One chunk embedding paired with a backlink to its owning document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct VectorRecord {
    /// Position of the owning document in the store's document list.
    doc_index: usize,
    embedding: Vec<f32>,
}

/// The full persisted state: documents plus the parallel record list.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
struct StoreState {
    documents: Vec<Document>,
    records: Vec<VectorRecord>,
}

impl StoreState {
    /// Dimensionality established by the first stored record, if any.
    fn dimensions(&self) -> Option<usize> {
        self.records.first().map(|r| r.embedding.len())
    }
}

/// An in-memory vector store using cosine similarity for search.
///
/// The complete set of documents and records forms one logical snapshot that
/// [`save`](VectorStore::save) and [`load`](VectorStore::load) move to and
/// from disk as a unit.
#[derive(Debug, Default)]
pub struct VectorStore {
    state: RwLock<StoreState>,
}

/// Compute cosine similarity between two vectors.
///
/// Defined as 0.0 when either vector has zero magnitude, so zero vectors
/// never inject NaN into ranking.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a snapshot file.
    ///
    /// A missing file means no prior knowledge and yields an empty store.
    /// An unreadable or corrupt snapshot is logged and likewise yields an
    /// empty store rather than failing the whole system.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot found, starting empty");
            return Self::new();
        }

        let state = match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice::<StoreState>(&bytes) {
                Ok(state) => state,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt snapshot, starting empty");
                    StoreState::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable snapshot, starting empty");
                StoreState::default()
            }
        };

        info!(
            path = %path.display(),
            documents = state.documents.len(),
            records = state.records.len(),
            "loaded snapshot"
        );
        Self { state: RwLock::new(state) }
    }

    /// Insert a document with one embedding per chunk.
    ///
    /// The document is appended once; each embedding becomes a record
    /// backlinked to it. Duplicate content is never rejected.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::DimensionMismatch`] if any embedding's length
    /// disagrees with the store's established dimensionality (set by the
    /// first record ever inserted). Nothing is inserted on error.
    pub async fn insert(&self, document: Document, embeddings: Vec<Vec<f32>>) -> Result<()> {
        let mut state = self.state.write().await;

        let mut expected = state.dimensions();
        for embedding in &embeddings {
            match expected {
                Some(dims) if embedding.len() != dims => {
                    return Err(KbError::DimensionMismatch { expected: dims, actual: embedding.len() });
                }
                Some(_) => {}
                None => expected = Some(embedding.len()),
            }
        }

        let doc_index = state.documents.len();
        debug!(document.id = %document.id, chunk_count = embeddings.len(), "inserting document");
        state.documents.push(document);
        for embedding in embeddings {
            state.records.push(VectorRecord { doc_index, embedding });
        }
        Ok(())
    }

    /// Search for the `top_k` records most similar to the query embedding.
    ///
    /// Results are ordered by descending cosine similarity; equal scores
    /// preserve insertion order (earlier insertion wins). An empty store
    /// returns an empty list, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::DimensionMismatch`] if the query's length disagrees
    /// with the store's established dimensionality.
    pub async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        let state = self.state.read().await;

        if state.records.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(dims) = state.dimensions() {
            if query_embedding.len() != dims {
                return Err(KbError::DimensionMismatch {
                    expected: dims,
                    actual: query_embedding.len(),
                });
            }
        }

        let mut scored: Vec<SearchHit> = state
            .records
            .iter()
            .map(|record| SearchHit {
                document: state.documents[record.doc_index].clone(),
                score: cosine_similarity(&record.embedding, query_embedding),
            })
            .collect();

        // Stable sort keeps insertion order for equal scores.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    /// Persist the full state to a snapshot file.
    ///
    /// The snapshot is written to a sibling temp file and renamed into place
    /// so a concurrent [`load`](VectorStore::load) never sees a torn write.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Storage`] on any serialization or filesystem
    /// failure; the in-memory state is unaffected.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let state = self.state.read().await;
        let bytes = serde_json::to_vec(&*state)
            .map_err(|e| KbError::Storage(format!("failed to serialize snapshot: {e}")))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    KbError::Storage(format!("failed to create {}: {e}", parent.display()))
                })?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &bytes)
            .map_err(|e| KbError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| KbError::Storage(format!("failed to rename snapshot into place: {e}")))?;

        debug!(
            path = %path.display(),
            documents = state.documents.len(),
            records = state.records.len(),
            "saved snapshot"
        );
        Ok(())
    }

    /// Number of distinct documents held by the store.
    pub async fn document_count(&self) -> usize {
        self.state.read().await.documents.len()
    }

    /// Number of chunk records held by the store.
    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Total chunk count across all documents.
    pub async fn chunk_count(&self) -> usize {
        self.state.read().await.documents.iter().map(|d| d.chunks.len()).sum()
    }

    /// Sorted distinct source identifiers across all documents.
    pub async fn sources(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut sources: Vec<String> = state.documents.iter().map(|d| d.source.clone()).collect();
        sources.sort();
        sources.dedup();
        sources
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn doc(id: &str, source: &str) -> Document {
        Document {
            id: id.to_string(),
            content: "irrelevant".to_string(),
            source: source.to_string(),
            metadata: HashMap::new(),
            chunks: vec!["irrelevant".to_string()],
        }
    }

    #[test]
    fn cosine_of_self_is_one() {
        let v = vec![0.6, 0.8, 0.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_with_zero_vector_is_zero() {
        let v = vec![0.6, 0.8];
        let zero = vec![0.0, 0.0];
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[tokio::test]
    async fn empty_store_search_returns_empty() {
        let store = VectorStore::new();
        let hits = store.search(&[1.0, 0.0], 10).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn search_ranks_by_descending_similarity() {
        let store = VectorStore::new();
        store.insert(doc("doc_0", "a"), vec![vec![1.0, 0.0]]).await.unwrap();
        store.insert(doc("doc_1", "b"), vec![vec![0.0, 1.0]]).await.unwrap();
        store.insert(doc("doc_2", "c"), vec![vec![1.0, 1.0]]).await.unwrap();

        let hits = store.search(&[1.0, 0.0], 3).await.unwrap();
        assert_eq!(hits[0].document.id, "doc_0");
        assert_eq!(hits[1].document.id, "doc_2");
        assert_eq!(hits[2].document.id, "doc_1");
    }

    #[tokio::test]
    async fn equal_scores_preserve_insertion_order() {
        let store = VectorStore::new();
        store.insert(doc("doc_0", "a"), vec![vec![1.0, 0.0]]).await.unwrap();
        store.insert(doc("doc_1", "b"), vec![vec![1.0, 0.0]]).await.unwrap();
        store.insert(doc("doc_2", "c"), vec![vec![2.0, 0.0]]).await.unwrap();

        let hits = store.search(&[1.0, 0.0], 3).await.unwrap();
        // All three score 1.0 against the query; insertion order must hold.
        assert_eq!(hits[0].document.id, "doc_0");
        assert_eq!(hits[1].document.id, "doc_1");
        assert_eq!(hits[2].document.id, "doc_2");
    }

    #[tokio::test]
    async fn top_k_bounds_result_count() {
        let store = VectorStore::new();
        for i in 0..5 {
            store.insert(doc(&format!("doc_{i}"), "s"), vec![vec![1.0, 0.0]]).await.unwrap();
        }
        let hits = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn mismatched_insert_dimension_rejected() {
        let store = VectorStore::new();
        store.insert(doc("doc_0", "a"), vec![vec![1.0, 0.0]]).await.unwrap();
        let err = store.insert(doc("doc_1", "b"), vec![vec![1.0, 0.0, 0.0]]).await.unwrap_err();
        assert!(matches!(err, KbError::DimensionMismatch { expected: 2, actual: 3 }));
        assert_eq!(store.document_count().await, 1);
    }

    #[tokio::test]
    async fn mismatched_query_dimension_rejected() {
        let store = VectorStore::new();
        store.insert(doc("doc_0", "a"), vec![vec![1.0, 0.0]]).await.unwrap();
        let err = store.search(&[1.0, 0.0, 0.0], 1).await.unwrap_err();
        assert!(matches!(err, KbError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[tokio::test]
    async fn duplicate_content_accepted() {
        let store = VectorStore::new();
        store.insert(doc("doc_0", "a"), vec![vec![1.0, 0.0]]).await.unwrap();
        store.insert(doc("doc_1", "a"), vec![vec![1.0, 0.0]]).await.unwrap();
        assert_eq!(store.document_count().await, 2);
        assert_eq!(store.record_count().await, 2);
    }

    #[tokio::test]
    async fn load_missing_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::load(&dir.path().join("absent.json"));
        assert_eq!(store.document_count().await, 0);
    }

    #[tokio::test]
    async fn load_corrupt_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, b"{not json").unwrap();
        let store = VectorStore::load(&path);
        assert_eq!(store.document_count().await, 0);
    }

    #[tokio::test]
    async fn save_load_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let store = VectorStore::new();
        let mut metadata = HashMap::new();
        metadata.insert("lang".to_string(), "en".to_string());
        let original = Document {
            id: "doc_0".to_string(),
            content: "the quick brown fox".to_string(),
            source: "a.txt".to_string(),
            metadata,
            chunks: vec!["the quick".to_string(), "brown fox".to_string()],
        };
        store
            .insert(original.clone(), vec![vec![0.25, -0.5, 0.125], vec![1.0, 0.0, -1.0]])
            .await
            .unwrap();
        store.save(&path).await.unwrap();

        let restored = VectorStore::load(&path);
        assert_eq!(restored.document_count().await, 1);
        assert_eq!(restored.record_count().await, 2);
        assert_eq!(restored.chunk_count().await, 2);

        let a = store.state.read().await;
        let b = restored.state.read().await;
        assert_eq!(*a, *b);
    }
}
