//! End-to-end scenarios for the knowledge-base façade.

use std::collections::HashMap;
use std::sync::Arc;

use lorekit_rag::{HashEmbedder, INSUFFICIENT_INFO_MESSAGE, KbConfig, KnowledgeBase};

const DIM: usize = 64;

fn open_kb(config: KbConfig) -> KnowledgeBase {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    KnowledgeBase::open(config, embedder, None).unwrap()
}

fn small_chunk_config() -> KbConfig {
    KbConfig::builder().chunk_size(2).chunk_overlap(0).dimensions(DIM).build().unwrap()
}

#[tokio::test]
async fn indexing_chunks_content_word_bounded() {
    let kb = open_kb(small_chunk_config());
    kb.index("a.txt", "the quick brown fox", HashMap::new()).await.unwrap();

    let stats = kb.stats().await;
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.chunks, 2);

    let hits = kb.search("quick", 10).await.unwrap();
    assert_eq!(hits[0].document.chunks, vec!["the quick", "brown fox"]);
}

#[tokio::test]
async fn query_against_empty_kb_returns_fixed_message() {
    let kb = open_kb(KbConfig::builder().dimensions(DIM).build().unwrap());
    let answer = kb.query("anything at all?").await.unwrap();
    assert_eq!(answer, INSUFFICIENT_INFO_MESSAGE);
}

#[tokio::test]
async fn identical_content_gets_independent_document_ids() {
    let kb = open_kb(small_chunk_config());
    let first = kb.index("a.txt", "same words here", HashMap::new()).await.unwrap();
    let second = kb.index("b.txt", "same words here", HashMap::new()).await.unwrap();
    assert_ne!(first, second);

    let stats = kb.stats().await;
    assert_eq!(stats.documents, 2);
    assert_eq!(stats.sources, vec!["a.txt", "b.txt"]);
}

#[tokio::test]
async fn query_answers_from_best_matching_document() {
    let kb = open_kb(KbConfig::builder().dimensions(DIM).top_k(3).build().unwrap());
    kb.index("rust.md", "rust is a systems programming language", HashMap::new()).await.unwrap();
    kb.index("cooking.md", "simmer the onions until translucent", HashMap::new()).await.unwrap();

    let answer = kb.query("rust systems programming language").await.unwrap();
    assert!(answer.contains("rust is a systems programming language"));
    assert!(answer.contains("*Source: rust.md*"));
}

#[tokio::test]
async fn reopening_restores_indexed_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");

    let config = KbConfig::builder()
        .chunk_size(2)
        .chunk_overlap(0)
        .dimensions(DIM)
        .snapshot_path(&path)
        .build()
        .unwrap();

    {
        let kb = open_kb(config.clone());
        kb.index("a.txt", "the quick brown fox", HashMap::new()).await.unwrap();
    }

    let kb = open_kb(config);
    let stats = kb.stats().await;
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.chunks, 2);
    assert_eq!(stats.sources, vec!["a.txt"]);

    // New documents keep getting fresh ids after the reload.
    let id = kb.index("b.txt", "more text", HashMap::new()).await.unwrap();
    assert_eq!(id, "doc_1");
}

#[tokio::test]
async fn metadata_survives_indexing_and_search() {
    let kb = open_kb(small_chunk_config());
    let mut metadata = HashMap::new();
    metadata.insert("lang".to_string(), "en".to_string());
    kb.index("a.txt", "hello world", metadata.clone()).await.unwrap();

    let hits = kb.search("hello", 1).await.unwrap();
    assert_eq!(hits[0].document.metadata, metadata);
}

#[tokio::test]
async fn searching_own_content_scores_one() {
    let kb = open_kb(KbConfig::builder().dimensions(DIM).build().unwrap());
    kb.index("a.txt", "unique distinctive phrase", HashMap::new()).await.unwrap();

    let hits = kb.search("unique distinctive phrase", 1).await.unwrap();
    assert!((hits[0].score - 1.0).abs() < 1e-5, "score was {}", hits[0].score);
}
