//! # lorekit-rag
//!
//! A retrieval-augmented knowledge base: index text documents into
//! overlapping word-bounded chunks, embed each chunk into a fixed-length
//! vector, and answer natural-language questions from the most similar
//! chunks.
//!
//! ## Overview
//!
//! - [`WordChunker`] splits raw text into overlapping chunks.
//! - [`EmbeddingProvider`] turns text into vectors; [`HashEmbedder`] is the
//!   deterministic local fallback and [`OpenRouterEmbedder`] delegates to a
//!   remote embedding service, failing closed onto the hash embedding.
//! - [`VectorStore`] holds chunk-level records in memory, searches by cosine
//!   similarity, and persists its full state as one JSON snapshot.
//! - [`Retriever`] orchestrates index and search.
//! - [`AnswerComposer`] produces a grounded answer, via an optional
//!   [`GenerationProvider`] or a deterministic local fallback.
//! - [`KnowledgeBase`] composes everything behind one façade.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lorekit_rag::{HashEmbedder, KbConfig, KnowledgeBase};
//!
//! let config = KbConfig::builder().snapshot_path("./kb/index.json").build()?;
//! let embedder = Arc::new(HashEmbedder::new(config.dimensions));
//! let kb = KnowledgeBase::open(config, embedder, None)?;
//!
//! kb.index("guide.md", std::fs::read_to_string("guide.md")?, Default::default()).await?;
//! println!("{}", kb.query("how do I configure logging?").await?);
//! ```
//!
//! The system degrades gracefully: remote embedding or generation failures
//! fall back to deterministic local implementations, a missing or corrupt
//! snapshot opens as an empty store, and queries against an empty store
//! return a fixed insufficient-information message rather than an error.

pub mod chunking;
pub mod composer;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod knowledge;
pub mod openrouter;
pub mod retriever;
pub mod store;

pub use chunking::{Chunker, WordChunker};
pub use composer::{AnswerComposer, INSUFFICIENT_INFO_MESSAGE};
pub use config::{KbConfig, KbConfigBuilder};
pub use document::{Document, SearchHit};
pub use embedding::{EmbeddingProvider, HashEmbedder};
pub use error::{KbError, Result};
pub use generation::GenerationProvider;
pub use knowledge::{KbStats, KnowledgeBase};
pub use openrouter::{OpenRouterConfig, OpenRouterEmbedder, OpenRouterGenerator};
pub use retriever::Retriever;
pub use store::{VectorStore, cosine_similarity};
