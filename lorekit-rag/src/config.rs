//! Configuration for the knowledge base.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{KbError, Result};

/// Configuration parameters for a [`KnowledgeBase`](crate::KnowledgeBase).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KbConfig {
    /// Maximum chunk size in words.
    pub chunk_size: usize,
    /// Number of overlapping words between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top results to retrieve for a query.
    pub top_k: usize,
    /// Dimensionality of the fallback embedding space.
    pub dimensions: usize,
    /// Where to persist the store snapshot. `None` disables persistence.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 5,
            dimensions: 1536,
            snapshot_path: None,
        }
    }
}

impl KbConfig {
    /// Create a new builder for constructing a [`KbConfig`].
    pub fn builder() -> KbConfigBuilder {
        KbConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`KbConfig`].
#[derive(Debug, Clone, Default)]
pub struct KbConfigBuilder {
    config: KbConfig,
}

impl KbConfigBuilder {
    /// Set the maximum chunk size in words.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in words.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results retrieved for a query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the dimensionality of the fallback embedding space.
    pub fn dimensions(mut self, dims: usize) -> Self {
        self.config.dimensions = dims;
        self
    }

    /// Set the snapshot path for persistence.
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = Some(path.into());
        self
    }

    /// Build the [`KbConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Config`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `chunk_size == 0`
    /// - `top_k == 0`
    /// - `dimensions == 0`
    pub fn build(self) -> Result<KbConfig> {
        if self.config.chunk_size == 0 {
            return Err(KbError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(KbError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(KbError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.dimensions == 0 {
            return Err(KbError::Config("dimensions must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
