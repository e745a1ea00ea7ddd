//! Error types for the `lorekit-rag` crate.

use thiserror::Error;

/// Errors that can occur in knowledge-base operations.
#[derive(Debug, Error)]
pub enum KbError {
    /// A configuration validation error (e.g. chunk overlap >= chunk size).
    #[error("Configuration error: {0}")]
    Config(String),

    /// An embedding's dimensionality disagrees with the store's established
    /// dimensionality. Signals a provider misconfiguration; never recovered
    /// by truncation or padding.
    #[error("Dimension mismatch: store holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch {
        /// The dimensionality established by the store.
        expected: usize,
        /// The dimensionality of the offending vector.
        actual: usize,
    },

    /// A failure from an embedding capability (timeout, bad status, malformed
    /// payload). Recovered at the delegate boundary by falling back to the
    /// local embedding; callers of `embed` never observe this variant.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A failure from a text-generation capability. Recovered by the answer
    /// composer's deterministic fallback; callers of `answer` never observe
    /// this variant.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A snapshot write failure. Surfaced from `index` because silent loss of
    /// persistence is not acceptable; the in-memory store stays usable.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A convenience result type for knowledge-base operations.
pub type Result<T> = std::result::Result<T, KbError>;
