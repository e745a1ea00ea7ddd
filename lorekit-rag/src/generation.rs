//! Text-generation capability trait.

use async_trait::async_trait;

use crate::error::Result;

/// A capability that turns a prompt into completion text.
///
/// Implementations wrap external chat/completion services. Failures are
/// recovered by the [`AnswerComposer`](crate::AnswerComposer)'s deterministic
/// fallback and never surface to the querying caller.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate completion text for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
