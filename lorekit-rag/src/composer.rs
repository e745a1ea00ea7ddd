//! Grounded answer composition over retrieved results.

use std::sync::Arc;

use tracing::{info, warn};

use crate::document::SearchHit;
use crate::generation::GenerationProvider;

/// Returned when the store holds nothing relevant. A normal terminal
/// outcome of a cold or irrelevant store, not an error.
pub const INSUFFICIENT_INFO_MESSAGE: &str = "I don't have enough information to answer that. \
     Please add some documents to the knowledge base first.";

/// How much of each document's content is quoted in prompts and fallback
/// answers.
const EXCERPT_CHARS: usize = 500;

/// How many non-best sources the fallback answer lists.
const MAX_OTHER_SOURCES: usize = 2;

/// Composes a human-readable answer from ranked retrieval results.
///
/// With a generation provider configured, the answer is delegated to it over
/// a prompt grounding the query in the retrieved excerpts. Without one, or
/// when it fails, a deterministic local composition quotes the best hit.
/// [`answer`](AnswerComposer::answer) always returns a string.
pub struct AnswerComposer {
    generator: Option<Arc<dyn GenerationProvider>>,
}

impl AnswerComposer {
    /// Create a composer, optionally backed by a generation provider.
    pub fn new(generator: Option<Arc<dyn GenerationProvider>>) -> Self {
        Self { generator }
    }

    /// Produce an answer for the query given ranked results.
    ///
    /// Generation failures are logged and recovered by the deterministic
    /// fallback; this method never fails.
    pub async fn answer(&self, query: &str, results: &[SearchHit]) -> String {
        if results.is_empty() {
            return INSUFFICIENT_INFO_MESSAGE.to_string();
        }

        if let Some(generator) = &self.generator {
            let prompt = build_prompt(query, results);
            match generator.generate(&prompt).await {
                Ok(completion) => {
                    info!(result_count = results.len(), "composed answer via generation");
                    return completion;
                }
                Err(e) => {
                    warn!(error = %e, "generation failed, composing fallback answer");
                }
            }
        }

        fallback_answer(results)
    }
}

/// Truncate text to at most `max_chars` characters on a char boundary.
fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the generation prompt: the query plus each hit's excerpt tagged
/// with its source and similarity score.
fn build_prompt(query: &str, results: &[SearchHit]) -> String {
    let context = results
        .iter()
        .map(|hit| {
            format!(
                "[Source: {} (relevance: {:.2})]\n{}",
                hit.document.source,
                hit.score,
                excerpt(&hit.document.content, EXCERPT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "You are a helpful AI assistant answering questions based on a knowledge base.\n\n\
         Context from knowledge base:\n{context}\n\n\
         Question: {query}\n\n\
         Instructions:\n\
         1. Use the context above to answer the question\n\
         2. If the context doesn't contain enough information, say so\n\
         3. Cite the sources when possible\n\
         4. Be concise but informative"
    )
}

/// Deterministic composition quoting the best hit, used when no generator is
/// configured or it fails.
fn fallback_answer(results: &[SearchHit]) -> String {
    let best = &results[0];

    let mut answer = format!("Based on my knowledge base (relevance: {:.2}):\n\n", best.score);
    answer.push_str(excerpt(&best.document.content, EXCERPT_CHARS));
    if best.document.content.chars().count() > EXCERPT_CHARS {
        answer.push_str("...\n\n[Content truncated]");
    }
    answer.push_str(&format!("\n\n*Source: {}*", best.document.source));

    if results.len() > 1 {
        answer.push_str("\n\nOther relevant sources:");
        for hit in results.iter().skip(1).take(MAX_OTHER_SOURCES) {
            answer.push_str(&format!("\n- {}", hit.document.source));
        }
    }

    answer
}
