use crate::config::Language;
use crate::embedding_service::Embedder;
use crate::error::RagError;
use crate::gemini_service::CompletionProvider;
use crate::models::*;
use crate::prompts;
use crate::vector_index::VectorIndex;
use anyhow::Result;
use std::sync::Arc;

/// Transform, retrieve, generate.
pub struct QueryService {
    provider: Arc<dyn CompletionProvider>,
    language: Language,
    top_k: usize,
}

impl QueryService {
    pub fn new(provider: Arc<dyn CompletionProvider>, language: Language, top_k: usize) -> Self {
        Self {
            provider,
            language,
            top_k,
        }
    }

    pub async fn query(
        &self,
        question: &str,
        embedder: &dyn Embedder,
        index: &VectorIndex,
    ) -> Result<Answer> {
        let transformed_query = self.transform_query(question).await?;
        log::debug!("Transformed query: {}", transformed_query);

        let query_embedding = embedder.embed_query(&transformed_query).await?;
        let sources = index.search(&query_embedding, self.top_k);
        log::debug!("Retrieved {} chunks", sources.len());

        let context = build_context(&sources);
        let prompt = prompts::answer_prompt(self.language, &context, question);
        let raw = self.provider.complete(&prompt).await?;

        let text = raw.trim().to_string();
        if text.is_empty() {
            return Err(RagError::EmptyResponse.into());
        }

        Ok(Answer {
            text,
            transformed_query,
            sources,
        })
    }

    /// Falls back to the question itself when the model returns nothing.
    async fn transform_query(&self, question: &str) -> Result<String> {
        let prompt = prompts::query_transform_prompt(self.language, question);
        let transformed = self.provider.complete(&prompt).await?;
        let transformed = transformed.trim();

        if transformed.is_empty() {
            Ok(question.to_string())
        } else {
            Ok(transformed.to_string())
        }
    }
}

pub fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|hit| hit.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
