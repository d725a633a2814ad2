//! Grounded question answering
//!
//! [`QueryEngine`] embeds a question, retrieves the closest corpus segments,
//! and builds a grounded prompt for the completion backend.

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::llm::CompletionBackend;
use crate::ml::embedding::{EmbeddingConfig, EmbeddingModel};
use crate::ml::index::CorpusIndex;
use crate::text::chunking::Segment;

const SYSTEM_PROMPT: &str = "You are a helpful AI assistant with access to a knowledge base.\n\nWhen answering questions:\n1. Use the provided context from the knowledge base when relevant\n2. Be clear about what information comes from the knowledge base vs. your general knowledge\n3. If the context doesn't contain enough information, say so clearly\n4. Provide helpful, accurate, and concise responses\n\nThe context will be provided with each query based on semantic similarity to the user's question.";

/// Answers questions grounded in a corpus index
pub struct QueryEngine {
    index: CorpusIndex,
    embedding_model: EmbeddingModel,
    retrieval: RetrievalConfig,
}

impl QueryEngine {
    /// Create a query engine over a built index.
    ///
    /// The embedding configuration must match the one the index was built
    /// with, or question vectors will not line up with segment vectors.
    pub fn new(
        index: CorpusIndex,
        retrieval: RetrievalConfig,
        embedding: EmbeddingConfig,
    ) -> Result<Self> {
        let embedding_model = EmbeddingModel::new(embedding)?;
        Ok(Self {
            index,
            embedding_model,
            retrieval,
        })
    }

    /// Retrieve the top-k segments for a question, ordered by similarity
    pub fn retrieve(&mut self, question: &str) -> Result<Vec<(f32, Segment)>> {
        let query_embedding = self.embedding_model.encode(question)?;
        let matches = self.index.search(&query_embedding, self.retrieval.top_k)?;
        Ok(matches
            .into_iter()
            .map(|(distance, segment)| (distance, segment.clone()))
            .collect())
    }

    /// Build the grounded prompt from a question and retrieved segments
    pub fn build_prompt(&self, question: &str, matches: &[(f32, Segment)]) -> String {
        let context = matches
            .iter()
            .take(self.retrieval.context_segments)
            .map(|(_score, segment)| format!("[Context]: {}", segment.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        if context.trim().is_empty() {
            question.to_string()
        } else {
            format!(
                "Context from knowledge base:\n{}\n\nUser question: {}",
                context, question
            )
        }
    }

    /// Answer a question: retrieve, build prompt, generate
    pub async fn answer(
        &mut self,
        backend: &dyn CompletionBackend,
        question: &str,
    ) -> Result<String> {
        let matches = self.retrieve(question)?;
        log::debug!("Retrieved {} segments for question", matches.len());

        let prompt = self.build_prompt(question, &matches);
        backend.complete(Some(SYSTEM_PROMPT), &prompt).await
    }

    /// The underlying index
    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }
}
