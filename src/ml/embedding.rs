//! Deterministic embedding generation
//!
//! Segments and questions are embedded into fixed-dimension vectors derived
//! from their tokenization. The embedding is deterministic and position
//! aware, so identical text always maps to the same vector and similar token
//! sequences land near each other under cosine distance. No model download is
//! required.

use crate::error::Result;
use crate::ml::text::{TextConfig, TextProcessor};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// Embedding dimension (MiniLM-compatible)
pub const EMBEDDING_DIMENSION: usize = 384;

/// Configuration for the embedding model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Maximum sequence length
    pub max_length: usize,
    /// Whether to normalize embeddings to unit length
    pub normalize: bool,
    /// Batch size for parallel processing
    pub batch_size: usize,
    /// Optional directory containing a HuggingFace tokenizer.json
    pub tokenizer_dir: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            max_length: 384,
            normalize: true,
            batch_size: 32,
            tokenizer_dir: None,
        }
    }
}

/// Deterministic segment embedding model
pub struct EmbeddingModel {
    config: EmbeddingConfig,
    text_processor: TextProcessor,
    cache: HashMap<String, Embedding>,
}

impl EmbeddingModel {
    /// Create a new embedding model
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let text_config = TextConfig {
            max_length: config.max_length,
            ..Default::default()
        };
        let mut text_processor = TextProcessor::new(text_config);

        if let Some(ref dir) = config.tokenizer_dir {
            if let Err(e) = text_processor.load_tokenizer(dir) {
                log::warn!("Falling back to hash tokenization: {}", e);
            }
        }

        Ok(Self {
            config,
            text_processor,
            cache: HashMap::new(),
        })
    }

    /// Generate an embedding for a single text
    pub fn encode(&mut self, text: &str) -> Result<Embedding> {
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached.clone());
        }

        let embedding = self.encode_uncached(text)?;
        self.cache.insert(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    /// Generate embeddings for multiple texts in parallel batches.
    ///
    /// Cached texts are served from the cache; only cache misses are
    /// dispatched to the parallel workers.
    pub fn encode_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = vec![Embedding::new(); texts.len()];
        let mut missing = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(text) {
                Some(cached) => embeddings[i] = cached.clone(),
                None => missing.push(i),
            }
        }

        for chunk in missing.chunks(self.config.batch_size.max(1)) {
            let chunk_results: Vec<Result<Embedding>> = chunk
                .par_iter()
                .map(|&i| self.encode_uncached(&texts[i]))
                .collect();

            for (&i, result) in chunk.iter().zip(chunk_results) {
                let embedding = result?;
                self.cache.insert(texts[i].clone(), embedding.clone());
                embeddings[i] = embedding;
            }
        }

        Ok(embeddings)
    }

    /// Compute the embedding without touching the cache (thread-safe)
    fn encode_uncached(&self, text: &str) -> Result<Embedding> {
        let tokenized = self.text_processor.tokenize(text)?;
        let mut embedding = vec![0.0f32; EMBEDDING_DIMENSION];

        let valid_tokens: Vec<u32> = tokenized
            .input_ids
            .iter()
            .zip(tokenized.attention_mask.iter())
            .filter(|(_, mask)| **mask == 1)
            .map(|(token_id, _)| *token_id)
            .collect();

        if !valid_tokens.is_empty() {
            for (i, &token_id) in valid_tokens.iter().enumerate() {
                // Spread each token over several dimensions via hashing, with
                // position-dependent weighting so word order matters
                for hash_func in 0..5u32 {
                    let mut hasher = std::collections::hash_map::DefaultHasher::new();
                    use std::hash::{Hash, Hasher};

                    token_id.wrapping_add(hash_func * 1000).hash(&mut hasher);
                    let hash = hasher.finish();

                    for j in 0..20 {
                        let dim = ((hash as usize).wrapping_add(j * 19).wrapping_add(i * 17))
                            % EMBEDDING_DIMENSION;
                        let value = ((hash >> (j * 3)) & 0x7) as f32 / 8.0 - 0.5;
                        embedding[dim] += value * (1.0 / (i as f32 + 1.0).sqrt());
                    }
                }

                let pos_weight = 1.0 - (i as f32 / valid_tokens.len() as f32) * 0.1;
                for k in 0..10 {
                    let dim = (token_id as usize * 7 + k * 13) % EMBEDDING_DIMENSION;
                    embedding[dim] += (token_id as f32 / 30000.0) * pos_weight;
                }
            }

            let seq_norm = 1.0 / (valid_tokens.len() as f32).sqrt();
            for val in &mut embedding {
                *val *= seq_norm;
            }
        }

        if self.config.normalize {
            normalize(&mut embedding);
        }

        Ok(embedding)
    }

    /// Get embedding dimension
    pub fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }

    /// Clear the embedding cache
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Check if a real tokenizer is loaded
    pub fn has_tokenizer(&self) -> bool {
        self.text_processor.has_tokenizer()
    }
}

/// Normalize a vector to unit length in place
fn normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-12 {
        for val in embedding.iter_mut() {
            *val /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_dimension() {
        let mut model = EmbeddingModel::new(EmbeddingConfig::default()).unwrap();
        let embedding = model.encode("This is a test sentence").unwrap();
        assert_eq!(embedding.len(), EMBEDDING_DIMENSION);
    }

    #[test]
    fn test_embedding_deterministic() {
        let mut model1 = EmbeddingModel::new(EmbeddingConfig::default()).unwrap();
        let mut model2 = EmbeddingModel::new(EmbeddingConfig::default()).unwrap();

        let text = "Test deterministic behavior";
        assert_eq!(model1.encode(text).unwrap(), model2.encode(text).unwrap());
    }

    #[test]
    fn test_embedding_caching() {
        let mut model = EmbeddingModel::new(EmbeddingConfig::default()).unwrap();

        let text = "cached sentence";
        let first = model.encode(text).unwrap();
        assert_eq!(model.cache_size(), 1);

        let second = model.encode(text).unwrap();
        assert_eq!(first, second);
        assert_eq!(model.cache_size(), 1);

        model.clear_cache();
        assert_eq!(model.cache_size(), 0);
    }

    #[test]
    fn test_embedding_normalization() {
        use approx::assert_relative_eq;

        let mut model = EmbeddingModel::new(EmbeddingConfig::default()).unwrap();
        let embedding = model.encode("test normalization").unwrap();

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_embedding_batch() {
        let mut model = EmbeddingModel::new(EmbeddingConfig::default()).unwrap();

        let texts = vec![
            "First sentence".to_string(),
            "Second sentence for comparison".to_string(),
            "Third sentence with different content".to_string(),
        ];

        let embeddings = model.encode_batch(&texts).unwrap();
        assert_eq!(embeddings.len(), 3);
        assert_eq!(model.cache_size(), 3);

        assert_ne!(embeddings[0], embeddings[1]);
        assert_ne!(embeddings[1], embeddings[2]);
    }

    #[test]
    fn test_batch_matches_single_encoding() {
        let mut model = EmbeddingModel::new(EmbeddingConfig::default()).unwrap();

        let texts = vec!["alpha beta".to_string(), "gamma delta".to_string()];
        let batch = model.encode_batch(&texts).unwrap();

        let mut fresh = EmbeddingModel::new(EmbeddingConfig::default()).unwrap();
        assert_eq!(batch[0], fresh.encode("alpha beta").unwrap());
        assert_eq!(batch[1], fresh.encode("gamma delta").unwrap());
    }

    #[test]
    fn test_batch_reuses_cached_embeddings() {
        let mut model = EmbeddingModel::new(EmbeddingConfig::default()).unwrap();

        let warm = model.encode("alpha beta").unwrap();
        assert_eq!(model.cache_size(), 1);

        let texts = vec!["alpha beta".to_string(), "gamma delta".to_string()];
        let batch = model.encode_batch(&texts).unwrap();
        assert_eq!(batch[0], warm);
        assert_eq!(model.cache_size(), 2);

        let mut fresh = EmbeddingModel::new(EmbeddingConfig::default()).unwrap();
        assert_eq!(batch[1], fresh.encode("gamma delta").unwrap());
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let mut model = EmbeddingModel::new(EmbeddingConfig::default()).unwrap();
        let embedding = model.encode("").unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }
}
