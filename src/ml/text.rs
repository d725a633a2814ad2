//! Text preprocessing and tokenization for the embedding model
//!
//! Provides unicode normalization, whitespace cleanup, and tokenization. A
//! local HuggingFace `tokenizer.json` is used when available; otherwise a
//! deterministic hash-based fallback keeps embeddings reproducible without
//! any model download.

use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokenizers::Tokenizer;
use unicode_normalization::UnicodeNormalization;

/// Text preprocessing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Maximum sequence length
    pub max_length: usize,
    /// Whether to normalize unicode (NFC)
    pub normalize_unicode: bool,
    /// Whether to lowercase text
    pub lowercase: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            max_length: 384,
            normalize_unicode: true,
            lowercase: false,
        }
    }
}

/// Tokenized text ready for embedding
#[derive(Debug, Clone)]
pub struct TokenizedText {
    /// Token IDs
    pub input_ids: Vec<u32>,
    /// Attention mask (1 for real tokens, 0 for padding)
    pub attention_mask: Vec<u32>,
}

/// Text preprocessor and tokenizer
pub struct TextProcessor {
    tokenizer: Option<Tokenizer>,
    config: TextConfig,
}

impl TextProcessor {
    /// Create new text processor
    pub fn new(config: TextConfig) -> Self {
        Self {
            tokenizer: None,
            config,
        }
    }

    /// Load a tokenizer from a directory containing `tokenizer.json`
    pub fn load_tokenizer<P: AsRef<Path>>(&mut self, model_dir: P) -> Result<()> {
        let tokenizer_path = model_dir.as_ref().join("tokenizer.json");

        if !tokenizer_path.exists() {
            return Err(RagError::Search(format!(
                "Tokenizer file not found at {:?}",
                tokenizer_path
            )));
        }

        match Tokenizer::from_file(&tokenizer_path) {
            Ok(tokenizer) => {
                self.tokenizer = Some(tokenizer);
                log::info!("Loaded tokenizer from {:?}", tokenizer_path);
                Ok(())
            }
            Err(e) => Err(RagError::Search(format!("Failed to load tokenizer: {}", e))),
        }
    }

    /// Preprocess text (normalize, clean)
    pub fn preprocess_text(&self, text: &str) -> String {
        let mut processed = text.to_string();

        if self.config.normalize_unicode {
            processed = processed.nfc().collect::<String>();
        }

        if self.config.lowercase {
            processed = processed.to_lowercase();
        }

        processed
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ")
    }

    /// Tokenize text for embedding
    pub fn tokenize(&self, text: &str) -> Result<TokenizedText> {
        let preprocessed = self.preprocess_text(text);

        if let Some(ref tokenizer) = self.tokenizer {
            let encoding = tokenizer
                .encode(preprocessed, true)
                .map_err(|e| RagError::Search(format!("Tokenization failed: {}", e)))?;

            let mut input_ids = encoding.get_ids().to_vec();
            let mut attention_mask = encoding.get_attention_mask().to_vec();
            if input_ids.len() > self.config.max_length {
                input_ids.truncate(self.config.max_length);
                attention_mask.truncate(self.config.max_length);
            }

            Ok(TokenizedText {
                input_ids,
                attention_mask,
            })
        } else {
            Ok(self.fallback_tokenize(&preprocessed))
        }
    }

    /// Simple deterministic word-hash tokenization used when no real tokenizer
    /// is available
    fn fallback_tokenize(&self, text: &str) -> TokenizedText {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut input_ids = Vec::new();
        for word in text.split_whitespace().take(self.config.max_length) {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            // Keep token ids in a BERT-like vocabulary range
            input_ids.push((hasher.finish() % 30000 + 1000) as u32);
        }

        let attention_mask = vec![1u32; input_ids.len()];
        TokenizedText {
            input_ids,
            attention_mask,
        }
    }

    /// Check if real tokenizer is loaded
    pub fn has_tokenizer(&self) -> bool {
        self.tokenizer.is_some()
    }

    /// Get configuration
    pub fn config(&self) -> &TextConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocessing() {
        let config = TextConfig {
            lowercase: true,
            ..Default::default()
        };
        let processor = TextProcessor::new(config);

        let text = "  Hello    WORLD!  ";
        assert_eq!(processor.preprocess_text(text), "hello world!");
    }

    #[test]
    fn test_fallback_tokenization_deterministic() {
        let processor = TextProcessor::new(TextConfig::default());

        let first = processor.tokenize("Hello world test").unwrap();
        let second = processor.tokenize("Hello world test").unwrap();

        assert_eq!(first.input_ids, second.input_ids);
        assert_eq!(first.input_ids.len(), 3);
        assert!(first.attention_mask.iter().all(|&m| m == 1));
    }

    #[test]
    fn test_fallback_tokenization_truncates() {
        let processor = TextProcessor::new(TextConfig {
            max_length: 4,
            ..Default::default()
        });

        let tokenized = processor
            .tokenize("one two three four five six")
            .unwrap();
        assert_eq!(tokenized.input_ids.len(), 4);
    }

    #[test]
    fn test_missing_tokenizer_file() {
        let mut processor = TextProcessor::new(TextConfig::default());
        let dir = tempfile::tempdir().unwrap();
        assert!(processor.load_tokenizer(dir.path()).is_err());
        assert!(!processor.has_tokenizer());
    }
}
