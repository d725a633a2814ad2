//! Fixed-window text chunking with overlap
//!
//! Documents are split into overlapping character windows so neighbouring
//! segments share context at their boundary. Consecutive segments of the same
//! document overlap by exactly the configured number of characters; only the
//! final segment may be shorter than the window.

use crate::config::ChunkingConfig;
use crate::error::{RagError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A contiguous slice of a document's text used as the retrieval unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// Unique segment identifier
    pub id: usize,

    /// The actual text content
    pub text: String,

    /// Original document source
    pub source: Option<String>,

    /// Character offset in the preprocessed document text
    pub offset: usize,

    /// Length of the segment in characters
    pub length: usize,

    /// Embedding vector (set during indexing)
    pub embedding: Option<Vec<f32>>,
}

/// Splits document text into overlapping fixed-size segments
pub struct TextChunker {
    config: ChunkingConfig,
    whitespace_regex: Regex,
}

impl TextChunker {
    /// Create a new chunker with the given configuration
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        if config.overlap >= config.chunk_size {
            return Err(RagError::TextProcessing(format!(
                "Overlap {} must be smaller than chunk size {}",
                config.overlap, config.chunk_size
            )));
        }

        let whitespace_regex = Regex::new(r"\s+")
            .map_err(|e| RagError::TextProcessing(format!("Failed to compile regex: {}", e)))?;

        Ok(Self {
            config,
            whitespace_regex,
        })
    }

    /// Create a chunker with default configuration (1024 window, 20 overlap)
    pub fn with_default_config() -> Result<Self> {
        Self::new(ChunkingConfig::default())
    }

    /// Chunk text into overlapping segments
    pub fn chunk_text(&self, text: &str, source: Option<String>) -> Result<Vec<Segment>> {
        let text = self.preprocess_text(text);
        let chars: Vec<char> = text.chars().collect();

        let mut segments = Vec::new();
        if chars.is_empty() {
            return Ok(segments);
        }

        let mut id = 0;

        if chars.len() <= self.config.chunk_size {
            segments.push(Segment {
                id,
                text,
                source,
                offset: 0,
                length: chars.len(),
                embedding: None,
            });
            return Ok(segments);
        }

        let step = self.config.chunk_size - self.config.overlap;
        let mut start = 0;

        while start < chars.len() {
            let end = std::cmp::min(start + self.config.chunk_size, chars.len());
            let segment_text: String = chars[start..end].iter().collect();
            let length = end - start;

            if length >= self.config.min_chunk_size || end == chars.len() {
                segments.push(Segment {
                    id,
                    text: segment_text,
                    source: source.clone(),
                    offset: start,
                    length,
                    embedding: None,
                });
                id += 1;
            }

            if end == chars.len() {
                break;
            }
            start += step;
        }

        Ok(segments)
    }

    /// Preprocess text by collapsing whitespace and dropping empty lines
    fn preprocess_text(&self, text: &str) -> String {
        let normalized = text
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        self.whitespace_regex
            .replace_all(&normalized, " ")
            .to_string()
    }
}
