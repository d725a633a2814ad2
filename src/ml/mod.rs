//! Embedding and vector search for ragchat
//!
//! This module provides pure Rust embedding generation and nearest-neighbour
//! search over segment vectors, plus the persisted corpus index built on top
//! of them.

pub mod embedding;
pub mod index;
pub mod search;
pub mod text;

// Re-export main types and functions
pub use embedding::{Embedding, EmbeddingConfig, EmbeddingModel};
pub use index::{CorpusIndex, IndexStats};
pub use search::{DistanceMetric, SearchConfig, SearchResult, VectorSearchIndex};
pub use text::{TextConfig, TextProcessor, TokenizedText};
