//! Text processing and chunking functionality for ragchat
//!
//! This module provides the fixed-window chunking used to turn documents into
//! retrieval segments.

pub mod chunking;

// Re-export main types and functions
pub use chunking::{Segment, TextChunker};
