//! API layer for ragchat
//!
//! This module provides the main public interfaces for building corpus
//! indexes, answering grounded questions, and running chat sessions.

pub mod chat;
pub mod indexer;
pub mod query;

// Re-export main API types
pub use chat::{run_interactive, ChatMode, ChatOrchestrator, ChatSession, Role, SessionState, Turn};
pub use indexer::IndexBuilder;
pub use query::QueryEngine;
