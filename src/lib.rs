//! # ragchat
//!
//! Retrieval-augmented chat over a local document corpus, backed by
//! Groq's OpenAI-compatible chat completion API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ragchat::{ChatMode, ChatOrchestrator, Config, Credential, GroqBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!
//!     // Resolve a credential (env var, then secrets file)
//!     let backend: Option<Box<dyn ragchat::CompletionBackend>> = Credential::resolve()
//!         .map(|cred| Box::new(GroqBackend::new(&cred, config.llm.clone())) as _);
//!
//!     let mut chat = ChatOrchestrator::new(ChatMode::Rag, config, backend);
//!     let turn = chat.handle_message("What does the corpus say about Rust?").await;
//!     println!("{}", turn.content);
//!
//!     Ok(())
//! }
//! ```

// Core modules
pub mod api;
pub mod config;
pub mod corpus;
pub mod error;
pub mod llm;
pub mod ml;
pub mod text;
pub mod utils;

// Re-export main API types
pub use api::{
    ChatMode, ChatOrchestrator, ChatSession, IndexBuilder, QueryEngine, Role, Turn,
};
pub use config::{load_config, Config, Credential};
pub use error::{RagError, Result};
pub use llm::{CompletionBackend, GroqBackend};

// Re-export commonly used types
pub use corpus::Document;
pub use ml::CorpusIndex;
pub use text::Segment;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_imports() {
        // Ensure all major types can be imported
        let _config = Config::default();
    }
}
