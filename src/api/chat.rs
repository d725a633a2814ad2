//! Chat session management and orchestration
//!
//! A [`ChatSession`] is an append-only transcript of user and assistant
//! turns. The [`ChatOrchestrator`] drives the turn cycle around it: accept
//! input, validate preconditions, generate, display. Failures never escape
//! a turn; they are recorded in the transcript as assistant turns prefixed
//! with `Error: `.

use crate::api::indexer::IndexBuilder;
use crate::api::query::QueryEngine;
use crate::config::Config;
use crate::error::{RagError, Result};
use crate::llm::CompletionBackend;
use crate::text::chunking::Segment;
use crate::utils;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

const PLAIN_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Provide clear, accurate, and concise responses.";

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Append-only conversation transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatSession {
    turns: Vec<Turn>,
}

impl ChatSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn
    pub fn append_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            content: content.into(),
        });
    }

    /// Append an assistant turn
    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Last turn, if any
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Discard all turns; calling on an empty session is a no-op
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the transcript is empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Which pipeline answers user messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Direct model chat, no retrieval
    Plain,
    /// Retrieval-augmented chat grounded in the corpus
    Rag,
}

/// Phase of the turn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Validating,
    Generating,
}

/// Drives the chat turn cycle over a session
pub struct ChatOrchestrator {
    mode: ChatMode,
    config: Config,
    session: ChatSession,
    backend: Option<Box<dyn CompletionBackend>>,
    engine: Option<QueryEngine>,
    state: SessionState,
}

impl ChatOrchestrator {
    /// Create an orchestrator; `backend` is `None` when no credential could
    /// be resolved
    pub fn new(mode: ChatMode, config: Config, backend: Option<Box<dyn CompletionBackend>>) -> Self {
        Self {
            mode,
            config,
            session: ChatSession::new(),
            backend,
            engine: None,
            state: SessionState::AwaitingInput,
        }
    }

    /// Process one user message through the full turn cycle
    ///
    /// The user turn is appended before validation, so the transcript records
    /// the input even when the turn fails. Exactly one assistant turn is
    /// appended per call; on failure its content is `Error: ` followed by the
    /// failure description. This method never returns an error.
    pub async fn handle_message(&mut self, input: &str) -> &Turn {
        self.session.append_user(input);

        self.state = SessionState::Validating;
        let response = match self.validate() {
            Err(e) => Err(e),
            Ok(()) => {
                self.state = SessionState::Generating;
                self.generate(input).await
            }
        };

        match response {
            Ok(content) => self.session.append_assistant(content),
            Err(e) => {
                log::warn!("Turn failed: {}", e);
                self.session.append_assistant(format!("Error: {}", e));
            }
        }

        self.state = SessionState::AwaitingInput;
        self.session.last().unwrap()
    }

    /// Validate preconditions for a turn: credential first, then corpus
    fn validate(&mut self) -> Result<()> {
        if self.backend.is_none() {
            return Err(RagError::Configuration(
                "Groq API key not found. Set the GROQ_API_KEY environment variable or add it to the secrets file".to_string(),
            ));
        }

        if self.mode == ChatMode::Rag && self.engine.is_none() {
            if !utils::has_supported_documents(&self.config.corpus_dir) {
                return Err(RagError::Precondition(format!(
                    "No documents found in {:?}. Add documents to the corpus directory before chatting",
                    self.config.corpus_dir
                )));
            }
        }

        Ok(())
    }

    async fn generate(&mut self, input: &str) -> Result<String> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| RagError::Configuration("No backend configured".to_string()))?;

        match self.mode {
            ChatMode::Plain => backend.complete(Some(PLAIN_SYSTEM_PROMPT), input).await,
            ChatMode::Rag => {
                if self.engine.is_none() {
                    let mut builder = IndexBuilder::new(self.config.clone())?;
                    let index = builder.build_or_load()?;
                    self.engine = Some(QueryEngine::new(
                        index,
                        self.config.retrieval.clone(),
                        self.config.embedding.clone(),
                    )?);
                }
                let engine = self.engine.as_mut().unwrap();
                engine.answer(backend.as_ref(), input).await
            }
        }
    }

    /// Raw retrieval over the corpus index, for the `search` command
    pub fn search(&mut self, query: &str) -> Result<Vec<(f32, Segment)>> {
        if self.mode != ChatMode::Rag {
            return Err(RagError::Precondition(
                "Search is only available in RAG mode".to_string(),
            ));
        }
        if self.engine.is_none() {
            let mut builder = IndexBuilder::new(self.config.clone())?;
            let index = builder.build_or_load()?;
            self.engine = Some(QueryEngine::new(
                index,
                self.config.retrieval.clone(),
                self.config.embedding.clone(),
            )?);
        }
        self.engine.as_mut().unwrap().retrieve(query)
    }

    /// Clear the transcript; idempotent
    pub fn clear(&mut self) {
        self.session.clear();
    }

    /// The transcript
    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Current phase of the turn cycle
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Chat mode
    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    /// Number of indexed segments, once the index has been built
    pub fn indexed_segments(&self) -> Option<usize> {
        self.engine.as_ref().map(|e| e.index().len())
    }

    /// Whether a completion backend is configured
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Model name of the configured backend
    pub fn model(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.model())
    }
}

/// Run an interactive chat loop on stdin/stdout
pub async fn run_interactive(mut orchestrator: ChatOrchestrator) -> Result<()> {
    println!("💬 Interactive Chat Mode");
    println!("   Type 'quit' or 'exit' to end the session");
    println!("   Type 'help' for more commands");

    match orchestrator.model() {
        Some(model) => println!("\nLLM: {}", model),
        None => println!("\nLLM: Not available (no API key)"),
    }

    println!("\nType 'help' for commands, 'exit' to quit");
    println!("{}", "-".repeat(50));

    loop {
        print!("\nYou: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }
            "help" => {
                println!("\nCommands:");
                println!("  search <query> - Show raw search results");
                println!("  stats         - Show session statistics");
                println!("  clear         - Clear conversation history");
                println!("  help          - Show this help");
                println!("  exit/quit     - End session");
                continue;
            }
            "stats" => {
                println!("\nSession Statistics:");
                println!("  Turns: {}", orchestrator.session().len());
                match orchestrator.indexed_segments() {
                    Some(count) => println!("  Indexed segments: {}", count),
                    None => println!("  Indexed segments: index not built yet"),
                }
                continue;
            }
            "clear" => {
                orchestrator.clear();
                println!("Conversation history cleared.");
                continue;
            }
            _ => {
                if let Some(query) = input.strip_prefix("search ") {
                    println!("\nSearching: '{}'", query);
                    match orchestrator.search(query) {
                        Ok(results) => {
                            println!("Found {} results:\n", results.len());
                            for (i, (score, segment)) in results.iter().take(3).enumerate() {
                                let preview: String = segment.text.chars().take(100).collect();
                                println!("{}. [Score: {:.3}] {}", i + 1, score, preview);
                            }
                        }
                        Err(e) => println!("❌ Search error: {}", e),
                    }
                    continue;
                }

                let start_time = std::time::Instant::now();
                let turn = orchestrator.handle_message(input).await;
                let elapsed = start_time.elapsed();

                println!("\nAssistant: {}", turn.content);
                println!("[{:.1}s]", elapsed.as_secs_f64());
            }
        }
    }

    Ok(())
}
