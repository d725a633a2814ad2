//! Chat orchestration behavior tests
//!
//! Verifies the turn cycle guarantees with stub completion backends: turn
//! ordering, error turns, validation order, and transcript clearing.

use async_trait::async_trait;
use ragchat::{ChatMode, ChatOrchestrator, CompletionBackend, Config, RagError, Result, Role};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Backend returning a fixed reply and counting invocations
struct CountingBackend {
    reply: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CompletionBackend for CountingBackend {
    async fn complete(&self, _system: Option<&str>, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }

    fn model(&self) -> &str {
        "counting-stub"
    }
}

struct FailingBackend;

#[async_trait]
impl CompletionBackend for FailingBackend {
    async fn complete(&self, _system: Option<&str>, _prompt: &str) -> Result<String> {
        Err(RagError::Generation("synthetic outage".to_string()))
    }

    fn model(&self) -> &str {
        "failing-stub"
    }
}

fn counting(reply: &str) -> (Box<CountingBackend>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let backend = Box::new(CountingBackend {
        reply: reply.to_string(),
        calls: calls.clone(),
    });
    (backend, calls)
}

#[tokio::test]
async fn test_turns_alternate_and_accumulate() {
    let (backend, _) = counting("ok");
    let mut chat = ChatOrchestrator::new(ChatMode::Plain, Config::default(), Some(backend));

    chat.handle_message("first").await;
    chat.handle_message("second").await;

    let turns = chat.session().turns();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].content, "first");
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[2].role, Role::User);
    assert_eq!(turns[2].content, "second");
    assert_eq!(turns[3].role, Role::Assistant);
}

#[tokio::test]
async fn test_clear_resets_transcript_and_is_idempotent() {
    let (backend, _) = counting("ok");
    let mut chat = ChatOrchestrator::new(ChatMode::Plain, Config::default(), Some(backend));

    chat.clear();
    assert!(chat.session().is_empty());

    chat.handle_message("hello").await;
    assert_eq!(chat.session().len(), 2);

    chat.clear();
    chat.clear();
    assert!(chat.session().is_empty());

    // Session remains usable after clearing
    chat.handle_message("again").await;
    assert_eq!(chat.session().len(), 2);
}

#[tokio::test]
async fn test_missing_credential_yields_single_error_turn() {
    let mut chat = ChatOrchestrator::new(ChatMode::Plain, Config::default(), None);

    let turn = chat.handle_message("hello").await;
    assert_eq!(turn.role, Role::Assistant);
    assert!(turn.content.starts_with("Error: "));
    assert_eq!(chat.session().len(), 2);
}

#[tokio::test]
async fn test_empty_corpus_skips_generation_entirely() {
    let corpus = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.corpus_dir = corpus.path().to_path_buf();

    let (backend, calls) = counting("should never run");
    let mut chat = ChatOrchestrator::new(ChatMode::Rag, config, Some(backend));

    let turn = chat.handle_message("anything").await;
    assert!(turn.content.starts_with("Error: "));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(chat.indexed_segments().is_none());
    assert_eq!(chat.session().len(), 2);
}

#[tokio::test]
async fn test_backend_failure_yields_single_error_turn() {
    let mut chat = ChatOrchestrator::new(
        ChatMode::Plain,
        Config::default(),
        Some(Box::new(FailingBackend)),
    );

    let turn = chat.handle_message("hello").await;
    assert!(turn.content.starts_with("Error: "));
    assert!(turn.content.contains("synthetic outage"));
    assert_eq!(chat.session().len(), 2);

    // A failed turn does not poison the session
    chat.handle_message("retry").await;
    assert_eq!(chat.session().len(), 4);
}

#[tokio::test]
async fn test_rag_round_trip_over_small_corpus() {
    let corpus = tempfile::tempdir().unwrap();
    let storage = tempfile::tempdir().unwrap();
    fs::write(corpus.path().join("facts.txt"), "The sky is blue.").unwrap();

    let mut config = Config::default();
    config.corpus_dir = corpus.path().to_path_buf();
    config.index_dir = storage.path().to_path_buf();

    let (backend, calls) = counting("blue");
    let mut chat = ChatOrchestrator::new(ChatMode::Rag, config, Some(backend));

    let turn = chat.handle_message("What is the sky color?").await;
    assert_eq!(turn.content, "blue");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(chat.indexed_segments(), Some(1));

    let turns = chat.session().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0], ragchat::Turn {
        role: Role::User,
        content: "What is the sky color?".to_string(),
    });
    assert_eq!(turns[1].role, Role::Assistant);
}
