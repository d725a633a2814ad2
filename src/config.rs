//! Configuration for ragchat
//!
//! This module provides configuration structures for chunking, search, and the
//! LLM provider, plus credential resolution from the environment or a local
//! secrets file.

use crate::error::Result;
use crate::ml::embedding::EmbeddingConfig;
use crate::ml::search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable checked first during credential resolution
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Placeholder value some setups leave in place of a real key; treated as absent
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks of the same document
    pub overlap: usize,

    /// Minimum chunk size to keep (except for the final chunk)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            overlap: 20,
            min_chunk_size: 1,
        }
    }
}

/// LLM provider configuration (OpenAI-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Maximum tokens in the completion
    pub max_tokens: u16,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in seconds; timeouts surface as generation failures
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama3-8b-8192".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of segments retrieved per question
    pub top_k: usize,

    /// Number of retrieved segments included in the grounded prompt
    pub context_segments: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            context_segments: 3,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Corpus directory containing documents to index
    pub corpus_dir: PathBuf,

    /// Directory where the built index is persisted
    pub index_dir: PathBuf,

    /// Chunking settings
    pub chunking: ChunkingConfig,

    /// Embedding settings
    pub embedding: EmbeddingConfig,

    /// Vector search settings
    pub search: SearchConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Retrieval settings
    pub retrieval: RetrievalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("./data"),
            index_dir: PathBuf::from("./storage"),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
            llm: LlmConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

/// A resolved provider credential.
///
/// Absence is modeled as `Option<Credential>` rather than a magic placeholder
/// string, so callers cannot forget the check before making network calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw secret, rejecting empty and placeholder values
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == PLACEHOLDER_API_KEY {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Resolve a credential: environment variable first, then the local
    /// secrets file. Pure read; absence is `None`, never an error.
    pub fn resolve() -> Option<Self> {
        Self::resolve_from(
            std::env::var(API_KEY_ENV).ok(),
            Self::secrets_path().as_deref(),
        )
    }

    /// Resolution core: a valid environment value wins; an absent, empty, or
    /// placeholder value falls through to the secrets file.
    fn resolve_from(env_value: Option<String>, secrets_path: Option<&Path>) -> Option<Self> {
        if let Some(cred) = env_value.and_then(Self::new) {
            log::debug!("Resolved credential from {} environment variable", API_KEY_ENV);
            return Some(cred);
        }

        if let Some(path) = secrets_path {
            if let Some(cred) = Self::from_secrets_file(path) {
                log::debug!("Resolved credential from secrets file {:?}", path);
                return Some(cred);
            }
        }

        None
    }

    /// Default secrets file location (~/.ragchat/secrets.json)
    fn secrets_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".ragchat").join("secrets.json"))
    }

    /// Read the credential from a JSON secrets file ({"GROQ_API_KEY": "..."})
    pub fn from_secrets_file<P: AsRef<Path>>(path: P) -> Option<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).ok()?;
        let secrets: HashMap<String, String> = serde_json::from_str(&contents).ok()?;
        secrets.get(API_KEY_ENV).and_then(|value| Self::new(value.as_str()))
    }

    /// Expose the secret for client construction
    pub fn expose(&self) -> &str {
        &self.0
    }
}

/// Load configuration from a JSON file, falling back to defaults when absent
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chunking() {
        let config = ChunkingConfig::default();
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.overlap, 20);
    }

    #[test]
    fn test_credential_rejects_placeholder() {
        assert!(Credential::new(PLACEHOLDER_API_KEY).is_none());
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
    }

    #[test]
    fn test_credential_accepts_real_key() {
        let cred = Credential::new("gsk_test_12345").unwrap();
        assert_eq!(cred.expose(), "gsk_test_12345");
    }

    #[test]
    fn test_credential_from_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");
        std::fs::write(&path, r#"{"GROQ_API_KEY": "gsk_from_file"}"#).unwrap();

        let cred = Credential::from_secrets_file(&path).unwrap();
        assert_eq!(cred.expose(), "gsk_from_file");
    }

    #[test]
    fn test_secrets_file_placeholder_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");
        std::fs::write(&path, r#"{"GROQ_API_KEY": "your-api-key-here"}"#).unwrap();

        assert!(Credential::from_secrets_file(&path).is_none());
    }

    #[test]
    fn test_resolution_env_wins_over_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");
        std::fs::write(&path, r#"{"GROQ_API_KEY": "gsk_from_file"}"#).unwrap();

        let cred =
            Credential::resolve_from(Some("gsk_from_env".to_string()), Some(&path)).unwrap();
        assert_eq!(cred.expose(), "gsk_from_env");
    }

    #[test]
    fn test_resolution_placeholder_env_falls_through_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");
        std::fs::write(&path, r#"{"GROQ_API_KEY": "gsk_from_file"}"#).unwrap();

        let cred =
            Credential::resolve_from(Some(PLACEHOLDER_API_KEY.to_string()), Some(&path)).unwrap();
        assert_eq!(cred.expose(), "gsk_from_file");
    }

    #[test]
    fn test_resolution_without_sources_is_absent() {
        assert!(Credential::resolve_from(None, None).is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let config = load_config("/nonexistent/ragchat.json").unwrap();
        assert_eq!(config.corpus_dir, PathBuf::from("./data"));
        assert_eq!(config.llm.model, "llama3-8b-8192");
    }
}
