//! Chat completion backends
//!
//! Defines the [`CompletionBackend`] trait and the Groq implementation built
//! on the OpenAI-compatible API. Every call is bounded by a timeout so a
//! stalled provider surfaces as a generation error instead of hanging the
//! chat loop.

use crate::config::{Credential, LlmConfig};
use crate::error::{RagError, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;

/// A model that can turn a prompt into a completion
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate a completion for the prompt, with an optional system message
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String>;

    /// Model identifier, for logging and stats
    fn model(&self) -> &str;
}

/// Groq chat completion backend (OpenAI-compatible API)
pub struct GroqBackend {
    client: Client<OpenAIConfig>,
    config: LlmConfig,
}

impl GroqBackend {
    /// Create a backend from a resolved credential
    pub fn new(credential: &Credential, config: LlmConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(credential.expose())
            .with_api_base(config.base_url.as_str());
        let client = Client::with_config(openai_config);
        Self { client, config }
    }
}

#[async_trait]
impl CompletionBackend for GroqBackend {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        if let Some(system) = system {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(system.to_string()),
                    name: None,
                },
            ));
        }

        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                name: None,
            },
        ));

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.config.model.as_str())
            .messages(messages)
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build()
            .map_err(|e| RagError::Generation(format!("Failed to build request: {}", e)))?;

        log::debug!("Sending completion request to model {}", self.config.model);

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let response = tokio::time::timeout(timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                RagError::Generation(format!(
                    "Model call timed out after {}s",
                    self.config.timeout_secs
                ))
            })?
            .map_err(|e| RagError::Generation(format!("Model call failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| RagError::Generation("Model returned no content".to_string()))?;

        if content.trim().is_empty() {
            return Err(RagError::Generation("Model returned empty content".to_string()));
        }

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
