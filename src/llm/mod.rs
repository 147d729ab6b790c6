//! Generative-text proxy.
//!
//! Uses rig-core's Gemini provider for transport. Handlers only see the
//! [`TextGenerator`] trait so they can be exercised without network access.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::gemini;
use secrecy::{ExposeSecret, SecretString};

use crate::config::GeminiConfig;
use crate::error::LlmError;

/// Prompt used when the caller does not send one.
pub const DEFAULT_PROMPT: &str = "Explique como funciona uma API em uma frase.";

/// Single-shot text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Gemini-backed generator. The API key is checked per call, so the server
/// starts fine without one and only this endpoint fails.
pub struct GeminiGenerator {
    api_key: Option<SecretString>,
    model: String,
}

impl GeminiGenerator {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            api_key: config.api_key,
            model: config.model,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;

        let client = gemini::Client::new(api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "gemini".to_string(),
                reason: format!("Failed to create Gemini client: {}", e),
            }
        })?;

        let agent = client.agent(self.model.as_str()).build();
        let text = agent
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: "gemini".to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(model = %self.model, chars = text.len(), "Gemini responded");
        Ok(text)
    }
}
