use crate::api_types::{Message, MessagesResponse};
use anyhow::Result;
use async_trait::async_trait;
use desk_core::LlmConfig;

/// Sampling parameters forwarded to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    /// Upper bound on generated tokens; `None` leaves it to the provider.
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: None,
            temperature: 0.3,
        }
    }
}

impl From<&LlmConfig> for CompletionParams {
    fn from(cfg: &LlmConfig) -> Self {
        Self {
            max_tokens: cfg.max_tokens.filter(|&n| n > 0),
            temperature: cfg.temperature,
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one chat completion request. Errors cover transport, status and body shape.
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<MessagesResponse>;

    /// Short provider label for logs.
    fn name(&self) -> &str;
}
